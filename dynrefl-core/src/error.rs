/// If attempt to access member was incorrect
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemberAccessError {
    /// Neither the type nor any of its declared bases registered this member
    #[error("Member \"{name}\" not found")]
    NotFound {
        #[allow(missing_docs)]
        name: String,
    },

    /// Requested type doesn't actually match that of the member or wrapped value
    #[error("Requested type `{expected}` doesn't match actual type `{found}`")]
    UnmatchingType {
        /// Name of requested type
        expected: &'static str,
        /// Name of stored type
        found: &'static str,
    },

    /// Member was registered as const and can't be written
    #[error("Member \"{name}\" is const")]
    Const {
        #[allow(missing_docs)]
        name: String,
    },

    /// Member was registered without a setter
    #[error("Member \"{name}\" can't be assigned through a type-erased value")]
    NotAssignable {
        #[allow(missing_docs)]
        name: String,
    },

    /// Attempt to write through a read-only view
    #[error("Attempt to write through a read-only object")]
    ReadOnly,

    /// Attempt to access through the "none" wrapper
    #[error("Attempt to access an empty object wrapper")]
    Empty,

    /// Object passed to reflection is not of the reflected type
    #[error("Object of type `{found}` passed to reflection of `{expected}`")]
    UnmatchingObject {
        /// Name of reflected type
        expected: &'static str,
        /// Name of passed object type
        found: &'static str,
    },
}

/// Requested callable is absent, or none of its overloads matches the signature
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Method \"{name}\" not found, or the signature mismatched")]
pub struct MethodNotFound {
    /// Name the call was attempted with
    pub name: String,
}

impl MethodNotFound {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

/// Failure of reflection registration or lookup
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// There is no reflection for requested type
    #[error("Reflection of `{name}` is not registered")]
    NotFound {
        #[allow(missing_docs)]
        name: String,
    },

    /// Type was already registered, registry is left untouched
    #[error("Reflection of `{name}` is already registered")]
    AlreadyRegistered {
        #[allow(missing_docs)]
        name: String,
    },

    /// `derives_from` referred to a type without reflection
    #[error("`{derived}` derives from `{base}`, which is not registered")]
    BaseNotRegistered {
        #[allow(missing_docs)]
        derived: &'static str,
        #[allow(missing_docs)]
        base: &'static str,
    },
}

/// Failure of metadata lookup
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Metadata \"{key}\" not found")]
    #[allow(missing_docs)]
    NotFound { key: String },

    #[error("Metadata \"{key}\" holds `{found}`, not `{expected}`")]
    #[allow(missing_docs)]
    UnmatchingType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Any reflection failure
///
/// Convenient for consumers mixing lookups, member access and invocation behind one `?`
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    #[allow(missing_docs)]
    Member(#[from] MemberAccessError),

    #[error(transparent)]
    #[allow(missing_docs)]
    Method(#[from] MethodNotFound),

    #[error(transparent)]
    #[allow(missing_docs)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[allow(missing_docs)]
    Metadata(#[from] MetadataError),
}

use std::{
    any::{type_name, TypeId},
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
};

/// Run-time identity of a concrete type
///
/// Two tags are equal if and only if they denote the same type. Besides identity,
/// tag remembers the type name (for diagnostics and name lookups) and its size
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
    size: usize,
}

/// Stand-in type of the "none" wrapper, never equal to any user type
pub(crate) struct NoneType;

impl TypeTag {
    /// Tag of `T`
    #[inline(always)]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            size: std::mem::size_of::<T>(),
        }
    }

    /// Tag of the value's static type
    #[inline(always)]
    pub fn of_val<T: 'static>(_value: &T) -> Self {
        Self::of::<T>()
    }

    /// Tag of `()`, used as return type of callables that return nothing
    #[inline(always)]
    pub fn unit() -> Self {
        Self::of::<()>()
    }

    #[inline(always)]
    pub(crate) fn none() -> Self {
        Self::of::<NoneType>()
    }

    /// Checks if tag denotes `T`
    #[inline(always)]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Type name, as reported by [`std::any::type_name`]
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Size of the type in bytes
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    #[allow(missing_docs)]
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeTag {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl Debug for TypeTag {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.debug_tuple("TypeTag").field(&self.name).finish()
    }
}

impl Display for TypeTag {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_compare_by_type_only() {
        assert_eq!(TypeTag::of::<f32>(), TypeTag::of_val(&1.0f32));
        assert_ne!(TypeTag::of::<f32>(), TypeTag::of::<f64>());
        assert_ne!(TypeTag::none(), TypeTag::unit());
        assert_eq!(TypeTag::of::<[i32; 3]>().size(), 12);
        assert!(TypeTag::unit().is::<()>());
    }
}

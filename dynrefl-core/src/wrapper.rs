use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
    ptr::NonNull,
};

use crate::{MemberAccessError, TypeTag};

/// Non-owning, type-tagged reference to an object
///
/// Pairs an address with the [`TypeTag`] of the value behind it. Every typed
/// access compares the tag first, so a wrapper can never be read as the wrong type.
///
/// Wrapper doesn't own the pointee. When created from a reference, lifetime `'a` keeps the
/// pointee borrowed; when created with [`RawObjectWrapper::from_raw`] the caller vouches for it.
///
/// Access goes through copies ([`RawObjectWrapper::deref_into`]) and write-through
/// ([`RawObjectWrapper::set_value`]), no reference into the pointee outlives a call.
///
/// The "none" wrapper (see [`RawObjectWrapper::none`]) is returned by lookups
/// that didn't find anything; it fails every access with [`MemberAccessError::Empty`].
#[derive(Clone)]
pub struct RawObjectWrapper<'a> {
    ptr: Option<NonNull<()>>,
    tag: TypeTag,
    is_const: bool,
    _lt: PhantomData<&'a mut ()>,
}

impl<'a> RawObjectWrapper<'a> {
    /// Wraps mutable object
    pub fn from_mut<T: 'static>(object: &'a mut T) -> Self {
        Self {
            ptr: Some(NonNull::from(object).cast()),
            tag: TypeTag::of::<T>(),
            is_const: false,
            _lt: PhantomData,
        }
    }

    /// Wraps object as read-only view
    ///
    /// [`RawObjectWrapper::set_value`] through such wrapper fails, and type-erased invocation
    /// only considers const methods
    pub fn from_ref<T: 'static>(object: &'a T) -> Self {
        Self {
            ptr: Some(NonNull::from(object).cast()),
            tag: TypeTag::of::<T>(),
            is_const: true,
            _lt: PhantomData,
        }
    }

    /// Wraps raw address with explicitly provided tag
    ///
    /// Null address produces the "none" wrapper.
    ///
    /// # Safety
    ///
    /// If not null, `ptr` must point to a live, properly aligned value of the type denoted by `tag`,
    /// not accessed through any other reference for as long as this wrapper (or wrappers derived
    /// from it) are used.
    pub unsafe fn from_raw(ptr: *mut (), tag: TypeTag) -> Self {
        match NonNull::new(ptr) {
            Some(ptr) => Self::from_parts(ptr, tag, false),
            None => Self::none(),
        }
    }

    /// # Safety
    ///
    /// Same as [`RawObjectWrapper::from_raw`]
    #[inline(always)]
    pub(crate) unsafe fn from_parts(ptr: NonNull<()>, tag: TypeTag, is_const: bool) -> Self {
        Self {
            ptr: Some(ptr),
            tag,
            is_const,
            _lt: PhantomData,
        }
    }

    /// Wrapper pointing at nothing
    pub fn none() -> Self {
        Self {
            ptr: None,
            tag: TypeTag::none(),
            is_const: true,
            _lt: PhantomData,
        }
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn is_none(&self) -> bool {
        self.ptr.is_none()
    }

    /// Whether wrapper is a read-only view
    #[inline(always)]
    pub fn is_const(&self) -> bool {
        self.is_const
    }

    /// Tag of the wrapped value, [`None`] for the "none" wrapper
    #[inline(always)]
    pub fn type_tag(&self) -> Option<TypeTag> {
        self.ptr.map(|_| self.tag)
    }

    /// Tag used for signature matching, "none" wrapper gets a tag no callable accepts
    #[inline(always)]
    pub(crate) fn match_tag(&self) -> TypeTag {
        self.tag
    }

    /// Untyped address, null for the "none" wrapper
    #[inline(always)]
    pub fn as_ptr(&self) -> *mut () {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => std::ptr::null_mut(),
        }
    }

    #[inline(always)]
    pub(crate) fn non_null(&self) -> Option<NonNull<()>> {
        self.ptr
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn is_type<T: 'static>(&self) -> bool {
        self.ptr.is_some() && self.tag.is::<T>()
    }

    /// Typed address of the wrapped value
    ///
    /// If `T` doesn't match the wrapped type (or wrapper is "none"), [`Option::None`] is returned
    pub fn into_ptr<T: 'static>(&self) -> Option<NonNull<T>> {
        match self.ptr {
            Some(ptr) if self.tag.is::<T>() => Some(ptr.cast()),
            _ => None,
        }
    }

    /// Copies the wrapped value out
    pub fn deref_into<T>(&self) -> Result<T, MemberAccessError>
    where
        T: Clone + 'static,
    {
        let ptr = self.checked_ptr::<T>()?;

        // SAFETY: tag matched, and the pointee is kept alive and unaliased for 'a
        // by construction of the wrapper
        Ok(unsafe { ptr.as_ref() }.clone())
    }

    /// Replaces the wrapped value, dropping the previous one
    pub fn set_value<T: 'static>(&self, value: T) -> Result<(), MemberAccessError> {
        let ptr = self.checked_ptr::<T>()?;

        if self.is_const {
            return Err(MemberAccessError::ReadOnly);
        }

        // SAFETY: same as in `deref_into`, plus the wrapper is not a read-only view
        unsafe { *ptr.as_ptr() = value };

        Ok(())
    }

    fn checked_ptr<T: 'static>(&self) -> Result<NonNull<T>, MemberAccessError> {
        let Some(ptr) = self.ptr else {
            return Err(MemberAccessError::Empty);
        };

        if !self.tag.is::<T>() {
            return Err(MemberAccessError::UnmatchingType {
                expected: std::any::type_name::<T>(),
                found: self.tag.name(),
            });
        }

        Ok(ptr.cast())
    }
}

impl<'a> Debug for RawObjectWrapper<'a> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.ptr {
            Some(ptr) => formatter
                .debug_struct("RawObjectWrapper")
                .field("ptr", &ptr)
                .field("type", &self.tag)
                .field("is_const", &self.is_const)
                .finish(),
            None => formatter.write_str("RawObjectWrapper(none)"),
        }
    }
}

/// Shorthand for [`RawObjectWrapper::from_mut`]
pub fn wrap_object<T: 'static>(object: &mut T) -> RawObjectWrapper<'_> {
    RawObjectWrapper::from_mut(object)
}

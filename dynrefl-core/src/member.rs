use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};

use crate::TypeTag;

/// Writes value behind the second pointer into the first one
///
/// Both pointers must point to live values of the member type
pub(crate) type Setter = unsafe fn(*mut (), *const ());

unsafe fn assign_cloned<T: Clone>(target: *mut (), source: *const ()) {
    let value = (*(source as *const T)).clone();
    *(target as *mut T) = value;
}

/// Location of a field of type `T` inside `C`
///
/// Normally produced by [`member!`](crate::member), which computes the offset with
/// [`core::mem::offset_of`] and lets the compiler infer `T` from the field itself
pub struct MemberDescriptor<C, T> {
    offset: usize,
    is_const: bool,
    _marker: PhantomData<fn(&C) -> &T>,
}

impl<C: 'static, T: 'static> MemberDescriptor<C, T> {
    /// Descriptor from raw offset
    ///
    /// # Safety
    ///
    /// `offset` must be the byte offset of a field of type `T` inside every value of `C`
    pub unsafe fn from_offset(offset: usize, is_const: bool) -> Self {
        Self {
            offset,
            is_const,
            _marker: PhantomData,
        }
    }

    #[doc(hidden)]
    pub fn __from_accessor<F>(offset: usize, is_const: bool, _accessor: F) -> Self
    where
        F: Fn(&C) -> &T,
    {
        Self {
            offset,
            is_const,
            _marker: PhantomData,
        }
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn is_const(&self) -> bool {
        self.is_const
    }

    pub(crate) fn into_member(self, setter: Option<Setter>) -> Member {
        Member {
            offset: self.offset,
            size: std::mem::size_of::<T>(),
            is_const: self.is_const,
            type_tag: TypeTag::of::<T>(),
            setter,
        }
    }
}

impl<C: 'static, T: Clone + 'static> MemberDescriptor<C, T> {
    pub(crate) fn into_assignable_member(self) -> Member {
        self.into_member(Some(assign_cloned::<T>))
    }
}

/// Describes field of a struct for registration
///
/// `member!(Type, field)` registers mutable member, `member!(const Type, field)` registers
/// member that can only be read. Tuple struct fields are referred by index: `member!(Type, 0)`.
///
/// ```
/// use dynrefl_core::member;
///
/// struct Point {
///     x: f32,
///     id: u32,
/// }
///
/// let x = member!(Point, x);
/// let id = member!(const Point, id);
///
/// assert_eq!(x.offset(), core::mem::offset_of!(Point, x));
/// assert!(id.is_const());
/// ```
#[macro_export]
macro_rules! member {
    (const $class:ty, $field:tt) => {
        $crate::MemberDescriptor::<$class, _>::__from_accessor(
            ::core::mem::offset_of!($class, $field),
            true,
            |object: &$class| &object.$field,
        )
    };
    ($class:ty, $field:tt) => {
        $crate::MemberDescriptor::<$class, _>::__from_accessor(
            ::core::mem::offset_of!($class, $field),
            false,
            |object: &$class| &object.$field,
        )
    };
}

/// Registered data member
pub struct Member {
    offset: usize,
    size: usize,
    is_const: bool,
    type_tag: TypeTag,
    setter: Option<Setter>,
}

impl Member {
    /// Byte offset from the start of the registering type
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Size of the member in bytes
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn is_const(&self) -> bool {
        self.is_const
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Whether member can be written from a type-erased value
    #[inline(always)]
    pub fn is_assignable(&self) -> bool {
        !self.is_const && self.setter.is_some()
    }

    #[inline(always)]
    pub(crate) fn setter(&self) -> Option<Setter> {
        self.setter
    }
}

impl Debug for Member {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Member")
            .field("offset", &self.offset)
            .field("size", &self.size)
            .field("is_const", &self.is_const)
            .field("type", &self.type_tag)
            .field("assignable", &self.setter.is_some())
            .finish()
    }
}

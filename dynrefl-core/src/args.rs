use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
    ops::BitOr,
    ptr::NonNull,
};

use crate::{RawObjectWrapper, TypeTag};

/// Type-tagged list of argument addresses for type-erased invocation
///
/// Arguments are either borrowed (addresses of values living elsewhere for `'a`)
/// or owned (moved into the list with [`ArgList::push`] and freed with it).
/// Callables only read their arguments: every parameter is cloned out of the list.
///
/// Lists are one-shot builders: [merging](ArgList::merge) consumes both operands
/// and produces a new list owning everything they owned.
///
/// Construction never fails, if the tags don't match any overload the invocation does.
///
/// ```
/// use dynrefl_core::{args, ArgList, RawObjectWrapper, TypeTag};
///
/// let mut y = 2.0f32;
/// let list = args![1.0f32] | RawObjectWrapper::from_mut(&mut y) | args![3i32];
///
/// assert_eq!(
///     list.type_tags(),
///     [TypeTag::of::<f32>(), TypeTag::of::<f32>(), TypeTag::of::<i32>()]
/// );
/// ```
pub struct ArgList<'a> {
    pointers: Vec<*mut ()>,
    type_tags: Vec<TypeTag>,
    owned: Vec<OwnedArg>,
    _lt: PhantomData<&'a ()>,
}

struct OwnedArg {
    ptr: NonNull<()>,
    drop_fn: unsafe fn(NonNull<()>),
}

impl Drop for OwnedArg {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `Box::<T>::leak` with `drop_fn` instantiated for the same `T`,
        // and each OwnedArg is dropped once
        unsafe { (self.drop_fn)(self.ptr) }
    }
}

unsafe fn drop_boxed<T>(ptr: NonNull<()>) {
    drop(Box::from_raw(ptr.cast::<T>().as_ptr()));
}

impl<'a> ArgList<'a> {
    /// Empty list
    pub fn new() -> Self {
        Self {
            pointers: Vec::new(),
            type_tags: Vec::new(),
            owned: Vec::new(),
            _lt: PhantomData,
        }
    }

    /// Moves `value` into the list
    pub fn push<T: 'static>(mut self, value: T) -> Self {
        let ptr = NonNull::from(Box::leak(Box::new(value))).cast::<()>();

        self.owned.push(OwnedArg {
            ptr,
            drop_fn: drop_boxed::<T>,
        });
        self.pointers.push(ptr.as_ptr());
        self.type_tags.push(TypeTag::of::<T>());
        self
    }

    /// Appends address of a borrowed value
    pub fn push_ref<T: 'static>(mut self, value: &'a T) -> Self {
        self.pointers.push(value as *const T as *mut ());
        self.type_tags.push(TypeTag::of::<T>());
        self
    }

    /// Appends address and tag of a wrapped object
    ///
    /// The "none" wrapper is appended too, under a tag no callable accepts
    pub fn push_wrapped(mut self, wrapper: &RawObjectWrapper<'a>) -> Self {
        self.pointers.push(wrapper.as_ptr());
        self.type_tags.push(wrapper.match_tag());
        self
    }

    /// Builds list out of wrapped objects, in iteration order
    pub fn from_wrappers<I>(wrappers: I) -> Self
    where
        I: IntoIterator<Item = RawObjectWrapper<'a>>,
    {
        wrappers
            .into_iter()
            .fold(Self::new(), |list, wrapper| list.push_wrapped(&wrapper))
    }

    /// Concatenates two lists, `self` first
    ///
    /// Both operands are consumed
    pub fn merge(self, other: Self) -> Self {
        let total = self.len() + other.len();

        let mut pointers = Vec::with_capacity(total);
        let mut type_tags = Vec::with_capacity(total);
        let mut owned = Vec::with_capacity(self.owned.len() + other.owned.len());

        for list in [self, other] {
            pointers.extend(list.pointers);
            type_tags.extend(list.type_tags);
            owned.extend(list.owned);
        }

        Self {
            pointers,
            type_tags,
            owned,
            _lt: PhantomData,
        }
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Tags of the arguments, in order
    #[inline(always)]
    pub fn type_tags(&self) -> &[TypeTag] {
        &self.type_tags
    }

    #[inline(always)]
    pub(crate) fn pointers(&self) -> &[*mut ()] {
        &self.pointers
    }
}

impl<'a> Default for ArgList<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Debug for ArgList<'a> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.debug_list().entries(&self.type_tags).finish()
    }
}

impl<'a> BitOr for ArgList<'a> {
    type Output = ArgList<'a>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.merge(rhs)
    }
}

impl<'a> BitOr<RawObjectWrapper<'a>> for ArgList<'a> {
    type Output = ArgList<'a>;

    fn bitor(self, rhs: RawObjectWrapper<'a>) -> Self::Output {
        self.push_wrapped(&rhs)
    }
}

impl<'a> FromIterator<RawObjectWrapper<'a>> for ArgList<'a> {
    fn from_iter<I: IntoIterator<Item = RawObjectWrapper<'a>>>(iter: I) -> Self {
        Self::from_wrappers(iter)
    }
}

impl<'a> From<Vec<RawObjectWrapper<'a>>> for ArgList<'a> {
    fn from(wrappers: Vec<RawObjectWrapper<'a>>) -> Self {
        Self::from_wrappers(wrappers)
    }
}

/// Empty [`ArgList`], a starting point for `|` chains
pub fn empty_arg_list<'a>() -> ArgList<'a> {
    ArgList::new()
}

/// Same as [`ArgList::merge`]
pub fn merge_arg_list<'a>(left: ArgList<'a>, right: ArgList<'a>) -> ArgList<'a> {
    left.merge(right)
}

/// Builds [`ArgList`] owning the given values, tags are taken from their static types
///
/// `args![1.0f32, 2u8]` is `ArgList::new().push(1.0f32).push(2u8)`
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        $crate::ArgList::new()$(.push($value))*
    };
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn merge_keeps_order_and_ownership() {
        let shared = Rc::new(());
        let borrowed = 7u8;

        let left = ArgList::new().push(Rc::clone(&shared)).push_ref(&borrowed);
        let right = args![1.5f64, Rc::clone(&shared)];
        assert_eq!(Rc::strong_count(&shared), 3);

        let left_ptr = left.pointers()[1];
        let merged = left | right;

        assert_eq!(merged.len(), 4);
        assert_eq!(merged.pointers()[1], left_ptr);
        assert_eq!(
            merged.type_tags(),
            [
                TypeTag::of::<Rc<()>>(),
                TypeTag::of::<u8>(),
                TypeTag::of::<f64>(),
                TypeTag::of::<Rc<()>>(),
            ]
        );
        assert_eq!(Rc::strong_count(&shared), 3);

        drop(merged);
        assert_eq!(Rc::strong_count(&shared), 1);
    }

    #[test]
    fn none_wrapper_gets_unmatchable_tag() {
        let list = empty_arg_list() | RawObjectWrapper::none();

        assert_eq!(list.len(), 1);
        assert!(list.pointers()[0].is_null());
        assert_eq!(list.type_tags()[0], TypeTag::none());
    }
}

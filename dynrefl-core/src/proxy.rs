use std::{
    any::Any,
    cell::UnsafeCell,
    fmt::{Debug, Formatter},
    ptr::NonNull,
    rc::Rc,
};

use crate::{RawObjectWrapper, TypeTag};

/// Type-erased value returned by invocation
///
/// Value is moved into reference-counted heap storage, proxy remembers its [`TypeTag`]
/// and size. The storage is freed when the last handle to it is gone: the proxy itself,
/// its [duplicates](ReturnValueProxy::duplicate) or [retained](ReturnValueProxy::duplicate_inner)
/// handles.
///
/// Raw addresses handed out by [`ReturnValueProxy::get_raw`] stay valid only while some handle
/// is alive. Overwriting a binding that holds the last handle frees the value, so retain a handle
/// in [`PhantomDataHelper`] first if the address is still needed:
///
/// ```
/// use dynrefl_core::{PhantomDataHelper, ReturnValueProxy};
///
/// let mut phantom = PhantomDataHelper::new();
///
/// let mut proxy = ReturnValueProxy::new(String::from("first"));
/// let first = proxy.get_raw();
///
/// phantom.retain(&proxy);
/// proxy = ReturnValueProxy::new(String::from("second"));
///
/// // still alive thanks to the retained handle
/// assert_eq!(unsafe { &*(first as *const String) }, "first");
/// assert_eq!(proxy.get::<String>().unwrap(), "second");
/// ```
pub struct ReturnValueProxy {
    value: Rc<dyn Any>,
    ptr: NonNull<()>,
    size: usize,
    tag: TypeTag,
}

impl ReturnValueProxy {
    /// Moves `value` into shared storage
    pub fn new<T: 'static>(value: T) -> Self {
        let cell = Rc::new(UnsafeCell::new(value));
        let ptr = NonNull::from(&*cell).cast::<()>();

        Self {
            value: cell,
            ptr,
            size: std::mem::size_of::<T>(),
            tag: TypeTag::of::<T>(),
        }
    }

    /// Proxy of callables returning nothing
    pub fn void() -> Self {
        Self::new(())
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn is_void(&self) -> bool {
        self.tag.is::<()>()
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// Size of the boxed value in bytes
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn is_type<T: 'static>(&self) -> bool {
        self.tag.is::<T>()
    }

    /// Copies the boxed value out, [`None`] if `T` is not the boxed type
    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        if !self.is_type::<T>() {
            return None;
        }

        // SAFETY: tag matched and storage is alive while `self` is
        Some(unsafe { &*self.ptr.cast::<T>().as_ptr() }.clone())
    }

    /// Moves the boxed value out if `T` matches and this proxy is the only handle
    ///
    /// Otherwise proxy is given back unchanged
    pub fn try_take<T: 'static>(self) -> Result<T, Self> {
        if !self.is_type::<T>() || Rc::strong_count(&self.value) != 1 {
            return Err(self);
        }

        let Self {
            value,
            ptr,
            size,
            tag,
        } = self;

        match value.downcast::<UnsafeCell<T>>() {
            Ok(cell) => match Rc::try_unwrap(cell) {
                Ok(cell) => Ok(cell.into_inner()),
                Err(cell) => Err(Self {
                    value: cell,
                    ptr,
                    size,
                    tag,
                }),
            },
            Err(value) => Err(Self {
                value,
                ptr,
                size,
                tag,
            }),
        }
    }

    /// Untyped address of the boxed value
    ///
    /// Valid for as long as at least one handle of this value is alive
    #[inline(always)]
    pub fn get_raw(&self) -> *mut () {
        self.ptr.as_ptr()
    }

    /// Another proxy sharing the same value
    #[inline(always)]
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Bare shared handle of the value, to be kept in [`PhantomDataHelper`]
    pub fn duplicate_inner(&self) -> RetainedValue {
        RetainedValue {
            _value: self.value.clone(),
            tag: self.tag,
        }
    }

    /// Non-owning view of the boxed value
    pub fn to_wrapped(&self) -> RawObjectWrapper<'_> {
        // SAFETY: storage is alive for the borrow of `self`, the value lives in an `UnsafeCell`
        unsafe { RawObjectWrapper::from_parts(self.ptr, self.tag, false) }
    }

    /// Number of live handles, including this proxy
    #[inline(always)]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.value)
    }
}

impl Clone for ReturnValueProxy {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            ptr: self.ptr,
            size: self.size,
            tag: self.tag,
        }
    }
}

impl Debug for ReturnValueProxy {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ReturnValueProxy")
            .field("type", &self.tag)
            .field("size", &self.size)
            .field("handles", &self.handle_count())
            .finish()
    }
}

/// Extra handle of a [`ReturnValueProxy`] value, extending its lifetime
pub struct RetainedValue {
    // only held, dropping it releases the value
    _value: Rc<dyn Any>,
    tag: TypeTag,
}

impl RetainedValue {
    #[allow(missing_docs)]
    #[inline(always)]
    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }
}

impl Debug for RetainedValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.debug_tuple("RetainedValue").field(&self.tag).finish()
    }
}

/// Stack of retained handles
///
/// Keeps values alive while proxy bindings holding them get reused.
/// Dropping the helper releases everything, last retained first
#[derive(Debug, Default)]
pub struct PhantomDataHelper {
    retained: Vec<RetainedValue>,
}

impl PhantomDataHelper {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(missing_docs)]
    pub fn push(&mut self, value: RetainedValue) {
        self.retained.push(value);
    }

    /// Retains a handle of the value behind `proxy`
    pub fn retain(&mut self, proxy: &ReturnValueProxy) {
        self.push(proxy.duplicate_inner());
    }

    /// Gives back the most recently retained handle
    pub fn release(&mut self) -> Option<RetainedValue> {
        self.retained.pop()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Releases every retained handle
    pub fn clear(&mut self) {
        while self.retained.pop().is_some() {}
    }
}

impl Drop for PhantomDataHelper {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Noisy<'a>(&'static str, &'a RefCell<Vec<&'static str>>);

    impl Drop for Noisy<'_> {
        fn drop(&mut self) {
            self.1.borrow_mut().push(self.0);
        }
    }

    #[test]
    fn proxy_handles_are_counted() {
        let proxy = ReturnValueProxy::new(5u64);
        assert_eq!(proxy.handle_count(), 1);
        assert_eq!(proxy.size(), 8);

        let duplicate = proxy.duplicate();
        assert_eq!(proxy.handle_count(), 2);
        assert_eq!(duplicate.get::<u64>(), Some(5));
        assert_eq!(duplicate.get::<u32>(), None);

        let proxy = proxy.try_take::<u64>().unwrap_err();
        drop(duplicate);
        assert_eq!(proxy.try_take::<u64>().unwrap(), 5);
    }

    #[test]
    fn phantom_releases_in_reverse() {
        let log: &'static RefCell<Vec<&'static str>> = Box::leak(Box::new(RefCell::new(Vec::new())));
        let mut phantom = PhantomDataHelper::new();

        let mut proxy = ReturnValueProxy::new(Noisy("first", log));
        phantom.retain(&proxy);
        proxy = ReturnValueProxy::new(Noisy("second", log));
        phantom.retain(&proxy);
        proxy = ReturnValueProxy::void();

        assert!(log.borrow().is_empty());
        assert!(proxy.is_void());
        assert_eq!(phantom.len(), 2);

        drop(phantom);
        assert_eq!(*log.borrow(), ["second", "first"]);
    }
}

use std::fmt::{Debug, Formatter};

use crate::{
    signature::{Function, Method, Thunk},
    ReturnValueProxy, TypeTag,
};

/// Registered method or free function, one entry of an overload set
///
/// Signature is kept as tags: return type, parent (registering type for methods,
/// [`None`] for free functions) and ordered parameter types. Overload resolution compares
/// them exactly, without any conversions.
pub struct CallableWrapper {
    return_type: TypeTag,
    parent_type: Option<TypeTag>,
    arg_types: Vec<TypeTag>,
    is_const: bool,
    thunk: Thunk,
}

impl CallableWrapper {
    pub(crate) fn from_method<C, M, Marker>(method: M) -> Self
    where
        C: 'static,
        M: Method<C, Marker>,
    {
        Self {
            return_type: M::return_type(),
            parent_type: Some(TypeTag::of::<C>()),
            arg_types: M::arg_types(),
            is_const: M::IS_CONST,
            thunk: method.into_thunk(),
        }
    }

    pub(crate) fn from_function<F, Marker>(function: F) -> Self
    where
        F: Function<Marker>,
    {
        Self {
            return_type: F::return_type(),
            parent_type: None,
            arg_types: F::arg_types(),
            is_const: false,
            thunk: function.into_thunk(),
        }
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn return_type(&self) -> TypeTag {
        self.return_type
    }

    /// Type the method was registered for, [`None`] for free functions
    #[inline(always)]
    pub fn parent_type(&self) -> Option<TypeTag> {
        self.parent_type
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn arg_types(&self) -> &[TypeTag] {
        &self.arg_types
    }

    /// Whether method takes its receiver by shared reference
    ///
    /// Always false for free functions
    #[inline(always)]
    pub fn is_const(&self) -> bool {
        self.is_const
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn is_free(&self) -> bool {
        self.parent_type.is_none()
    }

    /// Checks if parameter tags are exactly `arg_types`
    #[inline]
    pub fn accepts(&self, arg_types: &[TypeTag]) -> bool {
        self.arg_types == arg_types
    }

    /// Checks complete signature: return type, parent and parameters
    pub fn matches(
        &self,
        return_type: TypeTag,
        parent_type: Option<TypeTag>,
        arg_types: &[TypeTag],
    ) -> bool {
        self.return_type == return_type && self.parent_type == parent_type && self.accepts(arg_types)
    }

    /// Calls the wrapped callable
    ///
    /// Returns [`None`] if the number of arguments is wrong.
    ///
    /// # Safety
    ///
    /// For methods `object` must point to a live value of [`parent_type`](Self::parent_type),
    /// exclusively borrowed for the call unless the method [is const](Self::is_const).
    /// Every argument pointer must point to a live value of the corresponding
    /// [`arg_types`](Self::arg_types) entry.
    pub unsafe fn invoke(&self, object: *mut (), args: &[*mut ()]) -> Option<ReturnValueProxy> {
        (self.thunk)(object, args)
    }
}

impl Debug for CallableWrapper {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CallableWrapper")
            .field("return_type", &self.return_type)
            .field("parent_type", &self.parent_type)
            .field("arg_types", &self.arg_types)
            .field("is_const", &self.is_const)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(i32);

    #[test]
    fn thunk_checks_argument_count() {
        let add = CallableWrapper::from_method::<Counter, _, _>(|counter: &mut Counter, by: i32| {
            counter.0 += by;
            counter.0
        });

        assert!(!add.is_const());
        assert_eq!(add.parent_type(), Some(TypeTag::of::<Counter>()));
        assert!(add.matches(
            TypeTag::of::<i32>(),
            Some(TypeTag::of::<Counter>()),
            &[TypeTag::of::<i32>()],
        ));

        let mut counter = Counter(1);
        let mut by = 4i32;
        let object = &mut counter as *mut Counter as *mut ();

        assert!(unsafe { add.invoke(object, &[]) }.is_none());
        assert_eq!(counter.0, 1);

        let result = unsafe { add.invoke(object, &[&mut by as *mut i32 as *mut ()]) };
        assert_eq!(result.and_then(|proxy| proxy.get::<i32>()), Some(5));
        assert_eq!(counter.0, 5);
    }

    #[test]
    fn free_functions_have_no_parent() {
        let answer = CallableWrapper::from_function::<_, (u8, ())>(|| 42u8);

        assert!(answer.is_free());
        assert!(answer.matches(TypeTag::of::<u8>(), None, &[]));
        assert!(!answer.matches(TypeTag::of::<u8>(), Some(TypeTag::of::<Counter>()), &[]));
    }
}

//! Compile-time decomposition of callables
//!
//! Registration never asks for types spelled out: [`Method`] and [`Function`] are implemented
//! for every closure or function item of supported arity, and expose the receiver kind,
//! return type and parameter types as [`TypeTag`]s together with a type-erased thunk.
//!
//! Marker parameter of both traits encodes the signature, e.g. a method
//! `fn(&mut C, f32, i32) -> f32` implements `Method<C, (MutReceiver, f32, (f32, i32))>`.
//! Naming the marker explicitly is how overloads with otherwise ambiguous closures are
//! disambiguated.
//!
//! Parameters taken by reference are marked with [`ByRef`]: `fn(&C, &Vector, f32)` implements
//! `Method<C, (ConstReceiver, R, (ByRef<Vector>, f32))>`. Such parameter is registered under
//! the tag of `Vector` itself, so it accepts the same arguments a by-value `Vector` would.

use std::marker::PhantomData;

use paste::paste;

use crate::{ArgList, ReturnValueProxy, TypeTag};

/// Uniform shape of every registered callable
///
/// Receives the object address (null for free functions) and argument addresses.
/// Returns [`None`] if the argument count is not the one of the wrapped callable
pub(crate) type Thunk = Box<dyn Fn(*mut (), &[*mut ()]) -> Option<ReturnValueProxy>>;

/// Marker of methods taking `&self`
pub struct ConstReceiver;

/// Marker of methods taking `&mut self`
pub struct MutReceiver;

/// Marker of a parameter taken as `&A`
///
/// A reference parameter also fits a by-value parameter of type `&A`, so registration of
/// callables with reference parameters names the signature:
///
/// ```
/// use dynrefl_core::{ByRef, ReflectionRegistry};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Meters(f32);
///
/// fn sum(lhs: &Meters, rhs: &Meters) -> Meters {
///     Meters(lhs.0 + rhs.0)
/// }
///
/// let mut registry = ReflectionRegistry::new();
/// let reflection = registry
///     .make_reflection::<Meters>()
///     .register_function::<Meters, (ByRef<Meters>, ByRef<Meters>), _>("sum", sum)
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     reflection.invoke_function::<Meters>("sum", (Meters(1.0), Meters(2.0))),
///     Ok(Meters(3.0))
/// );
/// ```
///
/// Never `Clone`, which keeps it apart from by-value parameters
pub struct ByRef<A>(PhantomData<A>);

/// Callable usable as a method of `C`
///
/// Implemented for `Fn(&C, A0, .., An) -> R` (const methods) and `Fn(&mut C, A0, .., An) -> R`
/// for up to 8 parameters, each taken by value or by reference. By-value parameters must be
/// `Clone`: invocation clones them out of the argument list. Methods taking `&mut C` clone
/// reference parameters too, since arguments may point into the object.
pub trait Method<C, Marker>: Sized + 'static {
    /// Whether receiver is `&C`
    const IS_CONST: bool;

    #[allow(missing_docs)]
    fn return_type() -> TypeTag;

    #[allow(missing_docs)]
    fn arg_types() -> Vec<TypeTag>;

    #[doc(hidden)]
    fn into_thunk(self) -> Thunk;
}

/// Callable usable as a free function
///
/// Implemented for `Fn(A0, .., An) -> R` for up to 8 parameters, each taken by value
/// or by reference
pub trait Function<Marker>: Sized + 'static {
    #[allow(missing_docs)]
    fn return_type() -> TypeTag;

    #[allow(missing_docs)]
    fn arg_types() -> Vec<TypeTag>;

    #[doc(hidden)]
    fn into_thunk(self) -> Thunk;
}

/// Tuple of statically typed arguments, used by typed invocation
pub trait ArgTypes: 'static {
    /// Tags of tuple elements, in order
    fn type_tags() -> Vec<TypeTag>;

    /// Moves elements into an owned [`ArgList`]
    fn into_arg_list(self) -> ArgList<'static>;
}

macro_rules! param_marker {
    (value $A:ident) => { $A };
    (borrow $A:ident) => { ByRef<$A> };
}

macro_rules! param_type {
    (value $A:ident) => { $A };
    (borrow $A:ident) => { &$A };
}

/// Argument as passed to const methods and functions, references point into the list
macro_rules! fetch_shared {
    (value $A:ident, $ptr:expr) => { (*($ptr as *const $A)).clone() };
    (borrow $A:ident, $ptr:expr) => { &*($ptr as *const $A) };
}

/// Argument as passed to mutable methods, references point to a copy
macro_rules! pass_owned {
    (value $value:ident) => { $value };
    (borrow $value:ident) => { &$value };
}

macro_rules! impl_signature_modes {
    (@expand [$($done:tt)*] [($A:ident, $a:ident) $($rest:tt)*]) => {
        impl_signature_modes!(@expand [$($done)* (value $A $a [Clone + 'static])] [$($rest)*]);
        impl_signature_modes!(@expand [$($done)* (borrow $A $a ['static])] [$($rest)*]);
    };

    (@expand [$(($mode:ident $A:ident $a:ident [$($bound:tt)*]))*] []) => {
        impl<C, R, F, $($A),*> Method<C, (ConstReceiver, R, ($(param_marker!($mode $A),)*))> for F
        where
            C: 'static,
            R: 'static,
            F: Fn(&C $(, param_type!($mode $A))*) -> R + 'static,
            $($A: $($bound)*,)*
        {
            const IS_CONST: bool = true;

            fn return_type() -> TypeTag {
                TypeTag::of::<R>()
            }

            fn arg_types() -> Vec<TypeTag> {
                vec![$(TypeTag::of::<$A>()),*]
            }

            fn into_thunk(self) -> Thunk {
                let callable = self;

                Box::new(move |object: *mut (), args: &[*mut ()]| {
                    let &[$($a),*] = args else {
                        return None;
                    };

                    // SAFETY: callers pass object of type `C` and arguments
                    // whose tags matched `arg_types`
                    $(let $a = unsafe { fetch_shared!($mode $A, $a) };)*
                    let object = unsafe { &*(object as *const C) };

                    Some(ReturnValueProxy::new(callable(object $(, $a)*)))
                })
            }
        }

        impl<C, R, F, $($A),*> Method<C, (MutReceiver, R, ($(param_marker!($mode $A),)*))> for F
        where
            C: 'static,
            R: 'static,
            F: Fn(&mut C $(, param_type!($mode $A))*) -> R + 'static,
            $($A: Clone + 'static,)*
        {
            const IS_CONST: bool = false;

            fn return_type() -> TypeTag {
                TypeTag::of::<R>()
            }

            fn arg_types() -> Vec<TypeTag> {
                vec![$(TypeTag::of::<$A>()),*]
            }

            fn into_thunk(self) -> Thunk {
                let callable = self;

                Box::new(move |object: *mut (), args: &[*mut ()]| {
                    let &[$($a),*] = args else {
                        return None;
                    };

                    // SAFETY: callers pass exclusively borrowed object of type `C`
                    // and arguments whose tags matched `arg_types`. Arguments may point
                    // into the object, so they are copied out before it is borrowed
                    $(let $a = unsafe { (*($a as *const $A)).clone() };)*
                    let object = unsafe { &mut *(object as *mut C) };

                    Some(ReturnValueProxy::new(callable(object $(, pass_owned!($mode $a))*)))
                })
            }
        }

        impl<R, F, $($A),*> Function<(R, ($(param_marker!($mode $A),)*))> for F
        where
            R: 'static,
            F: Fn($(param_type!($mode $A)),*) -> R + 'static,
            $($A: $($bound)*,)*
        {
            fn return_type() -> TypeTag {
                TypeTag::of::<R>()
            }

            fn arg_types() -> Vec<TypeTag> {
                vec![$(TypeTag::of::<$A>()),*]
            }

            fn into_thunk(self) -> Thunk {
                let callable = self;

                Box::new(move |_object: *mut (), args: &[*mut ()]| {
                    let &[$($a),*] = args else {
                        return None;
                    };

                    // SAFETY: callers pass arguments whose tags matched `arg_types`,
                    // alive for the duration of the call
                    $(let $a = unsafe { fetch_shared!($mode $A, $a) };)*

                    Some(ReturnValueProxy::new(callable($($a),*)))
                })
            }
        }
    };
}

macro_rules! impl_signatures {
    ($($A:ident),*) => {
        paste! {
            impl_signature_modes!(@expand [] [$(($A, [<$A:lower>]))*]);

            impl<$($A),*> ArgTypes for ($($A,)*)
            where
                $($A: 'static,)*
            {
                fn type_tags() -> Vec<TypeTag> {
                    vec![$(TypeTag::of::<$A>()),*]
                }

                fn into_arg_list(self) -> ArgList<'static> {
                    let ($([<$A:lower>],)*) = self;
                    ArgList::new()$(.push([<$A:lower>]))*
                }
            }
        }
    };
}

impl_signatures!();
impl_signatures!(A0);
impl_signatures!(A0, A1);
impl_signatures!(A0, A1, A2);
impl_signatures!(A0, A1, A2, A3);
impl_signatures!(A0, A1, A2, A3, A4);
impl_signatures!(A0, A1, A2, A3, A4, A5);
impl_signatures!(A0, A1, A2, A3, A4, A5, A6);
impl_signatures!(A0, A1, A2, A3, A4, A5, A6, A7);

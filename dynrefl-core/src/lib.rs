//! Runtime reflection core
//!
//! Types are registered once, through [`ReflectionRegistry::make_reflection`]: named data
//! members (as offsets inside the type), named methods and free functions (as type-erased
//! thunks, several per name forming an overload set), declared bases and arbitrary metadata.
//! Afterwards everything is reachable by name, either through typed calls that check
//! the requested types against the registered ones, or through fully type-erased
//! [`RawObjectWrapper`]s, [`ArgList`]s and [`ReturnValueProxy`]s.
//!
//! Every access is gated by a [`TypeTag`] comparison, mismatches are reported,
//! never reinterpreted.
#![deny(missing_docs)]

mod args;
mod callable;
mod error;
mod member;
mod proxy;
mod reflection;
mod registry;
mod signature;
mod type_tag;
mod wrapper;

pub use args::{empty_arg_list, merge_arg_list, ArgList};
pub use callable::CallableWrapper;
pub use error::{Error, MemberAccessError, MetadataError, MethodNotFound, RegistryError};
pub use member::{Member, MemberDescriptor};
pub use proxy::{PhantomDataHelper, RetainedValue, ReturnValueProxy};
pub use reflection::{BaseLink, Reflect, ReflectionBase, ReflectionBuilder};
pub use registry::ReflectionRegistry;
pub use signature::{ArgTypes, ByRef, ConstReceiver, Function, Method, MutReceiver};
pub use type_tag::TypeTag;
pub use wrapper::{wrap_object, RawObjectWrapper};

use std::{
    any::Any,
    collections::HashMap,
    fmt::{Debug, Formatter},
    marker::PhantomData,
    ptr::NonNull,
    rc::Rc,
};

use crate::{
    signature::{ArgTypes, Function, Method},
    ArgList, CallableWrapper, Member, MemberAccessError, MemberDescriptor, MetadataError,
    MethodNotFound, RawObjectWrapper, ReflectionRegistry, RegistryError, ReturnValueProxy, TypeTag,
};

/// Types that know how to register their own members
///
/// Usually derived with `#[derive(Reflect)]`, used by
/// [`ReflectionBuilder::register_reflected_members`]
pub trait Reflect: Sized + 'static {
    #[allow(missing_docs)]
    fn register_members(builder: ReflectionBuilder<'_, Self>) -> ReflectionBuilder<'_, Self>;
}

/// Declared base of a reflected type: embedded field holding the base value
pub struct BaseLink {
    offset: usize,
    reflection: Rc<ReflectionBase>,
}

impl BaseLink {
    /// Offset of the base field inside the derived type
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[allow(missing_docs)]
    #[inline(always)]
    pub fn reflection(&self) -> &ReflectionBase {
        &self.reflection
    }
}

impl Debug for BaseLink {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BaseLink")
            .field("offset", &self.offset)
            .field("type", &self.reflection.type_tag)
            .finish()
    }
}

struct MetadataValue {
    tag: TypeTag,
    value: Box<dyn Any>,
}

/// What kind of overloads a lookup accepts
#[derive(Clone, Copy)]
enum CallKind {
    Method { const_only: bool },
    Function,
}

/// Run-time description of a single registered type
///
/// Holds named members, overload sets of methods and free functions, metadata and
/// declared bases. Built once with [`ReflectionBuilder`], immutable afterwards.
///
/// Names that are not registered locally are looked up in the declared bases,
/// in declaration order. Metadata is never delegated.
pub struct ReflectionBase {
    type_tag: TypeTag,
    members: HashMap<String, Member>,
    callables: HashMap<String, Vec<CallableWrapper>>,
    metadata: HashMap<String, MetadataValue>,
    bases: Vec<BaseLink>,
}

impl ReflectionBase {
    pub(crate) fn new(type_tag: TypeTag) -> Self {
        Self {
            type_tag,
            members: HashMap::new(),
            callables: HashMap::new(),
            metadata: HashMap::new(),
            bases: Vec::new(),
        }
    }

    /// Tag of the reflected type
    #[inline(always)]
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Declared bases, in declaration order
    #[inline(always)]
    pub fn bases(&self) -> &[BaseLink] {
        &self.bases
    }

    /// Members registered by this type itself
    #[inline(always)]
    pub fn get_member_map(&self) -> &HashMap<String, Member> {
        &self.members
    }

    /// Overload sets registered by this type itself
    #[inline(always)]
    pub fn get_callable_map(&self) -> &HashMap<String, Vec<CallableWrapper>> {
        &self.callables
    }

    /// Checks if member is reachable, locally or through bases
    pub fn has_member(&self, name: &str) -> bool {
        self.find_member(name).is_some()
    }

    /// Checks if overload set is reachable, locally or through bases
    pub fn has_callable(&self, name: &str) -> bool {
        self.find_overloads(name).is_some()
    }

    /// Member together with its offset from the start of the reflected type
    pub fn find_member(&self, name: &str) -> Option<(usize, &Member)> {
        if let Some(member) = self.members.get(name) {
            return Some((member.offset(), member));
        }

        self.bases.iter().find_map(|base| {
            base.reflection
                .find_member(name)
                .map(|(offset, member)| (base.offset + offset, member))
        })
    }

    fn find_overloads(&self, name: &str) -> Option<&[CallableWrapper]> {
        if let Some(overloads) = self.callables.get(name) {
            return Some(overloads);
        }

        self.bases
            .iter()
            .find_map(|base| base.reflection.find_overloads(name))
    }

    /// Typed mutable access to a member of `object`
    ///
    /// Returns [`None`] if `object` is not of the reflected type, the member is missing,
    /// `T` is not the member type, or the member is const.
    ///
    /// ```
    /// use dynrefl_core::{member, ReflectionRegistry};
    ///
    /// struct Vector {
    ///     x: f32,
    /// }
    ///
    /// let mut registry = ReflectionRegistry::new();
    /// let reflection = registry
    ///     .make_reflection::<Vector>()
    ///     .register_member("x", member!(Vector, x))
    ///     .build()
    ///     .unwrap();
    ///
    /// let mut vector = Vector { x: 1.0 };
    ///
    /// *reflection.get_member_ref::<f32>(&mut vector, "x").unwrap() = 10.0;
    /// assert_eq!(vector.x, 10.0);
    /// assert!(reflection.get_member_ref::<i32>(&mut vector, "x").is_none());
    /// ```
    pub fn get_member_ref<'o, T: 'static>(
        &self,
        object: &'o mut impl Any,
        name: &str,
    ) -> Option<&'o mut T> {
        if TypeTag::of_val(&*object) != self.type_tag {
            return None;
        }

        let (offset, member) = self.find_member(name)?;

        if member.is_const() || !member.type_tag().is::<T>() {
            return None;
        }

        // SAFETY: `object` is of the reflected type, member of type `T` lies at `offset`,
        // and the exclusive borrow of `object` covers it
        Some(unsafe { &mut *member_ptr(object as *mut _ as *mut (), offset).cast::<T>() })
    }

    /// Typed read-only access to a member of `object`, const members included
    ///
    /// Returns [`None`] if `object` is not of the reflected type, the member is missing,
    /// or `T` is not the member type
    pub fn get_const_member_ref<'o, T: 'static>(
        &self,
        object: &'o impl Any,
        name: &str,
    ) -> Option<&'o T> {
        if TypeTag::of_val(object) != self.type_tag {
            return None;
        }

        let (offset, member) = self.find_member(name)?;

        if !member.type_tag().is::<T>() {
            return None;
        }

        // SAFETY: same as in `get_member_ref`, shared borrow of `object` covers the member
        Some(unsafe { &*member_ptr(object as *const _ as *mut (), offset).cast::<T>() })
    }

    /// Type-erased view of a member of the wrapped object
    ///
    /// Gives the "none" wrapper if the object is "none", is not of the reflected type,
    /// or the member is missing. Const members and members of read-only objects
    /// are returned as read-only views.
    pub fn get_member_wrapped<'a>(
        &self,
        object: &RawObjectWrapper<'a>,
        name: &str,
    ) -> RawObjectWrapper<'a> {
        let Some(ptr) = object.non_null() else {
            return RawObjectWrapper::none();
        };

        if object.match_tag() != self.type_tag {
            return RawObjectWrapper::none();
        }

        let Some((offset, member)) = self.find_member(name) else {
            return RawObjectWrapper::none();
        };

        let is_const = object.is_const() || member.is_const();

        // SAFETY: pointee is of the reflected type, so a value of the member type lies at `offset`
        unsafe {
            let ptr = NonNull::new_unchecked(member_ptr(ptr.as_ptr(), offset));
            RawObjectWrapper::from_parts(ptr, member.type_tag(), is_const)
        }
    }

    /// Assigns a copy of the wrapped value to a member of the wrapped object
    ///
    /// Fails before touching the object if anything doesn't match: object is "none" or read-only,
    /// is not of the reflected type, member is missing or const, value is not of the member type,
    /// or the member was registered without a setter.
    pub fn set_member(
        &self,
        object: &RawObjectWrapper<'_>,
        name: &str,
        value: &RawObjectWrapper<'_>,
    ) -> Result<(), MemberAccessError> {
        let Some(ptr) = object.non_null() else {
            return Err(MemberAccessError::Empty);
        };

        if object.is_const() {
            return Err(MemberAccessError::ReadOnly);
        }

        if object.match_tag() != self.type_tag {
            return Err(MemberAccessError::UnmatchingObject {
                expected: self.type_tag.name(),
                found: object.match_tag().name(),
            });
        }

        let (offset, member) = self.find_member(name).ok_or_else(|| MemberAccessError::NotFound {
            name: name.to_owned(),
        })?;

        if member.is_const() {
            return Err(MemberAccessError::Const {
                name: name.to_owned(),
            });
        }

        let Some(source) = value.non_null() else {
            return Err(MemberAccessError::Empty);
        };

        if value.match_tag() != member.type_tag() {
            return Err(MemberAccessError::UnmatchingType {
                expected: member.type_tag().name(),
                found: value.match_tag().name(),
            });
        }

        let Some(setter) = member.setter() else {
            return Err(MemberAccessError::NotAssignable {
                name: name.to_owned(),
            });
        };

        // SAFETY: target is a member of the member type inside a mutable object,
        // source is a value of the same type
        unsafe { setter(member_ptr(ptr.as_ptr(), offset), source.as_ptr()) };

        Ok(())
    }

    /// Moves `value` into a member of `object`, dropping the previous value
    ///
    /// Works for members registered without a setter too
    pub fn set_member_value<T: 'static>(
        &self,
        object: &mut impl Any,
        name: &str,
        value: T,
    ) -> Result<(), MemberAccessError> {
        let found = TypeTag::of_val(&*object);

        if found != self.type_tag {
            return Err(MemberAccessError::UnmatchingObject {
                expected: self.type_tag.name(),
                found: found.name(),
            });
        }

        let (offset, member) = self.find_member(name).ok_or_else(|| MemberAccessError::NotFound {
            name: name.to_owned(),
        })?;

        if member.is_const() {
            return Err(MemberAccessError::Const {
                name: name.to_owned(),
            });
        }

        if !member.type_tag().is::<T>() {
            return Err(MemberAccessError::UnmatchingType {
                expected: member.type_tag().name(),
                found: std::any::type_name::<T>(),
            });
        }

        // SAFETY: object is of the reflected type and exclusively borrowed,
        // member of type `T` lies at `offset`
        unsafe { *member_ptr(object as *mut _ as *mut (), offset).cast::<T>() = value };

        Ok(())
    }

    /// Whether member is const, false if it is missing
    pub fn is_member_const(&self, name: &str) -> bool {
        self.find_member(name)
            .map_or(false, |(_, member)| member.is_const())
    }

    /// Whether member of type `T` is const
    ///
    /// False if the member is missing or is not of type `T`
    pub fn is_member_const_as<T: 'static>(&self, name: &str) -> bool {
        self.find_member(name)
            .map_or(false, |(_, member)| {
                member.type_tag().is::<T>() && member.is_const()
            })
    }

    /// Whether any method overload under `name` is const
    ///
    /// See [`ReflectionBase::is_overload_const`] to query a particular signature
    pub fn is_method_const(&self, name: &str) -> bool {
        self.find_overloads(name).map_or(false, |overloads| {
            overloads.iter().any(CallableWrapper::is_const)
        })
    }

    /// Const-ness of the method overload taking exactly `arg_types`
    ///
    /// [`None`] if there is no such method overload
    pub fn is_overload_const(&self, name: &str, arg_types: &[TypeTag]) -> Option<bool> {
        self.resolve(name, None, arg_types, CallKind::Method { const_only: false })
            .map(|(_, callable)| callable.is_const())
    }

    /// Calls method `name` on `object` with statically typed arguments
    ///
    /// The overload is chosen by exact match of the return type `R` and argument types.
    /// Missing name, mismatched signature, or `object` of another type all fail with
    /// [`MethodNotFound`], leaving `object` untouched.
    ///
    /// ```
    /// use dynrefl_core::ReflectionRegistry;
    ///
    /// struct Counter {
    ///     value: i32,
    /// }
    ///
    /// let mut registry = ReflectionRegistry::new();
    /// let reflection = registry
    ///     .make_reflection::<Counter>()
    ///     .register_method("add", |counter: &mut Counter, by: i32| {
    ///         counter.value += by;
    ///         counter.value
    ///     })
    ///     .build()
    ///     .unwrap();
    ///
    /// let mut counter = Counter { value: 1 };
    ///
    /// assert_eq!(reflection.invoke_method::<i32>(&mut counter, "add", (2,)), Ok(3));
    /// assert!(reflection.invoke_method::<i64>(&mut counter, "add", (2,)).is_err());
    /// assert_eq!(counter.value, 3);
    /// ```
    pub fn invoke_method<R: 'static>(
        &self,
        object: &mut impl Any,
        name: &str,
        args: impl ArgTypes,
    ) -> Result<R, MethodNotFound> {
        let wrapper = RawObjectWrapper::from_mut(object);

        self.invoke_typed(&wrapper, name, args, CallKind::Method { const_only: false })
    }

    /// Same as [`ReflectionBase::invoke_method`], but only const overloads are considered
    pub fn invoke_const_method<R: 'static>(
        &self,
        object: &impl Any,
        name: &str,
        args: impl ArgTypes,
    ) -> Result<R, MethodNotFound> {
        let wrapper = RawObjectWrapper::from_ref(object);

        self.invoke_typed(&wrapper, name, args, CallKind::Method { const_only: true })
    }

    /// Calls free function `name` with statically typed arguments
    pub fn invoke_function<R: 'static>(
        &self,
        name: &str,
        args: impl ArgTypes,
    ) -> Result<R, MethodNotFound> {
        self.invoke_typed(&RawObjectWrapper::none(), name, args, CallKind::Function)
    }

    /// Calls method `name` on the wrapped object with type-erased arguments
    ///
    /// The first overload whose parameter tags equal the tags of `args` is called,
    /// regardless of its return type. Read-only wrappers only see const overloads.
    pub fn invoke_method_with(
        &self,
        object: &RawObjectWrapper<'_>,
        name: &str,
        args: &ArgList<'_>,
    ) -> Result<ReturnValueProxy, MethodNotFound> {
        if object.is_none() || object.match_tag() != self.type_tag {
            log::trace!(
                "Method \"{name}\" of `{}` called on `{}`",
                self.type_tag,
                object.match_tag(),
            );

            return Err(MethodNotFound::new(name));
        }

        let kind = CallKind::Method {
            const_only: object.is_const(),
        };

        self.invoke_erased(object.as_ptr(), name, args, kind)
    }

    /// Calls free function `name` with type-erased arguments
    pub fn invoke_function_with(
        &self,
        name: &str,
        args: &ArgList<'_>,
    ) -> Result<ReturnValueProxy, MethodNotFound> {
        self.invoke_erased(std::ptr::null_mut(), name, args, CallKind::Function)
    }

    /// Overload is resolved from the static argument types, `args` are only moved
    /// into a list once a match exists
    fn invoke_typed<R: 'static, Args: ArgTypes>(
        &self,
        object: &RawObjectWrapper<'_>,
        name: &str,
        args: Args,
        kind: CallKind,
    ) -> Result<R, MethodNotFound> {
        if let CallKind::Method { .. } = kind {
            if object.match_tag() != self.type_tag {
                log::trace!(
                    "Method \"{name}\" of `{}` called on `{}`",
                    self.type_tag,
                    object.match_tag(),
                );

                return Err(MethodNotFound::new(name));
            }
        }

        let arg_types = Args::type_tags();
        let found = self.resolve(name, Some(TypeTag::of::<R>()), &arg_types, kind);

        let Some((offset, callable)) = found else {
            log::trace!(
                "No overload of \"{name}\" in `{}` accepts {arg_types:?} -> `{}`",
                self.type_tag,
                TypeTag::of::<R>(),
            );

            return Err(MethodNotFound::new(name));
        };

        let args = args.into_arg_list();

        call(name, object.as_ptr(), offset, callable, &args)?
            .try_take::<R>()
            .map_err(|_| MethodNotFound::new(name))
    }

    fn invoke_erased(
        &self,
        object: *mut (),
        name: &str,
        args: &ArgList<'_>,
        kind: CallKind,
    ) -> Result<ReturnValueProxy, MethodNotFound> {
        let Some((offset, callable)) = self.resolve(name, None, args.type_tags(), kind) else {
            log::trace!(
                "No overload of \"{name}\" in `{}` accepts {:?}",
                self.type_tag,
                args.type_tags(),
            );

            return Err(MethodNotFound::new(name));
        };

        call(name, object, offset, callable, args)
    }

    /// Finds the first matching overload, locally or in bases, with the offset of its
    /// receiver inside the reflected type
    fn resolve(
        &self,
        name: &str,
        return_type: Option<TypeTag>,
        arg_types: &[TypeTag],
        kind: CallKind,
    ) -> Option<(usize, &CallableWrapper)> {
        let local = self.callables.get(name).and_then(|overloads| {
            overloads.iter().find(|callable| {
                let kind_matches = match kind {
                    CallKind::Method { const_only } => {
                        callable.parent_type() == Some(self.type_tag)
                            && (!const_only || callable.is_const())
                    }
                    CallKind::Function => callable.is_free(),
                };

                kind_matches
                    && return_type.map_or(true, |tag| tag == callable.return_type())
                    && callable.accepts(arg_types)
            })
        });

        if let Some(callable) = local {
            return Some((0, callable));
        }

        self.bases.iter().find_map(|base| {
            base.reflection
                .resolve(name, return_type, arg_types, kind)
                .map(|(offset, callable)| (base.offset + offset, callable))
        })
    }

    /// Metadata value attached under `key`
    pub fn get_metadata<T: 'static>(&self, key: &str) -> Result<&T, MetadataError> {
        let entry = self.metadata.get(key).ok_or_else(|| MetadataError::NotFound {
            key: key.to_owned(),
        })?;

        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| MetadataError::UnmatchingType {
                key: key.to_owned(),
                expected: std::any::type_name::<T>(),
                found: entry.tag.name(),
            })
    }

    /// Read-only type-erased view of metadata value, "none" wrapper if `key` is missing
    pub fn get_metadata_wrapped(&self, key: &str) -> RawObjectWrapper<'_> {
        match self.metadata.get(key) {
            // SAFETY: boxed value is of type `tag` and lives as long as `self`
            Some(entry) => unsafe {
                RawObjectWrapper::from_parts(NonNull::from(&*entry.value).cast(), entry.tag, true)
            },
            None => RawObjectWrapper::none(),
        }
    }

    #[allow(missing_docs)]
    pub fn has_metadata(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }
}

impl Debug for ReflectionBase {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut metadata = self.metadata.keys().collect::<Vec<_>>();
        metadata.sort();

        formatter
            .debug_struct("ReflectionBase")
            .field("type", &self.type_tag)
            .field("members", &self.members)
            .field("callables", &self.callables)
            .field("metadata", &metadata)
            .field("bases", &self.bases)
            .finish()
    }
}

#[inline(always)]
fn member_ptr(object: *mut (), offset: usize) -> *mut () {
    object.cast::<u8>().wrapping_add(offset).cast()
}

/// Calls overload found by [`ReflectionBase::resolve`] in the reflection of `object`
fn call(
    name: &str,
    object: *mut (),
    offset: usize,
    callable: &CallableWrapper,
    args: &ArgList<'_>,
) -> Result<ReturnValueProxy, MethodNotFound> {
    let object = if callable.is_free() {
        std::ptr::null_mut()
    } else {
        member_ptr(object, offset)
    };

    // SAFETY: for methods the object is of the type the overload was found in
    // (possibly after adjusting by base offset), and argument tags matched exactly
    let result = unsafe { callable.invoke(object, args.pointers()) };

    result.ok_or_else(|| MethodNotFound::new(name))
}

/// Chainable registration of a single type
///
/// Obtained from [`ReflectionRegistry::make_reflection`]. Nothing is visible in the
/// registry until [`ReflectionBuilder::build`] succeeds.
///
/// ```
/// use dynrefl_core::{member, ReflectionRegistry};
///
/// #[derive(Default)]
/// struct Vector {
///     x: f32,
///     y: f32,
/// }
///
/// impl Vector {
///     fn len(&self) -> f32 {
///         (self.x * self.x + self.y * self.y).sqrt()
///     }
/// }
///
/// let mut registry = ReflectionRegistry::new();
///
/// registry
///     .make_reflection::<Vector>()
///     .register_member("x", member!(Vector, x))
///     .register_member("y", member!(Vector, y))
///     .register_method("len", Vector::len)
///     .register_function("new", Vector::default)
///     .attach_metadata("version", 2u32)
///     .named("Vector")
///     .build()
///     .unwrap();
///
/// let reflection = registry.get_reflection_by_name("Vector").unwrap();
/// let mut vector = reflection.invoke_function::<Vector>("new", ()).unwrap();
///
/// reflection.set_member_value(&mut vector, "x", 3.0f32).unwrap();
/// reflection.set_member_value(&mut vector, "y", 4.0f32).unwrap();
///
/// assert_eq!(reflection.invoke_const_method::<f32>(&vector, "len", ()), Ok(5.0));
/// assert_eq!(reflection.get_metadata::<u32>("version"), Ok(&2));
/// ```
pub struct ReflectionBuilder<'r, C> {
    registry: &'r mut ReflectionRegistry,
    reflection: ReflectionBase,
    aliases: Vec<String>,
    failure: Option<RegistryError>,
    _class: PhantomData<fn(C)>,
}

impl<'r, C: 'static> ReflectionBuilder<'r, C> {
    pub(crate) fn new(registry: &'r mut ReflectionRegistry) -> Self {
        Self {
            registry,
            reflection: ReflectionBase::new(TypeTag::of::<C>()),
            aliases: Vec::new(),
            failure: None,
            _class: PhantomData,
        }
    }

    /// Registers data member that can be read, written and assigned from type-erased values
    pub fn register_member<T>(self, name: &str, member: MemberDescriptor<C, T>) -> Self
    where
        T: Clone + 'static,
    {
        self.insert_member(name, member.into_assignable_member())
    }

    /// Registers data member without a setter
    ///
    /// Such member can't be assigned through [`ReflectionBase::set_member`], which is the only
    /// option for non-`Clone` member types
    pub fn register_opaque_member<T: 'static>(
        self,
        name: &str,
        member: MemberDescriptor<C, T>,
    ) -> Self {
        self.insert_member(name, member.into_member(None))
    }

    fn insert_member(mut self, name: &str, member: Member) -> Self {
        log::debug!(
            "Register member \"{name}\": `{}` of `{}`",
            member.type_tag(),
            self.reflection.type_tag,
        );

        self.reflection.members.insert(name.to_owned(), member);
        self
    }

    /// Appends method to the overload set `name`
    ///
    /// Signature is inferred from `method`. When a callable fits several signatures,
    /// name them explicitly: `register_method::<f32, (f32,), _, _>(name, method)`.
    /// Parameters taken by reference always need the explicit form, marked with
    /// [`ByRef`](crate::ByRef): `register_method::<f32, (ByRef<Vector>,), _, _>`.
    pub fn register_method<R, Args, Receiver, M>(self, name: &str, method: M) -> Self
    where
        M: Method<C, (Receiver, R, Args)>,
    {
        self.insert_callable(name, CallableWrapper::from_method::<C, M, _>(method))
    }

    /// Appends free function to the overload set `name`
    ///
    /// Explicit signature form is `register_function::<R, (A0, A1), _>(name, function)`,
    /// with `ByRef<A0>` in place of `A0` for a parameter taken as `&A0`
    pub fn register_function<R, Args, F>(self, name: &str, function: F) -> Self
    where
        F: Function<(R, Args)>,
    {
        self.insert_callable(name, CallableWrapper::from_function::<F, _>(function))
    }

    fn insert_callable(mut self, name: &str, callable: CallableWrapper) -> Self {
        log::debug!(
            "Register {} \"{name}\" of `{}`: {:?} -> `{}`",
            if callable.is_free() { "function" } else { "method" },
            self.reflection.type_tag,
            callable.arg_types(),
            callable.return_type(),
        );

        self.reflection
            .callables
            .entry(name.to_owned())
            .or_default()
            .push(callable);

        self
    }

    /// Declares base type `B` embedded in the field `base`
    ///
    /// `B` must be registered already. Members and callables not found in `C` are then looked
    /// up in `B`, bases declared earlier take precedence.
    pub fn derives_from<B: 'static>(mut self, base: MemberDescriptor<C, B>) -> Self {
        let base_tag = TypeTag::of::<B>();

        match self.registry.shared(base_tag) {
            Some(reflection) => {
                log::debug!(
                    "Register base `{base_tag}` of `{}` at offset {}",
                    self.reflection.type_tag,
                    base.offset(),
                );

                self.reflection.bases.push(BaseLink {
                    offset: base.offset(),
                    reflection,
                });
            }

            None => {
                log::warn!(
                    "`{}` derives from `{base_tag}`, which is not registered",
                    self.reflection.type_tag,
                );

                if self.failure.is_none() {
                    self.failure = Some(RegistryError::BaseNotRegistered {
                        derived: self.reflection.type_tag.name(),
                        base: base_tag.name(),
                    });
                }
            }
        }

        self
    }

    /// Attaches arbitrary value under `key`, replacing the previous one
    pub fn attach_metadata<T: 'static>(mut self, key: &str, value: T) -> Self {
        let tag = TypeTag::of::<T>();

        log::debug!(
            "Attach metadata \"{key}\": `{tag}` to `{}`",
            self.reflection.type_tag,
        );

        self.reflection.metadata.insert(
            key.to_owned(),
            MetadataValue {
                tag,
                value: Box::new(value),
            },
        );

        self
    }

    /// Additional name for [`ReflectionRegistry::get_reflection_by_name`]
    pub fn named(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_owned());
        self
    }

    /// Finishes registration
    ///
    /// Fails if the type is registered already or some declared base was not registered,
    /// the registry is left untouched in both cases
    pub fn build(self) -> Result<&'r ReflectionBase, RegistryError> {
        let Self {
            registry,
            reflection,
            aliases,
            failure,
            ..
        } = self;

        if let Some(failure) = failure {
            return Err(failure);
        }

        registry.insert(reflection, aliases)
    }
}

impl<'r, C: Reflect> ReflectionBuilder<'r, C> {
    /// Registers members described by the [`Reflect`] implementation of `C`
    pub fn register_reflected_members(self) -> Self {
        C::register_members(self)
    }
}

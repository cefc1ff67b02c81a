use std::{
    cell::RefCell,
    collections::{hash_map::Entry, HashMap},
    fmt::{Debug, Formatter},
    rc::Rc,
};

use crate::{Reflect, ReflectionBase, ReflectionBuilder, RegistryError, TypeTag};

/// Table of reflected types
///
/// Maps [`TypeTag`] to the [`ReflectionBase`] of that type, and names to tags.
/// Every type is reachable by its [`type_name`](std::any::type_name) and by the aliases
/// given with [`ReflectionBuilder::named`].
///
/// Registry is meant to be filled once, at startup, then only read. It is a plain value to be
/// passed around; [`ReflectionRegistry::with_global`] offers a per-thread instance for
/// code that can't thread it through.
#[derive(Default)]
pub struct ReflectionRegistry {
    reflections: HashMap<TypeTag, Rc<ReflectionBase>>,
    names: HashMap<String, TypeTag>,
}

thread_local! {
    static GLOBAL: RefCell<ReflectionRegistry> = RefCell::new(ReflectionRegistry::new());
}

impl ReflectionRegistry {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with the registry of the current thread
    ///
    /// # Panics
    ///
    /// If called again from inside `f`
    pub fn with_global<R>(f: impl FnOnce(&mut ReflectionRegistry) -> R) -> R {
        GLOBAL.with(|global| f(&mut global.borrow_mut()))
    }

    /// Starts registration of `C`
    pub fn make_reflection<C: 'static>(&mut self) -> ReflectionBuilder<'_, C> {
        ReflectionBuilder::new(self)
    }

    /// Registers `C` with members described by its [`Reflect`] implementation
    pub fn register<C: Reflect>(&mut self) -> Result<&ReflectionBase, RegistryError> {
        self.make_reflection::<C>()
            .register_reflected_members()
            .build()
    }

    #[allow(missing_docs)]
    pub fn get_reflection(&self, tag: TypeTag) -> Result<&ReflectionBase, RegistryError> {
        self.reflections
            .get(&tag)
            .map(Rc::as_ref)
            .ok_or_else(|| RegistryError::NotFound {
                name: tag.name().to_owned(),
            })
    }

    /// Looks reflection up by type name or alias
    pub fn get_reflection_by_name(&self, name: &str) -> Result<&ReflectionBase, RegistryError> {
        match self.names.get(name) {
            Some(tag) => self.get_reflection(*tag),
            None => Err(RegistryError::NotFound {
                name: name.to_owned(),
            }),
        }
    }

    #[allow(missing_docs)]
    pub fn reflection_of<C: 'static>(&self) -> Result<&ReflectionBase, RegistryError> {
        self.get_reflection(TypeTag::of::<C>())
    }

    #[allow(missing_docs)]
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.reflections.contains_key(&tag)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.reflections.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.reflections.is_empty()
    }

    /// Registered reflections, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &ReflectionBase> + '_ {
        self.reflections.values().map(Rc::as_ref)
    }

    pub(crate) fn shared(&self, tag: TypeTag) -> Option<Rc<ReflectionBase>> {
        self.reflections.get(&tag).cloned()
    }

    pub(crate) fn insert(
        &mut self,
        reflection: ReflectionBase,
        aliases: Vec<String>,
    ) -> Result<&ReflectionBase, RegistryError> {
        let tag = reflection.type_tag();

        if self.reflections.contains_key(&tag) {
            log::warn!("Reflection of `{tag}` is already registered, registration ignored");

            return Err(RegistryError::AlreadyRegistered {
                name: tag.name().to_owned(),
            });
        }

        for name in std::iter::once(tag.name().to_owned()).chain(aliases) {
            match self.names.entry(name) {
                Entry::Vacant(entry) => {
                    entry.insert(tag);
                }

                Entry::Occupied(entry) => {
                    log::warn!(
                        "Name \"{}\" of `{tag}` is already taken by `{}`",
                        entry.key(),
                        entry.get(),
                    );
                }
            }
        }

        log::debug!(
            "Registered reflection of `{tag}`: {} members, {} callables",
            reflection.get_member_map().len(),
            reflection.get_callable_map().len(),
        );

        let reflection = self
            .reflections
            .entry(tag)
            .or_insert_with(|| Rc::new(reflection));

        Ok(&**reflection)
    }
}

impl Debug for ReflectionRegistry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_set()
            .entries(self.reflections.keys())
            .finish()
    }
}

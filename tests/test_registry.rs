use dynrefl::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub retries: u32,
    pub endpoint: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Version(pub u16, pub u16);

fn register_config(registry: &mut ReflectionRegistry) -> Result<&ReflectionBase, RegistryError> {
    registry
        .make_reflection::<Config>()
        .register_member("retries", member!(Config, retries))
        .register_member("endpoint", member!(Config, endpoint))
        .register_function("ctor", Config::default)
        .attach_metadata("version", Version(1, 2))
        .attach_metadata("table", "configs")
        .named("Config")
        .build()
}

#[test]
pub fn test_lookup() {
    let mut registry = ReflectionRegistry::new();
    assert!(registry.is_empty());

    register_config(&mut registry).unwrap();

    assert_eq!(registry.len(), 1);
    assert!(registry.contains(TypeTag::of::<Config>()));

    let by_tag = registry.get_reflection(TypeTag::of::<Config>()).unwrap();
    let by_alias = registry.get_reflection_by_name("Config").unwrap();
    let by_type_name = registry
        .get_reflection_by_name(std::any::type_name::<Config>())
        .unwrap();

    assert!(std::ptr::eq(by_tag, by_alias));
    assert!(std::ptr::eq(by_tag, by_type_name));
    assert_eq!(registry.iter().count(), 1);

    assert_eq!(
        registry.get_reflection(TypeTag::of::<Version>()).map(|_| ()),
        Err(RegistryError::NotFound {
            name: std::any::type_name::<Version>().to_owned()
        })
    );
    assert_eq!(
        registry.get_reflection_by_name("Missing").map(|_| ()),
        Err(RegistryError::NotFound {
            name: "Missing".to_owned()
        })
    );
}

#[test]
pub fn test_duplicate_registration() {
    let mut registry = ReflectionRegistry::new();
    register_config(&mut registry).unwrap();

    let duplicate = registry
        .make_reflection::<Config>()
        .register_member("retries", member!(const Config, retries))
        .build()
        .map(|_| ());

    assert_eq!(
        duplicate,
        Err(RegistryError::AlreadyRegistered {
            name: std::any::type_name::<Config>().to_owned()
        })
    );

    // first registration is left untouched
    let reflection = registry.reflection_of::<Config>().unwrap();
    assert!(!reflection.is_member_const("retries"));
    assert!(reflection.has_callable("ctor"));
    assert_eq!(registry.len(), 1);
}

#[test]
pub fn test_metadata() {
    let mut registry = ReflectionRegistry::new();
    let reflection = register_config(&mut registry).unwrap();

    assert!(reflection.has_metadata("version"));
    assert!(!reflection.has_metadata("author"));

    assert_eq!(reflection.get_metadata::<Version>("version"), Ok(&Version(1, 2)));
    assert_eq!(reflection.get_metadata::<&str>("table"), Ok(&"configs"));

    assert_eq!(
        reflection.get_metadata::<String>("table"),
        Err(MetadataError::UnmatchingType {
            key: "table".into(),
            expected: std::any::type_name::<String>(),
            found: std::any::type_name::<&str>(),
        })
    );
    assert_eq!(
        reflection.get_metadata::<Version>("author"),
        Err(MetadataError::NotFound {
            key: "author".into()
        })
    );

    let wrapped = reflection.get_metadata_wrapped("version");
    assert!(wrapped.is_const());
    assert_eq!(wrapped.deref_into::<Version>(), Ok(Version(1, 2)));
    assert_eq!(wrapped.set_value(Version(0, 0)), Err(MemberAccessError::ReadOnly));
    assert!(reflection.get_metadata_wrapped("author").is_none());

    // metadata is independent of members and callables
    assert!(!reflection.has_member("version"));
    assert!(!reflection.has_callable("version"));
}

fn create_by_name(registry: &ReflectionRegistry, name: &str, retries: u32) -> Result<Config, Error> {
    let reflection = registry.get_reflection_by_name(name)?;

    let mut config = reflection.invoke_function::<Config>("ctor", ())?;
    reflection.set_member_value(&mut config, "retries", retries)?;

    let table = reflection.get_metadata::<&str>("table")?;
    reflection.set_member_value(&mut config, "endpoint", format!("/{table}"))?;

    Ok(config)
}

#[test]
pub fn test_errors_compose() {
    let mut registry = ReflectionRegistry::new();
    register_config(&mut registry).unwrap();

    assert_eq!(
        create_by_name(&registry, "Config", 3),
        Ok(Config {
            retries: 3,
            endpoint: "/configs".into()
        })
    );

    let error = create_by_name(&registry, "Settings", 3).unwrap_err();
    assert!(matches!(error, Error::Registry(RegistryError::NotFound { .. })));
    assert_eq!(error.to_string(), "Reflection of `Settings` is not registered");
}

#[test]
pub fn test_global_registry() {
    ReflectionRegistry::with_global(|registry| {
        register_config(registry).unwrap();
    });

    let retries = ReflectionRegistry::with_global(|registry| {
        let reflection = registry.reflection_of::<Config>().unwrap();
        let mut config = Config::default();

        *reflection.get_member_ref::<u32>(&mut config, "retries").unwrap() = 5;
        config.retries
    });
    assert_eq!(retries, 5);

    // registry is per thread
    let registered_elsewhere = std::thread::spawn(|| {
        ReflectionRegistry::with_global(|registry| registry.contains(TypeTag::of::<Config>()))
    })
    .join()
    .unwrap();
    assert!(!registered_elsewhere);
}

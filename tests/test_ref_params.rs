use dynrefl::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vector) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn scale(&mut self, by: &f32) {
        self.x *= by;
        self.y *= by;
    }
}

pub fn add(lhs: &Vector, rhs: &Vector) -> Vector {
    Vector::new(lhs.x + rhs.x, lhs.y + rhs.y)
}

/// Never cloned, only borrowed by callables
#[derive(Debug, PartialEq)]
pub struct Label(pub String);

fn registry() -> ReflectionRegistry {
    let mut registry = ReflectionRegistry::new();

    registry
        .make_reflection::<Vector>()
        .register_member("x", member!(Vector, x))
        .register_member("y", member!(Vector, y))
        .register_function::<Vector, (ByRef<Vector>, ByRef<Vector>), _>("add", add)
        .register_method::<f32, (ByRef<Vector>,), _, _>("dot", Vector::dot)
        .register_method::<(), (ByRef<f32>,), _, _>("scale", Vector::scale)
        .register_function::<String, (ByRef<Label>, usize), _>(
            "label",
            |label: &Label, count: usize| format!("{}#{count}", label.0),
        )
        .build()
        .unwrap();

    registry
}

#[test]
pub fn test_registered_as_value_types() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector>().unwrap();

    let callables = reflection.get_callable_map();
    assert_eq!(callables["add"][0].arg_types(), [TypeTag::of::<Vector>(); 2]);
    assert_eq!(callables["dot"][0].arg_types(), [TypeTag::of::<Vector>()]);
    assert_eq!(callables["scale"][0].arg_types(), [TypeTag::of::<f32>()]);

    assert_eq!(
        reflection.is_overload_const("dot", &[TypeTag::of::<Vector>()]),
        Some(true)
    );
    assert_eq!(
        reflection.is_overload_const("scale", &[TypeTag::of::<f32>()]),
        Some(false)
    );
}

#[test]
pub fn test_function_typed() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector>().unwrap();

    let sum = reflection.invoke_function::<Vector>(
        "add",
        (Vector::new(1.0, 2.0), Vector::new(10.0, 20.0)),
    );
    assert_eq!(sum, Ok(Vector::new(11.0, 22.0)));

    let label = reflection.invoke_function::<String>("label", (Label("item".into()), 3usize));
    assert_eq!(label.as_deref(), Ok("item#3"));

    assert!(reflection
        .invoke_function::<Vector>("add", (Vector::new(1.0, 2.0),))
        .is_err());
}

#[test]
pub fn test_function_erased() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector>().unwrap();

    let mut lhs = Vector::new(1.0, 1.0);
    let mut rhs = Vector::new(0.5, -1.0);

    {
        let args = ArgList::from_wrappers([wrap_object(&mut lhs), wrap_object(&mut rhs)]);
        let sum = reflection.invoke_function_with("add", &args).unwrap();
        assert_eq!(sum.get::<Vector>(), Some(Vector::new(1.5, 0.0)));
    }

    let label = Label("x".into());
    {
        let args = ArgList::new().push_ref(&label).push(7usize);
        let formatted = reflection.invoke_function_with("label", &args).unwrap();
        assert_eq!(formatted.get::<String>().as_deref(), Some("x#7"));
    }

    // arguments are only borrowed
    assert_eq!(lhs, Vector::new(1.0, 1.0));
    assert_eq!(label, Label("x".into()));
}

#[test]
pub fn test_const_method() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector>().unwrap();

    let vector = Vector::new(2.0, 3.0);

    assert_eq!(
        reflection.invoke_const_method::<f32>(&vector, "dot", (Vector::new(1.0, 1.0),)),
        Ok(5.0)
    );

    let other = Vector::new(-1.0, 1.0);
    let dot = reflection
        .invoke_method_with(
            &RawObjectWrapper::from_ref(&vector),
            "dot",
            &ArgList::new().push_ref(&other),
        )
        .unwrap();
    assert_eq!(dot.get::<f32>(), Some(1.0));
}

#[test]
pub fn test_mut_method_with_own_member() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector>().unwrap();

    let mut vector = Vector::new(2.0, 3.0);

    reflection
        .invoke_method::<()>(&mut vector, "scale", (0.5f32,))
        .unwrap();
    assert_eq!(vector, Vector::new(1.0, 1.5));

    // argument points into the receiver itself
    {
        let object = wrap_object(&mut vector);
        let y = reflection.get_member_wrapped(&object, "y");
        let args = ArgList::from_wrappers([y]);

        reflection.invoke_method_with(&object, "scale", &args).unwrap();
    }
    assert_eq!(vector, Vector::new(1.5, 2.25));
}

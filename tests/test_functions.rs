use std::ops::Add;

use dynrefl::*;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector3<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl Vector3<f32> {
    pub fn len(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl<T: Add<Output = T>> Add for Vector3<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

fn registry() -> ReflectionRegistry {
    let mut registry = ReflectionRegistry::new();

    registry
        .make_reflection::<Vector3<f32>>()
        .register_member("x", member!(Vector3<f32>, x))
        .register_member("y", member!(Vector3<f32>, y))
        .register_member("z", member!(Vector3<f32>, z))
        .register_method("len", Vector3::<f32>::len)
        .register_function::<Vector3<f32>, (ByRef<Vector3<f32>>, ByRef<Vector3<f32>>), _>(
            "operator+",
            |lhs: &Vector3<f32>, rhs: &Vector3<f32>| *lhs + *rhs,
        )
        .register_function::<Vector3<f32>, (f32, f32, f32), _>("ctor", Vector3::<f32>::new)
        .register_function("ctor", Vector3::<f32>::default)
        .build()
        .unwrap();

    registry
        .make_reflection::<Vector3<i64>>()
        .register_member("x", member!(Vector3<i64>, x))
        .register_function("ctor", |x: i64| Vector3::new(x, x, x))
        .build()
        .unwrap();

    registry
}

#[test]
pub fn test_operator_sum() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector3<f32>>().unwrap();

    let result = reflection
        .invoke_function::<Vector3<f32>>(
            "operator+",
            (Vector3::new(1.0f32, 2.0, 3.0), Vector3::new(4.0f32, 5.0, 6.0)),
        )
        .unwrap();

    assert_eq!(result, Vector3::new(5.0, 7.0, 9.0));
}

#[test]
pub fn test_ctor_overloads() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector3<f32>>().unwrap();

    let result = reflection
        .invoke_function::<Vector3<f32>>("ctor", (1.0f32, 2.0f32, 3.0f32))
        .unwrap();
    assert_eq!(result, Vector3::new(1.0, 2.0, 3.0));

    let result = reflection.invoke_function::<Vector3<f32>>("ctor", ()).unwrap();
    assert_eq!(result, Vector3::default());

    assert!(reflection
        .invoke_function::<Vector3<f32>>("ctor", (1i64,))
        .is_err());

    let overloads = &reflection.get_callable_map()["ctor"];
    assert_eq!(overloads.len(), 2);
    assert!(overloads.iter().all(CallableWrapper::is_free));
    assert_eq!(overloads[0].arg_types(), [TypeTag::of::<f32>(); 3]);
    assert!(overloads[1].arg_types().is_empty());
}

#[test]
pub fn test_generic_instances() {
    let registry = registry();

    let floats = registry.reflection_of::<Vector3<f32>>().unwrap();
    let integers = registry.reflection_of::<Vector3<i64>>().unwrap();
    assert_ne!(floats.type_tag(), integers.type_tag());

    let mut vector = integers
        .invoke_function::<Vector3<i64>>("ctor", (2i64,))
        .unwrap();
    assert_eq!(vector, Vector3::new(2, 2, 2));

    assert!(floats.get_member_ref::<f32>(&mut vector, "x").is_none());
    *integers.get_member_ref::<i64>(&mut vector, "x").unwrap() = 5;
    assert_eq!(vector.x, 5);

    let mut vector = Vector3::new(1.0f32, 2.0, 3.0);
    assert_eq!(
        floats
            .invoke_method::<f32>(&mut vector, "len", ())
            .map(f32::round),
        Ok(4.0)
    );
}

#[test]
pub fn test_functions_are_not_methods() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector3<f32>>().unwrap();

    let mut vector = Vector3::new(1.0f32, 2.0, 3.0);

    assert!(reflection
        .invoke_method::<Vector3<f32>>(&mut vector, "ctor", ())
        .is_err());
    assert!(reflection.invoke_function::<f32>("len", ()).is_err());
}

#[test]
pub fn test_function_erased() {
    let registry = registry();
    let reflection = registry.reflection_of::<Vector3<f32>>().unwrap();

    let lhs = Vector3::new(1.0f32, 1.0, 1.0);
    let args = ArgList::new().push_ref(&lhs).push(Vector3::new(0.5f32, 0.5, 0.5));

    let sum = reflection.invoke_function_with("operator+", &args).unwrap();
    assert_eq!(sum.get::<Vector3<f32>>(), Some(Vector3::new(1.5, 1.5, 1.5)));
    assert_eq!(sum.size(), std::mem::size_of::<Vector3<f32>>());

    let created = reflection
        .invoke_function_with("ctor", &args![3.0f32, 2.0f32, 1.0f32])
        .unwrap();
    assert_eq!(created.try_take::<Vector3<f32>>().ok(), Some(Vector3::new(3.0, 2.0, 1.0)));

    assert_eq!(
        reflection
            .invoke_function_with("ctor", &args![3.0f64])
            .unwrap_err(),
        MethodNotFound {
            name: "ctor".into()
        }
    );
}

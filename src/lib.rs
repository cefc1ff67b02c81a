/*!
Run-time reflection of struct members, methods and free functions

Types are registered once, under a [`ReflectionRegistry`], and afterwards their members
can be read and written, and their methods and functions called, knowing only names.
Every access compares [`TypeTag`]s, so a value is never read as a type it is not.

Registration can be written by hand with [`member!`] and the [`ReflectionBuilder`] chain,
or derived for members with [`Reflect`](derive@Reflect) (requires `derive` feature, enabled by default).

# Examples
```
use dynrefl::{args, member, wrap_object, ReflectionRegistry};

struct Vector {
    x: f32,
    y: f32,
    z: f32,
}

impl Vector {
    fn len(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

# fn main() {
let mut registry = ReflectionRegistry::new();

let reflection = registry
    .make_reflection::<Vector>()
    .register_member("x", member!(Vector, x))
    .register_member("y", member!(Vector, y))
    .register_member("z", member!(Vector, z))
    .register_method("len", Vector::len)
    .build()
    .unwrap();

let mut vector = Vector { x: 1.0, y: 2.0, z: 3.0 };

assert_eq!(reflection.invoke_method::<f32>(&mut vector, "len", ()).unwrap().round(), 4.0);

*reflection.get_member_ref::<f32>(&mut vector, "x").unwrap() = 10.0;
assert_eq!(vector.x, 10.0);

let len = reflection
    .invoke_method_with(&wrap_object(&mut vector), "len", &args![])
    .unwrap();
assert!(len.get::<f32>().unwrap() > 10.0);
# }
```
*/

pub use ::dynrefl_core::*;

/// Derive-able implementation of [`Reflect`](trait@Reflect)
///
/// Accepts non-generic structs, every field type must be `Clone`
/// unless the field is marked `#[reflect(opaque)]` or `#[reflect(skip)]`
///
/// ```
/// use dynrefl::{Reflect, ReflectionRegistry};
///
/// #[derive(Reflect, Clone, Default)]
/// #[reflect(name = "Player")]
/// struct Player {
///     name: String,
///     #[reflect(const)]
///     id: u32,
///     #[reflect(rename = "hp")]
///     health: i32,
///     #[reflect(skip)]
///     cache: Vec<u8>,
/// }
///
/// # fn main() {
/// let mut registry = ReflectionRegistry::new();
/// let reflection = registry.register::<Player>().unwrap();
///
/// assert!(reflection.is_member_const("id"));
/// assert!(reflection.has_member("hp"));
/// assert!(!reflection.has_member("cache"));
/// # }
/// ```
#[cfg(feature = "derive")]
pub use dynrefl_macros::Reflect;

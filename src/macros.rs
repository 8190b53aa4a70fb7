/// Declares the document schema of a serde record type.
///
/// Lists the type's fields in order with their Rust types, and implements
/// [`Record`](crate::Record) and [`FieldType`](crate::FieldType) for it. Field
/// attributes:
///
/// - `#[title]` renders the field in the heading instead of as a bullet
/// - `#[rename = "Label"]` sets the field's display name
///
/// Field names must match the names serde uses for the struct.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_mdcodec::{record, to_string};
///
/// #[derive(Serialize, Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// record! {
///     Person {
///         #[title]
///         name: String,
///         #[rename = "Age"]
///         age: u32,
///     }
/// }
///
/// let person = Person { name: "Ann".into(), age: 41 };
/// assert_eq!(to_string(&person).unwrap(), "# Ann (Person)\n\n- **Age**: 41\n");
/// ```
#[macro_export]
macro_rules! record {
    (@attr $descriptor:expr, title) => {
        $descriptor.title()
    };

    (@attr $descriptor:expr, rename = $display:literal) => {
        $descriptor.rename($display)
    };

    ($ty:ident { $( $(#[$attr:ident $(= $value:literal)?])* $field:ident : $fty:ty ),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn schema() -> &'static $crate::RecordSchema {
                static SCHEMA: ::std::sync::OnceLock<$crate::RecordSchema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::RecordSchema::new(stringify!($ty))
                    $(
                        .field({
                            let descriptor = $crate::FieldDescriptor::new(
                                stringify!($field),
                                <$fty as $crate::FieldType>::kind(),
                            );
                            $( let descriptor = $crate::record!(@attr descriptor, $attr $(= $value)?); )*
                            descriptor
                        })
                    )*
                })
            }
        }

        impl $crate::FieldType for $ty {
            fn kind() -> $crate::Kind {
                $crate::Kind::Record(<$ty as $crate::Record>::schema)
            }
        }
    };
}

//! `typed_view!` declaration macro.

/// Declares a view type.
///
/// ```
/// use json_view::{typed_view, View};
/// use serde_json::json;
///
/// typed_view! {
///     pub struct Item {
///         id: i64,
///         name: String,
///     }
/// }
///
/// typed_view! {
///     /// A user record.
///     pub struct User {
///         user_id: i64,
///         #[alias = "ID"]
///         internal_id: i64,
///         tags: Vec<String>,
///         best_item: view Item,
///         items: list Item,
///     }
/// }
///
/// let raw = json!({"userId": 1, "ID": 999, "items": [{"id": 10, "name": "Bob"}]});
/// let mut user = User::new(raw.as_object().unwrap().clone());
/// assert_eq!(user.user_id().get().and_then(|v| v.typed()), Some(1));
/// assert_eq!(user.internal_id().get().and_then(|v| v.typed()), Some(999));
/// let items = user.items().lazy().unwrap();
/// assert_eq!(items.view(0).unwrap().name().get().and_then(|v| v.typed()), Some("Bob".to_string()));
/// ```
///
/// Field forms: `name: Type` is a scalar (`Type: Scalar`), `name: view Type`
/// a nested view, `name: list Type` a lazy list of views. `#[alias = "key"]`
/// fixes the wire key. Optional type-level attributes, in this order:
/// `#[strategy(Precompiled | Generic)]` and `#[keys(CamelCase | Verbatim)]`.
#[macro_export]
macro_rules! typed_view {
    (@strategy) => { $crate::AccessorStrategy::Precompiled };
    (@strategy $strategy:ident) => { $crate::AccessorStrategy::$strategy };

    (@keys) => { $crate::KeyConvention::CamelCase };
    (@keys $keys:ident) => { $crate::KeyConvention::$keys };

    (@alias) => { ::std::option::Option::None };
    (@alias $alias:literal) => { ::std::option::Option::Some($alias) };

    (@decl scalar $field:ident [$ty:ty]) => {
        $crate::FieldDecl::scalar(stringify!($field), <$ty as $crate::Scalar>::BASE)
    };
    (@decl model $field:ident [$ty:ty]) => {
        $crate::FieldDecl::model::<$ty>(stringify!($field))
    };
    (@decl list $field:ident [$ty:ty]) => {
        $crate::FieldDecl::list::<$ty>(stringify!($field))
    };

    (@accessor scalar $field:ident [$ty:ty] [$index:expr] [$($doc:expr)*]) => {
        $(#[doc = $doc])*
        pub fn $field(&mut self) -> $crate::ScalarField<'_, $ty> {
            $crate::ScalarField::bind(&mut self.core, $index, stringify!($field))
        }
    };
    (@accessor model $field:ident [$ty:ty] [$index:expr] [$($doc:expr)*]) => {
        $(#[doc = $doc])*
        pub fn $field(&mut self) -> $crate::ModelField<'_, $ty> {
            $crate::ModelField::bind(&mut self.core, $index, stringify!($field))
        }
    };
    (@accessor list $field:ident [$ty:ty] [$index:expr] [$($doc:expr)*]) => {
        $(#[doc = $doc])*
        pub fn $field(&mut self) -> $crate::ListField<'_, $ty> {
            $crate::ListField::bind(&mut self.core, $index, stringify!($field))
        }
    };

    (@munch $header:tt [$($fields:tt)*] [$($idx:tt)*]) => {
        $crate::typed_view!(@emit $header $($fields)*);
    };
    (@munch $header:tt [$($fields:tt)*] [$($idx:tt)*]
        $(#[doc = $fdoc:expr])*
        $(#[alias = $alias:literal])?
        $field:ident : view $ty:ty
        $(, $($rest:tt)*)?
    ) => {
        $crate::typed_view!(@munch $header
            [$($fields)* { model $field [$($alias)?] [$ty] [0 $(+ $idx)*] [$($fdoc)*] }]
            [$($idx)* 1]
            $($($rest)*)?
        );
    };
    (@munch $header:tt [$($fields:tt)*] [$($idx:tt)*]
        $(#[doc = $fdoc:expr])*
        $(#[alias = $alias:literal])?
        $field:ident : list $ty:ty
        $(, $($rest:tt)*)?
    ) => {
        $crate::typed_view!(@munch $header
            [$($fields)* { list $field [$($alias)?] [$ty] [0 $(+ $idx)*] [$($fdoc)*] }]
            [$($idx)* 1]
            $($($rest)*)?
        );
    };
    (@munch $header:tt [$($fields:tt)*] [$($idx:tt)*]
        $(#[doc = $fdoc:expr])*
        $(#[alias = $alias:literal])?
        $field:ident : $ty:ty
        $(, $($rest:tt)*)?
    ) => {
        $crate::typed_view!(@munch $header
            [$($fields)* { scalar $field [$($alias)?] [$ty] [0 $(+ $idx)*] [$($fdoc)*] }]
            [$($idx)* 1]
            $($($rest)*)?
        );
    };

    (@emit { [$($doc:expr)*] [$vis:vis] [$name:ident] [$($strategy:ident)?] [$($keys:ident)?] }
        $({ $kind:ident $field:ident [$($alias:literal)?] [$ty:ty] [$index:expr] [$($fdoc:expr)*] })*
    ) => {
        $(#[doc = $doc])*
        #[derive(Clone)]
        $vis struct $name {
            core: $crate::ViewCore,
        }

        impl $crate::View for $name {
            fn schema() -> &'static $crate::ViewSchema {
                static SCHEMA: ::std::sync::OnceLock<$crate::ViewSchema> = ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::ViewSchema::builder(stringify!($name))
                        .strategy($crate::typed_view!(@strategy $($strategy)?))
                        .keys($crate::typed_view!(@keys $($keys)?))
                        $(
                            .field(
                                $crate::typed_view!(@decl $kind $field [$ty])
                                    .alias_opt($crate::typed_view!(@alias $($alias)?)),
                            )
                        )*
                        .build()
                })
            }

            fn from_core(core: $crate::ViewCore) -> Self {
                Self { core }
            }

            fn core(&self) -> &$crate::ViewCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut $crate::ViewCore {
                &mut self.core
            }

            fn into_core(self) -> $crate::ViewCore {
                self.core
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&$crate::View::to_document(self))
                    .finish()
            }
        }

        impl $name {
            $(
                $crate::typed_view!(@accessor $kind $field [$ty] [$index] [$($fdoc)*]);
            )*
        }
    };

    (
        $(#[doc = $doc:expr])*
        $(#[strategy($strategy:ident)])?
        $(#[keys($keys:ident)])?
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::typed_view!(@munch
            { [$($doc)*] [$vis] [$name] [$($strategy)?] [$($keys)?] }
            []
            []
            $($body)*
        );
    };
}

//! json-view - lazily materialized typed views over decoded JSON documents.
//!
//! A view type declares fields that may live under differently named keys
//! in the document. Nothing is converted up front: each field is
//! materialized into its declared type on first access and cached on the
//! instance, nested views and lists of views are built on demand, and
//! export writes only the touched fields back over the untouched raw
//! document.
//!
//! ```
//! use json_view::{typed_view, View};
//!
//! typed_view! {
//!     pub struct User {
//!         user_id: i64,
//!         #[alias = "ID"]
//!         internal_id: i64,
//!     }
//! }
//!
//! let mut user = User::load_json(br#"{"userId": 1, "ID": 999}"#).unwrap();
//! assert_eq!(user.user_id().get().and_then(|v| v.typed()), Some(1));
//! user.internal_id().set(1000);
//! assert_eq!(user.to_json().unwrap(), br#"{"userId":1,"ID":1000}"#.to_vec());
//! ```

pub mod alias;
pub mod bulk;
mod coerce;
mod error;
pub mod list;
mod macros;
pub mod schema;
pub mod view;

pub use alias::KeyConvention;
pub use bulk::BulkLoader;
pub use coerce::{kind_name, BaseType, Coerced, Scalar};
pub use error::ViewError;
pub use list::{AnyList, Element, LazyList, LazySlice};
pub use schema::{
    AccessorStrategy, FieldDecl, FieldDescriptor, FieldKind, ViewSchema, ViewSchemaBuilder,
    ViewType,
};
pub use view::{AnyView, Dynamic, ListField, ListValue, ModelField, ScalarField, View, ViewCore};

pub use json_view_codec::{CodecError, DocumentCodec, JsonCodec};

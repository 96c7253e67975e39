//! Bulk construction and loading.

use std::sync::OnceLock;

use json_view::{
    bulk, typed_view, BaseType, BulkLoader, Coerced, FieldDecl, JsonCodec, View, ViewCore,
    ViewError, ViewSchema,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

typed_view! {
    pub struct Item {
        id: i64,
        name: String,
    }
}

typed_view! {
    pub struct Order {
        order_id: i64,
        items: list Item,
    }
}

/// Records whether its construction hook ran.
#[derive(Clone, Debug)]
struct Hooked {
    core: ViewCore,
}

impl View for Hooked {
    fn schema() -> &'static ViewSchema {
        static SCHEMA: OnceLock<ViewSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            ViewSchema::builder("Hooked")
                .field(FieldDecl::scalar("label", BaseType::Str))
                .build()
        })
    }

    fn from_core(core: ViewCore) -> Self {
        Self { core }
    }

    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn into_core(self) -> ViewCore {
        self.core
    }

    fn on_construct(&mut self) {
        self.raw_mut().insert("initCalled".into(), Value::Bool(true));
    }
}

fn maps(values: Vec<Value>) -> Vec<Map<String, Value>> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        })
        .collect()
}

const ORDERS: &[u8] = br#"[
    {"orderId": 1, "items": [{"id": 10, "name": "pen"}]},
    {"orderId": "2", "items": []},
    {"orderId": 3}
]"#;

#[test]
fn bulk_load_matches_individual_construction() {
    let decoded: Vec<Value> = serde_json::from_slice(ORDERS).unwrap();
    let mut bulk = Order::bulk_load(ORDERS).unwrap();
    let mut single: Vec<Order> = maps(decoded).into_iter().map(Order::new).collect();
    assert_eq!(bulk.len(), 3);

    for (a, b) in bulk.iter_mut().zip(single.iter_mut()) {
        assert_eq!(a.order_id().get(), b.order_id().get());
        let a_items = a.items().lazy().map(|list| list.export());
        let b_items = b.items().lazy().map(|list| list.export());
        assert_eq!(a_items, b_items);
        assert_eq!(a.to_document(), b.to_document());
    }
    assert_eq!(bulk[1].order_id().get(), Some(Coerced::Typed(2)));
}

#[test]
fn bulk_views_start_with_empty_cache() {
    let orders = Order::bulk_load(ORDERS).unwrap();
    assert!(orders.iter().all(|order| order.core().cached_len() == 0));
}

#[test]
fn bulk_construct_wraps_maps() {
    let items = Item::bulk_construct(maps(vec![json!({"id": 1}), json!({"id": 2, "name": "b"})]));
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].to_document(), maps(vec![json!({"id": 2, "name": "b"})])[0]);
}

#[test]
fn bulk_paths_skip_construction_hook() {
    let raw = vec![json!({"label": "a"}), json!({"label": "b"})];

    let built = Hooked::bulk_construct(maps(raw.clone()));
    assert!(built.iter().all(|view| !view.raw().contains_key("initCalled")));

    let loaded: Vec<Hooked> = BulkLoader::json().from_values(raw.clone()).unwrap();
    assert!(loaded.iter().all(|view| !view.raw().contains_key("initCalled")));

    let single = Hooked::load_json(br#"{"label": "c"}"#).unwrap();
    assert!(!single.raw().contains_key("initCalled"));

    let direct = Hooked::new(maps(raw)[0].clone());
    assert_eq!(direct.raw().get("initCalled"), Some(&json!(true)));
}

#[test]
fn top_level_object_is_rejected_by_bulk_load() {
    let err = Order::bulk_load(br#"{"orderId": 1}"#).unwrap_err();
    assert!(matches!(err, ViewError::Document { expected: "array", found: "object" }));
    assert_eq!(err.to_string(), "expected a top-level array, found object");
}

#[test]
fn non_object_item_is_reported_with_index() {
    let err = Order::bulk_load(br#"[{"orderId": 1}, 3, {}]"#).unwrap_err();
    assert!(matches!(err, ViewError::BulkItem { index: 1, found: "number" }));

    let err = bulk::from_values::<Order>(vec![json!({}), json!({}), json!(null)]).unwrap_err();
    assert!(matches!(err, ViewError::BulkItem { index: 2, found: "null" }));
}

#[test]
fn malformed_input_surfaces_decode_error() {
    let err = Order::bulk_load(b"[{\"orderId\": 1,").unwrap_err();
    assert!(err.is_decode());
    assert!(matches!(err, ViewError::Codec(_)));

    let err = Order::load_json(b"not json").unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn load_single_requires_an_object() {
    let err = BulkLoader::json().load_single::<Order>(b"[]").unwrap_err();
    assert!(matches!(err, ViewError::Document { expected: "object", found: "array" }));
    assert!(!err.is_decode());

    let mut order = BulkLoader::json().load_single::<Order>(br#"{"orderId": 9}"#).unwrap();
    assert_eq!(order.order_id().get(), Some(Coerced::Typed(9)));
}

#[test]
fn loader_accepts_a_borrowed_codec() {
    let codec = JsonCodec::pretty();
    let loader = BulkLoader::new(&codec);
    let mut items: Vec<Item> = loader.load(br#"[{"id": 1, "name": "x"}]"#).unwrap();
    assert_eq!(items[0].name().get(), Some(Coerced::Typed("x".to_string())));
    assert!(loader.codec().pretty);
}

#[test]
fn empty_array_loads_no_views() {
    let items = Item::bulk_load(b"[]").unwrap();
    assert!(items.is_empty());
}

//! Precompiled and generic accessors observe and produce the same data.

use json_view::{typed_view, AccessorStrategy, Coerced, View, ViewError};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

typed_view! {
    pub struct Line {
        sku: String,
        qty: i64,
    }
}

typed_view! {
    pub struct FastOrder {
        order_id: i64,
        #[alias = "NOTE"]
        note: String,
        total: f64,
        paid: bool,
        tags: Vec<String>,
        first_line: view Line,
        lines: list Line,
    }
}

typed_view! {
    #[strategy(Generic)]
    pub struct TableOrder {
        order_id: i64,
        #[alias = "NOTE"]
        note: String,
        total: f64,
        paid: bool,
        tags: Vec<String>,
        first_line: view Line,
        lines: list Line,
    }
}

fn document() -> Map<String, Value> {
    match json!({
        "orderId": "17",
        "NOTE": "fragile",
        "total": 12,
        "paid": "yes",
        "tags": ["a"],
        "firstLine": {"sku": "X1", "qty": 2},
        "lines": [{"sku": "X1", "qty": 2}, {"sku": "Y2", "qty": "many"}, 4],
        "untouched": {"keep": [1, 2, 3]}
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Observations made by one pass over an order view.
#[derive(Debug, PartialEq)]
struct Trace {
    order_id: Option<Coerced<i64>>,
    note: Option<Coerced<String>>,
    total: Option<Coerced<f64>>,
    paid: Option<Coerced<bool>>,
    first_sku: Option<Coerced<String>>,
    second_qty: Option<Coerced<i64>>,
    third_is_view: bool,
    cached: Vec<bool>,
    export: Map<String, Value>,
    bytes: Vec<u8>,
}

macro_rules! exercise {
    ($ty:ty) => {{
        let mut order = <$ty>::new(document());
        let order_id = order.order_id().get();
        let note = order.note().get();
        let total = order.total().get();
        let paid = order.paid().get();

        let first_sku = order
            .first_line()
            .get()
            .unwrap()
            .and_then(|line| line.sku().get());
        let first: *const Line = order.first_line().get().unwrap().unwrap();
        let again: *const Line = order.first_line().get().unwrap().unwrap();
        assert!(std::ptr::eq(first, again));

        let lines = order.lines().lazy().unwrap();
        let second_qty = lines.view(1).and_then(|line| line.qty().get());
        let third_is_view = lines.view(2).is_some();
        lines.view(0).unwrap().qty().set(5);

        let mut tags = order.tags().get().and_then(Coerced::typed).unwrap();
        tags.push("b".to_string());
        order.tags().set(tags);
        order.note().set("handle with care".to_string());
        order.set("extra", json!(true)).unwrap();

        let cached = ["order_id", "note", "total", "paid", "tags", "first_line", "lines"]
            .iter()
            .map(|name| order.is_cached(name))
            .collect();
        Trace {
            order_id,
            note,
            total,
            paid,
            first_sku,
            second_qty,
            third_is_view,
            cached,
            export: order.to_document(),
            bytes: order.to_json().unwrap(),
        }
    }};
}

#[test]
fn strategies_are_declared_as_requested() {
    assert_eq!(FastOrder::schema().strategy(), AccessorStrategy::Precompiled);
    assert_eq!(TableOrder::schema().strategy(), AccessorStrategy::Generic);
}

#[test]
fn both_strategies_produce_identical_traces() {
    let fast = exercise!(FastOrder);
    let table = exercise!(TableOrder);
    assert_eq!(fast, table);
}

#[test]
fn trace_contents() {
    let trace = exercise!(TableOrder);
    assert_eq!(trace.order_id, Some(Coerced::Typed(17)));
    assert_eq!(trace.note, Some(Coerced::Typed("fragile".to_string())));
    assert_eq!(trace.total, Some(Coerced::Typed(12.0)));
    assert_eq!(trace.paid, Some(Coerced::Raw(json!("yes"))));
    assert_eq!(trace.first_sku, Some(Coerced::Typed("X1".to_string())));
    assert_eq!(trace.second_qty, Some(Coerced::Raw(json!("many"))));
    assert!(!trace.third_is_view);
    assert!(trace.cached.iter().all(|&cached| cached));
    assert_eq!(trace.export["NOTE"], json!("handle with care"));
    assert_eq!(trace.export["tags"], json!(["a", "b"]));
    assert_eq!(trace.export["extra"], json!(true));
    assert_eq!(trace.export["untouched"], json!({"keep": [1, 2, 3]}));
    assert_eq!(
        trace.export["lines"],
        json!([{"sku": "X1", "qty": 5}, {"sku": "Y2", "qty": "many"}, 4])
    );
}

#[test]
fn both_strategies_agree_on_absent_fields() {
    let mut fast = FastOrder::new(Map::new());
    let mut table = TableOrder::new(Map::new());
    assert_eq!(fast.order_id().get(), table.order_id().get());
    assert!(fast.first_line().get().unwrap().is_none());
    assert!(table.first_line().get().unwrap().is_none());
    assert!(fast.lines().get().is_none());
    assert!(table.lines().get().is_none());
    assert_eq!(fast.core().cached_len(), table.core().cached_len());
}

#[test]
fn both_strategies_reject_non_object_nested_view() {
    let mut raw = Map::new();
    raw.insert("firstLine".into(), json!([1]));
    let fast_err = FastOrder::new(raw.clone()).first_line().get().map(|_| ()).unwrap_err();
    let table_err = TableOrder::new(raw).first_line().get().map(|_| ()).unwrap_err();
    for err in [fast_err, table_err] {
        assert!(matches!(
            err,
            ViewError::ShapeMismatch { field: "first_line", found: "array", .. }
        ));
    }
}

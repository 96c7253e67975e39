//! Best-effort scalar coercion.
//!
//! Coercion never fails: a raw value that cannot be converted to the
//! declared base type is handed back unchanged.

use serde_json::{Map, Number, Value};

/// The JSON-level shape a scalar field is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Any,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
}

impl BaseType {
    /// Whether `value` already has this base type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_f64(),
            Self::Str => value.is_string(),
            Self::List => value.is_array(),
            Self::Map => value.is_object(),
        }
    }

    /// Converts `raw` to this base type, keeping `raw` when the conversion
    /// is not possible.
    pub fn coerce(self, raw: &Value) -> Value {
        if self.accepts(raw) {
            return raw.clone();
        }
        match self.convert(raw) {
            Some(value) => value,
            None => {
                tracing::trace!(base = ?self, found = kind_name(raw), "coercion fell back to raw value");
                raw.clone()
            }
        }
    }

    fn convert(self, raw: &Value) -> Option<Value> {
        match (self, raw) {
            (Self::Int, Value::Number(n)) => {
                let f = n.as_f64()?;
                if !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                    return None;
                }
                Some(Value::from(f.trunc() as i64))
            }
            (Self::Int, Value::Bool(b)) => Some(Value::from(i64::from(*b))),
            (Self::Int, Value::String(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| s.parse::<u64>().map(Value::from))
                    .ok()
            }
            (Self::Float, Value::Number(n)) => float(n.as_f64()?),
            (Self::Float, Value::Bool(b)) => float(if *b { 1.0 } else { 0.0 }),
            (Self::Float, Value::String(s)) => float(s.trim().parse::<f64>().ok()?),
            (Self::Str, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::Str, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::Bool, Value::Number(n)) => Some(Value::Bool(n.as_f64()? != 0.0)),
            (Self::Bool, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

fn float(f: f64) -> Option<Value> {
    Number::from_f64(f).map(Value::Number)
}

/// Short name of a value's JSON kind, used in diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A Rust type usable as a scalar view field.
pub trait Scalar: Sized {
    const BASE: BaseType;

    fn from_value(value: &Value) -> Option<Self>;

    fn into_value(self) -> Value;

    /// Monomorphized coercion used by precompiled accessors.
    fn coerce(raw: &Value) -> Value {
        Self::BASE.coerce(raw)
    }
}

impl Scalar for bool {
    const BASE: BaseType = BaseType::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl Scalar for i64 {
    const BASE: BaseType = BaseType::Int;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl Scalar for u64 {
    const BASE: BaseType = BaseType::Int;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl Scalar for f64 {
    const BASE: BaseType = BaseType::Float;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn into_value(self) -> Value {
        Number::from_f64(self).map_or(Value::Null, Value::Number)
    }
}

impl Scalar for String {
    const BASE: BaseType = BaseType::Str;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl Scalar for Value {
    const BASE: BaseType = BaseType::Any;

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn into_value(self) -> Value {
        self
    }
}

impl Scalar for Map<String, Value> {
    const BASE: BaseType = BaseType::Map;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }

    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl<T: Scalar> Scalar for Vec<T> {
    const BASE: BaseType = BaseType::List;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_value).collect()
    }

    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(T::into_value).collect())
    }
}

impl<T: Scalar> Scalar for Option<T> {
    const BASE: BaseType = T::BASE;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, T::into_value)
    }
}

/// Outcome of reading a scalar field.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<T> {
    /// The cached value has the declared type.
    Typed(T),
    /// Conversion failed; this is the raw document value.
    Raw(Value),
}

impl<T> Coerced<T> {
    pub fn typed(self) -> Option<T> {
        match self {
            Self::Typed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn as_typed(&self) -> Option<&T> {
        match self {
            Self::Typed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl<T: Scalar> Coerced<T> {
    pub(crate) fn read(value: &Value) -> Self {
        match T::from_value(value) {
            Some(typed) => Self::Typed(typed),
            None => Self::Raw(value.clone()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Typed(value) => value.into_value(),
            Self::Raw(value) => value,
        }
    }
}

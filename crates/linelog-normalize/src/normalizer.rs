use serde::ser::Error as _;
use serde_json::{Map, Number, Value};

use crate::value::{format_rfc3339, Context, ContextValue};
use crate::ErrorValue;

pub const DEFAULT_MAX_DEPTH: usize = 9;
pub const DEFAULT_MAX_ITEMS: usize = 1000;

const RESOURCE: &str = "{resource}";
const OVERFLOW_KEY: &str = "...";

/// Converts context values into JSON, bounded in depth and fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    max_depth: usize,
    max_items: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, DEFAULT_MAX_ITEMS)
    }
}

impl Normalizer {
    pub fn new(max_depth: usize, max_items: usize) -> Self {
        Self {
            max_depth,
            max_items,
        }
    }

    /// Normalize `value` found at `depth` (0 for a top-level value).
    ///
    /// Overflowing the depth or item bound substitutes a marker string.
    /// Only values that cannot be represented in JSON at all (non-finite
    /// floats, failing serializations) produce an error.
    pub fn normalize(
        &self,
        value: &ContextValue,
        depth: usize,
    ) -> Result<Value, serde_json::Error> {
        match value {
            ContextValue::Error(error) => Ok(self.normalize_error(error, depth)),
            _ if depth > self.max_depth => Ok(Value::String(self.depth_marker())),
            ContextValue::Null => Ok(Value::Null),
            ContextValue::Bool(b) => Ok(Value::Bool(*b)),
            ContextValue::Int(i) => Ok(Value::from(*i)),
            ContextValue::UInt(u) => Ok(Value::from(*u)),
            ContextValue::Float(x) => float_value(*x),
            ContextValue::String(s) => Ok(Value::String(s.clone())),
            ContextValue::DateTime(dt) => Ok(Value::String(format_rfc3339(dt))),
            ContextValue::Stringable(v) => Ok(Value::String(v.to_log_string())),
            ContextValue::Serializable { value, .. } => value.to_json(),
            ContextValue::Sequence(items) => self.normalize_sequence(items, depth),
            ContextValue::Map(map) => self.normalize_map(map, depth),
            ContextValue::Object { properties, .. } => self.normalize_map(properties, depth),
            ContextValue::Resource => Ok(Value::String(RESOURCE.to_string())),
        }
    }

    fn normalize_sequence(
        &self,
        items: &[ContextValue],
        depth: usize,
    ) -> Result<Value, serde_json::Error> {
        let mut normalized = Vec::with_capacity(items.len().min(self.max_items + 1));
        for (index, item) in items.iter().enumerate() {
            if index >= self.max_items {
                normalized.push(Value::String(self.items_marker(items.len())));
                break;
            }
            normalized.push(self.normalize(item, depth + 1)?);
        }
        Ok(Value::Array(normalized))
    }

    fn normalize_map(&self, map: &Context, depth: usize) -> Result<Value, serde_json::Error> {
        let mut normalized = Map::new();
        for (index, (key, item)) in map.iter().enumerate() {
            if index >= self.max_items {
                normalized.insert(
                    OVERFLOW_KEY.to_string(),
                    Value::String(self.items_marker(map.len())),
                );
                break;
            }
            normalized.insert(key.to_string(), self.normalize(item, depth + 1)?);
        }
        Ok(Value::Object(normalized))
    }

    fn normalize_error(&self, error: &ErrorValue, depth: usize) -> Value {
        let mut descriptor = Map::new();
        descriptor.insert("class".to_string(), Value::String(error.class().to_string()));

        if depth > self.max_depth {
            descriptor.insert("message".to_string(), Value::String(self.depth_marker()));
            return Value::Object(descriptor);
        }

        descriptor.insert("message".to_string(), Value::String(error.message().to_string()));
        descriptor.insert("code".to_string(), Value::from(error.code()));
        descriptor.insert("file".to_string(), Value::String(error.location()));
        if let Some(previous) = error.previous() {
            descriptor.insert(
                "previous".to_string(),
                self.normalize_error(previous, depth + 1),
            );
        }
        Value::Object(descriptor)
    }

    fn depth_marker(&self) -> String {
        format!(
            "Over {} levels deep, aborting normalization",
            self.max_depth
        )
    }

    fn items_marker(&self, total: usize) -> String {
        format!(
            "Over {} items ({} total), aborting normalization",
            self.max_items, total
        )
    }
}

fn float_value(x: f64) -> Result<Value, serde_json::Error> {
    Number::from_f64(x)
        .map(Value::Number)
        .ok_or_else(|| {
            serde_json::Error::custom(format!("cannot encode non-finite float {}", x))
        })
}

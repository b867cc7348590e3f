use std::fmt;
use std::fs::File;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, TimeZone};
use serde::Serialize;

use crate::ErrorValue;

/// A value that can render itself as a display string.
pub trait Stringable: Send + Sync {
    fn to_log_string(&self) -> String;
}

impl<T: fmt::Display + Send + Sync> Stringable for T {
    fn to_log_string(&self) -> String {
        self.to_string()
    }
}

/// A value that provides its own JSON representation.
pub trait SelfSerializable: Send + Sync {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T: Serialize + Send + Sync> SelfSerializable for T {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Every value shape a log context can carry.
///
/// Interpolation and normalization each dispatch over this enum in a single
/// exhaustive `match`.
#[derive(Clone)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Error(ErrorValue),
    /// Rendered through its string conversion.
    Stringable(Arc<dyn Stringable>),
    /// Rendered through its own serialization.
    Serializable {
        type_name: String,
        value: Arc<dyn SelfSerializable>,
    },
    Sequence(Vec<ContextValue>),
    Map(Context),
    /// Opaque object known only by its class name and public properties.
    Object {
        class: String,
        properties: Context,
    },
    /// Stream or handle-like resource.
    Resource,
}

impl ContextValue {
    /// Wrap a value whose `Display` output should be logged.
    ///
    /// The conversion runs only when a record is actually emitted.
    pub fn display<T: fmt::Display + Send + Sync + 'static>(value: T) -> Self {
        Self::Stringable(Arc::new(value))
    }

    /// Wrap a value that serializes itself with serde.
    pub fn serializable<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self::Serializable {
            type_name: short_type_name(std::any::type_name::<T>()).to_string(),
            value: Arc::new(value),
        }
    }

    pub fn object(class: impl Into<String>, properties: Context) -> Self {
        Self::Object {
            class: class.into(),
            properties,
        }
    }

    pub fn resource() -> Self {
        Self::Resource
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Self::UInt(u) => f.debug_tuple("UInt").field(u).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Self::Stringable(_) => f.write_str("Stringable(..)"),
            Self::Serializable { type_name, .. } => f
                .debug_struct("Serializable")
                .field("type_name", type_name)
                .finish_non_exhaustive(),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Self::Object { class, properties } => f
                .debug_struct("Object")
                .field("class", class)
                .field("properties", properties)
                .finish(),
            Self::Resource => f.write_str("Resource"),
        }
    }
}

/// Format a date/time the way log payloads carry it: `2024-01-02T03:04:05+00:00`.
pub fn format_rfc3339(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Ordered key/value context attached to a single log call.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: Vec<(String, ContextValue)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Context::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, replacing an existing key in place.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Remove a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<ContextValue>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

impl IntoIterator for Context {
    type Item = (String, ContextValue);
    type IntoIter = std::vec::IntoIter<(String, ContextValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for ContextValue {
            fn from(value: $t) -> Self {
                Self::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for ContextValue {
            fn from(value: $t) -> Self {
                Self::UInt(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for ContextValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for ContextValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(value: Vec<T>) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for ContextValue {
    fn from(value: DateTime<Tz>) -> Self {
        let offset = value.offset().fix();
        Self::DateTime(value.with_timezone(&offset))
    }
}

impl From<ErrorValue> for ContextValue {
    fn from(value: ErrorValue) -> Self {
        Self::Error(value)
    }
}

impl From<Context> for ContextValue {
    fn from(value: Context) -> Self {
        Self::Map(value)
    }
}

impl From<&File> for ContextValue {
    fn from(_: &File) -> Self {
        Self::Resource
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => Self::Map(map.into_iter().collect()),
        }
    }
}

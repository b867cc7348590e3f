//! # linelog-normalize
//!
//! Turns the structured context attached to a log call into text and JSON.
//!
//! ## Key Types
//!
//! - [`ContextValue`] - Closed set of value shapes a context can carry
//! - [`Context`] - Ordered key/value context of a single log call
//! - [`ErrorValue`] - Error descriptor with its causal chain
//! - [`Normalizer`] - Bounded conversion of context values into JSON
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linelog_normalize::{context, interpolate, Normalizer};
//!
//! let ctx = context! { "user" => "alice", "attempts" => 3 };
//! let text = interpolate("{user} failed {attempts} times", &ctx)?;
//! let json = Normalizer::default().normalize(&ctx.into(), 0)?;
//! ```
//!
//! ## Bounds
//!
//! Normalization stops descending after 9 levels and after 1000 entries per
//! sequence or map, substituting a marker string instead of failing.

mod error_value;
mod interpolate;
mod normalizer;
mod value;

pub use error_value::ErrorValue;
pub use interpolate::{display_value, interpolate, interpolate_with};
pub use normalizer::{Normalizer, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ITEMS};
pub use value::{format_rfc3339, Context, ContextValue, SelfSerializable, Stringable};

/// Build a [`Context`] from `key => value` pairs.
///
/// ```rust,ignore
/// let ctx = context! { "key" => "value", "count" => 2 };
/// ```
#[macro_export]
macro_rules! context {
    () => {
        $crate::Context::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Context::new()$(.with($key, $value))+
    };
}

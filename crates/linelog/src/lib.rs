//! # linelog
//!
//! Leveled structured logging to a single stream, one line per record.
//!
//! ## Key Types
//!
//! - [`Logger`] - Filters, formats and writes records
//! - [`Level`] - The eight severity levels, `Debug` through `Emergency`
//! - [`Sink`] - Caller-owned writer or lazily opened locator
//! - [`LoggerConfig`] - Settings loadable from `linelog.toml`
//!
//! ## Line Format
//!
//! ```text
//! INFO\tUser alice logged in\t{"message":"User alice logged in","level":"INFO","context":{"user":"alice"}}
//! ```
//!
//! The message field is interpolated and flattened to one line; the JSON
//! payload keeps the original message, promotes an error under `exception`
//! to the top level and carries the remaining context.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linelog::{context, Level, Logger};
//!
//! let logger = Logger::stderr(Level::Info);
//! logger.info("User {user} logged in", context! { "user" => "alice" })?;
//! ```

mod config;
mod error;
mod level;
mod logger;
mod sink;

pub use config::{LoggerConfig, CONFIG_FILE_NAME};
pub use error::LogError;
pub use level::Level;
pub use logger::Logger;
pub use sink::{Sink, STDERR, STDOUT};

pub use linelog_normalize::{
    context, interpolate, interpolate_with, Context, ContextValue, ErrorValue, Normalizer,
    SelfSerializable, Stringable,
};

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use linelog_normalize::{interpolate_with, Context, ContextValue, Normalizer};
use serde_json::{Map, Value};

use crate::sink::SinkState;
use crate::{Level, LogError, LoggerConfig, Sink};

/// Context key whose error value is promoted to the top of the payload.
const EXCEPTION_KEY: &str = "exception";

/// Leveled logger writing one tab-delimited line per record:
///
/// ```text
/// <LEVEL>\t<message on one line>\t<JSON payload>\n
/// ```
///
/// The sink lock is held while opening the sink and while writing a line,
/// never while formatting, so context values may themselves log.
pub struct Logger {
    level: Level,
    sink: Mutex<SinkState>,
    normalizer: Normalizer,
}

impl Logger {
    pub fn new(level: Level, sink: Sink) -> Self {
        Self {
            level,
            sink: Mutex::new(SinkState::new(sink)),
            normalizer: Normalizer::default(),
        }
    }

    /// Logger writing to the process's standard error.
    pub fn stderr(level: Level) -> Self {
        Self::new(level, Sink::default())
    }

    /// Logger writing to a caller-owned writer.
    pub fn with_writer<W: Write + Send + 'static>(level: Level, writer: W) -> Self {
        Self::new(level, Sink::writer(writer))
    }

    pub fn from_config(config: &LoggerConfig) -> Result<Self, LogError> {
        Ok(Self::new(config.level, Sink::locator(config.sink.as_str())?))
    }

    /// Replace the depth and item bounds used for payloads.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level.should_log(self.level)
    }

    /// Emit a record.
    ///
    /// Records below the configured level return immediately without
    /// touching the sink or the context.
    pub fn log(&self, level: Level, message: &str, context: Context) -> Result<(), LogError> {
        if !self.enabled(level) {
            return Ok(());
        }

        self.sink().ensure_open()?;
        let line = self.format_record(level, message, context)?;
        self.sink().write_line(&line)
    }

    /// Emit a record whose level is given by name, e.g. `"warning"`.
    pub fn log_named(
        &self,
        level: &str,
        message: &str,
        context: Context,
    ) -> Result<(), LogError> {
        self.log(level.parse()?, message, context)
    }

    pub fn emergency(&self, message: &str, context: Context) -> Result<(), LogError> {
        self.log(Level::Emergency, message, context)
    }

    pub fn alert(&self, message: &str, context: Context) -> Result<(), LogError> {
        self.log(Level::Alert, message, context)
    }

    pub fn critical(&self, message: &str, context: Context) -> Result<(), LogError> {
        self.log(Level::Critical, message, context)
    }

    pub fn error(&self, message: &str, context: Context) -> Result<(), LogError> {
        self.log(Level::Error, message, context)
    }

    pub fn warning(&self, message: &str, context: Context) -> Result<(), LogError> {
        self.log(Level::Warning, message, context)
    }

    pub fn notice(&self, message: &str, context: Context) -> Result<(), LogError> {
        self.log(Level::Notice, message, context)
    }

    pub fn info(&self, message: &str, context: Context) -> Result<(), LogError> {
        self.log(Level::Info, message, context)
    }

    pub fn debug(&self, message: &str, context: Context) -> Result<(), LogError> {
        self.log(Level::Debug, message, context)
    }

    /// Flush the sink and release it if the logger opened it.
    ///
    /// A later record reopens a locator sink.
    pub fn close(&self) -> Result<(), LogError> {
        self.sink().close()
    }

    fn sink(&self) -> MutexGuard<'_, SinkState> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn format_record(
        &self,
        level: Level,
        message: &str,
        mut context: Context,
    ) -> Result<String, LogError> {
        let message = interpolate_with(message, &context, &self.normalizer)?;
        let single_line = flatten_newlines(&message);

        // The envelope is not subject to the normalizer bounds; its
        // values start at depth 1.
        let mut payload = Map::new();
        payload.insert("message".to_string(), Value::String(message));
        payload.insert("level".to_string(), Value::String(level.as_str().to_string()));
        if matches!(context.get(EXCEPTION_KEY), Some(ContextValue::Error(_))) {
            if let Some(exception) = context.remove(EXCEPTION_KEY) {
                let exception = self.normalizer.normalize(&exception, 1)?;
                payload.insert(EXCEPTION_KEY.to_string(), exception);
            }
        }
        if !context.is_empty() {
            let context = self.normalizer.normalize(&ContextValue::Map(context), 1)?;
            payload.insert("context".to_string(), context);
        }

        let json = serde_json::to_string(&Value::Object(payload))?;

        Ok(format!("{}\t{}\t{}\n", level, single_line, json))
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::stderr(Level::default())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

/// Collapse every `\r\n`, `\r` and `\n` into a single space.
fn flatten_newlines(message: &str) -> String {
    message
        .replace("\r\n", " ")
        .replace(|c: char| c == '\r' || c == '\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use linelog_normalize::ErrorValue;

    #[test]
    fn test_flatten_newlines() {
        assert_eq!(flatten_newlines("a\nb"), "a b");
        assert_eq!(flatten_newlines("a\r\nb"), "a b");
        assert_eq!(flatten_newlines("a\rb\n\nc"), "a b  c");
        assert_eq!(flatten_newlines("plain"), "plain");
    }

    #[test]
    fn test_format_record_without_context() {
        let logger = Logger::with_writer(Level::Debug, Vec::new());
        let line = logger
            .format_record(Level::Notice, "Notice", Context::new())
            .unwrap();

        assert_eq!(
            line,
            "NOTICE\tNotice\t{\"message\":\"Notice\",\"level\":\"NOTICE\"}\n"
        );
    }

    #[test]
    fn test_format_record_promotes_exception() {
        let logger = Logger::with_writer(Level::Debug, Vec::new());
        let context = Context::new()
            .with("key", "value")
            .with("exception", ErrorValue::new("IoError", "disk full").at("src/store.rs", 12));

        let line = logger
            .format_record(Level::Error, "Save failed", context)
            .unwrap();

        assert_eq!(
            line,
            concat!(
                "ERROR\tSave failed\t",
                r#"{"message":"Save failed","level":"ERROR","#,
                r#""exception":{"class":"IoError","message":"disk full","code":0,"file":"src/store.rs:12"},"#,
                r#""context":{"key":"value"}}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_format_record_keeps_non_error_exception_in_context() {
        let logger = Logger::with_writer(Level::Debug, Vec::new());
        let context = Context::new()
            .with("exception", "just a string")
            .with("k", 1);

        let line = logger.format_record(Level::Info, "m", context).unwrap();
        assert_eq!(
            line,
            concat!(
                "INFO\tm\t",
                r#"{"message":"m","level":"INFO","context":{"exception":"just a string","k":1}}"#,
                "\n"
            )
        );

        let context = Context::new().with("exception", ContextValue::Null);
        let line = logger.format_record(Level::Info, "m", context).unwrap();
        assert_eq!(
            line,
            "INFO\tm\t{\"message\":\"m\",\"level\":\"INFO\",\"context\":{\"exception\":null}}\n"
        );
    }

    #[test]
    fn test_format_record_envelope_ignores_item_bound() {
        let logger = Logger::with_writer(Level::Debug, Vec::new())
            .with_normalizer(Normalizer::new(9, 1));
        let context = Context::new()
            .with("exception", ErrorValue::new("IoError", "disk full").at("src/store.rs", 12))
            .with("key", "value");

        let line = logger
            .format_record(Level::Error, "Save failed", context)
            .unwrap();

        assert_eq!(
            line,
            concat!(
                "ERROR\tSave failed\t",
                r#"{"message":"Save failed","level":"ERROR","#,
                r#""exception":{"class":"IoError","message":"disk full","code":0,"file":"src/store.rs:12"},"#,
                r#""context":{"key":"value"}}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_log_skips_sink_when_filtered() {
        let logger = Logger::new(
            Level::Error,
            Sink::locator("/nonexistent-dir/never-opened.log").unwrap(),
        );

        logger.info("ignored", Context::new()).unwrap();
        assert!(!logger.sink().is_open());
    }
}

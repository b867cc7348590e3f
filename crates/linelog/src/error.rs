use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    #[error("Unable to open sink {locator}: {source}")]
    SinkOpen {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log record: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}

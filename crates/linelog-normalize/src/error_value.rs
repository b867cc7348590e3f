use std::error::Error;
use std::fmt;
use std::io;
use std::panic::Location;

use crate::value::short_type_name;

/// Descriptor of an error and the chain of errors that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    class: String,
    message: String,
    code: i64,
    file: String,
    line: u32,
    previous: Option<Box<ErrorValue>>,
}

impl ErrorValue {
    /// Describe an error by hand. The location defaults to the caller.
    #[track_caller]
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            class: class.into(),
            message: message.into(),
            code: 0,
            file: location.file().to_string(),
            line: location.line(),
            previous: None,
        }
    }

    /// Describe any Rust error, following its `source()` chain.
    ///
    /// The class is the error's type name; causes, whose concrete type is
    /// erased, take the leading identifier of their `Debug` output. Every
    /// link of the chain is located at the capture site.
    #[track_caller]
    pub fn capture<E: Error + 'static>(error: &E) -> Self {
        let location = Location::caller();
        let class = short_type_name(std::any::type_name::<E>());
        let mut value = Self::describe(class, error, location);
        value.previous = error
            .source()
            .map(|source| Box::new(Self::capture_source(source, location)));
        value
    }

    fn capture_source(error: &(dyn Error + 'static), location: &Location<'_>) -> Self {
        let class = debug_class_name(error);
        let mut value = Self::describe(&class, error, location);
        value.previous = error
            .source()
            .map(|source| Box::new(Self::capture_source(source, location)));
        value
    }

    fn describe(class: &str, error: &(dyn Error + 'static), location: &Location<'_>) -> Self {
        Self {
            class: class.to_string(),
            message: error.to_string(),
            code: os_error_code(error),
            file: location.file().to_string(),
            line: location.line(),
            previous: None,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self
    }

    pub fn with_previous(mut self, previous: ErrorValue) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    /// `file:line` of the error.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }

    pub fn previous(&self) -> Option<&ErrorValue> {
        self.previous.as_deref()
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} in {}:{}",
            self.class, self.message, self.file, self.line
        )
    }
}

fn os_error_code(error: &(dyn Error + 'static)) -> i64 {
    error
        .downcast_ref::<io::Error>()
        .and_then(io::Error::raw_os_error)
        .map_or(0, i64::from)
}

fn debug_class_name(error: &(dyn Error + 'static)) -> String {
    if error.is::<io::Error>() {
        return "Error".to_string();
    }
    let debug = format!("{:?}", error);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}

//! # Error Handling
//!
//! Crate-level error type for configuration loading, validation and the CLI.
//! Module-specific failures (contract decoding, storage handlers, audit sinks)
//! have their own `thiserror` enums next to the code that raises them.

/// Custom result type for Aegis core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Aegis core
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages("", &errors, &mut messages);
        Self::validation(format!("Validation failed: {}", messages.join("; ")))
    }
}

fn collect_validation_messages(
    path: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let name = if path.is_empty() { field.to_string() } else { format!("{}.{}", path, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                out.push(format!("{}: {}", name, error_messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(&name, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(&format!("{}[{}]", name, index), nested, out);
                }
            }
        }
    }
}

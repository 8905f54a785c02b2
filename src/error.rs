//! Error types for options-monitor.

use std::fmt;

/// Result type alias for options-monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors produced while registering subscribers or distributing updates.
///
/// Every variant carries owned strings so one value can be handed to each
/// listener of a monitor (and to every monitor on a fetch failure).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    /// The config source could not produce a document.
    ///
    /// This is the only error broadcast to every registered monitor.
    #[error("Failed to fetch configuration from '{source_name}': {reason}")]
    FetchFailed {
        /// Name of the source that failed
        source_name: String,
        /// Why the fetch failed
        reason: String,
    },

    /// The raw document is not a JSON object.
    #[error("Failed to parse configuration document: {0}")]
    ParseFailed(String),

    /// The section key is absent from the document.
    #[error("Failed to find section '{section}'")]
    MissingSection {
        /// The missing top-level key
        section: String,
    },

    /// The section exists but is not an object.
    #[error("Section '{section}' is not an object")]
    MalformedSection {
        /// The offending top-level key
        section: String,
    },

    /// The field key is absent from the section.
    #[error("Failed to find field '{field}' in section '{section}'")]
    MissingField {
        /// The section that was searched
        section: String,
        /// The missing field key
        field: String,
    },

    /// The sub-document could not be re-serialized.
    #[error("Failed to serialize field '{field}': {reason}")]
    SerializeFailed {
        /// The field being serialized
        field: String,
        /// Serializer message
        reason: String,
    },

    /// The subscriber refused the update.
    #[error("Options update rejected: {0}")]
    ApplyRejected(String),

    /// A monitor is already registered for this subscriber.
    #[error("An options monitor is already registered for this subscriber")]
    DuplicateRegistration,

    /// No monitor is registered for this subscriber.
    #[error("No options monitor is registered for this subscriber")]
    NotRegistered,

    /// Failed to load client settings.
    #[error("Failed to load settings: {0}")]
    SettingsError(String),

    /// A pass trigger could not be started.
    #[error("Trigger error: {0}")]
    TriggerError(String),
}

impl MonitorError {
    /// Build a fetch failure for the named source.
    pub fn fetch_failed(source_name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::FetchFailed {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for errors that come from the shape of the document.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            Self::ParseFailed(_)
                | Self::MissingSection { .. }
                | Self::MalformedSection { .. }
                | Self::MissingField { .. }
                | Self::SerializeFailed { .. }
        )
    }
}

/// Reason a subscriber refused an update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Free-form rejection message.
    #[error("{0}")]
    Custom(String),

    /// One field holds an unacceptable value.
    #[error("Field '{field}' is invalid: {reason}")]
    InvalidField {
        /// Field name or path
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Several validators rejected the same update.
    #[error("{} validation errors: {}", .0.len(), join_messages(.0))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a free-form validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an error for a single field.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Fold the errors of several validators into one outcome.
    ///
    /// No errors is success, one error is returned as is, and more become
    /// `Multiple` in the order given.
    pub fn combine(mut errors: Vec<ValidationError>) -> std::result::Result<(), ValidationError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Multiple(errors)),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ValidationError> for MonitorError {
    fn from(err: ValidationError) -> Self {
        MonitorError::ApplyRejected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_becomes_rejection() {
        let err: MonitorError = ValidationError::invalid_field("N", "must be <= 100").into();
        assert_eq!(
            err,
            MonitorError::ApplyRejected("Field 'N' is invalid: must be <= 100".to_string())
        );
    }

    #[test]
    fn test_document_errors() {
        assert!(MonitorError::ParseFailed("eof".into()).is_document_error());
        assert!(
            MonitorError::MissingField {
                section: "Team".into(),
                field: "Config".into()
            }
            .is_document_error()
        );
        assert!(!MonitorError::fetch_failed("memory", "down").is_document_error());
        assert!(!MonitorError::ApplyRejected("no".into()).is_document_error());
    }

    #[test]
    fn test_fetch_failed_message() {
        let err = MonitorError::fetch_failed("file:/etc/app.json", "not found");
        assert_eq!(
            err.to_string(),
            "Failed to fetch configuration from 'file:/etc/app.json': not found"
        );
    }

    #[test]
    fn test_combine() {
        assert_eq!(ValidationError::combine(Vec::new()), Ok(()));
        assert_eq!(
            ValidationError::combine(vec![ValidationError::custom("only")]),
            Err(ValidationError::custom("only"))
        );

        let err = ValidationError::combine(vec![
            ValidationError::custom("first"),
            ValidationError::invalid_field("port", "zero"),
        ])
        .unwrap_err();
        assert!(matches!(&err, ValidationError::Multiple(errors) if errors.len() == 2));
        assert_eq!(
            err.to_string(),
            "2 validation errors: first; Field 'port' is invalid: zero"
        );
    }
}

//! Core error types shared by every crate in the notification pipeline.

/// Errors produced while validating or transforming domain objects.
///
/// Storage and delivery errors live in their own crates (`relay-storage`,
/// `relay-delivery`); this enum only covers failures that can occur purely
/// from the data itself, independent of any backend.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// Same underlying condition as [`CoreError::UnknownChannel`], raised
    /// from notification ingest rather than a subscription's filter groups;
    /// the two get distinct `code`s so publisher clients can tell them apart.
    #[error("unknown channel: {0}")]
    UnknownChannelOnIngest(String),

    #[error("inconsistent filters: channel permitted keys and submitted keys are neither subset nor superset of each other")]
    InconsistentFilters,

    #[error("aanmaakdatum {0} is in the future")]
    FutureNotAllowed(String),

    #[error("source is required when a matching subscriber wants CloudEvents")]
    MissingSource,

    #[error("invalid value for field {field}: {message}")]
    InvalidField { field: String, message: String },
}

/// A validation error paired with the stable `code` string the HTTP surface
/// exposes to publishers (see the external-interfaces section of the spec).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<CoreError> for ValidationError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::UnknownChannel(_) => "kanaal_naam",
            CoreError::UnknownChannelOnIngest(_) => "message_kanaal",
            CoreError::InconsistentFilters => "kenmerken_inconsistent",
            CoreError::FutureNotAllowed(_) => "future_not_allowed",
            CoreError::MissingSource => "source_required",
            CoreError::InvalidField { .. } => "invalid_field",
        };
        ValidationError::new(code, err.to_string())
    }
}

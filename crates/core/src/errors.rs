use thiserror::Error;

/// Typed failures raised by the workflow, lifecycle, and accounting modules.
///
/// The HTTP layer maps these onto status codes; nothing in core knows about
/// HTTP. `Validation` and `State` are both caller mistakes, but `State` means
/// the entity must be re-fetched before retrying while `Validation` means the
/// input itself was malformed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("operation not allowed in current state: {0}")]
    State(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Message safe to surface to an API caller. Persistence and
    /// configuration details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(error) => error.to_string(),
            Self::Persistence(_) => "The service is temporarily unavailable.".to_owned(),
            Self::Configuration(_) => "An unexpected internal error occurred.".to_owned(),
        }
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used by the HTTP layer to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Server,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid field(s) specified in query: {}", .0.join(","))]
    InvalidQueryParams(Vec<String>),

    #[error("Invalid field(s) specified for fields parameter: {}", .0.join(","))]
    InvalidFieldParams(Vec<String>),

    #[error("Invalid field(s) specified for facets parameter: {}", .0.join(","))]
    InvalidFacetFields(Vec<String>),

    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    #[error("Invalid value for parameter {name}: {reason}")]
    InvalidParamValue { name: String, reason: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Search backend error: {0}")]
    Backend(String),

    #[error("Search backend error")]
    BackendUnavailable,

    #[error("Document store error: {0}")]
    DocumentStore(String),
}

impl Error {
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidParamValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Backend(_) | Error::BackendUnavailable | Error::DocumentStore(_) => ErrorClass::Server,
            _ => ErrorClass::Client,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.class() == ErrorClass::Client
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) | Error::UnknownResource(_) => 404,
            Error::Backend(_) | Error::BackendUnavailable | Error::DocumentStore(_) => 500,
            _ => 400,
        }
    }
}

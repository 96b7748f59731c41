use serde::{Deserialize, Serialize};

pub mod models;
pub mod value;

// Re-export model types
pub use models::{
    AuthResponse, Collection, CollectionConfig, CreateCollectionRequest, CreateProjectRequest,
    Credentials, DocumentQuery, Field, FieldType, GenerateRequest, GenerateResponse, Listing,
    Project, RefreshRequest, SortOrder, UpdateCollectionRequest, UpdateProjectRequest, ID_FIELD,
};

// Re-export document value types
pub use value::{document_id, FieldValue, RawDocument};

/// Result alias used by every crate that talks to the MockingCode API.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Structured error types for API operations.
///
/// Every failure a view can show ends up here: transport problems, non-2xx
/// responses, undecodable bodies, and the client-side checks that run before
/// a request is sent. `Display` yields the single message a view renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {message}")]
    Network { message: String },

    /// HTTP 401. Triggers the session's sign-out signal.
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Unexpected response format: {message}")]
    Decode { message: String },

    /// Hand-edited editor text that is not valid JSON.
    #[error("Invalid JSON format")]
    InvalidJson { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("Limit reached: {limit}")]
    LimitReached { limit: usize },

    /// The local token store could not be read or written.
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ApiError::Storage {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode {
            message: e.to_string(),
        }
    }
}

//! Error types for Wayfarer

use thiserror::Error;

use crate::models::RouteId;

#[derive(Debug, Error)]
pub enum WayfarerError {
    // Lookup errors
    #[error("Location category not found: {category}")]
    CategoryNotFound { category: String },

    #[error("Route not found: {route_id}")]
    RouteNotFound { route_id: RouteId },

    #[error("Vote not found for route {route_id}")]
    VoteNotFound { route_id: RouteId },

    // Search errors
    #[error("No location found for step {step} ('{query}') in the given area")]
    NoLocationFound { step: usize, query: String },

    #[error("Invalid search query: {reason}")]
    InvalidQuery { reason: String },

    #[error("Parameters too large: {reason}")]
    ParametersTooLarge { reason: String },

    // Ownership and uniqueness errors
    #[error("Route {route_id} already voted by this user")]
    AlreadyVoted { route_id: RouteId },

    #[error("Not authorised to act on route {route_id}")]
    NotAuthorised { route_id: RouteId },

    // Upstream provider errors
    #[error("Embedder unavailable: {reason}. Try: {remediation}")]
    EmbedderUnavailable { reason: String, remediation: String },

    #[error("Routing provider failure: {reason}")]
    RoutingFailure { reason: String },

    // Infrastructure errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse error classes used for propagation and HTTP mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NoResult,
    InvalidQuery,
    Conflict,
    Unauthorised,
    UpstreamFailure,
    Internal,
}

impl WayfarerError {
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery { reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CategoryNotFound { .. } | Self::RouteNotFound { .. } | Self::VoteNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::NoLocationFound { .. } => ErrorKind::NoResult,
            Self::InvalidQuery { .. } | Self::ParametersTooLarge { .. } => ErrorKind::InvalidQuery,
            Self::AlreadyVoted { .. } => ErrorKind::Conflict,
            Self::NotAuthorised { .. } => ErrorKind::Unauthorised,
            Self::EmbedderUnavailable { .. } | Self::RoutingFailure { .. } => {
                ErrorKind::UpstreamFailure
            }
            Self::Storage(_)
            | Self::Cache(_)
            | Self::ConfigMissing { .. }
            | Self::ConfigInvalid { .. }
            | Self::Io(_)
            | Self::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Whether retrying the same operation may succeed.
    ///
    /// Only key-value store I/O is considered transient; everything else is
    /// either a caller error or an authoritative-store failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Cache(_))
    }
}

impl From<serde_json::Error> for WayfarerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WayfarerError>;

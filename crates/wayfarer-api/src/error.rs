use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use wayfarer_core::error::WayfarerError;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Stable machine-readable error class
    pub kind: &'static str,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), kind, details: None }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "not_authenticated", message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, kind: self.kind, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<WayfarerError> for ApiError {
    fn from(err: WayfarerError) -> Self {
        let (status, kind, message) = match &err {
            WayfarerError::CategoryNotFound { .. } => {
                (StatusCode::NOT_FOUND, "location_type_not_found", "Location type not found")
            }
            WayfarerError::RouteNotFound { .. } => {
                (StatusCode::NOT_FOUND, "route_not_found", "Route not found")
            }
            WayfarerError::VoteNotFound { .. } => {
                (StatusCode::NOT_FOUND, "vote_not_found", "Vote not found")
            }
            WayfarerError::NoLocationFound { .. } => {
                (StatusCode::NOT_FOUND, "no_location", "No location found for the given query")
            }
            WayfarerError::InvalidQuery { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_search_query", "Invalid search query")
            }
            WayfarerError::ParametersTooLarge { .. } => {
                (StatusCode::BAD_REQUEST, "parameters_too_large", "Parameters too large")
            }
            WayfarerError::AlreadyVoted { .. } => {
                (StatusCode::CONFLICT, "already_voted", "Route already voted")
            }
            WayfarerError::NotAuthorised { .. } => {
                (StatusCode::FORBIDDEN, "not_authorised", "Not authorised to perform this action")
            }
            WayfarerError::RoutingFailure { .. } => {
                (StatusCode::BAD_GATEWAY, "no_route", "No route found between the locations")
            }
            WayfarerError::EmbedderUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "embedder_unavailable", "Embedding service unavailable")
            }
            _ => {
                tracing::error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal error")
            }
        };

        Self::new(status, kind, message).with_details(err.to_string())
    }
}

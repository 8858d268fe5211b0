use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("plot not found: {0}")]
    NotFound(String),

    #[error("rejected plot path: {0}")]
    InvalidPath(String),

    #[error("failed to parse layout config {path}: {source}")]
    LayoutParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid layout config: {message}")]
    LayoutValidation { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_path(what: impl Into<String>) -> Self {
        Self::InvalidPath(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::LayoutParse { .. } | Self::LayoutValidation { .. } | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            DashboardError::not_found("x.png").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DashboardError::invalid_path("../etc").status(),
            StatusCode::BAD_REQUEST
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            DashboardError::from(io).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_names_the_path() {
        let err = DashboardError::not_found("v16/Dev/uniform/BIRD_x.png");
        assert_eq!(err.to_string(), "plot not found: v16/Dev/uniform/BIRD_x.png");
    }
}

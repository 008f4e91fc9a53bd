//! Error types for the post rendering pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or deleting post images
#[derive(Error, Debug)]
pub enum Error {
    /// One of the required generate fields is absent or empty
    #[error("Missing required post field(s)")]
    MissingField,

    /// Delete request without a `fileName`
    #[error("Missing fileName")]
    MissingFileName,

    /// File name does not match the generated image pattern
    #[error("Invalid file name: {0:?}")]
    InvalidFilename(String),

    /// Delete target does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// The rendering capability failed to produce an image
    #[error("Rendering failed: {0}")]
    RenderFailure(String),

    /// Render deadline elapsed
    #[error("Rendering timed out after {0}ms")]
    Timeout(u64),

    /// Render queue is full
    #[error("Render queue is full")]
    Busy,

    /// Writing the rendered image to the public directory failed
    #[error("Failed to write image: {0}")]
    WriteFailure(String),

    /// Removing an image from the public directory failed
    #[error("Failed to delete file: {0}")]
    DeleteFailure(String),

    /// Failed to initialize a service component
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingField | Error::MissingFileName | Error::InvalidFilename(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::RenderFailure(_)
            | Error::Timeout(_)
            | Error::Busy
            | Error::WriteFailure(_)
            | Error::DeleteFailure(_)
            | Error::InitializationError(_)
            | Error::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to HTTP clients. Never carries internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::MissingField => "imageUrl, logoUrl, text01, focusText, and text02 are all required.",
            Error::MissingFileName => "fileName is required.",
            Error::InvalidFilename(_) => "Invalid file name.",
            Error::NotFound(_) => "File does not exist.",
            Error::DeleteFailure(_) => "Failed to delete the file.",
            Error::RenderFailure(_)
            | Error::Timeout(_)
            | Error::Busy
            | Error::WriteFailure(_)
            | Error::InitializationError(_)
            | Error::ConfigError(_) => "Failed to process the image.",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::info!("Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.user_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(Error::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::MissingFileName.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::InvalidFilename("../x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::NotFound("a".into()).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_errors_hide_detail() {
        let err = Error::RenderFailure("chrome exploded at 0xdeadbeef".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Failed to process the image.");
        assert_eq!(Error::Timeout(10).user_message(), "Failed to process the image.");
        assert_eq!(Error::Busy.user_message(), "Failed to process the image.");

        let err = Error::DeleteFailure("permission denied".into());
        assert_eq!(err.user_message(), "Failed to delete the file.");
    }
}

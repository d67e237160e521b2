//! Errors raised while talking to the backend.
//!
//! - [`Unauthorized`] is the only signal used to force re-authentication.
//! - [`Http`] carries the status and the message of any other non-2xx reply.
//! - [`UploadFailed`] means the gift itself was saved but one of its photos
//!   was not; callers keep the returned id to avoid saving it twice.
//!
//!  [`Unauthorized`]: ClientError::Unauthorized
//!  [`UploadFailed`]: ClientError::UploadFailed
//!  [`Http`]: ClientError::Http
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("present {present_id} saved, photo upload failed after {uploaded}: {source}")]
    UploadFailed {
        present_id: i64,
        uploaded: usize,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthorized => true,
            Self::UploadFailed { source, .. } => source.is_unauthorized(),
            _ => false,
        }
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::InvalidUrl(_) | Self::Io(_) => None,
            Self::UploadFailed { source, .. } => source.status(),
        }
    }
}

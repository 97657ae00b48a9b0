//! Failure taxonomy for backend calls.
//!
//! Every operation fails with its own [`ApiError`] variant so callers can tell which
//! action went wrong; the wrapped [`Failure`] says how. `Display` renders the single
//! human-readable message shown to the user, e.g. `Upload failed (500): disk full`.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// The backend answered with a non-success status.
    #[error("({}){}", .status.as_u16(), body_suffix(.body))]
    Http { status: StatusCode, body: String },

    /// The request never got an answer (connection refused, DNS, timeout).
    #[error("(transport): {0}")]
    Transport(reqwest::Error),

    /// Success status, but the body was not the expected JSON.
    #[error("(invalid response): {0}")]
    Decode(reqwest::Error),

    #[error("(io): {0}")]
    Io(#[from] std::io::Error),

    /// Rejected before anything was sent.
    #[error("(invalid input): {0}")]
    InvalidInput(String),
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to list images {0}")]
    List(Failure),

    #[error("Upload failed {0}")]
    Upload(Failure),

    #[error("Process trigger failed {0}")]
    Process(Failure),

    #[error("Status fetch failed {0}")]
    Status(Failure),

    #[error("Edit failed {0}")]
    Edit(Failure),

    #[error("Delete failed {0}")]
    Delete(Failure),

    #[error("Download failed {0}")]
    Download(Failure),
}

impl ApiError {
    pub fn failure(&self) -> &Failure {
        match self {
            ApiError::List(f)
            | ApiError::Upload(f)
            | ApiError::Process(f)
            | ApiError::Status(f)
            | ApiError::Edit(f)
            | ApiError::Delete(f)
            | ApiError::Download(f) => f,
        }
    }

    /// HTTP status returned by the backend, if the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self.failure() {
            Failure::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Network-level failure rather than a backend verdict.
    pub fn is_transport(&self) -> bool {
        matches!(self.failure(), Failure::Transport(_))
    }
}

use coder_core::RequestFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{method} {url} could not be sent: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} failed: {status}; body={body}")]
    Status {
        method: &'static str,
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("decode error for {url}: {detail}; body={body}")]
    Decode {
        url: String,
        detail: String,
        body: String,
    },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl BackendError {
    pub fn to_failure(&self) -> RequestFailure {
        match self {
            Self::Transport { source, .. } => RequestFailure::Transport(source.to_string()),
            Self::Client(source) => RequestFailure::Transport(source.to_string()),
            Self::Status { status, .. } => RequestFailure::Status {
                status: status.as_u16(),
            },
            Self::ReadFile { path, source } => RequestFailure::LocalFile {
                path: path.clone(),
                detail: source.to_string(),
            },
            Self::Decode { detail, .. } => RequestFailure::Decode(detail.clone()),
        }
    }
}

impl From<BackendError> for RequestFailure {
    fn from(err: BackendError) -> Self {
        err.to_failure()
    }
}

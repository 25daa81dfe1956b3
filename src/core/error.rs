use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },
    #[error("{url} answered with http status {status} {status_text}")]
    Status {
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("{url} closed the stream before sending any data")]
    EmptyStream { url: String },
    #[error("failed to create segment {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write segment {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no free segment name for stem {stem} after {attempts} attempts")]
    NameExhausted { stem: String, attempts: usize },
}

impl CaptureError {
    /// Session-level failures: nothing was written for this iteration.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CaptureError::Connect { .. } | CaptureError::Status { .. } | CaptureError::EmptyStream { .. }
        )
    }

    pub fn connect(url: impl Into<String>, message: impl ToString) -> Self {
        CaptureError::Connect {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{message}")]
    Message { message: String },
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl ConfigError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Context {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

use std::time::Duration;

use thiserror::Error;

use crate::diagnostic::diagnostic_code;
use crate::transport::TransportError;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("Unable to open request context")]
    ConnectionSetup(#[source] TransportError),

    #[error("Unable to apply TLS verification policy")]
    TlsConfig(#[source] TransportError),

    #[error("Unable to attach request header")]
    HeaderSetup(#[source] TransportError),

    #[error("Unable to start request")]
    RequestStart(#[source] TransportError),

    #[error("No response status within {timeout:?}")]
    StatusTimeout {
        timeout: Duration,
        #[source]
        source: Option<TransportError>,
    },

    #[error("Request returned status code {status}")]
    HttpStatus { status: u16 },

    #[error("Transport failed while receiving the body")]
    Transport(#[source] TransportError),

    #[error("Downloaded {received} bytes, more than the {limit} byte limit")]
    ResponseTooLarge { limit: usize, received: usize },

    #[error("Failed to allocate {requested} bytes")]
    OutOfMemory { requested: usize },
}

/// Flat discriminant of a [`FetchError`], convenient for matching and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    ConnectionSetup,
    TlsConfig,
    HeaderSetup,
    RequestStart,
    StatusTimeout,
    HttpStatus(u16),
    TransportError(u32),
    ResponseTooLarge,
    OutOfMemory,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            FetchError::ConnectionSetup(_) => ErrorKind::ConnectionSetup,
            FetchError::TlsConfig(_) => ErrorKind::TlsConfig,
            FetchError::HeaderSetup(_) => ErrorKind::HeaderSetup,
            FetchError::RequestStart(_) => ErrorKind::RequestStart,
            FetchError::StatusTimeout { .. } => ErrorKind::StatusTimeout,
            FetchError::HttpStatus { status } => ErrorKind::HttpStatus(*status),
            FetchError::Transport(err) => ErrorKind::TransportError(err.code),
            FetchError::ResponseTooLarge { .. } => ErrorKind::ResponseTooLarge,
            FetchError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
        }
    }

    /// The nibble-packed status diagnostic, for non-200 responses with at most four digits.
    pub fn diagnostic_code(&self) -> Option<u32> {
        match self {
            FetchError::HttpStatus { status } => diagnostic_code(*status),
            _ => None,
        }
    }

    /// The raw transport code behind this error, when a transport call caused it.
    pub fn transport_code(&self) -> Option<u32> {
        match self {
            FetchError::ConnectionSetup(err)
            | FetchError::TlsConfig(err)
            | FetchError::HeaderSetup(err)
            | FetchError::RequestStart(err)
            | FetchError::Transport(err) => Some(err.code),
            FetchError::StatusTimeout { source, .. } => source.as_ref().map(|err| err.code),
            _ => None,
        }
    }
}

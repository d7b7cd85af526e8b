use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

use reqwest::{Method, Url};

/// Reported when a transport claims to have written more than the window it was given.
pub const CODE_READ_OVERFLOW: u32 = 0xFFFF_FFFE;

/// Whether the transport still has body data to hand out after a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Pending,
    Complete,
}

/// Outcome of a single [`RequestContext::download`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRead {
    /// Bytes written to the front of the window passed to `download`.
    pub read: usize,
    pub state: DownloadState,
}

/// A failure reported by a transport call, identified by a transport-specific numeric code.
#[derive(Debug)]
pub struct TransportError {
    pub code: u32,
    pub message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl TransportError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:08X})", self.message, self.code)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

/// Opens request contexts.
///
/// The network stack behind an implementation is brought up and torn down by the caller;
/// a transport only hands out one context per request.
pub trait Transport {
    type Context: RequestContext;

    fn open(
        &self,
        method: Method,
        url: &Url,
        follow_redirects: bool,
    ) -> Result<Self::Context, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Context = T::Context;

    fn open(
        &self,
        method: Method,
        url: &Url,
        follow_redirects: bool,
    ) -> Result<Self::Context, TransportError> {
        (**self).open(method, url, follow_redirects)
    }
}

/// A single in-flight request. Dropping the context releases it.
pub trait RequestContext {
    fn set_tls_verification(&mut self, verify: bool) -> Result<(), TransportError>;

    fn add_header(&mut self, name: &str, value: &str) -> Result<(), TransportError>;

    /// Starts the network transaction.
    fn begin(&mut self) -> Result<(), TransportError>;

    /// Resolves once the response status line is available.
    fn status(&mut self) -> impl Future<Output = Result<u16, TransportError>>;

    /// Copies at most `window.len()` body bytes into `window`.
    fn download(
        &mut self,
        window: &mut [u8],
    ) -> impl Future<Output = Result<ChunkRead, TransportError>>;
}

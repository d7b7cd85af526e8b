mod diagnostic;
mod download_buffer;
mod error;
mod fetch_request;
mod fetch_response;
mod reqwest_transport;
mod session;
mod transport;

use std::time::Duration;

pub use diagnostic::{
    decode_diagnostic, diagnostic_code, DIAGNOSTIC_MARKER, MAX_DIAGNOSTIC_STATUS,
};
use download_buffer::DownloadBuffer;
pub use error::{ErrorKind, FetchError, FetchResult};
pub use fetch_request::FetchRequest;
pub use fetch_response::FetchResponse;
pub use reqwest;
pub use reqwest::Method;
pub use reqwest_transport::{ReqwestContext, ReqwestTransport, DEFAULT_REDIRECT_LIMIT};
pub use session::Session;
pub use transport::{
    ChunkRead, DownloadState, RequestContext, Transport, TransportError, CODE_READ_OVERFLOW,
};
use tracing::{debug, info, warn};

pub const USER_AGENT: &str = "lumadl";
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(15);
pub const MAX_DOWNLOAD_SIZE: usize = 1024 * 1024;
/// Size of each read, and of each buffer growth step.
pub const CHUNK_SIZE: usize = 0x1000;

/// Downloads a single body into memory, refusing anything larger than the request's size limit.
#[derive(Debug)]
pub struct BoundedFetcher<T> {
    transport: T,
}

impl<T: Transport> BoundedFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a GET for `request.url` and collects the body.
    ///
    /// Only a `200` response is accepted. The status line must arrive within
    /// `request.status_timeout`; the body itself is read until the transport reports completion
    /// or the received length exceeds `request.size_limit`. The request context is released
    /// before returning on every path.
    ///
    /// # Example
    /// ```rust
    ///     use httpmock::prelude::*;
    ///     use lumadl::{BoundedFetcher, FetchRequest, ReqwestTransport};
    ///
    ///     #[tokio::main]
    ///     async fn main() {
    ///         let server = MockServer::start();
    ///
    ///         server.mock(|when, then| {
    ///             when.path("/boot.firm").method(GET);
    ///             then.status(200).body("FIRM");
    ///         });
    ///
    ///         let fetcher = BoundedFetcher::new(ReqwestTransport::default());
    ///         let request = FetchRequest::new(&server.url("/boot.firm")).unwrap();
    ///
    ///         let response = fetcher.fetch(&request).await.unwrap();
    ///         assert_eq!(&b"FIRM"[..], &response.body[..]);
    ///     }
    /// ```
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchResponse> {
        info!(url = %request.url, "Downloading");

        let mut context = self
            .transport
            .open(Method::GET, &request.url, true)
            .map_err(FetchError::ConnectionSetup)?;

        context
            .set_tls_verification(request.verify_tls)
            .map_err(FetchError::TlsConfig)?;
        context
            .add_header(reqwest::header::USER_AGENT.as_str(), &request.user_agent)
            .map_err(FetchError::HeaderSetup)?;
        context.begin().map_err(FetchError::RequestStart)?;

        let status = match tokio::time::timeout(request.status_timeout, context.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => {
                return Err(FetchError::StatusTimeout {
                    timeout: request.status_timeout,
                    source: Some(err),
                })
            }
            Err(_) => {
                return Err(FetchError::StatusTimeout {
                    timeout: request.status_timeout,
                    source: None,
                })
            }
        };
        info!(status, "Request returned status code");

        if status != 200 {
            return Err(FetchError::HttpStatus { status });
        }

        let mut buffer = DownloadBuffer::new(request.size_limit)?;
        let mut chunks = 0;
        loop {
            let chunk = context
                .download(buffer.window())
                .await
                .map_err(FetchError::Transport)?;
            chunks += 1;

            if let Err(err) = buffer.advance(chunk.read) {
                warn!(%err, "Download aborted");
                return Err(err);
            }
            debug!(
                read = chunk.read,
                len = buffer.len(),
                capacity = buffer.capacity(),
                "Received chunk"
            );

            match chunk.state {
                DownloadState::Pending => buffer.grow()?,
                DownloadState::Complete => break,
            }
        }

        let body = buffer.into_bytes();
        info!(bytes = body.len(), "Download finished");

        Ok(FetchResponse { body, chunks })
    }
}

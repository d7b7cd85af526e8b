use std::mem;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Method, Request, Response, Url};
use tracing::debug;

use crate::transport::{ChunkRead, DownloadState, RequestContext, Transport, TransportError};

pub const CODE_UNSUPPORTED_SCHEME: u32 = 0xD8A0_0001;
pub const CODE_INVALID_STATE: u32 = 0xD8A0_0002;
pub const CODE_INVALID_HEADER: u32 = 0xD8A0_0003;
pub const CODE_BUILDER: u32 = 0xD8A0_0004;
pub const CODE_CONNECT: u32 = 0xD8A0_0005;
pub const CODE_TIMEOUT: u32 = 0xD8A0_0006;
pub const CODE_REDIRECT: u32 = 0xD8A0_0007;
pub const CODE_BODY: u32 = 0xD8A0_0008;
pub const CODE_REQUEST: u32 = 0xD8A0_0009;
pub const CODE_UNKNOWN: u32 = 0xD8A0_00FF;

pub const DEFAULT_REDIRECT_LIMIT: usize = 10;

/// [`Transport`] backed by a `reqwest` client built per request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    redirect_limit: usize,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
        }
    }
}

impl ReqwestTransport {
    pub fn new(redirect_limit: usize) -> Self {
        Self { redirect_limit }
    }

    pub fn redirect_limit(&self) -> usize {
        self.redirect_limit
    }
}

impl Transport for ReqwestTransport {
    type Context = ReqwestContext;

    fn open(
        &self,
        method: Method,
        url: &Url,
        follow_redirects: bool,
    ) -> Result<ReqwestContext, TransportError> {
        match url.scheme() {
            "https" | "http" => {}
            scheme => {
                return Err(TransportError::new(
                    CODE_UNSUPPORTED_SCHEME,
                    format!("unsupported url scheme {scheme}"),
                ))
            }
        }

        let policy = if follow_redirects {
            Policy::limited(self.redirect_limit)
        } else {
            Policy::none()
        };
        debug!(%url, "Opened request context");

        Ok(ReqwestContext {
            method,
            url: url.clone(),
            headers: HeaderMap::new(),
            phase: Phase::Configuring(ClientBuilder::new().redirect(policy)),
        })
    }
}

enum Phase {
    Configuring(ClientBuilder),
    Started { client: Client, request: Request },
    Streaming { response: Response, pending: Bytes },
    Closed,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Configuring(_) => "configuring",
            Phase::Started { .. } => "started",
            Phase::Streaming { .. } => "streaming",
            Phase::Closed => "closed",
        }
    }
}

pub struct ReqwestContext {
    method: Method,
    url: Url,
    headers: HeaderMap,
    phase: Phase,
}

impl ReqwestContext {
    fn invalid_state(&self, operation: &str) -> TransportError {
        TransportError::new(
            CODE_INVALID_STATE,
            format!("cannot {operation} while {}", self.phase.name()),
        )
    }
}

impl RequestContext for ReqwestContext {
    fn set_tls_verification(&mut self, verify: bool) -> Result<(), TransportError> {
        match mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Configuring(builder) => {
                self.phase = Phase::Configuring(builder.danger_accept_invalid_certs(!verify));
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.invalid_state("change TLS options"))
            }
        }
    }

    fn add_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        if !matches!(self.phase, Phase::Configuring(_)) {
            return Err(self.invalid_state("add headers"));
        }

        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            TransportError::new(CODE_INVALID_HEADER, format!("invalid header name {name}"))
                .with_source(e)
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::new(CODE_INVALID_HEADER, format!("invalid value for {name}"))
                .with_source(e)
        })?;
        self.headers.append(name, value);
        Ok(())
    }

    fn begin(&mut self) -> Result<(), TransportError> {
        let builder = match mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Configuring(builder) => builder,
            other => {
                self.phase = other;
                return Err(self.invalid_state("begin"));
            }
        };

        let client = builder.build().map_err(map_reqwest_error)?;
        let request = client
            .request(self.method.clone(), self.url.clone())
            .headers(mem::take(&mut self.headers))
            .build()
            .map_err(map_reqwest_error)?;

        self.phase = Phase::Started { client, request };
        Ok(())
    }

    async fn status(&mut self) -> Result<u16, TransportError> {
        let (client, request) = match mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Started { client, request } => (client, request),
            other => {
                self.phase = other;
                return Err(self.invalid_state("wait for status"));
            }
        };

        let response = client.execute(request).await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();

        self.phase = Phase::Streaming {
            response,
            pending: Bytes::new(),
        };
        Ok(status)
    }

    async fn download(&mut self, window: &mut [u8]) -> Result<ChunkRead, TransportError> {
        let (response, pending) = match &mut self.phase {
            Phase::Streaming { response, pending } => (response, pending),
            _ => return Err(self.invalid_state("download")),
        };

        while pending.is_empty() {
            match response.chunk().await.map_err(map_reqwest_error)? {
                Some(chunk) => *pending = chunk,
                None => {
                    return Ok(ChunkRead {
                        read: 0,
                        state: DownloadState::Complete,
                    })
                }
            }
        }

        let read = window.len().min(pending.len());
        window[..read].copy_from_slice(&pending.split_to(read));

        Ok(ChunkRead {
            read,
            state: DownloadState::Pending,
        })
    }
}

impl Drop for ReqwestContext {
    fn drop(&mut self) {
        debug!(url = %self.url, phase = self.phase.name(), "Released request context");
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let code = if err.is_timeout() {
        CODE_TIMEOUT
    } else if err.is_connect() {
        CODE_CONNECT
    } else if err.is_redirect() {
        CODE_REDIRECT
    } else if err.is_body() || err.is_decode() {
        CODE_BODY
    } else if err.is_builder() {
        CODE_BUILDER
    } else if err.is_request() {
        CODE_REQUEST
    } else {
        CODE_UNKNOWN
    };

    TransportError::new(code, err.to_string()).with_source(err)
}

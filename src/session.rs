use tracing::debug;

use crate::{BoundedFetcher, ReqwestTransport, DEFAULT_REDIRECT_LIMIT};

/// Process-wide download session. Owns the transport every fetch of the process goes through;
/// created once at start-up and closed when dropped.
#[derive(Debug)]
pub struct Session {
    transport: ReqwestTransport,
}

impl Session {
    pub fn init() -> Self {
        Self::with_redirect_limit(DEFAULT_REDIRECT_LIMIT)
    }

    pub fn with_redirect_limit(redirect_limit: usize) -> Self {
        debug!(redirect_limit, "Session started");
        Self {
            transport: ReqwestTransport::new(redirect_limit),
        }
    }

    pub fn transport(&self) -> &ReqwestTransport {
        &self.transport
    }

    pub fn fetcher(&self) -> BoundedFetcher<&ReqwestTransport> {
        BoundedFetcher::new(&self.transport)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Session closed");
    }
}

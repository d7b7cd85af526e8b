use std::time::Duration;

use reqwest::Url;

use crate::{FetchError, FetchResult, MAX_DOWNLOAD_SIZE, STATUS_TIMEOUT, USER_AGENT};

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
    pub user_agent: String,
    /// Certificate verification is off by default; this tool only bootstraps a recovery image.
    pub verify_tls: bool,
    /// How long to wait for the response status line
    pub status_timeout: Duration,
    /// Largest body accepted before the download is aborted
    pub size_limit: usize,
}

impl FetchRequest {
    /// Creates a request for `url` with the default user agent, timeout and size limit.
    ///
    /// # Example
    /// ```rust
    /// use lumadl::FetchRequest;
    /// let request = FetchRequest::new("https://localhost/boot.firm").unwrap();
    /// assert_eq!("lumadl", request.user_agent);
    /// assert!(FetchRequest::new("not a url").is_err());
    /// ```
    pub fn new(url: &str) -> FetchResult<Self> {
        let url: Url = url
            .parse()
            .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        Ok(Self {
            url,
            user_agent: USER_AGENT.to_string(),
            verify_tls: false,
            status_timeout: STATUS_TIMEOUT,
            size_limit: MAX_DOWNLOAD_SIZE,
        })
    }
}

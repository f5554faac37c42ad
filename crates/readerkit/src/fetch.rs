//! Direct and proxied page fetching
//!
//! One shared [`HttpClient`] per [`Reader`](crate::Reader) carries the
//! browser-like header set and the connection pool. Every call is bounded
//! by its own timeout.

use crate::client::ReaderOptions;
use crate::error::ReaderError;
use crate::DEFAULT_USER_AGENT;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Body and location of a fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Response body decoded as text
    pub body: String,
    /// URL after redirects
    pub final_url: String,
}

/// HTTP client with the desktop-browser header set
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client from the configured headers
    pub fn new(options: &ReaderOptions) -> Result<Self, ReaderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&options.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        for (name, value) in [
            (ACCEPT, &options.accept),
            (ACCEPT_LANGUAGE, &options.accept_language),
        ] {
            match HeaderValue::from_str(value) {
                Ok(header) => {
                    headers.insert(name, header);
                }
                Err(e) => {
                    warn!(
                        header = %name,
                        value = %value,
                        error = %e,
                        "Ignoring invalid header value"
                    );
                }
            }
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(ReaderError::ClientBuildError)?;

        Ok(Self { client })
    }

    async fn get_ok(&self, url: &str, timeout: Duration) -> Result<reqwest::Response, ReaderError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(ReaderError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReaderError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }

    /// GET a page, failing on transport errors and non-2xx statuses
    pub async fn get_page(&self, url: &str, timeout: Duration) -> Result<FetchedPage, ReaderError> {
        let response = self.get_ok(url, timeout).await?;
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(ReaderError::from_reqwest)?;
        debug!(url = %url, final_url = %final_url, size = body.len(), "Fetched page");
        Ok(FetchedPage { body, final_url })
    }

    /// GET and decode a JSON document
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, ReaderError> {
        let response = self.get_ok(url, timeout).await?;
        let bytes = response.bytes().await.map_err(ReaderError::from_reqwest)?;
        serde_json::from_slice(&bytes).map_err(|e| ReaderError::InvalidPayload(e.to_string()))
    }
}

/// Direct GET of the target page
///
/// Any transport failure or non-2xx status is returned as an error; there
/// is no fallback here.
pub async fn fetch_raw(
    client: &HttpClient,
    url: &str,
    options: &ReaderOptions,
) -> Result<FetchedPage, ReaderError> {
    client.get_page(url, options.fetch_timeout).await
}

/// Fetch a JavaScript-rendered snapshot through the rendering proxy
///
/// Returns `None` when the proxy is disabled, fails, or returns no body.
pub async fn fetch_via_proxy(
    client: &HttpClient,
    url: &str,
    options: &ReaderOptions,
) -> Option<String> {
    let prefix = options.proxy_prefix.as_deref()?;
    let proxy_url = format!("{}{}", prefix, url);

    match client.get_page(&proxy_url, options.proxy_timeout).await {
        Ok(page) if !page.body.trim().is_empty() => Some(page.body),
        Ok(_) => {
            warn!(stage = "proxy", url = %url, "Rendering proxy returned an empty body");
            None
        }
        Err(e) => {
            warn!(stage = "proxy", url = %url, error = %e, "Rendering proxy fetch failed");
            None
        }
    }
}

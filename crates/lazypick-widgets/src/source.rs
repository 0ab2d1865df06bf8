//! Where pages come from.
//!
//! [`PageSource`] is the seam between the page store and the network. The
//! store only ever calls [`PageSource::fetch`] and awaits the returned
//! future inside a [`Command`](lazypick_core::Command), so tests swap in a
//! scripted source and decide exactly when each response lands.

use crate::option::Page;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;

/// Why a page could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (connection, DNS, timeout).
    #[error("request failed: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),
    /// The body was not a page.
    #[error("malformed page: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// A paginated provider of options.
///
/// `fetch` is called synchronously when a load starts; the request itself
/// happens when the returned future is polled.
pub trait PageSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Page, FetchError>>;
}

/// Fetches pages over HTTP with `GET url`.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Build a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lazypick/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Page, FetchError>> {
        let request = self.client.get(url);
        let url = url.to_string();
        async move {
            tracing::debug!(%url, "requesting page");
            let resp = request.send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            let body = resp.bytes().await?;
            Ok(Page::from_json(&body)?)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_for_display() {
        assert_eq!(FetchError::Status(503).to_string(), "HTTP 503");
        assert_eq!(
            FetchError::Transport("timed out".into()).to_string(),
            "request failed: timed out"
        );
        let decode = FetchError::from(Page::from_json(b"nope").unwrap_err());
        assert!(decode.to_string().starts_with("malformed page"));
    }

    #[test]
    fn http_source_builds_with_timeout() {
        assert!(HttpSource::new(Duration::from_secs(3)).is_ok());
    }
}

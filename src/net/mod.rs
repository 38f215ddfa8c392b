//! HTTP plumbing shared by the catalog client and the image fetcher.
//!
//! One lazily-built [`reqwest::Client`] is reused by every request. It carries
//! the fixed per-request timeout and user agent; there is no rate limiting or
//! retry layer.
//!
//! Status mapping is the same for every call:
//!
//! - `2xx` → success
//! - `404` → [`Error::NotFound`]
//! - anything else → [`Error::Request`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use mangaka::net::HttpClient;
//!
//! # async fn example() -> mangaka::Result<()> {
//! let client = HttpClient::new();
//! let json: serde_json::Value = client.get_json("https://api.mangadex.org/ping").await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Error, Result};

/// Overall timeout applied to each request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const USER_AGENT: &str = "Mangaka-CLI/1.0";

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Thin wrapper over the shared client that applies the crate's status mapping.
#[derive(Clone, Debug, Default)]
pub struct HttpClient;

impl HttpClient {
    pub fn new() -> Self {
        Self
    }

    /// Sends a GET and returns the response once its status has been checked.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] - the server answered 404
    /// * [`Error::Request`] - any other non-success status
    /// * [`Error::Network`] - connection or timeout failures
    pub async fn send(&self, url: &str) -> Result<Response> {
        debug!(url, "GET");
        let response = CLIENT.get(url).send().await?;
        check_status(response.status(), url)?;
        Ok(response)
    }

    /// Performs a GET and returns the whole body.
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        let response = self.send(url).await?;
        Ok(response.bytes().await?)
    }

    /// Performs a GET and decodes the body as JSON.
    ///
    /// Malformed bodies surface as [`Error::Decode`].
    pub async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let bytes = self.get(url).await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Streams the body of `url` into a file at `output_path`, returning the byte count.
    ///
    /// The file is created (or truncated) only after the status check passes,
    /// so a 404 leaves nothing on disk. A transfer that fails midway leaves the
    /// partial file in place.
    pub async fn download_to(&self, url: &str, output_path: &Path) -> Result<u64> {
        let mut response = self.send(url).await?;
        let mut file = fs::File::create(output_path).await?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(url, bytes = written, path = %output_path.display(), "saved");
        Ok(written)
    }
}

fn check_status(status: StatusCode, url: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND {
        Err(Error::not_found(url))
    } else {
        Err(Error::request(status.as_u16(), url))
    }
}

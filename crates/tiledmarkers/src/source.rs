//! Where tile payloads come from.
//!
//! The engine only needs "bytes for address (z, x, y), or an error". Transport
//! and retry policy belong to the [`TileSource`] implementation.

use std::{future::Future, pin::Pin};

use crate::{
    config::LayerConfig,
    error::{Error, Result},
    types::TileAddress,
};

/// Future type for tile fetches.
#[cfg(not(target_family = "wasm"))]
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

/// Future type for tile fetches.
///
/// Browser fetches are not `Send`, so the bound is dropped on WASM.
#[cfg(target_family = "wasm")]
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + 'a>>;

/// `Send + Sync` on native targets, no bound on WASM.
#[cfg(not(target_family = "wasm"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_family = "wasm"))]
impl<T: Send + Sync> MaybeSendSync for T {}

/// `Send + Sync` on native targets, no bound on WASM.
#[cfg(target_family = "wasm")]
pub trait MaybeSendSync {}
#[cfg(target_family = "wasm")]
impl<T> MaybeSendSync for T {}

/// A provider of raw tile payloads.
pub trait TileSource: MaybeSendSync {
    /// Fetch the payload for `address`.
    fn fetch(&self, address: TileAddress) -> FetchFuture<'_>;
}

/// Fetches tiles over HTTP from a URL template.
///
/// # Example
///
/// ```ignore
/// let source = HttpTileSource::new("https://example.org/catalog/{z}/{y}/{x}.pbf");
/// let payload = source.fetch(TileAddress::new(2, 1, 3)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpTileSource {
    http: reqwest::Client,
    url_template: String,
    flip_rows: bool,
}

impl HttpTileSource {
    /// Create a source with a default HTTP client.
    #[must_use]
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url_template: url_template.into(),
            flip_rows: false,
        }
    }

    /// Create a source from validated layer options.
    pub fn from_config(config: &LayerConfig) -> Result<Self> {
        config.validate()?;

        #[allow(unused_mut)]
        let mut builder = reqwest::Client::builder();
        #[cfg(not(target_family = "wasm"))]
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| Error::Config {
            detail: format!("failed to build http client: {e}"),
        })?;

        Ok(Self {
            http,
            url_template: config.tile_url.clone(),
            flip_rows: config.flip_rows,
        })
    }

    /// Use a custom HTTP client.
    #[must_use]
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Count rows from the opposite grid edge when building URLs.
    #[must_use]
    pub fn with_flipped_rows(mut self, flip_rows: bool) -> Self {
        self.flip_rows = flip_rows;
        self
    }

    /// The URL of the payload for `address`.
    #[must_use]
    pub fn resource_url(&self, address: TileAddress) -> String {
        let row = if self.flip_rows {
            address.flipped_row()
        } else {
            u64::from(address.row)
        };
        self.url_template
            .replace("{z}", &address.zoom.to_string())
            .replace("{x}", &address.column.to_string())
            .replace("{y}", &row.to_string())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "fetching");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await.map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(data.to_vec())
    }
}

impl TileSource for HttpTileSource {
    fn fetch(&self, address: TileAddress) -> FetchFuture<'_> {
        Box::pin(async move {
            let url = self.resource_url(address);
            self.fetch_bytes(&url).await
        })
    }
}

//! Byte-range access to remote raster assets

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, StatusCode};
use tracing::debug;

use crate::error::{Error, Result};

/// Source of byte ranges for an asset href
///
/// A response may be shorter than `length` when the asset ends first.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Reads `length` bytes starting at `offset`
    async fn read_range(&self, href: &str, offset: u64, length: u64) -> Result<Bytes>;
}

/// HTTP(S) byte source using `Range` requests
#[derive(Clone)]
pub struct HttpByteSource {
    client: Client,
}

impl HttpByteSource {
    /// Creates a byte source whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ByteSource for HttpByteSource {
    async fn read_range(&self, href: &str, offset: u64, length: u64) -> Result<Bytes> {
        if !(href.starts_with("https://") || href.starts_with("http://")) {
            return Err(Error::Unsupported(format!("Asset href scheme: {}", href)));
        }
        if length == 0 {
            return Ok(Bytes::new());
        }

        let range = format!("bytes={}-{}", offset, offset + length - 1);
        debug!(href, range = %range, "Fetching byte range");

        let response = self
            .client
            .get(href)
            .header(header::RANGE, range)
            .send()
            .await?;

        match response.status() {
            StatusCode::PARTIAL_CONTENT => Ok(response.bytes().await?),
            // Server ignored the range header and sent the whole object
            StatusCode::OK => {
                let body = response.bytes().await?;
                let start = (offset as usize).min(body.len());
                let end = (start + length as usize).min(body.len());
                Ok(body.slice(start..end))
            }
            status => Err(Error::Load(format!("GET {} returned {}", href, status))),
        }
    }
}

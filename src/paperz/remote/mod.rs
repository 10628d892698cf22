//! Remote access layer.
//!
//! The [`Transport`] trait abstracts the HTTP capability so the client
//! can run against different backends:
//!
//! - [`http::HttpTransport`]: production transport (blocking reqwest,
//!   `Authorization: Token` header on every call)
//! - [`memory::InMemoryTransport`]: canned responses for testing
//!
//! [`RemoteClient`] layers the server's conventions on top: cursor-
//! following pagination, single-resource fetches, raw artifact downloads
//! and partial-body PATCHes. All calls are synchronous and sequential;
//! there is no overlap between page fetches.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{PaperzError, Result};
use crate::model::{Page, RawDocument};

pub mod http;
pub mod memory;

/// Black-box request/response capability.
///
/// Implementations return the HTTP status in-band; only transport-level
/// failures (no connection, invalid URL) surface as errors.
pub trait Transport {
    fn get(&self, url: &str) -> Result<(u16, String)>;

    /// Raw byte variant for binary artifacts.
    fn get_bytes(&self, url: &str) -> Result<(u16, Vec<u8>)>;

    fn patch(&self, url: &str, body: &serde_json::Value) -> Result<(u16, String)>;
}

/// Client for one server, generic over the transport.
pub struct RemoteClient<T: Transport> {
    transport: T,
    base_url: String,
}

impl<T: Transport> RemoteClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        let mut base_url = base_url.trim_end_matches('/').to_string();
        base_url.push('/');
        Self {
            transport,
            base_url,
        }
    }

    /// Endpoint paths get a trailing slash unless they already carry one
    /// or a query string; the server redirects otherwise.
    fn url_for(&self, endpoint: &str) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint);
        if !endpoint.ends_with('/') && !endpoint.contains('?') {
            url.push('/');
        }
        url
    }

    /// Fetch every page of a list endpoint, following the `next` cursor
    /// until the server signals exhaustion.
    ///
    /// A failed page truncates pagination: whatever has been accumulated
    /// is returned as a partial result and the failure is logged, not
    /// raised.
    pub fn fetch_all<R: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<R>> {
        let mut results = Vec::new();
        let mut url = self.url_for(endpoint);
        loop {
            let (status, body) = self.transport.get(&url)?;
            if status != 200 {
                warn!(url = %url, status, "page fetch failed, returning partial results");
                break;
            }
            let page: Page<R> = serde_json::from_str(&body)?;
            results.extend(page.results);
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }
        debug!(endpoint, count = results.len(), "fetched");
        Ok(results)
    }

    /// Fetch a single document resource. A non-success status means the
    /// document is simply absent from the result.
    pub fn fetch_document(&self, id: u32) -> Result<Option<RawDocument>> {
        let url = self.url_for(&format!("documents/{}", id));
        let (status, body) = self.transport.get(&url)?;
        if status != 200 {
            warn!(url = %url, status, "document fetch failed");
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    /// PATCH a partial body onto a single document resource, returning
    /// the updated record.
    pub fn patch_document(&self, id: u32, body: &serde_json::Value) -> Result<RawDocument> {
        let url = self.url_for(&format!("documents/{}", id));
        let (status, text) = self.transport.patch(&url, body)?;
        if status != 200 {
            return Err(PaperzError::Remote { status, url });
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Download a binary artifact to `dest`. The file handle is scoped to
    /// this call and released on every exit path.
    pub fn download(&self, endpoint: &str, dest: &Path) -> Result<()> {
        let url = self.url_for(endpoint);
        let (status, bytes) = self.transport.get_bytes(&url)?;
        if status != 200 {
            return Err(PaperzError::Remote { status, url });
        }
        let mut file = File::create(dest)?;
        file.write_all(&bytes)?;
        Ok(())
    }

    pub fn download_pdf(&self, id: u32, dest: &Path) -> Result<()> {
        self.download(&format!("documents/{}/download/", id), dest)
    }

    pub fn download_thumbnail(&self, id: u32, dest: &Path) -> Result<()> {
        self.download(&format!("documents/{}/thumb/", id), dest)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

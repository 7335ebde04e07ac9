//! HTTP transport boundary.
//!
//! The orchestrator speaks to the network through the [`Transport`] trait:
//! one GET per call, carrying the resolved cache directive, answered with a
//! status line plus a body reader or a [`TransportError`]. [`HttpTransport`]
//! is the production implementation.

mod http;

pub use http::{HttpConfig, HttpTransport};

use std::fmt;
use std::io::{Cursor, Read};

use thiserror::Error;
use url::Url;

use crate::cache::CacheDirective;

/// One outbound request: the materialized URL plus its cache directive.
/// The method is always GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub url: Url,
    pub directive: CacheDirective,
}

/// Status line plus the body reader. Classification happens in the caller;
/// the transport never interprets the status beyond revalidation handling.
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Box<dyn Read + Send>,
}

impl TransportResponse {
    /// Response served from already-buffered bytes (a cache hit, typically).
    pub fn from_bytes(status: u16, status_text: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: Box::new(Cursor::new(body)),
        }
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .finish_non_exhaustive()
    }
}

/// I/O failure while establishing the connection or transferring data.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A cache-only request found no acceptable stored response.
    #[error("no cached response for {0}")]
    CacheOnlyMiss(Url),

    #[error("cache store error: {0}")]
    Store(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Other(String),
}

/// Executes one request, honoring its cache directive.
pub trait Transport: Send + Sync {
    fn execute(&self, request: ResourceRequest) -> Result<TransportResponse, TransportError>;
}

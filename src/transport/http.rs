//! reqwest-backed transport with a directive-driven response store.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, CACHE_CONTROL, ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use tracing::{trace, warn};

use super::{ResourceRequest, Transport, TransportError, TransportResponse};
use crate::cache::{
    unix_now, CacheStore, CacheStoreConfig, DiskCacheStore, EntryMetadata, StoredEntry,
};

const USER_AGENT: &str = concat!("external-resources/", env!("CARGO_PKG_VERSION"));

/// Freshness granted when the origin sends no max-age of its own.
const DEFAULT_FRESHNESS_SECS: u64 = 60;

/// Transport configuration.
///
/// The three time budgets are independent: connection establishment gets its
/// own deadline, the exchange (request write plus response read) another.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub user_agent: String,
    /// On-disk response store; `None` disables caching entirely.
    pub cache: Option<CacheStoreConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(20),
            write_timeout: Duration::from_secs(20),
            user_agent: USER_AGENT.to_owned(),
            cache: None,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn cache(mut self, cache: CacheStoreConfig) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Production [`Transport`]: a blocking reqwest client plus an optional
/// response store driven by the request's cache directive.
pub struct HttpTransport {
    client: Client,
    store: Option<Box<dyn CacheStore>>,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let store = match &config.cache {
            Some(cache) => Some(Box::new(DiskCacheStore::open(cache)?) as Box<dyn CacheStore>),
            None => None,
        };
        Self::with_store(config, store)
    }

    /// Build with a caller-supplied response store.
    pub fn with_store(
        config: &HttpConfig,
        store: Option<Box<dyn CacheStore>>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            // reqwest enforces a single exchange deadline; it covers the read
            // and write budgets together.
            .timeout(config.read_timeout + config.write_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, store })
    }

    fn fetch(
        &self,
        request: &ResourceRequest,
        held: Option<StoredEntry>,
    ) -> Result<TransportResponse, TransportError> {
        let mut outbound = self.client.get(request.url.clone());
        if let Some(value) = request.directive.header_value() {
            outbound = outbound.header(CACHE_CONTROL, value);
        }
        if let Some(etag) = held.as_ref().and_then(|entry| entry.metadata.etag.as_deref()) {
            outbound = outbound.header(IF_NONE_MATCH, etag);
        }

        let response = outbound.send()?;
        let status = response.status();
        let status_text = reason(status);

        if status == StatusCode::NOT_MODIFIED {
            if let (Some(store), Some(entry)) = (&self.store, held) {
                trace!(url = %request.url, "origin revalidated stored response");
                let StoredEntry { metadata, body } = entry;
                let refreshed = EntryMetadata {
                    stored_at: unix_now(),
                    ..metadata
                };
                if let Err(err) = store.store(&request.url, &refreshed, &body) {
                    warn!(url = %request.url, error = %err, "failed to refresh stored response");
                }
                return Ok(TransportResponse::from_bytes(
                    refreshed.status,
                    refreshed.status_text.clone(),
                    body,
                ));
            }
        }

        // Persist only successful, storable responses; everything else
        // streams straight through to classification.
        let storable = !request.directive.no_store && status.as_u16() < 300;
        match (&self.store, storable) {
            (Some(store), true) => {
                let fresh_for = freshness_lifetime(response.headers());
                let etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned);
                let bytes = response.bytes()?;
                let metadata = EntryMetadata {
                    stored_at: unix_now(),
                    fresh_for,
                    status: status.as_u16(),
                    status_text: status_text.clone(),
                    etag,
                    size: bytes.len() as u64,
                };
                if let Err(err) = store.store(&request.url, &metadata, &bytes) {
                    warn!(url = %request.url, error = %err, "failed to persist response");
                }
                Ok(TransportResponse::from_bytes(
                    status.as_u16(),
                    status_text,
                    bytes.to_vec(),
                ))
            }
            _ => Ok(TransportResponse {
                status: status.as_u16(),
                status_text,
                body: Box::new(response),
            }),
        }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ResourceRequest) -> Result<TransportResponse, TransportError> {
        let directive = request.directive;
        let Some(store) = &self.store else {
            if directive.only_if_cached {
                return Err(TransportError::CacheOnlyMiss(request.url));
            }
            return self.fetch(&request, None);
        };

        let now = unix_now();
        if directive.only_if_cached {
            return match store.load(&request.url)? {
                Some(entry) if entry.is_acceptable(directive.max_stale, now) => {
                    trace!(url = %request.url, "serving cache-only response");
                    Ok(served(entry))
                }
                _ => Err(TransportError::CacheOnlyMiss(request.url)),
            };
        }

        // Under no-store the stored copy is out of bounds for reading too;
        // the policy that requests it pairs it with no-cache.
        let held = if directive.no_store {
            None
        } else {
            store.load(&request.url)?
        };

        if !directive.no_cache {
            if let Some(entry) = &held {
                if entry.is_acceptable(directive.max_stale, now) {
                    trace!(
                        url = %request.url,
                        age = now.saturating_sub(entry.metadata.stored_at),
                        "serving stored response"
                    );
                    return Ok(served(entry.clone()));
                }
            }
        }

        self.fetch(&request, held)
    }
}

fn served(entry: StoredEntry) -> TransportResponse {
    let StoredEntry { metadata, body } = entry;
    TransportResponse::from_bytes(metadata.status, metadata.status_text, body)
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("").to_owned()
}

/// Freshness lifetime granted by the origin's own `Cache-Control: max-age`.
fn freshness_lifetime(headers: &HeaderMap) -> u64 {
    headers
        .get(CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .split(',')
                .find_map(|token| token.trim().strip_prefix("max-age=")?.parse::<u64>().ok())
        })
        .unwrap_or(DEFAULT_FRESHNESS_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn freshness_comes_from_max_age() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        );
        assert_eq!(freshness_lifetime(&headers), 3600);
    }

    #[test]
    fn freshness_falls_back_without_max_age() {
        assert_eq!(freshness_lifetime(&HeaderMap::new()), DEFAULT_FRESHNESS_SECS);

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-transform"));
        assert_eq!(freshness_lifetime(&headers), DEFAULT_FRESHNESS_SECS);
    }
}

//! Fetch orchestration.
//!
//! [`Downloader`] composes the query assembly, the policy resolution and the
//! transport into one blocking `load` call: materialize the URL from a fresh
//! device snapshot, resolve the cache directive (consuming the one-shot
//! force-clear flag), execute the GET, classify the status, and hand a
//! successful body to the converter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::{CacheDirective, CachePolicy};
use crate::converter::{Converter, JsonConverter};
use crate::device::{DeviceStateProvider, StaticProvider};
use crate::endpoint::{Endpoint, QueryOptions};
use crate::error::Error;
use crate::model::Resources;
use crate::transport::{HttpConfig, HttpTransport, ResourceRequest, Transport};
use crate::Result;

/// Loads device-tailored resource bundles from a remote endpoint.
///
/// The endpoint and options are fixed at construction and reused across
/// calls; the snapshot and the cache directive are recomputed per call.
pub struct Downloader {
    endpoint: Endpoint,
    options: QueryOptions,
    provider: Arc<dyn DeviceStateProvider>,
    converter: Arc<dyn Converter>,
    transport: Arc<dyn Transport>,
    force_clear: AtomicBool,
}

impl Downloader {
    pub fn builder(endpoint: Endpoint) -> DownloaderBuilder {
        DownloaderBuilder::new(endpoint)
    }

    /// Arm the one-shot cache clear: the very next `load` call revalidates
    /// with the origin instead of trusting its stored copy.
    pub fn clear_cache(&self) {
        self.force_clear.store(true, Ordering::SeqCst);
    }

    /// Fetch and parse the resource bundle under the given cache policy.
    ///
    /// Blocks until the response is classified. A pending [`clear_cache`]
    /// request is consumed even when this call fails.
    ///
    /// [`clear_cache`]: Downloader::clear_cache
    pub fn load(&self, policy: CachePolicy) -> Result<Resources> {
        let snapshot = self.provider.snapshot();
        let capabilities = self.provider.capabilities();
        let url = self
            .endpoint
            .materialize(&snapshot, &self.options, capabilities);
        debug!(url = %url, "loading resources");

        // Take-and-clear in one atomic step so concurrent loads cannot
        // double-consume a pending clear_cache().
        let force_clear = self.force_clear.swap(false, Ordering::SeqCst);
        let directive = CacheDirective::resolve(policy, force_clear);
        trace!(?policy, ?directive, "resolved cache directive");

        let response = self.transport.execute(ResourceRequest { url, directive })?;
        debug!(status = response.status, "response received");

        if response.status >= 300 {
            return Err(Error::Response {
                status: response.status,
                message: response.status_text,
                policy,
            });
        }

        let mut body = response.body;
        Ok(self.converter.convert(body.as_mut())?)
    }
}

/// Builder for [`Downloader`].
///
/// Only the endpoint is required; the other collaborators default to the
/// JSON converter, a static device-state provider and an HTTP transport
/// built from [`HttpConfig::default`].
pub struct DownloaderBuilder {
    endpoint: Endpoint,
    options: QueryOptions,
    provider: Option<Arc<dyn DeviceStateProvider>>,
    converter: Option<Arc<dyn Converter>>,
    transport: Option<Arc<dyn Transport>>,
    http: HttpConfig,
}

impl DownloaderBuilder {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            options: QueryOptions::default(),
            provider: None,
            converter: None,
            transport: None,
            http: HttpConfig::default(),
        }
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn DeviceStateProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Replace the whole transport; primarily for tests and custom stacks.
    /// [`http_config`] is ignored when a transport is supplied.
    ///
    /// [`http_config`]: DownloaderBuilder::http_config
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn build(self) -> Result<Downloader> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.http)?),
        };
        Ok(Downloader {
            endpoint: self.endpoint,
            options: self.options,
            provider: self
                .provider
                .unwrap_or_else(|| Arc::new(StaticProvider::default())),
            converter: self.converter.unwrap_or_else(|| Arc::new(JsonConverter)),
            transport,
            force_clear: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MaxStale;
    use crate::device::{Capabilities, DeviceSnapshot};
    use crate::transport::{TransportError, TransportResponse};
    use std::sync::Mutex;

    type Reply = std::result::Result<(u16, &'static str, &'static str), TransportError>;

    /// Transport double recording every request and replaying canned
    /// responses.
    struct RecordingTransport {
        requests: Mutex<Vec<ResourceRequest>>,
        replies: Mutex<Vec<Reply>>,
    }

    impl RecordingTransport {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                replies: Mutex::new(replies),
            })
        }

        fn recorded(&self) -> Vec<ResourceRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn execute(
            &self,
            request: ResourceRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            let mut replies = self.replies.lock().unwrap();
            match replies.remove(0) {
                Ok((status, text, body)) => Ok(TransportResponse::from_bytes(
                    status,
                    text,
                    body.as_bytes().to_vec(),
                )),
                Err(err) => Err(err),
            }
        }
    }

    fn downloader(transport: Arc<RecordingTransport>) -> Downloader {
        let snapshot = DeviceSnapshot {
            locale: "fr_FR".into(),
            ..DeviceSnapshot::default()
        };
        Downloader::builder(Endpoint::parse("https://example.test/config").unwrap())
            .options(QueryOptions::none().locale(true))
            .provider(Arc::new(StaticProvider::new(snapshot, Capabilities::ALL)))
            .transport(transport)
            .build()
            .unwrap()
    }

    fn ok_reply() -> Reply {
        Ok((200, "OK", r#"{"a":1}"#))
    }

    #[test]
    fn success_returns_converted_body() {
        let transport = RecordingTransport::new(vec![ok_reply()]);
        let resources = downloader(transport.clone())
            .load(CachePolicy::All)
            .unwrap();

        assert_eq!(resources.get_integer("a"), Some(1));
        let requests = transport.recorded();
        assert_eq!(
            requests[0].url.as_str(),
            "https://example.test/config?locale=fr_FR"
        );
        assert!(requests[0].directive.is_empty());
    }

    #[test]
    fn error_status_carries_code_and_policy() {
        let transport = RecordingTransport::new(vec![Ok((404, "Not Found", ""))]);
        let err = downloader(transport).load(CachePolicy::All).unwrap_err();

        match err {
            Error::Response {
                status,
                message,
                policy,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
                assert_eq!(policy, CachePolicy::All);
            }
            other => panic!("expected response error, got {other:?}"),
        }
    }

    #[test]
    fn transport_failure_surfaces_once() {
        let transport =
            RecordingTransport::new(vec![Err(TransportError::Other("connection reset".into()))]);
        let err = downloader(transport.clone()).load(CachePolicy::All).unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(transport.recorded().len(), 1, "no internal retry");
    }

    #[test]
    fn conversion_failure_is_typed() {
        let transport = RecordingTransport::new(vec![Ok((200, "OK", "not json"))]);
        let err = downloader(transport).load(CachePolicy::All).unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[test]
    fn clear_cache_affects_exactly_the_next_load() {
        let transport = RecordingTransport::new(vec![ok_reply(), ok_reply()]);
        let downloader = downloader(transport.clone());

        downloader.clear_cache();
        downloader.load(CachePolicy::Default).unwrap();
        downloader.load(CachePolicy::Default).unwrap();

        let requests = transport.recorded();
        assert!(requests[0].directive.no_cache);
        assert_eq!(requests[0].directive.max_stale, Some(MaxStale::Unbounded));
        assert!(!requests[1].directive.no_cache);
        assert_eq!(requests[1].directive.max_stale, Some(MaxStale::Unbounded));
    }

    #[test]
    fn failed_load_still_consumes_the_clear_request() {
        let transport = RecordingTransport::new(vec![
            Err(TransportError::Other("timeout".into())),
            ok_reply(),
        ]);
        let downloader = downloader(transport.clone());

        downloader.clear_cache();
        assert!(downloader.load(CachePolicy::Default).is_err());
        downloader.load(CachePolicy::Default).unwrap();

        let requests = transport.recorded();
        assert!(requests[0].directive.no_cache);
        assert!(!requests[1].directive.no_cache, "flag spent by the failed call");
    }

    #[test]
    fn offline_policy_requests_cache_only() {
        let transport = RecordingTransport::new(vec![ok_reply()]);
        downloader(transport.clone())
            .load(CachePolicy::Offline)
            .unwrap();

        assert_eq!(transport.recorded()[0].directive, CacheDirective::FORCE_CACHE);
    }
}

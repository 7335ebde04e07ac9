//! # external-resources
//!
//! Fetch remotely hosted resource bundles tailored to the calling device,
//! with request-side HTTP cache policies.
//!
//! ## Overview
//!
//! A [`Downloader`] holds a fixed endpoint and a set of [`QueryOptions`]
//! toggles. Each `load` call takes a fresh [`DeviceSnapshot`] from the
//! configured provider, attaches the enabled attributes as query parameters,
//! resolves the requested [`CachePolicy`] into a transport-level
//! [`CacheDirective`], executes one blocking GET, and either returns the
//! converted [`Resources`] bundle or exactly one typed [`Error`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use external_resources::{CachePolicy, Downloader, Endpoint, QueryOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Downloader::builder(Endpoint::parse("https://example.test/config")?)
//!         .options(QueryOptions::none().locale(true).density_dpi(true))
//!         .build()?;
//!
//!     let resources = downloader.load(CachePolicy::Default)?;
//!     if let Some(title) = resources.get_string("title") {
//!         println!("{title}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Cache policies
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | [`CachePolicy::None`] | Always revalidate, never store |
//! | [`CachePolicy::Offline`] | Serve from cache, never contact the network |
//! | [`CachePolicy::Default`] | Prefer cache, accept arbitrarily stale entries |
//! | [`CachePolicy::All`] | Standard HTTP freshness rules |
//!
//! [`Downloader::clear_cache`] arms a one-shot override: the very next load
//! revalidates with the origin regardless of policy.
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`downloader`] | Orchestration: `load` / `clear_cache` |
//! | [`endpoint`] | Endpoint address and conditional query assembly |
//! | [`cache`] | Policies, directives and the on-disk response store |
//! | [`transport`] | HTTP transport boundary and reqwest implementation |
//! | [`converter`] | Body-to-bundle conversion boundary |
//! | [`device`] | Device snapshots, capabilities and providers |
//! | [`model`] | The `Resources` bundle returned on success |
//!
//! Logging goes through `tracing`; the crate never installs a subscriber or
//! mutates global logging state.

pub mod cache;
pub mod converter;
pub mod device;
pub mod downloader;
pub mod endpoint;
pub mod model;
pub mod transport;

// Re-export main types for convenience
pub use cache::{CacheDirective, CachePolicy, CacheStoreConfig, MaxStale};
pub use converter::{Converter, JsonConverter};
pub use device::{Capabilities, DeviceSnapshot, DeviceStateProvider, StaticProvider};
pub use downloader::{Downloader, DownloaderBuilder};
pub use endpoint::{Endpoint, QueryOptions};
pub use model::{Resource, Resources};
pub use transport::{HttpConfig, HttpTransport, Transport};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;

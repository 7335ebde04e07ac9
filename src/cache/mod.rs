//! Cache policies, directives and the on-disk response store.
//!
//! The split mirrors the two halves of request-side caching:
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CachePolicy`] | Caller-facing policy, one of four closed cases |
//! | [`CacheDirective`] | Transport-level instruction resolved per call |
//! | [`CacheStore`] | Trait for the response store consulted by the transport |
//! | [`DiskCacheStore`] | Store keeping entries under a bounded directory |
//!
//! Directives are transient values: resolved from a policy (plus the one-shot
//! force-clear flag) on every load call, rendered into a `Cache-Control`
//! request header, never persisted.

mod directive;
mod store;

pub use directive::{CacheDirective, CachePolicy, MaxStale};
pub use store::{CacheStore, CacheStoreConfig, DiskCacheStore, EntryMetadata, StoredEntry};

pub(crate) use store::unix_now;

//! Policy-to-directive resolution.

/// Caching behavior requested by the caller for one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// Always revalidate with the origin; never store the response.
    None,
    /// Serve from cache regardless of staleness; never contact the network.
    Offline,
    /// Prefer cache, accepting an arbitrarily stale entry before going to
    /// the network.
    Default,
    /// Standard HTTP freshness rules.
    All,
}

/// Tolerance window within which an expired cached response is still
/// acceptable to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxStale {
    Seconds(u64),
    /// A stale response of any age is acceptable.
    Unbounded,
}

/// Transport-level cache instruction for one request.
///
/// Recomputed on every call from the policy and the one-shot force-clear
/// flag; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheDirective {
    /// The stored copy must be revalidated with the origin before use.
    pub no_cache: bool,
    /// The response must not be persisted.
    pub no_store: bool,
    /// Serve from cache only; a miss is a transport failure.
    pub only_if_cached: bool,
    pub max_stale: Option<MaxStale>,
}

impl CacheDirective {
    /// Serve from cache unconditionally, never contacting the network.
    pub const FORCE_CACHE: CacheDirective = CacheDirective {
        no_cache: false,
        no_store: false,
        only_if_cached: true,
        max_stale: Some(MaxStale::Unbounded),
    };

    /// Resolve the directive for one call.
    ///
    /// `force_clear` wins over the plain policy mapping: the request must
    /// revalidate, and the Offline and Default policies still accept whatever
    /// stale copy survives the revalidation round-trip. Under the None policy
    /// the flag changes nothing, as there is no stored copy to clear.
    pub fn resolve(policy: CachePolicy, force_clear: bool) -> CacheDirective {
        if force_clear {
            return match policy {
                CachePolicy::None => CacheDirective {
                    no_cache: true,
                    no_store: true,
                    ..CacheDirective::default()
                },
                CachePolicy::Offline | CachePolicy::Default => CacheDirective {
                    no_cache: true,
                    max_stale: Some(MaxStale::Unbounded),
                    ..CacheDirective::default()
                },
                CachePolicy::All => CacheDirective {
                    no_cache: true,
                    ..CacheDirective::default()
                },
            };
        }

        match policy {
            CachePolicy::None => CacheDirective {
                no_cache: true,
                no_store: true,
                ..CacheDirective::default()
            },
            CachePolicy::Offline => CacheDirective::FORCE_CACHE,
            CachePolicy::Default => CacheDirective {
                max_stale: Some(MaxStale::Unbounded),
                ..CacheDirective::default()
            },
            CachePolicy::All => CacheDirective::default(),
        }
    }

    /// True when standard HTTP freshness rules apply unmodified.
    pub fn is_empty(&self) -> bool {
        *self == CacheDirective::default()
    }

    /// Render as a `Cache-Control` request header value.
    ///
    /// Returns `None` for the empty directive so no header is sent at all.
    /// An unbounded max-stale renders as the valueless `max-stale` token,
    /// which accepts a stale response of any age.
    pub fn header_value(&self) -> Option<String> {
        let mut tokens: Vec<String> = Vec::new();
        if self.no_cache {
            tokens.push("no-cache".into());
        }
        if self.no_store {
            tokens.push("no-store".into());
        }
        if self.only_if_cached {
            tokens.push("only-if-cached".into());
        }
        match self.max_stale {
            Some(MaxStale::Seconds(seconds)) => tokens.push(format!("max-stale={seconds}")),
            Some(MaxStale::Unbounded) => tokens.push("max-stale".into()),
            None => {}
        }
        if tokens.is_empty() {
            None
        } else {
            Some(tokens.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_policies_map_to_their_directives() {
        assert_eq!(
            CacheDirective::resolve(CachePolicy::None, false),
            CacheDirective {
                no_cache: true,
                no_store: true,
                ..CacheDirective::default()
            }
        );
        assert_eq!(
            CacheDirective::resolve(CachePolicy::Offline, false),
            CacheDirective::FORCE_CACHE
        );
        assert_eq!(
            CacheDirective::resolve(CachePolicy::Default, false),
            CacheDirective {
                max_stale: Some(MaxStale::Unbounded),
                ..CacheDirective::default()
            }
        );
        assert!(CacheDirective::resolve(CachePolicy::All, false).is_empty());
    }

    #[test]
    fn force_clear_adds_revalidation() {
        let offline = CacheDirective::resolve(CachePolicy::Offline, true);
        assert!(offline.no_cache);
        assert_eq!(offline.max_stale, Some(MaxStale::Unbounded));
        assert!(!offline.only_if_cached);

        let default = CacheDirective::resolve(CachePolicy::Default, true);
        assert!(default.no_cache);
        assert_eq!(default.max_stale, Some(MaxStale::Unbounded));

        let all = CacheDirective::resolve(CachePolicy::All, true);
        assert!(all.no_cache);
        assert!(!all.no_store);
        assert_eq!(all.max_stale, None);
    }

    #[test]
    fn force_clear_under_none_policy_is_a_no_op() {
        assert_eq!(
            CacheDirective::resolve(CachePolicy::None, true),
            CacheDirective::resolve(CachePolicy::None, false)
        );
    }

    #[test]
    fn header_rendering() {
        assert_eq!(
            CacheDirective::resolve(CachePolicy::None, false).header_value(),
            Some("no-cache, no-store".into())
        );
        assert_eq!(
            CacheDirective::FORCE_CACHE.header_value(),
            Some("only-if-cached, max-stale".into())
        );
        assert_eq!(
            CacheDirective::resolve(CachePolicy::Default, true).header_value(),
            Some("no-cache, max-stale".into())
        );
        assert_eq!(CacheDirective::default().header_value(), None);
        assert_eq!(
            CacheDirective {
                max_stale: Some(MaxStale::Seconds(120)),
                ..CacheDirective::default()
            }
            .header_value(),
            Some("max-stale=120".into())
        );
    }
}

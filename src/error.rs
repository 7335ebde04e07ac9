use crate::cache::CachePolicy;
use crate::converter::ConversionError;
use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for resource loading.
///
/// A `load` call either fully succeeds with a parsed [`Resources`] value or
/// fails with exactly one of these; nothing is swallowed, logged-and-continued
/// or retried internally.
///
/// [`Resources`]: crate::model::Resources
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure while establishing the connection or transferring data
    /// (timeout, connection reset, DNS failure).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a status outside the success range (>= 300).
    #[error("response error: HTTP {status} {message} (policy {policy:?})")]
    Response {
        status: u16,
        message: String,
        /// Cache policy that was in effect for the failed call.
        policy: CachePolicy,
    },

    /// The response body could not be parsed into a resource bundle.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),
}

impl Error {
    /// HTTP status code, when the failure came from response classification.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Cache policy carried by a response error.
    pub fn policy(&self) -> Option<CachePolicy> {
        match self {
            Error::Response { policy, .. } => Some(*policy),
            _ => None,
        }
    }
}

//! Body conversion boundary.
//!
//! The orchestrator hands a successful response body to a [`Converter`] and
//! returns whatever it produces. [`JsonConverter`] is the default; other
//! document formats plug in through the same trait.

use std::io::Read;

use thiserror::Error;

use crate::model::{Resource, Resources};

/// Failure while turning a response body into a resource bundle.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("I/O while reading body: {0}")]
    Io(#[from] std::io::Error),

    /// The document parsed but is not a shape resources can be read from.
    #[error("unsupported document shape: {0}")]
    UnsupportedShape(String),
}

/// Parses a response body stream into a [`Resources`] bundle.
pub trait Converter: Send + Sync {
    fn convert(&self, body: &mut dyn Read) -> Result<Resources, ConversionError>;
}

/// Default converter: a JSON object whose members become named resources.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConverter;

impl Converter for JsonConverter {
    fn convert(&self, body: &mut dyn Read) -> Result<Resources, ConversionError> {
        let document: serde_json::Value = serde_json::from_reader(body)?;
        match document {
            serde_json::Value::Object(members) => Ok(members
                .into_iter()
                .map(|(name, value)| (name, Resource::from(value)))
                .collect()),
            other => Err(ConversionError::UnsupportedShape(format!(
                "expected a top-level object, got {other}"
            ))),
        }
    }
}

use crate::error::{GenerationError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A generated image: either a URL or an inline data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

pub type GenerationResult = Result<ImageRef>;

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn from_base64_png(data: &str) -> Self {
        Self(format!("data:image/png;base64,{}", data))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// Media type of a data URI, e.g. `image/png`.
    pub fn media_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let header = rest.split(',').next()?;
        header.split(';').next().filter(|m| !m.is_empty())
    }

    /// Decode the inline payload of a base64 data URI.
    pub fn decode_inline(&self) -> Result<Vec<u8>> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| GenerationError::Serialization("not a data URI".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| GenerationError::Serialization("data URI has no payload".into()))?;
        if !header.ends_with(";base64") {
            return Err(GenerationError::Serialization(
                "data URI is not base64 encoded".into(),
            ));
        }
        STANDARD
            .decode(payload.trim())
            .map_err(|e| GenerationError::Serialization(e.to_string()))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

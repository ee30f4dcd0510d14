//! Key/value segments, chains, and the character rules shared by every
//! asset url key and value.

mod branch;

pub use branch::AssetUrlBranch;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AssetUrlError, Result};

/// Maximum number of segments in a single asset url path.
pub const MAX_PATH_DEPTH: usize = 100;
/// Maximum number of bytes in a branch key.
pub const MAX_KEY_CHARS: usize = 100;
/// Maximum number of bytes in a branch value.
pub const MAX_VALUE_CHARS: usize = 200;

pub(crate) const KEY_PATTERN: &str = "^[a-z0-9_-]+$";
pub(crate) const VALUE_PATTERN: &str = "^[A-Za-z0-9_ .-]+$";

static KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(KEY_PATTERN).expect("Failed to compile key pattern"));
static VALUE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(VALUE_PATTERN).expect("Failed to compile value pattern"));

/// A single `key=value` segment of an asset url.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Kv {
    pub key: String,
    pub value: String,
}

impl Kv {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Kv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An ordered list of segments leading from the schema root towards a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssetUrlChain(pub Vec<Kv>);

impl AssetUrlChain {
    /// Parses `key=value` strings into a chain. Key and value contents are
    /// not validated here, only the segment shape and its overall length.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self> {
        let mut res = Vec::with_capacity(segments.len());
        for segment in segments {
            let segment = segment.as_ref();
            if segment.len() > MAX_KEY_CHARS + MAX_VALUE_CHARS {
                return Err(AssetUrlError::SegmentTooLong);
            }

            let mut parts = segment.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(AssetUrlError::MalformedSegment);
            };
            res.push(Kv::new(key, value));
        }
        Ok(Self(res))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Kv> {
        self.0.iter()
    }
}

impl From<Vec<Kv>> for AssetUrlChain {
    fn from(segments: Vec<Kv>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for AssetUrlChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, kv) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            write!(f, "{kv}")?;
        }
        Ok(())
    }
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_CHARS {
        return Err(AssetUrlError::KeyTooLong(key.to_string()));
    }
    if key.is_empty() {
        return Err(AssetUrlError::EmptyKey);
    }
    if !KEY_REGEX.is_match(key) {
        return Err(AssetUrlError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_value(value: &str) -> Result<()> {
    if value.len() > MAX_VALUE_CHARS {
        return Err(AssetUrlError::ValueTooLong(value.to_string()));
    }
    if value.is_empty() {
        return Err(AssetUrlError::EmptyValue);
    }
    // a lone wildcard is a valid slot, anything else must match the pattern
    if value == "*" {
        return Ok(());
    }
    if !VALUE_REGEX.is_match(value) {
        return Err(AssetUrlError::InvalidValue(value.to_string()));
    }
    Ok(())
}

use thiserror::Error;

use crate::model::{KEY_PATTERN, VALUE_PATTERN};

#[derive(Error, Debug)]
pub enum AssetUrlError {
    #[error("asset url path segment is too long")]
    SegmentTooLong,
    #[error("asset url path segment must be formatted as key=value")]
    MalformedSegment,
    #[error("asset url branch key cannot be empty")]
    EmptyKey,
    #[error("asset url branch key is too long: {}...", preview(.0))]
    KeyTooLong(String),
    #[error("asset url branch key '{0}' must only contain valid characters: {pattern}", pattern = KEY_PATTERN)]
    InvalidKey(String),
    #[error("asset url branch value cannot be empty")]
    EmptyValue,
    #[error("asset url branch value is too long: {}...", preview(.0))]
    ValueTooLong(String),
    #[error("asset url branch value '{0}' must only contain valid characters: {pattern}", pattern = VALUE_PATTERN)]
    InvalidValue(String),
    #[error("asset url branch with a reference cannot have a key set")]
    ReferenceWithKey,
    #[error("asset url branch with a reference cannot have values set")]
    ReferenceWithValues,
    #[error("don't know where to attach asset url branch")]
    MissingAttachPath,
    #[error("failed to add asset url branch: {source}")]
    Add {
        #[source]
        source: Box<AssetUrlError>,
    },
    #[error("asset url branch path is too long")]
    PathTooLong,
    #[error("asset url path key is invalid (expected '{expected}', got '{actual}')")]
    KeyMismatch { expected: String, actual: String },
    #[error("cannot find asset url branch for '{key}={value}'")]
    UnknownValue { key: String, value: String },
    #[error("ran into premature end for asset url branch '{key}={value}'")]
    DeadEnd { key: String, value: String },
    #[error("dereferenced an asset url branch with more references (reference to '{path}')")]
    ChainedReference { path: String },
    #[error("maximum depth reached while cloning asset url branches (look for circular branch references)")]
    ReferenceDepthExceeded,
    #[error("failed to resolve asset url reference '{path}': {source}")]
    Reference {
        path: String,
        #[source]
        source: Box<AssetUrlError>,
    },
    #[error("invalid asset url, no more definitions at depth {depth} (value: {value})")]
    PathExhausted { depth: usize, value: String },
    #[error("invalid asset url, value not found: {key}={value}")]
    UnknownPathValue { key: String, value: String },
}

/// First 100 bytes of an overly long key or value, cut at a char boundary.
fn preview(s: &str) -> &str {
    let mut end = s.len().min(100);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub type Result<T> = std::result::Result<T, AssetUrlError>;

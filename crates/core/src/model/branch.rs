use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AssetUrlError, Result};
use crate::model::{AssetUrlChain, MAX_PATH_DEPTH, validate_key, validate_value};

/// One branch of a declarative asset url schema.
///
/// Branches are authored as literals (or deserialized from provider
/// configs) and attached to a schema via [`crate::AssetUrlSchema::add`].
/// A branch either carries its own `key` and `values`, or it is an alias
/// that mirrors another subtree through `references`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AssetUrlBranch {
    /// `key=value` segments naming the slot this branch attaches to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path_segments: Vec<String>,
    /// The dimension this branch enumerates, e.g. `account` or `platform`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    /// Optional human-readable name, falls back to the key when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Child branches by value. A `None` entry is a terminal leaf, the
    /// `"*"` entry accepts values that are not listed explicitly.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, Option<AssetUrlBranch>>,
    /// Path to the subtree this branch mirrors. Mutually exclusive with
    /// `key` and `values`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Distance from the schema root. Stamped when the branch is attached;
    /// any authored value is overwritten.
    #[serde(skip)]
    pub depth: u32,
}

impl AssetUrlBranch {
    /// Checks the branch and everything below it. Reference branches must
    /// not carry content of their own, content branches must satisfy the
    /// key and value character rules.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut branches: Vec<&AssetUrlBranch> = vec![self];
        let mut i = 0;
        while i < branches.len() {
            let branch = branches[i];
            i += 1;

            if !branch.references.is_empty() {
                if !branch.key.is_empty() {
                    return Err(AssetUrlError::ReferenceWithKey);
                }
                if !branch.values.is_empty() {
                    return Err(AssetUrlError::ReferenceWithValues);
                }
                continue;
            }

            validate_key(&branch.key)?;

            for (value, next) in &branch.values {
                validate_value(value)?;
                if let Some(next) = next {
                    branches.push(next);
                }
            }
        }

        Ok(())
    }

    pub(crate) fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
        for next in self.values.values_mut().flatten() {
            next.set_depth(depth + 1);
        }
    }

    /// Walks the definition tree along `path`. The final segment is not
    /// descended into; the returned pair is the branch owning the slot and
    /// the slot's value, i.e. the insertion point for [`Self::find_path_mut`]
    /// callers. Missing values fall back to a `"*"` entry when one exists.
    pub(crate) fn find_path(&self, path: &AssetUrlChain) -> Result<(&AssetUrlBranch, String)> {
        if path.len() > MAX_PATH_DEPTH {
            return Err(AssetUrlError::PathTooLong);
        }

        let mut cur = self;
        for (idx, segment) in path.iter().enumerate() {
            if segment.key != cur.key {
                return Err(AssetUrlError::KeyMismatch {
                    expected: cur.key.clone(),
                    actual: segment.key.clone(),
                });
            }
            validate_value(&segment.value)?;

            if idx == path.len() - 1 {
                return Ok((cur, segment.value.clone()));
            }

            let entry = match cur.values.get(segment.value.as_str()) {
                Some(entry) => entry,
                None => cur
                    .values
                    .get("*")
                    .ok_or_else(|| AssetUrlError::UnknownValue {
                        key: segment.key.clone(),
                        value: segment.value.clone(),
                    })?,
            };
            cur = entry.as_ref().ok_or_else(|| AssetUrlError::DeadEnd {
                key: segment.key.clone(),
                value: segment.value.clone(),
            })?;
        }

        Ok((cur, String::new()))
    }

    /// Mutable variant of [`Self::find_path`], used to attach subtrees.
    pub(crate) fn find_path_mut(
        &mut self,
        path: &AssetUrlChain,
    ) -> Result<(&mut AssetUrlBranch, String)> {
        if path.len() > MAX_PATH_DEPTH {
            return Err(AssetUrlError::PathTooLong);
        }

        let mut cur = self;
        for (idx, segment) in path.iter().enumerate() {
            if segment.key != cur.key {
                return Err(AssetUrlError::KeyMismatch {
                    expected: cur.key.clone(),
                    actual: segment.key.clone(),
                });
            }
            validate_value(&segment.value)?;

            if idx == path.len() - 1 {
                return Ok((cur, segment.value.clone()));
            }

            let slot = if cur.values.contains_key(segment.value.as_str()) {
                segment.value.as_str()
            } else {
                "*"
            };
            let entry = cur
                .values
                .get_mut(slot)
                .ok_or_else(|| AssetUrlError::UnknownValue {
                    key: segment.key.clone(),
                    value: segment.value.clone(),
                })?;
            cur = entry.as_mut().ok_or_else(|| AssetUrlError::DeadEnd {
                key: segment.key.clone(),
                value: segment.value.clone(),
            })?;
        }

        Ok((cur, String::new()))
    }
}

//! Hierarchical classification schemas for assets.
//!
//! Assets form one large graph, but people reason about them through
//! hierarchical views: `technology=aws / account=123456789012 /
//! service=ec2` is one way to file an EC2 instance, `technology=os /
//! family=windows / ...` another. An [`AssetUrlSchema`] holds the
//! vocabulary of such views: the keys and values that exist, and how
//! subtrees nest below each value. Providers attach their own subtrees and may
//! mirror an existing subtree through a reference instead of restating it.
//!
//! The schema separates authoring from lookup. Definitions stay exactly as
//! they were added; [`AssetUrlSchema::refresh_cache`] compiles them into a
//! reference-free tree that lookups and query construction run against.

mod cache;
mod query;

pub use cache::{BranchId, ResolvedBranch};

use crate::error::{AssetUrlError, Result};
use crate::model::{AssetUrlBranch, AssetUrlChain, Kv, validate_key};
use cache::SchemaCache;

/// A validated asset url vocabulary plus its compiled lookup cache.
#[derive(Debug, Clone)]
pub struct AssetUrlSchema {
    root: AssetUrlBranch,
    cache: SchemaCache,
}

impl AssetUrlSchema {
    pub fn new(root_key: &str) -> Result<Self> {
        validate_key(root_key)?;

        let root = AssetUrlBranch {
            key: root_key.to_string(),
            depth: 1,
            ..AssetUrlBranch::default()
        };
        let cache = SchemaCache::compile(&root)?;
        Ok(Self { root, cache })
    }

    /// Attaches a subtree at the slot named by its `path_segments`. The
    /// subtree is validated before anything is modified; attaching to an
    /// already populated slot replaces the previous subtree. The compiled
    /// cache is not updated until [`Self::refresh_cache`] runs.
    pub fn add(&mut self, mut branch: AssetUrlBranch) -> Result<()> {
        if branch.path_segments.is_empty() {
            return Err(AssetUrlError::MissingAttachPath);
        }

        let chain = AssetUrlChain::from_segments(&branch.path_segments)?;
        let (found, last_value) =
            self.root
                .find_path_mut(&chain)
                .map_err(|err| AssetUrlError::Add {
                    source: Box::new(err),
                })?;
        branch.validate().map_err(|err| AssetUrlError::Add {
            source: Box::new(err),
        })?;

        branch.set_depth(found.depth + 1);
        tracing::debug!("Attaching asset url branch at {}", chain);
        found.values.insert(last_value, Some(branch));
        Ok(())
    }

    /// Recompiles the lookup cache from the current definitions. On failure
    /// the previous cache stays in place.
    pub fn refresh_cache(&mut self) -> Result<()> {
        let cache = SchemaCache::compile(&self.root)?;
        tracing::debug!(
            "Refreshed asset url schema cache: {} branches, {} keys",
            cache.len(),
            cache.key_count()
        );
        self.cache = cache;
        Ok(())
    }

    pub fn root_key(&self) -> &str {
        &self.root.key
    }

    /// Resolved branch behind a handle returned by the lookup methods.
    pub fn branch(&self, id: BranchId) -> Option<&ResolvedBranch> {
        self.cache.get(id)
    }

    /// Walks the compiled tree along `path`. Returns the branch owning the
    /// final segment's slot together with that segment's value.
    pub fn find_path(&self, path: &AssetUrlChain) -> Result<(BranchId, String)> {
        self.cache.find_path(path)
    }

    /// Resolves `path` to the branch it points at; `Ok(None)` means the
    /// path ends in a terminal leaf.
    pub fn find_child(&self, path: &AssetUrlChain) -> Result<Option<BranchId>> {
        self.cache.find_child(path)
    }

    /// Human-readable names of all branches along `path`, top-down.
    pub fn path_titles(&self, path: &AssetUrlChain) -> Result<Vec<String>> {
        self.cache.path_titles(path)
    }

    /// Completes a bare value path into a full `key=value` chain.
    pub fn path_to_chain<S: AsRef<str>>(&self, path: &[S]) -> Result<AssetUrlChain> {
        self.cache.path_to_chain(path)
    }

    /// All chains that satisfy the given requirements at once. Requirements
    /// are unordered; keys unknown to the schema make the result empty.
    pub fn build_queries(&self, kvs: &[Kv]) -> Vec<AssetUrlChain> {
        query::build_queries(&self.cache, kvs)
    }
}

//! Compiled, reference-free view of an asset url schema.
//!
//! `SchemaCache::compile` flattens the definition tree into an arena of
//! `ResolvedBranch` nodes addressed by `BranchId`. Reference branches are
//! expanded from their targets during compilation, so lookups and query
//! construction never chase references.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

use crate::error::{AssetUrlError, Result};
use crate::model::{AssetUrlBranch, AssetUrlChain, Kv, MAX_PATH_DEPTH, validate_value};

/// Handle of a resolved branch inside the schema cache arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(u32);

impl BranchId {
    pub(crate) const ROOT: BranchId = BranchId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single branch of the compiled schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBranch {
    pub key: String,
    pub title: Option<String>,
    /// Child branches by value. A `None` entry is a terminal leaf.
    pub values: IndexMap<String, Option<BranchId>>,
    /// Distance from the root, which sits at depth 1.
    pub depth: u32,
    pub parent: Option<BranchId>,
    /// The value under which this branch hangs off its parent.
    pub parent_value: String,
}

const MAX_REFERENCE_DEPTH: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SchemaCache {
    nodes: Vec<ResolvedBranch>,
    /// Every branch that listens on a given key, at any depth.
    keys: HashMap<String, Vec<BranchId>>,
}

struct Pending<'a> {
    def: &'a AssetUrlBranch,
    id: BranchId,
    /// Inside an expanded reference target; such nodes count against the
    /// reference depth cap.
    materialized: bool,
}

impl SchemaCache {
    /// Rebuilds the cache from untouched definitions. Definitions are never
    /// modified, so compiling twice from the same tree yields the same
    /// cache. Reference branches are expanded within the same worklist;
    /// nodes inside an expanded target count against the reference depth
    /// cap, which is what stops circular reference chains.
    pub(crate) fn compile(root: &AssetUrlBranch) -> Result<SchemaCache> {
        let mut nodes: Vec<ResolvedBranch> = Vec::new();
        let mut keys: HashMap<String, Vec<BranchId>> = HashMap::new();

        nodes.push(ResolvedBranch {
            key: String::new(),
            title: None,
            values: IndexMap::new(),
            depth: 1,
            parent: None,
            parent_value: String::new(),
        });

        let mut queue: VecDeque<Pending<'_>> = VecDeque::new();
        queue.push_back(Pending {
            def: root,
            id: BranchId::ROOT,
            materialized: false,
        });

        while let Some(Pending { mut def, id, mut materialized }) = queue.pop_front() {
            let depth = nodes[id.index()].depth;
            if materialized && depth > MAX_REFERENCE_DEPTH {
                return Err(AssetUrlError::ReferenceDepthExceeded);
            }

            if !def.references.is_empty() {
                if depth > MAX_REFERENCE_DEPTH {
                    return Err(AssetUrlError::ReferenceDepthExceeded);
                }
                tracing::debug!(
                    "Materializing asset url reference '{}' at depth {}",
                    def.references.join("/"),
                    depth
                );
                let target = resolve_reference(root, &def.references)?;
                if !target.references.is_empty() {
                    return Err(AssetUrlError::ChainedReference {
                        path: target.references.join("/"),
                    });
                }
                def = target;
                materialized = true;
            }

            nodes[id.index()].key = def.key.clone();
            nodes[id.index()].title = def.title.clone();
            keys.entry(def.key.clone()).or_default().push(id);

            for (value, child) in &def.values {
                match child {
                    None => {
                        nodes[id.index()].values.insert(value.clone(), None);
                    }
                    Some(child) => {
                        let child_id = BranchId(nodes.len() as u32);
                        nodes.push(ResolvedBranch {
                            key: String::new(),
                            title: None,
                            values: IndexMap::new(),
                            depth: depth + 1,
                            parent: Some(id),
                            parent_value: value.clone(),
                        });
                        nodes[id.index()].values.insert(value.clone(), Some(child_id));
                        queue.push_back(Pending {
                            def: child,
                            id: child_id,
                            materialized,
                        });
                    }
                }
            }
        }

        Ok(SchemaCache { nodes, keys })
    }

    pub(crate) fn branch(&self, id: BranchId) -> &ResolvedBranch {
        &self.nodes[id.index()]
    }

    pub(crate) fn get(&self, id: BranchId) -> Option<&ResolvedBranch> {
        self.nodes.get(id.index())
    }

    pub(crate) fn branches_with_key(&self, key: &str) -> &[BranchId] {
        self.keys.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Compiled counterpart of the definition-tree walk: same key checks,
    /// same wildcard fallback, but over arena handles.
    pub(crate) fn find_path(&self, path: &AssetUrlChain) -> Result<(BranchId, String)> {
        if path.len() > MAX_PATH_DEPTH {
            return Err(AssetUrlError::PathTooLong);
        }

        let mut cur = BranchId::ROOT;
        for (idx, segment) in path.iter().enumerate() {
            let branch = self.branch(cur);
            if segment.key != branch.key {
                return Err(AssetUrlError::KeyMismatch {
                    expected: branch.key.clone(),
                    actual: segment.key.clone(),
                });
            }
            validate_value(&segment.value)?;

            if idx == path.len() - 1 {
                return Ok((cur, segment.value.clone()));
            }

            let entry = match branch.values.get(segment.value.as_str()) {
                Some(entry) => *entry,
                None => *branch
                    .values
                    .get("*")
                    .ok_or_else(|| AssetUrlError::UnknownValue {
                        key: segment.key.clone(),
                        value: segment.value.clone(),
                    })?,
            };
            cur = entry.ok_or_else(|| AssetUrlError::DeadEnd {
                key: segment.key.clone(),
                value: segment.value.clone(),
            })?;
        }

        Ok((cur, String::new()))
    }

    /// Resolves a path to the branch it points at. `Ok(None)` means the
    /// path is valid but ends in a terminal leaf.
    pub(crate) fn find_child(&self, path: &AssetUrlChain) -> Result<Option<BranchId>> {
        let (id, last_value) = self.find_path(path)?;
        if last_value.is_empty() {
            return Ok(Some(id));
        }

        let branch = self.branch(id);
        match branch.values.get(last_value.as_str()) {
            Some(entry) => Ok(*entry),
            None => match branch.values.get("*") {
                Some(entry) => Ok(*entry),
                None => Err(AssetUrlError::UnknownValue {
                    key: branch.key.clone(),
                    value: last_value,
                }),
            },
        }
    }

    /// Title of every branch along the path, top-down. Branches without a
    /// title report their key instead.
    pub(crate) fn path_titles(&self, path: &AssetUrlChain) -> Result<Vec<String>> {
        let (id, _) = self.find_path(path)?;

        let mut titles = Vec::new();
        let mut cur = Some(id);
        while let Some(id) = cur {
            let branch = self.branch(id);
            match &branch.title {
                Some(title) => titles.push(title.clone()),
                None => titles.push(branch.key.clone()),
            }
            cur = branch.parent;
        }

        titles.reverse();
        Ok(titles)
    }

    /// Turns a bare value path like `["aws", "123456", "ec2"]` into the
    /// full `key=value` chain by reading keys off the compiled tree.
    pub(crate) fn path_to_chain<S: AsRef<str>>(&self, path: &[S]) -> Result<AssetUrlChain> {
        let mut res = Vec::with_capacity(path.len());
        let mut cur = Some(BranchId::ROOT);
        for (idx, term) in path.iter().enumerate() {
            let term = term.as_ref();
            let id = cur.ok_or_else(|| AssetUrlError::PathExhausted {
                depth: idx,
                value: term.to_string(),
            })?;

            let branch = self.branch(id);
            let entry = match branch.values.get(term) {
                Some(entry) => *entry,
                None => match branch.values.get("*") {
                    Some(entry) => *entry,
                    None => {
                        return Err(AssetUrlError::UnknownPathValue {
                            key: branch.key.clone(),
                            value: term.to_string(),
                        });
                    }
                },
            };

            res.push(Kv::new(branch.key.clone(), term));
            cur = entry;
        }

        Ok(res.into())
    }
}

/// Looks up a reference target in the definition tree. The final
/// segment must name an existing, non-terminal slot. A target that is
/// itself a reference branch is rejected by the caller.
fn resolve_reference<'a>(
    root: &'a AssetUrlBranch,
    reference: &[String],
) -> Result<&'a AssetUrlBranch> {
    let wrap = |err: AssetUrlError| AssetUrlError::Reference {
        path: reference.join("/"),
        source: Box::new(err),
    };

    let chain = AssetUrlChain::from_segments(reference).map_err(wrap)?;
    let (found, last_value) = root.find_path(&chain).map_err(wrap)?;
    match found.values.get(last_value.as_str()) {
        Some(Some(target)) => Ok(target),
        Some(None) => Err(wrap(AssetUrlError::DeadEnd {
            key: found.key.clone(),
            value: last_value,
        })),
        None => Err(wrap(AssetUrlError::UnknownValue {
            key: found.key.clone(),
            value: last_value,
        })),
    }
}

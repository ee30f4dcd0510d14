//! Query construction: turns unordered `key=value` requirements into full
//! root-to-branch chains over the compiled schema.

use crate::model::{AssetUrlChain, Kv};
use crate::schema::cache::{BranchId, SchemaCache};

/// Builds every chain that satisfies all requirements at once. Each branch
/// indexed under a requirement's key is a candidate endpoint; candidates
/// are processed deepest-first and candidates lying on an already emitted
/// path are dropped, so the result holds the most specific chains only.
pub(crate) fn build_queries(cache: &SchemaCache, kvs: &[Kv]) -> Vec<AssetUrlChain> {
    let mut anchors: Vec<(BranchId, &str)> = Vec::new();
    for kv in kvs {
        for id in cache.branches_with_key(&kv.key) {
            anchors.push((*id, kv.value.as_str()));
        }
    }

    // shallow anchors first, so popping from the tail starts at the deepest
    anchors.sort_by_key(|(id, _)| cache.branch(*id).depth);

    let mut res = Vec::new();
    while let Some((anchor, value)) = anchors.pop() {
        let Some(chain) = build_parent_query(cache, anchor, value, kvs) else {
            continue;
        };
        res.push(chain);

        // remaining anchors on the emitted path would only repeat a prefix
        let covered = path_to_root(cache, anchor);
        let mut i = 0;
        while i < anchors.len() {
            if covered.contains(&anchors[i].0) {
                anchors.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    res
}

fn path_to_root(cache: &SchemaCache, anchor: BranchId) -> Vec<BranchId> {
    let mut res = Vec::new();
    let mut cur = Some(anchor);
    while let Some(id) = cur {
        res.push(id);
        cur = cache.branch(id).parent;
    }
    res
}

/// Walks from `anchor` up to the root, consuming requirements along the
/// way. Segment values come from the tree itself: the tagged `value` at the
/// anchor, the child's `parent_value` above it. Returns `None` when some
/// requirement is left unconsumed at the root, i.e. the anchor's path
/// cannot satisfy all of them.
fn build_parent_query(
    cache: &SchemaCache,
    anchor: BranchId,
    value: &str,
    kvs: &[Kv],
) -> Option<AssetUrlChain> {
    let mut remaining: Vec<Kv> = kvs.to_vec();
    let mut segments: Vec<Kv> = Vec::with_capacity(cache.branch(anchor).depth as usize);

    let mut cur = Some(anchor);
    let mut cur_value = value.to_string();
    while let Some(id) = cur {
        let branch = cache.branch(id);
        let accepts_any = branch.values.contains_key("*");
        filter_kv(&mut remaining, &branch.key, &cur_value, accepts_any);

        segments.push(Kv::new(branch.key.clone(), cur_value));
        cur_value = branch.parent_value.clone();
        cur = branch.parent;
    }

    if !remaining.is_empty() {
        return None;
    }

    segments.reverse();
    Some(segments.into())
}

/// Removes the first requirement a branch satisfies: the keys must match,
/// and either the values match or the branch carries a wildcard slot.
fn filter_kv(remaining: &mut Vec<Kv>, key: &str, value: &str, accepts_any: bool) {
    let matched = remaining
        .iter()
        .position(|kv| kv.key == key && (accepts_any || kv.value == value));
    if let Some(idx) = matched {
        remaining.remove(idx);
    }
}

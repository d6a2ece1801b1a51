use crate::model::{Fingerprint, Group, GroupKind, GroupReason};
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// Group fingerprints that share an exact URL key or title key.
///
/// 1. URL pass: bucket by non-empty `url_key`, in first-seen key order
/// 2. Title pass: bucket by non-empty `title_key`, same ordering, over the
///    items no URL group claimed
/// 3. Drop buckets with fewer than 2 members
///
/// A URL group and a title group with identical members are therefore
/// reported once, as URL. Every item ends up in at most one duplicate group.
pub fn find_duplicate_groups(fingerprints: &[Fingerprint]) -> Vec<Group> {
    let passes: [(GroupReason, &str, KeyFn); 2] = [
        (GroupReason::Url, "url", |fp| fp.url_key.as_str()),
        (GroupReason::Title, "title", |fp| fp.title_key.as_str()),
    ];

    let mut groups = Vec::new();
    let mut claimed: AHashSet<i64> = AHashSet::new();
    let mut next_id = 1;

    for (reason, label, key_of) in passes {
        for mut item_ids in bucket_by(fingerprints, key_of) {
            item_ids.retain(|id| !claimed.contains(id));
            if item_ids.len() < 2 {
                continue;
            }
            claimed.extend(item_ids.iter().copied());
            groups.push(Group {
                id: format!("dup-{}-{}", label, next_id),
                kind: GroupKind::Duplicate,
                reason,
                item_ids,
            });
            next_id += 1;
        }
    }

    debug!("Found {} exact duplicate groups", groups.len());
    groups
}

type KeyFn = fn(&Fingerprint) -> &str;

/// Bucket item ids by a string key, skipping empty keys. Buckets come back in
/// the order their key was first seen; ids within a bucket are unique.
fn bucket_by(fingerprints: &[Fingerprint], key_of: KeyFn) -> Vec<Vec<i64>> {
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    let mut buckets: Vec<Vec<i64>> = Vec::new();

    for fp in fingerprints {
        let key = key_of(fp);
        if key.is_empty() {
            continue;
        }
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        if !buckets[slot].contains(&fp.item_id) {
            buckets[slot].push(fp.item_id);
        }
    }

    buckets
}

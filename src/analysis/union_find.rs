use ahash::AHashMap;

/// Disjoint-set forest over item ids, built and dropped within one clustering
/// pass. `find` compresses paths; `union` links the first root under the second.
#[derive(Debug, Default)]
pub struct UnionFind {
    parent: AHashMap<i64, i64>,
    /// Ids in insertion order, so `groups` is deterministic.
    members: Vec<i64>,
}

impl UnionFind {
    pub fn new<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        let mut forest = Self::default();
        for id in ids {
            if forest.parent.insert(id, id).is_none() {
                forest.members.push(id);
            }
        }
        forest
    }

    pub fn contains(&self, id: i64) -> bool {
        self.parent.contains_key(&id)
    }

    /// Representative of `id`'s set, or `None` for an id not in the forest.
    pub fn find(&mut self, id: i64) -> Option<i64> {
        let mut root = *self.parent.get(&id)?;
        while let Some(&next) = self.parent.get(&root) {
            if next == root {
                break;
            }
            root = next;
        }

        let mut current = id;
        while current != root {
            let next = self.parent.insert(current, root).unwrap_or(root);
            current = next;
        }
        Some(root)
    }

    /// Merge the sets holding `a` and `b`. Ids outside the forest are ignored.
    pub fn union(&mut self, a: i64, b: i64) {
        let (Some(root_a), Some(root_b)) = (self.find(a), self.find(b)) else {
            return;
        };
        if root_a != root_b {
            self.parent.insert(root_a, root_b);
        }
    }

    /// Collapse the forest into sets. Sets are ordered by their first member's
    /// insertion position; members keep insertion order.
    pub fn groups(&mut self) -> Vec<Vec<i64>> {
        let mut slot_of_root: AHashMap<i64, usize> = AHashMap::new();
        let mut groups: Vec<Vec<i64>> = Vec::new();

        let members = std::mem::take(&mut self.members);
        for &id in &members {
            let root = self.find(id).unwrap_or(id);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(id);
        }
        self.members = members;

        groups
    }
}

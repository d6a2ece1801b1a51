use crate::model::Item;

/// The least recently used share of closable tabs.
///
/// Active and pinned tabs are never suggested. At least one tab is returned
/// whenever any candidate exists.
pub fn idle_tab_ids(items: &[Item], ratio: f64) -> Vec<i64> {
    let mut candidates: Vec<&Item> = items.iter().filter(|t| !t.active && !t.pinned).collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    candidates.sort_by_key(|t| t.last_accessed);
    let share = (candidates.len() as f64 * ratio.clamp(0.0, 1.0)).floor() as usize;
    let count = share.max(1);

    candidates.iter().take(count).map(|t| t.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: i64, last_accessed: i64, active: bool, pinned: bool) -> Item {
        Item {
            last_accessed,
            active,
            pinned,
            ..Item::new(id, "https://example.com/", "")
        }
    }

    #[test]
    fn test_oldest_share_selected() {
        let tabs = vec![
            tab(1, 400, false, false),
            tab(2, 100, false, false),
            tab(3, 300, false, false),
            tab(4, 200, false, false),
        ];
        assert_eq!(idle_tab_ids(&tabs, 0.5), vec![2, 4]);
    }

    #[test]
    fn test_active_and_pinned_excluded() {
        let tabs = vec![
            tab(1, 1, true, false),
            tab(2, 2, false, true),
            tab(3, 3, false, false),
        ];
        assert_eq!(idle_tab_ids(&tabs, 1.0), vec![3]);
    }

    #[test]
    fn test_at_least_one_when_candidates_exist() {
        let tabs = vec![tab(1, 10, false, false), tab(2, 5, false, false)];
        assert_eq!(idle_tab_ids(&tabs, 0.1), vec![2]);
        assert!(idle_tab_ids(&[tab(1, 1, true, false)], 0.5).is_empty());
    }
}

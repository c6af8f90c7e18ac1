//! Index arithmetic over ordered sibling sequences (columns of a board,
//! tasks of a column). Every function keeps the relative order of the
//! items it does not touch.

use crate::model::{Column, ColumnWithTasks, Task};

pub trait Identified {
    fn id(&self) -> &str;
}

/// Entities that carry a persisted sibling rank.
pub trait Ranked {
    fn set_position(&mut self, position: i64);
}

impl Identified for Column {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for ColumnWithTasks {
    fn id(&self) -> &str {
        &self.column.id
    }
}

impl Ranked for Column {
    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}

impl Ranked for Task {
    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}

impl Ranked for ColumnWithTasks {
    fn set_position(&mut self, position: i64) {
        self.column.position = position;
    }
}

pub fn position_of<T: Identified>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Moves the item `id` so it ends up at `target`.
///
/// Returns `false` and leaves `items` untouched when the item is absent,
/// when `target` is outside the original bounds, or when the item already
/// sits at `target`.
pub fn move_to_index<T: Identified>(items: &mut Vec<T>, id: &str, target: usize) -> bool {
    if target >= items.len() {
        return false;
    }
    let Some(current) = position_of(items, id) else {
        return false;
    };
    if current == target {
        return false;
    }
    let item = items.remove(current);
    let target = target.min(items.len());
    items.insert(target, item);
    true
}

pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let idx = position_of(items, id)?;
    Some(items.remove(idx))
}

/// Inserts at `index`, clamped to `[0, len]`. Returns the index used.
pub fn insert_clamped<T>(items: &mut Vec<T>, item: T, index: usize) -> usize {
    let index = index.min(items.len());
    items.insert(index, item);
    index
}

/// Rewrites positions to the dense range `0..len`.
pub fn reindex<T: Ranked>(items: &mut [T]) {
    for (idx, item) in items.iter_mut().enumerate() {
        item.set_position(idx as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(String);

    impl Identified for Item {
        fn id(&self) -> &str {
            &self.0
        }
    }

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter().map(|id| Item(id.to_string())).collect()
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.0.as_str()).collect()
    }

    #[test]
    fn moves_column_to_front() {
        let mut seq = items(&["A", "B", "C", "D"]);
        assert!(move_to_index(&mut seq, "C", 0));
        assert_eq!(ids(&seq), ["C", "A", "B", "D"]);
    }

    #[test]
    fn moves_forward_to_last_slot() {
        let mut seq = items(&["A", "B", "C", "D"]);
        assert!(move_to_index(&mut seq, "A", 3));
        assert_eq!(ids(&seq), ["B", "C", "D", "A"]);
    }

    #[test]
    fn out_of_range_is_noop() {
        let mut seq = items(&["A", "B"]);
        assert!(!move_to_index(&mut seq, "A", 2));
        assert!(!move_to_index(&mut seq, "A", usize::MAX));
        assert_eq!(ids(&seq), ["A", "B"]);
    }

    #[test]
    fn missing_item_and_same_index_are_noops() {
        let mut seq = items(&["A", "B", "C"]);
        assert!(!move_to_index(&mut seq, "Z", 0));
        assert!(!move_to_index(&mut seq, "B", 1));
        assert_eq!(ids(&seq), ["A", "B", "C"]);
    }

    #[test]
    fn insert_clamps_to_end() {
        let mut seq = items(&["A"]);
        assert_eq!(insert_clamped(&mut seq, Item("B".into()), 10), 1);
        assert_eq!(insert_clamped(&mut seq, Item("C".into()), 0), 0);
        assert_eq!(ids(&seq), ["C", "A", "B"]);
        assert_eq!(remove_by_id(&mut seq, "A"), Some(Item("A".into())));
        assert_eq!(remove_by_id(&mut seq, "A"), None);
    }

    fn sequence() -> impl Strategy<Value = Vec<Item>> {
        (1usize..12).prop_map(|len| (0..len).map(|i| Item(format!("i{i}"))).collect())
    }

    proptest! {
        #[test]
        fn move_is_idempotent(seq in sequence(), pick in any::<prop::sample::Index>(), target in any::<prop::sample::Index>()) {
            let id = seq[pick.index(seq.len())].0.clone();
            let target = target.index(seq.len());
            let mut once = seq.clone();
            move_to_index(&mut once, &id, target);
            let mut twice = once.clone();
            move_to_index(&mut twice, &id, target);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn move_preserves_items(seq in sequence(), pick in any::<prop::sample::Index>(), target in 0usize..16) {
            let id = seq[pick.index(seq.len())].0.clone();
            let mut moved = seq.clone();
            move_to_index(&mut moved, &id, target);
            prop_assert_eq!(moved.len(), seq.len());
            let mut before: Vec<_> = ids(&seq).into_iter().map(String::from).collect();
            let mut after: Vec<_> = ids(&moved).into_iter().map(String::from).collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
            if target < seq.len() {
                prop_assert_eq!(position_of(&moved, &id), Some(target));
            } else {
                prop_assert_eq!(&moved, &seq);
            }
        }

        #[test]
        fn move_keeps_relative_order_of_others(seq in sequence(), pick in any::<prop::sample::Index>(), target in any::<prop::sample::Index>()) {
            let id = seq[pick.index(seq.len())].0.clone();
            let mut moved = seq.clone();
            move_to_index(&mut moved, &id, target.index(seq.len()));
            let others_before: Vec<_> = seq.iter().filter(|i| i.0 != id).collect();
            let others_after: Vec<_> = moved.iter().filter(|i| i.0 != id).collect();
            prop_assert_eq!(others_before, others_after);
        }
    }
}

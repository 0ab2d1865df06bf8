//! The set of chosen options, in the order they were chosen.

use crate::option::OptionId;
use std::collections::HashSet;

/// Ordered multi-selection keyed by [`OptionId`].
///
/// Keys are independent of what is loaded or visible: toggling an id that no
/// page has produced yet is allowed, and reloading or filtering the list never
/// touches the selection. A key that is removed and added again moves to the
/// end.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    order: Vec<OptionId>,
    members: HashSet<OptionId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `id` if selected, append it otherwise. Returns whether `id` is
    /// selected afterwards.
    pub fn toggle(&mut self, id: &OptionId) -> bool {
        if self.members.remove(id) {
            self.order.retain(|k| k != id);
            false
        } else {
            self.members.insert(id.clone());
            self.order.push(id.clone());
            true
        }
    }

    pub fn is_selected(&self, id: &OptionId) -> bool {
        self.members.contains(id)
    }

    /// Selected keys, oldest first.
    pub fn selected(&self) -> &[OptionId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Deselect everything. Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.order.is_empty();
        self.order.clear();
        self.members.clear();
        had_any
    }

    /// Deselect the most recently added key.
    pub fn remove_last(&mut self) -> Option<OptionId> {
        let id = self.order.pop()?;
        self.members.remove(&id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(sel: &SelectionController) -> Vec<String> {
        sel.selected().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = SelectionController::new();
        let rick = OptionId::from(1);

        assert!(sel.toggle(&rick));
        assert!(sel.is_selected(&rick));
        assert!(!sel.toggle(&rick));
        assert!(!sel.is_selected(&rick));
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_twice_restores_original_set() {
        let mut sel = SelectionController::new();
        sel.toggle(&OptionId::from(1));
        sel.toggle(&OptionId::from(2));
        let before = ids(&sel);

        sel.toggle(&OptionId::from(3));
        sel.toggle(&OptionId::from(3));
        assert_eq!(ids(&sel), before);
    }

    #[test]
    fn keeps_insertion_order_and_moves_readded_keys_to_end() {
        let mut sel = SelectionController::new();
        for id in [3, 1, 2] {
            sel.toggle(&OptionId::from(id));
        }
        assert_eq!(ids(&sel), vec!["3", "1", "2"]);

        sel.toggle(&OptionId::from(3));
        sel.toggle(&OptionId::from(3));
        assert_eq!(ids(&sel), vec!["1", "2", "3"]);
    }

    #[test]
    fn accepts_keys_that_were_never_loaded() {
        let mut sel = SelectionController::new();
        assert!(sel.toggle(&OptionId::from("not-loaded")));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn remove_last_pops_most_recent() {
        let mut sel = SelectionController::new();
        sel.toggle(&OptionId::from(1));
        sel.toggle(&OptionId::from(2));

        assert_eq!(sel.remove_last(), Some(OptionId::from(2)));
        assert!(!sel.is_selected(&OptionId::from(2)));
        assert_eq!(sel.remove_last(), Some(OptionId::from(1)));
        assert_eq!(sel.remove_last(), None);
    }

    #[test]
    fn clear_reports_whether_anything_changed() {
        let mut sel = SelectionController::new();
        assert!(!sel.clear());
        sel.toggle(&OptionId::from(1));
        assert!(sel.clear());
        assert!(sel.is_empty());
        assert!(!sel.is_selected(&OptionId::from(1)));
    }
}

//! Edge-triggered watch on the last row of a list.

/// Fires when an observed target goes from off-screen to on-screen.
///
/// The presenter observes the identity of the last visible row and reports
/// after every layout change whether that row is on screen. [`check`]
/// returns `true` once per crossing: a target that stays visible does not fire
/// again, one that scrolls away and back does. Observing a different target
/// replaces the previous one, and a fresh target that is already on screen
/// fires on the next check.
///
/// [`check`]: EndOfListWatch::check
#[derive(Debug, Clone)]
pub struct EndOfListWatch<T> {
    target: Option<T>,
    inside: bool,
}

impl<T> Default for EndOfListWatch<T> {
    fn default() -> Self {
        Self {
            target: None,
            inside: false,
        }
    }
}

impl<T: PartialEq> EndOfListWatch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `target`. Re-observing the current target keeps its crossing
    /// state.
    pub fn observe(&mut self, target: T) {
        if self.target.as_ref() != Some(&target) {
            self.target = Some(target);
            self.inside = false;
        }
    }

    /// Stop watching. Safe to call when nothing is observed.
    pub fn release(&mut self) {
        self.target = None;
        self.inside = false;
    }

    pub fn is_observing(&self) -> bool {
        self.target.is_some()
    }

    /// Report the target's visibility; `true` means it just came into view.
    pub fn check(&mut self, visible: bool) -> bool {
        if self.target.is_none() {
            return false;
        }
        let entered = visible && !self.inside;
        self.inside = visible;
        entered
    }
}

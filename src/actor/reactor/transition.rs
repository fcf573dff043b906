use serde::{Deserialize, Serialize};

use crate::sys::screen::DisplayId;

/// A counter identifying one minimize or restore. The animation that drives
/// the transition carries the same id, and its completion is only committed
/// if the window still holds it.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionId(u32);

impl TransitionId {
    pub fn next(self) -> Self { Self(self.0.wrapping_add(1)) }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransitionKind {
    /// Docking into the notch of `target`.
    Minimize { target: DisplayId },
    Restore,
}

impl TransitionKind {
    pub fn is_minimize(&self) -> bool { matches!(self, TransitionKind::Minimize { .. }) }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    pub id: TransitionId,
    pub kind: TransitionKind,
}

/// Hands out transition ids.
#[derive(Debug, Default)]
pub struct TransitionManager {
    last: TransitionId,
}

impl TransitionManager {
    pub fn new() -> Self { Self::default() }

    pub fn begin(&mut self, kind: TransitionKind) -> PendingTransition {
        self.last = self.last.next();
        PendingTransition { id: self.last, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_per_transition() {
        let mut manager = TransitionManager::new();
        let a = manager.begin(TransitionKind::Restore);
        let b = manager.begin(TransitionKind::Minimize { target: DisplayId::new(1) });
        assert_ne!(a.id, b.id);
        assert!(b.kind.is_minimize());
        assert!(!a.kind.is_minimize());
    }

    #[test]
    fn id_wraps_instead_of_overflowing() {
        assert_eq!(TransitionId(u32::MAX).next(), TransitionId(0));
    }
}

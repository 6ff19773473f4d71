//! Press-and-hold state machine for arrow-key nudging.

use crate::geometry::PointF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowKey {
    Left,
    Up,
    Right,
    Down,
}

impl ArrowKey {
    /// Unit displacement in canvas coordinates (y grows downwards).
    pub fn direction(self) -> PointF {
        match self {
            ArrowKey::Left => PointF::new(-1.0, 0.0),
            ArrowKey::Up => PointF::new(0.0, -1.0),
            ArrowKey::Right => PointF::new(1.0, 0.0),
            ArrowKey::Down => PointF::new(0.0, 1.0),
        }
    }
}

/// What a key event means for the nudge gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeAction {
    /// First keydown: snapshot the selection, then apply a step.
    Begin,
    /// Auto-repeat while held: apply another step.
    Repeat,
    /// Release: commit the accumulated displacement.
    Commit,
    /// Nothing to do.
    Ignore,
}

#[derive(Debug, Clone, Default)]
pub struct NudgeTracker {
    held: Vec<ArrowKey>,
}

impl NudgeTracker {
    pub fn is_active(&self) -> bool {
        !self.held.is_empty()
    }

    pub fn key_down(&mut self, key: ArrowKey) -> NudgeAction {
        let action = if self.held.is_empty() {
            NudgeAction::Begin
        } else {
            NudgeAction::Repeat
        };
        if !self.held.contains(&key) {
            self.held.push(key);
        }
        action
    }

    /// Releasing the last held arrow ends the gesture.
    pub fn key_up(&mut self, key: ArrowKey) -> NudgeAction {
        let before = self.held.len();
        self.held.retain(|k| *k != key);
        if before > 0 && self.held.is_empty() {
            NudgeAction::Commit
        } else {
            NudgeAction::Ignore
        }
    }

    pub fn reset(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_and_release() {
        let mut tracker = NudgeTracker::default();
        assert_eq!(tracker.key_down(ArrowKey::Right), NudgeAction::Begin);
        assert_eq!(tracker.key_down(ArrowKey::Right), NudgeAction::Repeat);
        assert_eq!(tracker.key_down(ArrowKey::Down), NudgeAction::Repeat);
        assert_eq!(tracker.key_up(ArrowKey::Right), NudgeAction::Ignore);
        assert_eq!(tracker.key_up(ArrowKey::Down), NudgeAction::Commit);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_stray_key_up() {
        let mut tracker = NudgeTracker::default();
        assert_eq!(tracker.key_up(ArrowKey::Left), NudgeAction::Ignore);
    }
}

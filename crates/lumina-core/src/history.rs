// crates/lumina-core/src/history.rs
//
// Bounded snapshot undo/redo.
//
// Callers push the PRE-mutation snapshot immediately before any user-visible
// edit (one push per button click / per finished drag gesture, never per
// drag frame).
// Undo hands back the snapshot to restore and files the current state on the
// redo stack; redo is the mirror. Any new push clears redo.

use std::collections::VecDeque;

use crate::state::TimelineSnapshot;

#[derive(Debug, Clone)]
pub struct History {
    undo:     VecDeque<TimelineSnapshot>,
    redo:     Vec<TimelineSnapshot>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo:     VecDeque::with_capacity(capacity.max(1)),
            redo:     Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record `before` as the state to return to. Oldest entries fall off the
    /// front once the ring is full.
    pub fn push(&mut self, before: TimelineSnapshot) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    /// Pop the most recent snapshot; `current` moves to the redo stack.
    pub fn undo(&mut self, current: TimelineSnapshot) -> Option<TimelineSnapshot> {
        let prev = self.undo.pop_back()?;
        self.redo.push(current);
        Some(prev)
    }

    /// Re-apply the most recently undone snapshot; `current` goes back on the
    /// undo ring.
    pub fn redo(&mut self, current: TimelineSnapshot) -> Option<TimelineSnapshot> {
        let next = self.redo.pop()?;
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool { !self.undo.is_empty() }
    pub fn can_redo(&self) -> bool { !self.redo.is_empty() }
    pub fn undo_len(&self) -> usize { self.undo.len() }
    pub fn redo_len(&self) -> usize { self.redo.len() }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Clip, ClipKind, MediaRef, Timeline};

    fn snap(n: usize) -> TimelineSnapshot {
        let mut tl = Timeline::default();
        for i in 0..n {
            tl.clips.push(Clip::new(ClipKind::Video, MediaRef::new("v.mp4"), i as f64, 1.0));
        }
        tl.snapshot()
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut h = History::new(50);
        let (s0, s1) = (snap(0), snap(1));
        h.push(s0.clone());
        assert_eq!(h.undo(s1.clone()), Some(s0.clone()));
        assert_eq!(h.redo(s0), Some(s1));
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn ring_drops_oldest() {
        let mut h = History::new(3);
        for i in 0..5 {
            h.push(snap(i));
        }
        assert_eq!(h.undo_len(), 3);
        assert_eq!(h.undo(snap(9)).map(|s| s.clips.len()), Some(4));
        assert_eq!(h.undo(snap(9)).map(|s| s.clips.len()), Some(3));
        assert_eq!(h.undo(snap(9)).map(|s| s.clips.len()), Some(2));
        assert_eq!(h.undo(snap(9)), None);
    }

    #[test]
    fn new_push_clears_redo() {
        let mut h = History::new(10);
        h.push(snap(0));
        h.undo(snap(1));
        assert!(h.can_redo());
        h.push(snap(2));
        assert!(!h.can_redo());
    }

    #[test]
    fn empty_history_is_noop() {
        let mut h = History::new(0);
        assert_eq!(h.undo(snap(0)), None);
        assert_eq!(h.redo(snap(0)), None);
        assert_eq!(h.redo_len(), 0);
    }
}

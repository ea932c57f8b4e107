//! Undo/redo over canvas document state.

use crate::annotation::Annotation;
use crate::artboard::Artboard;
use crate::item::PlacedItem;

/// Default number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// A snapshot of document state for undo/redo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    /// Items in insertion order.
    pub items: Vec<PlacedItem>,
    pub annotations: Vec<Annotation>,
    pub artboards: Vec<Artboard>,
}

/// Bounded undo and redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<DocumentState>,
    redo_stack: Vec<DocumentState>,
    max_len: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl History {
    pub fn new(max_len: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_len: max_len.max(1),
        }
    }

    /// Record the state before a change. Clears the redo stack.
    pub fn push(&mut self, state: DocumentState) {
        self.undo_stack.push(state);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_len {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the previous state, parking `current` for redo.
    pub fn undo(&mut self, current: DocumentState) -> Option<DocumentState> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Pop the next state, parking `current` for undo.
    pub fn redo(&mut self, current: DocumentState) -> Option<DocumentState> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    /// Drop the most recent undo entry without touching redo.
    pub fn discard_last(&mut self) -> Option<DocumentState> {
        self.undo_stack.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};

    fn state(n: usize) -> DocumentState {
        DocumentState {
            items: (0..n)
                .map(|i| PlacedItem::new(format!("m{i}"), Point::ZERO, Size::new(50.0, 50.0)))
                .collect(),
            annotations: Vec::new(),
            artboards: Vec::new(),
        }
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::default();
        let (s0, s1) = (state(0), state(1));
        history.push(s0.clone());
        assert!(history.can_undo());

        let restored = history.undo(s1.clone()).unwrap();
        assert_eq!(restored, s0);
        assert!(history.can_redo());

        let again = history.redo(s0).unwrap();
        assert_eq!(again, s1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::default();
        history.push(state(0));
        history.undo(state(1));
        history.push(state(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_bounded() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push(state(i));
        }
        let mut count = 0;
        while history.undo(DocumentState::default()).is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_discard_last() {
        let mut history = History::default();
        let s1 = state(1);
        history.push(s1.clone());
        assert_eq!(history.discard_last(), Some(s1));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_undo() {
        let mut history = History::default();
        assert!(history.undo(DocumentState::default()).is_none());
        assert!(history.redo(DocumentState::default()).is_none());
    }
}

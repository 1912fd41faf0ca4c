//! Bounded undo/redo history of scene snapshots
//!
//! The undo stack holds the state *before* each committed mutation. Undo
//! pushes the current state onto the redo stack before handing back the
//! previous one, so redo is always the exact inverse. Entries are shared via
//! `Arc`, so moving a state between stacks never copies its object list.

use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::scene::SceneSnapshot;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Arc<SceneSnapshot>>,
    redo: Vec<Arc<SceneSnapshot>>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state a mutation is about to replace. Clears redo.
    pub fn checkpoint(&mut self, before: SceneSnapshot) {
        self.undo.push_back(Arc::new(before));
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Step back. `current` is kept for redo. Returns `None` when there is
    /// nothing to undo, in which case `current` is discarded unchanged.
    pub fn undo(&mut self, current: SceneSnapshot) -> Option<SceneSnapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(Arc::new(current));
        Some(Arc::unwrap_or_clone(previous))
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: SceneSnapshot) -> Option<SceneSnapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(Arc::new(current));
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        Some(Arc::unwrap_or_clone(next))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

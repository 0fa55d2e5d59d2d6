use std::collections::VecDeque;

use super::EditCommand;

/// Undo depth cap; the oldest entry past it is discarded for good.
pub const UNDO_LIMIT: usize = 256;

/// Two bounded command stacks, most recent first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UndoStack {
    undo: VecDeque<EditCommand>,
    redo: VecDeque<EditCommand>,
}

impl UndoStack {
    /// Records an undo entry for a performed edit. No-op commands are
    /// ignored; anything else clears the redo stack.
    pub fn push(&mut self, command: EditCommand) {
        if command.is_nop() {
            return;
        }
        self.redo.clear();
        self.undo.push_front(command);
        self.undo.truncate(UNDO_LIMIT);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// The command an undo would apply next.
    pub fn undo_top(&self) -> Option<&EditCommand> {
        self.undo.front()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub(crate) fn pop_undo(&mut self) -> Option<EditCommand> {
        self.undo.pop_front()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<EditCommand> {
        self.redo.pop_front()
    }

    pub(crate) fn record_undo(&mut self, command: EditCommand) {
        self.undo.push_front(command);
    }

    pub(crate) fn record_redo(&mut self, command: EditCommand) {
        self.redo.push_front(command);
    }
}

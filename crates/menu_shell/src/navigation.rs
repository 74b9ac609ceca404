//! Menu activation stack.

use crate::menu::MenuId;

/// Ordered stack of active menus; the last frame is the active menu.
///
/// An empty stack means the session is over. The stack is not synchronized and belongs to a
/// single dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationStack {
    frames: Vec<MenuId>,
}

impl NavigationStack {
    /// Creates an empty (terminated) stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `menu` the active menu.
    pub fn push(&mut self, menu: MenuId) {
        self.frames.push(menu);
    }

    /// Removes and returns the active menu.
    pub fn pop(&mut self) -> Option<MenuId> {
        self.frames.pop()
    }

    /// Leaves the active menu: pops when nested, otherwise ends the session.
    pub fn go_up(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        } else {
            self.frames.clear();
        }
    }

    /// Ends the session regardless of depth.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Replaces the whole stack with a single frame.
    pub fn reset_to(&mut self, menu: MenuId) {
        self.frames.clear();
        self.frames.push(menu);
    }

    /// Returns the active menu.
    pub fn active(&self) -> Option<MenuId> {
        self.frames.last().copied()
    }

    /// Number of stacked menus.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns whether the session is over.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames from the start menu to the active menu.
    pub fn frames(&self) -> &[MenuId] {
        &self.frames
    }
}

//! Menus and their selectable entries.

use std::fmt;

use menu_shell_contract::{MenuItemView, MenuSnapshot};
use serde::{Deserialize, Serialize};

use crate::error::{MenuError, MenuResult};
use crate::operation::OperationRef;

/// Description reported by an item with no bound operation.
pub const INERT_ITEM_DESCRIPTION: &str = "Action not established for this menu item.";

/// Dispatcher-scoped menu identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MenuId(pub usize);

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One selectable entry: display text, optional shortcut, optional operation.
///
/// An item without an operation is inert: it reports disabled and selecting it does nothing.
#[derive(Debug, Clone)]
pub struct MenuItem {
    text: String,
    shortcut: Option<String>,
    operation: Option<OperationRef>,
}

impl MenuItem {
    /// Creates an item.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::EmptyItemText`] when `text` is empty or blank.
    pub fn new(
        text: impl Into<String>,
        shortcut: Option<&str>,
        operation: Option<OperationRef>,
    ) -> MenuResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(MenuError::EmptyItemText);
        }
        Ok(Self {
            text,
            shortcut: shortcut.map(str::to_string),
            operation,
        })
    }

    /// Display text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shortcut code, if any.
    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    /// Bound operation, if any.
    pub fn operation(&self) -> Option<&OperationRef> {
        self.operation.as_ref()
    }

    /// Description of the bound operation.
    pub fn description(&self) -> &str {
        self.operation
            .as_ref()
            .map(|operation| operation.description())
            .unwrap_or(INERT_ITEM_DESCRIPTION)
    }

    /// Returns whether selecting the item has an effect.
    pub fn is_enabled(&self) -> bool {
        self.operation
            .as_ref()
            .is_some_and(|operation| operation.is_enabled())
    }

    /// Enables the bound operation.
    pub fn enable(&self) {
        if let Some(operation) = &self.operation {
            operation.enable();
        }
    }

    /// Disables the bound operation.
    pub fn disable(&self) {
        if let Some(operation) = &self.operation {
            operation.disable();
        }
    }

    fn view(&self, index: usize) -> MenuItemView {
        MenuItemView {
            index,
            text: self.text.clone(),
            shortcut: self.shortcut.clone(),
            description: self.description().to_string(),
            enabled: self.is_enabled(),
        }
    }
}

/// Ordered list of items shown together under one title.
///
/// Menus are created by a [`MenuDispatcher`](crate::dispatcher::MenuDispatcher) and live in its
/// arena. Item order is the user-visible numbering order, starting at 1; position 0 is the
/// dispatcher's implicit up/exit entry and is never stored.
#[derive(Debug, Clone)]
pub struct Menu {
    id: MenuId,
    code: String,
    title: String,
    items: Vec<MenuItem>,
}

impl Menu {
    pub(crate) fn new(id: MenuId, title: &str, code: &str, placeholder: &str) -> Self {
        let or_placeholder = |value: &str| {
            if value.trim().is_empty() {
                placeholder.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            id,
            code: or_placeholder(code),
            title: or_placeholder(title),
            items: Vec::new(),
        }
    }

    /// Arena identifier.
    pub fn id(&self) -> MenuId {
        self.id
    }

    /// Short code, used as this menu's registry context.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replaces the display title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Items in display order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Items paired with their 1-based positions.
    pub fn numbered_items(&self) -> impl Iterator<Item = (usize, &MenuItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(offset, item)| (offset + 1, item))
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the menu has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends an already-built item.
    pub fn push_item(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    /// Wraps `text`, `shortcut` and `operation` in an item and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::EmptyItemText`] and leaves the menu unchanged when `text` is blank.
    pub fn add_item(
        &mut self,
        text: impl Into<String>,
        shortcut: Option<&str>,
        operation: Option<OperationRef>,
    ) -> MenuResult<()> {
        let item = MenuItem::new(text, shortcut, operation)?;
        self.push_item(item);
        Ok(())
    }

    /// Returns whether `index` is a valid numeric choice.
    ///
    /// Accepts `0..len`: 0 stands for the implicit up/exit entry.
    pub fn is_valid_choice_index(&self, index: usize) -> bool {
        index < self.items.len()
    }

    /// Returns whether some item's shortcut equals `shortcut` exactly.
    pub fn is_valid_choice_shortcut(&self, shortcut: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.shortcut() == Some(shortcut))
    }

    /// Returns the item at 1-based `position`. Position 0 is never stored.
    pub fn item(&self, position: usize) -> Option<&MenuItem> {
        position
            .checked_sub(1)
            .and_then(|offset| self.items.get(offset))
    }

    /// Read-only view for renderers.
    pub fn snapshot(&self) -> MenuSnapshot {
        MenuSnapshot {
            code: self.code.clone(),
            title: self.title.clone(),
            items: self
                .numbered_items()
                .map(|(index, item)| item.view(index))
                .collect(),
        }
    }
}

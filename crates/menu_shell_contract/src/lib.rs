//! Shared menu-shell contracts used by the dispatch engine, console drivers, and renderers.
//!
//! This crate is intentionally runtime-agnostic. It defines serializable command scopes, hook
//! timing tags, and the read-only menu/navigation views a renderer consumes, without depending on
//! the engine's registry or stack internals.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lookup namespace for a registered command.
///
/// Named contexts are stored lower-cased. An absent or empty context is the reserved global
/// context, which is distinct from every named one.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CommandScope {
    /// Commands reachable from every menu.
    #[default]
    Global,
    /// Commands registered under a menu code or another named namespace.
    Context {
        /// Lower-cased context name.
        name: String,
    },
}

impl CommandScope {
    /// Normalizes caller input into a scope.
    ///
    /// Surrounding whitespace is trimmed and the name lower-cased, so `" Main "` and `"main"`
    /// name the same context. A blank name is the global context.
    pub fn from_context(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Global,
            Some(name) => Self::Context {
                name: name.to_lowercase(),
            },
        }
    }

    /// Returns the context text used in registry keys (`""` for the global context).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => "",
            Self::Context { name } => name,
        }
    }

    /// Returns whether this is the global context.
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    /// Returns the context name, or `None` for the global context.
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Context { name } => Some(name),
        }
    }
}

/// Lifecycle points at which timed hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookTiming {
    /// Before the interactive session starts.
    OnInit,
    /// After start-up hooks ran, before batch input and the interactive loop.
    PostInit,
    /// After every dispatched command.
    PostCommand,
    /// After the session terminated.
    OnShutdown,
}

impl HookTiming {
    /// Every timing tag in lifecycle order.
    pub const ALL: [HookTiming; 4] = [
        HookTiming::OnInit,
        HookTiming::PostInit,
        HookTiming::PostCommand,
        HookTiming::OnShutdown,
    ];

    /// Stable tag text, also used as the synthetic registry context for timed hooks.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnInit => "on-init",
            Self::PostInit => "post-init",
            Self::PostCommand => "post-command",
            Self::OnShutdown => "on-shutdown",
        }
    }
}

impl fmt::Display for HookTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a timing tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownHookTiming {
    /// Tag text that failed to parse.
    pub tag: String,
}

impl fmt::Display for UnknownHookTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown hook timing `{}`", self.tag)
    }
}

impl std::error::Error for UnknownHookTiming {}

impl FromStr for HookTiming {
    type Err = UnknownHookTiming;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|timing| timing.as_str() == tag)
            .ok_or(UnknownHookTiming { tag })
    }
}

/// Read-only view of one menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemView {
    /// 1-based position within the menu.
    pub index: usize,
    /// Display text.
    pub text: String,
    /// Optional shortcut code.
    pub shortcut: Option<String>,
    /// Description of the bound operation.
    pub description: String,
    /// Whether selecting the item currently has an effect.
    pub enabled: bool,
}

/// Read-only view of a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSnapshot {
    /// Short menu code, also the menu's registry context.
    pub code: String,
    /// Display title.
    pub title: String,
    /// Entries in user-visible order.
    pub items: Vec<MenuItemView>,
}

/// Read-only view of the navigation stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationSnapshot {
    /// Number of menus on the stack.
    pub depth: usize,
    /// Menu titles from the start menu to the active menu.
    pub breadcrumb: Vec<String>,
    /// Active menu, absent once the session terminated.
    pub active: Option<MenuSnapshot>,
}

impl NavigationSnapshot {
    /// Returns whether the session is over.
    pub fn is_terminated(&self) -> bool {
        self.depth == 0
    }

    /// Returns whether the active menu is nested below the start menu.
    pub fn is_submenu(&self) -> bool {
        self.depth > 1
    }
}

/// Summary of one dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Number of sub-commands the input resolved into.
    pub resolved: usize,
    /// Number of operations invoked (disabled operations count as invoked no-ops).
    pub invoked: usize,
    /// Whether the navigation stack was empty after the cycle.
    pub terminated: bool,
}

impl DispatchReport {
    /// Returns whether the input was rejected as an invalid selection.
    pub fn is_rejected(&self) -> bool {
        self.resolved == 0
    }
}

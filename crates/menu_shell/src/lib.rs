//! Text-menu command dispatch engine with context-scoped registration and stacked navigation.
//!
//! A [`MenuDispatcher`] owns a set of [`Menu`]s, a [`NavigationStack`] of active menus, and a
//! [`CommandRegistry`] mapping `(context, name)` keys to shared [`Operation`]s. Each menu's code
//! is its registry context, so the same verb can mean different things in different menus while
//! global commands such as "up" and "exit" are reachable everywhere.
//!
//! Input lines may chain sub-commands (`3 hello ## 4 ## x taste free`) and may redirect
//! resolution to another menu's context (`shop.buy apples`). A line either resolves completely
//! or is rejected as a whole.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod menu;
pub mod navigation;
pub mod operation;
pub mod registry;
pub mod resolver;

pub use config::{ConfigLoader, DispatcherConfig};
pub use dispatcher::MenuDispatcher;
pub use error::{MenuError, MenuResult};
pub use menu::{Menu, MenuId, MenuItem, INERT_ITEM_DESCRIPTION};
pub use menu_input_headless::{
    Conversion, InputSyntax, ParameterError, ParameterShape, ParameterSpec, ParameterValue,
    ParameterValues, ParsedSegment, SINGLE_VALUE_KEY,
};
pub use menu_shell_contract::{
    CommandScope, DispatchReport, HookTiming, MenuItemView, MenuSnapshot, NavigationSnapshot,
    UnknownHookTiming,
};
pub use navigation::NavigationStack;
pub use operation::{InvocationScope, Operation, OperationCallback, OperationKind, OperationRef};
pub use registry::{CommandKey, CommandRegistry};
pub use resolver::{InputResolver, SubCommand};

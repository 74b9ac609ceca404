//! Command registry mapping `(context, name)` keys to shared operations.
//!
//! The registry is the only engine structure meant for concurrent use. Each call takes the
//! internal lock exactly once, so a single registration (with all of its aliases) is applied
//! atomically, but nothing is guaranteed across separate calls.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use menu_shell_contract::{CommandScope, HookTiming};
use parking_lot::Mutex;
use tracing::debug;

use crate::operation::OperationRef;

/// Case-normalized registry key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandKey {
    scope: CommandScope,
    name: String,
}

impl CommandKey {
    /// Builds a key; `None` or an empty context selects the global context.
    pub fn new(context: Option<&str>, name: &str) -> Self {
        Self {
            scope: CommandScope::from_context(context),
            name: name.to_lowercase(),
        }
    }

    /// Context half of the key.
    pub fn scope(&self) -> &CommandScope {
        &self.scope
    }

    /// Lower-cased command name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.scope.as_str(), self.name)
    }
}

#[derive(Default)]
struct RegistryState {
    commands: BTreeMap<CommandKey, OperationRef>,
    contexts: BTreeSet<String>,
    timed: BTreeMap<HookTiming, Vec<OperationRef>>,
}

/// Shared command registry handle.
///
/// Clones share the same table. The registry is owned by a dispatcher and passed explicitly to
/// whoever needs it.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `operation` under its own name and every alias in `context`.
    ///
    /// Re-registering an existing key replaces the previous operation.
    pub fn register(&self, operation: OperationRef, context: Option<&str>, aliases: &[&str]) {
        let scope = CommandScope::from_context(context);
        let names = std::iter::once(operation.name()).chain(aliases.iter().copied());

        let mut state = self.state.lock();
        state.contexts.insert(scope.as_str().to_string());
        for name in names {
            let key = CommandKey::new(scope.context(), name);
            debug!(key = %key, operation = operation.name(), "register command");
            state.commands.insert(key, Arc::clone(&operation));
        }
    }

    /// Looks up the operation registered under `(context, name)`.
    pub fn lookup(&self, context: Option<&str>, name: &str) -> Option<OperationRef> {
        let key = CommandKey::new(context, name);
        self.state.lock().commands.get(&key).cloned()
    }

    /// Appends `operation` to the hook list for `timing`.
    ///
    /// The hook is also reachable as a command under the synthetic key
    /// `(timing tag, operation name)`.
    pub fn register_timed(&self, operation: OperationRef, timing: HookTiming) {
        let key = CommandKey::new(Some(timing.as_str()), operation.name());
        debug!(%timing, operation = operation.name(), "register timed hook");

        let mut state = self.state.lock();
        state.commands.insert(key, Arc::clone(&operation));
        state.timed.entry(timing).or_default().push(operation);
    }

    /// Hooks registered for `timing`, in registration order.
    pub fn timed(&self, timing: HookTiming) -> Vec<OperationRef> {
        self.state
            .lock()
            .timed
            .get(&timing)
            .cloned()
            .unwrap_or_default()
    }

    /// Sorted command names registered in `context` (the global context when `None` or empty).
    pub fn list_commands(&self, context: Option<&str>) -> Vec<String> {
        let scope = CommandScope::from_context(context);
        // BTreeMap order keeps names sorted within one scope.
        self.state
            .lock()
            .commands
            .keys()
            .filter(|key| key.scope == scope)
            .map(|key| key.name.clone())
            .collect()
    }

    /// Every registered key rendered as `context.name`, sorted.
    pub fn commands(&self) -> Vec<String> {
        let mut keys = self
            .state
            .lock()
            .commands
            .keys()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        keys.sort();
        keys
    }

    /// Sorted contexts that received a normal registration (`""` is the global context).
    pub fn contexts(&self) -> Vec<String> {
        self.state.lock().contexts.iter().cloned().collect()
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.state.lock().commands.len()
    }

    /// Returns whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.state.lock().commands.is_empty()
    }

    /// Drops every registration and hook.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.commands.clear();
        state.contexts.clear();
        state.timed.clear();
        debug!("registry reset");
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.len())
            .finish()
    }
}

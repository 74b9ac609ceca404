//! Named, enable-gated units of behavior.
//!
//! An [`Operation`] is shared by reference count so that every alias and menu item bound to it
//! observes the same enabled flag. What an operation does is a closed set of kinds; the
//! dispatcher interprets them at a single invocation entry point, which is also where the
//! enabled check happens.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use menu_input_headless::{ParameterSpec, ParameterValue, ParameterValues};
use tracing::warn;

use crate::menu::{Menu, MenuId};
use crate::navigation::NavigationStack;

/// Shared handle to an operation.
pub type OperationRef = Arc<Operation>;

/// Callback body for [`OperationKind::Callback`].
pub type OperationCallback = Arc<dyn Fn(&mut InvocationScope<'_>) + Send + Sync>;

/// What a callback sees while it runs.
///
/// Navigation goes through this scope rather than the raw stack, so a callback can only push
/// menus owned by the dispatcher that invoked it.
pub struct InvocationScope<'a> {
    parameter: Option<&'a str>,
    arguments: &'a ParameterValues,
    navigation: &'a mut NavigationStack,
    menus: &'a [Menu],
}

impl<'a> InvocationScope<'a> {
    pub(crate) fn new(
        parameter: Option<&'a str>,
        arguments: &'a ParameterValues,
        navigation: &'a mut NavigationStack,
        menus: &'a [Menu],
    ) -> Self {
        Self {
            parameter,
            arguments,
            navigation,
            menus,
        }
    }

    /// Text following the verb, if any.
    pub fn parameter(&self) -> Option<&str> {
        self.parameter
    }

    /// Values produced by the operation's [`ParameterSpec`]; empty when it has none.
    pub fn arguments(&self) -> &ParameterValues {
        self.arguments
    }

    /// One processed value by key.
    pub fn argument(&self, key: &str) -> Option<&ParameterValue> {
        self.arguments.get(key)
    }

    /// Read access to the navigation stack.
    pub fn navigation(&self) -> &NavigationStack {
        &*self.navigation
    }

    /// Makes `menu` the active menu. Returns `false` and leaves the stack untouched when the
    /// menu does not belong to the invoking dispatcher.
    pub fn push(&mut self, menu: MenuId) -> bool {
        if self.menus.get(menu.0).is_none() {
            warn!(%menu, "callback pushed a menu not owned by this dispatcher; ignored");
            return false;
        }
        self.navigation.push(menu);
        true
    }

    /// Leaves the active menu; ends the session at depth 1.
    pub fn go_up(&mut self) {
        self.navigation.go_up();
    }

    /// Ends the session regardless of depth.
    pub fn exit(&mut self) {
        self.navigation.clear();
    }
}

/// Behavior variants an operation can carry.
#[derive(Clone)]
pub enum OperationKind {
    /// Runs a caller-supplied closure.
    Callback(OperationCallback),
    /// Pushes one specific menu onto the navigation stack.
    PushMenu(MenuId),
    /// Replays each command line through the dispatcher, in order.
    Batch(Vec<String>),
}

impl OperationKind {
    /// Wraps a closure as a [`Callback`](Self::Callback) kind.
    pub fn callback<F>(body: F) -> Self
    where
        F: Fn(&mut InvocationScope<'_>) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(body))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Callback(_) => "callback",
            Self::PushMenu(_) => "push-menu",
            Self::Batch(_) => "batch",
        }
    }
}

impl fmt::Debug for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::PushMenu(menu) => f.debug_tuple("PushMenu").field(menu).finish(),
            Self::Batch(commands) => f.debug_tuple("Batch").field(commands).finish(),
        }
    }
}

/// A named unit of behavior invoked with one optional text parameter.
pub struct Operation {
    name: String,
    description: String,
    usage: Option<String>,
    parameters: Option<ParameterSpec>,
    enabled: AtomicBool,
    kind: OperationKind,
}

impl Operation {
    /// Creates a disabled operation. A blank name falls back to the kind's label.
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OperationKind) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            kind.label().to_string()
        } else {
            name
        };
        Self {
            name,
            description: description.into(),
            usage: None,
            parameters: None,
            enabled: AtomicBool::new(false),
            kind,
        }
    }

    /// Creates an enabled operation.
    pub fn new_enabled(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: OperationKind,
    ) -> Self {
        let operation = Self::new(name, description, kind);
        operation.enable();
        operation
    }

    /// Creates an enabled callback operation.
    pub fn callback<F>(name: impl Into<String>, description: impl Into<String>, body: F) -> OperationRef
    where
        F: Fn(&mut InvocationScope<'_>) + Send + Sync + 'static,
    {
        Self::new_enabled(name, description, OperationKind::callback(body)).into_ref()
    }

    /// Creates an enabled operation that activates `menu`.
    pub fn push_menu(
        name: impl Into<String>,
        description: impl Into<String>,
        menu: MenuId,
    ) -> OperationRef {
        Self::new_enabled(name, description, OperationKind::PushMenu(menu)).into_ref()
    }

    /// Creates an enabled batch operation replaying `commands`.
    pub fn batch<I, S>(name: impl Into<String>, description: impl Into<String>, commands: I) -> OperationRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let commands = commands.into_iter().map(Into::into).collect();
        Self::new_enabled(name, description, OperationKind::Batch(commands)).into_ref()
    }

    /// Attaches usage text shown by help renderers.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Attaches a parameter spec. Callbacks only run when their parameter text satisfies it.
    pub fn with_parameters(mut self, spec: ParameterSpec) -> Self {
        self.parameters = Some(spec);
        self
    }

    /// Wraps the operation in a shared handle.
    pub fn into_ref(self) -> OperationRef {
        Arc::new(self)
    }

    /// Unique operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Usage text, if any.
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Parameter spec applied before a callback runs, if any.
    pub fn parameters(&self) -> Option<&ParameterSpec> {
        self.parameters.as_ref()
    }

    /// Behavior carried by the operation.
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    /// Returns whether invoking the operation has an effect.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Allows the operation to run.
    pub fn enable(&self) {
        self.set_enabled(true);
    }

    /// Turns invocation into a silent no-op.
    pub fn disable(&self) {
        self.set_enabled(false);
    }

    /// Sets the enabled flag.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .field("kind", &self.kind)
            .finish()
    }
}

//! Navigation stack owner and input dispatcher.
//!
//! [`MenuDispatcher`] owns the menu arena, the activation stack, and the registry handle. A
//! driver typically loops: render [`MenuDispatcher::navigation_snapshot`], read a line, check
//! [`MenuDispatcher::is_valid_selection`], call [`MenuDispatcher::dispatch`], and stop once
//! [`MenuDispatcher::is_terminated`] is true.
//!
//! The dispatcher is single-actor state. Only its [`CommandRegistry`] may be shared across
//! threads.

use std::fmt;

use menu_input_headless::ParameterValues;
use menu_shell_contract::{
    CommandScope, DispatchReport, HookTiming, MenuSnapshot, NavigationSnapshot,
};
use tracing::{debug, trace, warn};

use crate::config::DispatcherConfig;
use crate::error::{MenuError, MenuResult};
use crate::menu::{Menu, MenuId};
use crate::navigation::NavigationStack;
use crate::operation::{InvocationScope, Operation, OperationKind, OperationRef};
use crate::registry::CommandRegistry;
use crate::resolver::InputResolver;

const SUBMENU_DESCRIPTION: &str = "Choose a submenu and make it the active menu";

/// Menu hierarchy, activation stack, and dispatch entry points for one session.
pub struct MenuDispatcher {
    registry: CommandRegistry,
    config: DispatcherConfig,
    menus: Vec<Menu>,
    navigation: NavigationStack,
    batch_depth: usize,
}

impl Default for MenuDispatcher {
    fn default() -> Self {
        Self::new(CommandRegistry::new(), DispatcherConfig::default())
    }
}

impl MenuDispatcher {
    /// Creates a dispatcher over an explicitly supplied registry.
    pub fn new(registry: CommandRegistry, config: DispatcherConfig) -> Self {
        Self {
            registry,
            config,
            menus: Vec::new(),
            navigation: NavigationStack::new(),
            batch_depth: 0,
        }
    }

    /// Returns the registry handle.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Returns a resolver bound to this dispatcher's registry and syntax.
    pub fn resolver(&self) -> InputResolver<'_> {
        InputResolver::new(&self.registry, self.config.syntax.clone())
    }

    // -- menu construction ------------------------------------------------------------------

    /// Creates a menu owned by this dispatcher. Blank titles and codes use the configured
    /// placeholder.
    pub fn create_menu(&mut self, title: &str, code: &str) -> MenuId {
        let id = MenuId(self.menus.len());
        self.menus
            .push(Menu::new(id, title, code, &self.config.menu_placeholder));
        id
    }

    /// Returns a menu by id.
    pub fn menu(&self, id: MenuId) -> Option<&Menu> {
        self.menus.get(id.0)
    }

    /// Returns a menu by id for modification.
    pub fn menu_mut(&mut self, id: MenuId) -> Option<&mut Menu> {
        self.menus.get_mut(id.0)
    }

    fn require_menu(&self, id: MenuId) -> MenuResult<&Menu> {
        self.menu(id).ok_or(MenuError::UnknownMenu(id))
    }

    /// Appends an item to `menu`.
    ///
    /// # Errors
    ///
    /// Fails with [`MenuError::UnknownMenu`] or [`MenuError::EmptyItemText`]; the menu is left
    /// unchanged in both cases.
    pub fn add_item(
        &mut self,
        menu: MenuId,
        text: &str,
        shortcut: Option<&str>,
        operation: Option<OperationRef>,
    ) -> MenuResult<()> {
        self.menu_mut(menu)
            .ok_or(MenuError::UnknownMenu(menu))?
            .add_item(text, shortcut, operation)
    }

    /// Nests `child` under `parent`.
    ///
    /// Registers the child's current items under the child's code, then appends an item to
    /// `parent` (the child's title and code) whose operation pushes the child. Submenus are
    /// therefore assembled bottom-up: items added to `child` afterwards need another
    /// [`add_menu`](Self::add_menu).
    ///
    /// # Errors
    ///
    /// Fails with [`MenuError::UnknownMenu`] when either id is foreign.
    pub fn add_submenu(&mut self, parent: MenuId, child: MenuId) -> MenuResult<OperationRef> {
        self.require_menu(parent)?;
        let (title, code) = {
            let child_menu = self.require_menu(child)?;
            (
                child_menu.title().to_string(),
                child_menu.code().to_string(),
            )
        };

        self.add_menu(child);
        let operation = Operation::push_menu(title.clone(), SUBMENU_DESCRIPTION, child);
        self.add_item(parent, &title, Some(code.as_str()), Some(operation.clone()))?;
        Ok(operation)
    }

    /// Registers every item of `menu` under the menu's code, keyed by shortcut and by 1-based
    /// position. Returns `false` (and logs) when the id is unknown.
    pub fn add_menu(&self, menu: MenuId) -> bool {
        let Some(menu) = self.menu(menu) else {
            warn!(%menu, "add_menu called with unknown menu; nothing registered");
            return false;
        };

        for (position, item) in menu.numbered_items() {
            let Some(operation) = item.operation() else {
                debug!(menu = menu.code(), position, "skipping inert menu item");
                continue;
            };
            let position = position.to_string();
            let mut aliases = vec![position.as_str()];
            aliases.extend(item.shortcut());
            self.registry
                .register(operation.clone(), Some(menu.code()), &aliases);
        }
        debug!(menu = menu.code(), items = menu.len(), "menu registered");
        true
    }

    /// Registers `menu` and makes it the only frame on the stack.
    ///
    /// # Errors
    ///
    /// Fails with [`MenuError::UnknownMenu`] when the id is foreign; the stack is untouched.
    pub fn set_start_menu(&mut self, menu: MenuId) -> MenuResult<()> {
        self.require_menu(menu)?;
        self.add_menu(menu);
        self.navigation.reset_to(menu);
        debug!(%menu, "start menu set");
        Ok(())
    }

    /// Installs the global "up" and "exit" operations under the configured verbs.
    pub fn add_core_actions(&mut self) {
        let exit = Operation::callback("exit", "Exit the application", |scope| {
            scope.exit();
        });
        let exit_verbs = self
            .config
            .exit_verbs
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        self.registry.register(exit, None, &exit_verbs);

        let up = Operation::callback("up", "Go to a higher level menu", |scope| {
            scope.go_up();
        });
        let up_verbs = self
            .config
            .up_verbs
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        self.registry.register(up, None, &up_verbs);
    }

    /// Registers a global command that no menu displays.
    pub fn add_hidden_action(&self, text: &str, operation: OperationRef) {
        self.registry.register(operation, None, &[text]);
    }

    /// Appends a lifecycle hook for `timing`.
    pub fn register_hook(&self, operation: OperationRef, timing: HookTiming) {
        self.registry.register_timed(operation, timing);
    }

    // -- dispatch ---------------------------------------------------------------------------

    /// Returns whether `input` names a known command in the active menu.
    ///
    /// The whole input must resolve, and then the first sub-command's verb must also be found
    /// in the active menu's context or the global one. A context override on the first verb
    /// does not count for this check. Returns `false` once the session terminated.
    pub fn is_valid_selection(&self, input: &str) -> bool {
        let Some(active) = self.active_menu() else {
            return false;
        };
        let resolver = self.resolver();
        let mut resolved = resolver.resolve(Some(active.code()), input);
        let Some(first) = resolved.first_mut() else {
            return false;
        };

        let active_scope = CommandScope::from_context(Some(active.code()));
        first.operation = resolver.locate(&active_scope, &first.verb);
        first.operation.is_some()
    }

    /// Resolves `input` against the active menu and invokes each resolved operation in order.
    ///
    /// Resolution is independent of any earlier [`is_valid_selection`](Self::is_valid_selection)
    /// call. Unrecognized input and a terminated session both yield a rejected report.
    pub fn dispatch(&mut self, input: &str) -> DispatchReport {
        let Some(context) = self.active_menu().map(|menu| menu.code().to_string()) else {
            warn!(input, "dispatch after session terminated; input ignored");
            return DispatchReport {
                terminated: true,
                ..DispatchReport::default()
            };
        };

        let resolved = self.resolver().resolve(Some(&context), input);
        let mut report = DispatchReport {
            resolved: resolved.len(),
            ..DispatchReport::default()
        };
        for sub in resolved {
            let Some(operation) = sub.operation else {
                continue;
            };
            self.invoke(&operation, sub.parameter.as_deref());
            report.invoked += 1;
        }
        report.terminated = self.is_terminated();
        trace!(input, ?report, "dispatch complete");
        report
    }

    /// Dispatches pre-built command lines in order, stopping once the session terminates.
    pub fn dispatch_batch<I, S>(&mut self, commands: I) -> Vec<DispatchReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reports = Vec::new();
        for command in commands {
            if self.is_terminated() {
                break;
            }
            reports.push(self.dispatch(command.as_ref()));
        }
        reports
    }

    /// Invokes every hook registered for `timing`, in registration order. Returns how many
    /// hooks ran with an effect.
    pub fn run_hooks(&mut self, timing: HookTiming) -> usize {
        let hooks = self.registry.timed(timing);
        trace!(%timing, hooks = hooks.len(), "running hooks");
        let mut ran = 0;
        for hook in &hooks {
            if self.invoke(hook, None) {
                ran += 1;
            }
        }
        ran
    }

    /// Single invocation entry point for every operation kind.
    ///
    /// A disabled operation is a silent no-op and returns `false`. So is a callback whose
    /// parameter text fails its [`ParameterSpec`](menu_input_headless::ParameterSpec), which is
    /// logged at `warn`.
    pub fn invoke(&mut self, operation: &Operation, parameter: Option<&str>) -> bool {
        if !operation.is_enabled() {
            trace!(operation = operation.name(), "operation disabled; skipped");
            return false;
        }

        match operation.kind() {
            OperationKind::Callback(body) => {
                let arguments = match operation.parameters() {
                    Some(spec) => match spec.process(parameter) {
                        Ok(arguments) => arguments,
                        Err(err) => {
                            warn!(operation = operation.name(), %err, "parameters rejected");
                            return false;
                        }
                    },
                    None => ParameterValues::new(),
                };
                body(&mut InvocationScope::new(
                    parameter,
                    &arguments,
                    &mut self.navigation,
                    &self.menus,
                ));
            }
            OperationKind::PushMenu(target) => self.push(*target),
            OperationKind::Batch(commands) => {
                if self.batch_depth >= self.config.max_batch_depth {
                    warn!(
                        operation = operation.name(),
                        depth = self.batch_depth,
                        "batch nesting limit reached; skipping"
                    );
                    return true;
                }
                self.batch_depth += 1;
                self.dispatch_batch(commands);
                self.batch_depth -= 1;
            }
        }
        true
    }

    fn push(&mut self, menu: MenuId) {
        if self.menu(menu).is_none() {
            warn!(%menu, "push target is not owned by this dispatcher");
            return;
        }
        self.navigation.push(menu);
        debug!(%menu, depth = self.navigation.depth(), "menu pushed");
    }

    // -- queries ----------------------------------------------------------------------------

    /// Returns whether the session is over (the stack is empty).
    pub fn is_terminated(&self) -> bool {
        self.navigation.is_empty()
    }

    /// Read access to the activation stack.
    pub fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }

    /// Number of stacked menus.
    pub fn depth(&self) -> usize {
        self.navigation.depth()
    }

    /// Menu at the top of the stack.
    pub fn active_menu(&self) -> Option<&Menu> {
        self.navigation.active().and_then(|id| self.menu(id))
    }

    /// Code of the active menu, which is also the default resolution context.
    pub fn active_menu_code(&self) -> Option<&str> {
        self.active_menu().map(Menu::code)
    }

    /// Titles from the start menu to the active menu.
    pub fn breadcrumb(&self) -> Vec<String> {
        self.navigation
            .frames()
            .iter()
            .filter_map(|id| self.menu(*id))
            .map(|menu| menu.title().to_string())
            .collect()
    }

    /// Sorted command names registered in `context` (global when `None`).
    pub fn commands(&self, context: Option<&str>) -> Vec<String> {
        self.registry.list_commands(context)
    }

    /// Read-only view of one menu.
    pub fn menu_snapshot(&self, id: MenuId) -> Option<MenuSnapshot> {
        self.menu(id).map(Menu::snapshot)
    }

    /// Read-only view of the stack and active menu for renderers.
    pub fn navigation_snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            depth: self.depth(),
            breadcrumb: self.breadcrumb(),
            active: self.active_menu().map(Menu::snapshot),
        }
    }
}

impl fmt::Debug for MenuDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuDispatcher")
            .field("menus", &self.menus.len())
            .field("navigation", &self.navigation)
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use menu_input_headless::{Conversion, ParameterSpec, ParameterValue};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(name: &str, log: &Log) -> OperationRef {
        let log = Arc::clone(log);
        let label = name.to_string();
        Operation::callback(name, format!("Record {name}"), move |scope| {
            let entry = match scope.parameter() {
                Some(parameter) => format!("{label}:{parameter}"),
                None => label.clone(),
            };
            log.lock().push(entry);
        })
    }

    struct Fixture {
        dispatcher: MenuDispatcher,
        main: MenuId,
        profile: MenuId,
        log: Log,
    }

    /// Main ("main") holds "Hello" (h) and the "Profile" submenu (code "p"); Profile holds
    /// "Rename" (r).
    fn fixture() -> Fixture {
        let log: Log = Arc::default();
        let mut dispatcher = MenuDispatcher::default();
        dispatcher.add_core_actions();

        let main = dispatcher.create_menu("Main", "main");
        let profile = dispatcher.create_menu("Profile", "p");
        dispatcher
            .add_item(profile, "Rename", Some("r"), Some(recorder("rename", &log)))
            .expect("add rename");
        dispatcher
            .add_item(main, "Hello", Some("h"), Some(recorder("hello", &log)))
            .expect("add hello");
        dispatcher.add_submenu(main, profile).expect("add profile");
        dispatcher.set_start_menu(main).expect("start menu");

        Fixture {
            dispatcher,
            main,
            profile,
            log,
        }
    }

    #[test]
    fn start_menu_is_the_only_frame() {
        let Fixture {
            mut dispatcher,
            main,
            profile,
            ..
        } = fixture();
        dispatcher.navigation.push(profile);
        dispatcher.set_start_menu(main).expect("reset start menu");
        assert_eq!(dispatcher.depth(), 1);
        assert_eq!(dispatcher.active_menu_code(), Some("main"));
        assert!(!dispatcher.is_terminated());
    }

    #[test]
    fn submenu_shortcut_pushes_and_up_pops() {
        let Fixture {
            mut dispatcher,
            profile,
            ..
        } = fixture();

        let report = dispatcher.dispatch("p");
        assert_eq!(report.invoked, 1);
        assert_eq!(dispatcher.depth(), 2);
        assert_eq!(dispatcher.navigation().active(), Some(profile));
        assert_eq!(dispatcher.breadcrumb(), vec!["Main", "Profile"]);

        dispatcher.dispatch("0");
        assert_eq!(dispatcher.depth(), 1);
        assert_eq!(dispatcher.active_menu_code(), Some("main"));

        dispatcher.dispatch("2");
        assert_eq!(dispatcher.active_menu_code(), Some("p"));
        dispatcher.dispatch("UP");
        assert_eq!(dispatcher.active_menu_code(), Some("main"));
    }

    #[test]
    fn up_at_depth_one_terminates() {
        let Fixture { mut dispatcher, .. } = fixture();
        let report = dispatcher.dispatch("up");
        assert!(report.terminated);
        assert!(dispatcher.is_terminated());
        assert_eq!(dispatcher.active_menu_code(), None);
    }

    #[test]
    fn exit_terminates_from_any_depth() {
        for verb in ["exit", "quit", "bye"] {
            let Fixture { mut dispatcher, .. } = fixture();
            dispatcher.dispatch("p");
            assert_eq!(dispatcher.depth(), 2);
            dispatcher.dispatch(verb);
            assert!(dispatcher.is_terminated(), "{verb} should terminate");
        }
    }

    #[test]
    fn terminated_session_rejects_input() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        dispatcher.dispatch("exit");
        assert!(!dispatcher.is_valid_selection("h"));
        let report = dispatcher.dispatch("h");
        assert!(report.is_rejected());
        assert!(report.terminated);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn items_resolve_by_shortcut_position_and_name() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        dispatcher.dispatch("h world");
        dispatcher.dispatch("1");
        dispatcher.dispatch("HELLO again");
        assert_eq!(*log.lock(), vec!["hello:world", "hello", "hello:again"]);
    }

    #[test]
    fn compound_input_runs_every_step_in_order() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        // Every step resolves against "main" unless a context prefix says otherwise.
        let report = dispatcher.dispatch("h one ## p ## p.r two ## up ## main.h three");
        assert_eq!(report.resolved, 5);
        assert_eq!(report.invoked, 5);
        assert_eq!(*log.lock(), vec!["hello:one", "rename:two", "hello:three"]);
        assert_eq!(dispatcher.active_menu_code(), Some("main"));
    }

    #[test]
    fn compound_input_with_unknown_step_runs_nothing() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        let report = dispatcher.dispatch("h ## p ## nope");
        assert!(report.is_rejected());
        assert!(log.lock().is_empty());
        assert_eq!(dispatcher.depth(), 1);
    }

    #[test]
    fn context_override_reaches_items_of_other_menus() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        assert!(!dispatcher.is_valid_selection("r"));

        dispatcher.dispatch("p.r bob ## 1 carol");
        assert_eq!(*log.lock(), vec!["rename:bob", "rename:carol"]);
        assert_eq!(dispatcher.depth(), 1);
    }

    #[test]
    fn valid_selection_checks_first_verb_against_active_menu() {
        let Fixture { mut dispatcher, .. } = fixture();
        // "r" lives only in the profile menu, so a prefixed first verb is not a valid choice
        // from main even though the whole line resolves.
        assert!(!dispatcher.is_valid_selection("p.r bob"));
        assert!(!dispatcher.is_valid_selection("p.r bob ## up"));
        assert!(dispatcher.is_valid_selection("main.h ## p.r bob"));
        assert!(dispatcher.is_valid_selection("p ## p.r bob"));
        assert!(dispatcher.is_valid_selection(".exit"));

        dispatcher.dispatch("p");
        assert!(dispatcher.is_valid_selection("p.r bob"));
        assert!(!dispatcher.is_valid_selection("main.h"));
    }

    #[test]
    fn interior_empty_segment_rejects_the_whole_line() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        assert!(!dispatcher.is_valid_selection("h ## ## h"));
        let report = dispatcher.dispatch("h ## ## h");
        assert_eq!(report, DispatchReport::default());
        assert!(dispatcher.dispatch("## h").is_rejected());
        assert!(log.lock().is_empty());

        let report = dispatcher.dispatch("h ## h ##");
        assert_eq!(report.invoked, 2);
        assert_eq!(*log.lock(), vec!["hello", "hello"]);
    }

    #[test]
    fn callback_cannot_push_a_foreign_menu() {
        let Fixture {
            mut dispatcher,
            profile,
            ..
        } = fixture();
        let pushed = Arc::new(Mutex::new(Vec::new()));
        let jump = {
            let pushed = Arc::clone(&pushed);
            Operation::callback("jump", "Jump to a menu by number", move |scope| {
                let target = scope
                    .parameter()
                    .and_then(|text| text.parse::<usize>().ok())
                    .map(MenuId)
                    .unwrap_or(MenuId(99));
                pushed.lock().push(scope.push(target));
            })
        };
        dispatcher.add_hidden_action("jump", jump);

        dispatcher.dispatch("jump");
        assert_eq!(dispatcher.depth(), 1);
        assert!(!dispatcher.is_terminated());
        assert!(dispatcher.is_valid_selection("exit"));

        dispatcher.dispatch(&format!("jump {}", profile.0));
        assert_eq!(dispatcher.navigation().active(), Some(profile));
        assert_eq!(*pushed.lock(), vec![false, true]);

        let report = dispatcher.dispatch("exit");
        assert_eq!(report.invoked, 1);
        assert!(report.terminated);
        assert!(dispatcher.is_terminated());
    }

    #[test]
    fn callback_receives_processed_parameters() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        let order = {
            let log = Arc::clone(&log);
            Operation::new_enabled(
                "order",
                "Order an item",
                OperationKind::callback(move |scope| {
                    let item = scope
                        .argument("item")
                        .and_then(ParameterValue::as_text)
                        .unwrap_or_default()
                        .to_string();
                    let count = scope
                        .argument("count")
                        .and_then(ParameterValue::as_integer)
                        .unwrap_or_default();
                    log.lock().push(format!("{count}x{item}"));
                }),
            )
            .with_usage("order item=<name> [count=<n>]")
            .with_parameters(
                ParameterSpec::name_value_pairs()
                    .require("item")
                    .convert("count", Conversion::Integer)
                    .with_default("count", "1"),
            )
            .into_ref()
        };
        dispatcher.add_hidden_action("order", order);

        dispatcher.dispatch(r#"order item="green tea" count=3"#);
        dispatcher.dispatch("order item=scone");
        assert_eq!(*log.lock(), vec!["3xgreen tea", "1xscone"]);

        let report = dispatcher.dispatch("order count=2");
        assert_eq!(report.invoked, 1);
        dispatcher.dispatch("order item=jam count=lots");
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn valid_selection_checks_resolution() {
        let Fixture { dispatcher, .. } = fixture();
        assert!(dispatcher.is_valid_selection("h"));
        assert!(dispatcher.is_valid_selection("2"));
        assert!(dispatcher.is_valid_selection("quit"));
        assert!(dispatcher.is_valid_selection("p ## p.r"));
        assert!(!dispatcher.is_valid_selection("p ## r"));
        assert!(!dispatcher.is_valid_selection(""));
        assert!(!dispatcher.is_valid_selection("7"));
        assert!(!dispatcher.is_valid_selection("h ## nope"));
    }

    #[test]
    fn disabled_operation_is_a_silent_no_op() {
        let Fixture {
            mut dispatcher,
            main,
            log,
            ..
        } = fixture();
        let hello = dispatcher
            .menu(main)
            .and_then(|menu| menu.item(1))
            .expect("hello item")
            .clone();
        hello.disable();

        assert!(dispatcher.is_valid_selection("h"));
        let report = dispatcher.dispatch("h");
        assert_eq!(report.invoked, 1);
        assert!(log.lock().is_empty());

        hello.enable();
        dispatcher.dispatch("h");
        assert_eq!(*log.lock(), vec!["hello"]);
    }

    #[test]
    fn disabled_submenu_item_does_not_push() {
        let Fixture {
            mut dispatcher,
            main,
            ..
        } = fixture();
        dispatcher
            .menu(main)
            .and_then(|menu| menu.item(2))
            .expect("profile item")
            .disable();
        dispatcher.dispatch("p");
        assert_eq!(dispatcher.depth(), 1);
    }

    #[test]
    fn inert_items_are_listed_but_not_registered() {
        let mut dispatcher = MenuDispatcher::default();
        let main = dispatcher.create_menu("Main", "main");
        dispatcher
            .add_item(main, "Coming soon", Some("c"), None)
            .expect("add inert");
        dispatcher.set_start_menu(main).expect("start");

        assert!(!dispatcher.is_valid_selection("c"));
        assert!(dispatcher.commands(Some("main")).is_empty());
        let snapshot = dispatcher.menu_snapshot(main).expect("snapshot");
        assert!(!snapshot.items[0].enabled);
    }

    #[test]
    fn submenu_registration_is_transitive() {
        let log: Log = Arc::default();
        let mut dispatcher = MenuDispatcher::default();
        dispatcher.add_core_actions();
        let root = dispatcher.create_menu("Root", "root");
        let middle = dispatcher.create_menu("Middle", "middle");
        let leaf = dispatcher.create_menu("Leaf", "leaf");
        dispatcher
            .add_item(leaf, "Ping", Some("ping"), Some(recorder("ping", &log)))
            .expect("add ping");
        dispatcher.add_submenu(middle, leaf).expect("nest leaf");
        dispatcher.add_submenu(root, middle).expect("nest middle");
        dispatcher.set_start_menu(root).expect("start");

        assert_eq!(dispatcher.commands(Some("leaf")), vec!["1", "ping"]);
        assert_eq!(dispatcher.commands(Some("middle")), vec!["1", "leaf"]);

        dispatcher.dispatch("middle ## middle.leaf ## leaf.ping");
        assert_eq!(dispatcher.depth(), 3);
        assert_eq!(dispatcher.breadcrumb(), vec!["Root", "Middle", "Leaf"]);
        assert_eq!(*log.lock(), vec!["ping"]);

        dispatcher.dispatch("exit");
        assert!(dispatcher.is_terminated());
    }

    #[test]
    fn foreign_menu_ids_are_rejected() {
        let mut dispatcher = MenuDispatcher::default();
        let main = dispatcher.create_menu("Main", "main");
        let foreign = MenuId(42);

        assert_eq!(
            dispatcher.add_submenu(main, foreign).expect_err("foreign child"),
            MenuError::UnknownMenu(foreign)
        );
        assert_eq!(
            dispatcher.set_start_menu(foreign).expect_err("foreign start"),
            MenuError::UnknownMenu(foreign)
        );
        assert!(!dispatcher.add_menu(foreign));
        assert!(dispatcher.is_terminated());
        assert!(dispatcher.menu(main).expect("main").is_empty());
    }

    #[test]
    fn push_to_foreign_menu_is_ignored() {
        let Fixture { mut dispatcher, .. } = fixture();
        let stray = Operation::push_menu("stray", "", MenuId(99));
        dispatcher.add_hidden_action("stray", stray);
        dispatcher.dispatch("stray");
        assert_eq!(dispatcher.depth(), 1);
    }

    #[test]
    fn hidden_action_resolves_from_any_menu_but_is_not_displayed() {
        let Fixture {
            mut dispatcher,
            main,
            log,
            ..
        } = fixture();
        dispatcher.add_hidden_action("about", recorder("about", &log));
        dispatcher.dispatch("p ## about");
        assert_eq!(*log.lock(), vec!["about"]);
        let snapshot = dispatcher.menu_snapshot(main).expect("main snapshot");
        assert!(snapshot.items.iter().all(|item| item.text != "about"));
    }

    #[test]
    fn batch_operation_replays_commands() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        let batch = Operation::batch("warmup", "Replay start-up commands", ["h a", "p", "r b"]);
        dispatcher.add_hidden_action("warmup", batch);

        dispatcher.dispatch("warmup");
        assert_eq!(*log.lock(), vec!["hello:a", "rename:b"]);
        assert_eq!(dispatcher.active_menu_code(), Some("p"));
    }

    #[test]
    fn self_referencing_batch_stops_at_depth_limit() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = MenuDispatcher::default();
        let main = dispatcher.create_menu("Main", "main");
        let tick = {
            let counter = Arc::clone(&counter);
            Operation::callback("tick", "", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        };
        dispatcher.add_hidden_action("tick", tick);
        dispatcher.add_hidden_action("loop", Operation::batch("loop", "", ["tick", "loop"]));
        dispatcher.set_start_menu(main).expect("start");

        dispatcher.dispatch("loop");
        assert_eq!(
            counter.load(Ordering::SeqCst),
            dispatcher.config().max_batch_depth
        );
    }

    #[test]
    fn dispatch_batch_stops_after_termination() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        let reports = dispatcher.dispatch_batch(["h one", "nope", "exit", "h two"]);
        assert_eq!(reports.len(), 3);
        assert!(reports[1].is_rejected());
        assert!(reports[2].terminated);
        assert_eq!(*log.lock(), vec!["hello:one"]);
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let Fixture {
            mut dispatcher,
            log,
            ..
        } = fixture();
        dispatcher.register_hook(recorder("banner", &log), HookTiming::OnInit);
        dispatcher.register_hook(recorder("load", &log), HookTiming::OnInit);
        let muted = recorder("muted", &log);
        muted.disable();
        dispatcher.register_hook(muted, HookTiming::OnInit);

        assert_eq!(dispatcher.run_hooks(HookTiming::OnInit), 2);
        assert_eq!(dispatcher.run_hooks(HookTiming::PostCommand), 0);
        assert_eq!(*log.lock(), vec!["banner", "load"]);
    }

    #[test]
    fn configured_verbs_replace_defaults() {
        let config = DispatcherConfig {
            up_verbs: vec!["back".to_string()],
            exit_verbs: vec!["q".to_string()],
            ..DispatcherConfig::default()
        };
        let mut dispatcher = MenuDispatcher::new(CommandRegistry::new(), config);
        dispatcher.add_core_actions();
        let main = dispatcher.create_menu("Main", "main");
        dispatcher.set_start_menu(main).expect("start");

        assert!(!dispatcher.is_valid_selection("0"));
        assert!(dispatcher.is_valid_selection("back"));
        assert!(dispatcher.is_valid_selection("exit"));
        dispatcher.dispatch("q");
        assert!(dispatcher.is_terminated());
    }

    #[test]
    fn navigation_snapshot_tracks_active_menu() {
        let Fixture { mut dispatcher, .. } = fixture();
        dispatcher.dispatch("p");

        let snapshot = dispatcher.navigation_snapshot();
        assert_eq!(snapshot.depth, 2);
        assert!(snapshot.is_submenu());
        let active = snapshot.active.expect("active menu");
        assert_eq!(active.code, "p");
        assert_eq!(active.items[0].text, "Rename");

        dispatcher.dispatch("bye");
        let snapshot = dispatcher.navigation_snapshot();
        assert!(snapshot.is_terminated());
        assert_eq!(snapshot.active, None);
        assert!(snapshot.breadcrumb.is_empty());
    }

    #[test]
    fn submenu_item_uses_child_title_and_code() {
        let Fixture {
            dispatcher, main, ..
        } = fixture();
        let snapshot = dispatcher.menu_snapshot(main).expect("main");
        let item = &snapshot.items[1];
        assert_eq!(item.text, "Profile");
        assert_eq!(item.shortcut.as_deref(), Some("p"));
        assert_eq!(item.description, SUBMENU_DESCRIPTION);
        assert!(item.enabled);
    }
}

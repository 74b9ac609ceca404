//! Turns one raw input line into resolved sub-commands.

use std::fmt;

use menu_input_headless::{HeadlessParser, InputSyntax, ParsedSegment};
use menu_shell_contract::CommandScope;
use tracing::trace;

use crate::operation::OperationRef;
use crate::registry::CommandRegistry;

/// One resolved step of a (possibly compound) input.
#[derive(Clone)]
pub struct SubCommand {
    /// Effective verb, without any context prefix.
    pub verb: String,
    /// Parameter text passed to the operation.
    pub parameter: Option<String>,
    /// Context in force for this step: the default one or the latest explicit override.
    pub context: CommandScope,
    /// Operation the verb resolved to.
    pub operation: Option<OperationRef>,
}

impl fmt::Debug for SubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubCommand")
            .field("verb", &self.verb)
            .field("parameter", &self.parameter)
            .field("context", &self.context)
            .field(
                "operation",
                &self.operation.as_ref().map(|operation| operation.name()),
            )
            .finish()
    }
}

/// Resolves input against a registry.
///
/// Resolution is all-or-nothing: when any segment's verb is unknown in both its context and the
/// global context, the whole input resolves to nothing.
pub struct InputResolver<'a> {
    registry: &'a CommandRegistry,
    parser: HeadlessParser,
}

impl<'a> InputResolver<'a> {
    /// Creates a resolver over `registry` using `syntax`.
    pub fn new(registry: &'a CommandRegistry, syntax: InputSyntax) -> Self {
        Self {
            registry,
            parser: HeadlessParser::new(syntax),
        }
    }

    /// Resolves `input`, starting in `default_context`.
    ///
    /// An empty segment inside a compound input has an empty verb, which never resolves.
    ///
    /// An explicit context in one segment's verb (`shop.buy`) stays in force for the remaining
    /// segments until another segment overrides it.
    pub fn resolve(&self, default_context: Option<&str>, input: &str) -> Vec<SubCommand> {
        let initial = (CommandScope::from_context(default_context), Vec::new());
        self.parser
            .parse_line(input)
            .into_iter()
            .try_fold(initial, |(active, mut resolved), segment| {
                let ParsedSegment {
                    context,
                    verb,
                    parameter,
                } = segment;
                let active = match context {
                    Some(explicit) => CommandScope::from_context(Some(&explicit)),
                    None => active,
                };
                let found = (!verb.is_empty())
                    .then(|| self.locate(&active, &verb))
                    .flatten();
                let Some(operation) = found else {
                    trace!(verb = %verb, context = active.as_str(), "unresolved verb; rejecting input");
                    return None;
                };
                resolved.push(SubCommand {
                    verb,
                    parameter,
                    context: active.clone(),
                    operation: Some(operation),
                });
                Some((active, resolved))
            })
            .map(|(_, resolved)| resolved)
            .unwrap_or_default()
    }

    /// Looks `verb` up in `context`, then in the global context.
    pub fn locate(&self, context: &CommandScope, verb: &str) -> Option<OperationRef> {
        self.registry
            .lookup(context.context(), verb)
            .or_else(|| {
                (!context.is_global())
                    .then(|| self.registry.lookup(None, verb))
                    .flatten()
            })
    }
}

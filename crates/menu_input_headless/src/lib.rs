//! Headless menu-input parser with no registry or navigation dependencies.
//!
//! This crate only implements the lexical half of input resolution: splitting a compound line
//! into segments, separating each segment's verb from its parameter, and extracting an explicit
//! context override from the verb. Deciding what a verb means is left to the dispatch engine.
//!
//! [`ParameterSpec`] covers the other half of input handling: turning an operation's raw
//! parameter text into typed, validated values.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod parameters;

pub use parameters::{
    Conversion, ParameterError, ParameterShape, ParameterSpec, ParameterValue, ParameterValues,
    SINGLE_VALUE_KEY,
};

use serde::{Deserialize, Serialize};

/// Token separating the sub-commands of a compound input.
pub const DEFAULT_SEPARATOR: &str = "##";

/// Character separating an explicit context from a verb, as in `shop.buy`.
pub const DEFAULT_CONTEXT_DELIMITER: char = '.';

/// Lexical rules for menu input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSyntax {
    /// Compound-input separator token.
    pub separator: String,
    /// Context-override delimiter.
    pub context_delimiter: char,
}

impl Default for InputSyntax {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            context_delimiter: DEFAULT_CONTEXT_DELIMITER,
        }
    }
}

/// One sub-command segment after lexical parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSegment {
    /// Explicit context named in the verb. `Some("")` selects the global context.
    pub context: Option<String>,
    /// Effective verb with any context prefix removed.
    pub verb: String,
    /// Trimmed text after the verb, absent when the segment is a bare verb.
    pub parameter: Option<String>,
}

impl ParsedSegment {
    /// Returns whether the segment switches the active context.
    pub fn overrides_context(&self) -> bool {
        self.context.is_some()
    }
}

/// Stateless parser bound to one [`InputSyntax`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessParser {
    syntax: InputSyntax,
}

impl HeadlessParser {
    /// Creates a parser for `syntax`.
    pub fn new(syntax: InputSyntax) -> Self {
        Self { syntax }
    }

    /// Returns the syntax this parser applies.
    pub fn syntax(&self) -> &InputSyntax {
        &self.syntax
    }

    /// Splits a raw line into trimmed segments in input order.
    ///
    /// Trailing empty segments are dropped, so a blank line or a trailing separator adds
    /// nothing. Empty segments before the last non-empty one are kept; they carry an empty verb
    /// that never resolves.
    pub fn split_compound<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let mut segments = if self.syntax.separator.is_empty() {
            vec![line.trim()]
        } else {
            line.split(self.syntax.separator.as_str())
                .map(str::trim)
                .collect::<Vec<_>>()
        };
        while segments.last().is_some_and(|segment| segment.is_empty()) {
            segments.pop();
        }
        segments
    }

    /// Parses one segment. An empty segment yields an empty verb.
    pub fn parse_segment(&self, segment: &str) -> ParsedSegment {
        let segment = segment.trim();
        let (head, parameter) = match segment.find(char::is_whitespace) {
            Some(split) => {
                let rest = segment[split..].trim();
                (
                    &segment[..split],
                    (!rest.is_empty()).then(|| rest.to_string()),
                )
            }
            None => (segment, None),
        };

        let (context, verb) = match head.split_once(self.syntax.context_delimiter) {
            Some((context, verb)) => (Some(context.to_string()), verb),
            None => (None, head),
        };

        ParsedSegment {
            context,
            verb: verb.to_string(),
            parameter,
        }
    }

    /// Parses a whole line. Empty or blank input yields no segments.
    pub fn parse_line(&self, line: &str) -> Vec<ParsedSegment> {
        self.split_compound(line)
            .into_iter()
            .map(|segment| self.parse_segment(segment))
            .collect()
    }
}

/// Convenience wrapper around [`HeadlessParser::parse_line`] using the default syntax.
pub fn parse_line(line: &str) -> Vec<ParsedSegment> {
    HeadlessParser::default().parse_line(line)
}

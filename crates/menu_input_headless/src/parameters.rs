//! Typed processing of an operation's parameter text.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which the single-value shapes store their value.
pub const SINGLE_VALUE_KEY: &str = "value";

/// How parameter text is structured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterShape {
    /// Whitespace-separated `key=value` pairs; values may be quoted.
    #[default]
    NameValuePairs,
    /// The whole trimmed text as one string.
    SingleString,
    /// The whole trimmed text as one integer.
    SingleInteger,
}

/// Conversion applied to one raw value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Conversion {
    /// Keep the text as-is.
    #[default]
    Text,
    /// Parse a signed integer.
    Integer,
    /// Parse `true`/`false`, `yes`/`no`, `on`/`off`, or `1`/`0`.
    Boolean,
}

impl Conversion {
    /// Stable kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    fn apply(self, key: &str, raw: &str) -> Result<ParameterValue, ParameterError> {
        let invalid = || ParameterError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: self,
        };
        match self {
            Self::Text => Ok(ParameterValue::Text(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(ParameterValue::Integer)
                .map_err(|_| invalid()),
            Self::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(ParameterValue::Boolean(true)),
                "false" | "no" | "off" | "0" => Ok(ParameterValue::Boolean(false)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One converted parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Boolean flag.
    Boolean(bool),
    /// Signed integer.
    Integer(i64),
    /// Unconverted text.
    Text(String),
}

impl ParameterValue {
    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the flag, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }
}

/// Processed parameters keyed by name.
pub type ParameterValues = BTreeMap<String, ParameterValue>;

/// Why parameter text was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParameterError {
    /// The text could not be split into `key=value` pairs.
    Malformed {
        /// Human-readable message.
        message: String,
    },
    /// Required keys were absent and had no default.
    MissingRequired {
        /// Missing keys, sorted.
        keys: Vec<String>,
    },
    /// A value failed its conversion.
    InvalidValue {
        /// Key of the offending value.
        key: String,
        /// Raw text of the value.
        value: String,
        /// Conversion that failed.
        expected: Conversion,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "malformed parameters: {message}"),
            Self::MissingRequired { keys } => {
                write!(f, "missing required parameters: {}", keys.join(", "))
            }
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "parameter `{key}` expected {expected}, found `{value}`"),
        }
    }
}

impl std::error::Error for ParameterError {}

/// Declarative description of the parameters an operation accepts.
///
/// Processing runs in a fixed order: split the text according to [`ParameterShape`], fill
/// absent keys from `defaults`, check `required`, then apply `conversions`. The single-value
/// shapes use [`SINGLE_VALUE_KEY`] for requirement and default lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSpec {
    /// Text structure.
    pub shape: ParameterShape,
    /// Keys that must be present after defaults are applied.
    pub required: BTreeSet<String>,
    /// Per-key conversions; keys without one stay text.
    pub conversions: BTreeMap<String, Conversion>,
    /// Values used when a key is absent from the input.
    pub defaults: BTreeMap<String, String>,
}

impl ParameterSpec {
    /// Spec for `key=value` pairs.
    pub fn name_value_pairs() -> Self {
        Self::default()
    }

    /// Spec for a single string stored under [`SINGLE_VALUE_KEY`].
    pub fn single_string() -> Self {
        Self {
            shape: ParameterShape::SingleString,
            ..Self::default()
        }
    }

    /// Spec for a single integer stored under [`SINGLE_VALUE_KEY`].
    pub fn single_integer() -> Self {
        Self {
            shape: ParameterShape::SingleInteger,
            ..Self::default()
        }
    }

    /// Marks `key` as required.
    pub fn require(mut self, key: impl Into<String>) -> Self {
        self.required.insert(key.into());
        self
    }

    /// Sets the conversion for `key`.
    pub fn convert(mut self, key: impl Into<String>, conversion: Conversion) -> Self {
        self.conversions.insert(key.into(), conversion);
        self
    }

    /// Supplies a value for `key` when the input lacks one.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Processes an operation's parameter text.
    pub fn process(&self, parameter: Option<&str>) -> Result<ParameterValues, ParameterError> {
        let text = parameter.map(str::trim).filter(|text| !text.is_empty());
        match self.shape {
            ParameterShape::NameValuePairs => {
                let pairs = match text {
                    Some(text) => split_pairs(text)?,
                    None => BTreeMap::new(),
                };
                self.finish(pairs)
            }
            ParameterShape::SingleString => self.single(text, Conversion::Text),
            ParameterShape::SingleInteger => self.single(text, Conversion::Integer),
        }
    }

    fn single(
        &self,
        text: Option<&str>,
        conversion: Conversion,
    ) -> Result<ParameterValues, ParameterError> {
        let mut values = ParameterValues::new();
        let converted = text.map(|text| conversion.apply(SINGLE_VALUE_KEY, text));
        let value = match (converted, self.defaults.get(SINGLE_VALUE_KEY)) {
            (Some(Ok(value)), _) => Some(value),
            (Some(Err(_)) | None, Some(default)) => {
                Some(conversion.apply(SINGLE_VALUE_KEY, default)?)
            }
            (Some(Err(err)), None) if self.required.contains(SINGLE_VALUE_KEY) => return Err(err),
            (Some(Err(_)), None) => None,
            (None, None) if self.required.contains(SINGLE_VALUE_KEY) => {
                return Err(ParameterError::MissingRequired {
                    keys: vec![SINGLE_VALUE_KEY.to_string()],
                })
            }
            (None, None) => None,
        };
        if let Some(value) = value {
            values.insert(SINGLE_VALUE_KEY.to_string(), value);
        }
        Ok(values)
    }

    fn finish(&self, mut pairs: BTreeMap<String, String>) -> Result<ParameterValues, ParameterError> {
        for (key, value) in &self.defaults {
            pairs.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let missing = self
            .required
            .iter()
            .filter(|key| !pairs.contains_key(*key))
            .cloned()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ParameterError::MissingRequired { keys: missing });
        }

        pairs
            .into_iter()
            .map(|(key, raw)| {
                let conversion = self.conversions.get(&key).copied().unwrap_or_default();
                let value = conversion.apply(&key, &raw)?;
                Ok((key, value))
            })
            .collect()
    }
}

fn split_pairs(text: &str) -> Result<BTreeMap<String, String>, ParameterError> {
    tokenize(text)?
        .into_iter()
        .map(|token| match token.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(ParameterError::Malformed {
                message: format!("expected key=value, found `{token}`"),
            }),
        })
        .collect()
}

fn malformed(message: &str) -> ParameterError {
    ParameterError::Malformed {
        message: message.to_string(),
    }
}

fn tokenize(text: &str) -> Result<Vec<String>, ParameterError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    let mut quote = None::<char>;

    while let Some(ch) = chars.next() {
        match quote {
            Some(active) if ch == active => quote = None,
            _ if ch == '\\' => {
                let Some(next) = chars.next() else {
                    return Err(malformed("dangling escape sequence"));
                };
                current.push(next);
            }
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }

    if quote.is_some() {
        return Err(malformed("unterminated quoted string"));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

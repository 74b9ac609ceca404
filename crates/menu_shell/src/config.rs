//! Dispatcher configuration and TOML loading.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use menu_input_headless::InputSyntax;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MenuError, MenuResult};

/// Text substituted for an empty menu title or code.
pub const DEFAULT_MENU_PLACEHOLDER: &str = "Menu";

/// Default limit for batch operations that dispatch further batches.
pub const DEFAULT_MAX_BATCH_DEPTH: usize = 8;

/// Tunables for one [`MenuDispatcher`](crate::dispatcher::MenuDispatcher).
///
/// Every field has a default, so a config file only needs to name what it changes:
///
/// ```toml
/// exit_verbs = ["exit", "quit", "bye", "q"]
///
/// [syntax]
/// separator = ";;"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Compound-input and context-override syntax.
    pub syntax: InputSyntax,
    /// Global verbs bound to the "up" core action.
    pub up_verbs: Vec<String>,
    /// Global verbs bound to the "exit" core action.
    pub exit_verbs: Vec<String>,
    /// Replacement for empty menu titles and codes.
    pub menu_placeholder: String,
    /// Maximum nesting of batch operations inside one dispatch.
    pub max_batch_depth: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            syntax: InputSyntax::default(),
            up_verbs: vec!["0".to_string(), "up".to_string()],
            exit_verbs: vec!["exit".to_string(), "quit".to_string(), "bye".to_string()],
            menu_placeholder: DEFAULT_MENU_PLACEHOLDER.to_string(),
            max_batch_depth: DEFAULT_MAX_BATCH_DEPTH,
        }
    }
}

impl DispatcherConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(body: &str) -> MenuResult<Self> {
        toml::from_str(body).map_err(|err| MenuError::Config {
            path: "<inline>".to_string(),
            message: err.to_string(),
        })
    }

    /// Loads a TOML config file.
    pub fn load(path: impl Into<PathBuf>) -> MenuResult<Self> {
        ConfigLoader::<Self>::new(path).load()
    }
}

/// Generic TOML-backed config loader.
///
/// Handles only filesystem access and deserialization; semantic checks belong to the caller.
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned,
{
    /// Creates a loader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Loads and deserializes the file.
    ///
    /// Missing files, unreadable files, and TOML parse failures all surface as
    /// [`MenuError::Config`] naming the path.
    pub fn load(&self) -> MenuResult<T> {
        let body = fs::read_to_string(&self.path).map_err(|err| MenuError::Config {
            path: self.path.display().to_string(),
            message: format!("failed to read: {err}"),
        })?;
        toml::from_str(&body).map_err(|err| MenuError::Config {
            path: self.path.display().to_string(),
            message: format!("failed to parse: {err}"),
        })
    }

    /// Returns the config path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use pretty_assertions::assert_eq;

    use super::*;

    fn unique_test_root() -> PathBuf {
        std::env::temp_dir().join(format!(
            "menu-shell-config-test-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ))
    }

    #[test]
    fn defaults_match_core_actions() {
        let config = DispatcherConfig::default();
        assert_eq!(config.syntax.separator, "##");
        assert_eq!(config.syntax.context_delimiter, '.');
        assert_eq!(config.up_verbs, vec!["0", "up"]);
        assert_eq!(config.exit_verbs, vec!["exit", "quit", "bye"]);
        assert_eq!(config.menu_placeholder, "Menu");
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = DispatcherConfig::from_toml_str(
            "exit_verbs = [\"q\"]\n\n[syntax]\nseparator = \";;\"\n",
        )
        .expect("parse config");
        assert_eq!(config.exit_verbs, vec!["q"]);
        assert_eq!(config.syntax.separator, ";;");
        assert_eq!(config.syntax.context_delimiter, '.');
        assert_eq!(config.up_verbs, vec!["0", "up"]);
    }

    #[test]
    fn load_reads_config_from_disk() {
        let root = unique_test_root();
        fs::create_dir_all(&root).expect("create temp root");
        let path = root.join("menu.toml");
        fs::write(&path, "max_batch_depth = 2\nmenu_placeholder = \"Untitled\"\n")
            .expect("write config");

        let config = DispatcherConfig::load(&path).expect("load config");
        assert_eq!(config.max_batch_depth, 2);
        assert_eq!(config.menu_placeholder, "Untitled");

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn load_reports_missing_file_as_config_error() {
        let root = unique_test_root();
        let loader = ConfigLoader::<DispatcherConfig>::new(root.join("missing.toml"));
        let err = loader.load().expect_err("missing config should fail");
        assert!(matches!(err, MenuError::Config { .. }));
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = DispatcherConfig::from_toml_str("up_verbs = [").expect_err("broken toml");
        assert!(matches!(err, MenuError::Config { ref path, .. } if path == "<inline>"));
    }
}

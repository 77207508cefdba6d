//! Configuration management for scalasense

use crate::defaults;
use crate::encoding::Encoding;
use std::collections::BTreeMap;
use std::path::Path;

/// Host settings: free-form string keys mapped to string values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Configuration for an analysis run
#[derive(Debug, Clone)]
pub struct Config {
    pub encoding: Encoding,
    pub test_dirs: Vec<String>,
    pub function_limits: Vec<u32>,
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            test_dirs: defaults::sources::TEST_DIRS.iter().map(|d| (*d).to_string()).collect(),
            function_limits: defaults::complexity::FUNCTION_LIMITS.to_vec(),
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// Load config from files, with later files overriding earlier ones.
    /// Loads from: ~/.scalasense, <project_dir>/.scalasense
    pub fn load(project_dir: &Path) -> Self {
        let mut config = Self::default();
        if let Some(home) = std::env::var_os("HOME")
            && let Ok(content) =
                std::fs::read_to_string(Path::new(&home).join(defaults::sources::CONFIG_FILE_NAME))
        {
            config.merge_from_toml(&content);
        }
        if let Ok(content) =
            std::fs::read_to_string(project_dir.join(defaults::sources::CONFIG_FILE_NAME))
        {
            config.merge_from_toml(&content);
        }
        config
    }

    /// Load config from a specific file path
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::default();
        match std::fs::read_to_string(path) {
            Ok(content) => config.merge_from_toml(&content),
            Err(e) => tracing::warn!("Could not read config file {}: {e}", path.display()),
        }
        config
    }

    fn merge_from_toml(&mut self, content: &str) {
        let table = match content.parse::<toml::Table>() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Ignoring malformed config: {e}");
                return;
            }
        };
        check_unknown_keys(&table, &["sources", "complexity", "settings"], "top level");

        if let Some(sources) = table.get("sources").and_then(toml::Value::as_table) {
            self.apply_sources(sources);
        }
        if let Some(complexity) = table.get("complexity").and_then(toml::Value::as_table) {
            self.apply_complexity(complexity);
        }
        if let Some(settings) = table.get("settings").and_then(toml::Value::as_table) {
            self.apply_settings(settings);
        }
    }

    fn apply_sources(&mut self, table: &toml::Table) {
        check_unknown_keys(table, &["encoding", "test_dirs"], "sources");
        if let Some(name) = get_string(table, "encoding") {
            match name.parse::<Encoding>() {
                Ok(enc) => self.encoding = enc,
                Err(e) => tracing::warn!("{e}; keeping {}", self.encoding),
            }
        }
        if let Some(dirs) = get_string_list(table, "test_dirs") {
            self.test_dirs = dirs;
        }
    }

    fn apply_complexity(&mut self, table: &toml::Table) {
        check_unknown_keys(table, &["function_limits"], "complexity");
        let Some(limits) = get_u32_list(table, "function_limits") else { return };
        if limits.is_empty() || !limits.windows(2).all(|w| w[0] < w[1]) {
            tracing::warn!(
                "Config key 'function_limits' must be non-empty and strictly increasing"
            );
            return;
        }
        self.function_limits = limits;
    }

    fn apply_settings(&mut self, table: &toml::Table) {
        for (key, value) in table {
            match value {
                toml::Value::String(s) => self.settings.set(key.as_str(), s.as_str()),
                other => tracing::warn!(
                    "Setting '{key}' expected string, got {}",
                    other.type_str()
                ),
            }
        }
    }
}

pub(crate) fn check_unknown_keys(table: &toml::Table, known: &[&str], section: &str) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            tracing::warn!("Unknown config key '{key}' in {section}");
        }
    }
}

fn get_string(table: &toml::Table, key: &str) -> Option<String> {
    let value = table.get(key)?;
    value.as_str().map(str::to_string).or_else(|| {
        tracing::warn!("Config key '{key}' expected string, got {}", value.type_str());
        None
    })
}

fn get_string_list(table: &toml::Table, key: &str) -> Option<Vec<String>> {
    let value = table.get(key)?;
    let list = value
        .as_array()
        .and_then(|arr| {
            arr.iter().map(|v| v.as_str().map(str::to_string)).collect::<Option<Vec<_>>>()
        });
    if list.is_none() {
        tracing::warn!("Config key '{key}' expected array of strings");
    }
    list
}

fn get_u32_list(table: &toml::Table, key: &str) -> Option<Vec<u32>> {
    let value = table.get(key)?;
    let list = value.as_array().and_then(|arr| {
        arr.iter()
            .map(|v| v.as_integer().and_then(|i| u32::try_from(i).ok()))
            .collect::<Option<Vec<_>>>()
    });
    if list.is_none() {
        tracing::warn!("Config key '{key}' expected array of non-negative integers");
    }
    list
}

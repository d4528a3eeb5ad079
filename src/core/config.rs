//! Process-wide configuration loaded once from `<cache-home>/config.json`.
//!
//! Every key is optional. A file that cannot be parsed, a key of the wrong
//! type, or a malformed provider entry only produces a warning and leaves the
//! default in place; loading never fails the invocation.

use crate::core::dirs::{expand_home, get_cache_home};
use crate::core::error::{GitLauncherError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const HISTORY_FILE: &str = "history.jsonl";

/// Two weeks.
pub const DEFAULT_TTL_MS: u64 = 14 * 24 * 60 * 60 * 1000;

/// Cache size at which the opportunistic TTL purge starts scanning.
pub const DEFAULT_PURGE_FLOOR: usize = 10;

pub const DEFAULT_PROVIDER: &str = "claude";

/// A provider alias as written by the user: either a bare command string or
/// an object carrying the command plus a description.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum RawProvider {
    Command(String),
    Detailed {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// Normalized launch alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    pub command: String,
    pub description: Option<String>,
}

impl Provider {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: None,
        }
    }

    fn from_raw(raw: RawProvider) -> Option<Self> {
        let (command, description) = match raw {
            RawProvider::Command(command) => (command, None),
            RawProvider::Detailed {
                command,
                description,
            } => (command, description),
        };
        if command.trim().is_empty() {
            return None;
        }
        Some(Self {
            command,
            description,
        })
    }

    fn to_raw(&self) -> RawProvider {
        match &self.description {
            None => RawProvider::Command(self.command.clone()),
            Some(description) => RawProvider::Detailed {
                command: self.command.clone(),
                description: Some(description.clone()),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub cache_home: PathBuf,
    pub base_dir: PathBuf,
    pub ttl_ms: u64,
    pub purge_floor: usize,
    pub shallow: bool,
    pub default_provider: String,
    pub providers: BTreeMap<String, Provider>,
    /// Problems found while loading; reported once by the caller.
    pub warnings: Vec<String>,
}

impl Config {
    /// Built-in configuration rooted at `cache_home`.
    pub fn defaults(cache_home: &Path) -> Self {
        let mut providers = BTreeMap::new();
        providers.insert("claude".to_string(), Provider::new("claude"));
        providers.insert("codex".to_string(), Provider::new("codex"));
        providers.insert("shell".to_string(), Provider::new("${SHELL:-sh}"));

        Self {
            cache_home: cache_home.to_path_buf(),
            base_dir: cache_home.join("repos"),
            ttl_ms: DEFAULT_TTL_MS,
            purge_floor: DEFAULT_PURGE_FLOOR,
            shallow: false,
            default_provider: DEFAULT_PROVIDER.to_string(),
            providers,
            warnings: Vec::new(),
        }
    }

    pub fn load() -> Result<Self> {
        let cache_home = get_cache_home()?;
        Ok(Self::load_from(&cache_home))
    }

    pub fn load_from(cache_home: &Path) -> Self {
        let mut config = Self::defaults(cache_home);
        let path = config.config_path();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config file at {}, using defaults", path.display());
                return config;
            }
            Err(e) => {
                config.warn(format!("cannot read {}: {e}", path.display()));
                return config;
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => config.apply(&map),
            Ok(_) => config.warn(format!("{} must contain a JSON object", path.display())),
            Err(e) => config.warn(format!("cannot parse {}: {e}", path.display())),
        }

        log::debug!(
            "Loaded config: base_dir={}, ttl_ms={}, purge_floor={}",
            config.base_dir.display(),
            config.ttl_ms,
            config.purge_floor
        );
        config
    }

    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings
            .push(GitLauncherError::config(message).to_string());
    }

    fn apply(&mut self, map: &Map<String, Value>) {
        if let Some(value) = map.get("baseDir") {
            match value.as_str().filter(|s| !s.trim().is_empty()) {
                Some(dir) => {
                    let dir = expand_home(dir);
                    self.base_dir = if dir.is_absolute() {
                        dir
                    } else {
                        self.cache_home.join(dir)
                    };
                }
                None => self.warn("baseDir must be a non-empty string".to_string()),
            }
        }

        if let Some(value) = map.get("ttlMs") {
            match value.as_u64() {
                Some(ttl) => self.ttl_ms = ttl,
                None => self.warn("ttlMs must be a non-negative integer".to_string()),
            }
        }

        if let Some(value) = map.get("purgeFloor") {
            match value.as_u64().and_then(|n| usize::try_from(n).ok()) {
                Some(floor) => self.purge_floor = floor,
                None => self.warn("purgeFloor must be a non-negative integer".to_string()),
            }
        }

        if let Some(value) = map.get("shallow") {
            match value.as_bool() {
                Some(shallow) => self.shallow = shallow,
                None => self.warn("shallow must be true or false".to_string()),
            }
        }

        if let Some(value) = map.get("defaultProvider") {
            match value.as_str().filter(|s| !s.trim().is_empty()) {
                Some(name) => self.default_provider = name.to_string(),
                None => self.warn("defaultProvider must be a non-empty string".to_string()),
            }
        }

        match map.get("providers") {
            Some(Value::Object(entries)) => {
                for (name, value) in entries {
                    let parsed = serde_json::from_value::<RawProvider>(value.clone())
                        .ok()
                        .and_then(Provider::from_raw);
                    match parsed {
                        Some(provider) => {
                            self.providers.insert(name.clone(), provider);
                        }
                        None => self.warn(format!("ignoring malformed provider '{name}'")),
                    }
                }
            }
            Some(_) => self.warn("providers must be an object".to_string()),
            None => {}
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.cache_home.join(CONFIG_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.cache_home.join(HISTORY_FILE)
    }

    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.ttl_ms).unwrap_or(i64::MAX))
    }

    /// Pick the command to launch: a raw `--launch` command wins, then the
    /// `--provider` alias, then the configured default provider.
    pub fn launch_command(&self, provider: Option<&str>, launch: Option<&str>) -> Result<String> {
        if let Some(command) = launch.filter(|c| !c.trim().is_empty()) {
            return Ok(command.to_string());
        }
        let name = provider.unwrap_or(&self.default_provider);
        self.providers
            .get(name)
            .map(|p| p.command.clone())
            .ok_or_else(|| GitLauncherError::unknown_provider(name))
    }

    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_home)?;

        let providers: BTreeMap<&str, RawProvider> = self
            .providers
            .iter()
            .map(|(name, provider)| (name.as_str(), provider.to_raw()))
            .collect();

        let document = serde_json::json!({
            "baseDir": self.base_dir,
            "ttlMs": self.ttl_ms,
            "purgeFloor": self.purge_floor,
            "shallow": self.shallow,
            "defaultProvider": self.default_provider,
            "providers": providers,
        });

        let content = serde_json::to_string_pretty(&document)?;
        fs::write(self.config_path(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) {
        fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(temp.path());

        assert_eq!(config.ttl_ms, DEFAULT_TTL_MS);
        assert_eq!(config.purge_floor, DEFAULT_PURGE_FLOOR);
        assert_eq!(config.base_dir, temp.path().join("repos"));
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_reads_known_keys() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            r#"{"baseDir": "/srv/clones", "ttlMs": 1000, "purgeFloor": 3, "shallow": true, "defaultProvider": "codex"}"#,
        );

        let config = Config::load_from(temp.path());
        assert_eq!(config.base_dir, PathBuf::from("/srv/clones"));
        assert_eq!(config.ttl_ms, 1000);
        assert_eq!(config.purge_floor, 3);
        assert!(config.shallow);
        assert_eq!(config.default_provider, "codex");
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_malformed_file_falls_back_with_warning() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "{ not json");

        let config = Config::load_from(temp.path());
        assert_eq!(config.ttl_ms, DEFAULT_TTL_MS);
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].contains("Invalid configuration"));
    }

    #[test]
    fn test_wrong_type_only_resets_that_key() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{"ttlMs": "soon", "purgeFloor": 4}"#);

        let config = Config::load_from(temp.path());
        assert_eq!(config.ttl_ms, DEFAULT_TTL_MS);
        assert_eq!(config.purge_floor, 4);
        assert_eq!(config.warnings.len(), 1);
    }

    #[test]
    fn test_provider_string_and_object_forms_normalize() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            r#"{"providers": {
                "aider": "aider --no-auto-commits",
                "gem": {"command": "gemini", "description": "Gemini CLI"},
                "broken": {"description": "no command"},
                "empty": "  "
            }}"#,
        );

        let config = Config::load_from(temp.path());
        assert_eq!(
            config.providers.get("aider"),
            Some(&Provider::new("aider --no-auto-commits"))
        );
        assert_eq!(
            config.providers.get("gem"),
            Some(&Provider {
                command: "gemini".to_string(),
                description: Some("Gemini CLI".to_string()),
            })
        );
        assert!(!config.providers.contains_key("broken"));
        assert!(!config.providers.contains_key("empty"));
        assert_eq!(config.warnings.len(), 2);
        // built-ins survive alongside user entries
        assert!(config.providers.contains_key("claude"));
    }

    #[test]
    fn test_launch_command_precedence() {
        let temp = TempDir::new().unwrap();
        let config = Config::defaults(temp.path());

        assert_eq!(config.launch_command(None, None).unwrap(), "claude");
        assert_eq!(config.launch_command(Some("codex"), None).unwrap(), "codex");
        assert_eq!(
            config
                .launch_command(Some("codex"), Some("vim ."))
                .unwrap(),
            "vim ."
        );
        assert!(matches!(
            config.launch_command(Some("nope"), None),
            Err(GitLauncherError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn test_save_then_load_preserves_settings() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::defaults(temp.path());
        config.ttl_ms = 42;
        config.shallow = true;
        config.providers.insert(
            "gem".to_string(),
            Provider {
                command: "gemini".to_string(),
                description: Some("Gemini CLI".to_string()),
            },
        );
        config.save().unwrap();

        let loaded = Config::load_from(temp.path());
        assert_eq!(loaded.ttl_ms, 42);
        assert!(loaded.shallow);
        assert_eq!(loaded.providers, config.providers);
        assert_eq!(loaded.base_dir, config.base_dir);
        assert!(loaded.warnings.is_empty());
    }
}

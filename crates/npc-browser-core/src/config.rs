// Configuration loading and parsing (npc-browser.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::host::{HostUser, SettingDef, SettingScope, SettingsStore};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Identifier the module registers its settings and shortcut under.
pub const MODULE_ID: &str = "strapi-npc-browser";

/// Default content API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.rolandodados.com.br";

/// Settings key holding the content API base URL.
pub const API_URL_SETTING: &str = "apiUrl";

const CONFIG_FILE: &str = "npc-browser.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    pub user: HostUser,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Per-world values that seed the settings store.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// JSON-lines file backing the terminal host's chat feed.
    #[serde(default = "default_chat_log")]
    pub log_path: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            log_path: default_chat_log(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    /// Overall request timeout. Unset means the transport's own behavior.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_chat_log() -> String {
    "data/chat.jsonl".to_string()
}

// ---------------------------------------------------------------------------
// Settings registration
// ---------------------------------------------------------------------------

/// Declaration of the world-scoped API URL setting.
pub fn api_url_setting() -> SettingDef {
    SettingDef {
        key: API_URL_SETTING,
        name: "API URL",
        hint: "Base URL for the Strapi API",
        scope: SettingScope::World,
        default: DEFAULT_API_BASE_URL.to_string(),
    }
}

/// Read the configured base URL, falling back to the default host when the
/// store has no (or a blank) value.
pub fn resolve_base_url(settings: &dyn SettingsStore) -> String {
    match settings.get(API_URL_SETTING) {
        Some(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_API_BASE_URL.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/npc-browser.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse and validate config text. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.world.api_url = normalize_base_url(&config.world.api_url)?;
    validate(&config)?;
    Ok(config)
}

/// Copy `defaults/npc-browser.toml` into `config/` when missing.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if target.exists() {
        return Ok(vec![]);
    }
    if !defaults.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} found; run from the project root",
                defaults.display(),
                target.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&defaults, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;

    Ok(vec![target])
}

/// Convenience wrapper: loads config relative to the current working directory,
/// copying defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Check the URL is absolute http(s) and drop trailing slashes so that
/// `base + "/api/npcs"` and `base + "/uploads/..."` join cleanly.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::ValidationError {
        field: "world.api_url".into(),
        message: format!("not a valid URL ({e}): {raw}"),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::ValidationError {
            field: "world.api_url".into(),
            message: format!("scheme must be http or https, got {}", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.user.id.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "user.id".into(),
            message: "must not be empty".into(),
        });
    }

    if config.chat.log_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "chat.log_path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.http.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "http.timeout_secs".into(),
            message: "must be greater than 0 when set".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

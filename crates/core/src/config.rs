use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AdminIdentity;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub json_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub full_name: String,
    pub email: String,
    pub passphrase: SecretString,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Json,
    Sqlite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub backend: Option<StoreBackend>,
    pub json_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::Json,
                json_path: PathBuf::from("retail_data.json"),
            },
            database: DatabaseConfig {
                url: "sqlite://lapak.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            admin: AdminConfig {
                full_name: String::new(),
                email: String::new(),
                passphrase: String::new().into(),
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: Some("http://localhost:11434".to_string()),
                model: "llama3.1".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::Validation(format!(
                "unsupported store backend `{other}` (expected json|sqlite)"
            ))),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|anthropic|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AdminConfig {
    pub fn identity(&self) -> AdminIdentity {
        AdminIdentity {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            passphrase: self.passphrase.expose_secret().to_string().into(),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("lapak.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(backend) = store.backend {
                self.store.backend = backend;
            }
            if let Some(json_path) = store.json_path {
                self.store.json_path = json_path;
            }
        }

        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(admin) = patch.admin {
            if let Some(full_name) = admin.full_name {
                self.admin.full_name = full_name;
            }
            if let Some(email) = admin.email {
                self.admin.email = email;
            }
            if let Some(passphrase_value) = admin.passphrase {
                self.admin.passphrase = passphrase_value.into();
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(api_key_value) = llm.api_key {
                self.llm.api_key = Some(api_key_value.into());
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LAPAK_STORE_BACKEND") {
            self.store.backend = value.parse()?;
        }
        if let Some(value) = read_env("LAPAK_STORE_JSON_PATH") {
            self.store.json_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("LAPAK_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("LAPAK_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("LAPAK_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("LAPAK_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("LAPAK_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LAPAK_ADMIN_FULL_NAME") {
            self.admin.full_name = value;
        }
        if let Some(value) = read_env("LAPAK_ADMIN_EMAIL") {
            self.admin.email = value;
        }
        if let Some(value) = read_env("LAPAK_ADMIN_PASSPHRASE") {
            self.admin.passphrase = value.into();
        }

        if let Some(value) = read_env("LAPAK_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("LAPAK_LLM_API_KEY") {
            self.llm.api_key = Some(value.into());
        }
        if let Some(value) = read_env("LAPAK_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("LAPAK_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("LAPAK_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("LAPAK_LLM_TIMEOUT_SECS", &value)?;
        }

        let log_level = read_env("LAPAK_LOGGING_LEVEL").or_else(|| read_env("LAPAK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("LAPAK_LOGGING_FORMAT").or_else(|| read_env("LAPAK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(backend) = overrides.backend {
            self.store.backend = backend;
        }
        if let Some(json_path) = overrides.json_path {
            self.store.json_path = json_path;
        }
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_database(&self.database)?;
        validate_admin(&self.admin)?;
        validate_llm(&self.llm)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("lapak.toml"), PathBuf::from("config/lapak.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.backend == StoreBackend::Json && store.json_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "store.json_path is required for the json backend".to_string(),
        ));
    }
    Ok(())
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_admin(admin: &AdminConfig) -> Result<(), ConfigError> {
    if admin.full_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "admin.full_name is required: mutating operations cannot be authorized without it"
                .to_string(),
        ));
    }

    let email = admin.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ConfigError::Validation(
            "admin.email is required and must contain `@`".to_string(),
        ));
    }

    if admin.passphrase.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation("admin.passphrase is required".to_string()));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    match llm.provider {
        LlmProvider::OpenAi | LlmProvider::Anthropic => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for openai/anthropic providers".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for the ollama provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    database: Option<DatabasePatch>,
    admin: Option<AdminPatch>,
    llm: Option<LlmPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    backend: Option<StoreBackend>,
    json_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AdminPatch {
    full_name: Option<String>,
    email: Option<String>,
    passphrase: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, StoreBackend};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    const ADMIN_VARS: [&str; 3] =
        ["LAPAK_ADMIN_FULL_NAME", "LAPAK_ADMIN_EMAIL", "LAPAK_ADMIN_PASSPHRASE"];

    fn set_admin_vars() {
        env::set_var("LAPAK_ADMIN_FULL_NAME", "faishal bhitex");
        env::set_var("LAPAK_ADMIN_EMAIL", "owner@bhitexretail.example");
        env::set_var("LAPAK_ADMIN_PASSPHRASE", "muhammadf@isha11");
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_admin_vars();
        env::set_var("LAPAK_DATABASE_URL", "sqlite://from-env.db");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("lapak.toml");
            fs::write(
                &path,
                r#"
[store]
backend = "sqlite"

[database]
url = "sqlite://from-file.db"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.store.backend == StoreBackend::Sqlite,
                "file backend setting should apply",
            )?;
            ensure(
                config.database.url == "sqlite://from-env.db",
                "env database url should win over file",
            )?;
            ensure(config.logging.level == "debug", "override log level should win over file")?;
            Ok(())
        })();

        clear_vars(&ADMIN_VARS);
        clear_vars(&["LAPAK_DATABASE_URL"]);
        result
    }

    #[test]
    fn missing_admin_credentials_fail_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(&ADMIN_VARS);
        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("admin.full_name")
            );
            ensure(has_message, "validation failure should mention admin.full_name")
        })();

        result
    }

    #[test]
    fn passphrase_is_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_admin_vars();

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("muhammadf@isha11"),
                "debug output should not contain the admin passphrase",
            )?;
            ensure(
                config.admin.passphrase.expose_secret() == "muhammadf@isha11",
                "passphrase should still be readable through expose_secret",
            )?;
            Ok(())
        })();

        clear_vars(&ADMIN_VARS);
        result
    }

    #[test]
    fn invalid_backend_env_value_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_admin_vars();
        env::set_var("LAPAK_STORE_BACKEND", "postgres");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected backend parse failure".to_string()),
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("unsupported store backend")
            );
            ensure(has_message, "error should mention the unsupported backend")
        })();

        clear_vars(&ADMIN_VARS);
        clear_vars(&["LAPAK_STORE_BACKEND"]);
        result
    }
}

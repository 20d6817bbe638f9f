use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use toml::Value;

use lapak_core::config::{AppConfig, LoadOptions, StoreBackend};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file_path = detect_config_path();
    let file_doc = load_config_file_doc(file_path.as_deref());

    let backend = match config.store.backend {
        StoreBackend::Json => "json",
        StoreBackend::Sqlite => "sqlite",
    };

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];

    let mut push = |key: &str, value: &str, env_key: &str| {
        let source = field_source(key, env_key, file_doc.as_ref(), file_path.as_deref());
        lines.push(format!("{key} = {value}  [{source}]"));
    };

    push("store.backend", backend, "LAPAK_STORE_BACKEND");
    push(
        "store.json_path",
        &config.store.json_path.display().to_string(),
        "LAPAK_STORE_JSON_PATH",
    );
    push("database.url", &config.database.url, "LAPAK_DATABASE_URL");
    push(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        "LAPAK_DATABASE_MAX_CONNECTIONS",
    );
    push(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        "LAPAK_DATABASE_TIMEOUT_SECS",
    );
    push("admin.full_name", &config.admin.full_name, "LAPAK_ADMIN_FULL_NAME");
    push("admin.email", &config.admin.email, "LAPAK_ADMIN_EMAIL");
    push(
        "admin.passphrase",
        &redact(config.admin.passphrase.expose_secret()),
        "LAPAK_ADMIN_PASSPHRASE",
    );
    push("llm.provider", &format!("{:?}", config.llm.provider), "LAPAK_LLM_PROVIDER");
    push("llm.model", &config.llm.model, "LAPAK_LLM_MODEL");
    push(
        "llm.base_url",
        config.llm.base_url.as_deref().unwrap_or("<unset>"),
        "LAPAK_LLM_BASE_URL",
    );
    push(
        "llm.api_key",
        &config
            .llm
            .api_key
            .as_ref()
            .map(|key| redact(key.expose_secret()))
            .unwrap_or_else(|| "<unset>".to_string()),
        "LAPAK_LLM_API_KEY",
    );
    push("logging.level", &config.logging.level, "LAPAK_LOGGING_LEVEL");
    push("logging.format", &format!("{:?}", config.logging.format), "LAPAK_LOGGING_FORMAT");

    lines.join("\n")
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        "<unset>".to_string()
    } else {
        format!("<redacted:{} chars>", secret.chars().count())
    }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("lapak.toml"), PathBuf::from("config/lapak.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key: &str,
    env_key: &str,
    file_doc: Option<&Value>,
    file_path: Option<&Path>,
) -> String {
    if env::var(env_key).map(|value| !value.trim().is_empty()).unwrap_or(false) {
        return format!("env:{env_key}");
    }

    if let (Some(doc), Some(path)) = (file_doc, file_path) {
        let mut cursor = Some(doc);
        for part in key.split('.') {
            cursor = cursor.and_then(|value| value.get(part));
        }
        if cursor.is_some() {
            return format!("file:{}", path.display());
        }
    }

    "default".to_string()
}

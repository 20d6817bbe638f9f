use serde::Serialize;

use lapak_core::auth::AuthorizationGate;
use lapak_core::config::{AppConfig, LoadOptions, StoreBackend};
use lapak_core::CredentialAttempt;
use lapak_store::{connect_with_settings, JsonFileStore, ProductStore};

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 6 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_store_readiness(&config));
            checks.push(check_admin_gate(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "store_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "admin_gate",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_store_readiness(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "store_readiness",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        match config.store.backend {
            StoreBackend::Json => {
                let store = JsonFileStore::new(config.store.json_path.clone());
                let categories = store
                    .categories()
                    .await
                    .map_err(|error| format!("failed to read json store: {error}"))?;
                Ok::<String, String>(format!(
                    "json store `{}` readable ({} categories)",
                    config.store.json_path.display(),
                    categories.len()
                ))
            }
            StoreBackend::Sqlite => {
                let pool = connect_with_settings(
                    &config.database.url,
                    config.database.max_connections,
                    config.database.timeout_secs,
                )
                .await
                .map_err(|error| format!("failed to connect to database: {error}"))?;
                pool.close().await;
                Ok(format!("connected using `{}`", config.database.url))
            }
        }
    });

    match result {
        Ok(details) => DoctorCheck { name: "store_readiness", status: CheckStatus::Pass, details },
        Err(details) => DoctorCheck { name: "store_readiness", status: CheckStatus::Fail, details },
    }
}

/// The gate must allow its own configured identity and deny an empty attempt.
fn check_admin_gate(config: &AppConfig) -> DoctorCheck {
    use secrecy::ExposeSecret;

    let identity = config.admin.identity();
    let gate = AuthorizationGate::new(config.admin.identity());

    let self_attempt = CredentialAttempt {
        full_name: Some(identity.full_name),
        email: Some(identity.email),
        passphrase: Some(identity.passphrase.expose_secret().to_string()),
    };

    let self_ok = gate.evaluate(&self_attempt).is_allow();
    let empty_denied = !gate.evaluate(&CredentialAttempt::default()).is_allow();

    if self_ok && empty_denied {
        DoctorCheck {
            name: "admin_gate",
            status: CheckStatus::Pass,
            details: "gate accepts the configured identity and denies empty attempts".to_string(),
        }
    } else {
        DoctorCheck {
            name: "admin_gate",
            status: CheckStatus::Fail,
            details: "gate self-check failed for the configured identity".to_string(),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

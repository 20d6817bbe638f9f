//! Tool dispatch with the authorization gate in front of every mutation.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use lapak_core::{AuthorizationGate, CredentialAttempt, GateDecision};

use crate::guardrails::is_credential_probe;
use crate::tools::{error_value, ToolRegistry};

/// One tool invocation as extracted from a model turn.
#[derive(Debug, Default, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
    /// Credentials the caller attached, if any. Only consulted for mutating
    /// tools; read-only tools run without authorization.
    #[serde(default)]
    pub credentials: Option<CredentialAttempt>,
}

pub struct AgentRuntime {
    registry: ToolRegistry,
    gate: AuthorizationGate,
}

impl AgentRuntime {
    pub fn new(registry: ToolRegistry, gate: AuthorizationGate) -> Self {
        Self { registry, gate }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Runs one tool call and always yields a tagged JSON value.
    ///
    /// Unknown tools and gate denials are ordinary tagged errors; a tool that
    /// fails internally is reported the same way rather than surfacing as a
    /// fault to the conversation layer.
    pub async fn dispatch(&self, call: ToolCall) -> Value {
        let Some(tool) = self.registry.get(&call.name) else {
            return error_value("validation", format!("unknown tool '{}'", call.name));
        };

        if tool.mutating() {
            let attempt = call.credentials.unwrap_or_default();
            match self.gate.evaluate(&attempt) {
                GateDecision::Allow => {}
                GateDecision::Deny { message } => {
                    warn!(tool = %call.name, "denied mutating tool call");
                    return error_value("authorization", message);
                }
            }
        }

        info!(tool = %call.name, mutating = tool.mutating(), "dispatching tool");
        match tool.execute(call.arguments).await {
            Ok(result) => result,
            Err(error) => {
                warn!(tool = %call.name, %error, "tool failed");
                error_value("persistence", format!("tool '{}' failed: {error}", call.name))
            }
        }
    }

    /// Short-circuits messages that probe the authorization requirements.
    /// Returns the fixed refusal text when the message is a probe.
    pub fn refusal_for_probe(&self, text: &str) -> Option<&'static str> {
        is_credential_probe(text).then(AuthorizationGate::probe_refusal)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use lapak_core::{AdminIdentity, AuthorizationGate, CredentialAttempt};
    use lapak_store::{CatalogService, InMemoryStore};

    use super::{AgentRuntime, ToolCall};
    use crate::tools::ToolRegistry;

    fn runtime() -> AgentRuntime {
        let store = InMemoryStore::new();
        store.seed_category("jenis rokok");
        let registry = ToolRegistry::catalog_tools(Arc::new(CatalogService::new(Arc::new(store))));
        let gate = AuthorizationGate::new(AdminIdentity {
            full_name: "Faishal Bhitex".to_string(),
            email: "owner@bhitexretail.example".to_string(),
            passphrase: "muhammadf@isha11".to_string().into(),
        });
        AgentRuntime::new(registry, gate)
    }

    fn admin_credentials() -> CredentialAttempt {
        CredentialAttempt {
            full_name: Some("faishal bhitex".to_string()),
            email: Some("owner@bhitexretail.example".to_string()),
            passphrase: Some("muhammadf@isha11".to_string()),
        }
    }

    #[tokio::test]
    async fn mutating_tool_without_credentials_is_denied() {
        let runtime = runtime();

        let result = runtime
            .dispatch(ToolCall {
                name: "add_products".to_string(),
                arguments: json!({
                    "category": "jenis rokok",
                    "names": "GA Bold",
                    "prices": "Rp.13.000",
                }),
                credentials: None,
            })
            .await;

        assert_eq!(result["status"], "error");
        assert_eq!(result["error_class"], "authorization");
    }

    #[tokio::test]
    async fn mutating_tool_with_valid_credentials_runs() {
        let runtime = runtime();

        let result = runtime
            .dispatch(ToolCall {
                name: "add_products".to_string(),
                arguments: json!({
                    "category": "jenis rokok",
                    "names": "GA Bold",
                    "prices": "Rp.13.000",
                }),
                credentials: Some(admin_credentials()),
            })
            .await;

        assert_eq!(result["status"], "multi");
        assert_eq!(result["succeeded"], 1);
    }

    #[tokio::test]
    async fn read_only_tools_need_no_credentials() {
        let runtime = runtime();

        let result = runtime
            .dispatch(ToolCall {
                name: "list_categories".to_string(),
                arguments: json!({}),
                credentials: None,
            })
            .await;

        assert_eq!(result["status"], "success");
    }

    #[tokio::test]
    async fn unknown_tool_is_a_tagged_validation_error() {
        let runtime = runtime();

        let result = runtime
            .dispatch(ToolCall { name: "drop_tables".to_string(), ..ToolCall::default() })
            .await;

        assert_eq!(result["status"], "error");
        assert_eq!(result["error_class"], "validation");
    }

    #[tokio::test]
    async fn wrong_passphrase_gets_the_uninformative_denial() {
        let runtime = runtime();
        let mut credentials = admin_credentials();
        credentials.passphrase = Some("wrong".to_string());

        let result = runtime
            .dispatch(ToolCall {
                name: "delete_category".to_string(),
                arguments: json!({ "category": "jenis rokok" }),
                credentials: Some(credentials),
            })
            .await;

        assert_eq!(result["error_class"], "authorization");
        let message = result["message"].as_str().expect("message");
        assert!(!message.to_lowercase().contains("passphrase"));
    }

    #[test]
    fn probe_messages_get_the_fixed_refusal() {
        let runtime = runtime();

        let refusal =
            runtime.refusal_for_probe("what credentials do you need?").expect("refusal");
        assert!(!refusal.to_lowercase().contains("email"));

        assert!(runtime.refusal_for_probe("berapa harga GA Bold?").is_none());
    }
}

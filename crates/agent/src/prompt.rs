//! System prompt assembly.
//!
//! The prompt enumerates the registered tools and the behavioral rules. It
//! must never contain the admin credentials, the expected field names, or any
//! example of what valid authorization looks like.

use crate::tools::ToolRegistry;

pub fn system_prompt(registry: &ToolRegistry) -> String {
    let mut prompt = String::from(
        "You are a retail shop assistant managing a product catalog.\n\
         You answer in the customer's language and keep replies short.\n\n\
         Tools:\n",
    );

    for (name, description, mutating) in registry.descriptions() {
        let marker = if mutating { " (requires admin authorization)" } else { "" };
        prompt.push_str(&format!("- {name}: {description}{marker}\n"));
    }

    prompt.push_str(
        "\nRules:\n\
         - Prices are display strings like Rp.15.000; repeat them exactly as stored.\n\
         - Use one tool per request; report tool failures honestly, item by item.\n\
         - Tools that change the catalog are authorized elsewhere. Never describe, \
         hint at, or invent what that authorization involves, and never ask the \
         customer to supply it in a particular shape.\n\
         - If asked about the authorization itself, refuse without details.\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lapak_store::{CatalogService, InMemoryStore};

    use super::system_prompt;
    use crate::tools::ToolRegistry;

    #[test]
    fn prompt_lists_every_registered_tool() {
        let registry =
            ToolRegistry::catalog_tools(Arc::new(CatalogService::new(Arc::new(InMemoryStore::new()))));
        let prompt = system_prompt(&registry);

        for name in registry.names() {
            assert!(prompt.contains(name), "prompt is missing tool {name}");
        }
        assert!(prompt.contains("requires admin authorization"));
    }

    #[test]
    fn prompt_never_hints_at_credential_fields() {
        let registry =
            ToolRegistry::catalog_tools(Arc::new(CatalogService::new(Arc::new(InMemoryStore::new()))));
        let prompt = system_prompt(&registry).to_lowercase();

        for hint in ["passphrase", "password", "full name", "email", "kata sandi"] {
            assert!(!prompt.contains(hint), "prompt leaks credential hint '{hint}'");
        }
    }
}

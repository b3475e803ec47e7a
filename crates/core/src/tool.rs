//! Tool descriptors — declarative augmentations selected per request.
//!
//! A tool here is not a callable function: it is a static descriptor with a
//! prompt template that the retrieval pipeline fills in (`{context}` with
//! retrieved chunks, `{input}` with the user question). Registered once at
//! process start, read-only thereafter.

use serde::{Deserialize, Serialize};

/// A static tool descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique name, matched against the caller's `tools` selection.
    pub name: String,

    /// What the tool does (shown in tool listings).
    pub description: String,

    /// Answer template with `{context}` and `{input}` placeholders.
    pub prompt_template: String,
}

/// The registry of available tools. Populated at startup, never mutated.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// The builtin registry: currently the single `search` tool.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ToolSpec {
            name: "search".into(),
            description: "A useful tool for when you need to answer questions about current \
                          events. You should ask targeted questions."
                .into(),
            prompt_template: "\
Répondre à l'utilisateur en utilisant le contexte fourni si nécessaire.
Si le contexte ne correspond pas à la question, ignore le contexte.
Terminer la réponse par une liste des sources utilisées.

Context: {context}
Question: {input}

Réponse:
"
            .into(),
        });
        registry
    }

    /// Register a tool at startup.
    pub fn register(&mut self, tool: ToolSpec) {
        self.tools.push(tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Find the first registered tool matching any of the requested names.
    pub fn select(&self, requested: &[String]) -> Option<&ToolSpec> {
        self.tools
            .iter()
            .find(|t| requested.iter().any(|name| *name == t.name))
    }

    /// All registered tools (for `listTools`).
    pub fn all(&self) -> &[ToolSpec] {
        &self.tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_search() {
        let registry = ToolRegistry::builtin();
        let tool = registry.get("search").unwrap();
        assert!(tool.prompt_template.contains("{context}"));
        assert!(tool.prompt_template.contains("{input}"));
    }

    #[test]
    fn get_unknown_is_none() {
        let registry = ToolRegistry::builtin();
        assert!(registry.get("calculator").is_none());
    }

    #[test]
    fn select_matches_any_requested() {
        let registry = ToolRegistry::builtin();
        let requested = vec!["weather".to_string(), "search".to_string()];
        assert_eq!(registry.select(&requested).unwrap().name, "search");
        assert!(registry.select(&["weather".to_string()]).is_none());
        assert!(registry.select(&[]).is_none());
    }
}

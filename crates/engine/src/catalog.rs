//! Static descriptor catalogs: models, templates, and prompt presets.
//!
//! Model and template descriptors are arbitrary JSON documents dropped as
//! files into the app-data `models/` and `templates/` directories. They are
//! loaded once at startup and served read-only. Prompt presets carry one
//! builtin (`mistral`) plus anything the user adds programmatically.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// A named prompt preset: a system prompt and a user-message template with
/// `{{context}}` / `{{question}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPreset {
    pub name: String,
    pub system: String,
    pub user: String,
}

#[derive(Debug)]
pub struct Catalog {
    models: Vec<serde_json::Value>,
    templates: Vec<serde_json::Value>,
    prompts: Vec<PromptPreset>,
}

impl Default for Catalog {
    /// Empty descriptor lists; the builtin prompt preset is always present.
    fn default() -> Self {
        Self {
            models: Vec::new(),
            templates: Vec::new(),
            prompts: vec![builtin_mistral()],
        }
    }
}

impl Catalog {
    /// Load descriptors from the app-data tree. Missing directories are
    /// fine; unreadable files are skipped with a warning.
    pub fn load(models_dir: &Path, templates_dir: &Path) -> Self {
        let models = load_json_dir(models_dir);
        let templates = load_json_dir(templates_dir);
        debug!(
            models = models.len(),
            templates = templates.len(),
            "Catalogs loaded"
        );
        Self {
            models,
            templates,
            prompts: vec![builtin_mistral()],
        }
    }

    pub fn models(&self) -> &[serde_json::Value] {
        &self.models
    }

    pub fn templates(&self) -> &[serde_json::Value] {
        &self.templates
    }

    pub fn prompts(&self) -> &[PromptPreset] {
        &self.prompts
    }
}

fn builtin_mistral() -> PromptPreset {
    PromptPreset {
        name: "mistral".into(),
        system: "You are a helpful assistant. You are given the following extracted parts \
                 of a long document and a question. Provide a conversational answer based \
                 on the context provided."
            .into(),
        user: "Context:\n{{context}}\n\nQuestion:\n{{question}}\n\nAnswer:".into(),
    }
}

fn load_json_dir(dir: &Path) -> Vec<serde_json::Value> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut values = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => values.push(value),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping invalid descriptor"),
            },
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable descriptor"),
        }
    }
    values
}

pub mod chat;
pub mod init;
pub mod models;
pub mod serve;

use causerie_config::AppConfig;
use causerie_core::ToolRegistry;
use causerie_engine::{Catalog, EngineSettings, GenerationEngine};
use causerie_providers::OllamaProvider;
use causerie_retrieval::{HttpFetcher, PipelineConfig};
use causerie_store::FileStore;
use std::sync::Arc;

/// Wire a full engine from the loaded configuration.
pub(crate) fn build_engine(
    config: &AppConfig,
) -> Result<Arc<GenerationEngine>, Box<dyn std::error::Error>> {
    let root = AppConfig::app_data_root();
    AppConfig::ensure_dirs(&root)?;

    let store = Arc::new(FileStore::new(AppConfig::conversations_dir(&root))?);
    let provider = Arc::new(OllamaProvider::new(&config.ollama.base_url)?);
    let fetcher = Arc::new(HttpFetcher::new()?);
    let catalog = Catalog::load(
        &AppConfig::models_dir(&root),
        &AppConfig::templates_dir(&root),
    );

    let pipeline_config = PipelineConfig {
        search_url: config.search_url.clone(),
        chunk_size: config.chunk_size,
        chunk_overlap: config.chunk_overlap,
        top_k: config.top_k,
        embedding_model: config.embedding_model.clone(),
    };

    let settings = EngineSettings {
        default_model: config.default_model.clone(),
        token_budget: config.token_budget,
        auto_create_on_message: config.auto_create_on_message,
        system_prompt: config.system_prompt.clone(),
    };

    Ok(Arc::new(GenerationEngine::new(
        store,
        provider,
        fetcher,
        pipeline_config,
        ToolRegistry::builtin(),
        catalog,
        settings,
    )))
}

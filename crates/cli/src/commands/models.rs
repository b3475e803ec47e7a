//! `causerie models` — List models installed on the Ollama runtime.

use causerie_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let engine = super::build_engine(&config)?;

    let models = engine.list_models().await?;
    if models.is_empty() {
        println!("No models installed. Pull one with: ollama pull gemma2:2b");
        return Ok(());
    }

    for model in models {
        if model == config.default_model {
            println!("{model} (default)");
        } else {
            println!("{model}");
        }
    }

    Ok(())
}

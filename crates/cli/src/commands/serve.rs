//! `causerie serve` — Start the WebSocket gateway.

use causerie_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Causerie Gateway");
    println!(
        "   Listening: ws://{}:{}/ws",
        config.gateway.host, config.gateway.port
    );
    println!("   Ollama:    {}", config.ollama.base_url);

    let engine = super::build_engine(&config)?;
    causerie_gateway::start(engine, &config.gateway.host, config.gateway.port).await?;

    Ok(())
}

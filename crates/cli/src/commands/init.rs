//! `causerie init` — First-time setup.

use causerie_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let root = AppConfig::app_data_root();
    let config_path = root.join("config.toml");

    println!("Causerie — First-Time Setup");
    println!("===========================\n");

    AppConfig::ensure_dirs(&root)?;
    println!("✅ App-data tree ready: {}", root.display());

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Make sure Ollama is running (ollama serve)");
        println!("   2. Pull a model: ollama pull gemma2:2b");
        println!("   3. Chat: causerie chat --id hello \"Bonjour !\"");
    }

    Ok(())
}

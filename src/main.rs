use std::sync::Arc;

use anyhow::Context;

use clinic_finder::catalog::{self, CatalogHandle};
use clinic_finder::channels::CliChannel;
use clinic_finder::config::BotConfig;
use clinic_finder::dialog::ClinicBot;
use clinic_finder::host::Host;
use clinic_finder::intent::KeywordRecognizer;
use clinic_finder::store::MemoryStateStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = BotConfig::from_env();
    config.validate()?;

    let catalog = match &config.catalog_path {
        Some(path) => catalog::load_from_path(path)
            .await
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => catalog::builtin(),
    };

    eprintln!("🏥 Clinic Finder v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Catalog: {} clinics ({})",
        catalog.len(),
        config
            .catalog_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );
    eprintln!("   Top-K: {}, unit: {}", config.top_k, config.unit);
    eprintln!("   Type \"Find me a clinic\" to start. /reload re-reads the catalog, /quit exits.\n");

    let recognizer = KeywordRecognizer::default_rules()?;
    let catalog_path = config.catalog_path.clone();
    let bot = ClinicBot::new(
        config,
        CatalogHandle::new(catalog),
        Arc::new(recognizer),
        Arc::new(MemoryStateStore::new()),
    );

    let host = Host::new(bot, catalog_path);
    host.run(&CliChannel::new()).await?;

    Ok(())
}

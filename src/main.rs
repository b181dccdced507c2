use tracing::info;

use trackvault::storage::LocalBlobStore;
use trackvault::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = trackvault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        trackvault::logging::init_console_only(&config.logging.level);
    }

    info!("TRACKVAULT - Media library engine");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database {}: {e}", config.database.path);
            std::process::exit(1);
        }
    };
    match db.schema_version().await {
        Ok(version) => info!(
            "Database ready at {} (schema v{version})",
            config.database.path
        ),
        Err(e) => info!("Database ready at {} ({e})", config.database.path),
    }

    match LocalBlobStore::new(&config.storage.path, &config.storage.public_base_url) {
        Ok(store) => info!(
            "Blob storage at {} served from {}",
            store.root().display(),
            config.storage.public_base_url
        ),
        Err(e) => {
            eprintln!("Failed to open blob storage {}: {e}", config.storage.path);
            std::process::exit(1);
        }
    }

    info!(
        "Accepting uploads up to {} MB per file, {} files per drop",
        config.library.max_upload_size_mb,
        trackvault::MAX_BATCH_FILES
    );
}

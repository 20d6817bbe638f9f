use lapak_core::config::{AppConfig, LoadOptions, StoreBackend};
use lapak_store::fixtures::SeedDataset;
use lapak_store::{connect_with_settings, migrations, JsonFileStore, SqliteStore};

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let dataset = SeedDataset::sample();
    let result = runtime.block_on(async {
        match config.store.backend {
            StoreBackend::Json => {
                let store = JsonFileStore::new(config.store.json_path.clone());
                dataset.apply(&store).await.map_err(|error| ("seed", error.to_string(), 5u8))
            }
            StoreBackend::Sqlite => {
                let pool = connect_with_settings(
                    &config.database.url,
                    config.database.max_connections,
                    config.database.timeout_secs,
                )
                .await
                .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
                migrations::run_pending(&pool)
                    .await
                    .map_err(|error| ("migration", error.to_string(), 5u8))?;

                let store = SqliteStore::new(pool.clone());
                let summary = dataset
                    .apply(&store)
                    .await
                    .map_err(|error| ("seed", error.to_string(), 5u8))?;
                pool.close().await;
                Ok(summary)
            }
        }
    });

    let backend = match config.store.backend {
        StoreBackend::Json => "json",
        StoreBackend::Sqlite => "sqlite",
    };

    match result {
        Ok(summary) => CommandResult::success(
            "seed",
            format!(
                "seeded {} products across {} categories into the {backend} backend",
                summary.products, summary.categories
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

use anyhow::Context;
use libris_app::modules;
use libris_db::Database;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Libris settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "libris bootstrap starting"
    );

    let db = Database::connect(&settings.database.url, settings.database.max_connections)
        .await
        .context("failed to open database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db, &settings);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    db.apply_schema(&registry.collect_schema()).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("libris bootstrap complete");

    let served = libris_http::start_server(&registry, &settings).await;

    // Tear down even when the server failed so the pool is released.
    let stopped = registry.stop_modules().await;
    db.close().await;

    served?;
    stopped
}

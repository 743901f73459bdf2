use tracing::info;
use travel_journal::config::AppConfig;
use travel_journal::db::{init_pool, run_migrations};
use travel_journal::logging::init_logging;
use travel_journal::seed::seed_demo_data;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging("info,travel_journal=debug");

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    let report = seed_demo_data(&db).await?;
    info!(
        users = report.users,
        trips = report.trips,
        "demo data ready (password: {})",
        travel_journal::seed::DEMO_PASSWORD
    );
    Ok(())
}

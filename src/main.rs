use tokio::net::TcpListener;
use tracing::info;
use travel_journal::config::AppConfig;
use travel_journal::db::{init_pool, run_migrations};
use travel_journal::error::AppError;
use travel_journal::logging::init_logging;
use travel_journal::routes::create_router;
use travel_journal::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging("info,travel_journal=debug,tower_http=info");

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    let state = AppState::new(config.clone(), db);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

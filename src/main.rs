use clubstats::{
    build_router, AppConfig, AppState, InMemoryClubRepository, PostgresClubRepository,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubstats=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting club statistics server");

    let config = AppConfig::from_env();

    // One store backs both the CRUD and the statistics views
    let state = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!().run(&pool).await?;
            info!("Connected to PostgreSQL, migrations applied");

            let store = Arc::new(PostgresClubRepository::new(pool));
            AppState::new(store.clone(), store, config.clone())
        }
        None => {
            warn!("DATABASE_URL not set, data is kept in memory only");
            let store = Arc::new(InMemoryClubRepository::new());
            AppState::new(store.clone(), store, config.clone())
        }
    };

    info!(
        recent_training_limit = config.recent_training_limit,
        "Recommendation window configured"
    );

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(address = %config.bind_addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

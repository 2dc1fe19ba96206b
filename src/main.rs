use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tuneful::{app_state::AppState, config::Config, routes, startup};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tuneful=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Running in {:?} mode", config.mode);

    let db_pool = startup::prepare(&config)?;

    let addr = format!("{}:{}", config.host, config.port);
    let app = routes::build_router(AppState::new(db_pool, config));

    tracing::info!("Starting API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

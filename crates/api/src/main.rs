use shiftboard_api::{build_router, state::AppState};
use shiftboard_config::Settings;
use shiftboard_db::connect;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "shiftboard_api=debug,shiftboard_services=debug,shiftboard_db=debug,tower_http=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!("Starting Shiftboard API on {}:{}", settings.app.host, settings.app.port);

    let store = connect(&settings).await?;
    info!(backend = store.backend_name(), "Blob store ready");

    let app_state = AppState::new(store, settings.clone());
    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

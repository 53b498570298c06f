use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waste_classifier::config::Config;
use waste_classifier::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting waste classification app");

    let config = Config::from_env()?;
    tracing::info!(
        model = %config.model_path.display(),
        labels = %config.labels_path.display(),
        icons = %config.icon_dir.display(),
        input_size = config.input_size,
        model_cache = config.model_cache,
        "Loaded configuration"
    );

    if !config.model_path.exists() {
        tracing::warn!(
            "Model file {} not found; classification requests will fail until it exists",
            config.model_path.display()
        );
    }

    let state = AppState::new(config.classifier()?);
    let app = router(state, &config.icon_dir, config.max_upload_bytes);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use dotenv::dotenv;
use emotion_detector::{api, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let app = api::router(&config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        static_dir = %config.static_dir.display(),
        "emotion detector listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

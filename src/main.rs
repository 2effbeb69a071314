use std::sync::Arc;

use cinelog::{AppState, auth, config::Config, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,cinelog=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    let db = db::connect_and_migrate(&config.database_url).await?;

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        auth::ensure_operator(&db, username, password).await?;
    }

    let state = Arc::new(AppState { config: config.clone(), db });
    let app = cinelog::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

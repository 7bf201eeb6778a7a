//! Point d'entrée principal de l'application.
//! Charge la configuration et la base, puis démarre le serveur web avec Axum.

use anyhow::{Context, Result};
use dotenv::dotenv;
use log::{error, info};
use std::net::SocketAddr;

use yatube::backend::{router::get_router, state::AppState};
use yatube::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Charger les variables d'environnement
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config)?;
    let app = get_router(state.clone());

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to open web server listener")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to bind Axum to listener")?;

    // Sauvegarde finale avant de quitter
    if let Err(e) = state.db.read().await.save() {
        error!("Erreur lors de la sauvegarde de la base: {e:#}");
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
}

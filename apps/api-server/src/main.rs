//! # Formguard API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    telemetry::init_telemetry(&TelemetryConfig::from_env());

    // Load configuration
    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    tracing::info!(
        "Starting Formguard API Server on {}:{}",
        config.host,
        config.port
    );

    // Build application state
    let state = AppState::new(&config);

    // Background sweep of idle in-memory windows
    #[cfg(feature = "scheduler")]
    let _scheduler = {
        let scheduler = background::scheduler::Scheduler::new()
            .await
            .map_err(std::io::Error::other)?;
        background::register_sweeper(&scheduler, state.gateway.clone(), config.sweep_interval)
            .await
            .map_err(std::io::Error::other)?;
        scheduler.start().await.map_err(std::io::Error::other)?;
        scheduler
    };

    #[cfg(not(feature = "scheduler"))]
    background::spawn_sweeper(state.gateway.clone(), config.sweep_interval);

    // Start HTTP server
    let gateway = state.gateway.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| handlers::configure_routes(cfg, &gateway))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

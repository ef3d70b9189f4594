//! # File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: configuración desde CLI/entorno, logging y servidor.

use anyhow::Context;
use file_server::config::Config;
use file_server::server::Server;

fn main() -> anyhow::Result<()> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .init();

    log::info!("=================================");
    log::info!("  File Server HTTP/1.0");
    log::info!("=================================");

    let config = Config::new();
    config.print_summary();

    // Sin pool o sin puerto no hay forma de avanzar: salir con error
    let server = Server::bind(config).context("No se pudo iniciar el servidor")?;

    server.run();
    Ok(())
}

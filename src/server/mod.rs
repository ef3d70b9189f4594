//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! - `tcp`: acceptor que encola cada conexión en el pool de workers
//! - `handler`: atiende una conexión (parse -> resolve -> respuesta)

pub mod handler;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use handler::handle_connection;
pub use tcp::{Server, ServerError, ServerReport, ShutdownHandle};

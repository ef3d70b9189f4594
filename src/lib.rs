//! # File Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 concurrente de archivos estáticos: un acceptor encola
//! conexiones en una cola acotada y un pool fijo de workers las atiende.
//!
//! ## Arquitectura
//!
//! - `jobs`: cola FIFO acotada y pool de workers
//! - `http`: parsing de la request line, emisión de respuestas, status y MIME
//! - `resolver`: traducción de paths a archivos, índices y listados
//! - `server`: acceptor TCP y handler de cada conexión
//! - `metrics`: contadores de requests y latencias
//! - `config`: configuración por CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(config).expect("Error al iniciar servidor");
//! server.run();
//! ```

pub mod config;
pub mod http;
pub mod jobs;
pub mod metrics;
pub mod resolver;
pub mod server;

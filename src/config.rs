//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de archivos con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --files ./www --port 8000 --num-threads 8
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8000 FILES_DIR=/srv/www NUM_THREADS=8 ./file_server
//! ```

use crate::http::request::DEFAULT_MAX_REQUEST_SIZE;
use clap::Parser;
use log::info;
use std::time::Duration;

/// Configuración del servidor HTTP/1.0
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor HTTP/1.0 concurrente de archivos estáticos")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8000", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Document root: directorio desde el que se sirven los archivos
    #[arg(long = "files", default_value = "./www", env = "FILES_DIR")]
    pub files_dir: String,

    // === Pool ===

    /// Número de workers del pool
    #[arg(long = "num-threads", default_value = "4", env = "NUM_THREADS")]
    pub num_threads: usize,

    /// Conexiones que pueden esperar en cola antes de frenar al acceptor
    #[arg(long = "queue-capacity", default_value = "256", env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // === Requests ===

    /// Máximo de bytes que se leen para encontrar la request line
    #[arg(long = "max-request-size", default_value = "8192", env = "MAX_REQUEST_SIZE")]
    pub max_request_size: usize,

    /// Timeout de lectura/escritura de cada conexión en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,
}

/// Límites por conexión que recibe el handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_request_size: usize,
    pub io_timeout: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            io_timeout: Some(Duration::from_millis(5_000)),
        }
    }
}

impl Config {
    /// Crea la configuración parseando argumentos CLI y entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_request_size: self.max_request_size,
            io_timeout: match self.read_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.num_threads == 0 {
            return Err("Number of threads must be >= 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }
        // "GET / X\n" es la request line más corta útil
        if self.max_request_size < 16 {
            return Err("Max request size must be >= 16 bytes".to_string());
        }
        if self.files_dir.trim().is_empty() {
            return Err("Files directory must not be empty".to_string());
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        info!("Configuración:");
        info!("   Address:        {}", self.address());
        info!("   Document root:  {}", self.files_dir);
        info!("   Workers:        {}", self.num_threads);
        info!("   Queue capacity: {}", self.queue_capacity);
        info!("   Max request:    {} bytes", self.max_request_size);
        match self.read_timeout_ms {
            0 => info!("   I/O timeout:    disabled"),
            ms => info!("   I/O timeout:    {} ms", ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            files_dir: "./www".to_string(),
            num_threads: 4,
            queue_capacity: 256,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            read_timeout_ms: 5_000,
        }
    }
}

//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! El acceptor: escucha en un puerto y encola cada conexión aceptada en el
//! pool de workers. Con la cola llena el acceptor se bloquea (backpressure)
//! en vez de seguir acumulando conexiones.

use super::handler::handle_connection;
use crate::config::{Config, Limits};
use crate::jobs::{PoolError, PoolStats, ThreadPool};
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::resolver::Resolver;
use log::{debug, info, warn};
use serde::Serialize;
use std::io::{self, Read};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Máximo de bytes sobrantes que se descartan antes de cerrar
const LINGER_DRAIN_LIMIT: usize = 64 * 1024;

/// Espera máxima por cada lectura del drenado
const LINGER_READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Tiempo total máximo que un worker dedica a drenar una conexión
const LINGER_DEADLINE: Duration = Duration::from_secs(1);

/// Errores al levantar el servidor
#[derive(Debug)]
pub enum ServerError {
    /// La configuración no pasó la validación
    InvalidConfig(String),

    /// El document root no existe o no es un directorio
    DocumentRoot(io::Error),

    /// No se pudo hacer bind del puerto
    Bind(io::Error),

    /// No se pudo crear el pool de workers
    Pool(PoolError),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            ServerError::DocumentRoot(e) => write!(f, "Invalid document root: {}", e),
            ServerError::Bind(e) => write!(f, "Failed to bind listener: {}", e),
            ServerError::Pool(e) => write!(f, "Failed to start thread pool: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::InvalidConfig(_) => None,
            ServerError::DocumentRoot(e) | ServerError::Bind(e) => Some(e),
            ServerError::Pool(e) => Some(e),
        }
    }
}

/// Resumen que retorna `run()` al terminar
#[derive(Debug, Clone, Serialize)]
pub struct ServerReport {
    pub pool: PoolStats,
    pub metrics: MetricsSnapshot,
}

/// Permite detener un servidor desde otro thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    stop: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Marca el servidor para detenerse y despierta al acceptor con una
    /// conexión local.
    ///
    /// Lo que el acceptor recibe después de la marca se cierra sin respuesta:
    /// la propia conexión de aviso y cualquier cliente que llegue en ese
    /// mismo instante. Lo ya encolado se atiende completo.
    pub fn shutdown(&self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = TcpStream::connect_timeout(&self.wake_addr, Duration::from_secs(1)) {
            warn!("No se pudo despertar al acceptor: {}", e);
        }
    }
}

/// Servidor HTTP/1.0 de archivos estáticos
pub struct Server {
    config: Config,
    listener: TcpListener,
    pool: ThreadPool<TcpStream>,
    metrics: Arc<MetricsCollector>,
    stop: Arc<AtomicBool>,
}

impl Server {
    /// Valida la configuración, abre el document root, hace bind y arranca
    /// el pool de workers.
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::InvalidConfig)?;

        let resolver = Resolver::new(&config.files_dir).map_err(ServerError::DocumentRoot)?;
        info!("Document root: {}", resolver.root().display());

        let listener = TcpListener::bind(config.address()).map_err(ServerError::Bind)?;

        let metrics = Arc::new(MetricsCollector::new());
        let limits = config.limits();
        let pool = {
            let resolver = Arc::new(resolver);
            let metrics = Arc::clone(&metrics);
            ThreadPool::new(
                config.num_threads,
                config.queue_capacity,
                move |stream: TcpStream| serve_stream(stream, &resolver, &metrics, &limits),
            )
            .map_err(ServerError::Pool)?
        };

        Ok(Self {
            config,
            listener,
            pool,
            metrics,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> io::Result<ShutdownHandle> {
        let mut wake_addr = self.listener.local_addr()?;
        // No se puede conectar a 0.0.0.0 / ::
        if wake_addr.ip().is_unspecified() {
            let loopback = match wake_addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            wake_addr.set_ip(loopback);
        }
        Ok(ShutdownHandle {
            stop: Arc::clone(&self.stop),
            wake_addr,
        })
    }

    /// Acepta conexiones hasta recibir la señal de shutdown. Luego cierra
    /// el pool (las conexiones ya encoladas se atienden) y retorna el
    /// resumen.
    ///
    /// La conexión aceptada después de la señal no se encola ni se cuenta
    /// en `PoolStats`; se cierra al salir del loop.
    pub fn run(self) -> ServerReport {
        info!("Servidor escuchando en {}", self.config.address());

        for stream in self.listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                if let Ok(stream) = stream {
                    debug!("Cerrando conexión recibida durante el shutdown");
                    let _ = stream.shutdown(Shutdown::Both);
                }
                break;
            }

            match stream {
                Ok(stream) => {
                    if let Ok(peer) = stream.peer_addr() {
                        debug!("Nueva conexión desde {}", peer);
                    }
                    if let Err(e) = self.pool.submit(stream) {
                        warn!("Conexión descartada: {}", e);
                    }
                }
                Err(e) => warn!("Error al aceptar conexión: {}", e),
            }
        }

        info!("Apagando servidor...");
        let pool = self.pool.shutdown();
        let metrics = self.metrics.snapshot();
        info!(
            "Pool detenido: {} atendidos, {} con panic",
            pool.completed, pool.panicked
        );

        let report = ServerReport { pool, metrics };
        if let Ok(json) = serde_json::to_string_pretty(&report) {
            info!("Resumen final:\n{}", json);
        }
        report
    }
}

/// Handler del pool: atiende la conexión y la cierra
fn serve_stream(
    mut stream: TcpStream,
    resolver: &Resolver,
    metrics: &MetricsCollector,
    limits: &Limits,
) {
    if let Err(e) = stream
        .set_read_timeout(limits.io_timeout)
        .and_then(|_| stream.set_write_timeout(limits.io_timeout))
    {
        warn!("No se pudo configurar timeouts: {}", e);
    }

    handle_connection(&mut stream, resolver, metrics, limits);
    linger_close(stream);
}

/// Cierra el lado de escritura y descarta lo que el cliente haya mandado
/// después de la request line (headers) antes de soltar el socket.
///
/// El drenado se corta por bytes (`LINGER_DRAIN_LIMIT`) y por tiempo total
/// (`LINGER_DEADLINE`), lo que ocurra primero.
fn linger_close(mut stream: TcpStream) {
    if stream.shutdown(Shutdown::Write).is_err() {
        return;
    }

    let deadline = Instant::now() + LINGER_DEADLINE;
    let mut scratch = [0u8; 4096];
    let mut drained = 0;
    while drained < LINGER_DRAIN_LIMIT {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            debug!("Drenado cortado por tiempo tras {} bytes", drained);
            break;
        }
        if stream
            .set_read_timeout(Some(remaining.min(LINGER_READ_TIMEOUT)))
            .is_err()
        {
            break;
        }
        match stream.read(&mut scratch) {
            Ok(0) | Err(_) => break,
            Ok(n) => drained += n,
        }
    }
}

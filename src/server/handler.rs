//! # Handler de Conexiones
//! src/server/handler.rs
//!
//! Pegamento Parser -> Resolver -> Emitter para una sola conexión. Todo
//! error de un request se traduce a una respuesta HTTP dentro del worker
//! que lo atiende; nada se propaga al pool.

use crate::config::Limits;
use crate::http::request::read_request;
use crate::http::{Request, Response, ResponseWriter, StatusCode};
use crate::metrics::MetricsCollector;
use crate::resolver::{ResolveError, Resolver};
use log::{debug, error, info, warn};
use std::io::{Read, Write};
use std::time::Instant;

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!("file_server/", env!("CARGO_PKG_VERSION"));

/// Métodos que el servidor atiende
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Atiende una conexión completa.
///
/// Retorna el status enviado, o `None` si el peer cerró sin mandar nada.
/// Los fallos de escritura no se reportan: el worker queda libre igual.
pub fn handle_connection<S: Read + Write>(
    stream: &mut S,
    resolver: &Resolver,
    metrics: &MetricsCollector,
    limits: &Limits,
) -> Option<StatusCode> {
    let start = Instant::now();

    let (mut response, request_line) = match read_request(stream, limits.max_request_size) {
        Ok(buffer) if buffer.is_empty() => {
            debug!("Conexión cerrada sin datos");
            return None;
        }
        Ok(buffer) => match Request::parse(&buffer) {
            Ok(request) => {
                let line = format!("{} {}", request.method(), request.path());
                (respond(&request, resolver), line)
            }
            Err(e) => {
                debug!("Parse error: {}", e);
                (
                    Response::error(StatusCode::BadRequest, &e.to_string()),
                    "<malformed>".to_string(),
                )
            }
        },
        Err(e) => {
            warn!("Error leyendo el request: {}", e);
            (
                Response::error(StatusCode::BadRequest, "Could not read request"),
                "<unreadable>".to_string(),
            )
        }
    };

    response.add_header("Server", SERVER_NAME);

    let mut writer = ResponseWriter::new(&mut *stream);
    response.write_to(&mut writer);
    if writer.failed() {
        debug!(
            "Escritura abortada tras {} bytes ({})",
            writer.bytes_written(),
            request_line
        );
    }

    let status = response.status();
    let latency = start.elapsed();
    metrics.record_request(status.as_u16(), latency, response.body().len());
    info!(
        "{} -> {} ({:.2}ms)",
        request_line,
        status,
        latency.as_secs_f64() * 1000.0
    );

    Some(status)
}

/// Construye la respuesta para un request ya parseado
pub fn respond(request: &Request, resolver: &Resolver) -> Response {
    let head_only = match request.method() {
        "GET" => false,
        "HEAD" => true,
        other => {
            return Response::error(
                StatusCode::MethodNotAllowed,
                &format!("Method {} is not supported", other),
            )
            .with_header("Allow", ALLOWED_METHODS);
        }
    };

    let response = match resolver.resolve(request.path()) {
        Ok(resource) => Response::new(StatusCode::Ok)
            .with_header("Content-Type", resource.mime_type())
            .with_body_bytes(resource.into_body()),
        Err(ResolveError::NotFound) => Response::error(
            StatusCode::NotFound,
            &format!("{} was not found on this server", request.target()),
        ),
        Err(ResolveError::Forbidden) => Response::error(
            StatusCode::Forbidden,
            "Requested path is outside the document root",
        ),
        Err(ResolveError::BadPath) => {
            Response::error(StatusCode::BadRequest, "Malformed request path")
        }
        Err(ResolveError::Io(e)) => {
            error!("Error de filesystem para {}: {}", request.path(), e);
            Response::error(StatusCode::InternalServerError, "Could not read resource")
        }
    };

    if head_only {
        response.head_only()
    } else {
        response
    }
}

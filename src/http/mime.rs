//! # Tipos MIME
//! src/http/mime.rs
//!
//! El `Content-Type` se deduce solo por la extensión del archivo. La
//! comparación distingue mayúsculas (`.HTML` no es `text/html`).

/// Tipo por defecto cuando no hay extensión o no se reconoce
pub const DEFAULT_MIME: &str = "text/plain";

/// Retorna el tipo MIME según la extensión del nombre de archivo
///
/// # Ejemplo
/// ```
/// use file_server::http::mime::mime_type;
///
/// assert_eq!(mime_type("index.html"), "text/html");
/// assert_eq!(mime_type("app.js"), "application/javascript");
/// assert_eq!(mime_type("README"), "text/plain");
/// ```
pub fn mime_type(file_name: &str) -> &'static str {
    // Solo el último segmento: un punto en un directorio no cuenta
    let base = file_name.rsplit('/').next().unwrap_or(file_name);

    let extension = match base.rfind('.') {
        Some(pos) => &base[pos..],
        None => return DEFAULT_MIME,
    };

    match extension {
        ".html" | ".htm" => "text/html",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".css" => "text/css",
        ".js" => "application/javascript",
        ".pdf" => "application/pdf",
        _ => DEFAULT_MIME,
    }
}

//! # Módulo HTTP
//!
//! Subconjunto mínimo de HTTP/1.0 (RFC 1945) que necesita un servidor de
//! archivos estáticos:
//!
//! - Parsing de la request line (método y path)
//! - Emisión de respuestas tolerante a escrituras parciales
//! - Tabla de códigos de estado
//! - Tipos MIME por extensión
//!
//! No hay conexiones persistentes, chunked transfer ni negociación de
//! contenido: un request por conexión.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path HTTP/1.0\r\n
//! Header-Name: Header-Value\r\n     (ignorado)
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```

pub mod mime;      // Content-Type por extensión
pub mod request;   // Parsing de la request line
pub mod response;  // Emisión de respuestas
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{ParseError, Request};
pub use response::{Response, ResponseWriter};
pub use status::StatusCode;

//! # Emisión de Respuestas HTTP
//! src/http/response.rs
//!
//! Dos piezas:
//!
//! - [`ResponseWriter`]: escribe status line, headers y body directamente
//!   sobre la conexión, tolerando escrituras parciales.
//! - [`Response`]: builder de una respuesta completa que luego se vuelca
//!   sobre un `ResponseWriter`.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use file_server::http::{Response, ResponseWriter, StatusCode};
//!
//! let mut out = Vec::new();
//! let mut writer = ResponseWriter::new(&mut out);
//!
//! Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello")
//!     .write_to(&mut writer);
//!
//! assert!(out.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

use super::status::{self, StatusCode};
use std::io::{ErrorKind, Write};

/// Escritor de respuestas sobre una conexión.
///
/// Los errores de escritura no se propagan: la escritura se aborta en
/// silencio y el resto de llamadas se vuelven no-ops. `failed()` permite
/// al llamador saber que el payload no llegó completo.
pub struct ResponseWriter<W: Write> {
    inner: W,
    bytes_written: usize,
    failed: bool,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
            failed: false,
        }
    }

    /// Escribe `HTTP/1.0 <code> <reason>\r\n`
    pub fn start_response(&mut self, status_code: u16) {
        let line = format!(
            "HTTP/1.0 {} {}\r\n",
            status_code,
            status::reason_phrase(status_code)
        );
        self.send_data(line.as_bytes());
    }

    /// Escribe `<key>: <value>\r\n`
    pub fn send_header(&mut self, key: &str, value: &str) {
        let line = format!("{}: {}\r\n", key, value);
        self.send_data(line.as_bytes());
    }

    /// Escribe la línea vacía que cierra el bloque de headers
    pub fn end_headers(&mut self) {
        self.send_data(b"\r\n");
    }

    pub fn send_string(&mut self, data: &str) {
        self.send_data(data.as_bytes());
    }

    /// Escribe todos los bytes, reanudando desde el resto no escrito en
    /// cada escritura parcial. Un error (o una escritura de 0 bytes) aborta
    /// el envío sin reportarlo.
    pub fn send_data(&mut self, mut data: &[u8]) {
        if self.failed {
            return;
        }

        while !data.is_empty() {
            match self.inner.write(data) {
                Ok(0) => {
                    self.failed = true;
                    return;
                }
                Ok(n) => {
                    self.bytes_written += n;
                    data = &data[n..];
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => {
                    self.failed = true;
                    return;
                }
            }
        }
    }

    /// Vacía el buffer del escritor subyacente (best effort)
    pub fn flush(&mut self) {
        if !self.failed && self.inner.flush().is_err() {
            self.failed = true;
        }
    }

    /// `true` si alguna escritura se abortó
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Bytes efectivamente entregados al escritor subyacente
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers en orden de inserción; un nombre repetido reemplaza al anterior
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (builder). Si ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el body desde un string y calcula `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el body desde bytes y calcula `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        let length = self.body.len().to_string();
        self.add_header("Content-Length", &length);
        self
    }

    /// Respuesta de error con una página HTML mínima
    ///
    /// ```
    /// use file_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "No such file");
    /// let text = String::from_utf8(response.to_bytes()).unwrap();
    /// assert!(text.starts_with("HTTP/1.0 404 Not Found\r\n"));
    /// assert!(text.contains("No such file"));
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = format!(
            "<html><head><title>{status}</title></head>\
             <body><h1>{status}</h1><p>{}</p></body></html>\n",
            escape_html(message)
        );
        Self::new(status)
            .with_header("Content-Type", "text/html")
            .with_body(&body)
    }

    /// Descarta el body conservando `Content-Length` (respuestas a HEAD)
    pub fn head_only(mut self) -> Self {
        self.body.clear();
        self
    }

    /// Convierte la respuesta a bytes, en el mismo orden en que se emite
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 128);
        let mut writer = ResponseWriter::new(&mut out);
        self.write_to(&mut writer);
        out
    }

    /// Emite status line, headers, línea vacía y body
    pub fn write_to<W: Write>(&self, writer: &mut ResponseWriter<W>) {
        writer.start_response(self.status.as_u16());
        for (name, value) in &self.headers {
            writer.send_header(name, value);
        }
        writer.end_headers();
        writer.send_data(&self.body);
        writer.flush();
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Busca un header por nombre (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Escapa `& < > " '` para incrustar texto en HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

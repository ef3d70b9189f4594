//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Parser de la request line, escrito a mano sobre los bytes crudos que se
//! leen de la conexión.
//!
//! ## Gramática
//!
//! ```text
//! METHOD SP PATH REST \n
//!
//! METHOD = [A-Z]+
//! PATH   = [^ \n]+
//! REST   = [^\n]*        (versión HTTP y basura, se descarta)
//! ```
//!
//! Los headers y el body nunca se interpretan: todo lo que viene después
//! del primer `\n` se ignora.

use std::io::{self, Read};

/// Tamaño máximo por defecto del buffer de lectura
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 8192;

/// Request HTTP parseado: solo método y path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método HTTP tal cual vino (ej: "GET")
    method: String,

    /// Path de la petición sin tocar (ej: "/docs/index.html?x=1")
    path: String,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No se recibió ningún byte
    EmptyRequest,

    /// La request line no empieza con `[A-Z]+`
    MissingMethod,

    /// Falta el espacio después del método
    MissingSpace,

    /// Path de longitud cero (ej: dos espacios seguidos)
    EmptyPath,

    /// El path no es UTF-8 válido
    InvalidPath,

    /// El buffer terminó antes del `\n` de la request line
    UnterminatedRequestLine,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::MissingMethod => write!(f, "Missing HTTP method"),
            ParseError::MissingSpace => write!(f, "Expected a single space after the method"),
            ParseError::EmptyPath => write!(f, "Empty request path"),
            ParseError::InvalidPath => write!(f, "Request path is not valid UTF-8"),
            ParseError::UnterminatedRequestLine => write!(f, "Request line is not terminated"),
        }
    }
}

impl std::error::Error for ParseError {}

impl Request {
    /// Parsea la request line desde bytes
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request line completa y válida
    /// * `Err(ParseError)` - Cualquier violación de la gramática; nunca se
    ///   retorna un request a medio llenar
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use file_server::http::Request;
    ///
    /// let request = Request::parse(b"GET /index.html HTTP/1.0\r\n\r\n").unwrap();
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.path(), "/index.html");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        // 1. Método: [A-Z]+
        let method_len = buffer
            .iter()
            .take_while(|b| b.is_ascii_uppercase())
            .count();
        if method_len == 0 {
            return Err(ParseError::MissingMethod);
        }
        let method = &buffer[..method_len];

        // 2. Exactamente un espacio
        let mut pos = method_len;
        if buffer.get(pos) != Some(&b' ') {
            return Err(ParseError::MissingSpace);
        }
        pos += 1;

        // 3. Path: [^ \n]*
        let path_len = buffer[pos..]
            .iter()
            .take_while(|&&b| b != b' ' && b != b'\n')
            .count();
        if path_len == 0 {
            return Err(ParseError::EmptyPath);
        }
        let path = &buffer[pos..pos + path_len];
        pos += path_len;

        // 4. Resto de la línea: debe haber un \n antes del fin del buffer
        if !buffer[pos..].contains(&b'\n') {
            return Err(ParseError::UnterminatedRequestLine);
        }

        let path = std::str::from_utf8(path).map_err(|_| ParseError::InvalidPath)?;

        Ok(Request {
            // El método ya es ASCII
            method: String::from_utf8_lossy(method).into_owned(),
            path: path.to_string(),
        })
    }

    /// Obtiene el método HTTP
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Obtiene el path tal como llegó
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path sin query string (`/a?b=1` -> `/a`)
    pub fn target(&self) -> &str {
        match self.path.find('?') {
            Some(pos) => &self.path[..pos],
            None => &self.path,
        }
    }
}

/// Lee de la conexión hasta ver un `\n`, hasta que el peer cierre o hasta
/// llenar `max_size` bytes.
///
/// Si se llega al tope sin newline el buffer se retorna igual y el parser
/// lo rechaza con `UnterminatedRequestLine`.
pub fn read_request<R: Read>(stream: &mut R, max_size: usize) -> io::Result<Vec<u8>> {
    let mut buffer = vec![0u8; max_size];
    let mut filled = 0;

    while filled < max_size {
        let n = match stream.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        let newline_seen = buffer[filled..filled + n].contains(&b'\n');
        filled += n;
        if newline_seen {
            break;
        }
    }

    buffer.truncate(filled);
    Ok(buffer)
}

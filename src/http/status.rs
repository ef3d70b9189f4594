//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Tabla de códigos de estado HTTP/1.0 que emite el servidor de archivos.
//! Según el RFC 1945, HTTP/1.0 define códigos en 5 categorías:
//!
//! - **1xx**: Informacional (100 Continue)
//! - **2xx**: Éxito (200 OK)
//! - **3xx**: Redirección (301, 302, 304)
//! - **4xx**: Error del cliente (400, 401, 403, 404, 405)
//! - **5xx**: Error del servidor (500)
//!
//! Cualquier código fuera de la tabla se reporta como
//! `Internal Server Error`.

/// Códigos de estado que conoce el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 100 Continue
    Continue = 100,

    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 301 Moved Permanently
    MovedPermanently = 301,

    /// 302 Found
    Found = 302,

    /// 304 Not Modified
    NotModified = 304,

    /// 400 Bad Request - Request line malformada
    BadRequest = 400,

    /// 401 Unauthorized
    Unauthorized = 401,

    /// 403 Forbidden - El path escapa del document root
    Forbidden = 403,

    /// 404 Not Found - Archivo o directorio inexistente
    NotFound = 404,

    /// 405 Method Not Allowed
    MethodNotAllowed = 405,

    /// 500 Internal Server Error - Error de filesystem u otro fallo interno
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Busca el código en la tabla. `None` si no es uno de los conocidos.
    pub fn from_u16(code: u16) -> Option<Self> {
        let status = match code {
            100 => StatusCode::Continue,
            200 => StatusCode::Ok,
            301 => StatusCode::MovedPermanently,
            302 => StatusCode::Found,
            304 => StatusCode::NotModified,
            400 => StatusCode::BadRequest,
            401 => StatusCode::Unauthorized,
            403 => StatusCode::Forbidden,
            404 => StatusCode::NotFound,
            405 => StatusCode::MethodNotAllowed,
            500 => StatusCode::InternalServerError,
            _ => return None,
        };
        Some(status)
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        reason_phrase(self.as_u16())
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

/// Texto de razón para un código numérico arbitrario.
///
/// Los códigos que no están en la tabla caen en `Internal Server Error`.
///
/// ```
/// use file_server::http::status::reason_phrase;
/// assert_eq!(reason_phrase(405), "Method Not Allowed");
/// assert_eq!(reason_phrase(418), "Internal Server Error");
/// ```
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

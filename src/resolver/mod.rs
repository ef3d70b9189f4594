//! # Resolución de Paths
//! src/resolver/mod.rs
//!
//! Traduce el path de un request a un recurso dentro del document root:
//!
//! - `/dir/` con `index.html` -> el contenido del índice
//! - `/dir/` sin índice -> listado HTML generado
//! - `/archivo.ext` -> bytes del archivo + MIME por extensión
//!
//! Los `..` se resuelven de forma léxica y cualquier path que intente salir
//! del root (incluso a través de un symlink) se rechaza con `Forbidden`.

pub mod listing;

use crate::http::mime;
use log::{debug, warn};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Documento que se sirve automáticamente para un directorio
pub const INDEX_DOCUMENT: &str = "index.html";

/// Recurso resuelto, vive lo que dura una respuesta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Contenido de un archivo regular
    File { content: Vec<u8>, mime: &'static str },

    /// Listado generado de un directorio sin índice
    Listing { html: String },
}

impl Resource {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Resource::File { mime, .. } => mime,
            Resource::Listing { .. } => "text/html",
        }
    }

    pub fn body(&self) -> &[u8] {
        match self {
            Resource::File { content, .. } => content,
            Resource::Listing { html } => html.as_bytes(),
        }
    }

    pub fn into_body(self) -> Vec<u8> {
        match self {
            Resource::File { content, .. } => content,
            Resource::Listing { html } => html.into_bytes(),
        }
    }
}

/// Errores de resolución
#[derive(Debug)]
pub enum ResolveError {
    /// Escape `%XX` inválido o byte nulo en el path
    BadPath,

    /// El path sale del document root
    Forbidden,

    /// No existe archivo ni directorio para el path
    NotFound,

    /// Cualquier otro fallo de filesystem (permisos, I/O)
    Io(io::Error),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::BadPath => write!(f, "Malformed request path"),
            ResolveError::Forbidden => write!(f, "Path escapes the document root"),
            ResolveError::NotFound => write!(f, "Resource not found"),
            ResolveError::Io(e) => write!(f, "Filesystem error: {}", e),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Resolver atado a un document root canónico
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    /// Canonicaliza el root. Falla si no existe o no es un directorio.
    pub fn new<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resuelve el path de un request
    ///
    /// Un path terminado en `/` es un pedido de directorio; cualquier otro
    /// es un pedido de archivo.
    pub fn resolve(&self, request_path: &str) -> Result<Resource, ResolveError> {
        let target = request_path.split('?').next().unwrap_or_default();
        let decoded = percent_decode(target).ok_or(ResolveError::BadPath)?;
        if decoded.contains('\0') {
            return Err(ResolveError::BadPath);
        }

        let candidate = self.root.join(confine(&decoded)?);

        if decoded.ends_with('/') {
            self.resolve_directory(&candidate, &decoded)
        } else {
            self.resolve_file(&candidate, &decoded)
        }
    }

    fn resolve_directory(&self, dir: &Path, display_path: &str) -> Result<Resource, ResolveError> {
        let metadata = lookup(dir)?;
        if !metadata.is_dir() {
            return Err(ResolveError::NotFound);
        }
        let dir = self.canonical(dir)?;

        let index = dir.join(INDEX_DOCUMENT);
        match fs::metadata(&index) {
            Ok(meta) if meta.is_file() => {
                let index = self.canonical(&index)?;
                debug!("Sirviendo índice {}", index.display());
                let content = fs::read(&index).map_err(ResolveError::Io)?;
                Ok(Resource::File {
                    content,
                    mime: mime::mime_type(INDEX_DOCUMENT),
                })
            }
            _ => {
                let html = listing::render(&dir, display_path).map_err(ResolveError::Io)?;
                Ok(Resource::Listing { html })
            }
        }
    }

    fn resolve_file(&self, file: &Path, display_path: &str) -> Result<Resource, ResolveError> {
        let metadata = lookup(file)?;
        if !metadata.is_file() {
            return Err(ResolveError::NotFound);
        }
        let file = self.canonical(file)?;

        let content = fs::read(&file).map_err(ResolveError::Io)?;
        Ok(Resource::File {
            content,
            mime: mime::mime_type(display_path),
        })
    }

    /// Path real (symlinks resueltos), que debe seguir dentro del root
    fn canonical(&self, path: &Path) -> Result<PathBuf, ResolveError> {
        let real = fs::canonicalize(path).map_err(|e| classify(path, e))?;
        if !real.starts_with(&self.root) {
            warn!("{} apunta fuera del document root", path.display());
            return Err(ResolveError::Forbidden);
        }
        Ok(real)
    }
}

/// Convierte el path del request en un path relativo limpio.
///
/// `.` se ignora y `..` sube un nivel; subir por encima del root es
/// `Forbidden`.
fn confine(request_path: &str) -> Result<PathBuf, ResolveError> {
    let mut clean = PathBuf::new();

    for component in Path::new(request_path).components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(segment) => clean.push(segment),
            Component::ParentDir => {
                if !clean.pop() {
                    return Err(ResolveError::Forbidden);
                }
            }
            Component::Prefix(_) => return Err(ResolveError::Forbidden),
        }
    }

    Ok(clean)
}

fn lookup(path: &Path) -> Result<Metadata, ResolveError> {
    fs::metadata(path).map_err(|e| classify(path, e))
}

/// `NotFound` si el path no puede existir: no está, un ancestro es un
/// archivo (`/archivo.txt/x`) o un segmento excede el largo máximo de
/// nombre. El resto (permisos, I/O) son errores de filesystem.
fn classify(path: &Path, error: io::Error) -> ResolveError {
    let missing = matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidFilename
    );

    if missing || path.ancestors().skip(1).any(|ancestor| ancestor.is_file()) {
        ResolveError::NotFound
    } else {
        ResolveError::Io(error)
    }
}

/// Decodifica escapes `%XX`. `None` si hay un escape inválido o el
/// resultado no es UTF-8.
pub fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

//! # Listado de Directorios
//! src/resolver/listing.rs
//!
//! Genera la página HTML para un directorio sin `index.html`.
//!
//! ```text
//! Index of /docs/
//!   Parent Directory   -> ../
//!   a.txt              -> a.txt
//!   sub/               -> sub/
//! ```
//!
//! Las entradas se ordenan por nombre para que la salida sea determinista.

use crate::http::response::escape_html;
use std::fs;
use std::io;
use std::path::Path;

/// Etiqueta del enlace al directorio padre
pub const PARENT_LABEL: &str = "Parent Directory";

/// Una entrada del directorio
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

/// Lee las entradas de `dir` ordenadas por nombre.
///
/// `read_dir` nunca devuelve `.` ni `..`, así que no hay duplicados con
/// el enlace al padre.
pub fn read_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        // metadata() sigue symlinks: un link a un directorio se lista como tal
        let is_dir = fs::metadata(entry.path())
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        entries.push(Entry { name, is_dir });
    }

    entries.sort();
    Ok(entries)
}

/// Renderiza el listado de `dir`; `display_path` es el path del request
pub fn render(dir: &Path, display_path: &str) -> io::Result<String> {
    let entries = read_entries(dir)?;
    Ok(render_entries(display_path, &entries))
}

pub fn render_entries(display_path: &str, entries: &[Entry]) -> String {
    let title = escape_html(display_path);
    let mut page = format!(
        "<html><head><title>Index of {title}</title></head>\n\
         <body>\n<h1>Index of {title}</h1>\n<ul>\n"
    );

    page.push_str(&format!("<li><a href=\"../\">{}</a></li>\n", PARENT_LABEL));

    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        page.push_str(&format!(
            "<li><a href=\"{}{suffix}\">{}{suffix}</a></li>\n",
            encode_href(&entry.name),
            escape_html(&entry.name),
        ));
    }

    page.push_str("</ul>\n</body></html>\n");
    page
}

/// Percent-encoding de todo lo que no sea `A-Z a-z 0-9 - . _ ~`
fn encode_href(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

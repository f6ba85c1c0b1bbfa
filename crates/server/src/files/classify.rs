//! Extension-based file classification and text decoding.

use std::fs;
use std::path::Path;

use protocol::{FileClass, DEFAULT_MIME_TYPE, UNREADABLE_CONTENT};
use tracing::{debug, warn};

/// Extensions whose content is decoded and returned inline.
pub const TEXT_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".json", ".xml", ".html", ".css", ".js", ".py", ".log", ".csv",
];

/// Extensions previewed as images.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp", ".svg"];

/// Extension previewed as a PDF.
pub const PDF_EXTENSION: &str = ".pdf";

/// Lowercase extension of `name` with its leading dot, or empty.
///
/// A name ending in a dot and a dotfile without a second dot both have no
/// extension.
pub fn extension_of(name: &str) -> String {
    match Path::new(name).extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy().to_lowercase()),
        _ => String::new(),
    }
}

/// Classify by lowercase extension. Text wins over image, image over PDF.
pub fn classify(extension: &str) -> FileClass {
    if TEXT_EXTENSIONS.contains(&extension) {
        FileClass::Text
    } else if IMAGE_EXTENSIONS.contains(&extension) {
        FileClass::Image
    } else if extension == PDF_EXTENSION {
        FileClass::Pdf
    } else {
        FileClass::Other
    }
}

/// MIME type guessed from the file name.
pub fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}

/// Read a text file for preview.
///
/// UTF-8 is tried first and the bytes are kept exactly. Anything that is not
/// valid UTF-8 is decoded as Latin-1, which cannot fail. A read error yields
/// [`UNREADABLE_CONTENT`].
pub fn read_text(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => decode_text(bytes),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read text file");
            UNREADABLE_CONTENT.to_string()
        }
    }
}

/// Decode bytes as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("Content is not UTF-8, decoding as Latin-1");
            decode_latin1(e.as_bytes())
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

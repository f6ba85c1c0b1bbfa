//! Download URLs for the raw-bytes route.
//!
//! Relative paths are percent-encoded with `/` and the RFC 3986 unreserved
//! characters left as-is, so a URL stays readable and maps back to the same
//! path after a single decode.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{ProtocolError, Result};

/// Route prefix under which raw document bytes are served.
pub const DOCUMENTS_PREFIX: &str = "/documents/";

/// Characters escaped in a document URL path.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Build the download URL for a relative document path.
pub fn document_url(relative: &str) -> String {
    format!(
        "{}{}",
        DOCUMENTS_PREFIX,
        utf8_percent_encode(relative, PATH_SEGMENT)
    )
}

/// Recover the relative path from a download URL.
pub fn parse_document_url(url: &str) -> Result<String> {
    let encoded = url
        .strip_prefix(DOCUMENTS_PREFIX)
        .ok_or_else(|| ProtocolError::InvalidDocumentUrl(url.to_string()))?;

    percent_decode_str(encoded)
        .decode_utf8()
        .map(|path| path.into_owned())
        .map_err(|_| ProtocolError::InvalidDocumentUrl(url.to_string()))
}

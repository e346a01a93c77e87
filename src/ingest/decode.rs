use crate::error::TableError;

/// Strict UTF-8 decode of an uploaded buffer.
///
/// A leading byte order mark is skipped; any other undecodable byte rejects
/// the whole upload.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str, TableError> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| TableError::Decode {
        offset: e.valid_up_to(),
    })
}

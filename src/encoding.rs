//! Text encoding and backup naming shared by the deploy and verify paths.
//!
//! Deployed files and the PowerShell temp script are UTF-8 with a leading
//! byte-order mark so editors on Windows pick the right encoding.

use std::path::{Path, PathBuf};

/// UTF-8 byte-order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Suffix appended to an existing file before it is overwritten
pub const BACKUP_SUFFIX: &str = ".backup";

/// `<path>.backup`, keeping the original extension in place.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Encode `text` as UTF-8 preceded by the BOM.
pub fn encode_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Decode file bytes, dropping a leading BOM and replacing invalid sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(body).into_owned()
}

//! Helpers for the backslash separated paths embedded in entry descriptors.

use crate::error::{Error, Result};

/// Path bytes up to, not including, the first NUL
///
/// Returns the whole slice when no NUL is present.
pub fn trim_path(path: &[u8]) -> &[u8] {
    match path.iter().position(|&b| b == 0) {
        Some(end) => &path[..end],
        None => path,
    }
}

/// Internal path as text, without its NUL padding
///
/// The encoding of the stored bytes is undefined; invalid UTF-8 is replaced.
pub fn path_to_string(path: &[u8]) -> String {
    String::from_utf8_lossy(trim_path(path)).into_owned()
}

/// Name of the file an internal path points to
///
/// Takes everything after the last backslash of the NUL trimmed path. A path without any
/// backslash is a bare file name and is returned whole.
///
/// # Warnings
///
/// The name comes straight from the archive. It may be empty (`dir\`) or contain characters that
/// are not valid in file names on the host.
pub fn resolve_filename(path: &[u8]) -> Result<String> {
    if path.is_empty() {
        return Err(Error::MalformedPath);
    }

    let content = trim_path(path);
    let start = content
        .iter()
        .rposition(|&b| b == b'\\')
        .map_or(0, |separator| separator + 1);

    Ok(String::from_utf8_lossy(&content[start..]).into_owned())
}

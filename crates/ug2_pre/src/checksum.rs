//! Checksums stored alongside embedded paths.

use crc::{Crc, CRC_32_JAMCRC};

const PATH_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_JAMCRC);

/// Checksum of an internal path as stored in [`crate::types::EntryDescriptor::path_crc`]
///
/// CRC-32 without the final inversion, taken over the path with ASCII letters lowercased and
/// forward slashes turned into backslashes, so differently spelled paths to the same file agree.
pub fn path_checksum(path: &[u8]) -> u32 {
    let mut digest = PATH_CRC.digest();
    for &byte in path {
        let normalized = match byte {
            b'/' => b'\\',
            other => other.to_ascii_lowercase(),
        };
        digest.update(&[normalized]);
    }
    digest.finalize()
}

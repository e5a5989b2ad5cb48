//! This library handles reading from and creating **PRE** files used by *Tony Hawk's Underground 2*.
//!
//! # PRE Archive Format Documentation
//!
//! PRE archives bundle game assets into a single file. They are usually found with the `.pre` or
//! `.prx` extension. There is no magic number; a header is followed directly by the entries, each
//! entry being a descriptor, its path and its payload.
//!
//! ## File Structure
//!
//! ### Header
//!
//! | Offset (bytes) | Field         | Description                                              |
//! |----------------|---------------|----------------------------------------------------------|
//! | 0x0000         | Total Size    | 4 bytes: Length of the whole file, header included       |
//! | 0x0004         | Version       | 2 bytes: `3` for archives written by the game's tools    |
//! | 0x0006         | Reserved      | 2 bytes: `0xABCD`                                        |
//! | 0x0008         | Entry Count   | 4 bytes: Number of entries that follow                   |
//!
//! The total size is informational. Readers report it but never check it against the data.
//!
//! ### Entries
//!
//! Entries follow the header back to back, in archive order.
//!
//! | Offset (bytes) | Field           | Description                                            |
//! |----------------|-----------------|--------------------------------------------------------|
//! | 0x0000         | Raw Size        | 4 bytes: Size of the payload once extracted            |
//! | 0x0004         | Compressed Size | 4 bytes: Size of the LZSS stream, `0` when stored      |
//! | 0x0008         | Path Size       | 4 bytes: Length of the path including its padding      |
//! | 0x000C         | Path CRC        | 4 bytes: Checksum of the path                          |
//! | 0x0010         | Path            | `Path Size` bytes                                      |
//! | ...            | Payload         | Stored or compressed bytes, padded                     |
//!
//! - **Path**: A backslash separated path such as `levels\default\sky.tex`, followed by between one
//!   and four NUL bytes so that its length is a multiple of four.
//! - **Payload**: `Compressed Size` bytes of LZSS stream when that field is non-zero, otherwise
//!   `Raw Size` bytes stored as is. Zeros pad the payload to a multiple of four.
//!
//! ### Compression
//!
//! Compressed payloads use LZSS over a 4096 byte ring buffer that starts zero filled with its
//! write cursor at 4078. The stream is a sequence of segments, each a flag byte followed by up to
//! eight items, consumed from the lowest flag bit up:
//!
//! - a set bit is one literal byte
//! - a clear bit is a two byte back-reference `b0 b1` copying `(b1 & 0x0F) + 3` bytes from ring
//!   offset `b0 | (b1 & 0xF0) << 4`
//!
//! See [`compression`] for the details.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.pre`, `.prx`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression Methods**:
//!   - stored (compressed size is `0`)
//!   - LZSS
//!

pub mod bytes;
pub mod checksum;
pub mod compression;
pub mod error;
pub mod path;
pub mod prespec;
pub mod read;
pub mod types;
pub mod write;

pub use compression::{compress, decompress, CompressionMethod};
pub use path::resolve_filename;
pub use prespec::{PreSpec, PreSpecEntry};
pub use read::{extract_entry, index, PreArchive};
pub use write::{write_archive, PreWriter};

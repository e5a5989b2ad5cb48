//! Base types for structure of PRE file.

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinWrite};

use crate::bytes::{read_u16le, read_u32le, write_u16le, write_u32le};
use crate::compression::CompressionMethod;
use crate::error::{Error, Result};

/// Size in bytes of [`PreHeader`] on disk
pub const HEADER_SIZE: usize = 12;

/// Size in bytes of the fixed part of [`EntryDescriptor`] on disk
pub const DESCRIPTOR_PREFIX_SIZE: usize = 16;

/// Format version written by the game's own tools
pub const PRE_VERSION: u16 = 3;

/// Value of the second header halfword in every known archive
pub const PRE_RESERVED: u16 = 0xABCD;

/// Number of zero bytes needed to bring `size` up to a multiple of four.
pub const fn align_padding(size: usize) -> usize {
    (4 - size % 4) % 4
}

/// Number of zero bytes appended to a path of `len` bytes.
///
/// Always in `1..=4` so the stored path keeps at least one NUL terminator.
pub const fn path_padding(len: usize) -> usize {
    4 - len % 4
}

/// Copy `path` and append its NUL padding.
pub fn pad_path(path: &[u8]) -> Vec<u8> {
    let mut padded = Vec::with_capacity(path.len() + path_padding(path.len()));
    padded.extend_from_slice(path);
    padded.resize(path.len() + path_padding(path.len()), 0);
    padded
}

/// PRE file header
///
/// There is no magic number; the archive is recognised by its extension only.
/// All data is stored in little endian format
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PreHeader {
    /// Byte length of the archive as recorded by the packer
    pub total_size: u32,

    /// Format version, `3` in every known archive
    pub version: u16,

    /// Unknown halfword, `0xABCD` in every known archive
    pub reserved: u16,

    /// The number of entries stored in the file
    pub entry_count: u32,
}

impl Default for PreHeader {
    fn default() -> Self {
        Self {
            total_size: Default::default(),
            version: PRE_VERSION,
            reserved: PRE_RESERVED,
            entry_count: Default::default(),
        }
    }
}

impl PreHeader {
    /// Decode a header from its fixed 12 byte layout
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            total_size: read_u32le(&bytes[0..4]),
            version: read_u16le(&bytes[4..6]),
            reserved: read_u16le(&bytes[6..8]),
            entry_count: read_u32le(&bytes[8..12]),
        }
    }

    /// Read a header from the current position of `reader`
    ///
    /// Fewer than 12 available bytes is reported as [`Error::TruncatedInput`].
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut bytes)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Encode the header into its fixed 12 byte layout
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        write_u32le(&mut bytes[0..4], self.total_size);
        write_u16le(&mut bytes[4..6], self.version);
        write_u16le(&mut bytes[6..8], self.reserved);
        write_u32le(&mut bytes[8..12], self.entry_count);
        bytes
    }
}

/// PRE file entry descriptor
///
/// Precedes every payload in the archive. The payload that follows is `compressed_size` bytes of
/// LZSS stream, or `raw_size` stored bytes when `compressed_size` is zero, padded with zeros to a
/// multiple of four.
#[derive(BinRead, BinWrite, Debug, Default, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct EntryDescriptor {
    /// The size of the payload once extracted
    pub raw_size: u32,

    /// The size of the LZSS stream, zero when the payload is stored
    pub compressed_size: u32,

    /// The length of `path` including its NUL padding
    pub path_size: u32,

    /// A [`crate::checksum::path_checksum`] of the unpadded path
    pub path_crc: u32,

    /// Backslash separated internal path, NUL padded to a multiple of four
    #[br(count = path_size as usize)]
    pub path: Vec<u8>,
}

impl EntryDescriptor {
    /// Build a descriptor for an unpadded `path`, padding it as the format requires
    pub fn new(path: &[u8], raw_size: u32, compressed_size: u32, path_crc: u32) -> Result<Self> {
        let path = pad_path(path);
        Ok(Self {
            raw_size,
            compressed_size,
            path_size: u32::try_from(path.len()).map_err(|_| Error::ArchiveTooLarge)?,
            path_crc,
            path,
        })
    }

    /// Read a descriptor and its path from the current position of `reader`
    ///
    /// Running out of bytes before the declared path length is reported as
    /// [`Error::TruncatedInput`].
    pub fn decode<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        Ok(Self::read(reader)?)
    }

    /// Write the descriptor and its path at the current position of `writer`
    pub fn encode<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        Ok(self.write(writer)?)
    }

    /// How the payload following this descriptor is stored
    pub fn compression_method(&self) -> CompressionMethod {
        CompressionMethod::from(self.compressed_size)
    }

    /// Whether the payload is an LZSS stream
    pub fn is_compressed(&self) -> bool {
        self.compressed_size != 0
    }

    /// The number of payload bytes stored in the archive, excluding padding
    pub fn stored_size(&self) -> u64 {
        if self.is_compressed() {
            self.compressed_size as u64
        } else {
            self.raw_size as u64
        }
    }

    /// The number of payload bytes stored in the archive, including padding
    pub fn padded_size(&self) -> u64 {
        let stored = self.stored_size();
        stored + align_padding(stored as usize) as u64
    }

    /// The number of bytes the descriptor itself occupies
    pub fn descriptor_size(&self) -> u64 {
        DESCRIPTOR_PREFIX_SIZE as u64 + self.path.len() as u64
    }
}

//! Types for reading PRE archives
//!

use indexmap::IndexMap;
use std::{
    fmt::{self, Debug},
    io::{Read, Seek, SeekFrom},
};
use tracing::{instrument, trace};

use crate::{
    compression::{CompressionMethod, PreBlockReader},
    error::{Error, FileNotFoundError, Result},
    path::{path_to_string, resolve_filename},
    types::{EntryDescriptor, PreHeader},
};

/// An entry located during the index pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreEntry {
    /// The descriptor as stored in the archive
    pub descriptor: EntryDescriptor,
    /// Absolute offset of the first payload byte, right after the path
    pub payload_offset: u64,
}

impl PreEntry {
    /// Internal path without its NUL padding
    pub fn name(&self) -> String {
        path_to_string(&self.descriptor.path)
    }
}

/// Read the header and every entry descriptor of an archive.
///
/// Only descriptors are read; payloads are skipped by seeking past them, so the returned entries
/// can later be extracted in any order with [`extract_entry`].
#[instrument(level = "debug", skip_all)]
pub fn index<R: Read + Seek>(reader: &mut R) -> Result<(PreHeader, Vec<PreEntry>)> {
    reader.seek(SeekFrom::Start(0))?;
    let header = PreHeader::decode(reader)?;
    trace!(?header, "read header");

    let mut entries = Vec::new();
    for _ in 0..header.entry_count {
        let descriptor = EntryDescriptor::decode(reader)?;
        let payload_offset = reader.stream_position()?;
        trace!(
            path = %path_to_string(&descriptor.path),
            payload_offset,
            raw_size = descriptor.raw_size,
            compressed_size = descriptor.compressed_size,
            "indexed entry"
        );

        reader.seek(SeekFrom::Start(payload_offset + descriptor.padded_size()))?;
        entries.push(PreEntry {
            descriptor,
            payload_offset,
        });
    }

    Ok((header, entries))
}

/// Materialize the payload of `entry`, decompressing it when needed.
#[instrument(level = "debug", skip_all, fields(offset = entry.payload_offset))]
pub fn extract_entry<R: Read + Seek>(reader: &mut R, entry: &PreEntry) -> Result<Vec<u8>> {
    let mut block = PreBlockReader::new(reader, entry.payload_offset, &entry.descriptor)?;

    let mut data = Vec::new();
    block.read_to_end(&mut data)?;

    if data.len() != entry.descriptor.raw_size as usize {
        return Err(Error::TruncatedInput);
    }

    Ok(data)
}

/// A struct for reading an entry from a PRE file
pub struct PreFile<'a, R: Read + Seek> {
    entry: &'a PreEntry,
    reader: PreBlockReader<'a, R>,
}

impl<'a, R: Read + Seek> Debug for PreFile<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PreFile({:#?})", self.entry)
    }
}

/// Methods for retrieving information on PRE file entries
impl<'a, R: Read + Seek> PreFile<'a, R> {
    /// Get the internal path of the file
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`C:\Windows`), or break out of the
    /// current directory (`..\runtime`).
    pub fn name(&self) -> String {
        self.entry.name()
    }

    /// Get the internal path of the file, in the raw (internal) byte representation.
    ///
    /// Includes the NUL padding. The encoding of this data is currently undefined.
    pub fn name_raw(&self) -> &[u8] {
        &self.entry.descriptor.path
    }

    /// Get the last component of the internal path
    pub fn file_name(&self) -> Result<String> {
        resolve_filename(&self.entry.descriptor.path)
    }

    /// Get the size of the file, in bytes, in the archive
    ///
    /// Zero for stored files.
    pub fn compressed_size(&self) -> u64 {
        self.entry.descriptor.compressed_size as u64
    }

    /// Get the size of the file, in bytes, when extracted
    pub fn size(&self) -> u64 {
        self.entry.descriptor.raw_size as u64
    }

    /// Get the checksum of the internal path
    pub fn path_crc(&self) -> u32 {
        self.entry.descriptor.path_crc
    }

    /// Get the starting offset of the data of the file
    pub fn payload_offset(&self) -> u64 {
        self.entry.payload_offset
    }

    /// Get the compression method used for this file
    pub fn compression_method(&self) -> CompressionMethod {
        self.entry.descriptor.compression_method()
    }
}

impl<R: Read + Seek> Read for PreFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

/// PRE archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_pre_contents(reader: impl Read + Seek) -> ug2_pre::error::Result<()> {
///     let mut pre = ug2_pre::PreArchive::new(reader)?;
///
///     for i in 0..pre.len() {
///         let mut file = pre.by_index(i)?;
///         println!("Filename: {}", file.name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct PreArchive<R> {
    reader: R,
    header: PreHeader,
    entries: Vec<PreEntry>,
    names: IndexMap<Box<str>, usize>,
}

impl<R> PreArchive<R> {
    /// Total size of the files in the archive once extracted.
    pub fn decompressed_size(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| e.descriptor.raw_size as u64)
            .sum()
    }

    /// The archive header
    pub fn header(&self) -> &PreHeader {
        &self.header
    }

    /// Every entry in archive order
    pub fn entries(&self) -> &[PreEntry] {
        &self.entries
    }

    /// Number of entries contained in this PRE.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this PRE archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the internal paths in archive order.
    pub fn file_names(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(PreEntry::name)
    }

    /// Get the index of a file entry by internal path, if it's present.
    ///
    /// When a path occurs more than once the first entry wins.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Get the internal path of a file entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<String> {
        self.entries.get(index).map(PreEntry::name)
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> PreArchive<R> {
    /// Read a PRE archive collecting the files it contains.
    pub fn new(mut reader: R) -> Result<PreArchive<R>> {
        let (header, entries) = index(&mut reader)?;

        let mut names = IndexMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            names.entry(entry.name().into_boxed_str()).or_insert(i);
        }

        Ok(PreArchive {
            reader,
            header,
            entries,
            names,
        })
    }

    /// Search for a file entry by internal path
    pub fn by_name(&mut self, name: &str) -> Result<PreFile<'_, R>> {
        let Some(index) = self.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&mut self, file_number: usize) -> Result<PreFile<'_, R>> {
        let entry = self
            .entries
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        Ok(PreFile {
            entry,
            reader: PreBlockReader::new(&mut self.reader, entry.payload_offset, &entry.descriptor)?,
        })
    }

    /// Read the whole payload of a contained file by index
    pub fn extract(&mut self, file_number: usize) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        extract_entry(&mut self.reader, entry)
    }
}

//! Types for writing PRE archives
//!

use bon::Builder;
use std::io::{self, Seek, SeekFrom, Write};
use tracing::{debug, instrument, Level};

use crate::checksum::path_checksum;
use crate::error::{Error, Result};
use crate::types::{align_padding, EntryDescriptor, PreHeader, HEADER_SIZE, PRE_RESERVED, PRE_VERSION};

/// Options for how the PRE file should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct PreWriterOptions {
    /// Checksum stored with each entry's path
    #[builder(default = path_checksum as fn(&[u8]) -> u32)]
    pub checksum: fn(&[u8]) -> u32,

    /// Version written to the header
    #[builder(default = PRE_VERSION)]
    pub version: u16,

    /// Second header halfword
    #[builder(default = PRE_RESERVED)]
    pub reserved: u16,
}

impl Default for PreWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Default)]
struct PendingFile {
    path: Vec<u8>,
    data: Vec<u8>,
}

/// PRE archive generator
///
/// Payloads are always stored uncompressed. A placeholder header is written up front and
/// patched by [`PreWriter::finish`] once the size and entry count are known, so the output must
/// be seekable.
///
/// ```
/// # fn doit() -> ug2_pre::error::Result<()>
/// # {
/// # use ug2_pre::PreWriter;
/// use std::io::Write;
/// use ug2_pre::write::PreWriterOptions;
///
/// // We use a buffer here, though you'd normally use a `File`
/// let mut buf = [0; 65536];
/// let mut pre = PreWriter::new(std::io::Cursor::new(&mut buf[..]), PreWriterOptions::default())?;
///
/// pre.start_file("text\\hello_world.txt")?;
/// pre.write_all(b"Hello, World!")?;
///
/// // Apply the changes you've made.
/// pre.finish()?;
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct PreWriter<W: Write + Seek> {
    inner: W,
    current_file: Option<PendingFile>,
    header: PreHeader,
    written: u64,
    options: PreWriterOptions,
}

impl<W: Write + Seek> PreWriter<W> {
    /// Initializes the archive, writing a placeholder header at the current position.
    ///
    /// Before writing to this object, the [`PreWriter::start_file`] function should be called.
    #[instrument(level = "debug", skip_all, err)]
    pub fn new(mut inner: W, options: PreWriterOptions) -> Result<PreWriter<W>> {
        let header = PreHeader {
            total_size: HEADER_SIZE as u32,
            version: options.version,
            reserved: options.reserved,
            ..Default::default()
        };
        inner.write_all(&header.to_bytes())?;

        Ok(PreWriter {
            inner,
            current_file: None,
            header,
            written: HEADER_SIZE as u64,
            options,
        })
    }

    /// Returns true if a file is currently open for writing.
    pub const fn is_writing_file(&self) -> bool {
        self.current_file.is_some()
    }

    /// The header as it stands; complete once [`PreWriter::finish`] has run.
    pub fn header(&self) -> &PreHeader {
        &self.header
    }

    /// Start a new file stored under the backslash separated `path`.
    ///
    /// Any file still open is finished first.
    #[instrument(level = "debug", skip_all, err)]
    pub fn start_file(&mut self, path: impl AsRef<[u8]>) -> Result<()> {
        self.finish_file()?;

        self.current_file = Some(PendingFile {
            path: path.as_ref().to_vec(),
            data: Vec::new(),
        });

        Ok(())
    }

    #[instrument(level = "debug", skip(self), err)]
    fn finish_file(&mut self) -> Result<()> {
        let Some(file) = self.current_file.take() else {
            return Ok(());
        };

        let raw_size = u32::try_from(file.data.len()).map_err(|_| Error::ArchiveTooLarge)?;
        let descriptor =
            EntryDescriptor::new(&file.path, raw_size, 0, (self.options.checksum)(&file.path))?;

        descriptor.encode(&mut self.inner)?;
        self.inner.write_all(&file.data)?;
        let padding = align_padding(file.data.len());
        self.inner.write_all(&[0u8; 3][..padding])?;

        self.written += descriptor.descriptor_size() + descriptor.padded_size();
        self.header.total_size = u32::try_from(self.written).map_err(|_| Error::ArchiveTooLarge)?;
        self.header.entry_count += 1;

        debug!(
            path = %String::from_utf8_lossy(&file.path),
            size = raw_size,
            "wrote entry"
        );

        Ok(())
    }

    /// Finish the last file and patch the header
    ///
    /// The returned writer is positioned at the end of the archive.
    #[instrument(level = "debug", skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        self.finish_file()?;

        let end = self.inner.stream_position()?;
        self.inner.seek(SeekFrom::Start(end - self.written))?;
        self.inner.write_all(&self.header.to_bytes())?;
        self.inner.seek(SeekFrom::Start(end))?;

        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for PreWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size = buf.len()))]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.current_file.as_mut() {
            Some(file) => file.data.write(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "No file has been started",
            )),
        }
    }

    #[instrument(skip(self), err)]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Write a complete archive of stored entries and return its header.
///
/// Each item pairs an internal path with the payload stored under it.
pub fn write_archive<W, I, P, D>(inner: W, entries: I, options: PreWriterOptions) -> Result<PreHeader>
where
    W: Write + Seek,
    I: IntoIterator<Item = (P, D)>,
    P: AsRef<[u8]>,
    D: AsRef<[u8]>,
{
    let mut writer = PreWriter::new(inner, options)?;
    for (path, data) in entries {
        writer.start_file(path)?;
        writer.write_all(data.as_ref())?;
    }

    let header = {
        writer.finish_file()?;
        *writer.header()
    };
    writer.finish()?;

    Ok(header)
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::error::Result;
    use crate::types::PreHeader;
    use crate::write::{write_archive, PreWriter, PreWriterOptions};
    use std::io::{Cursor, Seek, SeekFrom, Write};

    fn zero_checksum(_: &[u8]) -> u32 {
        0
    }

    fn options() -> PreWriterOptions {
        PreWriterOptions::builder().checksum(zero_checksum).build()
    }

    #[traced_test]
    #[test]
    fn pre_empty_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            // Header
            0x0C, 0x00, 0x00, 0x00,
            0x03, 0x00,
            0xCD, 0xAB,
            0x00, 0x00, 0x00, 0x00,
        ];

        let writer = PreWriter::new(Cursor::new(Vec::new()), options())?;
        let result = writer.finish()?;
        assert_str_eq!(
            format!("{:02X?}", *result.get_ref()),
            format!("{:02X?}", expected)
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn pre_without_data_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Header
            0x20, 0x00, 0x00, 0x00,
            0x03, 0x00,
            0xCD, 0xAB,
            0x01, 0x00, 0x00, 0x00,
            // Descriptor
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Path
            0x61, 0x62, 0x63, 0x00,
        ];

        let mut writer = PreWriter::new(Cursor::new(Vec::new()), options())?;
        writer.start_file("abc")?;

        let result = writer.finish()?;
        assert_str_eq!(
            format!("{:02X?}", *result.get_ref()),
            format!("{:02X?}", expected)
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn pre_multiple_entries_with_data_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Header
            0x4C, 0x00, 0x00, 0x00,
            0x03, 0x00,
            0xCD, 0xAB,
            0x02, 0x00, 0x00, 0x00,
            // Descriptor
            0x05, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x0C, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Path
            0x64, 0x69, 0x72, 0x5C, 0x61, 0x2E, 0x74, 0x78, 0x74, 0x00, 0x00, 0x00,
            // Data
            0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x00, 0x00, 0x00,
            // Descriptor
            0x04, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x08, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Path
            0x62, 0x2E, 0x62, 0x69, 0x6E, 0x00, 0x00, 0x00,
            // Data
            0x01, 0x02, 0x03, 0x04,
        ];

        let mut writer = PreWriter::new(Cursor::new(Vec::new()), options())?;
        writer.start_file("dir\\a.txt")?;
        writer.write_all(b"hello")?;
        writer.start_file(b"b.bin")?;
        writer.write_all(&[0x01, 0x02])?;
        writer.write_all(&[0x03, 0x04])?;

        let result = writer.finish()?;
        assert_eq!(result.get_ref().len(), expected.len());
        assert_str_eq!(
            format!("{:02X?}", *result.get_ref()),
            format!("{:02X?}", expected)
        );

        Ok(())
    }

    #[test]
    fn pre_write_without_file() -> Result<()> {
        let mut writer = PreWriter::new(Cursor::new(Vec::new()), options())?;
        assert!(!writer.is_writing_file());
        assert!(writer.write_all(b"orphan").is_err());

        writer.start_file("a")?;
        assert!(writer.is_writing_file());

        Ok(())
    }

    #[test]
    fn pre_write_after_existing_data() -> Result<()> {
        let mut inner = Cursor::new(Vec::new());
        inner.write_all(b"PREFIX")?;

        let mut writer = PreWriter::new(inner, options())?;
        writer.start_file("a")?;
        writer.write_all(b"x")?;

        let mut result = writer.finish()?;
        assert_eq!(result.position(), 6 + 12 + 16 + 4 + 4);

        result.seek(SeekFrom::Start(0))?;
        let bytes = result.into_inner();
        assert_eq!(&bytes[..6], b"PREFIX");
        assert_eq!(&bytes[6..10], &[0x24, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[14..18], &[0x01, 0x00, 0x00, 0x00]);

        Ok(())
    }

    #[test]
    fn pre_write_archive_returns_header() -> Result<()> {
        let mut buffer = Cursor::new(Vec::new());
        let header = write_archive(
            &mut buffer,
            [("dir\\a.txt", b"hello".as_slice()), ("b.bin", b"".as_slice())],
            options(),
        )?;

        assert_eq!(
            header,
            PreHeader {
                total_size: 72,
                entry_count: 2,
                ..Default::default()
            }
        );
        assert_eq!(buffer.get_ref().len(), 72);

        Ok(())
    }

    #[test]
    fn pre_custom_header_fields() -> Result<()> {
        let options = PreWriterOptions::builder()
            .checksum(zero_checksum)
            .version(4)
            .reserved(0x1234)
            .build();

        let result = PreWriter::new(Cursor::new(Vec::new()), options)?.finish()?;
        assert_eq!(&result.get_ref()[4..8], &[0x04, 0x00, 0x34, 0x12]);

        Ok(())
    }
}

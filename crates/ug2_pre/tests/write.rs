use miette::{IntoDiagnostic, Result};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Read, Seek, Write};
use tracing::{info, instrument};
use tracing_test::traced_test;
use ug2_pre::{
    compress, resolve_filename,
    types::EntryDescriptor,
    write::{PreWriter, PreWriterOptions},
    write_archive, CompressionMethod, PreArchive,
};

#[instrument(skip_all, fields(entries = files.len()))]
fn validate_pre_roundtrip(files: &[(&str, Vec<u8>)]) -> Result<()> {
    let mut pre = PreWriter::new(Cursor::new(Vec::new()), PreWriterOptions::default())?;

    for (name, data) in files {
        info!("inserting {name}");
        pre.start_file(name)?;
        pre.write_all(data).into_diagnostic()?;
    }

    let mut actual = pre.finish()?;
    let written = actual.get_ref().len();

    // Rewind so we can read from the generated data
    actual.rewind().into_diagnostic()?;

    let mut pre_output = PreArchive::new(actual)?;
    assert_eq!(pre_output.header().total_size as usize, written);
    assert_eq!(pre_output.len(), files.len());
    assert_eq!(
        pre_output.file_names().collect::<Vec<_>>(),
        files.iter().map(|(name, _)| *name).collect::<Vec<_>>()
    );

    for (i, (name, expected)) in files.iter().enumerate() {
        info!("comparing {name}");

        let mut output_buffer = Vec::new();
        let mut actual_pre_file = pre_output.by_index(i)?;
        assert_eq!(actual_pre_file.compression_method(), CompressionMethod::None);
        assert_eq!(actual_pre_file.payload_offset() % 4, 0);
        actual_pre_file
            .read_to_end(&mut output_buffer)
            .into_diagnostic()?;

        assert_eq!(expected.len(), output_buffer.len());
        assert_eq!(expected, &output_buffer);
    }

    Ok(())
}

#[traced_test]
#[test]
fn roundtrip_pre() -> Result<()> {
    validate_pre_roundtrip(&[])?;
    validate_pre_roundtrip(&[("empty.bin", Vec::new())])?;
    validate_pre_roundtrip(&[
        ("levels\\default\\sky.tex", (0..=255u8).cycle().take(1001).collect()),
        ("levels\\default\\ground.col", b"ground".to_vec()),
        ("readme.txt", b"Hello, World!".to_vec()),
        ("a", vec![0xAA; 4]),
    ])?;

    Ok(())
}

#[traced_test]
#[test]
fn path_alignment_roundtrip() -> Result<()> {
    for length in [0usize, 1, 3, 4, 5, 8] {
        let name = "x".repeat(length);
        let descriptor = EntryDescriptor::new(name.as_bytes(), 0, 0, 0)?;

        let mut buffer = Cursor::new(Vec::new());
        descriptor.encode(&mut buffer)?;
        buffer.rewind().into_diagnostic()?;
        let actual = EntryDescriptor::decode(&mut buffer)?;

        info!(length, path_size = actual.path_size, "read back");
        assert_eq!(actual.path_size % 4, 0);
        assert!(actual.path_size as usize >= length + 1);
        assert_eq!(actual.path.len(), actual.path_size as usize);
        assert_eq!(resolve_filename(&actual.path)?, name);
    }

    Ok(())
}

#[traced_test]
#[test]
fn repack_compressed_entry() -> Result<()> {
    // Build an archive holding an LZSS entry by hand, then store it uncompressed
    let raw = b"aaaaaaaaaaaaaaaaaaaa".repeat(8);
    let compressed = compress(&raw);
    assert!(compressed.len() < raw.len());

    let descriptor = EntryDescriptor::new(
        b"b.bin",
        raw.len() as u32,
        compressed.len() as u32,
        ug2_pre::checksum::path_checksum(b"b.bin"),
    )?;

    let mut source = Cursor::new(Vec::new());
    source
        .write_all(&[0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0xCD, 0xAB, 0x01, 0x00, 0x00, 0x00])
        .into_diagnostic()?;
    descriptor.encode(&mut source)?;
    source.write_all(&compressed).into_diagnostic()?;
    source.rewind().into_diagnostic()?;

    let mut input = PreArchive::new(source)?;
    assert_eq!(input.by_index(0)?.compression_method(), CompressionMethod::Lzss);
    let payload = input.extract(0)?;
    assert_eq!(payload, raw);

    let mut output = Cursor::new(Vec::new());
    let header = write_archive(&mut output, [("b.bin", &payload)], PreWriterOptions::default())?;
    assert_eq!(header.entry_count, 1);

    output.rewind().into_diagnostic()?;
    let mut repacked = PreArchive::new(output)?;
    let file = repacked.by_name("b.bin")?;
    assert_eq!(file.compression_method(), CompressionMethod::None);
    assert_eq!(file.path_crc(), descriptor.path_crc);
    assert_eq!(repacked.extract(0)?, raw);

    Ok(())
}

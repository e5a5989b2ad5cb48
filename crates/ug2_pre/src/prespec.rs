//! Types for reading and writing prespec manifests
//!
//! A prespec lists the files that make up an archive, pairing the location of each file on disk
//! with the internal path it is stored under:
//!
//! ```text
//! /home/user/out/sky.tex
//! levels\default\sky.tex
//!
//! /home/user/out/ground.col
//! levels\default\ground.col
//! ```
//!
//! Blank lines are ignored, so entries may be separated by any number of them.

use std::io::{Read, Write};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// A single file listed in a prespec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreSpecEntry {
    /// Location of the file on disk
    pub disk_path: PathBuf,
    /// Backslash separated path inside the archive
    pub internal_path: String,
}

impl PreSpecEntry {
    /// Create a new entry
    pub fn new(disk_path: impl Into<PathBuf>, internal_path: impl Into<String>) -> Self {
        Self {
            disk_path: disk_path.into(),
            internal_path: internal_path.into(),
        }
    }
}

/// Prespec manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreSpec {
    /// Files in archive order
    pub entries: Vec<PreSpecEntry>,
}

impl PreSpec {
    /// Parse a manifest from text
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .split('\n')
            .enumerate()
            .map(|(number, line)| (number + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.is_empty());

        let mut entries = Vec::new();
        while let Some((number, disk_path)) = lines.next() {
            let Some((_, internal_path)) = lines.next() else {
                return Err(Error::PreSpecMismatch { line: number });
            };
            entries.push(PreSpecEntry::new(disk_path, internal_path));
        }

        Ok(Self { entries })
    }

    /// Read a manifest from `reader`
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    /// Write the manifest to `writer`
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        for entry in &self.entries {
            writeln!(writer, "{}", entry.disk_path.display())?;
            writeln!(writer, "{}", entry.internal_path)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Number of files listed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no files are listed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};

    use crate::error::{Error, Result};
    use crate::prespec::{PreSpec, PreSpecEntry};

    #[test]
    fn parse_entries() -> Result<()> {
        let text = "out/sky.tex\nlevels\\default\\sky.tex\n\nout/b.bin\nb.bin\n\n";

        let spec = PreSpec::parse(text)?;
        assert_eq!(
            spec.entries,
            vec![
                PreSpecEntry::new("out/sky.tex", "levels\\default\\sky.tex"),
                PreSpecEntry::new("out/b.bin", "b.bin"),
            ]
        );

        Ok(())
    }

    #[test]
    fn parse_ignores_blank_lines_and_carriage_returns() -> Result<()> {
        let text = "\r\n\r\nout/a.txt\r\ndir\\a.txt\r\n\r\n\r\n\nout/b.bin\n\n\nb.bin";

        let spec = PreSpec::parse(text)?;
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.entries[0], PreSpecEntry::new("out/a.txt", "dir\\a.txt"));
        assert_eq!(spec.entries[1], PreSpecEntry::new("out/b.bin", "b.bin"));

        Ok(())
    }

    #[test]
    fn parse_unpaired_disk_path() {
        let text = "out/a.txt\ndir\\a.txt\n\nout/b.bin\n";

        let result = PreSpec::parse(text);
        assert!(matches!(result, Err(Error::PreSpecMismatch { line: 4 })));
    }

    #[test]
    fn parse_empty() -> Result<()> {
        assert!(PreSpec::parse("")?.is_empty());
        assert!(PreSpec::parse("\n\n")?.is_empty());

        Ok(())
    }

    #[test]
    fn write_entries() -> Result<()> {
        let spec = PreSpec {
            entries: vec![
                PreSpecEntry::new("out/a.txt", "dir\\a.txt"),
                PreSpecEntry::new("out/b.bin", "b.bin"),
            ],
        };

        let mut actual = Vec::new();
        spec.write(&mut actual)?;

        assert_str_eq!(
            String::from_utf8_lossy(&actual),
            "out/a.txt\ndir\\a.txt\n\nout/b.bin\nb.bin\n\n"
        );
        assert_eq!(PreSpec::read(actual.as_slice())?, spec);

        Ok(())
    }
}

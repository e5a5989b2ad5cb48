//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(binrw::Error),

    /// the stream ended before a declared field or length was satisfied
    #[error("input ended before a declared field or length was satisfied")]
    TruncatedInput,

    /// decoded length disagrees with the declared size
    #[error("expected {expected} bytes after decompression, got {actual}")]
    SizeMismatch {
        /// The size declared by the entry descriptor
        expected: usize,
        /// The number of bytes the stream actually produced
        actual: usize,
    },

    /// embedded path is empty
    #[error("malformed path in embedded file")]
    MalformedPath,

    /// prespec disk path without a matching internal path
    #[error("disk path on line {line} has no matching internal path")]
    PreSpecMismatch {
        /// 1-based line of the unpaired disk path
        line: usize,
    },

    /// a size does not fit the archive's 32-bit fields
    #[error("archive exceeds the limits of the pre format")]
    ArchiveTooLarge,

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        match value.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::TruncatedInput,
            _ => Error::IOError(value),
        }
    }
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        if value.is_eof() {
            return Error::TruncatedInput;
        }

        match value {
            binrw::Error::Io(err) => Error::from(err),
            other => Error::BinRWError(other),
        }
    }
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use std::io;

    use crate::error::Error;

    #[test]
    fn unexpected_eof_is_truncation() {
        let err = Error::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, Error::TruncatedInput));
    }

    #[test]
    fn other_io_errors_pass_through() {
        let err = Error::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, Error::IOError(e) if e.kind() == io::ErrorKind::PermissionDenied));
    }
}

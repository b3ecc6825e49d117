//! Unified error types for parsekit
//!
//! Provides a top-level `ParseKitError` that wraps module-specific errors,
//! plus `From` impls so `?` works across module boundaries. The JSON
//! decoder and the HTML5 tokenizer are deliberately infallible and have no
//! error types here.

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// Top-level error type for parsekit operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseKitError {
    /// TAR archive error
    Tar(TarError),
    /// JSON encode error
    Encode(EncodeError),
}

impl fmt::Display for ParseKitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseKitError::Tar(err) => write!(f, "TAR error: {}", err),
            ParseKitError::Encode(err) => write!(f, "Encode error: {}", err),
        }
    }
}

/// TAR-specific error variants
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TarError {
    /// Corrupt header: bad USTAR magic or checksum mismatch
    HeaderParse,
    /// Clean end-of-archive marker, or not enough buffered data for a
    /// whole header/data block; the caller decides whether this is the
    /// expected terminator or a truncated archive
    EndOfFile,
    /// Wrong-mode operation: `extract_file` on a streaming reader or
    /// `consume` on a buffer reader. A defect in caller code, not a data
    /// error; never retried
    ProgrammingError,
    /// I/O error while loading an archive (description only, since
    /// `std::io::Error` is not `Clone`)
    Io(String),
}

impl fmt::Display for TarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TarError::HeaderParse => write!(f, "invalid tar header"),
            TarError::EndOfFile => write!(f, "end of archive"),
            TarError::ProgrammingError => {
                write!(f, "operation not available in this reader mode")
            }
            TarError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

/// JSON encode error variants
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// The value tree contains the `Invalid` sentinel, which has no
    /// serialized form
    InvalidValue,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::InvalidValue => write!(f, "cannot encode an invalid JSON value"),
        }
    }
}

impl From<TarError> for ParseKitError {
    fn from(err: TarError) -> Self {
        ParseKitError::Tar(err)
    }
}

impl From<EncodeError> for ParseKitError {
    fn from(err: EncodeError) -> Self {
        ParseKitError::Encode(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseKitError {}

#[cfg(feature = "std")]
impl std::error::Error for TarError {}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn test_tar_error_display() {
        assert_eq!(format!("{}", TarError::EndOfFile), "end of archive");
        let err = TarError::Io("file missing".to_string());
        assert!(format!("{}", err).contains("file missing"));
    }

    #[test]
    fn test_wrapping_preserves_variant() {
        let err: ParseKitError = TarError::HeaderParse.into();
        assert_eq!(err, ParseKitError::Tar(TarError::HeaderParse));
        let err: ParseKitError = EncodeError::InvalidValue.into();
        assert!(format!("{}", err).contains("invalid JSON value"));
    }
}

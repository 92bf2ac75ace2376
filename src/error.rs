use std::borrow::Cow;
use std::fmt::{self, Display};

/// Error types used throughout the `reloc_shuffle` library.
///
/// Every failure here is terminal for the tool: there is no retry or
/// recovery path, callers propagate these straight to the process exit.
#[derive(Debug)]
pub enum Error {
    /// An error occurred while reading or writing the image.
    ///
    /// This covers every short read while decoding a fixed-size record or
    /// slurping a table, as well as seek and write failures during the
    /// in-place relocation rewrite.
    Io {
        /// A descriptive message about the I/O error.
        msg: Cow<'static, str>,
    },

    /// An error occurred while parsing the ELF header.
    ///
    /// Raised for a bad magic signature, an unrecognized class byte, or an
    /// unsupported data encoding.
    ParseEhdr {
        /// A descriptive message about the header parsing error.
        msg: Cow<'static, str>,
    },

    /// An error occurred while parsing a section header.
    ///
    /// Raised when a table-shaped section carries a field combination the
    /// parser cannot work with, such as a zero entry size.
    ParseShdr {
        /// A descriptive message about the section header parsing error.
        msg: Cow<'static, str>,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { msg } => write!(f, "I/O error: {msg}"),
            Error::ParseEhdr { msg } => write!(f, "ELF header parsing error: {msg}"),
            Error::ParseShdr { msg } => write!(f, "Section header parsing error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Creates an I/O error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn io_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Io { msg: msg.into() }
}

/// Creates an ELF header parsing error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn parse_ehdr_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::ParseEhdr { msg: msg.into() }
}

/// Creates a section header parsing error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn parse_shdr_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::ParseShdr { msg: msg.into() }
}

pub type Result<T> = core::result::Result<T, Error>;

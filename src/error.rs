use std::error;
use std::fmt;
use std::io;
use std::result;
use std::str;

use csvrecord_core::{ConfigError, Malformed};

use crate::source::Position;

/// A type alias for `Result<T, csvrecord::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing CSV data.
///
/// This error can happen when configuring a reader or writer, when reading
/// or writing CSV data, or when mutating a `Record`.
#[derive(Debug)]
pub enum Error {
    /// An I/O error that occurred while reading or writing CSV data.
    Io(io::Error),
    /// The CSV data is not valid UTF-8.
    Utf8 {
        /// The position at which decoding failed.
        pos: Position,
        /// The corresponding UTF-8 error.
        err: str::Utf8Error,
    },
    /// A reader or writer was configured with characters that cannot work
    /// together. This is reported before any I/O happens.
    Config(ConfigError),
    /// The CSV data is malformed. The record being parsed is abandoned and
    /// the reader refuses to read any further.
    Malformed {
        /// The position at which the problem was detected.
        pos: Position,
        /// What exactly is wrong.
        kind: Malformed,
    },
    /// A record index was out of range.
    IndexOutOfRange {
        /// The index that was asked for.
        index: usize,
        /// The number of fields in the record.
        len: usize,
    },
    /// A read-only record was asked to change.
    ReadOnly,
    /// A reader was used again after it reported a malformed record or an
    /// I/O error.
    Poisoned,
    /// A record without any fields was given to a writer.
    EmptyRecord,
    /// A field needs quotes but the writer was told never to quote.
    UnquotableField {
        /// The index of the field within its record.
        field: usize,
    },
}

impl Error {
    /// Returns true if this error was caused by malformed CSV data.
    pub fn is_malformed(&self) -> bool {
        match *self {
            Error::Malformed { .. } => true,
            _ => false,
        }
    }

    /// Return the position for this error, if one exists.
    pub fn position(&self) -> Option<&Position> {
        match *self {
            Error::Utf8 { ref pos, .. } => Some(pos),
            Error::Malformed { ref pos, .. } => Some(pos),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Error {
        Error::Config(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Utf8 { ref err, .. } => Some(err),
            Error::Config(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::Utf8 { ref pos, ref err } => write!(
                f,
                "CSV parse error: record {} \
                 (byte {}, line {}, column {}): {}",
                pos.record(),
                pos.byte(),
                pos.line(),
                pos.column(),
                err
            ),
            Error::Config(ref err) => write!(f, "CSV config error: {}", err),
            Error::Malformed { ref pos, kind } => write!(
                f,
                "CSV parse error: record {} \
                 (byte {}, line {}, column {}): {}",
                pos.record(),
                pos.byte(),
                pos.line(),
                pos.column(),
                kind
            ),
            Error::IndexOutOfRange { index, len } => write!(
                f,
                "CSV record error: index {} is out of range for a record \
                 with {} fields",
                index, len
            ),
            Error::ReadOnly => {
                write!(f, "CSV record error: record is read-only")
            }
            Error::Poisoned => write!(
                f,
                "CSV error: reader cannot continue after a previous error"
            ),
            Error::EmptyRecord => {
                write!(f, "CSV write error: records must have at least one field")
            }
            Error::UnquotableField { field } => write!(
                f,
                "CSV write error: field {} requires quotes, but the quote \
                 style is 'Never'",
                field
            ),
        }
    }
}

/// `IntoInnerError` occurs when consuming a `Writer` fails.
///
/// Consuming the `Writer` causes a flush to happen. If the flush fails, then
/// this error is returned, which contains both the original `Writer` and
/// the error that occurred.
///
/// The type parameter `W` is the unconsumed writer.
pub struct IntoInnerError<W> {
    wtr: W,
    err: io::Error,
}

impl<W> IntoInnerError<W> {
    /// Creates a new `IntoInnerError`.
    pub(crate) fn new(wtr: W, err: io::Error) -> IntoInnerError<W> {
        IntoInnerError { wtr, err }
    }

    /// Returns the error which caused the call to `into_inner` to fail.
    ///
    /// This error was returned when attempting to flush the internal buffer.
    pub fn error(&self) -> &io::Error {
        &self.err
    }

    /// Returns the underlying writer which generated the error.
    ///
    /// The returned value can be used for error recovery, such as
    /// re-inspecting the buffer.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

impl<W: std::any::Any> error::Error for IntoInnerError<W> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.err)
    }
}

impl<W> fmt::Display for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl<W> fmt::Debug for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.err.fmt(f)
    }
}

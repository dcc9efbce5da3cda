use std::io;
use std::str;

use memchr::{memchr_iter, memrchr};

use crate::error::{Error, Result};

/// The default capacity of a character source's buffer.
pub(crate) const DEFAULT_BUFFER_CAPACITY: usize = 64 * (1 << 10);

/// A position in CSV data.
///
/// A position is used to report where an error occurred. The record number
/// counts records (including the header record, if any) that were fully
/// read before this position, starting at `0`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    byte: u64,
    line: u64,
    column: u64,
    record: u64,
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl Position {
    /// Returns a new position at the start of the data.
    pub fn new() -> Position {
        Position { byte: 0, line: 1, column: 1, record: 0 }
    }

    /// The byte offset, starting at `0`, of this position.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The line number, starting at `1`, of this position.
    ///
    /// Only `\n` starts a new line, so CSV data terminated by lone `\r`
    /// characters reports everything on line `1`.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The column, in characters and starting at `1`, of this position.
    pub fn column(&self) -> u64 {
        self.column
    }

    /// The record index, starting with the first record at `0`.
    pub fn record(&self) -> u64 {
        self.record
    }

    /// Set the byte offset of this position.
    pub fn set_byte(&mut self, byte: u64) -> &mut Position {
        self.byte = byte;
        self
    }

    /// Set the line number of this position.
    pub fn set_line(&mut self, line: u64) -> &mut Position {
        assert!(line > 0);
        self.line = line;
        self
    }

    /// Set the column of this position.
    pub fn set_column(&mut self, column: u64) -> &mut Position {
        assert!(column > 0);
        self.column = column;
        self
    }

    /// Set the record index of this position.
    pub fn set_record(&mut self, record: u64) -> &mut Position {
        self.record = record;
        self
    }
}

/// A buffered source of characters decoded from a stream of UTF-8 bytes.
///
/// The source hands out the longest run of complete characters currently
/// buffered via `fill`, and tracks the position of the next character as
/// the caller `consume`s them. A multi-byte character split across two
/// reads from the underlying stream is held back until it is complete.
#[derive(Debug)]
pub struct CharacterSource<R> {
    rdr: R,
    buf: Vec<u8>,
    /// Bytes before this index have been consumed.
    start: usize,
    /// Bytes in `start..valid` are known to be valid UTF-8.
    valid: usize,
    /// Bytes in `valid..end` have been read but not decoded yet.
    end: usize,
    eof: bool,
    pos: Position,
}

impl<R: io::Read> CharacterSource<R> {
    /// Create a new character source with a default buffer capacity.
    pub fn new(rdr: R) -> CharacterSource<R> {
        CharacterSource::with_capacity(DEFAULT_BUFFER_CAPACITY, rdr)
    }

    /// Create a new character source with the given buffer capacity.
    ///
    /// Capacities smaller than the longest UTF-8 encoding of a character are
    /// rounded up.
    pub fn with_capacity(capacity: usize, rdr: R) -> CharacterSource<R> {
        CharacterSource {
            rdr,
            buf: vec![0; capacity.max(4)],
            start: 0,
            valid: 0,
            end: 0,
            eof: false,
            pos: Position::new(),
        }
    }

    /// Returns the buffered characters that have not been consumed yet,
    /// reading more from the underlying stream if there are none.
    ///
    /// An empty string is returned if and only if the stream is exhausted.
    pub fn fill(&mut self) -> Result<&str> {
        if self.start == self.valid {
            self.refill()?;
        }
        let bytes = &self.buf[self.start..self.valid];
        // SAFETY: `refill` only ever extends `valid` over bytes that passed
        // `str::from_utf8`, and `consume` only stops on char boundaries.
        Ok(unsafe { str::from_utf8_unchecked(bytes) })
    }

    /// Mark the first `n` bytes returned by `fill` as used.
    ///
    /// `n` must fall on a character boundary of the string `fill` returned.
    pub fn consume(&mut self, n: usize) {
        assert!(self.start + n <= self.valid, "consumed more than filled");
        let used = &self.buf[self.start..self.start + n];
        self.pos.byte += n as u64;
        match memrchr(b'\n', used) {
            None => self.pos.column += char_count(used),
            Some(i) => {
                self.pos.line += memchr_iter(b'\n', used).count() as u64;
                self.pos.column = 1 + char_count(&used[i + 1..]);
            }
        }
        self.start += n;
    }

    /// Returns the next character without consuming it, or `None` at the
    /// end of the stream.
    pub fn peek_char(&mut self) -> Result<Option<char>> {
        Ok(self.fill()?.chars().next())
    }

    /// Consumes and returns the next character, or `None` at the end of the
    /// stream.
    pub fn read_char(&mut self) -> Result<Option<char>> {
        let c = self.peek_char()?;
        if let Some(c) = c {
            self.consume(c.len_utf8());
        }
        Ok(c)
    }

    /// The position of the next unconsumed character.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.rdr
    }

    /// Unwraps this source, returning the underlying reader.
    ///
    /// Any buffered data that was not consumed is lost.
    pub fn into_inner(self) -> R {
        self.rdr
    }

    fn refill(&mut self) -> Result<()> {
        // Keep any partial character around and make room for more.
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.valid -= self.start;
        self.start = 0;
        loop {
            if self.valid == self.end {
                if self.valid > self.start || self.eof {
                    return Ok(());
                }
            } else {
                match str::from_utf8(&self.buf[self.valid..self.end]) {
                    Ok(_) => {
                        self.valid = self.end;
                        continue;
                    }
                    Err(err) => {
                        self.valid += err.valid_up_to();
                        if self.valid > self.start {
                            // Hand out what is good. The bad bytes surface
                            // on the next refill.
                            return Ok(());
                        }
                        if err.error_len().is_some() || self.eof {
                            return Err(Error::Utf8 { pos: self.pos, err });
                        }
                    }
                }
            }
            let n = match self.rdr.read(&mut self.buf[self.end..]) {
                Ok(n) => n,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {
                    continue
                }
                Err(err) => return Err(Error::Io(err)),
            };
            if n == 0 {
                self.eof = true;
            } else {
                self.end += n;
            }
        }
    }
}

/// Counts the characters in a run of valid UTF-8.
fn char_count(bytes: &[u8]) -> u64 {
    bytes.iter().filter(|&&b| b & 0b1100_0000 != 0b1000_0000).count() as u64
}

use std::fs::File;
use std::io;
use std::mem;
use std::path::Path;

use csvrecord_core::{
    PeekResult, ReadFieldResult, Reader as CoreReader,
    ReaderBuilder as CoreReaderBuilder, Terminator,
};
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::header::HeaderRecord;
use crate::record::Record;
use crate::source::{CharacterSource, Position, DEFAULT_BUFFER_CAPACITY};

/// Builds a CSV reader with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, record terminator
/// and more. Once a CSV `Reader` is built, its configuration cannot be
/// changed.
///
/// The configuration is checked when a reader is built, before the
/// underlying stream is touched. For example, a delimiter that is also the
/// quote character is refused:
///
/// ```
/// use csvrecord::{Error, ReaderBuilder};
///
/// let res = ReaderBuilder::new()
///     .delimiter('"')
///     .from_reader("a,b".as_bytes());
/// assert!(matches!(res, Err(Error::Config(_))));
/// ```
#[derive(Debug)]
pub struct ReaderBuilder {
    capacity: usize,
    has_headers: bool,
    builder: Box<CoreReaderBuilder>,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder {
            capacity: DEFAULT_BUFFER_CAPACITY,
            has_headers: false,
            builder: Box::new(CoreReaderBuilder::default()),
        }
    }
}

impl ReaderBuilder {
    /// Create a new builder for configuring CSV parsing.
    ///
    /// To convert a builder into a reader, call one of the methods starting
    /// with `from_`.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV parser from this configuration that reads data from
    /// `rdr`.
    ///
    /// Note that the CSV reader is buffered automatically, so you should
    /// not wrap `rdr` in a buffered reader like `io::BufReader`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Result<Reader<R>> {
        let core = self.builder.build()?;
        Ok(Reader::new(self, core, rdr))
    }

    /// Build a CSV parser from this configuration that reads data from the
    /// given file path.
    ///
    /// The file is only opened once the configuration has been checked.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<File>> {
        let core = self.builder.build()?;
        Ok(Reader::new(self, core, File::open(path)?))
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// Whether to treat the first row as a special header row.
    ///
    /// When enabled, the first row is not returned as a record. It is
    /// available from `Reader::headers` instead, where it can be used to
    /// look up fields by column name.
    ///
    /// This is disabled by default.
    pub fn has_headers(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.has_headers = yes;
        self
    }

    /// The record terminator to use when parsing CSV.
    ///
    /// The default is `Terminator::CRLF`, which treats `\r`, `\n` or `\r\n`
    /// as a single record terminator.
    pub fn terminator(&mut self, term: Terminator) -> &mut ReaderBuilder {
        self.builder.terminator(term);
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut ReaderBuilder {
        self.builder.quote(quote);
        self
    }

    /// The escape character to use when parsing CSV.
    ///
    /// In some variants of CSV, quotes are escaped using a special escape
    /// character like `\` (instead of escaping quotes by doubling them).
    ///
    /// By default, recognizing these idiosyncratic escapes is disabled.
    pub fn escape(&mut self, escape: Option<char>) -> &mut ReaderBuilder {
        self.builder.escape(escape);
        self
    }

    /// Enable double quote escapes.
    ///
    /// This is enabled by default, but it may be disabled. When disabled,
    /// doubled quotes are not interpreted as escapes.
    pub fn double_quote(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.builder.double_quote(yes);
        self
    }

    /// Keep characters that follow a closing quote instead of failing.
    ///
    /// By default, `"ab"c` is malformed and reading stops with an error.
    /// When enabled, the field is read as `abc`. A quoted field that is
    /// never closed is an error either way.
    pub fn lenient(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.builder.lenient(yes);
        self
    }

    /// A convenience method for specifying a configuration to read ASCII
    /// delimited text.
    ///
    /// This sets the delimiter and record terminator to the ASCII unit
    /// separator (`\x1F`) and record separator (`\x1E`), respectively.
    pub fn ascii(&mut self) -> &mut ReaderBuilder {
        self.builder.ascii();
        self
    }

    /// Set the capacity (in bytes) of the buffer used in the CSV reader.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut ReaderBuilder {
        self.capacity = capacity;
        self
    }
}

/// A streaming CSV reader.
///
/// The reader pulls characters from any `io::Read` and hands back one
/// `Record` at a time. It never looks further into the stream than the end
/// of the record it is reading, although it does read ahead into its own
/// buffer.
///
/// Reading is single pass. Once a malformed record or an I/O error has been
/// reported, the reader is poisoned and every later read fails with
/// `Error::Poisoned`, since there is no reliable place in CSV data to pick
/// up again after a quoting error.
///
/// # Example
///
/// ```
/// use std::error::Error;
/// use csvrecord::Reader;
///
/// # fn main() { example().unwrap(); }
/// fn example() -> Result<(), Box<dyn Error>> {
///     let data = "\
/// Boston,United States,4628910
/// Concord,United States,42695
/// ";
///     let mut rdr = Reader::from_reader(data.as_bytes());
///     for result in rdr.records() {
///         let record = result?;
///         println!("{}", record);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    core: Box<CoreReader>,
    src: CharacterSource<R>,
    state: ReaderState,
}

#[derive(Debug)]
struct ReaderState {
    has_headers: bool,
    /// Whether the header row has been read (or there is none to read).
    headers_done: bool,
    headers: Option<HeaderRecord>,
    /// The number of records read so far, header row included.
    records: u64,
    poisoned: bool,
    field: String,
    fields: Vec<String>,
}

impl<R: io::Read> Reader<R> {
    fn new(builder: &ReaderBuilder, core: CoreReader, rdr: R) -> Reader<R> {
        Reader {
            core: Box::new(core),
            src: CharacterSource::with_capacity(builder.capacity, rdr),
            state: ReaderState {
                has_headers: builder.has_headers,
                headers_done: !builder.has_headers,
                headers: None,
                records: 0,
                poisoned: false,
                field: String::new(),
                fields: vec![],
            },
        }
    }

    /// Create a new CSV reader with a default configuration for the given
    /// reader.
    ///
    /// To customize CSV parsing, use a `ReaderBuilder`.
    pub fn from_reader(rdr: R) -> Reader<R> {
        Reader::new(&ReaderBuilder::new(), CoreReader::new(), rdr)
    }

    /// Returns true if there is at least one more record to read.
    ///
    /// This consumes nothing that belongs to the next record. When the
    /// reader was configured with headers, the header row is read first if
    /// that hasn't happened yet.
    pub fn has_next(&mut self) -> Result<bool> {
        self.guarded(|rdr| {
            rdr.read_headers()?;
            rdr.peek()
        })
    }

    /// Read the next record, or `None` once the data is exhausted.
    ///
    /// ```
    /// use csvrecord::Reader;
    ///
    /// let mut rdr = Reader::from_reader("a,\"b,c\"\n\nx".as_bytes());
    /// assert_eq!(rdr.read_next().unwrap().unwrap(), vec!["a", "b,c"]);
    /// assert_eq!(rdr.read_next().unwrap().unwrap(), vec![""]);
    /// assert_eq!(rdr.read_next().unwrap().unwrap(), vec!["x"]);
    /// assert!(rdr.read_next().unwrap().is_none());
    /// ```
    pub fn read_next(&mut self) -> Result<Option<Record>> {
        if !self.read_fields()? {
            return Ok(None);
        }
        Ok(Some(Record::from(mem::take(&mut self.state.fields))))
    }

    /// Read the next record into `record`, reusing its allocation.
    ///
    /// This returns `false` and leaves `record` empty once the data is
    /// exhausted. A read-only `record` is refused before anything is read.
    pub fn read_record(&mut self, record: &mut Record) -> Result<bool> {
        if record.is_read_only() {
            return Err(Error::ReadOnly);
        }
        if !self.read_fields()? {
            record.clear()?;
            return Ok(false);
        }
        record.replace_fields(&mut self.state.fields)?;
        Ok(true)
    }

    /// Returns a borrowed iterator over all remaining records.
    ///
    /// The iterator yields at most one error, after which it stops.
    pub fn records(&mut self) -> RecordsIter<R> {
        RecordsIter { rdr: self, done: false }
    }

    /// Returns an owned iterator over all remaining records.
    pub fn into_records(self) -> RecordsIntoIter<R> {
        RecordsIntoIter { rdr: self, done: false }
    }

    /// Returns the header row, reading it first if necessary.
    ///
    /// This returns `None` when the reader was not configured with headers,
    /// or when the data is empty.
    ///
    /// ```
    /// use csvrecord::ReaderBuilder;
    ///
    /// let data = "city,pop\nBoston,4628910\n";
    /// let mut rdr = ReaderBuilder::new()
    ///     .has_headers(true)
    ///     .from_reader(data.as_bytes())
    ///     .unwrap();
    /// let headers = rdr.headers().unwrap().unwrap().clone();
    /// let row = rdr.read_next().unwrap().unwrap();
    /// assert_eq!(headers.get("pop", &row), Some("4628910"));
    /// ```
    pub fn headers(&mut self) -> Result<Option<&HeaderRecord>> {
        if !self.state.has_headers {
            return Ok(None);
        }
        if !self.state.headers_done {
            self.guarded(|rdr| rdr.read_headers())?;
        }
        Ok(self.state.headers.as_ref())
    }

    /// Returns true if the reader has seen the end of the data.
    ///
    /// This only becomes true after a read (or `has_next`) found nothing
    /// more.
    pub fn is_done(&self) -> bool {
        self.core.is_done()
    }

    /// The position of the next character to be read.
    ///
    /// The record index counts every record read so far, header row
    /// included.
    pub fn position(&self) -> Position {
        let mut pos = *self.src.position();
        pos.set_record(self.state.records);
        pos
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.src.get_ref()
    }

    /// Unwraps this CSV reader, returning the underlying reader.
    ///
    /// Note that any leftover data inside this reader's internal buffer is
    /// lost.
    pub fn into_inner(self) -> R {
        self.src.into_inner()
    }

    /// Runs a read operation, refusing to start once poisoned and poisoning
    /// the reader when the operation fails.
    fn guarded<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Reader<R>) -> Result<T>,
    {
        if self.state.poisoned {
            return Err(Error::Poisoned);
        }
        let res = op(self);
        if let Err(ref err) = res {
            debug!("poisoning CSV reader at {:?}: {}", self.position(), err);
            self.state.poisoned = true;
        }
        res
    }

    fn read_headers(&mut self) -> Result<()> {
        if self.state.headers_done {
            return Ok(());
        }
        self.state.headers_done = true;
        if self.read_raw()? {
            let names = Record::from(mem::take(&mut self.state.fields));
            trace!("read CSV headers: {:?}", names);
            self.state.headers = Some(HeaderRecord::new(names));
        }
        Ok(())
    }

    /// Read the next data record into `self.state.fields`.
    fn read_fields(&mut self) -> Result<bool> {
        self.guarded(|rdr| {
            rdr.read_headers()?;
            rdr.read_raw()
        })
    }

    /// Skip to the start of the next record, reporting whether there is
    /// one.
    fn peek(&mut self) -> Result<bool> {
        loop {
            let input = self.src.fill()?;
            let (res, nin) = self.core.peek_record(input);
            self.src.consume(nin);
            match res {
                PeekResult::InputEmpty => {}
                PeekResult::Record => return Ok(true),
                PeekResult::End => return Ok(false),
            }
        }
    }

    /// Read one record, header or not, into `self.state.fields`.
    fn read_raw(&mut self) -> Result<bool> {
        if !self.peek()? {
            return Ok(false);
        }
        self.state.fields.clear();
        self.state.field.clear();
        loop {
            let input = self.src.fill()?;
            let (res, nin) = self.core.read_field(input, &mut self.state.field);
            self.src.consume(nin);
            match res {
                ReadFieldResult::InputEmpty => {}
                ReadFieldResult::Field { record_end } => {
                    let field = mem::take(&mut self.state.field);
                    self.state.fields.push(field);
                    if record_end {
                        self.state.records += 1;
                        return Ok(true);
                    }
                }
                ReadFieldResult::Malformed(kind) => {
                    self.state.fields.clear();
                    let pos = self.position();
                    debug!("malformed CSV record {}: {}", pos.record(), kind);
                    return Err(Error::Malformed { pos, kind });
                }
                // Once a record has started, running out of input always
                // ends it first.
                ReadFieldResult::End => return Ok(false),
            }
        }
    }
}

impl Reader<File> {
    /// Create a new CSV reader with a default configuration for the given
    /// file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        ReaderBuilder::new().from_path(path)
    }
}

/// A borrowed iterator over the records of a CSV reader.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying
/// CSV `Reader`.
pub struct RecordsIter<'r, R: 'r> {
    rdr: &'r mut Reader<R>,
    done: bool,
}

impl<'r, R: io::Read> RecordsIter<'r, R> {
    /// Return a reference to the underlying CSV reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Return a mutable reference to the underlying CSV reader.
    pub fn reader_mut(&mut self) -> &mut Reader<R> {
        &mut self.rdr
    }
}

impl<'r, R: io::Read> Iterator for RecordsIter<'r, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if self.done {
            return None;
        }
        match self.rdr.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// An owned iterator over the records of a CSV reader.
pub struct RecordsIntoIter<R> {
    rdr: Reader<R>,
    done: bool,
}

impl<R: io::Read> RecordsIntoIter<R> {
    /// Return a reference to the underlying CSV reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Drop this iterator and return the underlying CSV reader.
    pub fn into_reader(self) -> Reader<R> {
        self.rdr
    }
}

impl<R: io::Read> Iterator for RecordsIntoIter<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if self.done {
            return None;
        }
        match self.rdr.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

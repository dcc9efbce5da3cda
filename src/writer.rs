use std::fs::File;
use std::io;
use std::path::Path;

use csvrecord_core::{
    QuoteStyle, Terminator, WriteResult, Writer as CoreWriter,
    WriterBuilder as CoreWriterBuilder,
};

use crate::error::{Error, IntoInnerError, Result};
use crate::header::HeaderRecord;

/// Builds a CSV writer with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, record terminator
/// and more. Once a CSV `Writer` is built, its configuration cannot be
/// changed.
#[derive(Debug, Default)]
pub struct WriterBuilder {
    builder: Box<CoreWriterBuilder>,
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writing.
    ///
    /// To convert a builder into a writer, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::error::Error;
    /// use csvrecord::WriterBuilder;
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let mut wtr = WriterBuilder::new()
    ///         .delimiter(';')
    ///         .from_writer(vec![])?;
    ///     wtr.write_record(&["a", "b;c"])?;
    ///
    ///     let data = String::from_utf8(wtr.into_inner()?)?;
    ///     assert_eq!(data, "a;\"b;c\"\r\n");
    ///     Ok(())
    /// }
    /// ```
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration that writes data to
    /// `wtr`.
    ///
    /// Every record is handed to `wtr` with a single call to `write_all`,
    /// so wrapping it in an `io::BufWriter` is worthwhile when those calls
    /// are expensive.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Result<Writer<W>> {
        let core = self.builder.build()?;
        Ok(Writer::new(core, wtr))
    }

    /// Build a CSV writer from this configuration that writes data to the
    /// given file path. The file is truncated if it already exists.
    ///
    /// The file is only created once the configuration has been checked.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        let core = self.builder.build()?;
        Ok(Writer::new(core, File::create(path)?))
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// The record terminator to use when writing CSV.
    ///
    /// The default is `Terminator::CRLF`, which writes `\r\n` after every
    /// record. `Terminator::Any(c)` writes `c` instead.
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.builder.terminator(term);
        self
    }

    /// The quoting style to use when writing CSV.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which will only
    /// use quotes when they are necessary to preserve the integrity of data.
    ///
    /// Note that unless the quote style is set to `Never`, a record with a
    /// single empty field is always quoted.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.builder.quote_style(style);
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut WriterBuilder {
        self.builder.quote(quote);
        self
    }

    /// The escape character to use when writing CSV.
    ///
    /// This is only used when `double_quote` is set to `false`.
    ///
    /// The default is `'\\'`.
    pub fn escape(&mut self, escape: char) -> &mut WriterBuilder {
        self.builder.escape(escape);
        self
    }

    /// The quoting escape mechanism to use when writing CSV.
    ///
    /// When enabled (which is the default), quotes are escaped by doubling
    /// them. e.g., `"` escapes to `""`.
    ///
    /// When disabled, quotes are escaped with the escape character (which
    /// is `\\` by default).
    pub fn double_quote(&mut self, yes: bool) -> &mut WriterBuilder {
        self.builder.double_quote(yes);
        self
    }

    /// Whether to quote every empty field under `QuoteStyle::Necessary`.
    ///
    /// This is disabled by default.
    pub fn quote_empty(&mut self, yes: bool) -> &mut WriterBuilder {
        self.builder.quote_empty(yes);
        self
    }
}

/// A CSV writer.
///
/// Records are written one at a time. Each is rendered into a reusable
/// internal buffer and then handed to the underlying writer in full, so
/// nothing accumulates between records and a refused record leaves no
/// trace in the output.
///
/// The underlying writer is flushed when the CSV writer is dropped, but
/// any error from that flush is lost. Call `flush` or `into_inner` to see
/// it.
///
/// # Example
///
/// ```
/// use std::error::Error;
/// use csvrecord::{Record, Writer};
///
/// # fn main() { example().unwrap(); }
/// fn example() -> Result<(), Box<dyn Error>> {
///     let mut wtr = Writer::from_writer(vec![]);
///     wtr.write_record(&["city", "motto"])?;
///     wtr.write_record(&Record::from(vec!["Concord", "say \"hi\""]))?;
///
///     let data = String::from_utf8(wtr.into_inner()?)?;
///     assert_eq!(data, "city,motto\r\nConcord,\"say \"\"hi\"\"\"\r\n");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    core: CoreWriter,
    /// Always `Some` until `into_inner` takes it.
    wtr: Option<W>,
    buf: String,
    /// Set while the underlying writer is called, so that a panic in it
    /// doesn't trigger another call from `drop`.
    panicked: bool,
}

impl<W: io::Write> Drop for Writer<W> {
    fn drop(&mut self) {
        if self.wtr.is_some() && !self.panicked {
            let _ = self.flush();
        }
    }
}

impl Writer<File> {
    /// Build a CSV writer with a default configuration that writes data to
    /// the given file path. The file is truncated if it already exists.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Writer<File>> {
        WriterBuilder::new().from_path(path)
    }
}

impl<W: io::Write> Writer<W> {
    fn new(core: CoreWriter, wtr: W) -> Writer<W> {
        Writer { core, wtr: Some(wtr), buf: String::new(), panicked: false }
    }

    /// Build a CSV writer with a default configuration that writes data to
    /// `wtr`.
    ///
    /// To customize CSV writing, use a `WriterBuilder`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        Writer::new(CoreWriter::new(), wtr)
    }

    /// Write a single record.
    ///
    /// This accepts anything that iterates over fields, such as a `Record`,
    /// a `HeaderRecord`, `&[&str]` or `Vec<String>`.
    ///
    /// A record without fields cannot be read back, so it is refused with
    /// `Error::EmptyRecord`. Under `QuoteStyle::Never`, a record with a
    /// field that needs quotes is refused with `Error::UnquotableField`.
    /// Nothing is written in either case.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.buf.clear();
        match self.core.write_record(record, &mut self.buf) {
            WriteResult::Record { .. } => {}
            WriteResult::EmptyRecord => return Err(Error::EmptyRecord),
            WriteResult::Unquotable { field } => {
                return Err(Error::UnquotableField { field })
            }
        }
        self.panicked = true;
        let res = match self.wtr {
            Some(ref mut wtr) => wtr.write_all(self.buf.as_bytes()),
            None => Ok(()),
        };
        self.panicked = false;
        res.map_err(Error::from)
    }

    /// Write the column names of `headers` as a record.
    pub fn write_headers(&mut self, headers: &HeaderRecord) -> Result<()> {
        self.write_record(headers)
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.panicked = true;
        let res = self.get_mut().flush();
        self.panicked = false;
        res
    }

    /// Flush and return the underlying writer.
    ///
    /// If the flush fails, the error is returned along with this CSV
    /// writer.
    pub fn into_inner(
        mut self,
    ) -> std::result::Result<W, IntoInnerError<Writer<W>>> {
        match self.flush() {
            Ok(()) => Ok(self.wtr.take().unwrap()),
            Err(err) => Err(IntoInnerError::new(self, err)),
        }
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.wtr.as_ref().unwrap()
    }

    fn get_mut(&mut self) -> &mut W {
        self.wtr.as_mut().unwrap()
    }
}

use memchr::{memchr, memchr2, memmem};

use crate::{ConfigError, Roles, Terminator};

/// The quoting style to use when writing CSV data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteStyle {
    /// This puts quotes around every field. Always.
    Always,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when fields contain a quote, delimiter or record
    /// terminator. Empty fields are quoted only when `quote_empty` is
    /// enabled, or when the field is the only one in its record.
    ///
    /// This is the default.
    Necessary,
    /// This *never* writes quotes.
    ///
    /// If a field requires quotes, then the record is refused.
    Never,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// A builder for configuring a CSV writer.
///
/// This builder permits specifying the CSV delimiter, terminator, quoting
/// style and more.
#[derive(Debug, Default)]
pub struct WriterBuilder {
    wtr: Writer,
}

impl WriterBuilder {
    /// Create a new builder for configuring a CSV writer.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration.
    ///
    /// The same characters are rejected here as when building a parser.
    /// The escape character only takes part in the check when
    /// `double_quote` is disabled, since it is never written otherwise.
    pub fn build(&self) -> Result<Writer, ConfigError> {
        let wtr = &self.wtr;
        Roles::new(wtr.delimiter, wtr.quote, wtr.escape_char(), wtr.term)
            .validate()?;
        Ok(wtr.clone())
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.wtr.delimiter = delimiter;
        self
    }

    /// The record terminator to use when writing CSV.
    ///
    /// The default is `Terminator::CRLF`, which writes `\r\n` after every
    /// record. `Terminator::Any(c)` writes `c` instead.
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.wtr.term = term;
        self
    }

    /// The quoting style to use when writing CSV.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which will only
    /// use quotes when they are necessary to preserve the integrity of data.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.wtr.style = style;
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default value is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut WriterBuilder {
        self.wtr.quote = quote;
        self
    }

    /// The escape character to use when writing CSV.
    ///
    /// This is only used when `double_quote` is set to `false`.
    ///
    /// The default value is `'\\'`.
    pub fn escape(&mut self, escape: char) -> &mut WriterBuilder {
        self.wtr.escape = escape;
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
        self.wtr.double_quote = yes;
        self
    }

    /// Whether to quote empty fields under `QuoteStyle::Necessary`.
    ///
    /// This is disabled by default.
    pub fn quote_empty(&mut self, yes: bool) -> &mut WriterBuilder {
        self.wtr.quote_empty = yes;
        self
    }
}

/// The result of rendering one record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WriteResult {
    /// The record was appended to the output, terminator included.
    Record {
        /// The number of fields written.
        fields: usize,
    },
    /// The record has no fields. Nothing was written.
    EmptyRecord,
    /// The field at the given index needs quotes, but the quoting style
    /// is `QuoteStyle::Never`. Nothing was written.
    Unquotable {
        /// The index of the offending field.
        field: usize,
    },
}

/// A writer for CSV data.
///
/// This renders records into a caller provided `String`, quoting and
/// escaping fields as needed so that a parser configured with the same
/// delimiter, quote, escape and terminator reads back exactly the same
/// fields.
///
/// # RFC 4180
///
/// This writer conforms to RFC 4180 with one exception: it doesn't guarantee
/// that all records written are of the same length. Instead, the onus is on
/// the caller to ensure that all records written are of the same length.
#[derive(Clone, Debug)]
pub struct Writer {
    delimiter: char,
    term: Terminator,
    style: QuoteStyle,
    quote: char,
    escape: char,
    double_quote: bool,
    quote_empty: bool,
}

impl Default for Writer {
    fn default() -> Writer {
        Writer {
            delimiter: ',',
            term: Terminator::default(),
            style: QuoteStyle::default(),
            quote: '"',
            escape: '\\',
            double_quote: true,
            quote_empty: false,
        }
    }
}

impl Writer {
    /// Creates a new CSV writer with the default configuration.
    pub fn new() -> Writer {
        Writer::default()
    }

    /// Append a complete record, including its terminator, to `output`.
    ///
    /// The record is written entirely or not at all: when the result is
    /// not `WriteResult::Record`, `output` is left as it was.
    pub fn write_record<I, T>(&self, record: I, output: &mut String) -> WriteResult
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let start = output.len();
        let mut fields = record.into_iter().peekable();
        let mut count = 0;
        while let Some(field) = fields.next() {
            let field = field.as_ref();
            // A lone empty field would otherwise come out as a blank line.
            let alone = count == 0 && fields.peek().is_none();
            if count > 0 {
                output.push(self.delimiter);
            }
            let quoted = match self.style {
                QuoteStyle::Always => true,
                QuoteStyle::Necessary => {
                    self.needs_quotes(field)
                        || (field.is_empty() && (self.quote_empty || alone))
                }
                QuoteStyle::Never => {
                    if self.needs_quotes(field) {
                        output.truncate(start);
                        return WriteResult::Unquotable { field: count };
                    }
                    false
                }
            };
            if quoted {
                self.quote_field(field, output);
            } else {
                output.push_str(field);
            }
            count += 1;
        }
        if count == 0 {
            return WriteResult::EmptyRecord;
        }
        self.write_terminator(output);
        WriteResult::Record { fields: count }
    }

    /// Append the record terminator to `output`.
    pub fn write_terminator(&self, output: &mut String) {
        match self.term {
            Terminator::CRLF => output.push_str("\r\n"),
            Terminator::Any(c) => output.push(c),
        }
    }

    /// Returns true if `field` cannot be written without quotes.
    pub fn needs_quotes(&self, field: &str) -> bool {
        let escape = self.escape_char();
        field.chars().any(|c| {
            c == self.delimiter
                || c == self.quote
                || c == '\r'
                || c == '\n'
                || self.term == c
                || escape == Some(c)
        })
    }

    /// Append `field` to `output` surrounded by quotes, escaping any quote
    /// (and, when escaping is used instead of doubling, any escape)
    /// characters inside it.
    pub fn quote_field(&self, mut field: &str, output: &mut String) {
        output.push(self.quote);
        while let Some(i) = self.find_special(field) {
            output.push_str(&field[..i]);
            let c = match field[i..].chars().next() {
                Some(c) => c,
                None => break,
            };
            if self.double_quote {
                output.push(self.quote);
            } else {
                output.push(self.escape);
            }
            output.push(c);
            field = &field[i + c.len_utf8()..];
        }
        output.push_str(field);
        output.push(self.quote);
    }

    /// The escape character, if this writer escapes with one.
    fn escape_char(&self) -> Option<char> {
        if self.double_quote {
            None
        } else {
            Some(self.escape)
        }
    }

    /// Finds the next character in `field` that must be escaped.
    fn find_special(&self, field: &str) -> Option<usize> {
        let hay = field.as_bytes();
        match self.escape_char() {
            None => {
                let mut buf = [0; 4];
                let quote = self.quote.encode_utf8(&mut buf).as_bytes();
                if quote.len() == 1 {
                    memchr(quote[0], hay)
                } else {
                    memmem::find(hay, quote)
                }
            }
            Some(esc) if self.quote.is_ascii() && esc.is_ascii() => {
                memchr2(self.quote as u8, esc as u8, hay)
            }
            Some(esc) => field.find(|c| c == self.quote || c == esc),
        }
    }
}

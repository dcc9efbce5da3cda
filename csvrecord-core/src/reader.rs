use core::fmt;

use crate::{ConfigError, Roles, Terminator};

/// A pull based CSV field parser.
///
/// This parser reads CSV data using a small finite state machine driven one
/// character at a time. Callers feed it chunks of input with `read_field`
/// and collect field data as it is produced. Between calls, the only thing
/// the parser remembers is its current state, so input may be split at any
/// character boundary.
///
/// # Differences from RFC 4180
///
/// * CRLF, LF and CR are each treated as a single record terminator by
///   default.
/// * Records are permitted to be of varying length.
/// * A quote only opens a quoted field when it is the very first character
///   of that field. Anywhere else it is an ordinary character.
/// * Empty lines are data. Each one is a record with a single empty field.
///
/// # Malformed input
///
/// Two conditions are reported as malformed: the end of input inside an
/// open quote, and a character other than a delimiter, terminator or
/// escaping quote immediately after a closing quote. The latter may be
/// tolerated with `ReaderBuilder::lenient`, in which case the character is
/// kept and the field continues unquoted.
#[derive(Clone, Debug)]
pub struct Reader {
    /// The current state of the parser.
    state: NfaState,
    /// The delimiter that separates fields.
    delimiter: char,
    /// The terminator that separates records.
    term: Terminator,
    /// The quotation character.
    quote: char,
    /// Whether to recognize escaped quotes.
    escape: Option<char>,
    /// Whether to recognize doubled quotes.
    double_quote: bool,
    /// Whether to keep characters that trail a closing quote.
    lenient: bool,
}

impl Default for Reader {
    fn default() -> Reader {
        Reader {
            state: NfaState::StartRecord,
            delimiter: ',',
            term: Terminator::default(),
            quote: '"',
            escape: None,
            double_quote: true,
            lenient: false,
        }
    }
}

/// Builds a CSV parser with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, record terminator
/// and more for parsing CSV. Once a CSV `Reader` is built, its configuration
/// cannot be changed.
#[derive(Debug, Default)]
pub struct ReaderBuilder {
    rdr: Reader,
}

impl ReaderBuilder {
    /// Create a new builder.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV parser from this configuration.
    ///
    /// This fails if two roles share a character (for example, if the
    /// delimiter and the quote are both `'`), or if a role is given a
    /// control character it cannot use.
    pub fn build(&self) -> Result<Reader, ConfigError> {
        let rdr = &self.rdr;
        Roles::new(rdr.delimiter, rdr.quote, rdr.escape, rdr.term)
            .validate()?;
        let mut rdr = rdr.clone();
        rdr.reset();
        Ok(rdr)
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.rdr.delimiter = delimiter;
        self
    }

    /// The record terminator to use when parsing CSV.
    ///
    /// A record terminator can be any single character. The default is a
    /// special value, `Terminator::CRLF`, which treats any occurrence of
    /// `\r`, `\n` or `\r\n` as a single record terminator.
    pub fn terminator(&mut self, term: Terminator) -> &mut ReaderBuilder {
        self.rdr.term = term;
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut ReaderBuilder {
        self.rdr.quote = quote;
        self
    }

    /// The escape character to use when parsing CSV.
    ///
    /// In some variants of CSV, quotes are escaped using a special escape
    /// character like `\` (instead of escaping quotes by doubling them).
    ///
    /// By default, recognizing these idiosyncratic escapes is disabled.
    pub fn escape(&mut self, escape: Option<char>) -> &mut ReaderBuilder {
        self.rdr.escape = escape;
        self
    }

    /// Enable double quote escapes.
    ///
    /// This is enabled by default, but it may be disabled. When disabled,
    /// doubled quotes are not interpreted as escapes.
    pub fn double_quote(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.rdr.double_quote = yes;
        self
    }

    /// Tolerate characters that follow a closing quote.
    ///
    /// By default, `"ab"c` is malformed. When this is enabled, it parses as
    /// the field `abc`.
    pub fn lenient(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.rdr.lenient = yes;
        self
    }

    /// A convenience method for specifying a configuration to read ASCII
    /// delimited text.
    ///
    /// This sets the delimiter and record terminator to the ASCII unit
    /// separator (`\x1F`) and record separator (`\x1E`), respectively.
    pub fn ascii(&mut self) -> &mut ReaderBuilder {
        self.delimiter('\x1F').terminator(Terminator::Any('\x1E'))
    }
}

/// The result of parsing at most one field from CSV data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadFieldResult {
    /// The caller provided input was exhausted before the end of a field or
    /// record was found.
    InputEmpty,
    /// The end of a field was found.
    ///
    /// Note that when `record_end` is true, then the end of this field also
    /// corresponds to the end of a record.
    Field {
        /// Whether this was the last field in a record or not.
        record_end: bool,
    },
    /// The input is malformed at the point where parsing stopped.
    ///
    /// The number of bytes reported alongside this result excludes the
    /// offending character.
    Malformed(Malformed),
    /// All CSV data has been read.
    ///
    /// This state can only be returned when an empty input buffer is provided
    /// by the caller.
    End,
}

impl ReadFieldResult {
    fn from_nfa(state: NfaState) -> ReadFieldResult {
        match state {
            NfaState::End => ReadFieldResult::End,
            NfaState::EndRecord | NfaState::CRLF => {
                ReadFieldResult::Field { record_end: true }
            }
            NfaState::EndFieldDelim => {
                ReadFieldResult::Field { record_end: false }
            }
            _ => {
                assert!(!state.is_field_final());
                ReadFieldResult::InputEmpty
            }
        }
    }
}

/// The result of looking for the start of the next record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PeekResult {
    /// The input was exhausted while skipping the tail of the previous
    /// record's terminator. Call again with more input.
    InputEmpty,
    /// Another record follows.
    Record,
    /// All CSV data has been read.
    End,
}

/// The ways in which CSV data can be malformed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Malformed {
    /// The data ended while a quoted field was still open.
    UnterminatedQuote,
    /// A closing quote was followed by something other than a delimiter,
    /// a record terminator or another quote.
    TrailingCharacter {
        /// The character found after the closing quote.
        ch: char,
    },
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Malformed::UnterminatedQuote => {
                write!(f, "quoted field is never closed")
            }
            Malformed::TrailingCharacter { ch } => write!(
                f,
                "unexpected character {:?} after closing quote",
                ch
            ),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum NfaState {
    StartRecord,
    StartField,
    InField,
    InQuotedField,
    InEscapedQuote,
    InDoubleEscapedQuote,
    EndFieldDelim,
    EndFieldTerm,
    InRecordTerm,
    EndRecord,
    CRLF,
    End,
}

impl NfaState {
    fn is_field_final(&self) -> bool {
        match *self {
            NfaState::End
            | NfaState::EndRecord
            | NfaState::CRLF
            | NfaState::EndFieldDelim => true,
            _ => false,
        }
    }
}

impl Reader {
    /// Create a new CSV parser with a default configuration.
    pub fn new() -> Reader {
        Reader::default()
    }

    /// Reset the parser such that it behaves as if it had never been used.
    pub fn reset(&mut self) {
        self.state = NfaState::StartRecord;
    }

    /// Returns true if and only if the end of the CSV data was reached.
    pub fn is_done(&self) -> bool {
        self.state == NfaState::End
    }

    /// Returns true if the parser sits between two records, that is, no
    /// field of a new record has been started yet.
    pub fn is_record_boundary(&self) -> bool {
        match self.state {
            NfaState::StartRecord
            | NfaState::EndRecord
            | NfaState::CRLF
            | NfaState::End => true,
            _ => false,
        }
    }

    /// Parse CSV data in `input` and append field data to `output`.
    ///
    /// Field data appended to `output` has its quotes removed and its
    /// escapes resolved. The caller is responsible for clearing `output`
    /// between fields.
    ///
    /// Calling this routine parses at most a single field and returns two
    /// values. The first, a `ReadFieldResult`, tells the caller what to do
    /// next. The second is the number of bytes consumed from `input`, which
    /// always falls on a character boundary.
    ///
    /// # Termination
    ///
    /// This parser interprets an empty `input` buffer as an indication that
    /// there is no CSV data left to read. Namely, when the caller has
    /// exhausted all CSV data, the caller should continue to call
    /// `read_field` with an empty input buffer until `ReadFieldResult::End`
    /// is returned.
    ///
    /// # Errors
    ///
    /// When the input is malformed, `ReadFieldResult::Malformed` is
    /// returned and the parser's state is left where it was before the
    /// offending character.
    pub fn read_field(
        &mut self,
        input: &str,
        output: &mut String,
    ) -> (ReadFieldResult, usize) {
        if input.is_empty() {
            return match self.transition_final(self.state) {
                Ok(s) => {
                    self.state = s;
                    (ReadFieldResult::from_nfa(s), 0)
                }
                Err(err) => (ReadFieldResult::Malformed(err), 0),
            };
        }
        let mut nin = 0;
        let mut state = self.state;
        while let Some(c) = input[nin..].chars().next() {
            let (s, consumed, has_out) = match self.transition(state, c) {
                Ok(t) => t,
                Err(err) => {
                    self.state = state;
                    return (ReadFieldResult::Malformed(err), nin);
                }
            };
            if has_out {
                output.push(c);
            }
            if consumed {
                nin += c.len_utf8();
            }
            state = s;
            if state.is_field_final() {
                break;
            }
        }
        self.state = state;
        (ReadFieldResult::from_nfa(state), nin)
    }

    /// Move past the end of the previous record and report whether another
    /// record follows.
    ///
    /// This never consumes any part of the next record. The only input it
    /// may consume is the `\n` of a `\r\n` terminator whose `\r` ended the
    /// previous record. As with `read_field`, an empty `input` means that
    /// there is no more data.
    pub fn peek_record(&mut self, input: &str) -> (PeekResult, usize) {
        let mut nin = 0;
        loop {
            match self.state {
                NfaState::End => return (PeekResult::End, nin),
                NfaState::EndRecord => self.state = NfaState::StartRecord,
                NfaState::CRLF => {
                    if input.is_empty() {
                        self.state = NfaState::End;
                        return (PeekResult::End, 0);
                    }
                    if input.starts_with('\n') {
                        nin = 1;
                    }
                    self.state = NfaState::StartRecord;
                }
                NfaState::StartRecord => {
                    return if input.is_empty() {
                        self.state = NfaState::End;
                        (PeekResult::End, nin)
                    } else if nin == input.len() {
                        (PeekResult::InputEmpty, nin)
                    } else {
                        (PeekResult::Record, nin)
                    };
                }
                _ => return (PeekResult::Record, nin),
            }
        }
    }

    #[inline(always)]
    fn transition_final(&self, state: NfaState) -> Result<NfaState, Malformed> {
        use self::NfaState::*;
        match state {
            End | StartRecord | EndRecord | CRLF => Ok(End),
            StartField | EndFieldDelim | EndFieldTerm | InField
            | InDoubleEscapedQuote | InRecordTerm => Ok(EndRecord),
            InQuotedField | InEscapedQuote => {
                Err(Malformed::UnterminatedQuote)
            }
        }
    }

    /// Returns the next state, whether `c` was consumed and whether `c`
    /// belongs to the current field's data.
    #[inline(always)]
    fn transition(
        &self,
        state: NfaState,
        c: char,
    ) -> Result<(NfaState, bool, bool), Malformed> {
        use self::NfaState::*;
        let next = match state {
            End => (End, false, false),
            StartRecord => (StartField, false, false),
            EndRecord => (StartRecord, false, false),
            StartField => {
                if self.quote == c {
                    (InQuotedField, true, false)
                } else if self.delimiter == c {
                    (EndFieldDelim, true, false)
                } else if self.term == c {
                    (EndFieldTerm, false, false)
                } else {
                    (InField, true, true)
                }
            }
            EndFieldDelim => (StartField, false, false),
            EndFieldTerm => (InRecordTerm, false, false),
            InField => {
                if self.delimiter == c {
                    (EndFieldDelim, true, false)
                } else if self.term == c {
                    (EndFieldTerm, false, false)
                } else {
                    (InField, true, true)
                }
            }
            InQuotedField => {
                if self.quote == c {
                    (InDoubleEscapedQuote, true, false)
                } else if self.escape == Some(c) {
                    (InEscapedQuote, true, false)
                } else {
                    (InQuotedField, true, true)
                }
            }
            InEscapedQuote => (InQuotedField, true, true),
            InDoubleEscapedQuote => {
                if self.double_quote && self.quote == c {
                    (InQuotedField, true, true)
                } else if self.delimiter == c {
                    (EndFieldDelim, true, false)
                } else if self.term == c {
                    (EndFieldTerm, false, false)
                } else if self.lenient {
                    (InField, true, true)
                } else {
                    return Err(Malformed::TrailingCharacter { ch: c });
                }
            }
            InRecordTerm => {
                if self.term.is_crlf() && '\r' == c {
                    (CRLF, true, false)
                } else {
                    (EndRecord, true, false)
                }
            }
            CRLF => {
                if '\n' == c {
                    (StartRecord, true, false)
                } else {
                    (StartRecord, false, false)
                }
            }
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use arrayvec::{ArrayString, ArrayVec};

    use super::{
        Malformed, PeekResult, ReadFieldResult, Reader, ReaderBuilder,
    };
    use crate::{ConfigError, Terminator};

    type Csv = ArrayVec<Row, 10>;
    type Row = ArrayVec<Field, 10>;
    type Field = ArrayString<32>;

    macro_rules! csv {
        ($([$($field:expr),*]),*) => {{
            #[allow(unused_mut)]
            fn x() -> Csv {
                let mut csv = Csv::new();
                $(
                    let mut row = Row::new();
                    $(
                        row.push(Field::from($field).unwrap());
                    )*
                    csv.push(row);
                )*
                csv
            }
            x()
        }}
    }

    macro_rules! parses_to {
        ($name:ident, $data:expr, $expected:expr) => {
            parses_to!($name, $data, $expected, |builder| builder);
        };
        ($name:ident, $data:expr, $expected:expr, $config:expr) => {
            #[test]
            fn $name() {
                let mut builder = ReaderBuilder::new();
                $config(&mut builder);
                let mut rdr = builder.build().unwrap();
                let got = parse_whole(&mut rdr, $data);
                assert_eq!(Ok($expected), got, "whole input");

                let mut builder = ReaderBuilder::new();
                $config(&mut builder);
                let mut rdr = builder.build().unwrap();
                let got = parse_by_char(&mut rdr, $data);
                assert_eq!(Ok($expected), got, "one char at a time");
            }
        };
    }

    macro_rules! fails_with {
        ($name:ident, $data:expr, $expected:expr) => {
            fails_with!($name, $data, $expected, |builder| builder);
        };
        ($name:ident, $data:expr, $expected:expr, $config:expr) => {
            #[test]
            fn $name() {
                let mut builder = ReaderBuilder::new();
                $config(&mut builder);
                let mut rdr = builder.build().unwrap();
                assert_eq!(Err($expected), parse_whole(&mut rdr, $data));

                let mut builder = ReaderBuilder::new();
                $config(&mut builder);
                let mut rdr = builder.build().unwrap();
                assert_eq!(Err($expected), parse_by_char(&mut rdr, $data));
            }
        };
    }

    fn parse_whole(rdr: &mut Reader, data: &str) -> Result<Csv, Malformed> {
        parse_chunks(rdr, &[data])
    }

    fn parse_by_char(rdr: &mut Reader, data: &str) -> Result<Csv, Malformed> {
        let chunks: Vec<&str> = data
            .char_indices()
            .map(|(i, c)| &data[i..i + c.len_utf8()])
            .collect();
        parse_chunks(rdr, &chunks)
    }

    fn parse_chunks(
        rdr: &mut Reader,
        chunks: &[&str],
    ) -> Result<Csv, Malformed> {
        let mut chunks = chunks.iter().copied().filter(|c| !c.is_empty());
        let mut data = "";
        let mut field = String::new();
        let mut csv = Csv::new();
        let mut row = Row::new();
        loop {
            // An empty chunk means EOF, so only hand one over when every
            // chunk has been used up.
            if data.is_empty() {
                data = chunks.next().unwrap_or("");
            }
            let (res, nin) = rdr.read_field(data, &mut field);
            data = &data[nin..];
            match res {
                ReadFieldResult::InputEmpty => {
                    if !data.is_empty() {
                        panic!("missing input data")
                    }
                }
                ReadFieldResult::Field { record_end } => {
                    row.push(Field::from(&field).unwrap());
                    field.clear();
                    if record_end {
                        csv.push(row);
                        row = Row::new();
                    }
                }
                ReadFieldResult::Malformed(err) => return Err(err),
                ReadFieldResult::End => return Ok(csv),
            }
        }
    }

    parses_to!(one_row_one_field, "a", csv![["a"]]);
    parses_to!(one_row_many_fields, "a,b,c", csv![["a", "b", "c"]]);
    parses_to!(one_row_trailing_comma, "a,b,", csv![["a", "b", ""]]);
    parses_to!(one_row_one_field_lf, "a\n", csv![["a"]]);
    parses_to!(one_row_many_fields_lf, "a,b,c\n", csv![["a", "b", "c"]]);
    parses_to!(one_row_trailing_comma_lf, "a,b,\n", csv![["a", "b", ""]]);
    parses_to!(one_row_one_field_crlf, "a\r\n", csv![["a"]]);
    parses_to!(one_row_many_fields_crlf, "a,b,c\r\n", csv![["a", "b", "c"]]);
    parses_to!(one_row_trailing_comma_crlf, "a,b,\r\n", csv![["a", "b", ""]]);
    parses_to!(one_row_one_field_cr, "a\r", csv![["a"]]);
    parses_to!(one_row_many_fields_cr, "a,b,c\r", csv![["a", "b", "c"]]);

    parses_to!(many_rows_one_field, "a\nb", csv![["a"], ["b"]]);
    parses_to!(
        many_rows_many_fields,
        "a,b,c\nx,y,z",
        csv![["a", "b", "c"], ["x", "y", "z"]]
    );
    parses_to!(
        many_rows_trailing_comma_lf,
        "a,b,\nx,y,\n",
        csv![["a", "b", ""], ["x", "y", ""]]
    );
    parses_to!(many_rows_one_field_crlf, "a\r\nb\r\n", csv![["a"], ["b"]]);
    parses_to!(many_rows_one_field_cr, "a\rb\r", csv![["a"], ["b"]]);

    parses_to!(empty, "", csv![]);
    parses_to!(blank_line, "\n", csv![[""]]);
    parses_to!(blank_line_crlf, "\r\n", csv![[""]]);
    parses_to!(blank_lines, "\n\n", csv![[""], [""]]);
    parses_to!(
        blank_lines_interspersed,
        "a,b\n\nx,y\n",
        csv![["a", "b"], [""], ["x", "y"]]
    );
    parses_to!(
        blank_lines_interspersed_crlf,
        "a,b\r\n\r\nx,y\r\n",
        csv![["a", "b"], [""], ["x", "y"]]
    );
    parses_to!(cr_then_crlf, "a\r\r\n", csv![["a"], [""]]);

    parses_to!(
        term_weird,
        "a,bzc,dz",
        csv![["a", "b"], ["c", "d"]],
        |b: &mut ReaderBuilder| {
            b.terminator(Terminator::Any('z'));
        }
    );
    parses_to!(
        term_any_keeps_cr,
        "a\r\nb\n",
        csv![["a\r"], ["b"]],
        |b: &mut ReaderBuilder| {
            b.terminator(Terminator::Any('\n'));
        }
    );
    parses_to!(
        ascii_delimited,
        "a\x1fb\x1ec\x1fd",
        csv![["a", "b"], ["c", "d"]],
        |b: &mut ReaderBuilder| {
            b.ascii();
        }
    );

    parses_to!(quote_empty, "\"\"", csv![[""]]);
    parses_to!(quote_lf, "\"\"\n", csv![[""]]);
    parses_to!(quote_space, "\" \"", csv![[" "]]);
    parses_to!(quote_inner_space, "\" a \"", csv![[" a "]]);
    parses_to!(quote_outer_space, "  \"a\"  ", csv![["  \"a\"  "]]);
    parses_to!(quote_mid_field, "ab\"c\",d", csv![["ab\"c\"", "d"]]);
    parses_to!(quote_delimiter, "a,\"b,c\",d\n", csv![["a", "b,c", "d"]]);
    parses_to!(quote_doubled, "a,\"b\"\"c\",d\n", csv![["a", "b\"c", "d"]]);
    parses_to!(
        quote_multi_line,
        "a,\"line1\nline2\",b\n",
        csv![["a", "line1\nline2", "b"]]
    );
    parses_to!(
        quote_multi_line_crlf,
        "\"x\r\ny\"\r\nz\r\n",
        csv![["x\r\ny"], ["z"]]
    );
    parses_to!(quote_last_field_eof, "a,\"b\"", csv![["a", "b"]]);

    parses_to!(quote_change, "zaz", csv![["a"]], |b: &mut ReaderBuilder| {
        b.quote('z');
    });
    parses_to!(quote_unicode, "«a,b«,c", csv![["a,b", "c"]], |b: &mut ReaderBuilder| {
        b.quote('«');
    });
    parses_to!(
        delimiter_unicode,
        "a§b§\"c§d\"",
        csv![["a", "b", "c§d"]],
        |b: &mut ReaderBuilder| {
            b.delimiter('§');
        }
    );

    parses_to!(quote_no_escapes, r#""a\"b""#, csv![[r#"a\b""#]], |b: &mut ReaderBuilder| {
        b.lenient(true);
    });
    parses_to!(
        quote_escapes_no_double,
        r#""a""b""#,
        csv![[r#"a"b""#]],
        |b: &mut ReaderBuilder| {
            b.double_quote(false).lenient(true);
        }
    );
    parses_to!(
        quote_escapes,
        r#""a\"b""#,
        csv![[r#"a"b"#]],
        |b: &mut ReaderBuilder| {
            b.escape(Some('\\'));
        }
    );
    parses_to!(
        quote_escapes_change,
        r#""az"b""#,
        csv![[r#"a"b"#]],
        |b: &mut ReaderBuilder| {
            b.escape(Some('z'));
        }
    );
    parses_to!(
        lenient_trailing,
        "\"ab\"c,d",
        csv![["abc", "d"]],
        |b: &mut ReaderBuilder| {
            b.lenient(true);
        }
    );

    parses_to!(delimiter_tabs, "a\tb", csv![["a", "b"]], |b: &mut ReaderBuilder| {
        b.delimiter('\t');
    });

    fails_with!(unterminated, "a,\"unterminated\n", Malformed::UnterminatedQuote);
    fails_with!(unterminated_escape, "\"a\\", Malformed::UnterminatedQuote, |b: &mut ReaderBuilder| {
        b.escape(Some('\\'));
    });
    fails_with!(
        trailing_after_quote,
        "\"ab\"c,d",
        Malformed::TrailingCharacter { ch: 'c' }
    );
    fails_with!(
        trailing_space_after_quote,
        "\"ab\" ,d",
        Malformed::TrailingCharacter { ch: ' ' }
    );
    fails_with!(
        doubled_without_double_quote,
        r#""a""b""#,
        Malformed::TrailingCharacter { ch: '"' },
        |b: &mut ReaderBuilder| {
            b.double_quote(false);
        }
    );

    // The reported byte count stops right before the offending character.
    #[test]
    fn malformed_consumed_count() {
        let mut rdr = Reader::new();
        let mut field = String::new();
        let (res, nin) = rdr.read_field("\"ab\"c", &mut field);
        assert_eq!(
            ReadFieldResult::Malformed(Malformed::TrailingCharacter {
                ch: 'c'
            }),
            res
        );
        assert_eq!(4, nin);
        assert_eq!("ab", field);
    }

    #[test]
    fn stream_empty() {
        let mut rdr = Reader::new();
        let mut field = String::new();
        assert_eq!((ReadFieldResult::End, 0), rdr.read_field("", &mut field));
        assert!(rdr.is_done());
    }

    #[test]
    fn stream_field_by_field() {
        use super::ReadFieldResult::*;

        let mut rdr = Reader::new();
        let mut field = String::new();
        let inp = "ab,cd\n";
        assert_eq!((Field { record_end: false }, 3), rdr.read_field(inp, &mut field));
        assert_eq!("ab", field);
        field.clear();
        assert_eq!(
            (Field { record_end: true }, 3),
            rdr.read_field(&inp[3..], &mut field)
        );
        assert_eq!("cd", field);
        field.clear();
        assert_eq!((End, 0), rdr.read_field("", &mut field));
    }

    #[test]
    fn peek_skips_crlf_tail() {
        let mut rdr = Reader::new();
        let mut field = String::new();
        let (res, nin) = rdr.read_field("a\r\nb", &mut field);
        assert_eq!(ReadFieldResult::Field { record_end: true }, res);
        assert_eq!(2, nin);
        assert!(rdr.is_record_boundary());
        assert_eq!((PeekResult::Record, 1), rdr.peek_record("\nb"));
        assert_eq!((PeekResult::Record, 0), rdr.peek_record("b"));
    }

    #[test]
    fn peek_needs_more_after_crlf_tail() {
        let mut rdr = Reader::new();
        let mut field = String::new();
        rdr.read_field("a\r", &mut field);
        assert_eq!((PeekResult::InputEmpty, 1), rdr.peek_record("\n"));
        assert_eq!((PeekResult::End, 0), rdr.peek_record(""));
        assert!(rdr.is_done());
    }

    #[test]
    fn peek_blank_line_is_record() {
        let mut rdr = Reader::new();
        assert_eq!((PeekResult::Record, 0), rdr.peek_record("\n"));
    }

    #[test]
    fn reset_works() {
        let mut rdr = Reader::new();
        let mut field = String::new();
        rdr.read_field("\"foo", &mut field);
        assert!(!rdr.is_record_boundary());
        rdr.reset();
        field.clear();
        assert_eq!(
            (ReadFieldResult::Field { record_end: false }, 2),
            rdr.read_field("x,", &mut field)
        );
        assert_eq!("x", field);
    }

    #[test]
    fn config_rejects_same_delimiter_and_quote() {
        let err = ReaderBuilder::new().delimiter('"').build().unwrap_err();
        assert_eq!(
            ConfigError::Conflict {
                ch: '"',
                first: "delimiter",
                second: "quote"
            },
            err
        );
    }

    #[test]
    fn config_rejects_control_characters() {
        let err = ReaderBuilder::new().quote('\0').build().unwrap_err();
        assert_eq!(ConfigError::ControlCharacter { ch: '\0', role: "quote" }, err);
        let err = ReaderBuilder::new().delimiter('\n').build().unwrap_err();
        assert_eq!(
            ConfigError::ControlCharacter { ch: '\n', role: "delimiter" },
            err
        );
        assert!(ReaderBuilder::new().delimiter('\t').build().is_ok());
    }

    #[test]
    fn config_rejects_terminator_conflict() {
        let err = ReaderBuilder::new()
            .terminator(Terminator::Any(';'))
            .delimiter(';')
            .build()
            .unwrap_err();
        assert_eq!(
            ConfigError::Conflict {
                ch: ';',
                first: "delimiter",
                second: "terminator"
            },
            err
        );
    }
}

/*!
The `csvrecord` crate provides a streaming reader and writer for CSV data
made of string records.

Reading pulls characters from any `io::Read`, runs them through the
character level state machine in
[`csvrecord-core`](https://docs.rs/csvrecord-core), and hands back one
[`Record`](struct.Record.html) at a time. Writing goes the other way, quoting
fields only as needed so that reading the output back with the same
configuration reproduces the same records.

# Example

```
use std::error::Error;
use csvrecord::{ReaderBuilder, Writer};

# fn main() { example().unwrap(); }
fn example() -> Result<(), Box<dyn Error>> {
    let data = "\
name,note
ann,\"likes \"\"quotes\"\", and commas\"
bob,\"two
lines\"
";
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes())?;
    let mut wtr = Writer::from_writer(vec![]);
    if let Some(headers) = rdr.headers()? {
        wtr.write_headers(headers)?;
    }
    for result in rdr.records() {
        let record = result?;
        wtr.write_record(&record)?;
    }
    let out = String::from_utf8(wtr.into_inner()?)?;
    assert_eq!(
        out,
        "name,note\r\n\
         ann,\"likes \"\"quotes\"\", and commas\"\r\n\
         bob,\"two\nlines\"\r\n",
    );
    Ok(())
}
```

# Errors

Malformed CSV data (a quoted field that is never closed, or a stray
character after a closing quote) stops a reader for good: the error reports
where the problem was found, and every later read fails with
`Error::Poisoned`. Characters that follow a closing quote may be tolerated
with `ReaderBuilder::lenient`.

Configuration problems, like a delimiter that is also the quote character,
are reported when a reader or writer is built, before any I/O happens.

# Logging

This crate emits a few `debug` and `trace` level messages through the
[`log`](https://docs.rs/log) facade when it reads headers or gives up on
malformed data. It never installs a logger itself.
*/

pub use csvrecord_core::{ConfigError, Malformed, QuoteStyle, Terminator};

pub use crate::error::{Error, IntoInnerError, Result};
pub use crate::header::HeaderRecord;
pub use crate::reader::{Reader, ReaderBuilder, RecordsIntoIter, RecordsIter};
pub use crate::record::{Record, RecordIter};
pub use crate::source::{CharacterSource, Position};
pub use crate::writer::{Writer, WriterBuilder};

mod error;
mod header;
mod reader;
mod record;
#[cfg(feature = "serde")]
mod serde_impl;
mod source;
mod writer;

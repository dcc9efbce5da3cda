/*!
`csvrecord-core` provides the state machines underneath `csvrecord`: a
resumable, character oriented CSV field parser and a field quoting engine.

Neither performs any I/O. The parser is handed `&str` chunks of input and
reports how many bytes of each chunk it consumed, so a caller can feed it
from any source, one character or one megabyte at a time. All of the
parser's state lives in a single enum value, which means it can stop at any
character boundary and pick up again later without losing anything.

An empty input chunk is the parser's signal that the end of the data has
been reached.

# Example

```
use csvrecord_core::{ReadFieldResult, Reader};

let mut rdr = Reader::new();
let mut input = "a,\"b,c\"\n";
let mut field = String::new();
let mut fields = vec![];
loop {
    let (res, nin) = rdr.read_field(input, &mut field);
    input = &input[nin..];
    match res {
        ReadFieldResult::InputEmpty => {}
        ReadFieldResult::Field { .. } => {
            fields.push(field.clone());
            field.clear();
        }
        ReadFieldResult::Malformed(err) => panic!("{}", err),
        ReadFieldResult::End => break,
    }
}
assert_eq!(fields, vec!["a", "b,c"]);
```
*/

use core::fmt;

pub use crate::reader::{
    Malformed, PeekResult, ReadFieldResult, Reader, ReaderBuilder,
};
pub use crate::writer::{QuoteStyle, WriteResult, Writer, WriterBuilder};

mod reader;
mod writer;

/// A record terminator.
///
/// Use this to specify the record terminator while parsing or writing CSV.
/// The default is CRLF. When parsing, CRLF treats `\r`, `\n` or `\r\n` as a
/// single record terminator. When writing, CRLF emits `\r\n`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// Parses `\r`, `\n` or `\r\n` as a single record terminator.
    CRLF,
    /// Parses the character given as a record terminator.
    Any(char),
}

impl Terminator {
    /// Returns true if and only if this is the CRLF terminator.
    pub fn is_crlf(&self) -> bool {
        match *self {
            Terminator::CRLF => true,
            Terminator::Any(_) => false,
        }
    }
}

impl Default for Terminator {
    fn default() -> Terminator {
        Terminator::CRLF
    }
}

impl PartialEq<char> for Terminator {
    #[inline]
    fn eq(&self, &other: &char) -> bool {
        match *self {
            Terminator::CRLF => other == '\r' || other == '\n',
            Terminator::Any(c) => other == c,
        }
    }
}

/// An error that occurs when a parser or writer is configured with
/// characters that cannot work together.
///
/// These are reported by `build` on the respective builders, before any
/// input is looked at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Two roles (e.g., delimiter and quote) were assigned the same
    /// character.
    Conflict {
        /// The character assigned to more than one role.
        ch: char,
        /// The first role.
        first: &'static str,
        /// The second role.
        second: &'static str,
    },
    /// A role was assigned a control character (or a line break) that it
    /// may not use.
    ControlCharacter {
        /// The offending character.
        ch: char,
        /// The role it was assigned to.
        role: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigError::Conflict { ch, first, second } => write!(
                f,
                "{} and {} must differ, but both are {:?}",
                first, second, ch
            ),
            ConfigError::ControlCharacter { ch, role } => {
                write!(f, "{} cannot be the control character {:?}", role, ch)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Roles that a special character can play, in the order they are checked.
pub(crate) struct Roles {
    roles: [Option<(&'static str, char)>; 4],
}

impl Roles {
    pub(crate) fn new(
        delimiter: char,
        quote: char,
        escape: Option<char>,
        term: Terminator,
    ) -> Roles {
        let term = match term {
            Terminator::CRLF => None,
            Terminator::Any(c) => Some(("terminator", c)),
        };
        Roles {
            roles: [
                Some(("delimiter", delimiter)),
                Some(("quote", quote)),
                escape.map(|c| ("escape", c)),
                term,
            ],
        }
    }

    /// Checks that no two roles share a character and that none of them
    /// uses a control character it has no business using.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let roles: Vec<(&'static str, char)> =
            self.roles.iter().filter_map(|r| *r).collect();
        for &(role, ch) in &roles {
            let allowed = match role {
                "delimiter" => ch == '\t' || ch == '\x1F',
                "terminator" => true,
                _ => false,
            };
            let line_break = ch == '\r' || ch == '\n';
            if (ch.is_control() && !allowed)
                || (line_break && role != "terminator")
            {
                return Err(ConfigError::ControlCharacter { ch, role });
            }
        }
        for (i, &(first, a)) in roles.iter().enumerate() {
            for &(second, b) in &roles[i + 1..] {
                if a == b {
                    return Err(ConfigError::Conflict {
                        ch: a,
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }
}

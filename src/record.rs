use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops;
use std::slice;

use crate::error::{Error, Result};

/// The character that follows each field in a record's `Display` output.
const DISPLAY_SEPARATOR: char = '\u{2022}';

/// A single CSV record: an ordered list of string fields.
///
/// Records are created by a `Reader` (one per parsed row) or by callers who
/// want to hand them to a `Writer`. A record may be made read-only, after
/// which every mutating method fails with `Error::ReadOnly`. There is no way
/// to make a read-only record writable again, other than cloning its fields
/// into a new one.
///
/// Equality and hashing only look at the fields, so a read-only record
/// equals a writable record with the same fields.
#[derive(Clone, Default)]
pub struct Record {
    fields: Vec<String>,
    read_only: bool,
}

impl Record {
    /// Create a new empty, writable record.
    pub fn new() -> Record {
        Record::default()
    }

    /// Create a new empty record with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Record {
        Record { fields: Vec::with_capacity(capacity), read_only: false }
    }

    /// Create a read-only record from the given fields.
    pub fn read_only<I, T>(fields: I) -> Record
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut record: Record = fields.into_iter().map(Into::into).collect();
        record.make_read_only();
        record
    }

    /// Returns true if and only if this record cannot be changed.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Prevent any further changes to this record.
    pub fn make_read_only(&mut self) {
        self.read_only = true;
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.fields.get(i).map(|f| &**f)
    }

    /// Returns true if and only if this record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> RecordIter {
        RecordIter(self.fields.iter())
    }

    /// Returns all fields in this record as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.fields
    }

    /// Returns a copy of all fields in this record.
    pub fn to_vec(&self) -> Vec<String> {
        self.fields.clone()
    }

    /// Returns true if a field equal to `value` exists in this record.
    ///
    /// Comparison is exact: no case folding or trimming is done.
    pub fn contains(&self, value: &str) -> bool {
        self.index_of(value).is_some()
    }

    /// Returns the index of the first field equal to `value`.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == value)
    }

    /// Replace the field at index `i`.
    pub fn set<T: Into<String>>(&mut self, i: usize, value: T) -> Result<()> {
        self.check_writable()?;
        let len = self.len();
        match self.fields.get_mut(i) {
            None => Err(Error::IndexOutOfRange { index: i, len }),
            Some(field) => {
                *field = value.into();
                Ok(())
            }
        }
    }

    /// Add a new field to the end of this record.
    pub fn push<T: Into<String>>(&mut self, value: T) -> Result<()> {
        self.check_writable()?;
        self.fields.push(value.into());
        Ok(())
    }

    /// Insert a field at index `i`, shifting all fields after it.
    ///
    /// `i` may be equal to the length of the record, in which case this is
    /// the same as `push`.
    pub fn insert<T: Into<String>>(&mut self, i: usize, value: T) -> Result<()> {
        self.check_writable()?;
        if i > self.len() {
            return Err(Error::IndexOutOfRange { index: i, len: self.len() });
        }
        self.fields.insert(i, value.into());
        Ok(())
    }

    /// Remove the first field equal to `value`.
    ///
    /// This returns whether a field was removed.
    pub fn remove(&mut self, value: &str) -> Result<bool> {
        self.check_writable()?;
        match self.index_of(value) {
            None => Ok(false),
            Some(i) => {
                self.fields.remove(i);
                Ok(true)
            }
        }
    }

    /// Remove and return the field at index `i`.
    pub fn remove_at(&mut self, i: usize) -> Result<String> {
        self.check_writable()?;
        if i >= self.len() {
            return Err(Error::IndexOutOfRange { index: i, len: self.len() });
        }
        Ok(self.fields.remove(i))
    }

    /// Clear this record so that it has zero fields.
    pub fn clear(&mut self) -> Result<()> {
        self.check_writable()?;
        self.fields.clear();
        Ok(())
    }

    /// Swap in a freshly parsed set of fields, handing the old ones back
    /// in `fields` so their allocation can be reused.
    pub(crate) fn replace_fields(&mut self, fields: &mut Vec<String>) -> Result<()> {
        self.check_writable()?;
        std::mem::swap(&mut self.fields, fields);
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            Err(Error::ReadOnly)
        } else {
            Ok(())
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for Record {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<T: AsRef<str>> PartialEq<[T]> for Record {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<T: AsRef<str>> PartialEq<Record> for Vec<T> {
    fn eq(&self, other: &Record) -> bool {
        other == self
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.read_only {
            write!(f, "Record(read-only {:?})", self.fields)
        } else {
            write!(f, "Record({:?})", self.fields)
        }
    }
}

/// Renders every field followed by `•`. This is meant for diagnostics and
/// has nothing to do with how records are written as CSV.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for field in self {
            write!(f, "{}{}", field, DISPLAY_SEPARATOR)?;
        }
        Ok(())
    }
}

impl ops::Index<usize> for Record {
    type Output = str;
    fn index(&self, i: usize) -> &str {
        self.get(i).unwrap()
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Record {
        Record { fields, read_only: false }
    }
}

impl<'a> From<Vec<&'a str>> for Record {
    fn from(fields: Vec<&'a str>) -> Record {
        fields.into_iter().collect()
    }
}

impl<'a> From<&'a [&'a str]> for Record {
    fn from(fields: &'a [&'a str]) -> Record {
        fields.iter().copied().collect()
    }
}

impl<T: Into<String>> FromIterator<T> for Record {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Record {
        Record::from(iter.into_iter().map(Into::into).collect::<Vec<String>>())
    }
}

impl From<Record> for Vec<String> {
    fn from(record: Record) -> Vec<String> {
        record.fields
    }
}

impl<'r> IntoIterator for &'r Record {
    type IntoIter = RecordIter<'r>;
    type Item = &'r str;

    fn into_iter(self) -> RecordIter<'r> {
        self.iter()
    }
}

/// An iterator over the fields in a record.
///
/// The `'r` lifetime variable refers to the lifetime of the `Record` that
/// is being iterated over.
#[derive(Clone, Debug)]
pub struct RecordIter<'r>(slice::Iter<'r, String>);

impl<'r> Iterator for RecordIter<'r> {
    type Item = &'r str;

    fn next(&mut self) -> Option<&'r str> {
        self.0.next().map(|f| &**f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'r> DoubleEndedIterator for RecordIter<'r> {
    fn next_back(&mut self) -> Option<&'r str> {
        self.0.next_back().map(|f| &**f)
    }
}

impl<'r> ExactSizeIterator for RecordIter<'r> {}

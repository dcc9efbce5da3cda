use std::collections::HashMap;

use crate::record::{Record, RecordIter};

/// The header record of CSV data, with a lookup from column name to index.
///
/// The names themselves are kept in a read-only `Record`. When the same
/// name appears in more than one column, lookups resolve to the first of
/// them.
#[derive(Clone, Debug)]
pub struct HeaderRecord {
    names: Record,
    index: HashMap<String, usize>,
}

impl HeaderRecord {
    /// Build a header mapping from a record of column names.
    ///
    /// The record is made read-only if it isn't already.
    pub fn new(mut names: Record) -> HeaderRecord {
        names.make_read_only();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.entry(name.to_string()).or_insert(i);
        }
        HeaderRecord { names, index }
    }

    /// Returns the column index of `name`, if there is such a column.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns the field of `record` that sits in the column called `name`.
    ///
    /// This returns `None` when no column is called `name`, or when
    /// `record` is too short to have a field in that column.
    pub fn get<'r>(&self, name: &str, record: &'r Record) -> Option<&'r str> {
        self.index_of(name).and_then(|i| record.get(i))
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns an iterator over the column names, in order.
    pub fn iter(&self) -> RecordIter {
        self.names.iter()
    }

    /// Returns the column names as a read-only record.
    pub fn as_record(&self) -> &Record {
        &self.names
    }
}

impl From<Record> for HeaderRecord {
    fn from(names: Record) -> HeaderRecord {
        HeaderRecord::new(names)
    }
}

impl PartialEq for HeaderRecord {
    fn eq(&self, other: &HeaderRecord) -> bool {
        self.names == other.names
    }
}

impl Eq for HeaderRecord {}

impl<'h> IntoIterator for &'h HeaderRecord {
    type IntoIter = RecordIter<'h>;
    type Item = &'h str;

    fn into_iter(self) -> RecordIter<'h> {
        self.iter()
    }
}

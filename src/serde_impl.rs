use std::fmt;

use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::header::HeaderRecord;
use crate::record::Record;

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(self.iter())
    }
}

impl Serialize for HeaderRecord {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.as_record().serialize(s)
    }
}

/// Records always deserialize as writable.
impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Record, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a sequence of strings")
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Record, A::Error> {
                let mut record =
                    Record::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(field) = seq.next_element::<String>()? {
                    // A fresh record is never read-only.
                    let _ = record.push(field);
                }
                Ok(record)
            }
        }

        d.deserialize_seq(RecordVisitor)
    }
}

impl<'de> Deserialize<'de> for HeaderRecord {
    fn deserialize<D: Deserializer<'de>>(
        d: D,
    ) -> Result<HeaderRecord, D::Error> {
        Record::deserialize(d).map(HeaderRecord::new)
    }
}

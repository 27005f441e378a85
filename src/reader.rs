//! Reader for decoded record streams.
//!
//! The binary STDF decoder lives outside this crate. It hands records over as
//! JSON Lines, one record per line:
//!
//! ```text
//! {"rec": "Pir", "fields": [1, 1]}
//! {"rec": [15, 15], "fields": [1001, 1, 1, 0, 0, 1, 1, [0], [1.5], "Vdd", null]}
//! ```
//!
//! `rec` is a record type name or its `[REC_TYP, REC_SUB]` codes. A JSON
//! `null` field is an absent value.

use memmap2::Mmap;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Record, Value};
use crate::schema::RecordType;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordTag {
    Name(String),
    Codes([u8; 2]),
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    rec: RecordTag,
    #[serde(default)]
    fields: Vec<Option<Value>>,
}

impl RawRecord {
    fn into_record(self) -> Result<Record> {
        let rec_type = match &self.rec {
            RecordTag::Name(name) => RecordType::from_name(name),
            RecordTag::Codes([typ, sub]) => RecordType::from_codes(*typ, *sub),
        }
        .ok_or_else(|| Error::SchemaMismatch(format!("unknown record type {:?}", self.rec)))?;

        if self.fields.len() > rec_type.schema().fields.len() {
            return Err(Error::SchemaMismatch(format!(
                "{} has {} fields, got {}",
                rec_type,
                rec_type.schema().fields.len(),
                self.fields.len()
            )));
        }
        Ok(Record::new(rec_type, self.fields))
    }
}

enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Source::Mapped(map) => map,
            Source::Owned(data) => data,
        }
    }
}

/// A decoded record stream held in memory or mapped from a file.
///
/// # Examples
///
/// ```no_run
/// use stdf_render::RecordStream;
///
/// let stream = RecordStream::from_file("lot42.jsonl")?;
/// for record in stream.records() {
///     let record = record?;
///     println!("{} with {} fields", record.type_name(), record.fields.len());
/// }
/// # Ok::<(), stdf_render::Error>(())
/// ```
pub struct RecordStream {
    data: Source,
}

impl RecordStream {
    /// Map a JSON Lines file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        if file.metadata()?.len() == 0 {
            // Zero-length files cannot be mapped on every platform
            return Ok(Self::from_bytes(Vec::new()));
        }
        let map = unsafe { Mmap::map(&file)? };
        Ok(Self {
            data: Source::Mapped(map),
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data: Source::Owned(data),
        }
    }

    /// Read a whole stream, e.g. standard input, into memory.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes(data))
    }

    /// Records in stream order. Blank lines are skipped.
    pub fn records(&self) -> Records<'_> {
        let is_newline: fn(&u8) -> bool = |&b| b == b'\n';
        Records {
            lines: self.data.split(is_newline).enumerate(),
        }
    }
}

/// Iterator over the records of a [`RecordStream`].
pub struct Records<'a> {
    lines: std::iter::Enumerate<std::slice::Split<'a, u8, fn(&u8) -> bool>>,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        for (i, line) in self.lines.by_ref() {
            let line_no = i + 1;
            let line = match std::str::from_utf8(line) {
                Ok(text) => text.trim(),
                Err(e) => {
                    return Some(Err(Error::InvalidInput(format!(
                        "line {}: {}",
                        line_no, e
                    ))))
                }
            };
            if line.is_empty() {
                continue;
            }

            let parsed = serde_json::from_str::<RawRecord>(line)
                .map_err(|e| Error::InvalidInput(format!("line {}: {}", line_no, e)))
                .and_then(RawRecord::into_record);
            return Some(parsed);
        }
        None
    }
}

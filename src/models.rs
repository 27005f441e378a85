use serde::Deserialize;
use std::fmt;

use crate::schema::{RecordSchema, RecordType};

/// Output encoding selected for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// ASCII test data format: `TypeName:field|field|...`
    Atdf,
    /// `<Stdf>` document with one self-closing element per record
    Xml,
    /// Pivoted per-part test-result report
    Csv,
}

impl Encoding {
    /// Separator used between the elements of a generic data record.
    pub fn generic_separator(self) -> &'static str {
        match self {
            Encoding::Atdf => "|",
            Encoding::Xml | Encoding::Csv => ";",
        }
    }

    /// `strftime` pattern for MIR/MRR date-time fields.
    pub fn timestamp_format(self) -> &'static str {
        match self {
            Encoding::Atdf => "%H:%M:%S %d-%b-%Y",
            Encoding::Xml | Encoding::Csv => "%H:%M:%ST%d-%b-%Y",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Atdf => "atdf",
            Encoding::Xml => "xml",
            Encoding::Csv => "csv",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw field value as handed over by the decoder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    /// Unsigned values above `i64::MAX` (large `U8` fields)
    UInt(u64),
    Real(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::UInt(n),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Plain rendering: integers in decimal, reals via [`format_real`], text
/// as-is, lists comma-joined.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Real(x) => f.write_str(&format_real(*x)),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// Shortest round-trip text for a real that always shows it is a real:
/// `1.5`, `1500.0`, `2e-6`.
pub fn format_real(x: f64) -> String {
    format!("{:?}", x)
}

/// One decoded record: its type and the ordered raw field values.
///
/// `None` marks an absent field. A record may stop short of its schema's
/// field count (trailing optional fields omitted).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub rec_type: RecordType,
    pub fields: Vec<Option<Value>>,
}

impl Record {
    pub fn new(rec_type: RecordType, fields: Vec<Option<Value>>) -> Self {
        Self { rec_type, fields }
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.rec_type.schema()
    }

    /// Type name used as the ATDF prefix and XML element name.
    pub fn type_name(&self) -> &'static str {
        self.rec_type.name()
    }
}

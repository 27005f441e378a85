use std::io::Write;

use crate::error::Result;
use crate::formats::RecordSink;
use crate::formatter::format_record;
use crate::models::{Encoding, Record};

/// Writes one `TypeName:field|field|...` line per record.
pub struct AtdfSink<W: Write> {
    out: W,
}

impl<W: Write> AtdfSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for AtdfSink<W> {
    fn on_record(&mut self, record: &Record) -> Result<()> {
        let fields = format_record(record, Encoding::Atdf)?;
        writeln!(self.out, "{}:{}", record.type_name(), fields.join("|"))?;
        Ok(())
    }

    fn on_complete(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use crate::schema::RecordType;

    #[test]
    fn test_null_fields_are_empty() {
        let mut sink = AtdfSink::new(Vec::new());
        let record = Record::new(RecordType::Pir, vec![Some(Value::Int(1)), None]);
        sink.on_record(&record).unwrap();
        sink.on_complete().unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "Pir:1|\n");
    }

    #[test]
    fn test_record_without_fields() {
        let mut sink = AtdfSink::new(Vec::new());
        sink.on_record(&Record::new(RecordType::Eps, vec![])).unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "Eps:\n");
    }
}

use quick_xml::escape::escape;
use std::io::Write;

use crate::error::Result;
use crate::formats::RecordSink;
use crate::formatter::format_record;
use crate::models::{Encoding, Record};

const ROOT: &str = "Stdf";

/// Writes a `<Stdf>` document with one self-closing element per record.
///
/// Attribute names are the schema field names; only the fields present in
/// the record are written.
pub struct XmlSink<W: Write> {
    out: W,
}

impl<W: Write> XmlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for XmlSink<W> {
    fn before_begin(&mut self) -> Result<()> {
        writeln!(self.out, "<{}>", ROOT)?;
        Ok(())
    }

    fn on_record(&mut self, record: &Record) -> Result<()> {
        let fields = format_record(record, Encoding::Xml)?;
        let mut line = format!("<{}", record.type_name());
        for (name, value) in record.schema().field_names().zip(&fields) {
            line.push(' ');
            line.push_str(name);
            line.push_str("=\"");
            line.push_str(&escape_attr(value));
            line.push('"');
        }
        line.push_str("/>\n");
        self.out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn on_complete(&mut self) -> Result<()> {
        writeln!(self.out, "</{}>", ROOT)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Escape text for a double-quoted attribute value. NUL characters are
/// dropped; whitespace control characters become character references so
/// they survive attribute-value normalisation.
pub fn escape_attr(value: &str) -> String {
    let cleaned: String = value.chars().filter(|&c| c != '\0').collect();
    let markup = escape(cleaned.as_str());

    let mut escaped = String::with_capacity(markup.len());
    for c in markup.chars() {
        match c {
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}

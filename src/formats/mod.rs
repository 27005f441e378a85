//! Output encodings.
//!
//! Each encoding implements [`RecordSink`], the push interface driven by
//! [`Renderer`](crate::writer::Renderer): one `before_begin`, one
//! `on_record` per decoded record in arrival order, then one `on_complete`.

pub mod atdf;
pub mod csv;
pub mod pivot;
pub mod xml;

use crate::error::Result;
use crate::models::Record;

pub use self::atdf::AtdfSink;
pub use self::csv::CsvSink;
pub use self::xml::XmlSink;

/// Receiver for a decoded record stream.
pub trait RecordSink {
    /// Called once before the first record.
    fn before_begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once per record, in arrival order.
    fn on_record(&mut self, record: &Record) -> Result<()>;

    /// Called once after the last record. Implementations flush their output.
    fn on_complete(&mut self) -> Result<()>;

    /// Rows the sink accepted but could not keep.
    fn dropped_rows(&self) -> usize {
        0
    }
}

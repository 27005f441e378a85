//! High-level API for rendering a decoded record stream.

use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::formats::{AtdfSink, CsvSink, RecordSink, XmlSink};
use crate::models::{Encoding, Record};

/// Lifecycle of a render: `begin`, then any number of `send`, then `complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Open,
    Closed,
}

enum Backend<W: Write> {
    Atdf(AtdfSink<W>),
    Xml(XmlSink<W>),
    Csv(CsvSink<W>),
}

impl<W: Write> Backend<W> {
    fn sink(&mut self) -> &mut dyn RecordSink {
        match self {
            Backend::Atdf(s) => s,
            Backend::Xml(s) => s,
            Backend::Csv(s) => s,
        }
    }

    fn dropped_rows(&self) -> usize {
        match self {
            Backend::Atdf(s) => s.dropped_rows(),
            Backend::Xml(s) => s.dropped_rows(),
            Backend::Csv(s) => s.dropped_rows(),
        }
    }

    fn into_inner(self) -> W {
        match self {
            Backend::Atdf(s) => s.into_inner(),
            Backend::Xml(s) => s.into_inner(),
            Backend::Csv(s) => s.into_inner(),
        }
    }
}

/// One render of one record stream into one output.
///
/// The session owns the encoder and, for CSV, its pivot store: dropping the
/// renderer on an error path releases everything it holds.
///
/// # Examples
///
/// ```no_run
/// use stdf_render::{Encoding, Record, RecordType, Renderer, Value};
///
/// let mut renderer = Renderer::new(Encoding::Atdf, Vec::new());
/// renderer.begin()?;
/// renderer.send(&Record::new(RecordType::Dtr, vec![Some(Value::from("hello"))]))?;
/// renderer.complete()?;
///
/// assert_eq!(renderer.into_inner(), b"Dtr:hello\n");
/// # Ok::<(), stdf_render::Error>(())
/// ```
pub struct Renderer<W: Write> {
    encoding: Encoding,
    backend: Backend<W>,
    state: SessionState,
    num_records: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(encoding: Encoding, out: W) -> Self {
        let backend = match encoding {
            Encoding::Atdf => Backend::Atdf(AtdfSink::new(out)),
            Encoding::Xml => Backend::Xml(XmlSink::new(out)),
            Encoding::Csv => Backend::Csv(CsvSink::new(out)),
        };
        Self {
            encoding,
            backend,
            state: SessionState::NotStarted,
            num_records: 0,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start the stream.
    ///
    /// # Errors
    ///
    /// [`Error::State`] if the session was already started.
    pub fn begin(&mut self) -> Result<()> {
        self.expect_state(SessionState::NotStarted, "begin")?;
        debug!("Beginning {} render", self.encoding);
        self.backend.sink().before_begin()?;
        self.state = SessionState::Open;
        Ok(())
    }

    /// Push one record.
    ///
    /// # Errors
    ///
    /// [`Error::State`] outside an open session, [`Error::SchemaMismatch`] if
    /// the record disagrees with its schema, [`Error::Io`] on output failure.
    pub fn send(&mut self, record: &Record) -> Result<()> {
        self.expect_state(SessionState::Open, "send")?;
        self.backend.sink().on_record(record)?;
        self.num_records += 1;
        Ok(())
    }

    /// Finish the stream and flush the output.
    pub fn complete(&mut self) -> Result<()> {
        self.expect_state(SessionState::Open, "complete")?;
        self.backend.sink().on_complete()?;
        self.state = SessionState::Closed;
        debug!("Completed {} render of {} records", self.encoding, self.num_records);
        Ok(())
    }

    /// Run the whole lifecycle over `records` and report what was written.
    ///
    /// Stops at the first error from the iterator or the encoder.
    pub fn render<I>(&mut self, records: I) -> Result<RenderStats>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        self.begin()?;
        for record in records {
            self.send(&record?)?;
        }
        self.complete()?;
        Ok(self.stats())
    }

    pub fn stats(&self) -> RenderStats {
        RenderStats {
            encoding: self.encoding,
            num_records: self.num_records,
            dropped_rows: self.backend.dropped_rows(),
        }
    }

    pub fn into_inner(self) -> W {
        self.backend.into_inner()
    }

    fn expect_state(&self, expected: SessionState, call: &str) -> Result<()> {
        if self.state != expected {
            return Err(Error::State(format!(
                "{} called while the session is {:?}",
                call, self.state
            )));
        }
        Ok(())
    }
}

/// Statistics about a finished render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStats {
    pub encoding: Encoding,
    /// Records pushed through the encoder
    pub num_records: usize,
    /// Rows the CSV store could not keep
    pub dropped_rows: usize,
}

impl RenderStats {
    /// Get a human-readable summary of the render.
    pub fn summary(&self) -> String {
        format!(
            "Rendered {} records as {} ({} rows dropped)",
            self.num_records, self.encoding, self.dropped_rows
        )
    }
}

/// Where rendered text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

/// Builder for a renderer writing to standard output or a file.
///
/// # Examples
///
/// ```no_run
/// use stdf_render::{Encoding, RecordStream, RendererBuilder};
///
/// let stream = RecordStream::from_file("lot42.jsonl")?;
/// let stats = RendererBuilder::new()
///     .encoding(Encoding::Csv)
///     .output_path("lot42.csv")
///     .build()?
///     .render(stream.records())?;
///
/// println!("{}", stats.summary());
/// # Ok::<(), stdf_render::Error>(())
/// ```
pub struct RendererBuilder {
    encoding: Encoding,
    output: Output,
}

impl RendererBuilder {
    /// ATDF to standard output.
    pub fn new() -> Self {
        Self {
            encoding: Encoding::Atdf,
            output: Output::Stdout,
        }
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn output_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = Output::File(path.as_ref().to_path_buf());
        self
    }

    /// Open the output and build the renderer.
    ///
    /// # Errors
    ///
    /// Returns an error if the output file cannot be created.
    pub fn build(self) -> Result<Renderer<Box<dyn Write>>> {
        let out: Box<dyn Write> = match &self.output {
            Output::Stdout => Box::new(io::stdout().lock()),
            Output::File(path) => Box::new(BufWriter::new(File::create(path)?)),
        };
        Ok(Renderer::new(self.encoding, out))
    }
}

impl Default for RendererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use crate::schema::RecordType;

    fn dtr(text: &str) -> Record {
        Record::new(RecordType::Dtr, vec![Some(Value::from(text))])
    }

    #[test]
    fn test_send_before_begin_is_rejected() {
        let mut renderer = Renderer::new(Encoding::Atdf, Vec::new());
        assert!(matches!(renderer.send(&dtr("x")), Err(Error::State(_))));
        assert_eq!(renderer.state(), SessionState::NotStarted);
    }

    #[test]
    fn test_complete_twice_is_rejected() {
        let mut renderer = Renderer::new(Encoding::Xml, Vec::new());
        renderer.begin().unwrap();
        renderer.complete().unwrap();
        assert!(matches!(renderer.complete(), Err(Error::State(_))));
        assert!(matches!(renderer.begin(), Err(Error::State(_))));
    }

    #[test]
    fn test_render_counts_records() {
        let mut renderer = Renderer::new(Encoding::Atdf, Vec::new());
        let stats = renderer.render(vec![Ok(dtr("a")), Ok(dtr("b"))]).unwrap();
        assert_eq!(stats.num_records, 2);
        assert_eq!(stats.dropped_rows, 0);
        assert_eq!(stats.summary(), "Rendered 2 records as atdf (0 rows dropped)");
        assert_eq!(renderer.into_inner(), b"Dtr:a\nDtr:b\n");
    }

    #[test]
    fn test_render_stops_at_first_error() {
        let mut renderer = Renderer::new(Encoding::Atdf, Vec::new());
        let records = vec![
            Ok(dtr("a")),
            Err(Error::InvalidInput("line 2: bad".to_string())),
            Ok(dtr("c")),
        ];
        assert!(matches!(renderer.render(records), Err(Error::InvalidInput(_))));
        assert_eq!(renderer.state(), SessionState::Open);
        assert_eq!(renderer.into_inner(), b"Dtr:a\n");
    }
}

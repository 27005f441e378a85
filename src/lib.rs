//! # STDF Render
//!
//! Render decoded STDF V4 test-data records as text.
//!
//! The crate sits behind an STDF decoder: records arrive one at a time as a
//! record type plus its raw field values, and are written out in one of three
//! encodings.
//!
//! - **ATDF**: one `TypeName:field|field|...` line per record
//! - **XML**: a `<Stdf>` document with one self-closing element per record
//! - **CSV**: a pivoted report with one column per test and one row per part,
//!   assembled from the MPR and PRR records at the end of the stream
//!
//! ## Quick Start
//!
//! ```no_run
//! use stdf_render::{Encoding, RecordStream, RendererBuilder};
//!
//! let stream = RecordStream::from_file("lot42.jsonl")?;
//!
//! let stats = RendererBuilder::new()
//!     .encoding(Encoding::Xml)
//!     .output_path("lot42.xml")
//!     .build()?
//!     .render(stream.records())?;
//!
//! println!("{}", stats.summary());
//! # Ok::<(), stdf_render::Error>(())
//! ```
//!
//! ## Pushing records directly
//!
//! ```no_run
//! use stdf_render::{Encoding, Record, RecordType, Renderer, Value};
//!
//! let mut renderer = Renderer::new(Encoding::Atdf, std::io::stdout());
//! renderer.begin()?;
//! renderer.send(&Record::new(
//!     RecordType::Gdr,
//!     vec![Some(Value::List(vec![
//!         Value::Int(1),
//!         Value::from("a"),
//!         Value::Real(3.5),
//!     ]))],
//! ))?;
//! renderer.complete()?; // prints "Gdr:1|a|3.5"
//! # Ok::<(), stdf_render::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! A record that disagrees with its schema aborts the render with
//! [`Error::SchemaMismatch`]. A row the CSV store cannot keep is logged,
//! dropped and counted in [`RenderStats::dropped_rows`]; the report is still
//! written.

// Public API modules
pub mod error;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use error::{Error, Result};
pub use reader::RecordStream;
pub use writer::{Output, RenderStats, Renderer, RendererBuilder};

pub use models::{Encoding, Record, Value};
pub use schema::{RecordSchema, RecordType};

// Internal modules (public but not part of the high-level API)
pub mod formats;
pub mod formatter;
pub mod models;
pub mod schema;

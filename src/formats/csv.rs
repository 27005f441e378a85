//! Pivoted per-part test-result report.
//!
//! Records are formatted and stored as they arrive; nothing is written until
//! `on_complete`, when the MPR table is pivoted into one header block and one
//! row per `(part, wafer, lot)`.

use ::csv::QuoteStyle;
use log::{debug, warn};
use std::io::Write;

use crate::error::{Error, Result};
use crate::formats::pivot::{PartKey, PivotIndex, StoredRow, Table, TabularStore};
use crate::formats::RecordSink;
use crate::formatter::format_record;
use crate::models::{format_real, Encoding, Record};
use crate::schema::RecordType;

/// Leading columns of every report row.
pub const REPORT_COLUMNS: [&str; 5] = [
    "PART_INDEX",
    "TEST_T",
    "NUM_TEST",
    "WAFER_INDEX",
    "LOT_INDEX",
];

/// Written for test time and test count when a part has no PRR.
pub const UNKNOWN: &str = "unknown";

/// SI prefix for a result scale exponent.
pub fn unit_prefix(scale: i32) -> Option<&'static str> {
    match scale {
        0 => Some(""),
        3 => Some("m"),
        6 => Some("u"),
        9 => Some("n"),
        12 => Some("p"),
        -3 => Some("k"),
        -6 => Some("M"),
        -9 => Some("G"),
        -12 => Some("T"),
        _ => None,
    }
}

/// `raw * 10^scale`
pub fn scale_value(raw: f64, scale: i32) -> f64 {
    raw * 10f64.powi(scale)
}

/// Stores every record and writes the pivoted report at `on_complete`.
pub struct CsvSink<W: Write> {
    out: W,
    index: PivotIndex,
    store: Option<TabularStore>,
    dropped: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            index: PivotIndex::new(),
            store: None,
            dropped: 0,
        }
    }

    pub fn index(&self) -> PivotIndex {
        self.index
    }

    /// The store while the stream is open; `None` before `before_begin` and
    /// after `on_complete`.
    pub fn store(&self) -> Option<&TabularStore> {
        self.store.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn store_mut(&mut self) -> Result<&mut TabularStore> {
        self.store
            .as_mut()
            .ok_or_else(|| Error::State("CSV store is not open".to_string()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn before_begin(&mut self) -> Result<()> {
        self.index = PivotIndex::new();
        self.store = Some(TabularStore::new());
        self.dropped = 0;
        Ok(())
    }

    fn on_record(&mut self, record: &Record) -> Result<()> {
        self.index.observe(record.rec_type);
        let values = format_record(record, Encoding::Csv)?;
        let index = self.index;

        if let Err(e) = self.store_mut()?.insert(record.rec_type, index, values) {
            warn!("Dropping {} row at {:?}: {}", record.type_name(), index, e);
            self.dropped += 1;
        }
        Ok(())
    }

    fn on_complete(&mut self) -> Result<()> {
        let store = self
            .store
            .take()
            .ok_or_else(|| Error::State("CSV store is not open".to_string()))?;

        debug!(
            "Tables: {}",
            store
                .tables()
                .map(|t| t.rec_type().name())
                .collect::<Vec<_>>()
                .join(",")
        );
        if let Some(mpr) = store.table(RecordType::Mpr) {
            debug!(
                "Mpr columns: {}",
                mpr.columns()
                    .iter()
                    .map(|c| format!("{}:{:?}", c.name, c.kind))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        write_report(&store, &mut self.out)?;
        debug!("Released pivot store with {} rows", store.row_count());
        drop(store);

        self.out.flush()?;
        Ok(())
    }

    fn dropped_rows(&self) -> usize {
        self.dropped
    }
}

/// Per-test header data taken from one MPR row of the first part.
#[derive(Debug, Clone, PartialEq)]
pub struct TestColumn {
    pub name: String,
    pub number: String,
    pub units: String,
    pub high_limit: String,
    pub low_limit: String,
}

impl TestColumn {
    fn from_row(mpr: &Table, row: &StoredRow) -> Self {
        let field = |name: &str| mpr.value(row, name).unwrap_or("");

        let units = match parse_scale(field("RES_SCAL")) {
            Some(scale) => match unit_prefix(scale) {
                Some(prefix) => format!("{}{}", prefix, field("UNITS")),
                None => {
                    warn!("No unit prefix for scale {} on test {}", scale, field("TEST_TXT"));
                    field("UNITS").to_string()
                }
            },
            None => field("UNITS").to_string(),
        };

        Self {
            name: field("TEST_TXT").to_string(),
            number: field("TEST_NUM").to_string(),
            units,
            high_limit: scaled_limit(field("HI_LIMIT"), field("HLM_SCAL")),
            low_limit: scaled_limit(field("LO_LIMIT"), field("LLM_SCAL")),
        }
    }
}

/// Test columns in the order they were seen for part 1.
///
/// A test that part 1 never ran has no column, even if later parts ran it.
pub fn test_columns(mpr: &Table) -> Vec<TestColumn> {
    mpr.rows_for_part(1)
        .map(|row| TestColumn::from_row(mpr, row))
        .collect()
}

/// Write the header block and one row per part to `out`.
///
/// Cells holding a comma, quote or line break are quoted, so free-text test
/// names and units never shift the columns.
pub fn write_report<W: Write>(store: &TabularStore, out: &mut W) -> Result<()> {
    let mut wtr = ::csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .flexible(true)
        .from_writer(out);

    let Some(mpr) = store.table(RecordType::Mpr) else {
        debug!("No Mpr records; writing header only");
        write_header(&[], &mut wtr)?;
        wtr.flush()?;
        return Ok(());
    };

    let columns = test_columns(mpr);
    write_header(&columns, &mut wtr)?;

    let prr = store.table(RecordType::Prr);
    for key in mpr.keys() {
        let results: Vec<String> = mpr
            .rows_for(key)
            .filter_map(|row| scaled_result(mpr, row, key))
            .collect();
        if results.is_empty() {
            continue;
        }

        let (test_time, num_test) = part_summary(prr, key);
        let mut cells = vec![
            key.part.to_string(),
            test_time,
            num_test,
            key.wafer.to_string(),
            key.lot.to_string(),
        ];
        cells.extend(results);
        wtr.write_record(&cells)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_header<W: Write>(columns: &[TestColumn], wtr: &mut ::csv::Writer<W>) -> Result<()> {
    let mut names: Vec<&str> = REPORT_COLUMNS.to_vec();
    names.extend(columns.iter().map(|c| c.name.as_str()));
    wtr.write_record(header_cells(&names))?;

    let rows: [(&str, fn(&TestColumn) -> &str); 4] = [
        ("Test #", |c| c.number.as_str()),
        ("Units", |c| c.units.as_str()),
        ("High limit", |c| c.high_limit.as_str()),
        ("Low limit", |c| c.low_limit.as_str()),
    ];
    for (label, cell) in rows {
        let mut cells = vec![label];
        cells.extend(std::iter::repeat("").take(REPORT_COLUMNS.len() - 1));
        cells.extend(columns.iter().map(cell));
        wtr.write_record(header_cells(&cells))?;
    }
    Ok(())
}

/// Header rows read `a, b, c`: every cell after the first gets a leading space.
fn header_cells<'a>(cells: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
    cells.iter().enumerate().map(|(i, cell)| {
        if i == 0 {
            cell.to_string()
        } else {
            format!(" {}", cell)
        }
    })
}

/// Test time and test count from the last PRR stored for `key`.
fn part_summary(prr: Option<&Table>, key: PartKey) -> (String, String) {
    let mut summary = (UNKNOWN.to_string(), UNKNOWN.to_string());
    if let Some(prr) = prr {
        for row in prr.rows_for(key) {
            summary = (
                prr.value(row, "TEST_T").unwrap_or("").to_string(),
                prr.value(row, "NUM_TEST").unwrap_or("").to_string(),
            );
        }
    }
    summary
}

/// First returned result of an MPR row, scaled by its result exponent.
fn scaled_result(mpr: &Table, row: &StoredRow, key: PartKey) -> Option<String> {
    let results = mpr.value(row, "RTN_RSLT").unwrap_or("");
    let first = results.split(',').next().unwrap_or("").trim();
    let raw = first.parse::<f64>().ok();
    let scale = parse_scale(mpr.value(row, "RES_SCAL").unwrap_or(""));

    match (raw, scale) {
        (Some(raw), Some(scale)) => Some(format_real(scale_value(raw, scale))),
        _ => {
            warn!(
                "Skipping {} result at {:?}: RTN_RSLT={:?} RES_SCAL={:?}",
                mpr.value(row, "TEST_TXT").unwrap_or(""),
                key,
                results,
                mpr.value(row, "RES_SCAL").unwrap_or("")
            );
            None
        }
    }
}

fn scaled_limit(limit: &str, scale: &str) -> String {
    match (limit.trim().parse::<f64>(), parse_scale(scale)) {
        (Ok(limit), Some(scale)) => format_real(scale_value(limit, scale)),
        (Ok(limit), None) => format_real(limit),
        (Err(_), _) => String::new(),
    }
}

fn parse_scale(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

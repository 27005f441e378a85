//! Lot/wafer/part tracking and the in-memory tables behind the CSV report.
//!
//! Records arrive flat. A MIR opens a lot, a WIR opens a wafer and a PIR opens
//! a part; [`PivotIndex`] counts those openings and every row stored after
//! them is stamped with the current counters. [`TabularStore`] keeps one
//! append-only [`Table`] per record type, with the formatted field text of
//! each record and an ordered `(part, wafer, lot)` index for lookups.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::schema::{RecordSchema, RecordType, StorageKind};

/// Names of the index columns that lead every table.
pub const INDEX_COLUMNS: [&str; 3] = ["LOT_INDEX", "WAFER_INDEX", "PART_INDEX"];

/// Lot, wafer and part counters inferred from record arrival order.
///
/// Counters start at zero, only ever grow by one, and are never reset when
/// an enclosing scope changes: the part counter keeps counting across wafers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PivotIndex {
    pub lot: u32,
    pub wafer: u32,
    pub part: u32,
}

impl PivotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter opened by `rec_type`, if any. Returns whether a
    /// counter moved.
    pub fn observe(&mut self, rec_type: RecordType) -> bool {
        let counter = match rec_type {
            RecordType::Mir => &mut self.lot,
            RecordType::Wir => &mut self.wafer,
            RecordType::Pir => &mut self.part,
            _ => return false,
        };
        *counter += 1;
        true
    }

    pub fn key(&self) -> PartKey {
        PartKey {
            part: self.part,
            wafer: self.wafer,
            lot: self.lot,
        }
    }
}

/// Report row key. Field order gives the report order: part, then wafer,
/// then lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartKey {
    pub part: u32,
    pub wafer: u32,
    pub lot: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: StorageKind,
}

/// One stored record: its pivot counters and formatted field text.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub index: PivotIndex,
    pub values: Vec<String>,
}

impl StoredRow {
    /// `[lot, wafer, part]` followed by the field values.
    pub fn display_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.values.len() + INDEX_COLUMNS.len());
        row.push(self.index.lot.to_string());
        row.push(self.index.wafer.to_string());
        row.push(self.index.part.to_string());
        row.extend(self.values.iter().cloned());
        row
    }
}

/// Append-only rows of one record type.
#[derive(Debug)]
pub struct Table {
    schema: &'static RecordSchema,
    columns: Vec<Column>,
    rows: Vec<StoredRow>,
    by_part: BTreeMap<PartKey, Vec<usize>>,
}

impl Table {
    fn new(schema: &'static RecordSchema) -> Self {
        let mut columns: Vec<Column> = INDEX_COLUMNS
            .iter()
            .map(|&name| Column {
                name,
                kind: StorageKind::Integer,
            })
            .collect();
        columns.extend(schema.fields.iter().map(|f| Column {
            name: f.name,
            kind: f.ty.storage_kind(),
        }));

        Self {
            schema,
            columns,
            rows: Vec::new(),
            by_part: BTreeMap::new(),
        }
    }

    pub fn rec_type(&self) -> RecordType {
        self.schema.rec_type
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn rows(&self) -> &[StoredRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text of the field `name` in `row`. `None` when the schema has no such
    /// field.
    pub fn value<'a>(&self, row: &'a StoredRow, name: &str) -> Option<&'a str> {
        self.schema
            .index_of(name)
            .and_then(|i| row.values.get(i))
            .map(String::as_str)
    }

    /// Rows stamped with exactly `key`, in arrival order.
    pub fn rows_for(&self, key: PartKey) -> impl Iterator<Item = &StoredRow> + '_ {
        self.by_part
            .get(&key)
            .into_iter()
            .flatten()
            .map(move |&i| &self.rows[i])
    }

    /// Rows of part `part` in any wafer or lot, in arrival order.
    pub fn rows_for_part(&self, part: u32) -> impl Iterator<Item = &StoredRow> + '_ {
        self.rows.iter().filter(move |r| r.index.part == part)
    }

    /// Every key that has at least one row, ascending.
    pub fn keys(&self) -> impl Iterator<Item = PartKey> + '_ {
        self.by_part.keys().copied()
    }

    fn push(&mut self, index: PivotIndex, mut values: Vec<String>) -> Result<()> {
        let width = self.schema.fields.len();
        if values.len() > width {
            return Err(Error::Storage(format!(
                "{} row has {} values but the table has {} field columns",
                self.schema.name(),
                values.len(),
                width
            )));
        }
        // Trailing optional fields the record left out are stored empty.
        values.resize(width, String::new());

        let position = self.rows.len();
        self.rows.push(StoredRow { index, values });
        self.by_part.entry(index.key()).or_default().push(position);
        Ok(())
    }
}

/// Per-record-type tables for one render. Owned by a single CSV sink and
/// dropped with it.
#[derive(Debug, Default)]
pub struct TabularStore {
    tables: BTreeMap<RecordType, Table>,
}

impl TabularStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for `schema`, creating it on first sight. Calling this
    /// again for the same record type returns the existing table unchanged.
    pub fn ensure_table(&mut self, schema: &'static RecordSchema) -> &mut Table {
        self.tables
            .entry(schema.rec_type)
            .or_insert_with(|| Table::new(schema))
    }

    /// Append a row of formatted field values.
    ///
    /// # Errors
    ///
    /// [`Error::Storage`] if the row is wider than the record type's table.
    /// Nothing is stored in that case.
    pub fn insert(&mut self, rec_type: RecordType, index: PivotIndex, values: Vec<String>) -> Result<()> {
        self.ensure_table(rec_type.schema()).push(index, values)
    }

    pub fn table(&self, rec_type: RecordType) -> Option<&Table> {
        self.tables.get(&rec_type)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> + '_ {
        self.tables.values()
    }

    pub fn row_count(&self) -> usize {
        self.tables.values().map(Table::len).sum()
    }
}

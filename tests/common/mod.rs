//! Test utilities for building decoded record streams
#![allow(dead_code)]

use serde_json::{json, Value as Json};
use stdf_render::{Record, RecordStream};

/// Builder for decoded record streams in the JSON Lines input format
pub struct StreamBuilder {
    lines: Vec<Json>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add any record by name with raw JSON field values
    pub fn record(mut self, rec: &str, fields: Json) -> Self {
        self.lines.push(json!({ "rec": rec, "fields": fields }));
        self
    }

    /// Add a MIR (opens a lot)
    pub fn mir(self, setup_t: i64, start_t: i64, lot_id: &str) -> Self {
        self.record(
            "Mir",
            json!([setup_t, start_t, 1, "P", " ", " ", 65535, " ", lot_id, "PART-A"]),
        )
    }

    /// Add a MRR
    pub fn mrr(self, finish_t: i64) -> Self {
        self.record("Mrr", json!([finish_t, " ", "", ""]))
    }

    /// Add a WIR (opens a wafer)
    pub fn wir(self, wafer_id: &str) -> Self {
        self.record("Wir", json!([1, 255, 0, wafer_id]))
    }

    /// Add a WRR
    pub fn wrr(self, wafer_id: &str) -> Self {
        self.record("Wrr", json!([1, 255, 0, 1, 0, 0, 1, 0, wafer_id]))
    }

    /// Add a PIR (opens a part)
    pub fn pir(self) -> Self {
        self.record("Pir", json!([1, 1]))
    }

    /// Add a PRR with the given test count and test time
    pub fn prr(self, num_test: i64, test_t: i64) -> Self {
        self.record(
            "Prr",
            json!([1, 1, 0, num_test, 1, 1, 0, 0, test_t, "1", "", null]),
        )
    }

    /// Add an MPR with a single result.
    ///
    /// Limits share the result scale.
    pub fn mpr(
        self,
        test_num: i64,
        name: &str,
        units: &str,
        scale: i64,
        result: f64,
        lo_limit: f64,
        hi_limit: f64,
    ) -> Self {
        self.mpr_results(test_num, name, units, scale, &[result], lo_limit, hi_limit)
    }

    /// Add an MPR with several results
    pub fn mpr_results(
        self,
        test_num: i64,
        name: &str,
        units: &str,
        scale: i64,
        results: &[f64],
        lo_limit: f64,
        hi_limit: f64,
    ) -> Self {
        let stats: Vec<i64> = results.iter().map(|_| 0).collect();
        self.record(
            "Mpr",
            json!([
                test_num,
                1,
                1,
                0,
                0,
                results.len(),
                results.len(),
                stats,
                results,
                name,
                "",
                0,
                scale,
                scale,
                scale,
                lo_limit,
                hi_limit,
                0.0,
                0.0,
                [],
                units
            ]),
        )
    }

    /// Add a GDR with a heterogeneous payload
    pub fn gdr(self, payload: Json) -> Self {
        self.record("Gdr", json!([payload]))
    }

    /// JSON Lines bytes
    pub fn build_jsonl(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for line in &self.lines {
            out.extend_from_slice(line.to_string().as_bytes());
            out.push(b'\n');
        }
        out
    }

    /// Decoded records, read back through the stream reader
    pub fn build(&self) -> Vec<Record> {
        RecordStream::from_bytes(self.build_jsonl())
            .records()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }
}

/// Render `records` into a string with the given encoding
pub fn render(encoding: stdf_render::Encoding, records: &[Record]) -> String {
    let mut renderer = stdf_render::Renderer::new(encoding, Vec::new());
    renderer
        .render(records.iter().cloned().map(Ok))
        .unwrap();
    String::from_utf8(renderer.into_inner()).unwrap()
}

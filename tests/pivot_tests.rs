mod common;

use common::{render, StreamBuilder};
use stdf_render::formats::pivot::{PivotIndex, TabularStore};
use stdf_render::formats::{CsvSink, RecordSink};
use stdf_render::{Encoding, Error, RecordStream, RecordType, Renderer, RendererBuilder};
use tempfile::TempDir;

fn report(builder: &StreamBuilder) -> Vec<String> {
    render(Encoding::Csv, &builder.build())
        .lines()
        .map(str::to_string)
        .collect()
}

fn data_rows(lines: &[String]) -> Vec<Vec<String>> {
    lines[5..]
        .iter()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

// ============================================================================
// SINGLE PART
// ============================================================================

#[test]
fn test_single_part_report() {
    let builder = StreamBuilder::new()
        .mir(0, 0, "LOT1")
        .wir("W1")
        .pir()
        .mpr(1001, "Vdd", "V", 3, 1.5, 1.0, 2.0)
        .mpr(1002, "Idd", "A", -6, 2.0, 0.0, 0.0)
        .prr(2, 12);
    let lines = report(&builder);

    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[0],
        "PART_INDEX, TEST_T, NUM_TEST, WAFER_INDEX, LOT_INDEX, Vdd, Idd"
    );
    assert_eq!(lines[1], "Test #, , , , , 1001, 1002");
    assert_eq!(lines[2], "Units, , , , , mV, MA");
    assert_eq!(lines[3], "High limit, , , , , 2000.0, 0.0");
    assert_eq!(lines[4], "Low limit, , , , , 1000.0, 0.0");

    let row = &data_rows(&lines)[0];
    assert_eq!(row.len(), 7);
    assert_eq!(&row[..6], &["1", "12", "2", "1", "1", "1500.0"]);
    let idd: f64 = row[6].parse().unwrap();
    assert!((idd - 2e-6).abs() < 1e-12, "Idd cell was {}", row[6]);
}

#[test]
fn test_header_only_without_results() {
    let lines = report(&StreamBuilder::new().mir(0, 0, "LOT1").pir().prr(0, 1));
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "PART_INDEX, TEST_T, NUM_TEST, WAFER_INDEX, LOT_INDEX");
    assert_eq!(lines[2], "Units, , , , ");
}

#[test]
fn test_part_without_prr_is_unknown() {
    let builder = StreamBuilder::new()
        .mir(0, 0, "LOT1")
        .pir()
        .mpr(1001, "Vdd", "V", 0, 1.25, 1.0, 2.0);
    let rows = data_rows(&report(&builder));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], vec!["1", "unknown", "unknown", "0", "1", "1.25"]);
}

#[test]
fn test_last_prr_wins() {
    let builder = StreamBuilder::new()
        .pir()
        .mpr(1001, "Vdd", "V", 0, 1.0, 0.0, 2.0)
        .prr(1, 10)
        .prr(1, 99);
    let rows = data_rows(&report(&builder));
    assert_eq!(rows[0][1], "99");
}

#[test]
fn test_first_result_of_many_is_reported() {
    let builder = StreamBuilder::new()
        .pir()
        .mpr_results(1001, "Vdd", "V", 0, &[1.5, 9.0, 9.0], 0.0, 2.0)
        .prr(1, 3);
    let rows = data_rows(&report(&builder));
    assert_eq!(rows[0][5], "1.5");
}

#[test]
fn test_commas_in_test_names_keep_columns_aligned() {
    let builder = StreamBuilder::new()
        .pir()
        .mpr(1001, "Idd, standby", "A", 0, 1.0, 0.0, 2.0)
        .mpr(1002, "Vdd", "V, dc", 0, 3.0, 0.0, 5.0)
        .prr(2, 10)
        .pir()
        .mpr(1001, "Idd, standby", "A", 0, 1.5, 0.0, 2.0)
        .mpr(1002, "Vdd", "V, dc", 0, 3.5, 0.0, 5.0)
        .prr(2, 11);
    let text = render(Encoding::Csv, &builder.build());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    assert_eq!(records.len(), 7);
    for record in &records {
        assert_eq!(record.len(), 7, "row {:?}", record);
    }
    assert_eq!(records[0].get(5), Some("Idd, standby"));
    assert_eq!(records[0].get(6), Some("Vdd"));
    assert_eq!(records[2].get(6), Some("V, dc"));
    assert_eq!(records[5].get(6), Some("3.0"));
    assert_eq!(records[6].get(5), Some("1.5"));
}

// ============================================================================
// MULTIPLE PARTS, WAFERS AND LOTS
// ============================================================================

#[test]
fn test_rows_follow_part_then_wafer_then_lot() {
    let builder = StreamBuilder::new()
        .mir(0, 0, "LOT1")
        .wir("W1")
        .pir()
        .mpr(1, "T1", "V", 0, 1.0, 0.0, 5.0)
        .prr(1, 10)
        .pir()
        .mpr(1, "T1", "V", 0, 2.0, 0.0, 5.0)
        .prr(1, 20)
        .wrr("W1")
        .wir("W2")
        .pir()
        .mpr(1, "T1", "V", 0, 3.0, 0.0, 5.0)
        .prr(1, 30)
        .wrr("W2")
        .mrr(100);
    let rows = data_rows(&report(&builder));

    let keys: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|r| (r[0].as_str(), r[3].as_str(), r[4].as_str()))
        .collect();
    assert_eq!(keys, vec![("1", "1", "1"), ("2", "1", "1"), ("3", "2", "1")]);

    let times: Vec<&str> = rows.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(times, vec!["10", "20", "30"]);
}

#[test]
fn test_counters_are_not_reset_by_new_lot() {
    let builder = StreamBuilder::new()
        .mir(0, 0, "LOT1")
        .pir()
        .mpr(1, "T1", "V", 0, 1.0, 0.0, 5.0)
        .mrr(1)
        .mir(2, 2, "LOT2")
        .pir()
        .mpr(1, "T1", "V", 0, 2.0, 0.0, 5.0)
        .mrr(3);
    let rows = data_rows(&report(&builder));

    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0][0].as_str(), rows[0][4].as_str()), ("1", "1"));
    assert_eq!((rows[1][0].as_str(), rows[1][4].as_str()), ("2", "2"));
}

#[test]
fn test_part_without_mpr_is_skipped() {
    let builder = StreamBuilder::new()
        .pir()
        .mpr(1, "T1", "V", 0, 1.0, 0.0, 5.0)
        .prr(1, 10)
        .pir()
        .prr(0, 11)
        .pir()
        .mpr(1, "T1", "V", 0, 3.0, 0.0, 5.0)
        .prr(1, 12);
    let rows = data_rows(&report(&builder));

    let parts: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(parts, vec!["1", "3"]);
}

#[test]
fn test_columns_come_from_first_part() {
    let builder = StreamBuilder::new()
        .pir()
        .mpr(1, "T1", "V", 0, 1.0, 0.0, 5.0)
        .prr(1, 10)
        .pir()
        .mpr(1, "T1", "V", 0, 2.0, 0.0, 5.0)
        .mpr(2, "T2", "V", 0, 7.0, 0.0, 5.0)
        .prr(2, 20);
    let lines = report(&builder);

    assert!(lines[0].ends_with("LOT_INDEX, T1"));
    let rows = data_rows(&lines);
    // Part 2's extra result is still written, past the last named column.
    assert_eq!(rows[1][5..], ["2.0", "7.0"]);
}

#[test]
fn test_repeated_record_types_share_a_table() {
    let builder = StreamBuilder::new()
        .mir(0, 0, "LOT1")
        .pir()
        .prr(0, 1)
        .pir()
        .prr(0, 2)
        .pir()
        .prr(0, 3);
    let mut renderer = Renderer::new(Encoding::Csv, Vec::new());
    let stats = renderer
        .render(builder.build().into_iter().map(Ok))
        .unwrap();
    assert_eq!(stats.num_records, 7);
    assert_eq!(stats.dropped_rows, 0);
}

// ============================================================================
// STORE
// ============================================================================

#[test]
fn test_store_keeps_rows_per_type() {
    let records = StreamBuilder::new()
        .mir(0, 0, "LOT1")
        .wir("W1")
        .pir()
        .mpr(1, "T1", "V", 0, 1.0, 0.0, 5.0)
        .pir()
        .mpr(1, "T1", "V", 0, 2.0, 0.0, 5.0)
        .build();

    let mut sink = CsvSink::new(Vec::new());
    sink.before_begin().unwrap();
    for record in &records {
        sink.on_record(record).unwrap();
    }

    let index = sink.index();
    assert_eq!((index.lot, index.wafer, index.part), (1, 1, 2));

    let store = sink.store().unwrap();
    assert_eq!(store.row_count(), 6);
    let mpr = store.table(RecordType::Mpr).unwrap();
    assert_eq!(mpr.len(), 2);
    assert_eq!(&mpr.column_names()[..4], &["LOT_INDEX", "WAFER_INDEX", "PART_INDEX", "TEST_NUM"]);
    assert_eq!(mpr.rows()[1].display_row()[..3], ["1", "1", "2"]);
    assert_eq!(mpr.value(&mpr.rows()[0], "TEST_TXT"), Some("T1"));

    let wir = store.table(RecordType::Wir).unwrap();
    assert_eq!(wir.rows()[0].index.wafer, 1);
    assert_eq!(wir.rows()[0].index.part, 0);

    sink.on_complete().unwrap();
    assert!(sink.store().is_none());
}

#[test]
fn test_oversized_row_is_a_storage_fault() {
    let mut store = TabularStore::new();
    let mut index = PivotIndex::new();
    index.observe(RecordType::Pir);

    let err = store
        .insert(RecordType::Pir, index, vec!["1".into(), "1".into(), "extra".into()])
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(store.table(RecordType::Pir).map_or(0, |t| t.len()), 0);

    store
        .insert(RecordType::Pir, index, vec!["1".into()])
        .unwrap();
    let pir = store.table(RecordType::Pir).unwrap();
    assert_eq!(pir.rows()[0].values, vec!["1", ""]);
}

// ============================================================================
// FILE OUTPUT
// ============================================================================

#[test]
fn test_report_file_reads_back_as_csv() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("lot.jsonl");
    let output = dir.path().join("lot.csv");

    let builder = StreamBuilder::new()
        .mir(0, 0, "LOT1")
        .wir("W1")
        .pir()
        .mpr(1001, "Vdd", "V", 3, 1.5, 1.0, 2.0)
        .prr(1, 12)
        .pir()
        .mpr(1001, "Vdd", "V", 3, 1.75, 1.0, 2.0)
        .prr(1, 14);
    std::fs::write(&input, builder.build_jsonl()).unwrap();

    let stream = RecordStream::from_file(&input).unwrap();
    let stats = RendererBuilder::new()
        .encoding(Encoding::Csv)
        .output_path(&output)
        .build()
        .unwrap()
        .render(stream.records())
        .unwrap();
    assert_eq!(stats.num_records, 8);
    assert_eq!(stats.summary(), "Rendered 8 records as csv (0 rows dropped)");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(&output)
        .unwrap();

    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("PART_INDEX"));
    assert_eq!(headers.get(5), Some("Vdd"));

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].get(0), Some("Test #"));
    assert_eq!(records[0].get(5), Some("1001"));
    assert_eq!(records[1].get(5), Some("mV"));
    assert_eq!(records[4].iter().collect::<Vec<_>>(), vec!["1", "12", "1", "1", "1", "1500.0"]);
    assert_eq!(records[5].get(5), Some("1750.0"));
}

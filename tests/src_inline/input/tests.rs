use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use super::cache::fingerprint_file;
use super::meta::parse_model_meta;
use super::respondent::parse_respondent;
use super::table::{parse_delimited, split_record};
use super::*;
use crate::model::value::FeatureValue;
use crate::pipeline::stage1_baseline::{Stage1Params, build_baselines};
use crate::test_support::{make_temp_dir, write_gz, write_xlsx};

fn write_file(path: &Path, contents: &[u8]) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents).unwrap();
}

#[test]
fn test_sniff_format() {
    assert_eq!(sniff_format(b"PK\x03\x04rest"), DatasetFormat::Xlsx);
    assert_eq!(sniff_format(&[0xD0, 0xCF, 0x11, 0xE0, 0, 0]), DatasetFormat::Xls);
    assert_eq!(sniff_format(b"Q1,Q2\n1,2\n"), DatasetFormat::Csv);
    assert_eq!(sniff_format(b"Q1\tQ2\n1\t2\n"), DatasetFormat::Tsv);
    assert_eq!(sniff_format(b"single\n1\n"), DatasetFormat::Unknown);
}

#[test]
fn test_split_record_quotes() {
    let fields = |s: &str, d: char| split_record(s, d).0;
    assert_eq!(fields("a,\"b,c\",d", ','), vec!["a", "b,c", "d"]);
    assert_eq!(fields("\"say \"\"hi\"\"\",", ','), vec!["say \"hi\"", ""]);
    assert_eq!(fields("x\ty", '\t'), vec!["x", "y"]);
    assert!(split_record("1,\"open", ',').1);
    assert!(!split_record("1,\"closed\"", ',').1);
}

#[test]
fn test_parse_delimited_pads_short_rows() {
    let data = "Q1,Q2,Q3\n1,a,2\n3\n4,b,5,extra\n";
    let table = parse_delimited(Cursor::new(data), ',').unwrap();
    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.n_columns(), 3);
    let q2 = table.column("Q2").unwrap();
    assert_eq!(q2[0].as_deref(), Some("a"));
    assert_eq!(q2[1], None);
    assert_eq!(q2[2].as_deref(), Some("b"));
    assert!(table.column("Q4").is_none());
}

#[test]
fn test_parse_delimited_keeps_first_duplicate_column() {
    let data = "Q1,Q1\n1,9\n";
    let table = parse_delimited(Cursor::new(data), ',').unwrap();
    assert_eq!(table.n_columns(), 1);
    assert_eq!(table.column("Q1").unwrap()[0].as_deref(), Some("1"));
}

#[test]
fn test_empty_table_is_parse_error() {
    let err = parse_delimited(Cursor::new(""), ',').unwrap_err();
    assert!(matches!(err, InputError::Parse(_)));
}

#[test]
fn test_load_reference_table_gz_and_tsv() {
    let dir = make_temp_dir("input");
    let gz = dir.join("ref.tsv.gz");
    write_gz(&gz, "Q1\tQ2\n1\tx\n2\ty\n");
    let table = load_reference_table(&gz).unwrap();
    assert_eq!(table.n_rows(), 2);
    assert_eq!(table.column("Q2").unwrap()[1].as_deref(), Some("y"));

    let plain = dir.join("ref.txt");
    write_file(&plain, b"Q1\tQ2\n5\tz\n");
    assert_eq!(detect_format(&plain).unwrap(), DatasetFormat::Tsv);
    assert_eq!(load_reference_table(&plain).unwrap().n_rows(), 1);
}

#[test]
fn test_quoted_field_spans_lines() {
    let data = "Q1,comment\n1,\"line one\nline two\"\n2,ok\n";
    let table = parse_delimited(Cursor::new(data), ',').unwrap();
    assert_eq!(table.n_rows(), 2);
    let q1 = table.column("Q1").unwrap();
    assert_eq!(q1[0].as_deref(), Some("1"));
    assert_eq!(q1[1].as_deref(), Some("2"));
    assert_eq!(
        table.column("comment").unwrap()[0].as_deref(),
        Some("line one\nline two")
    );
}

#[test]
fn test_unterminated_quote_is_parse_error() {
    let data = "Q1,comment\n1,ok\n2,\"never closed\n3,x\n";
    let err = parse_delimited(Cursor::new(data), ',').unwrap_err();
    match err {
        InputError::Parse(msg) => assert!(msg.contains("line 3"), "{msg}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_bom_before_quoted_header() {
    let data = "\u{feff}\"Q1\",Q2\n1,2\n";
    let table = parse_delimited(Cursor::new(data), ',').unwrap();
    assert_eq!(table.column("Q1").unwrap()[0].as_deref(), Some("1"));
}

#[test]
fn test_load_reference_xlsx() {
    let dir = make_temp_dir("input");
    let path = dir.join("ref.xlsx");
    write_xlsx(
        &path,
        &[
            &["Q1", "Q2", "Q3"],
            &["1", "yes", "2.5"],
            &["2", "", "NA"],
            &["3", "no", "4"],
        ],
    );
    assert_eq!(detect_format(&path).unwrap(), DatasetFormat::Xlsx);

    let table = load_reference_table(&path).unwrap();
    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.n_columns(), 3);
    let q1: Vec<Option<&str>> = table.column("Q1").unwrap().iter().map(|c| c.as_deref()).collect();
    assert_eq!(q1, vec![Some("1"), Some("2"), Some("3")]);
    assert_eq!(table.column("Q2").unwrap()[1], None);
    assert_eq!(table.column("Q3").unwrap()[0].as_deref(), Some("2.5"));

    let features = vec!["Q1".to_string(), "Q2".to_string(), "Q3".to_string()];
    let baselines = build_baselines(&table, &features, &Stage1Params::default());
    assert_eq!(baselines.numeric("Q1").unwrap().mean, 2.0);
    assert!(baselines.numeric("Q2").is_none());
    assert_eq!(baselines.numeric("Q3").unwrap().n_finite, 2);
}

#[test]
fn test_xlsx_content_wins_over_csv_extension() {
    let dir = make_temp_dir("input");
    let path = dir.join("export.csv");
    write_xlsx(&path, &[&["Q1"], &["7"]]);
    assert_eq!(detect_format(&path).unwrap(), DatasetFormat::Xlsx);
    assert_eq!(load_reference_table(&path).unwrap().n_rows(), 1);
}

#[test]
fn test_corrupt_spreadsheet_is_reported() {
    let dir = make_temp_dir("input");
    let path = dir.join("data.xls");
    write_file(&path, &[0xD0, 0xCF, 0x11, 0xE0, 1, 2, 3, 4]);
    let err = load_reference_table(&path).unwrap_err();
    assert!(matches!(err, InputError::Spreadsheet(_)));
}

#[test]
fn test_missing_reference_file() {
    let err = load_reference_table(Path::new("/nonexistent/ref.csv")).unwrap_err();
    assert!(matches!(err, InputError::MissingInput(_)));
}

#[test]
fn test_fingerprint_changes_with_content() {
    let dir = make_temp_dir("input");
    let path = dir.join("ref.csv");
    write_file(&path, b"Q1\n1\n");
    let a = fingerprint_file(&path).unwrap();
    assert_eq!(a, fingerprint_file(&path).unwrap());
    write_file(&path, b"Q1\n2\n");
    assert_ne!(a, fingerprint_file(&path).unwrap());
}

#[test]
fn test_model_meta_dedups_features() {
    let meta = parse_model_meta(r#"{"features": ["Q1", " Q2 ", "Q1", ""], "labels": {"Q1": "Age"}}"#)
        .unwrap();
    assert_eq!(meta.features, vec!["Q1", "Q2"]);
    assert_eq!(meta.question_labels().label_for("Q1"), "Age (Q1)");
    assert_eq!(meta.question_labels().label_for("Q2"), "Q2");

    assert!(matches!(
        parse_model_meta(r#"{"features": []}"#),
        Err(InputError::InvalidInput(_))
    ));
}

#[test]
fn test_parse_respondent_coerces_by_baseline_kind() {
    let table = parse_delimited(Cursor::new("Q1,Q2\n1,a\n2,b\n3,a\n"), ',').unwrap();
    let features = vec!["Q1".to_string(), "Q2".to_string(), "Q3".to_string()];
    let baselines = build_baselines(&table, &features, &Stage1Params::default());

    let v = parse_respondent(
        r#"{"Q1": "2.5", "Q2": "b", "Q3": null, "Q99": 1}"#,
        &features,
        &baselines,
    )
    .unwrap();
    assert_eq!(v.get("Q1"), &FeatureValue::Numeric(2.5));
    assert_eq!(v.get("Q2"), &FeatureValue::Categorical("b".to_string()));
    assert_eq!(v.get("Q3"), &FeatureValue::Missing);
    assert_eq!(v.get("Q99"), &FeatureValue::Missing);

    let err = parse_respondent(r#"{"Q1": [1, 2]}"#, &features, &baselines).unwrap_err();
    assert!(matches!(err, InputError::InvalidInput(_)));
    let err = parse_respondent("[1]", &features, &baselines).unwrap_err();
    assert!(matches!(err, InputError::InvalidInput(_)));
}

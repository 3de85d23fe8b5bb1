//! Functional tests of the report sections

use crate::common::{run_report, sample_data};
use ncompare::source::memory::{MemoryDataset, MemoryVariable};
use ncompare::CompareOptions;

#[test]
fn test_dimension_lengths_side_by_side() {
    let report = run_report(
        &sample_data::dims_dataset(10),
        &sample_data::dims_dataset(12),
        &CompareOptions::new(),
    )
    .unwrap();

    assert_eq!(report.row("time:"), Some(("10".into(), "12".into())));
    assert_eq!(report.row("lat:"), Some(("5".into(), "5".into())));
    assert_eq!(
        report.row("Number of shared items:"),
        Some(("2".into(), "2".into()))
    );
    assert_eq!(
        report.row("Number of non-shared items:"),
        Some(("0".into(), "0".into()))
    );
    let differing: Vec<&str> = report
        .out
        .differing_rows()
        .map(|row| row.label.as_str())
        .collect();
    assert_eq!(differing, vec!["time:"]);
}

#[test]
fn test_group_alignment() {
    let report = run_report(
        &sample_data::groups_dataset(&["science", "metadata"]),
        &sample_data::groups_dataset(&["science"]),
        &CompareOptions::new(),
    )
    .unwrap();

    let rows = report.out.rows();
    let groups_start = rows
        .iter()
        .rposition(|r| r.label == "Num. items:")
        .unwrap();
    let labels: Vec<&str> = rows[groups_start..groups_start + 5]
        .iter()
        .map(|r| r.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Num. items:",
            "0",
            "1",
            "Number of shared items:",
            "Number of non-shared items:"
        ]
    );
    assert_eq!(rows[groups_start + 1].value_a, "metadata");
    assert_eq!(rows[groups_start + 1].value_b, "");
    assert_eq!(
        (
            rows[groups_start + 4].value_a.as_str(),
            rows[groups_start + 4].value_b.as_str()
        ),
        ("1", "0")
    );
    assert!(report.text().contains("GROUP #science"));
}

#[test]
fn test_attribute_missing_in_second_file() {
    let report = run_report(
        &sample_data::units_dataset(Some("m")),
        &sample_data::units_dataset(None),
        &CompareOptions::new().show_attributes(true),
    )
    .unwrap();

    assert_eq!(report.row("units:"), Some(("m".into(), "".into())));
    assert!(report.out.differing_rows().any(|r| r.label == "units:"));
}

#[test]
fn test_attributes_hidden_by_default() {
    let report = run_report(
        &sample_data::units_dataset(Some("m")),
        &sample_data::units_dataset(None),
        &CompareOptions::new(),
    )
    .unwrap();
    assert!(!report.has_row("units:"));
}

#[test]
fn test_chunk_rows_only_when_requested() {
    let a = sample_data::science_dataset(vec![]);

    let without = run_report(&a, &a, &CompareOptions::new()).unwrap();
    assert!(!without.has_row("chunksize:"));
    assert!(!without.text().contains("chunksize:"));

    let with = run_report(&a, &a, &CompareOptions::new().show_chunks(true)).unwrap();
    let chunk_rows: Vec<_> = with
        .out
        .rows()
        .iter()
        .filter(|r| r.label == "chunksize:")
        .map(|r| r.value_a.clone())
        .collect();
    // pressure is contiguous, temperature is chunked.
    assert_eq!(chunk_rows, vec!["contiguous".to_string(), "[1, 3]".to_string()]);
}

#[test]
fn test_variable_properties_in_sorted_order() {
    let ds = MemoryDataset::new()
        .with_dimension("x", 1)
        .with_variable("zeta", MemoryVariable::new(&["x"], vec![]))
        .with_variable("alpha", MemoryVariable::new(&["x"], vec![]).with_dtype("int8"));
    let report = run_report(&ds, &ds, &CompareOptions::new()).unwrap();

    let names: Vec<&str> = report
        .out
        .rows()
        .iter()
        .filter(|r| r.label == "-----VARIABLE-----:")
        .map(|r| r.value_a.as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert_eq!(report.row("dtype:"), Some(("int8".into(), "int8".into())));
    assert_eq!(report.row("shape:"), Some(("(1)".into(), "(1)".into())));
}

#[test]
fn test_dtype_difference_highlighted() {
    let a = MemoryDataset::new().with_variable("v", MemoryVariable::new(&[], vec![]));
    let b = MemoryDataset::new()
        .with_variable("v", MemoryVariable::new(&[], vec![]).with_dtype("float32"));
    let report = run_report(&a, &b, &CompareOptions::new()).unwrap();

    assert_eq!(
        report.row("dtype:"),
        Some(("float64".into(), "float32".into()))
    );
    assert_eq!(report.row("shape:"), Some(("()".into(), "()".into())));
    assert_eq!(report.out.differing_rows().count(), 1);
}

#[test]
fn test_only_diffs_hides_matching_quantities() {
    let report = run_report(
        &sample_data::dims_dataset(10),
        &sample_data::dims_dataset(12),
        &CompareOptions::new().only_diffs(true),
    )
    .unwrap();

    assert!(report.has_row("time:"));
    assert!(!report.has_row("lat:"));
    assert!(!report.text().contains("lat:"));
    // Label rows stay.
    assert!(report.has_row("Total number of shared items:"));
}

#[test]
fn test_time_decoding_fallback_reports_dimensions() {
    let a = MemoryDataset::from_json_str(&sample_data::undecodable_time_json().to_string())
        .unwrap();
    let report = run_report(&a, &a, &CompareOptions::new()).unwrap();
    assert_eq!(report.row("time:"), Some(("3".into(), "3".into())));
}

#[test]
fn test_missing_variable_reported_inline() {
    let ds = sample_data::science_dataset(vec![Some(1.0); 6]);
    let report = run_report(
        &ds,
        &ds,
        &CompareOptions::new().group("science").variable("humidity"),
    )
    .unwrap();

    let text = report.text();
    assert!(text.contains("Error when comparing values for variable <humidity> in group <science>."));
    assert!(text.contains("Variable not found: <humidity> in group <science>"));
    assert!(text.contains("All variables:"));
    assert!(text.trim_end().ends_with("Done."));
    assert!(report.has_row("Error:"));
}

#[test]
fn test_section_headings_in_order() {
    let ds = sample_data::science_dataset(vec![Some(1.0); 6]);
    let report = run_report(
        &ds,
        &ds,
        &CompareOptions::new().group("science").variable("temperature"),
    )
    .unwrap();

    assert_eq!(
        report.out.printed_history(),
        [
            "\nRoot-level Dimensions:".to_string(),
            "\nGroups:".to_string(),
            "\nVariables within specified group <science>:".to_string(),
            "\nSample values within specified variable <temperature>:".to_string(),
            "\nChecking multiple random values within specified variable <temperature>:"
                .to_string(),
            "\nAll variables:".to_string(),
        ]
    );
    assert!(report.text().contains("[1.0, 1.0, 1.0]"));
}

#[test]
fn test_group_without_variable_skips_sampling() {
    let ds = sample_data::science_dataset(vec![]);
    let report = run_report(&ds, &ds, &CompareOptions::new().group("science")).unwrap();
    assert!(report
        .text()
        .contains("No variable selected for comparison. Skipping.."));
    assert!(!report.text().contains("Checking multiple random values"));
}

//! Edge case tests for inputs and report destinations

use crate::common::{run_report, sample_data, TestFixture};
use ncompare::paths::ensure_valid_path_with_suffix;
use ncompare::{compare, CompareOptions, MemoryDataset, NcompareError, VariableCounts};
use std::path::PathBuf;

#[test]
fn test_nonexistent_first_file() {
    let fixture = TestFixture::new().unwrap();
    let b = fixture.create_json("b.json", &sample_data::simple_json()).unwrap();

    let err = compare("/nonexistent/path/a.nc", &b, &CompareOptions::new()).unwrap_err();
    assert!(err.to_string().contains("does not exist"), "got: {err}");
}

#[test]
fn test_unsupported_extension() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.path("a.dat");
    std::fs::write(&a, "not a dataset").unwrap();

    let err = compare(&a, &a, &CompareOptions::new()).unwrap_err();
    assert!(matches!(err, NcompareError::SourceOpen { .. }));
}

#[test]
fn test_corrupted_json() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_corrupted_file("broken.json").unwrap();

    let err = compare(&a, &a, &CompareOptions::new()).unwrap_err();
    assert!(matches!(err, NcompareError::SourceOpen { .. }));
}

#[cfg(not(feature = "netcdf"))]
#[test]
fn test_netcdf_requires_feature() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_corrupted_file("a.nc").unwrap();

    let err = compare(&a, &a, &CompareOptions::new()).unwrap_err();
    assert!(err.to_string().contains("netcdf"), "got: {err}");
}

#[test]
fn test_empty_datasets() {
    let empty = MemoryDataset::new();
    let report = run_report(&empty, &empty, &CompareOptions::new()).unwrap();

    assert_eq!(report.counts, VariableCounts::default());
    assert_eq!(report.row("Num. items:"), Some(("0".into(), "0".into())));
    assert_eq!(
        report.row("Total number of non-shared items:"),
        Some(("0".into(), "0".into()))
    );
}

#[test]
fn test_empty_json_object_is_a_dataset() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_json("a.json", &serde_json::json!({})).unwrap();
    let b = fixture.create_json("b.json", &sample_data::simple_json()).unwrap();

    let counts = compare(&a, &b, &CompareOptions::new()).unwrap();
    assert_eq!(counts.right, 1);
    assert_eq!(counts.shared, 0);
}

#[test]
fn test_zero_length_axis_is_indeterminate() {
    let mut ds = sample_data::science_dataset(vec![]);
    if let Some(group) = ds.root.groups.get_mut("science") {
        group.dimensions.insert("y".to_string(), 0);
    }
    let options = CompareOptions::new().group("science").variable("temperature");
    let report = run_report(&ds, &ds, &options).unwrap();

    let text = report.text();
    assert!(text.contains(&"n".repeat(100)));
    assert!(text.contains(" No mismatches."));
}

#[test]
fn test_report_suffix_normalization() {
    assert_eq!(
        ensure_valid_path_with_suffix("out", ".csv").unwrap(),
        PathBuf::from("out.csv")
    );
    assert_eq!(
        ensure_valid_path_with_suffix("out.CSV", ".csv").unwrap(),
        PathBuf::from("out.CSV")
    );
    assert!(matches!(
        ensure_valid_path_with_suffix("out.xlsx", ".csv"),
        Err(NcompareError::PathWrongSuffix { .. })
    ));
}

#[test]
fn test_unwritable_transcript_is_an_error() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_json("a.json", &sample_data::simple_json()).unwrap();

    let options = CompareOptions::new().file_text("/nonexistent-dir/report.txt");
    let err = compare(&a, &a, &options).unwrap_err();
    assert!(matches!(err, NcompareError::ExportWrite { .. }));
}

#[test]
fn test_huge_dimensions_without_data() {
    let fixture = TestFixture::new().unwrap();
    let huge = serde_json::json!({
        "dimensions": {"a": 10_000_000_000u64, "b": 10_000_000_000u64},
        "variables": {"v": {"dimensions": ["a", "b"]}}
    });
    let a = fixture.create_json("huge.json", &huge).unwrap();

    let result = compare(&a, &a, &CompareOptions::new());
    if cfg!(target_pointer_width = "64") {
        assert_eq!(result.unwrap().shared, 1);
    } else {
        assert!(matches!(result, Err(NcompareError::SourceOpen { .. })));
    }
}

#[test]
fn test_huge_dimensions_with_data_rejected() {
    let fixture = TestFixture::new().unwrap();
    let huge = serde_json::json!({
        "dimensions": {"a": 10_000_000_000u64, "b": 10_000_000_000u64},
        "variables": {"v": {"dimensions": ["a", "b"], "data": [1.0, 2.0]}}
    });
    let a = fixture.create_json("huge.json", &huge).unwrap();

    let err = compare(&a, &a, &CompareOptions::new()).unwrap_err();
    assert!(matches!(err, NcompareError::SourceOpen { .. }));
}

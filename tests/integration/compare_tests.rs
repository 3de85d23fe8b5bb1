//! End-to-end tests of `compare` on JSON datasets written to disk

use crate::common::{sample_data, TestFixture};
use ncompare::{compare, CompareOptions, NcompareError, VariableCounts};

#[test]
fn test_compare_identical_files() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_json("a.json", &sample_data::simple_json()).unwrap();
    let b = fixture.create_json("b.json", &sample_data::simple_json()).unwrap();

    let counts = compare(&a, &b, &CompareOptions::new()).unwrap();
    assert_eq!(
        counts,
        VariableCounts {
            left: 0,
            right: 0,
            shared: 2
        }
    );
}

#[test]
fn test_compare_with_targeted_variable() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture
        .create_dataset("a.json", &sample_data::science_dataset(vec![Some(1.0); 6]))
        .unwrap();
    let b = fixture
        .create_dataset("b.json", &sample_data::science_dataset(vec![Some(2.0); 6]))
        .unwrap();

    let options = CompareOptions::new()
        .group("science")
        .variable("temperature")
        .show_chunks(true)
        .show_attributes(true);
    let counts = compare(&a, &b, &options).unwrap();
    assert_eq!(counts.shared, 2);
}

#[test]
fn test_compare_lookup_error_still_succeeds() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_json("a.json", &sample_data::simple_json()).unwrap();
    let b = fixture.create_json("b.json", &sample_data::simple_json()).unwrap();

    let options = CompareOptions::new().group("not_a_group").variable("w");
    assert!(compare(&a, &b, &options).is_ok());
}

#[test]
fn test_compare_writes_transcript() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_json("a.json", &sample_data::simple_json()).unwrap();
    let b = fixture
        .create_dataset("b.json", &sample_data::units_dataset(Some("m")))
        .unwrap();

    let options = CompareOptions::new().file_text(fixture.path("report"));
    compare(&a, &b, &options).unwrap();

    let text = std::fs::read_to_string(fixture.path("report.txt")).unwrap();
    assert!(text.starts_with("File A: "));
    assert!(text.contains("Root-level Dimensions:"));
    assert!(text.contains("All variables:"));
    assert!(text.trim_end().ends_with("Done."));
    assert!(!text.contains('\x1b'));
}

#[test]
fn test_compare_rejects_missing_input() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_json("a.json", &sample_data::simple_json()).unwrap();

    let err = compare(&a, fixture.path("missing.json"), &CompareOptions::new()).unwrap_err();
    assert!(matches!(err, NcompareError::PathNotFound { .. }));
}

#[test]
fn test_compare_rejects_wrong_report_suffix_before_reading() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_json("a.json", &sample_data::simple_json()).unwrap();
    let b = fixture.create_json("b.json", &sample_data::simple_json()).unwrap();

    let options = CompareOptions::new().file_csv(fixture.path("report.txt"));
    let err = compare(&a, &b, &options).unwrap_err();
    assert!(matches!(err, NcompareError::PathWrongSuffix { .. }));
    assert!(!fixture.path("report.txt").exists());
}

#[test]
fn test_compare_falls_back_when_time_decoding_fails() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture
        .create_json("a.json", &sample_data::undecodable_time_json())
        .unwrap();
    let b = fixture.create_json("b.json", &sample_data::simple_json()).unwrap();

    let counts = compare(&a, &b, &CompareOptions::new()).unwrap();
    assert_eq!(counts.left, 1);
    assert_eq!(counts.right, 1);
}

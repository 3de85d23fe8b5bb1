//! Common test utilities and helpers

use ncompare::compare::{compare_with_outputter, CompareOptions, Dataset, VariableCounts};
use ncompare::output::{FormatPolicy, Outputter, SharedBuffer};
use ncompare::{MemoryDataset, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for a temporary directory of datasets and reports
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write a JSON dataset description
    pub fn create_json(&self, name: &str, data: &serde_json::Value) -> Result<PathBuf> {
        let path = self.path(name);
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write an in-memory dataset as JSON
    pub fn create_dataset(&self, name: &str, dataset: &MemoryDataset) -> Result<PathBuf> {
        let path = self.path(name);
        fs::write(&path, serde_json::to_string_pretty(dataset)?)?;
        Ok(path)
    }

    /// Create a corrupted file for testing error handling
    pub fn create_corrupted_file(&self, name: &str) -> Result<PathBuf> {
        let path = self.path(name);
        fs::write(&path, b"\x00\x01\x02\x03invalid_data\xff\xfe")?;
        Ok(path)
    }
}

/// A finished report captured in memory
pub struct CapturedReport {
    pub out: Outputter,
    pub buffer: SharedBuffer,
    pub counts: VariableCounts,
}

impl CapturedReport {
    pub fn text(&self) -> String {
        self.buffer.contents()
    }

    /// Recorded values of the first row carrying `label`
    pub fn row(&self, label: &str) -> Option<(String, String)> {
        self.out
            .rows()
            .iter()
            .find(|row| row.label == label)
            .map(|row| (row.value_a.clone(), row.value_b.clone()))
    }

    pub fn has_row(&self, label: &str) -> bool {
        self.row(label).is_some()
    }
}

/// Run the whole report on two in-memory datasets with a seeded generator
pub fn run_report(
    a: &MemoryDataset,
    b: &MemoryDataset,
    options: &CompareOptions,
) -> Result<CapturedReport> {
    let buffer = SharedBuffer::new();
    let mut out = Outputter::with_writer(FormatPolicy::plain(), Box::new(buffer.clone()))
        .with_only_diffs(options.only_diffs);
    let mut rng = StdRng::seed_from_u64(42);
    let counts = compare_with_outputter(
        &mut out,
        Dataset {
            path: Path::new("a.json"),
            source: a,
        },
        Dataset {
            path: Path::new("b.json"),
            source: b,
        },
        options,
        &mut rng,
    )?;
    Ok(CapturedReport {
        out,
        buffer,
        counts,
    })
}

/// Sample datasets for testing
pub mod sample_data {
    use ncompare::source::memory::{MemoryGroup, MemoryVariable};
    use ncompare::source::AttrValue;
    use ncompare::MemoryDataset;
    use serde_json::json;

    /// Root dimensions `time` and `lat` with the given time length
    pub fn dims_dataset(time_len: u64) -> MemoryDataset {
        MemoryDataset::new()
            .with_dimension("time", time_len)
            .with_dimension("lat", 5)
    }

    /// Empty groups with the given names
    pub fn groups_dataset(names: &[&str]) -> MemoryDataset {
        names.iter().fold(MemoryDataset::new(), |ds, name| {
            ds.with_group(name, MemoryGroup::default())
        })
    }

    /// A 2x3 grid variable `temperature` inside group `science`
    pub fn science_dataset(values: Vec<Option<f64>>) -> MemoryDataset {
        let mut group = MemoryGroup::default();
        group.dimensions.insert("y".to_string(), 2);
        group.dimensions.insert("x".to_string(), 3);
        group.variables.insert(
            "temperature".to_string(),
            MemoryVariable::new(&["y", "x"], values)
                .with_chunking(&[1, 3])
                .with_attribute("units", AttrValue::Text("K".into())),
        );
        group.variables.insert(
            "pressure".to_string(),
            MemoryVariable::new(&["x"], vec![]).with_dtype("float32"),
        );
        MemoryDataset::new().with_group("science", group)
    }

    /// A root variable `z1`, optionally carrying a `units` attribute
    pub fn units_dataset(units: Option<&str>) -> MemoryDataset {
        let mut variable = MemoryVariable::new(&["x"], vec![Some(1.0), Some(2.0)]);
        if let Some(units) = units {
            variable = variable.with_attribute("units", AttrValue::Text(units.into()));
        }
        MemoryDataset::new()
            .with_dimension("x", 2)
            .with_variable("z1", variable)
    }

    /// A time axis whose units no decoder understands
    pub fn undecodable_time_json() -> serde_json::Value {
        json!({
            "dimensions": {"time": 3},
            "variables": {
                "time": {
                    "dtype": "int64",
                    "dimensions": ["time"],
                    "attributes": {"units": "days since the beginning"},
                    "data": [0.0, 1.0, 2.0]
                }
            }
        })
    }

    pub fn simple_json() -> serde_json::Value {
        json!({
            "dimensions": {"time": 2, "lat": 3},
            "variables": {
                "z1": {
                    "dimensions": ["time", "lat"],
                    "chunking": [1, 3],
                    "attributes": {"units": "m", "valid_range": [0, 1, 2, 3, 4, 5, 6]},
                    "data": [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
                }
            },
            "groups": {
                "science": {
                    "variables": {
                        "w": {"dtype": "int16", "dimensions": ["lat"], "data": [1, 2, 3]}
                    }
                }
            }
        })
    }
}

//! In-memory datasets described as JSON
//!
//! A JSON dataset mirrors the layout of a NetCDF file:
//!
//! ```json
//! {
//!   "dimensions": { "time": 3, "lat": 2 },
//!   "variables": {
//!     "z1": {
//!       "dtype": "float64",
//!       "dimensions": ["time", "lat"],
//!       "chunking": [1, 2],
//!       "attributes": { "units": "m" },
//!       "data": [1.0, 2.0, null, 4.0, 5.0, 6.0]
//!     }
//!   },
//!   "groups": { "science": { "variables": {} } }
//! }
//! ```
//!
//! `data` is row-major; `null` marks an undefined value. Variable dimensions
//! resolve against the enclosing group first, then the root.

use super::{time, AttrValue, DataSource, TimeDecoding, VariableMetadata};
use crate::error::{NcompareError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_dtype() -> String {
    "float64".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryVariable {
    #[serde(default = "default_dtype")]
    pub dtype: String,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub chunking: Option<Vec<usize>>,
    #[serde(default)]
    pub attributes: IndexMap<String, AttrValue>,
    #[serde(default)]
    pub data: Vec<Option<f64>>,
}

impl MemoryVariable {
    pub fn new(dimensions: &[&str], data: Vec<Option<f64>>) -> Self {
        Self {
            dtype: default_dtype(),
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            data,
            ..Default::default()
        }
    }

    pub fn with_dtype(mut self, dtype: &str) -> Self {
        self.dtype = dtype.to_string();
        self
    }

    pub fn with_chunking(mut self, chunks: &[usize]) -> Self {
        self.chunking = Some(chunks.to_vec());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: AttrValue) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryGroup {
    #[serde(default)]
    pub dimensions: IndexMap<String, u64>,
    #[serde(default)]
    pub variables: IndexMap<String, MemoryVariable>,
    #[serde(default)]
    pub groups: IndexMap<String, MemoryGroup>,
}

/// A dataset held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDataset {
    #[serde(flatten)]
    pub root: MemoryGroup,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NcompareError::source_open(path, e.to_string()))?;
        let dataset: Self = serde_json::from_str(&content)
            .map_err(|e| NcompareError::source_open(path, e.to_string()))?;
        dataset
            .validate()
            .map_err(|e| NcompareError::source_open(path, e.to_string()))?;
        log::debug!(
            "Loaded JSON dataset {} ({} root variables, {} groups)",
            path.display(),
            dataset.root.variables.len(),
            dataset.root.groups.len()
        );
        Ok(dataset)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn with_dimension(mut self, name: &str, len: u64) -> Self {
        self.root.dimensions.insert(name.to_string(), len);
        self
    }

    pub fn with_variable(mut self, name: &str, variable: MemoryVariable) -> Self {
        self.root.variables.insert(name.to_string(), variable);
        self
    }

    pub fn with_group(mut self, name: &str, group: MemoryGroup) -> Self {
        self.root.groups.insert(name.to_string(), group);
        self
    }

    /// Check that every variable's dimensions resolve and its data fits its shape.
    pub fn validate(&self) -> Result<()> {
        self.validate_group(None, &self.root)
    }

    fn validate_group(&self, name: Option<&str>, group: &MemoryGroup) -> Result<()> {
        for (var_name, variable) in &group.variables {
            let shape = self.resolve_shape(group, variable)?;
            // Without stored data every value is undefined, whatever the size.
            if variable.data.is_empty() {
                continue;
            }
            let expected = element_count(&shape).ok_or_else(|| {
                NcompareError::invalid_input(format!(
                    "variable <{var_name}> with shape {shape:?} is too large to hold data"
                ))
            })?;
            if variable.data.len() != expected {
                return Err(NcompareError::invalid_input(format!(
                    "variable <{var_name}> in {} holds {} values, expected {expected}",
                    name.unwrap_or("root group"),
                    variable.data.len()
                )));
            }
        }
        // Nested groups resolve dimensions against themselves and the root only.
        for (child_name, child) in &group.groups {
            self.validate_group(Some(child_name), child)?;
        }
        Ok(())
    }

    fn resolve_shape(&self, group: &MemoryGroup, variable: &MemoryVariable) -> Result<Vec<usize>> {
        variable
            .dimensions
            .iter()
            .map(|dim| {
                group
                    .dimensions
                    .get(dim)
                    .or_else(|| self.root.dimensions.get(dim))
                    .ok_or_else(|| {
                        NcompareError::invalid_input(format!("unknown dimension <{dim}>"))
                    })
                    .and_then(|len| {
                        usize::try_from(*len).map_err(|_| {
                            NcompareError::invalid_input(format!(
                                "dimension <{dim}> of length {len} does not fit in memory"
                            ))
                        })
                    })
            })
            .collect()
    }

    fn group(&self, group: Option<&str>) -> Result<&MemoryGroup> {
        match group {
            None => Ok(&self.root),
            Some(name) => self
                .root
                .groups
                .get(name)
                .ok_or_else(|| NcompareError::group_not_found(name)),
        }
    }

    fn variable(&self, name: &str, group: Option<&str>) -> Result<(&MemoryGroup, &MemoryVariable)> {
        let grp = self.group(group)?;
        let variable = grp
            .variables
            .get(name)
            .ok_or_else(|| NcompareError::variable_not_found(name, group))?;
        Ok((grp, variable))
    }
}

fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, len| acc.checked_mul(*len))
}

/// Row-major offset of an in-bounds `index`.
fn row_major_offset(index: &[usize], shape: &[usize]) -> Option<usize> {
    index
        .iter()
        .zip(shape)
        .try_fold(0usize, |acc, (i, len)| acc.checked_mul(*len)?.checked_add(*i))
}

fn value_at(variable: &MemoryVariable, offset: usize) -> f64 {
    variable
        .data
        .get(offset)
        .copied()
        .flatten()
        .unwrap_or(f64::NAN)
}

impl DataSource for MemoryDataset {
    fn dimensions(&self, decoding: TimeDecoding) -> Result<Vec<(String, u64)>> {
        if decoding == TimeDecoding::Decode {
            for (name, variable) in &self.root.variables {
                time::check_time_units(name, &variable.attributes)?;
            }
        }
        Ok(self
            .root
            .dimensions
            .iter()
            .map(|(name, len)| (name.clone(), *len))
            .collect())
    }

    fn group_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.root.groups.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn variable_names(&self, group: Option<&str>) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.group(group)?.variables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn variable_metadata(&self, name: &str, group: Option<&str>) -> Result<VariableMetadata> {
        let (grp, variable) = self.variable(name, group)?;
        Ok(VariableMetadata {
            dtype: variable.dtype.clone(),
            shape: self.resolve_shape(grp, variable)?,
            chunking: variable.chunking.clone(),
            attributes: variable.attributes.clone(),
            scale_factor: variable.attributes.get("scale_factor").and_then(AttrValue::as_f64),
        })
    }

    fn sample_value(&self, name: &str, group: Option<&str>, index: &[usize]) -> Result<f64> {
        let (grp, variable) = self.variable(name, group)?;
        let shape = self.resolve_shape(grp, variable)?;
        if index.len() != shape.len() || index.iter().zip(&shape).any(|(i, len)| i >= len) {
            return Err(NcompareError::source_read(format!(
                "index {index:?} is out of bounds for <{name}> with shape {shape:?}"
            )));
        }

        if variable.data.is_empty() {
            return Ok(f64::NAN);
        }
        let offset = row_major_offset(index, &shape).ok_or_else(|| {
            NcompareError::source_read(format!("index {index:?} overflows the shape of <{name}>"))
        })?;
        Ok(value_at(variable, offset))
    }

    fn preview_values(&self, name: &str, group: Option<&str>, count: usize) -> Result<Vec<f64>> {
        let (grp, variable) = self.variable(name, group)?;
        let shape = self.resolve_shape(grp, variable)?;
        if shape.iter().any(|len| *len == 0) {
            return Ok(Vec::new());
        }
        let row_len = shape.last().copied().unwrap_or(1);
        Ok((0..row_len.min(count)).map(|i| value_at(variable, i)).collect())
    }
}

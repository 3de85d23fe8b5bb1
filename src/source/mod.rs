//! Read-only access to the two datasets being compared
//!
//! Comparison code only talks to [`DataSource`]; [`open_source`] picks a
//! backend from the file extension.

pub mod attribute;
pub mod memory;
#[cfg(feature = "netcdf")]
pub mod netcdf_file;
pub mod time;

pub use attribute::{AttrScalar, AttrValue};
pub use memory::MemoryDataset;

use crate::error::{NcompareError, Result};
use indexmap::IndexMap;
use std::path::Path;

/// Whether time-like variables are interpreted while reading dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDecoding {
    Decode,
    Raw,
}

/// Declared properties of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMetadata {
    pub dtype: String,
    pub shape: Vec<usize>,
    /// `None` for contiguous storage.
    pub chunking: Option<Vec<usize>>,
    pub attributes: IndexMap<String, AttrValue>,
    pub scale_factor: Option<f64>,
}

impl VariableMetadata {
    pub fn shape_string(&self) -> String {
        format_shape(&self.shape)
    }

    pub fn chunking_string(&self) -> String {
        match &self.chunking {
            Some(chunks) => format!(
                "[{}]",
                chunks.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            ),
            None => "contiguous".to_string(),
        }
    }
}

/// Render a shape or index tuple, e.g. `(10, 5)`.
pub fn format_shape(dims: &[usize]) -> String {
    format!(
        "({})",
        dims.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )
}

/// A dataset from which dimensions, groups, and variables can be queried.
///
/// `group = None` addresses the root group.
pub trait DataSource {
    /// Root-level `(name, length)` pairs.
    ///
    /// With [`TimeDecoding::Decode`], a variable carrying unreadable time units
    /// fails with [`NcompareError::TimeDecoding`].
    fn dimensions(&self, decoding: TimeDecoding) -> Result<Vec<(String, u64)>>;

    /// Names of the root-level groups, sorted.
    fn group_names(&self) -> Result<Vec<String>>;

    /// Names of the variables in `group`, sorted.
    fn variable_names(&self, group: Option<&str>) -> Result<Vec<String>>;

    fn variable_metadata(&self, name: &str, group: Option<&str>) -> Result<VariableMetadata>;

    /// Value at `index`, converted to `f64`; undefined values read as NaN.
    fn sample_value(&self, name: &str, group: Option<&str>, index: &[usize]) -> Result<f64>;

    /// Up to `count` leading values of the first row of the variable.
    fn preview_values(&self, name: &str, group: Option<&str>, count: usize) -> Result<Vec<f64>>;
}

/// Open the dataset at `path` with the backend matching its extension.
pub fn open_source(path: &Path) -> Result<Box<dyn DataSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    log::debug!("Opening data source {} (extension '{}')", path.display(), ext);

    match ext.as_str() {
        "json" => Ok(Box::new(MemoryDataset::from_path(path)?)),
        "nc" | "nc4" | "h5" | "hdf5" | "he5" => open_netcdf(path),
        _ => Err(NcompareError::source_open(
            path,
            format!("unsupported file extension '{ext}'"),
        )),
    }
}

#[cfg(feature = "netcdf")]
fn open_netcdf(path: &Path) -> Result<Box<dyn DataSource>> {
    Ok(Box::new(netcdf_file::NetcdfSource::open(path)?))
}

#[cfg(not(feature = "netcdf"))]
fn open_netcdf(path: &Path) -> Result<Box<dyn DataSource>> {
    Err(NcompareError::source_open(
        path,
        "ncompare was built without the 'netcdf' feature",
    ))
}

//! NetCDF-4 / HDF5 files through the `netcdf` crate

use super::{time, AttrScalar, AttrValue, DataSource, TimeDecoding, VariableMetadata};
use crate::error::{NcompareError, Result};
use indexmap::IndexMap;
use netcdf::AttributeValue;
use std::path::{Path, PathBuf};

pub struct NetcdfSource {
    path: PathBuf,
    file: netcdf::File,
}

impl NetcdfSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            netcdf::open(path).map_err(|e| NcompareError::source_open(path, e.to_string()))?;
        log::debug!("Opened NetCDF file {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    fn group(&self, group: Option<&str>) -> Result<netcdf::Group<'_>> {
        let found = match group {
            None => self.file.root(),
            Some(name) => self.file.group(name).map_err(|e| self.read_error(e))?,
        };
        found.ok_or_else(|| NcompareError::group_not_found(group.unwrap_or("/")))
    }

    fn with_variable<T>(
        &self,
        name: &str,
        group: Option<&str>,
        f: impl FnOnce(&netcdf::Variable<'_>) -> Result<T>,
    ) -> Result<T> {
        let grp = self.group(group)?;
        let variable = grp
            .variable(name)
            .ok_or_else(|| NcompareError::variable_not_found(name, group))?;
        f(&variable)
    }

    fn read_error(&self, err: netcdf::Error) -> NcompareError {
        NcompareError::source_read(format!("{}: {err}", self.path.display()))
    }
}

fn attributes_of(variable: &netcdf::Variable<'_>) -> Result<IndexMap<String, AttrValue>> {
    let mut attributes = IndexMap::new();
    for attr in variable.attributes() {
        let value = attr
            .value()
            .map_err(|e| NcompareError::source_read(format!("attribute {}: {e}", attr.name())))?;
        attributes.insert(attr.name().to_string(), convert_attribute(value));
    }
    Ok(attributes)
}

fn ints<T: Into<i64> + Copy>(values: &[T]) -> AttrValue {
    AttrValue::List(values.iter().map(|v| AttrScalar::Int((*v).into())).collect())
}

fn floats<T: Into<f64> + Copy>(values: &[T]) -> AttrValue {
    AttrValue::List(values.iter().map(|v| AttrScalar::Float((*v).into())).collect())
}

fn convert_attribute(value: AttributeValue) -> AttrValue {
    match value {
        AttributeValue::Str(s) => AttrValue::Text(s),
        AttributeValue::Strs(items) => {
            AttrValue::List(items.into_iter().map(AttrScalar::Text).collect())
        }
        AttributeValue::Schar(v) => AttrValue::Int(v.into()),
        AttributeValue::Uchar(v) => AttrValue::Int(v.into()),
        AttributeValue::Short(v) => AttrValue::Int(v.into()),
        AttributeValue::Ushort(v) => AttrValue::Int(v.into()),
        AttributeValue::Int(v) => AttrValue::Int(v.into()),
        AttributeValue::Uint(v) => AttrValue::Int(v.into()),
        AttributeValue::Longlong(v) => AttrValue::Int(v),
        AttributeValue::Float(v) => AttrValue::Float(v.into()),
        AttributeValue::Double(v) => AttrValue::Float(v),
        AttributeValue::Schars(v) => ints(&v),
        AttributeValue::Uchars(v) => ints(&v),
        AttributeValue::Shorts(v) => ints(&v),
        AttributeValue::Ushorts(v) => ints(&v),
        AttributeValue::Ints(v) => ints(&v),
        AttributeValue::Uints(v) => ints(&v),
        AttributeValue::Longlongs(v) => ints(&v),
        AttributeValue::Floats(v) => floats(&v),
        AttributeValue::Doubles(v) => floats(&v),
        other => AttrValue::Text(format!("{other:?}")),
    }
}

/// Map the library's type description onto numpy-style names.
fn dtype_name(variable: &netcdf::Variable<'_>) -> String {
    let raw = format!("{:?}", variable.vartype());
    let name = match raw.as_str() {
        "Int(I8)" => "int8",
        "Int(U8)" => "uint8",
        "Int(I16)" => "int16",
        "Int(U16)" => "uint16",
        "Int(I32)" => "int32",
        "Int(U32)" => "uint32",
        "Int(I64)" => "int64",
        "Int(U64)" => "uint64",
        "Float(F32)" => "float32",
        "Float(F64)" => "float64",
        "Char" => "char",
        "String" => "str",
        _ => return raw.to_lowercase(),
    };
    name.to_string()
}

fn read_f64(variable: &netcdf::Variable<'_>, index: &[usize], fill: Option<f64>) -> Result<f64> {
    let value = variable
        .get_value::<f64, _>(index)
        .map_err(|e| NcompareError::source_read(format!("{} at {index:?}: {e}", variable.name())))?;
    Ok(match fill {
        Some(fill) if value == fill => f64::NAN,
        _ => value,
    })
}

fn fill_value(variable: &netcdf::Variable<'_>) -> Option<f64> {
    attributes_of(variable)
        .ok()
        .and_then(|attrs| attrs.get("_FillValue").and_then(AttrValue::as_f64))
}

impl DataSource for NetcdfSource {
    fn dimensions(&self, decoding: TimeDecoding) -> Result<Vec<(String, u64)>> {
        if decoding == TimeDecoding::Decode {
            for variable in self.file.variables() {
                time::check_time_units(&variable.name(), &attributes_of(&variable)?)?;
            }
        }
        Ok(self
            .file
            .dimensions()
            .map(|dim| (dim.name(), dim.len() as u64))
            .collect())
    }

    fn group_names(&self) -> Result<Vec<String>> {
        let groups = self.file.groups().map_err(|e| self.read_error(e))?;
        let mut names: Vec<String> = groups.map(|g| g.name()).collect();
        names.sort();
        Ok(names)
    }

    fn variable_names(&self, group: Option<&str>) -> Result<Vec<String>> {
        let grp = self.group(group)?;
        let mut names: Vec<String> = grp.variables().map(|v| v.name()).collect();
        names.sort();
        Ok(names)
    }

    fn variable_metadata(&self, name: &str, group: Option<&str>) -> Result<VariableMetadata> {
        self.with_variable(name, group, |variable| {
            let attributes = attributes_of(variable)?;
            let chunking = variable.chunking().map_err(|e| self.read_error(e))?;
            Ok(VariableMetadata {
                dtype: dtype_name(variable),
                shape: variable.dimensions().iter().map(|d| d.len()).collect(),
                chunking,
                scale_factor: attributes.get("scale_factor").and_then(AttrValue::as_f64),
                attributes,
            })
        })
    }

    fn sample_value(&self, name: &str, group: Option<&str>, index: &[usize]) -> Result<f64> {
        self.with_variable(name, group, |variable| {
            read_f64(variable, index, fill_value(variable))
        })
    }

    fn preview_values(&self, name: &str, group: Option<&str>, count: usize) -> Result<Vec<f64>> {
        self.with_variable(name, group, |variable| {
            let shape: Vec<usize> = variable.dimensions().iter().map(|d| d.len()).collect();
            if shape.iter().any(|len| *len == 0) {
                return Ok(Vec::new());
            }
            let fill = fill_value(variable);
            let row_len = shape.last().copied().unwrap_or(1);
            let mut index = vec![0usize; shape.len()];
            let mut values = Vec::new();
            for j in 0..row_len.min(count) {
                if let Some(last) = index.last_mut() {
                    *last = j;
                }
                values.push(read_f64(variable, &index, fill)?);
            }
            Ok(values)
        })
    }
}

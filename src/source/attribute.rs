//! Variable attribute values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Elements shown before a list attribute is cut short on screen.
pub const DISPLAY_LIST_LIMIT: usize = 5;

/// One element of a list-valued attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrScalar {
    Int(i64),
    Float(f64),
    Text(String),
}

/// An attribute value as read from a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrScalar>),
}

impl AttrValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::List(items) if items.len() == 1 => match &items[0] {
                AttrScalar::Int(v) => Some(*v as f64),
                AttrScalar::Float(v) => Some(*v),
                AttrScalar::Text(_) => None,
            },
            AttrValue::Text(_) | AttrValue::List(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Screen form: lists longer than [`DISPLAY_LIST_LIMIT`] are cut short.
    ///
    /// The full form from `Display` is what goes into exports and difference
    /// checks.
    pub fn display_truncated(&self) -> String {
        match self {
            AttrValue::List(items) if items.len() > DISPLAY_LIST_LIMIT => {
                let shown: Vec<String> = items
                    .iter()
                    .take(DISPLAY_LIST_LIMIT)
                    .map(ToString::to_string)
                    .collect();
                format!("[{}, ...]", shown.join(", "))
            }
            other => other.to_string(),
        }
    }
}

/// Floats keep a fractional part so `1.0` and `1` stay distinguishable.
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    write!(f, "{v:?}")
}

impl fmt::Display for AttrScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrScalar::Int(v) => write!(f, "{v}"),
            AttrScalar::Float(v) => write_float(f, *v),
            AttrScalar::Text(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write_float(f, *v),
            AttrValue::Text(s) => write!(f, "{s}"),
            AttrValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

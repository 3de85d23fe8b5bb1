//! The comparison pass over two datasets
//!
//! [`compare`] validates paths, opens both sources and walks the fixed
//! sequence of report sections: dimensions, groups, an optional targeted
//! inspection of one group and variable, and finally every variable shared by
//! the two files.

use crate::error::{NcompareError, Result};
use crate::output::{Color, FormatPolicy, Outputter};
use crate::paths::{ensure_valid_path_exists, ensure_valid_path_with_suffix};
use crate::sampling::{compare_samples_with_rng, SampleConfig, SampleTarget};
use crate::sequence::{align, common_elements, count_diffs};
use crate::source::{open_source, AttrValue, DataSource, TimeDecoding};
use indexmap::IndexMap;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Number of leading values shown for the selected variable.
pub const PREVIEW_LEN: usize = 10;

/// Longest variable name shown in a `-----VARIABLE-----:` row.
const VARIABLE_NAME_WIDTH: usize = 47;

/// Settings for one comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareOptions {
    pub comparison_var_group: Option<String>,
    pub comparison_var_name: Option<String>,
    pub show_chunks: bool,
    pub show_attributes: bool,
    pub no_color: bool,
    pub only_diffs: bool,
    pub file_text: Option<PathBuf>,
    pub file_csv: Option<PathBuf>,
    pub file_xlsx: Option<PathBuf>,
    pub sampling: SampleConfig,
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.comparison_var_group = Some(group.into());
        self
    }

    pub fn variable(mut self, variable: impl Into<String>) -> Self {
        self.comparison_var_name = Some(variable.into());
        self
    }

    pub fn show_chunks(mut self, show: bool) -> Self {
        self.show_chunks = show;
        self
    }

    pub fn show_attributes(mut self, show: bool) -> Self {
        self.show_attributes = show;
        self
    }

    pub fn no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    pub fn only_diffs(mut self, only_diffs: bool) -> Self {
        self.only_diffs = only_diffs;
        self
    }

    pub fn file_text(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_text = Some(path.into());
        self
    }

    pub fn file_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_csv = Some(path.into());
        self
    }

    pub fn file_xlsx(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_xlsx = Some(path.into());
        self
    }

    pub fn sampling(mut self, sampling: SampleConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Validate and normalize the report destinations.
    fn resolve_outputs(&self) -> Result<Self> {
        let normalize = |path: &Option<PathBuf>, suffix: &str| {
            path.as_ref()
                .map(|p| ensure_valid_path_with_suffix(p, suffix))
                .transpose()
        };
        Ok(Self {
            file_text: normalize(&self.file_text, ".txt")?,
            file_csv: normalize(&self.file_csv, ".csv")?,
            file_xlsx: normalize(&self.file_xlsx, ".xlsx")?,
            ..self.clone()
        })
    }
}

/// Variable tallies across the root group and every common group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableCounts {
    pub left: usize,
    pub right: usize,
    pub shared: usize,
}

impl VariableCounts {
    fn add(&mut self, (left, right, shared): (usize, usize, usize)) {
        self.left += left;
        self.right += right;
        self.shared += shared;
    }
}

/// One side of the comparison: a display path and the opened source.
#[derive(Clone, Copy)]
pub struct Dataset<'a> {
    pub path: &'a Path,
    pub source: &'a dyn DataSource,
}

/// Compare the structure of the datasets at `nc_a` and `nc_b`, printing the
/// report to stdout.
pub fn compare(
    nc_a: impl AsRef<Path>,
    nc_b: impl AsRef<Path>,
    options: &CompareOptions,
) -> Result<VariableCounts> {
    let nc_a = ensure_valid_path_exists(nc_a)?;
    let nc_b = ensure_valid_path_exists(nc_b)?;
    let options = options.resolve_outputs()?;

    let source_a = open_source(&nc_a)?;
    let source_b = open_source(&nc_b)?;

    let mut out = Outputter::new(FormatPolicy::from_flags(options.no_color))
        .with_only_diffs(options.only_diffs);
    if let Some(path) = &options.file_text {
        out = out.with_transcript(path)?;
    }

    let counts = compare_with_outputter(
        &mut out,
        Dataset {
            path: &nc_a,
            source: source_a.as_ref(),
        },
        Dataset {
            path: &nc_b,
            source: source_b.as_ref(),
        },
        &options,
        &mut rand::thread_rng(),
    )?;
    out.finish()?;
    Ok(counts)
}

/// Run the full report against already opened sources.
///
/// Export paths in `options` are used as given.
pub fn compare_with_outputter<R: Rng>(
    out: &mut Outputter,
    a: Dataset<'_>,
    b: Dataset<'_>,
    options: &CompareOptions,
    rng: &mut R,
) -> Result<VariableCounts> {
    let path_a = a.path.display().to_string();
    let path_b = b.path.display().to_string();
    out.print(&format!("File A: {path_a}"))?;
    out.print(&format!("File B: {path_b}"))?;
    out.side_by_side(" ", &path_a, &path_b)?;

    let counts = run_through_comparisons(out, a.source, b.source, options, rng)?;

    if let Some(path) = &options.file_csv {
        out.write_history_to_csv(path)?;
    }
    if let Some(path) = &options.file_xlsx {
        out.write_history_to_excel(path)?;
    }

    out.print_plain("\nDone.")?;
    Ok(counts)
}

/// Emit every report section in order.
pub fn run_through_comparisons<R: Rng>(
    out: &mut Outputter,
    a: &dyn DataSource,
    b: &dyn DataSource,
    options: &CompareOptions,
    rng: &mut R,
) -> Result<VariableCounts> {
    out.heading("\nRoot-level Dimensions:")?;
    let dims_a = dimension_items(a)?;
    let dims_b = dimension_items(b)?;
    out.keyed_diff(&dims_a, &dims_b)?;

    out.heading("\nGroups:")?;
    out.lists_diff(&a.group_names()?, &b.group_names()?)?;

    match options.comparison_var_group.as_deref() {
        Some(group) => {
            out.heading(&format!("\nVariables within specified group <{group}>:"))?;
            if let Err(e) = inspect_group(out, a, b, group, options, rng) {
                if !e.is_lookup() {
                    return Err(e);
                }
                report_lookup_error(out, group, options.comparison_var_name.as_deref(), &e)?;
            }
        }
        None => skip_note(out, "\nNo variable group selected for comparison. Skipping..")?,
    }

    out.heading("\nAll variables:")?;
    compare_two_files(out, a, b, options.show_chunks, options.show_attributes)
}

/// Root dimensions, retrying once without time decoding if that is what failed.
pub fn dimensions_with_fallback(source: &dyn DataSource) -> Result<Vec<(String, u64)>> {
    match source.dimensions(TimeDecoding::Decode) {
        Err(NcompareError::TimeDecoding { message }) => {
            log::warn!("Time decoding failed ({message}); reading dimensions without it");
            source.dimensions(TimeDecoding::Raw)
        }
        other => other,
    }
}

fn dimension_items(source: &dyn DataSource) -> Result<Vec<(String, String)>> {
    Ok(dimensions_with_fallback(source)?
        .into_iter()
        .map(|(name, len)| (name, len.to_string()))
        .collect())
}

fn skip_note(out: &mut Outputter, text: &str) -> Result<()> {
    let note = out.paint(Color::Grey, text);
    out.print(&note)
}

fn inspect_group<R: Rng>(
    out: &mut Outputter,
    a: &dyn DataSource,
    b: &dyn DataSource,
    group: &str,
    options: &CompareOptions,
    rng: &mut R,
) -> Result<()> {
    let vars_a = a.variable_names(Some(group))?;
    let vars_b = b.variable_names(Some(group))?;
    out.lists_diff(&vars_a, &vars_b)?;

    let Some(variable) = options.comparison_var_name.as_deref() else {
        return skip_note(out, "\nNo variable selected for comparison. Skipping..");
    };

    out.heading(&format!("\nSample values within specified variable <{variable}>:"))?;
    print_preview(out, a, group, variable)?;
    print_preview(out, b, group, variable)?;

    out.heading(&format!(
        "\nChecking multiple random values within specified variable <{variable}>:"
    ))?;
    compare_samples_with_rng(
        out,
        SampleTarget::new(a, Some(group), variable),
        SampleTarget::new(b, Some(group), variable),
        options.sampling,
        rng,
    )?;
    Ok(())
}

fn print_preview(
    out: &mut Outputter,
    source: &dyn DataSource,
    group: &str,
    variable: &str,
) -> Result<()> {
    let values = source.preview_values(variable, Some(group), PREVIEW_LEN)?;
    out.print_plain(&format_values(&values))
}

/// Render values as `[1.0, 2.5, NaN]`.
pub fn format_values(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    format!("[{}]", items.join(", "))
}

fn report_lookup_error(
    out: &mut Outputter,
    group: &str,
    variable: Option<&str>,
    err: &NcompareError,
) -> Result<()> {
    log::debug!("Lookup failed in targeted inspection: {err}");
    let headline = match variable {
        Some(variable) => {
            format!("\nError when comparing values for variable <{variable}> in group <{group}>.")
        }
        None => format!("\nError when listing variables in group <{group}>."),
    };
    let headline = out.paint(Color::BrightRed, &headline);
    out.print(&headline)?;
    for line in err.chain() {
        out.print_plain(&line)?;
    }
    out.print_plain("")?;
    out.side_by_side("Error:", variable.unwrap_or(group), &err.to_string())
}

/// Display-ready properties of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableProperties {
    pub name: String,
    pub dtype: String,
    pub shape: String,
    pub chunking: String,
    pub attributes: IndexMap<String, AttrValue>,
    pub scale_factor: Option<f64>,
}

impl VariableProperties {
    pub fn load(source: &dyn DataSource, name: &str, group: Option<&str>) -> Result<Self> {
        let metadata = source.variable_metadata(name, group)?;
        Ok(Self {
            name: name.to_string(),
            dtype: metadata.dtype.clone(),
            shape: metadata.shape_string(),
            chunking: metadata.chunking_string(),
            scale_factor: metadata.scale_factor,
            attributes: metadata.attributes,
        })
    }

    fn attribute_keys(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    /// `(shown, full)` renderings of attribute `key`; empty when absent.
    fn attribute_strings(&self, key: &str) -> (String, String) {
        self.attributes
            .get(key)
            .map(|value| (value.display_truncated(), value.to_string()))
            .unwrap_or_default()
    }

    fn scale_factor_string(&self) -> Option<String> {
        self.scale_factor
            .filter(|sf| *sf != 0.0)
            .map(|sf| format!("{sf:?}"))
    }
}

/// Emit the property rows of one variable as seen in each file.
pub fn print_var_properties_side_by_side(
    out: &mut Outputter,
    v_a: &VariableProperties,
    v_b: &VariableProperties,
    show_chunks: bool,
    show_attributes: bool,
) -> Result<()> {
    let name_a: String = v_a.name.chars().take(VARIABLE_NAME_WIDTH).collect();
    let name_b: String = v_b.name.chars().take(VARIABLE_NAME_WIDTH).collect();
    out.side_by_side("-----VARIABLE-----:", &name_a, &name_b)?;

    out.side_by_side_highlight("dtype:", &v_a.dtype, &v_b.dtype)?;
    out.side_by_side_highlight("shape:", &v_a.shape, &v_b.shape)?;
    if show_chunks {
        out.side_by_side_highlight("chunksize:", &v_a.chunking, &v_b.chunking)?;
    }

    if show_attributes {
        for (_, key_a, key_b) in common_elements(&v_a.attribute_keys(), &v_b.attribute_keys()) {
            let key = if key_a.is_empty() { &key_b } else { &key_a };
            let (shown_a, full_a) = v_a.attribute_strings(&key_a);
            let (shown_b, full_b) = v_b.attribute_strings(&key_b);
            out.emit_row_with_display(
                &format!("{key}:"),
                (&shown_a, &shown_b),
                (&full_a, &full_b),
                true,
                false,
            )?;
        }
    }

    let sf_a = v_a.scale_factor_string();
    let sf_b = v_b.scale_factor_string();
    if sf_a.is_some() || sf_b.is_some() {
        out.side_by_side_highlight(
            "sf:",
            sf_a.as_deref().unwrap_or(" "),
            sf_b.as_deref().unwrap_or(" "),
        )?;
    }
    Ok(())
}

fn sorted_common(names_a: &[String], names_b: &[String]) -> Vec<String> {
    let mut shared = align(names_a, names_b).shared;
    shared.sort();
    shared
}

fn print_common_variables(
    out: &mut Outputter,
    a: &dyn DataSource,
    b: &dyn DataSource,
    group: Option<&str>,
    names: &[String],
    show_chunks: bool,
    show_attributes: bool,
) -> Result<()> {
    for name in names {
        let v_a = VariableProperties::load(a, name, group)?;
        let v_b = VariableProperties::load(b, name, group)?;
        print_var_properties_side_by_side(out, &v_a, &v_b, show_chunks, show_attributes)?;
    }
    Ok(())
}

/// Walk the root group and every common group, showing shared variables side
/// by side, then the variable totals.
pub fn compare_two_files(
    out: &mut Outputter,
    a: &dyn DataSource,
    b: &dyn DataSource,
    show_chunks: bool,
    show_attributes: bool,
) -> Result<VariableCounts> {
    out.side_by_side(" ", "File A", "File B")?;
    out.side_by_side("All Variables", " ", " ")?;
    out.separator()?;

    let mut counts = VariableCounts::default();

    let vars_a = a.variable_names(None)?;
    let vars_b = b.variable_names(None)?;
    counts.add(count_diffs(&vars_a, &vars_b));
    out.side_by_side(
        "num variables in root group:",
        &vars_a.len().to_string(),
        &vars_b.len().to_string(),
    )?;
    out.separator()?;
    let common = sorted_common(&vars_a, &vars_b);
    print_common_variables(out, a, b, None, &common, show_chunks, show_attributes)?;

    for group in sorted_common(&a.group_names()?, &b.group_names()?) {
        out.side_by_side(" ", " ", " ")?;
        out.emit_row(&format!("GROUP #{group}"), group.trim(), group.trim(), false, true)?;

        let vars_a = a.variable_names(Some(&group))?;
        let vars_b = b.variable_names(Some(&group))?;
        counts.add(count_diffs(&vars_a, &vars_b));
        out.side_by_side_highlight(
            "num variables in group:",
            &vars_a.len().to_string(),
            &vars_b.len().to_string(),
        )?;
        out.separator()?;
        let common = sorted_common(&vars_a, &vars_b);
        print_common_variables(out, a, b, Some(&group), &common, show_chunks, show_attributes)?;
    }

    out.separator()?;
    out.side_by_side(
        "Total number of shared items:",
        &counts.shared.to_string(),
        &counts.shared.to_string(),
    )?;
    out.side_by_side(
        "Total number of non-shared items:",
        &counts.left.to_string(),
        &counts.right.to_string(),
    )?;

    log::debug!(
        "Variables: {} shared, {} only in A, {} only in B",
        counts.shared,
        counts.left,
        counts.right
    );
    Ok(counts)
}

//! Monte Carlo comparison of values sampled from two variables
//!
//! Random positions are drawn from the first variable's shape and the value at
//! each position is compared between the two datasets. The check is advisory:
//! it can miss real differences, but it stays cheap for variables too large to
//! read in full.

use crate::error::Result;
use crate::output::{Color, Outputter};
use crate::source::{format_shape, DataSource};
use rand::Rng;

/// Trials run per variable unless configured otherwise.
pub const DEFAULT_TRIALS: usize = 100;

/// Largest absolute difference still counted as a match.
pub const DEFAULT_THRESHOLD: f64 = 1e-6;

/// Result of comparing one sampled position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    Match,
    Mismatch,
    /// At least one side is undefined at the position.
    Indeterminate,
}

impl SampleOutcome {
    pub fn glyph(self) -> char {
        match self {
            SampleOutcome::Match => '.',
            SampleOutcome::Indeterminate => 'n',
            SampleOutcome::Mismatch => 'x',
        }
    }

    /// Classify a pair of values.
    pub fn classify(value_a: f64, value_b: f64, threshold: f64) -> Self {
        if value_a.is_nan() || value_b.is_nan() {
            SampleOutcome::Indeterminate
        } else if (value_b - value_a).abs() <= threshold {
            SampleOutcome::Match
        } else {
            SampleOutcome::Mismatch
        }
    }
}

/// A variable addressed inside one dataset.
#[derive(Clone, Copy)]
pub struct SampleTarget<'a> {
    pub source: &'a dyn DataSource,
    pub group: Option<&'a str>,
    pub name: &'a str,
}

impl<'a> SampleTarget<'a> {
    pub fn new(source: &'a dyn DataSource, group: Option<&'a str>, name: &'a str) -> Self {
        Self {
            source,
            group,
            name,
        }
    }

    fn value(&self, index: &[usize]) -> Result<f64> {
        self.source.sample_value(self.name, self.group, index)
    }
}

/// Sampling settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleConfig {
    pub trials: usize,
    pub threshold: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Compare `trials` random positions of `var_a` and `var_b`; returns the
/// number of mismatches.
pub fn compare_samples(
    out: &mut Outputter,
    var_a: SampleTarget<'_>,
    var_b: SampleTarget<'_>,
    config: SampleConfig,
) -> Result<usize> {
    compare_samples_with_rng(out, var_a, var_b, config, &mut rand::thread_rng())
}

/// [`compare_samples`] drawing positions from `rng`.
pub fn compare_samples_with_rng<R: Rng>(
    out: &mut Outputter,
    var_a: SampleTarget<'_>,
    var_b: SampleTarget<'_>,
    config: SampleConfig,
    rng: &mut R,
) -> Result<usize> {
    let shape = var_a
        .source
        .variable_metadata(var_a.name, var_a.group)?
        .shape;
    log::debug!(
        "Sampling {} positions of <{}> with shape {:?}",
        config.trials,
        var_a.name,
        shape
    );

    let mut mismatches = 0;
    for _ in 0..config.trials {
        let outcome = sample_once(out, &var_a, &var_b, &shape, config.threshold, rng)?;
        if outcome == SampleOutcome::Mismatch {
            mismatches += 1;
        }
        out.emit_line(&outcome.glyph().to_string(), false, false, "")?;
    }

    let message = if mismatches == 0 {
        out.paint(Color::Cyan, " No mismatches.")
    } else {
        out.paint(
            Color::Red,
            &format!(" {mismatches} mismatches, out of {} samples.", config.trials),
        )
    };
    out.print(&message)?;
    out.print_plain("Done.")?;

    Ok(mismatches)
}

fn random_index<R: Rng>(shape: &[usize], rng: &mut R) -> Option<Vec<usize>> {
    shape
        .iter()
        .map(|len| (*len > 0).then(|| rng.gen_range(0..*len)))
        .collect()
}

fn sample_once<R: Rng>(
    out: &mut Outputter,
    var_a: &SampleTarget<'_>,
    var_b: &SampleTarget<'_>,
    shape: &[usize],
    threshold: f64,
    rng: &mut R,
) -> Result<SampleOutcome> {
    // A zero-length axis has no position to draw.
    let Some(index) = random_index(shape, rng) else {
        return Ok(SampleOutcome::Indeterminate);
    };

    let value_a = var_a.value(&index)?;
    let value_b = var_b.value(&index)?;
    let outcome = SampleOutcome::classify(value_a, value_b, threshold);

    if outcome == SampleOutcome::Mismatch {
        let diff = value_b - value_a;
        let warning = out.paint(
            Color::Red,
            &format!("Difference exceeded threshold (diff == {diff})"),
        );
        out.print("")?;
        out.print(&warning)?;
        out.print_plain(&format!("var shape: {}", format_shape(shape)))?;
        out.print_plain(&format!("indices:   {}", format_shape(&index)))?;
        out.print_plain(&format!("value a: {value_a}"))?;
        out.emit_line(&format!("value b: {value_b}"), false, false, "\n\n")?;
        out.emit_row(
            &format!("mismatch at {}:", format_shape(&index)),
            &value_a.to_string(),
            &value_b.to_string(),
            true,
            false,
        )?;
    }

    Ok(outcome)
}

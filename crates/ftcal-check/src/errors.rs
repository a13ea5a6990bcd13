use miette::Diagnostic;
use thiserror::Error;

/// One problem found while turning the intervals of a single axis into a
/// list of edges.
///
/// `lowbin_high` and `highbin_low` name the two boundary values that failed
/// to meet, so the offending bins can be looked up again afterwards.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum BinningDefect {
    #[error("Bins can't be infinitely thin - lower and upper have the same boundary: {boundary}")]
    ThinBin { boundary: f64 },

    #[error("Bin lower boundary ({low}) must be below its upper boundary ({high})")]
    InvertedBin { low: f64, high: f64 },

    #[error("Duplicate bin boundaries! ({low}, {high})")]
    DuplicateBoundary { low: f64, high: f64 },

    #[error(
        "Bins must be adjacent and exclusive - lower bin's upper boundary ({lowbin_high}) \
         and upper bin's lower boundary ({highbin_low}) need to be the same (gap)"
    )]
    Gap { lowbin_high: f64, highbin_low: f64 },

    #[error(
        "Bins must be adjacent and exclusive - lower bin's upper boundary ({lowbin_high}) \
         and upper bin's lower boundary ({highbin_low}) need to be the same (overlap)"
    )]
    Overlap { lowbin_high: f64, highbin_low: f64 },
}

impl BinningDefect {
    /// Upper edge of the lower of the two clashing bins.
    pub fn lowbin_high(&self) -> f64 {
        match *self {
            BinningDefect::ThinBin { boundary } => boundary,
            BinningDefect::InvertedBin { high, .. } => high,
            BinningDefect::DuplicateBoundary { high, .. } => high,
            BinningDefect::Gap { lowbin_high, .. } | BinningDefect::Overlap { lowbin_high, .. } => {
                lowbin_high
            }
        }
    }

    /// Lower edge of the upper of the two clashing bins.
    pub fn highbin_low(&self) -> f64 {
        match *self {
            BinningDefect::ThinBin { boundary } => boundary,
            BinningDefect::InvertedBin { low, .. } => low,
            BinningDefect::DuplicateBoundary { low, .. } => low,
            BinningDefect::Gap { highbin_low, .. } | BinningDefect::Overlap { highbin_low, .. } => {
                highbin_low
            }
        }
    }
}

/// A defect on one axis plus every bin that might be responsible for it,
/// written in `--ignore` syntax.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct AxisDefect {
    pub axis: String,
    pub defect: BinningDefect,
    pub candidates: Vec<String>,
}

/// Errors raised by the validators. Each one stops the pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum CheckError {
    #[error("The bin {bin} has been seen twice in the analysis {analysis}")]
    #[diagnostic(code(ftcal::check::duplicate_bin))]
    DuplicateBin { analysis: String, bin: String },

    #[error("Analysis '{analysis}' has no bins!")]
    #[diagnostic(code(ftcal::check::no_axes))]
    NoAxes { analysis: String },

    #[error("Analysis '{analysis}' has more than 2 binning axes ({})", .axes.join(", "))]
    #[diagnostic(
        code(ftcal::check::too_many_axes),
        help("only 1-D and 2-D binning is supported")
    )]
    TooManyAxes { analysis: String, axes: Vec<String> },

    #[error(
        "Bins in analysis {analysis} don't all use the same binning axes ({}): {bin}",
        .axes.join(", ")
    )]
    #[diagnostic(
        code(ftcal::check::inconsistent_axes),
        help("every bin of an analysis must be cut along the same axes; fix the bin or pass it to --ignore")
    )]
    InconsistentAxes {
        analysis: String,
        axes: Vec<String>,
        bin: String,
    },

    #[error("Found problems with binning in analysis {analysis}:{}", render_defects(.defects))]
    #[diagnostic(code(ftcal::check::binning))]
    Binning {
        analysis: String,
        defects: Vec<AxisDefect>,
    },

    #[error(
        "Analyses to combine don't have identical binning: number of binning axes differs \
         ({expected} vs {found})"
    )]
    #[diagnostic(code(ftcal::check::axis_count))]
    AxisCountMismatch { expected: usize, found: usize },

    #[error("Not all analyses have a bin axis '{axis}'.")]
    #[diagnostic(code(ftcal::check::missing_axis))]
    MissingAxis { axis: String },

    #[error("Bins in '{axis}' have inconsistent boundaries ({low}-{axis}-{high})")]
    #[diagnostic(
        code(ftcal::check::inconsistent_boundaries),
        help("a bin may refine or merge bins of another analysis, but must not cut across them")
    )]
    InconsistentBoundaries { axis: String, low: f64, high: f64 },

    #[error(
        "Systematic error '{systematic}' marked as correlated in some analyses and uncorrelated \
         in others! It must be consistent."
    )]
    #[diagnostic(code(ftcal::check::correlation_flag))]
    CorrelationFlagConflict { systematic: String },

    #[error(
        "The following binning boundaries are not compatible in a bin-by-bin fit:\n  - {first}\n  - {second}"
    )]
    #[diagnostic(code(ftcal::check::not_orthogonal))]
    NotOrthogonal { first: String, second: String },

    #[error("The '{analysis}' analysis for the correlation {correlation} is not known.")]
    #[diagnostic(code(ftcal::check::unknown_correlation_bin))]
    UnknownCorrelationBin {
        analysis: String,
        correlation: String,
    },

    #[error("Can't have a correlations between the same analyses: {correlation}")]
    #[diagnostic(code(ftcal::check::self_correlation))]
    SelfCorrelation { correlation: String },

    #[error("This analysis has no axis called '{axis}'")]
    #[diagnostic(code(ftcal::check::unknown_axis))]
    UnknownAxis { axis: String },

    #[error("Unable to find bin {bin} in axis '{axis}'.")]
    #[diagnostic(code(ftcal::check::bin_not_found))]
    BinNotFound { axis: String, bin: String },
}

fn render_defects(defects: &[AxisDefect]) -> String {
    let mut out = String::new();
    for d in defects {
        out.push_str(&format!("\n    [{}] {}\n", d.axis, d.defect));
        out.push_str("      One of the following analysis/bins is in error - please use --ignore");
        for c in &d.candidates {
            out.push_str(&format!("\n      -> {c}"));
        }
    }
    out
}

//! Calibration data model produced by the parser.
//!
//! Everything here is plain owned data. The parser stages each construct
//! privately and only hands out finished values, so a `Bin` always has its
//! relative errors resolved and exactly one central value.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

/// Source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One axis interval `[low, high)` tagged with its variable name.
///
/// Equality and ordering go through `(variable, low, high)` using the IEEE
/// total order, so boundaries can live in ordered sets and maps.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Boundary {
    pub variable: String,
    pub low: f64,
    pub high: f64,
}

impl Boundary {
    pub fn new(variable: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            variable: variable.into(),
            low,
            high,
        }
    }

    /// True when the two intervals share no point on the same axis.
    /// Boundaries on different axes never overlap.
    pub fn disjoint_from(&self, other: &Boundary) -> bool {
        self.variable != other.variable || self.low >= other.high || other.low >= self.high
    }
}

impl PartialEq for Boundary {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Boundary {}

impl PartialOrd for Boundary {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Boundary {
    fn cmp(&self, other: &Self) -> Ordering {
        self.variable
            .cmp(&other.variable)
            .then_with(|| self.low.total_cmp(&other.low))
            .then_with(|| self.high.total_cmp(&other.high))
    }
}

impl Hash for Boundary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.variable.hash(state);
        self.low.to_bits().hash(state);
        self.high.to_bits().hash(state);
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.low, self.variable, self.high)
    }
}

/// The boundaries identifying one bin, one per axis, in source order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct BinSpec(Vec<Boundary>);

impl BinSpec {
    pub fn new(boundaries: Vec<Boundary>) -> Self {
        Self(boundaries)
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Boundary> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The boundary on `variable`, if this bin is cut along that axis.
    pub fn get(&self, variable: &str) -> Option<&Boundary> {
        self.0.iter().find(|b| b.variable == variable)
    }

    /// Order-insensitive view of the boundaries.
    pub fn to_set(&self) -> BTreeSet<Boundary> {
        self.0.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a BinSpec {
    type Item = &'a Boundary;
    type IntoIter = std::slice::Iter<'a, Boundary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for BinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::names::bin_name(&self.0))
    }
}

/// A named systematic uncertainty, already converted to an absolute value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct SystematicError {
    pub name: String,
    pub value: f64,
    pub uncorrelated: bool,
}

/// Numeric bin-level metadata with an optional error (zero when omitted).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct MetaValue {
    pub value: f64,
    pub error: f64,
}

/// One cell of an analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Bin {
    pub spec: BinSpec,
    pub central_value: f64,
    pub statistical_error: f64,
    pub systematic_errors: Vec<SystematicError>,
    pub metadata: IndexMap<String, MetaValue>,
    pub is_extended: bool,
}

impl Bin {
    pub fn systematic(&self, name: &str) -> Option<&SystematicError> {
        self.systematic_errors.iter().find(|e| e.name == name)
    }
}

/// The five-part identity used to address an analysis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct AnalysisKey {
    pub name: String,
    pub flavor: String,
    pub tagger: String,
    pub operating_point: String,
    pub jet_algorithm: String,
}

impl AnalysisKey {
    pub fn new(
        name: impl Into<String>,
        flavor: impl Into<String>,
        tagger: impl Into<String>,
        operating_point: impl Into<String>,
        jet_algorithm: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            flavor: flavor.into(),
            tagger: tagger.into(),
            operating_point: operating_point.into(),
            jet_algorithm: jet_algorithm.into(),
        }
    }

    /// `(flavor, tagger, operating point)`: analyses sharing this are
    /// combined together.
    pub fn combination_group(&self) -> (&str, &str, &str) {
        (&self.flavor, &self.tagger, &self.operating_point)
    }
}

impl fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.name, self.flavor, self.tagger, self.operating_point, self.jet_algorithm
        )
    }
}

/// An `Analysis(...) { ... }` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Analysis {
    pub key: AnalysisKey,
    pub bins: Vec<Bin>,
    pub metadata: IndexMap<String, Vec<f64>>,
    pub metadata_s: IndexMap<String, String>,
    pub span: Span,
}

/// A bin listed inside a `Correlation` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct BinCorrelation {
    pub spec: BinSpec,
    /// Statistical correlation coefficient, always within `[-1, 1]`.
    pub statistical: Option<f64>,
}

/// A `Correlation(a1, a2, flavor, tagger, op, jet) { ... }` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct AnalysisCorrelation {
    pub analysis1_name: String,
    pub analysis2_name: String,
    pub flavor: String,
    pub tagger: String,
    pub operating_point: String,
    pub jet_algorithm: String,
    pub bins: Vec<BinCorrelation>,
    pub span: Span,
}

impl AnalysisCorrelation {
    /// Identity key of the first correlated analysis.
    pub fn first_key(&self) -> AnalysisKey {
        self.key_for(&self.analysis1_name)
    }

    /// Identity key of the second correlated analysis.
    pub fn second_key(&self) -> AnalysisKey {
        self.key_for(&self.analysis2_name)
    }

    fn key_for(&self, name: &str) -> AnalysisKey {
        AnalysisKey::new(
            name,
            self.flavor.as_str(),
            self.tagger.as_str(),
            self.operating_point.as_str(),
            self.jet_algorithm.as_str(),
        )
    }
}

/// A `Default(...)` declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct DefaultAnalysis {
    pub key: AnalysisKey,
    pub span: Span,
}

/// A `Copy(...) { Analysis(...) ... }` declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct AliasAnalysis {
    pub source: AnalysisKey,
    pub copy_targets: Vec<AnalysisKey>,
    pub span: Span,
}

/// Parse root: every top-level declaration in source order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CalibrationInfo {
    pub analyses: Vec<Analysis>,
    pub correlations: Vec<AnalysisCorrelation>,
    pub defaults: Vec<DefaultAnalysis>,
    pub aliases: Vec<AliasAnalysis>,
}

impl CalibrationInfo {
    /// Append another file's declarations after this one's.
    pub fn extend(&mut self, other: CalibrationInfo) {
        self.analyses.extend(other.analyses);
        self.correlations.extend(other.correlations);
        self.defaults.extend(other.defaults);
        self.aliases.extend(other.aliases);
    }

    /// Fold analyses that share an identity key into the first of them.
    ///
    /// Bins are concatenated in order and later metadata entries replace
    /// earlier ones with the same name. Duplicate bins are left in place for
    /// the validators to report.
    pub fn merge_same_analyses(&mut self) {
        let mut merged: IndexMap<AnalysisKey, Analysis> = IndexMap::with_capacity(self.analyses.len());
        for analysis in self.analyses.drain(..) {
            match merged.get_mut(&analysis.key) {
                Some(first) => {
                    tracing::debug!(analysis = %analysis.key, bins = analysis.bins.len(), "merging repeated analysis");
                    first.bins.extend(analysis.bins);
                    first.metadata.extend(analysis.metadata);
                    first.metadata_s.extend(analysis.metadata_s);
                }
                None => {
                    merged.insert(analysis.key.clone(), analysis);
                }
            }
        }
        self.analyses = merged.into_values().collect();
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
            && self.correlations.is_empty()
            && self.defaults.is_empty()
            && self.aliases.is_empty()
    }
}

//! Axis partitions: the histogram-style edge lists of an analysis.

use std::collections::BTreeMap;

use ftcal_dsl::model::{Analysis, BinSpec};
use ftcal_dsl::names::ignore_format;

use crate::boundaries::extract_bins;
use crate::errors::{AxisDefect, BinningDefect, CheckError};

/// Largest supported number of binning axes.
pub const MAX_AXES: usize = 2;

/// Edges `[e0, e1, ..., en]` per axis, bin `i` being `[e_i, e_{i+1})`.
/// Axes are kept in name order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct AxisPartition {
    axes: BTreeMap<String, Vec<f64>>,
}

impl AxisPartition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_axis(&mut self, name: impl Into<String>, edges: Vec<f64>) {
        self.axes.insert(name.into(), edges);
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(String::as_str)
    }

    pub fn has_axis(&self, axis: &str) -> bool {
        self.axes.contains_key(axis)
    }

    pub fn edges(&self, axis: &str) -> Result<&[f64], CheckError> {
        self.axes
            .get(axis)
            .map(Vec::as_slice)
            .ok_or_else(|| CheckError::UnknownAxis {
                axis: axis.to_string(),
            })
    }

    /// Consecutive `(low, high)` pairs of an axis.
    pub fn intervals(&self, axis: &str) -> Result<Vec<(f64, f64)>, CheckError> {
        Ok(self.edges(axis)?.windows(2).map(|w| (w[0], w[1])).collect())
    }

    /// First axis in name order.
    pub fn x_axis(&self) -> Option<(&str, &[f64])> {
        self.axes
            .iter()
            .next()
            .map(|(name, edges)| (name.as_str(), edges.as_slice()))
    }

    /// Second axis in name order, for 2-D binning.
    pub fn y_axis(&self) -> Option<(&str, &[f64])> {
        self.axes
            .iter()
            .nth(1)
            .map(|(name, edges)| (name.as_str(), edges.as_slice()))
    }

    /// 0-based index of the interval on `axis` whose lower edge matches the
    /// lower boundary `spec` has on that axis.
    pub fn find_bin(&self, axis: &str, spec: &BinSpec) -> Result<usize, CheckError> {
        let edges = self.edges(axis)?;
        let not_found = || CheckError::BinNotFound {
            axis: axis.to_string(),
            bin: spec.to_string(),
        };
        let boundary = spec.get(axis).ok_or_else(not_found)?;
        edges
            .iter()
            .take(edges.len().saturating_sub(1))
            .position(|&e| e == boundary.low)
            .ok_or_else(not_found)
    }
}

/// Sort one axis's intervals and turn them into a list of edges, failing on
/// the first thin, inverted, duplicate, gapped or overlapping interval.
pub fn axis_edges(intervals: &[(f64, f64)]) -> Result<Vec<f64>, BinningDefect> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut edges = Vec::with_capacity(sorted.len() + 1);
    let mut last: Option<(f64, f64)> = None;
    for (low, high) in sorted {
        if low == high {
            return Err(BinningDefect::ThinBin { boundary: low });
        }
        // Negated so a NaN edge is caught as well.
        if !(low < high) {
            return Err(BinningDefect::InvertedBin { low, high });
        }
        if let Some(prev) = last {
            if prev == (low, high) {
                return Err(BinningDefect::DuplicateBoundary { low, high });
            }
            if prev.1 < low {
                return Err(BinningDefect::Gap {
                    lowbin_high: prev.1,
                    highbin_low: low,
                });
            }
            if prev.1 != low {
                return Err(BinningDefect::Overlap {
                    lowbin_high: prev.1,
                    highbin_low: low,
                });
            }
        }
        edges.push(low);
        last = Some((low, high));
    }
    if let Some((_, high)) = last {
        edges.push(high);
    }
    Ok(edges)
}

/// Every bin of `analysis` (extended ones included) touching the boundary
/// values a defect reports. This can over-report when a gap spans several
/// bins.
fn candidate_bins(analysis: &Analysis, axis: &str, defect: &BinningDefect) -> Vec<String> {
    let (lowbin_high, highbin_low) = (defect.lowbin_high(), defect.highbin_low());
    analysis
        .bins
        .iter()
        .filter(|bin| {
            bin.spec
                .get(axis)
                .is_some_and(|b| b.low == highbin_low || b.high == lowbin_high)
        })
        .map(|bin| ignore_format(&analysis.key, &bin.spec))
        .collect()
}

/// Build the partition of one analysis. Defects on every axis are collected
/// before failing.
pub fn calc_boundaries(analysis: &Analysis, ignore_extended: bool) -> Result<AxisPartition, CheckError> {
    let raw = extract_bins(analysis, ignore_extended)?;
    if raw.len() > MAX_AXES {
        return Err(CheckError::TooManyAxes {
            analysis: analysis.key.name.clone(),
            axes: raw.keys().cloned().collect(),
        });
    }
    if raw.is_empty() {
        return Err(CheckError::NoAxes {
            analysis: analysis.key.name.clone(),
        });
    }

    let mut partition = AxisPartition::new();
    let mut defects = Vec::new();
    for (axis, intervals) in &raw {
        match axis_edges(intervals) {
            Ok(edges) => partition.add_axis(axis.clone(), edges),
            Err(defect) => {
                tracing::debug!(analysis = %analysis.key, axis = %axis, %defect, "binning defect");
                defects.push(AxisDefect {
                    candidates: candidate_bins(analysis, axis, &defect),
                    axis: axis.clone(),
                    defect,
                });
            }
        }
    }

    if !defects.is_empty() {
        return Err(CheckError::Binning {
            analysis: analysis.key.to_string(),
            defects,
        });
    }
    Ok(partition)
}

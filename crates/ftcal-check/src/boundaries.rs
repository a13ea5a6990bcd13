//! Per-axis interval extraction for a single analysis.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use ftcal_dsl::model::{Analysis, Bin, Boundary};
use ftcal_dsl::names::ignore_format;

use crate::errors::CheckError;

/// Distinct `(low, high)` pairs per axis variable, in first-seen order.
pub type AxisIntervals = BTreeMap<String, Vec<(f64, f64)>>;

/// Collect the intervals used on every axis of `analysis`.
///
/// Pairs repeat across a multi-dimensional analysis (every eta slice reuses
/// the same pt bins) and are deduplicated. A whole bin spec appearing twice,
/// in any boundary order, is a user error, as is a bin that is not cut along
/// exactly the axes the rest of the analysis uses.
pub fn extract_bins(analysis: &Analysis, ignore_extended: bool) -> Result<AxisIntervals, CheckError> {
    let mut result = AxisIntervals::new();
    let mut seen: HashSet<BTreeSet<Boundary>> = HashSet::new();
    let bins: Vec<&Bin> = analysis
        .bins
        .iter()
        .filter(|b| !(ignore_extended && b.is_extended))
        .collect();

    for bin in &bins {
        if !seen.insert(bin.spec.to_set()) {
            return Err(CheckError::DuplicateBin {
                analysis: analysis.key.to_string(),
                bin: bin.spec.to_string(),
            });
        }
        for boundary in &bin.spec {
            let pairs = result.entry(boundary.variable.clone()).or_default();
            let pair = (boundary.low, boundary.high);
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
    }

    if let Some(bin) = bins.iter().find(|b| {
        b.spec.len() != result.len() || !result.keys().all(|axis| b.spec.get(axis).is_some())
    }) {
        return Err(CheckError::InconsistentAxes {
            analysis: analysis.key.to_string(),
            axes: result.keys().cloned().collect(),
            bin: ignore_format(&analysis.key, &bin.spec),
        });
    }

    Ok(result)
}

//! `--ignore` filtering: drop individual bins before validation.

use std::collections::{BTreeSet, HashSet};

use ftcal_dsl::model::{AnalysisKey, Boundary, CalibrationInfo};
use ftcal_dsl::names::{correlation_name, ignore_format};

/// Remove every bin whose ignore-format name is listed, then every analysis
/// left without bins and every correlation bin pointing at a removed bin.
/// Returns the entries that matched nothing.
pub(crate) fn apply_ignores(info: &mut CalibrationInfo, ignores: &[String]) -> Vec<String> {
    if ignores.is_empty() {
        return Vec::new();
    }
    let wanted: HashSet<&str> = ignores.iter().map(String::as_str).collect();
    let mut matched: HashSet<String> = HashSet::new();
    let mut removed: HashSet<(AnalysisKey, BTreeSet<Boundary>)> = HashSet::new();

    for analysis in &mut info.analyses {
        let key = &analysis.key;
        analysis.bins.retain(|bin| {
            let name = ignore_format(key, &bin.spec);
            if wanted.contains(name.as_str()) {
                tracing::info!(bin = %name, "ignoring bin");
                matched.insert(name);
                removed.insert((key.clone(), bin.spec.to_set()));
                false
            } else {
                true
            }
        });
    }

    info.analyses.retain(|analysis| {
        if analysis.bins.is_empty() {
            tracing::info!(analysis = %analysis.key, "dropping analysis with no bins left");
            false
        } else {
            true
        }
    });

    for cor in &mut info.correlations {
        let name = correlation_name(cor);
        let (first, second) = (cor.first_key(), cor.second_key());
        cor.bins.retain(|bin| {
            let spec = bin.spec.to_set();
            let keep = !removed.contains(&(first.clone(), spec.clone()))
                && !removed.contains(&(second.clone(), spec));
            if !keep {
                tracing::info!(correlation = %name, bin = %bin.spec, "dropping correlation of ignored bin");
            }
            keep
        });
    }

    let unmatched: Vec<String> = ignores
        .iter()
        .filter(|i| !matched.contains(i.as_str()))
        .cloned()
        .collect();
    for entry in &unmatched {
        tracing::warn!(ignore = %entry, "ignore entry matched no bin");
    }
    unmatched
}

use std::collections::BTreeMap;

use ftcal_dsl::model::Analysis;

/// `(flavor, tagger, operating point)` of an analysis.
pub type GroupKey<'a> = (&'a str, &'a str, &'a str);

/// Indices into `analyses`, bucketed by combination group. Groups come out
/// in key order and members in input order.
pub fn combination_groups(analyses: &[Analysis]) -> BTreeMap<GroupKey<'_>, Vec<usize>> {
    let mut groups: BTreeMap<GroupKey<'_>, Vec<usize>> = BTreeMap::new();
    for (i, analysis) in analyses.iter().enumerate() {
        groups
            .entry(analysis.key.combination_group())
            .or_default()
            .push(i);
    }
    groups
}

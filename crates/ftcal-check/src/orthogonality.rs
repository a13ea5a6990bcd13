use std::collections::BTreeSet;

use ftcal_dsl::model::{Analysis, Boundary};
use ftcal_dsl::names::bin_name;

use crate::errors::CheckError;

/// Two bins are orthogonal when some axis they share separates them.
fn orthogonal(a: &BTreeSet<Boundary>, b: &BTreeSet<Boundary>) -> bool {
    a.iter().any(|x| {
        b.iter()
            .find(|y| y.variable == x.variable)
            .is_some_and(|y| x.disjoint_from(y))
    })
}

/// Bin-by-bin mode: every pair of distinct bin specs across all analyses
/// must be separated on at least one shared axis.
pub fn check_bin_by_bin(analyses: &[Analysis]) -> Result<(), CheckError> {
    let distinct: BTreeSet<BTreeSet<Boundary>> = analyses
        .iter()
        .flat_map(|a| &a.bins)
        .map(|bin| bin.spec.to_set())
        .collect();
    let specs: Vec<_> = distinct.into_iter().collect();

    for (i, first) in specs.iter().enumerate() {
        for second in &specs[i + 1..] {
            if !orthogonal(first, second) {
                return Err(CheckError::NotOrthogonal {
                    first: bin_name(first),
                    second: bin_name(second),
                });
            }
        }
    }

    tracing::debug!(bins = specs.len(), "bin-by-bin specs orthogonal");
    Ok(())
}

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use ftcal_dsl::model::Analysis;

use crate::errors::CheckError;
use crate::groups::combination_groups;

/// Within each combination group a systematic error must be either always
/// correlated (`sys`) or always uncorrelated (`usys`).
pub fn check_consistent_analyses(analyses: &[Analysis]) -> Result<(), CheckError> {
    for (group, members) in combination_groups(analyses) {
        let mut uncorrelated: HashMap<&str, bool> = HashMap::new();
        let errors = members
            .iter()
            .flat_map(|&i| &analyses[i].bins)
            .flat_map(|bin| &bin.systematic_errors);
        for sys in errors {
            match uncorrelated.entry(sys.name.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(sys.uncorrelated);
                }
                Entry::Occupied(seen) if *seen.get() != sys.uncorrelated => {
                    tracing::debug!(?group, systematic = %sys.name, "correlation flag conflict");
                    return Err(CheckError::CorrelationFlagConflict {
                        systematic: sys.name.clone(),
                    });
                }
                Entry::Occupied(_) => {}
            }
        }
    }
    Ok(())
}

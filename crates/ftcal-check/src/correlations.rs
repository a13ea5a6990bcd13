use std::collections::{BTreeSet, HashSet};

use ftcal_dsl::model::{AnalysisKey, Boundary, CalibrationInfo};
use ftcal_dsl::names::{correlation_ignore_format, correlation_name};

use crate::errors::CheckError;

/// Every `Correlation` must name two different analyses, and each of its
/// bins must exist in both of them.
pub fn check_valid_correlations(info: &CalibrationInfo) -> Result<(), CheckError> {
    let known: HashSet<(AnalysisKey, BTreeSet<Boundary>)> = info
        .analyses
        .iter()
        .flat_map(|a| a.bins.iter().map(|b| (a.key.clone(), b.spec.to_set())))
        .collect();

    for cor in &info.correlations {
        if cor.analysis1_name == cor.analysis2_name {
            return Err(CheckError::SelfCorrelation {
                correlation: correlation_name(cor),
            });
        }
        for bin in &cor.bins {
            let spec = bin.spec.to_set();
            for key in [cor.first_key(), cor.second_key()] {
                let name = key.name.clone();
                if !known.contains(&(key, spec.clone())) {
                    return Err(CheckError::UnknownCorrelationBin {
                        analysis: name,
                        correlation: correlation_ignore_format(cor, &bin.spec),
                    });
                }
            }
        }
    }
    Ok(())
}

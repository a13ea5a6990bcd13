//! The full validation sequence run before a calibration is handed to the
//! combination.

use ftcal_dsl::model::CalibrationInfo;

use crate::boundaries::extract_bins;
use crate::consistency::check_consistent_boundaries;
use crate::correlations::check_valid_correlations;
use crate::errors::CheckError;
use crate::groups::combination_groups;
use crate::orthogonality::check_bin_by_bin;
use crate::partition::{calc_boundaries, AxisPartition};
use crate::systematics::check_consistent_analyses;

/// How the analyses will be combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum CombinationMode {
    /// Shared axis partitions per combination group.
    #[default]
    Binned,
    /// Every distinct bin is fit on its own.
    BinByBin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckOptions {
    pub mode: CombinationMode,
    /// Leave `exbin` bins out of the partitions.
    pub ignore_extended: bool,
}

/// A calibration that passed every check.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ValidatedCalibration {
    pub info: CalibrationInfo,
    /// One partition per entry of `info.analyses`, in the same order.
    /// Empty in bin-by-bin mode.
    pub partitions: Vec<AxisPartition>,
}

/// Run every check over `info`, stopping at the first failure.
///
/// Analyses sharing an identity key are merged first, so a bin repeated
/// across two blocks of the same analysis is caught as a duplicate.
///
/// Binned mode builds each analysis's partition and compares partitions
/// within each combination group. Bin-by-bin mode only checks that each
/// analysis has distinct bins cut along one set of axes, then runs the
/// pairwise orthogonality scan. Systematic flags and correlations are
/// checked in either mode.
pub fn validate(mut info: CalibrationInfo, options: &CheckOptions) -> Result<ValidatedCalibration, CheckError> {
    info.merge_same_analyses();
    let partitions = match options.mode {
        CombinationMode::Binned => {
            let partitions = info
                .analyses
                .iter()
                .map(|a| calc_boundaries(a, options.ignore_extended))
                .collect::<Result<Vec<_>, _>>()?;
            tracing::debug!(analyses = partitions.len(), "axis partitions built");

            for (group, members) in combination_groups(&info.analyses) {
                tracing::debug!(?group, analyses = members.len(), "checking group binning");
                let group_partitions: Vec<&AxisPartition> =
                    members.iter().map(|&i| &partitions[i]).collect();
                check_consistent_boundaries(&group_partitions)?;
            }
            partitions
        }
        CombinationMode::BinByBin => {
            for analysis in &info.analyses {
                extract_bins(analysis, options.ignore_extended)?;
            }
            check_bin_by_bin(&info.analyses)?;
            Vec::new()
        }
    };

    check_consistent_analyses(&info.analyses)?;
    check_valid_correlations(&info)?;

    tracing::info!(
        analyses = info.analyses.len(),
        correlations = info.correlations.len(),
        mode = ?options.mode,
        "calibration validated"
    );
    Ok(ValidatedCalibration { info, partitions })
}

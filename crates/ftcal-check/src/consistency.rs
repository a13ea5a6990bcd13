//! Cross-analysis agreement of axis partitions.

use crate::errors::CheckError;
use crate::partition::AxisPartition;

/// Two intervals are compatible when they are equal, disjoint or one
/// contains the other. Anything else cuts across a bin boundary.
fn nests(a: (f64, f64), b: (f64, f64)) -> bool {
    let disjoint = a.0 >= b.1 || b.0 >= a.1;
    let a_in_b = b.0 <= a.0 && a.1 <= b.1;
    let b_in_a = a.0 <= b.0 && b.1 <= a.1;
    disjoint || a_in_b || b_in_a
}

/// Check every partition against the first one.
///
/// All partitions must have the same axes. On each axis, every interval of
/// a later partition must nest with every interval of the first: a finer
/// binning that splits the reference bins, or a bin the reference lacks
/// entirely, is fine, while a bin straddling a reference edge is not.
pub fn check_consistent_boundaries(partitions: &[&AxisPartition]) -> Result<(), CheckError> {
    let Some((reference, rest)) = partitions.split_first() else {
        return Ok(());
    };

    for other in rest {
        if other.len() != reference.len() {
            return Err(CheckError::AxisCountMismatch {
                expected: reference.len(),
                found: other.len(),
            });
        }
        for axis in other.axis_names() {
            if !reference.has_axis(axis) {
                return Err(CheckError::MissingAxis {
                    axis: axis.to_string(),
                });
            }
            let ref_intervals = reference.intervals(axis)?;
            for (low, high) in other.intervals(axis)? {
                if !ref_intervals.iter().all(|&r| nests(r, (low, high))) {
                    return Err(CheckError::InconsistentBoundaries {
                        axis: axis.to_string(),
                        low,
                        high,
                    });
                }
            }
        }
    }

    tracing::debug!(partitions = partitions.len(), "axis partitions consistent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(edges: &[f64]) -> AxisPartition {
        let mut p = AxisPartition::new();
        p.add_axis("pt", edges.to_vec());
        p
    }

    #[test]
    fn nothing_to_compare() {
        assert!(check_consistent_boundaries(&[]).is_ok());
        assert!(check_consistent_boundaries(&[&pt(&[0.0, 1.0])]).is_ok());
    }

    #[test]
    fn identical_binning_passes() {
        let a = pt(&[0.0, 100.0, 200.0]);
        assert!(check_consistent_boundaries(&[&a, &a.clone()]).is_ok());
    }

    #[test]
    fn refinement_at_shared_edges_passes() {
        let a = pt(&[0.0, 100.0, 200.0]);
        let b = pt(&[0.0, 50.0, 100.0, 200.0]);
        assert!(check_consistent_boundaries(&[&a, &b]).is_ok());
    }

    #[test]
    fn split_across_reference_edge_fails() {
        let a = pt(&[0.0, 100.0, 200.0]);
        let b = pt(&[0.0, 75.0, 200.0]);
        let err = check_consistent_boundaries(&[&a, &b]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bins in 'pt' have inconsistent boundaries (75-pt-200)"
        );
    }

    #[test]
    fn extra_range_outside_reference_passes() {
        let a = pt(&[20.0, 30.0, 60.0]);
        let b = pt(&[20.0, 30.0, 60.0, 90.0, 140.0]);
        assert!(check_consistent_boundaries(&[&a, &b]).is_ok());
    }

    #[test]
    fn partial_overlap_at_range_end_fails() {
        let a = pt(&[20.0, 30.0, 60.0]);
        let b = pt(&[40.0, 90.0]);
        assert!(matches!(
            check_consistent_boundaries(&[&a, &b]),
            Err(CheckError::InconsistentBoundaries { low, high, .. }) if low == 40.0 && high == 90.0
        ));
    }

    #[test]
    fn axis_count_must_match() {
        let a = pt(&[0.0, 100.0]);
        let mut b = pt(&[0.0, 100.0]);
        b.add_axis("abseta", vec![0.0, 2.5]);
        assert!(matches!(
            check_consistent_boundaries(&[&a, &b]),
            Err(CheckError::AxisCountMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn axis_names_must_match() {
        let a = pt(&[0.0, 100.0]);
        let mut b = AxisPartition::new();
        b.add_axis("eta", vec![0.0, 2.5]);
        let err = check_consistent_boundaries(&[&a, &b]).unwrap_err();
        assert_eq!(err.to_string(), "Not all analyses have a bin axis 'eta'.");
    }

    #[test]
    fn every_partition_is_compared_to_the_first() {
        let a = pt(&[0.0, 100.0, 200.0]);
        let b = pt(&[0.0, 50.0, 100.0, 200.0]);
        let c = pt(&[0.0, 150.0, 200.0]);
        assert!(check_consistent_boundaries(&[&a, &b, &c]).is_err());
    }
}

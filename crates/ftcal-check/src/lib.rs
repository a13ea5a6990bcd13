#![doc = include_str!("../README.md")]

pub mod boundaries;
pub mod consistency;
pub mod correlations;
pub mod errors;
pub mod groups;
pub mod orthogonality;
pub mod partition;
pub mod pipeline;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod systematics;

#[cfg(test)]
mod test_support;

pub use errors::{AxisDefect, BinningDefect, CheckError};
pub use partition::AxisPartition;
pub use pipeline::{validate, CheckOptions, CombinationMode, ValidatedCalibration};

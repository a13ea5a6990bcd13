//! End-to-end runs from input text through validation.

use ftcal_check::{validate, CheckError, CheckOptions, CombinationMode};
use ftcal_dsl::model::CalibrationInfo;

const COMBINED: &str = include_str!("fixtures/combined.txt");
const GAP: &str = include_str!("fixtures/gap.txt");

fn parse(src: &str) -> CalibrationInfo {
    ftcal_dsl::parse(src, "fixture.txt").unwrap()
}

#[test]
fn compatible_analyses_validate() {
    let validated = validate(parse(COMBINED), &CheckOptions::default()).unwrap();
    assert_eq!(validated.info.analyses.len(), 2);

    let ptrel = &validated.partitions[0];
    assert_eq!(ptrel.edges("pt").unwrap(), &[20.0, 60.0, 140.0, 300.0]);
    assert_eq!(ptrel.edges("abseta").unwrap(), &[0.0, 2.5]);

    let s8 = &validated.partitions[1];
    assert_eq!(s8.edges("pt").unwrap(), &[20.0, 40.0, 60.0, 140.0]);

    let bin = &validated.info.analyses[1].bins[1];
    assert_eq!(s8.find_bin("pt", &bin.spec).unwrap(), 1);
    assert_eq!(s8.find_bin("abseta", &bin.spec).unwrap(), 0);
}

#[test]
fn ignoring_extended_bins_shrinks_partition() {
    let options = CheckOptions {
        ignore_extended: true,
        ..Default::default()
    };
    let validated = validate(parse(COMBINED), &options).unwrap();
    assert_eq!(
        validated.partitions[0].edges("pt").unwrap(),
        &[20.0, 60.0, 140.0]
    );
}

#[test]
fn gap_is_reported_with_ignore_lines() {
    let err = validate(parse(GAP), &CheckOptions::default()).unwrap_err();
    assert!(matches!(err, CheckError::Binning { .. }));
    let msg = err.to_string();
    assert!(msg.contains("(100)"), "{msg}");
    assert!(msg.contains("(105)"), "{msg}");
    assert!(msg.contains("-> ptrel-bottom-SV0-0.50-AntiKt4Topo:0-pt-100"), "{msg}");
    assert!(msg.contains("-> ptrel-bottom-SV0-0.50-AntiKt4Topo:105-pt-200"), "{msg}");
}

#[test]
fn gap_is_fine_bin_by_bin() {
    let options = CheckOptions {
        mode: CombinationMode::BinByBin,
        ..Default::default()
    };
    assert!(validate(parse(GAP), &options).is_ok());
}

#[test]
fn straddling_bin_across_files_fails() {
    let mut info = parse(COMBINED);
    info.extend(parse(
        "Analysis(pdrel, bottom, SV0, 0.50, AntiKt4Topo) {\n\
         bin(20 < pt < 100, 0 < abseta < 2.5) { central_value(0.9, 0.1) }\n\
         }",
    ));
    let err = validate(info, &CheckOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Bins in 'pt' have inconsistent boundaries (20-pt-100)"
    );
}

#[test]
fn unknown_correlation_bin_fails() {
    let src = format!(
        "{COMBINED}\nCorrelation(ptrel, system8, bottom, SV0, 0.50, AntiKt4Topo) {{\n  bin(20 < pt < 40, 0 < abseta < 2.5) {{ statistical(0.1) }}\n}}\n"
    );
    match validate(parse(&src), &CheckOptions::default()).unwrap_err() {
        CheckError::UnknownCorrelationBin { analysis, .. } => assert_eq!(analysis, "ptrel"),
        other => panic!("expected UnknownCorrelationBin, got {other:?}"),
    }
}

#[test]
fn mixed_correlation_flags_fail() {
    let src = COMBINED.replacen("usys(MC stat, 0.02)", "sys(MC stat, 0.02)", 1);
    assert!(matches!(
        validate(parse(&src), &CheckOptions::default()),
        Err(CheckError::CorrelationFlagConflict { ref systematic }) if systematic == "MC stat"
    ));
}

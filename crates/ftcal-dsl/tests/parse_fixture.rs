use ftcal_dsl::model::Boundary;
use ftcal_dsl::names::ignore_format;
use ftcal_dsl::ParseError;

const SV0_PTREL: &str = include_str!("fixtures/sv0_ptrel.txt");

#[test]
fn fixture_parses_completely() {
    let info = ftcal_dsl::parse(SV0_PTREL, "sv0_ptrel.txt").unwrap();
    assert_eq!(info.analyses.len(), 2);
    assert_eq!(info.correlations.len(), 1);
    assert_eq!(info.defaults.len(), 1);
    assert_eq!(info.aliases.len(), 1);

    let ptrel = &info.analyses[0];
    assert_eq!(ptrel.key.to_string(), "ptrel-bottom-SV0-0.50-AntiKt4Topo");
    assert_eq!(ptrel.bins.len(), 5);
    assert_eq!(ptrel.metadata_s["Author"], "A. Person");
    assert_eq!(ptrel.metadata["lumi"], vec![35.0]);
    assert_eq!(ptrel.bins.iter().filter(|b| b.is_extended).count(), 1);
}

#[test]
fn fixture_relative_errors_are_absolute() {
    let info = ftcal_dsl::parse(SV0_PTREL, "sv0_ptrel.txt").unwrap();
    let first = &info.analyses[0].bins[0];
    let jes = first.systematic("JES").unwrap();
    assert!((jes.value - 0.02 * 0.94).abs() < 1e-12);
    assert!(!jes.uncorrelated);
    assert!(first.systematic("MC stat").unwrap().uncorrelated);
    assert_eq!(first.systematic("b fragmentation").unwrap().value, 0.012);
    assert_eq!(first.metadata["purity"].value, 0.81);

    let extrapolated = info.analyses[0].bins.last().unwrap();
    assert!(extrapolated.is_extended);
    assert!((extrapolated.systematic("extrapolation").unwrap().value - 0.0475).abs() < 1e-12);
}

#[test]
fn fixture_names_round_trip_through_ignore_format() {
    let info = ftcal_dsl::parse(SV0_PTREL, "sv0_ptrel.txt").unwrap();
    let ana = &info.analyses[0];
    assert_eq!(
        ignore_format(&ana.key, &ana.bins[2].spec),
        "ptrel-bottom-SV0-0.50-AntiKt4Topo:20-pt-30:1.2-abseta-2.5"
    );
    let cor = &info.correlations[0];
    assert_eq!(cor.first_key(), info.analyses[0].key);
    assert_eq!(cor.second_key(), info.analyses[1].key);
    assert_eq!(
        cor.bins[1].spec.boundaries(),
        &[Boundary::new("pt", 30.0, 60.0), Boundary::new("abseta", 0.0, 1.2)]
    );
    assert_eq!(
        info.aliases[0].copy_targets[0].operating_point,
        "0.60"
    );
}

#[test]
fn concatenated_files_keep_order() {
    let mut info = ftcal_dsl::parse(SV0_PTREL, "a.txt").unwrap();
    let more = ftcal_dsl::parse(
        "Analysis(pdrel, bottom, SV0, 0.50, AntiKt4Topo) { bin(20 < pt < 30) { central_value(1, 0.1) } }",
        "b.txt",
    )
    .unwrap();
    info.extend(more);
    let names: Vec<_> = info.analyses.iter().map(|a| a.key.name.as_str()).collect();
    assert_eq!(names, vec!["ptrel", "system8", "pdrel"]);
}

#[test]
fn corrupting_the_fixture_reports_a_located_error() {
    let broken = SV0_PTREL.replacen("central_value(0.97, 0.02)", "central_value(0.97 0.02)", 1);
    let err = ftcal_dsl::parse(&broken, "sv0_ptrel.txt").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    let at = err.span().start;
    let call = broken.find("central_value(0.97 0.02)").unwrap();
    assert!(at > call && at < call + "central_value(0.97 0.02)".len());
}

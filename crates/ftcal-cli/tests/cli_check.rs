use std::process::{Command, Output};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn ftcal(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ftcal"))
        .args(args)
        .env("RUST_LOG", "warn")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to execute ftcal")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let output = ftcal(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("parse"));
    assert!(text.contains("check"));
}

#[test]
fn parse_summarises_files_in_order() {
    let output = ftcal(&["parse", &fixture("good.txt"), &fixture("good_system8.txt")]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    let ptrel = text.find("Analysis ptrel-bottom-SV0-0.50-AntiKt4Topo: 2 bins").unwrap();
    let s8 = text.find("Analysis system8-bottom-SV0-0.50-AntiKt4Topo: 2 bins").unwrap();
    assert!(ptrel < s8);
    assert!(text.contains("2 analyses, 1 correlations, 0 defaults, 0 copies"));
}

#[test]
fn parse_json_resolves_relative_errors() {
    let output = ftcal(&["parse", "--format", "json", &fixture("good.txt")]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let bin = &value["analyses"][0]["bins"][0];
    assert_eq!(bin["central_value"], 0.95);
    let jes = bin["systematic_errors"][0]["value"].as_f64().unwrap();
    assert!((jes - 0.019).abs() < 1e-12);
}

#[test]
fn syntax_error_fails() {
    let output = ftcal(&["parse", &fixture("syntax_error.txt")]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("ftcal::parse::syntax"), "{err}");
}

#[test]
fn unknown_format_fails() {
    let output = ftcal(&["parse", "--format", "yaml", &fixture("good.txt")]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown output format"));
}

#[test]
fn check_passes_compatible_inputs() {
    let output = ftcal(&["check", &fixture("good.txt"), &fixture("good_system8.txt")]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("OK: 2 analyses and 1 correlations pass the binned checks"));
    assert!(text.contains("pt: [20, 40, 60]"));
}

#[test]
fn check_merges_analysis_split_across_files() {
    let output = ftcal(&["check", &fixture("good.txt"), &fixture("ptrel_extra.txt")]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("OK: 2 analyses"), "{text}");
    assert!(text.contains("pt: [20, 60, 140, 300]"), "{text}");
}

#[test]
fn check_rejects_bin_repeated_across_files() {
    let output = ftcal(&["check", &fixture("good.txt"), &fixture("ptrel_repeat.txt")]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("ftcal::check::duplicate_bin"), "{err}");
    assert!(err.contains("20-pt-60"), "{err}");
}

#[test]
fn parse_merges_repeated_analysis() {
    let output = ftcal(&["parse", &fixture("good.txt"), &fixture("ptrel_extra.txt")]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Analysis ptrel-bottom-SV0-0.50-AntiKt4Topo: 3 bins"));
}

#[test]
fn check_reports_gap_with_ignore_candidates() {
    let output = ftcal(&["check", &fixture("gap.txt")]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("ftcal::check::binning"), "{err}");
    assert!(err.contains("ptrel-bottom-SV0-0.50-AntiKt4Topo:105-pt-200"), "{err}");
}

#[test]
fn check_ignore_removes_offending_bin() {
    let output = ftcal(&[
        "check",
        &fixture("gap.txt"),
        "--ignore",
        "ptrel-bottom-SV0-0.50-AntiKt4Topo:105-pt-200",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("pt: [0, 100]"));
}

#[test]
fn check_bin_by_bin_accepts_gap() {
    let output = ftcal(&["check", "--bin-by-bin", "--format", "json", &fixture("gap.txt")]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["mode"], "BinByBin");
    assert_eq!(value["analyses"][0]["bins"], 2);
}

#[test]
fn check_requires_a_file() {
    let output = ftcal(&["check"]);
    assert!(!output.status.success());
}

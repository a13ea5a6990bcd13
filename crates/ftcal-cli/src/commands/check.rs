// Command handler for: Check

use std::collections::BTreeMap;
use std::path::PathBuf;

use miette::IntoDiagnostic;
use serde::Serialize;

use ftcal_check::{validate, CheckOptions, CombinationMode, ValidatedCalibration};

use super::helpers::{parse_files, parse_output_format};
use super::ignore::apply_ignores;
use crate::types::OutputFormat;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct AnalysisSummary {
    pub(crate) name: String,
    pub(crate) bins: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) edges: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckReport {
    pub(crate) status: &'static str,
    pub(crate) mode: CombinationMode,
    pub(crate) ignore_extended: bool,
    pub(crate) analyses: Vec<AnalysisSummary>,
    pub(crate) correlations: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) unmatched_ignores: Vec<String>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub(crate) fn build_check_report(
    validated: &ValidatedCalibration,
    options: &CheckOptions,
    unmatched_ignores: Vec<String>,
) -> CheckReport {
    let analyses = validated
        .info
        .analyses
        .iter()
        .enumerate()
        .map(|(i, analysis)| {
            let edges = validated
                .partitions
                .get(i)
                .map(|p| {
                    p.axis_names()
                        .filter_map(|axis| {
                            p.edges(axis).ok().map(|e| (axis.to_string(), e.to_vec()))
                        })
                        .collect()
                })
                .unwrap_or_default();
            AnalysisSummary {
                name: analysis.key.to_string(),
                bins: analysis.bins.len(),
                edges,
            }
        })
        .collect();

    CheckReport {
        status: "ok",
        mode: options.mode,
        ignore_extended: options.ignore_extended,
        analyses,
        correlations: validated.info.correlations.len(),
        unmatched_ignores,
    }
}

fn format_edges(edges: &[f64]) -> String {
    let parts: Vec<String> = edges.iter().map(|e| e.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

pub(crate) fn render_check_text(report: &CheckReport) -> String {
    let mode = match report.mode {
        CombinationMode::Binned => "binned",
        CombinationMode::BinByBin => "bin-by-bin",
    };
    let mut out = format!(
        "OK: {} analyses and {} correlations pass the {mode} checks\n",
        report.analyses.len(),
        report.correlations
    );
    for analysis in &report.analyses {
        out.push_str(&format!("  {} ({} bins)\n", analysis.name, analysis.bins));
        for (axis, edges) in &analysis.edges {
            out.push_str(&format!("    {axis}: {}\n", format_edges(edges)));
        }
    }
    for entry in &report.unmatched_ignores {
        out.push_str(&format!("  warning: --ignore {entry} matched no bin\n"));
    }
    out.trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

pub(crate) fn run_check_command(
    files: Vec<PathBuf>,
    bin_by_bin: bool,
    ignore_extended: bool,
    ignore: Vec<String>,
    format: String,
) -> miette::Result<()> {
    let output_format = parse_output_format(&format)?;
    let options = CheckOptions {
        mode: if bin_by_bin {
            CombinationMode::BinByBin
        } else {
            CombinationMode::Binned
        },
        ignore_extended,
    };

    let mut info = parse_files(&files)?;
    let unmatched = apply_ignores(&mut info, &ignore);
    let validated = validate(info, &options)?;
    let report = build_check_report(&validated, &options, unmatched);

    match output_format {
        OutputFormat::Text => println!("{}", render_check_text(&report)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?)
        }
    }
    Ok(())
}

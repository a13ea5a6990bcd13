// Command handler for: Parse

use std::path::PathBuf;

use miette::IntoDiagnostic;

use ftcal_dsl::model::CalibrationInfo;

use super::helpers::{parse_files, parse_output_format};
use crate::types::OutputFormat;

pub(crate) fn render_parse_text(info: &CalibrationInfo) -> String {
    let mut out = String::new();
    for analysis in &info.analyses {
        let extended = analysis.bins.iter().filter(|b| b.is_extended).count();
        out.push_str(&format!("Analysis {}: {} bins", analysis.key, analysis.bins.len()));
        if extended > 0 {
            out.push_str(&format!(" ({extended} extended)"));
        }
        out.push('\n');
    }
    for cor in &info.correlations {
        out.push_str(&format!(
            "Correlation {}: {} bins\n",
            ftcal_dsl::names::correlation_name(cor),
            cor.bins.len()
        ));
    }
    for default in &info.defaults {
        out.push_str(&format!("Default {}\n", default.key));
    }
    for alias in &info.aliases {
        let targets: Vec<String> = alias.copy_targets.iter().map(|k| k.to_string()).collect();
        out.push_str(&format!("Copy {} -> {}\n", alias.source, targets.join(", ")));
    }
    out.push_str(&format!(
        "{} analyses, {} correlations, {} defaults, {} copies",
        info.analyses.len(),
        info.correlations.len(),
        info.defaults.len(),
        info.aliases.len()
    ));
    out
}

pub(crate) fn run_parse_command(files: Vec<PathBuf>, format: String) -> miette::Result<()> {
    let output_format = parse_output_format(&format)?;
    let info = parse_files(&files)?;

    match output_format {
        OutputFormat::Text => println!("{}", render_parse_text(&info)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&info).into_diagnostic()?)
        }
    }
    Ok(())
}

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, WrapErr};

use ftcal_dsl::model::CalibrationInfo;

use crate::types::OutputFormat;

pub(crate) fn parse_output_format(raw: &str) -> miette::Result<OutputFormat> {
    match raw {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => miette::bail!("Unknown output format: {other}. Use 'text' or 'json'."),
    }
}

pub(crate) fn read_source(path: &Path) -> miette::Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("could not read {}", path.display()))
}

/// Parse every file and concatenate the declarations in argument order.
/// Analyses repeated across files are merged into one.
pub(crate) fn parse_files(files: &[PathBuf]) -> miette::Result<CalibrationInfo> {
    let mut info = CalibrationInfo::default();
    for path in files {
        let source = read_source(path)?;
        let filename = path.display().to_string();
        let parsed = ftcal_dsl::parse(&source, &filename)?;
        tracing::debug!(file = %filename, analyses = parsed.analyses.len(), "read input");
        info.extend(parsed);
    }
    info.merge_same_analyses();
    Ok(info)
}

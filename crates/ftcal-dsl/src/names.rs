//! Display formats shared by diagnostics and the `--ignore` filter.
//!
//! A bin is written as its boundaries `{low}-{variable}-{high}` joined by
//! `:`; an analysis as its five identity fields joined by `-`. The ignore
//! format glues the two with `:` so a line copied out of an error message
//! can be passed straight back as an ignore entry.

use crate::model::{AnalysisCorrelation, AnalysisKey, Boundary, BinSpec};

/// `0-pt-100:0-abseta-2.5`
pub fn bin_name<'a>(boundaries: impl IntoIterator<Item = &'a Boundary>) -> String {
    boundaries
        .into_iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(":")
}

/// `ptrel-bottom-SV0-0.50-AntiKt4Topo:0-pt-100`
pub fn ignore_format(key: &AnalysisKey, spec: &BinSpec) -> String {
    format!("{key}:{}", bin_name(spec))
}

/// `ptrel-system8-bottom-SV0-0.50-AntiKt4Topo`: both analysis names, then
/// the shared group fields.
pub fn correlation_name(cor: &AnalysisCorrelation) -> String {
    format!(
        "{}-{}-{}-{}-{}-{}",
        cor.analysis1_name,
        cor.analysis2_name,
        cor.flavor,
        cor.tagger,
        cor.operating_point,
        cor.jet_algorithm
    )
}

/// Ignore-style name for one bin of a correlation.
pub fn correlation_ignore_format(cor: &AnalysisCorrelation, spec: &BinSpec) -> String {
    format!("{}:{}", correlation_name(cor), bin_name(spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Span;

    fn spec() -> BinSpec {
        BinSpec::new(vec![
            Boundary::new("pt", 0.0, 100.0),
            Boundary::new("abseta", 0.0, 2.5),
        ])
    }

    #[test]
    fn bin_name_keeps_spec_order() {
        assert_eq!(bin_name(&spec()), "0-pt-100:0-abseta-2.5");
    }

    #[test]
    fn bin_name_of_empty_spec_is_empty() {
        assert_eq!(bin_name(&BinSpec::default()), "");
    }

    #[test]
    fn ignore_format_prefixes_analysis_identity() {
        let key = AnalysisKey::new("ptrel", "bottom", "SV0", "0.50", "AntiKt4Topo");
        assert_eq!(
            ignore_format(&key, &spec()),
            "ptrel-bottom-SV0-0.50-AntiKt4Topo:0-pt-100:0-abseta-2.5"
        );
    }

    #[test]
    fn correlation_format_names_both_analyses() {
        let cor = AnalysisCorrelation {
            analysis1_name: "ptrel".into(),
            analysis2_name: "s8".into(),
            flavor: "bottom".into(),
            tagger: "SV0".into(),
            operating_point: "0.50".into(),
            jet_algorithm: "AntiKt4Topo".into(),
            bins: Vec::new(),
            span: Span::new(0, 0),
        };
        assert_eq!(correlation_name(&cor), "ptrel-s8-bottom-SV0-0.50-AntiKt4Topo");
        assert_eq!(
            correlation_ignore_format(&cor, &spec()),
            "ptrel-s8-bottom-SV0-0.50-AntiKt4Topo:0-pt-100:0-abseta-2.5"
        );
    }
}

//! Builders for hand-written analyses in unit tests.

use ftcal_dsl::model::*;

pub fn spec(boundaries: &[(&str, f64, f64)]) -> BinSpec {
    BinSpec::new(
        boundaries
            .iter()
            .map(|&(v, lo, hi)| Boundary::new(v, lo, hi))
            .collect(),
    )
}

pub fn bin(boundaries: &[(&str, f64, f64)]) -> Bin {
    Bin {
        spec: spec(boundaries),
        central_value: 1.0,
        statistical_error: 0.1,
        systematic_errors: Vec::new(),
        metadata: Default::default(),
        is_extended: false,
    }
}

pub fn exbin(boundaries: &[(&str, f64, f64)]) -> Bin {
    Bin {
        is_extended: true,
        ..bin(boundaries)
    }
}

/// A 1-D `pt` bin carrying the named systematics, `true` meaning `usys`.
pub fn bin_with_sys(low: f64, high: f64, systematics: &[(&str, bool)]) -> Bin {
    Bin {
        systematic_errors: systematics
            .iter()
            .map(|&(name, uncorrelated)| SystematicError {
                name: name.to_string(),
                value: 0.01,
                uncorrelated,
            })
            .collect(),
        ..bin(&[("pt", low, high)])
    }
}

pub fn analysis_keyed(name: &str, flavor: &str, tagger: &str, op: &str, bins: Vec<Bin>) -> Analysis {
    Analysis {
        key: AnalysisKey::new(name, flavor, tagger, op, "AntiKt4Topo"),
        bins,
        metadata: Default::default(),
        metadata_s: Default::default(),
        span: Span::new(0, 0),
    }
}

/// `ptrel-bottom-SV0-0.50-AntiKt4Topo`
pub fn analysis(bins: Vec<Bin>) -> Analysis {
    analysis_keyed("ptrel", "bottom", "SV0", "0.50", bins)
}

pub fn correlation(first: &str, second: &str, bins: &[&[(&str, f64, f64)]]) -> AnalysisCorrelation {
    AnalysisCorrelation {
        analysis1_name: first.to_string(),
        analysis2_name: second.to_string(),
        flavor: "bottom".into(),
        tagger: "SV0".into(),
        operating_point: "0.50".into(),
        jet_algorithm: "AntiKt4Topo".into(),
        bins: bins
            .iter()
            .map(|b| BinCorrelation {
                spec: spec(b),
                statistical: Some(0.5),
            })
            .collect(),
        span: Span::new(0, 0),
    }
}

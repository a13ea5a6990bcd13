//! Proptest strategies for well-formed binnings.

use proptest::prelude::*;

use ftcal_dsl::model::{Analysis, AnalysisKey, Bin, BinSpec, Boundary, Span};

/// Strictly increasing edges on a quarter-unit grid, so every edge and
/// every sum of widths is exact in `f64`.
pub fn arb_edges(max_bins: usize) -> impl Strategy<Value = Vec<f64>> {
    (
        -400i32..400,
        proptest::collection::vec(1u16..400, 1..=max_bins),
    )
        .prop_map(|(start, widths)| {
            let mut edge = f64::from(start) / 4.0;
            let mut edges = Vec::with_capacity(widths.len() + 1);
            edges.push(edge);
            for w in widths {
                edge += f64::from(w) / 4.0;
                edges.push(edge);
            }
            edges
        })
}

/// A set of edges together with its intervals in shuffled order.
pub fn arb_axis_intervals() -> impl Strategy<Value = (Vec<f64>, Vec<(f64, f64)>)> {
    arb_edges(12).prop_flat_map(|edges| {
        let intervals: Vec<(f64, f64)> = edges.windows(2).map(|w| (w[0], w[1])).collect();
        (Just(edges), Just(intervals).prop_shuffle())
    })
}

/// A 2-D `pt` x `abseta` analysis with one bin per grid cell, returned with
/// the edges it was built from.
pub fn arb_grid_analysis() -> impl Strategy<Value = (Analysis, Vec<f64>, Vec<f64>)> {
    (arb_edges(6), arb_edges(4)).prop_map(|(pt, eta)| {
        let mut bins = Vec::new();
        for p in pt.windows(2) {
            for e in eta.windows(2) {
                bins.push(Bin {
                    spec: BinSpec::new(vec![
                        Boundary::new("pt", p[0], p[1]),
                        Boundary::new("abseta", e[0], e[1]),
                    ]),
                    central_value: 1.0,
                    statistical_error: 0.1,
                    systematic_errors: Vec::new(),
                    metadata: Default::default(),
                    is_extended: false,
                });
            }
        }
        let analysis = Analysis {
            key: AnalysisKey::new("grid", "bottom", "SV0", "0.50", "AntiKt4Topo"),
            bins,
            metadata: Default::default(),
            metadata_s: Default::default(),
            span: Span::new(0, 0),
        };
        (analysis, pt, eta)
    })
}

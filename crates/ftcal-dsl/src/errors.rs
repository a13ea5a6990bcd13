#![allow(unused_assignments)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::Span;

/// Everything that can stop a parse. No partial result survives an error.
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("Syntax error: expected {expected} here: \"{snippet}\"")]
    #[diagnostic(code(ftcal::parse::syntax))]
    Syntax {
        expected: String,
        snippet: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("{what} is NaN during input - not legal")]
    #[diagnostic(code(ftcal::parse::nan))]
    NotANumber {
        what: String,
        #[label("not a number")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("one and only one central value must be present in each bin (found {found} in bin {bin})")]
    #[diagnostic(code(ftcal::parse::central_value_count))]
    CentralValueCount {
        bin: String,
        found: usize,
        #[label("this bin")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("The statistical correlation coeff '{value}' is larger than one! Not allowed!")]
    #[diagnostic(
        code(ftcal::parse::statistical_range),
        help("statistical correlation coefficients must lie within [-1, 1]")
    )]
    StatisticalCorrelationOutOfRange {
        value: f64,
        #[label("out of range")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Axis '{axis}' appears more than once in bin {bin}")]
    #[diagnostic(code(ftcal::parse::duplicate_axis))]
    DuplicateAxis {
        axis: String,
        bin: String,
        #[label("repeated axis")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Systematic error '{name}' appears more than once in bin {bin}")]
    #[diagnostic(code(ftcal::parse::duplicate_systematic))]
    DuplicateSystematic {
        name: String,
        bin: String,
        #[label("repeated systematic")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },
}

/// Source text and file name attached to every error raised while parsing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceCtx<'a> {
    pub source: &'a str,
    pub filename: &'a str,
}

impl SourceCtx<'_> {
    pub fn named(&self) -> NamedSource<String> {
        NamedSource::new(self.filename, self.source.to_owned())
    }
}

pub(crate) fn source_span(span: Span) -> SourceSpan {
    (span.start, span.end.saturating_sub(span.start)).into()
}

impl ParseError {
    pub(crate) fn syntax(
        expected: impl Into<String>,
        span: Span,
        ctx: SourceCtx<'_>,
    ) -> Self {
        let snippet = snippet_at(ctx.source, span.start);
        ParseError::Syntax {
            expected: expected.into(),
            snippet,
            span: source_span(span),
            src: ctx.named(),
        }
    }

    /// Byte range of the offending input.
    pub fn span(&self) -> Span {
        let s = match self {
            ParseError::Syntax { span, .. }
            | ParseError::NotANumber { span, .. }
            | ParseError::CentralValueCount { span, .. }
            | ParseError::StatisticalCorrelationOutOfRange { span, .. }
            | ParseError::DuplicateAxis { span, .. }
            | ParseError::DuplicateSystematic { span, .. } => *span,
        };
        Span::new(s.offset(), s.offset() + s.len())
    }
}

const SNIPPET_CHARS: usize = 40;

/// Unconsumed input at `offset`, cut at the end of its line and capped in length.
fn snippet_at(source: &str, offset: usize) -> String {
    let rest = source.get(offset..).unwrap_or("");
    let line = rest.lines().next().unwrap_or("");
    line.chars().take(SNIPPET_CHARS).collect()
}

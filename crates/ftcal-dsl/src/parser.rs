#![allow(clippy::result_large_err)]

use std::collections::HashSet;

use indexmap::IndexMap;
use pest::error::{ErrorVariant, InputLocation};
use pest::Parser;
use pest_derive::Parser;

use crate::errors::{source_span, ParseError, SourceCtx};
use crate::model::*;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct CalibrationParser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;
type Pairs<'a> = pest::iterators::Pairs<'a, Rule>;

fn span_from(pair: &Pair<'_>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

/// Parse calibration input text into a [`CalibrationInfo`].
///
/// Lines starting with `#` are comments. They are blanked rather than
/// removed, so spans in errors still index into `source`.
pub fn parse(source: &str, filename: &str) -> Result<CalibrationInfo, ParseError> {
    let text = strip_comment_lines(source);
    let ctx = SourceCtx { source, filename };

    let file = CalibrationParser::parse(Rule::file, &text)
        .map_err(|e| syntax_from_pest(e, ctx))?
        .next()
        .ok_or_else(|| ParseError::syntax("calibration file", Span::new(0, 0), ctx))?;

    let mut info = CalibrationInfo::default();
    for item in file.into_inner() {
        match item.as_rule() {
            Rule::analysis => info.analyses.push(parse_analysis(item, ctx)?),
            Rule::correlation => info.correlations.push(parse_correlation(item, ctx)?),
            Rule::default_decl => info.defaults.push(parse_default(item, ctx)?),
            Rule::copy_decl => info.aliases.push(parse_copy(item, ctx)?),
            _ => {}
        }
    }

    tracing::debug!(
        analyses = info.analyses.len(),
        correlations = info.correlations.len(),
        defaults = info.defaults.len(),
        aliases = info.aliases.len(),
        "parsed {filename}"
    );
    Ok(info)
}

/// Blank every line whose first byte is `#`, keeping byte offsets intact.
pub fn strip_comment_lines(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        if line.starts_with('#') {
            let body = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
            out.extend(std::iter::repeat(' ').take(body.len()));
            out.push_str(&line[body.len()..]);
        } else {
            out.push_str(line);
        }
    }
    out
}

fn syntax_from_pest(err: pest::error::Error<Rule>, ctx: SourceCtx<'_>) -> ParseError {
    let (start, end) = match err.location {
        InputLocation::Pos(p) => {
            let width = ctx
                .source
                .get(p..)
                .and_then(|rest| rest.chars().next())
                .map_or(0, char::len_utf8);
            (p, p + width)
        }
        InputLocation::Span((s, e)) => (s, e),
    };
    let expected = match &err.variant {
        ErrorVariant::ParsingError { positives, .. } => describe_rules(positives),
        ErrorVariant::CustomError { message } => message.clone(),
    };
    ParseError::syntax(expected, Span::new(start, end.max(start)), ctx)
}

fn describe_rules(rules: &[Rule]) -> String {
    let mut seen = Vec::new();
    for rule in rules {
        let text = describe_rule(*rule);
        if !seen.contains(&text) {
            seen.push(text);
        }
    }
    if seen.is_empty() {
        "valid input".to_string()
    } else {
        seen.join(" or ")
    }
}

fn describe_rule(rule: Rule) -> &'static str {
    match rule {
        Rule::file => "calibration file",
        Rule::analysis | Rule::analysis_header => "Analysis block",
        Rule::correlation | Rule::correlation_header => "Correlation block",
        Rule::default_decl => "Default declaration",
        Rule::copy_decl => "Copy block",
        Rule::identity => "analysis identity (name, flavor, tagger, operating point, jet algorithm)",
        Rule::bin | Rule::bin_keyword => "bin",
        Rule::boundary | Rule::boundary_list => "bin boundary (low < variable < high)",
        Rule::variable => "axis variable name",
        Rule::number => "number",
        Rule::name | Rule::bare_name | Rule::quoted_name | Rule::quoted_text => "name",
        Rule::error_magnitude => "error value",
        Rule::percent => "%",
        Rule::systematic | Rule::sys_kind => "systematic error",
        Rule::central_value => "central value",
        Rule::bin_meta_data | Rule::analysis_meta_data => "meta data",
        Rule::meta_data_s => "meta data string",
        Rule::statistical => "statistical correlation",
        Rule::correlation_bin => "correlation bin",
        Rule::EOI => "end of input",
        _ => "valid input",
    }
}

/// Pull the next child the grammar guarantees, turning a mismatch into a
/// syntax error rather than a panic.
fn expect_next<'a>(
    inner: &mut Pairs<'a>,
    what: &str,
    parent: Span,
    ctx: SourceCtx<'_>,
) -> Result<Pair<'a>, ParseError> {
    inner
        .next()
        .ok_or_else(|| ParseError::syntax(what, Span::new(parent.end, parent.end), ctx))
}

fn parse_name(pair: Pair<'_>) -> String {
    match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::quoted_name => inner
            .into_inner()
            .next()
            .map(|text| text.as_str().to_string())
            .unwrap_or_default(),
        Some(inner) => inner.as_str().to_string(),
        None => String::new(),
    }
}

fn parse_number(pair: &Pair<'_>, ctx: SourceCtx<'_>) -> Result<f64, ParseError> {
    let text = pair.as_str();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits = digits.to_ascii_lowercase();
    let magnitude = match digits.as_str() {
        "nan" => f64::NAN,
        "inf" | "infinity" => f64::INFINITY,
        other => other.parse::<f64>().map_err(|e| {
            ParseError::syntax(format!("number ({e})"), span_from(pair), ctx)
        })?,
    };
    Ok(sign * magnitude)
}

fn not_a_number(what: impl Into<String>, span: Span, ctx: SourceCtx<'_>) -> ParseError {
    ParseError::NotANumber {
        what: what.into(),
        span: source_span(span),
        src: ctx.named(),
    }
}

// ---------------------------------------------------------------
// Boundaries and error magnitudes
// ---------------------------------------------------------------

fn parse_boundary(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<(Boundary, Span), ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let low = parse_number(&expect_next(&mut inner, "number", span, ctx)?, ctx)?;
    let variable = expect_next(&mut inner, "axis variable name", span, ctx)?
        .as_str()
        .to_string();
    let high = parse_number(&expect_next(&mut inner, "number", span, ctx)?, ctx)?;
    Ok((Boundary::new(variable, low, high), span))
}

fn parse_boundary_list(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<BinSpec, ParseError> {
    let mut boundaries: Vec<Boundary> = Vec::new();
    for item in pair.into_inner() {
        let (boundary, span) = parse_boundary(item, ctx)?;
        if boundaries.iter().any(|b| b.variable == boundary.variable) {
            boundaries.push(boundary.clone());
            return Err(ParseError::DuplicateAxis {
                axis: boundary.variable,
                bin: crate::names::bin_name(&boundaries),
                span: source_span(span),
                src: ctx.named(),
            });
        }
        boundaries.push(boundary);
    }
    Ok(BinSpec::new(boundaries))
}

/// An error as written: absolute, or a percentage of the bin's central value.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ErrorMagnitude {
    value: f64,
    relative: bool,
}

impl ErrorMagnitude {
    fn resolve(self, central_value: f64) -> f64 {
        if self.relative {
            self.value / 100.0 * central_value
        } else {
            self.value
        }
    }
}

fn parse_error_magnitude(
    pair: Pair<'_>,
    what: &str,
    ctx: SourceCtx<'_>,
) -> Result<ErrorMagnitude, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let value = parse_number(&expect_next(&mut inner, "number", span, ctx)?, ctx)?;
    if value.is_nan() {
        return Err(not_a_number(what, span, ctx));
    }
    let relative = inner.next().is_some_and(|p| p.as_rule() == Rule::percent);
    Ok(ErrorMagnitude { value, relative })
}

// ---------------------------------------------------------------
// Bins
// ---------------------------------------------------------------

#[derive(Debug)]
struct PendingSystematic {
    name: String,
    magnitude: ErrorMagnitude,
    uncorrelated: bool,
    span: Span,
}

/// Everything seen inside one `bin(...) { ... }` so far. Relative errors
/// stay unresolved until the closing brace, because the central value may
/// come after them.
#[derive(Debug)]
struct BinStage {
    spec: BinSpec,
    extended: bool,
    systematics: Vec<PendingSystematic>,
    central_values: Vec<(f64, ErrorMagnitude)>,
    metadata: IndexMap<String, MetaValue>,
    span: Span,
}

impl BinStage {
    fn new(spec: BinSpec, extended: bool, span: Span) -> Self {
        Self {
            spec,
            extended,
            systematics: Vec::new(),
            central_values: Vec::new(),
            metadata: IndexMap::new(),
            span,
        }
    }

    fn finish(self, ctx: SourceCtx<'_>) -> Result<Bin, ParseError> {
        let [(central_value, stat)] = self.central_values.as_slice() else {
            return Err(ParseError::CentralValueCount {
                bin: self.spec.to_string(),
                found: self.central_values.len(),
                span: source_span(self.span),
                src: ctx.named(),
            });
        };
        let (central_value, stat) = (*central_value, *stat);

        let mut names = HashSet::new();
        let mut systematic_errors = Vec::with_capacity(self.systematics.len());
        for sys in self.systematics {
            if !names.insert(sys.name.clone()) {
                return Err(ParseError::DuplicateSystematic {
                    name: sys.name,
                    bin: self.spec.to_string(),
                    span: source_span(sys.span),
                    src: ctx.named(),
                });
            }
            systematic_errors.push(SystematicError {
                value: sys.magnitude.resolve(central_value),
                name: sys.name,
                uncorrelated: sys.uncorrelated,
            });
        }

        Ok(Bin {
            spec: self.spec,
            central_value,
            statistical_error: stat.resolve(central_value),
            systematic_errors,
            metadata: self.metadata,
            is_extended: self.extended,
        })
    }
}

fn parse_bin(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<Bin, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let keyword = expect_next(&mut inner, "bin", span, ctx)?;
    let spec = parse_boundary_list(expect_next(&mut inner, "bin boundary", span, ctx)?, ctx)?;
    let mut stage = BinStage::new(spec, keyword.as_str() == "exbin", span);

    for item in inner {
        match item.as_rule() {
            Rule::systematic => stage.systematics.push(parse_systematic(item, ctx)?),
            Rule::central_value => stage.central_values.push(parse_central_value(item, ctx)?),
            Rule::bin_meta_data => {
                let (name, meta) = parse_bin_meta_data(item, ctx)?;
                stage.metadata.insert(name, meta);
            }
            _ => {}
        }
    }

    stage.finish(ctx)
}

fn parse_systematic(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<PendingSystematic, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let uncorrelated = expect_next(&mut inner, "sys or usys", span, ctx)?.as_str() == "usys";
    let name = parse_name(expect_next(&mut inner, "name", span, ctx)?);
    let magnitude = parse_error_magnitude(
        expect_next(&mut inner, "error value", span, ctx)?,
        &format!("systematic error '{name}'"),
        ctx,
    )?;
    Ok(PendingSystematic {
        name,
        magnitude,
        uncorrelated,
        span,
    })
}

/// A metadata number; NaN is rejected like in every other value field.
fn parse_meta_number(pair: &Pair<'_>, name: &str, ctx: SourceCtx<'_>) -> Result<f64, ParseError> {
    let value = parse_number(pair, ctx)?;
    if value.is_nan() {
        return Err(not_a_number(format!("meta data '{name}'"), span_from(pair), ctx));
    }
    Ok(value)
}

fn parse_central_value(
    pair: Pair<'_>,
    ctx: SourceCtx<'_>,
) -> Result<(f64, ErrorMagnitude), ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let value_pair = expect_next(&mut inner, "number", span, ctx)?;
    let value = parse_number(&value_pair, ctx)?;
    if value.is_nan() {
        return Err(not_a_number("central value", span_from(&value_pair), ctx));
    }
    let error = parse_error_magnitude(
        expect_next(&mut inner, "error value", span, ctx)?,
        "central value error",
        ctx,
    )?;
    Ok((value, error))
}

fn parse_bin_meta_data(
    pair: Pair<'_>,
    ctx: SourceCtx<'_>,
) -> Result<(String, MetaValue), ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let name = parse_name(expect_next(&mut inner, "name", span, ctx)?);
    let value = parse_meta_number(&expect_next(&mut inner, "number", span, ctx)?, &name, ctx)?;
    let error = match inner.next() {
        Some(p) => parse_meta_number(&p, &name, ctx)?,
        None => 0.0,
    };
    Ok((name, MetaValue { value, error }))
}

// ---------------------------------------------------------------
// Analyses
// ---------------------------------------------------------------

fn parse_identity(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<AnalysisKey, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let mut field = |what: &str| -> Result<String, ParseError> {
        Ok(parse_name(expect_next(&mut inner, what, span, ctx)?))
    };
    Ok(AnalysisKey {
        name: field("analysis name")?,
        flavor: field("flavor")?,
        tagger: field("tagger")?,
        operating_point: field("operating point")?,
        jet_algorithm: field("jet algorithm")?,
    })
}

fn parse_analysis_header(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<AnalysisKey, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    parse_identity(expect_next(&mut inner, "analysis identity", span, ctx)?, ctx)
}

fn parse_analysis(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<Analysis, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let key = parse_analysis_header(expect_next(&mut inner, "Analysis header", span, ctx)?, ctx)?;

    let mut bins = Vec::new();
    let mut metadata = IndexMap::new();
    let mut metadata_s = IndexMap::new();

    for item in inner {
        match item.as_rule() {
            Rule::bin => bins.push(parse_bin(item, ctx)?),
            Rule::analysis_meta_data => {
                let item_span = span_from(&item);
                let mut md = item.into_inner();
                let name = parse_name(expect_next(&mut md, "name", item_span, ctx)?);
                let values = md
                    .map(|p| parse_meta_number(&p, &name, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                metadata.insert(name, values);
            }
            Rule::meta_data_s => {
                let item_span = span_from(&item);
                let mut md = item.into_inner();
                let name = parse_name(expect_next(&mut md, "name", item_span, ctx)?);
                let value = parse_name(expect_next(&mut md, "name", item_span, ctx)?);
                metadata_s.insert(name, value);
            }
            _ => {}
        }
    }

    tracing::trace!(analysis = %key, bins = bins.len(), "parsed analysis");
    Ok(Analysis {
        key,
        bins,
        metadata,
        metadata_s,
        span,
    })
}

// ---------------------------------------------------------------
// Correlations, defaults and copies
// ---------------------------------------------------------------

fn parse_correlation(
    pair: Pair<'_>,
    ctx: SourceCtx<'_>,
) -> Result<AnalysisCorrelation, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let header = expect_next(&mut inner, "Correlation header", span, ctx)?;
    let header_span = span_from(&header);
    let mut names = header.into_inner();
    let mut field = |what: &str| -> Result<String, ParseError> {
        Ok(parse_name(expect_next(&mut names, what, header_span, ctx)?))
    };
    let analysis1_name = field("first analysis name")?;
    let analysis2_name = field("second analysis name")?;
    let flavor = field("flavor")?;
    let tagger = field("tagger")?;
    let operating_point = field("operating point")?;
    let jet_algorithm = field("jet algorithm")?;

    let bins = inner
        .filter(|p| p.as_rule() == Rule::correlation_bin)
        .map(|p| parse_correlation_bin(p, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisCorrelation {
        analysis1_name,
        analysis2_name,
        flavor,
        tagger,
        operating_point,
        jet_algorithm,
        bins,
        span,
    })
}

fn parse_correlation_bin(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<BinCorrelation, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let spec = parse_boundary_list(expect_next(&mut inner, "bin boundary", span, ctx)?, ctx)?;

    let statistical = match inner.next() {
        Some(stat) => {
            let stat_span = span_from(&stat);
            let mut stat_inner = stat.into_inner();
            let value = parse_number(&expect_next(&mut stat_inner, "number", stat_span, ctx)?, ctx)?;
            // Written as a negated comparison so NaN is rejected too.
            if !(value.abs() <= 1.0) {
                return Err(ParseError::StatisticalCorrelationOutOfRange {
                    value,
                    span: source_span(stat_span),
                    src: ctx.named(),
                });
            }
            Some(value)
        }
        None => None,
    };

    Ok(BinCorrelation { spec, statistical })
}

fn parse_default(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<DefaultAnalysis, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let key = parse_identity(expect_next(&mut inner, "analysis identity", span, ctx)?, ctx)?;
    Ok(DefaultAnalysis { key, span })
}

fn parse_copy(pair: Pair<'_>, ctx: SourceCtx<'_>) -> Result<AliasAnalysis, ParseError> {
    let span = span_from(&pair);
    let mut inner = pair.into_inner();
    let source = parse_identity(expect_next(&mut inner, "analysis identity", span, ctx)?, ctx)?;
    let copy_targets = inner
        .filter(|p| p.as_rule() == Rule::analysis_header)
        .map(|p| parse_analysis_header(p, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AliasAnalysis {
        source,
        copy_targets,
        span,
    })
}

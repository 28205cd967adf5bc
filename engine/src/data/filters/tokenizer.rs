//! Operand tokenizer
//!
//! Decodes the value half of a `key=value` pair into [`OperandToken`]s.
//! Alternatives separated by `,` or `||` become separate tokens that the
//! filter ORs together. Decoding never fails: anything malformed becomes a
//! literal equality match on the text the caller sent.

use chrono::NaiveDate;

/// Comparison a token applies to its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    /// Inclusive `BETWEEN`, two values
    Range,
    /// Membership in a list, one or more values
    In,
    /// `IS NULL`, no values
    Null,
}

impl Operator {
    /// Parse an explicit key suffix (`title_like`) into an operator and polarity
    pub fn from_suffix(suffix: &str) -> Option<(Self, bool)> {
        let parsed = match suffix {
            "eq" => (Self::Eq, false),
            "neq" => (Self::Eq, true),
            "gt" => (Self::Gt, false),
            "gte" => (Self::Gte, false),
            "lt" => (Self::Lt, false),
            "lte" => (Self::Lte, false),
            "like" => (Self::Like, false),
            "range" => (Self::Range, false),
            "in" => (Self::In, false),
            _ => return None,
        };
        Some(parsed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Range => "range",
            Self::In => "in",
            Self::Null => "null",
        }
    }
}

/// One decoded comparison unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandToken {
    pub operator: Operator,
    pub negated: bool,
    pub values: Vec<String>,
}

impl OperandToken {
    pub fn new(operator: Operator, negated: bool, values: Vec<String>) -> Self {
        Self {
            operator,
            negated,
            values,
        }
    }

    fn single(operator: Operator, negated: bool, value: &str) -> Self {
        Self::new(operator, negated, vec![value.to_string()])
    }

    /// Literal equality on the raw text
    fn literal(raw: &str) -> Self {
        Self::single(Operator::Eq, false, raw)
    }
}

/// Decode a raw value, inferring operators from its syntax
pub fn tokenize(raw: &str) -> Vec<OperandToken> {
    split_alternatives(raw)
        .into_iter()
        .filter(|alt| !alt.is_empty())
        .map(decode)
        .collect()
}

/// Decode a raw value under an operator forced by a key suffix.
///
/// Values are taken literally; only alternatives (`,`, `||`) are split. A
/// forced range splits on `||` only, each alternative being `lo,hi` or `lo-hi`.
pub fn tokenize_with(raw: &str, operator: Operator, negated: bool) -> Vec<OperandToken> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    match operator {
        Operator::Range => raw
            .split("||")
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(|alt| {
                forced_bounds(alt)
                    .map(|(lo, hi)| OperandToken::new(Operator::Range, negated, vec![lo, hi]))
                    .unwrap_or_else(|| OperandToken::literal(alt))
            })
            .collect(),
        Operator::In => {
            let values: Vec<String> = plain_alternatives(raw).map(str::to_string).collect();
            if values.is_empty() {
                return Vec::new();
            }
            vec![OperandToken::new(Operator::In, negated, values)]
        }
        Operator::Like => plain_alternatives(raw)
            .map(|value| {
                let pattern = if value.contains('%') {
                    value.to_string()
                } else {
                    format!("%{}%", value)
                };
                OperandToken::new(Operator::Like, negated, vec![pattern])
            })
            .collect(),
        operator => plain_alternatives(raw)
            .map(|value| OperandToken::single(operator, negated, value))
            .collect(),
    }
}

/// `lo,hi` with exactly two non-empty parts, or a comparable `lo-hi`
fn forced_bounds(alternative: &str) -> Option<(String, String)> {
    if !alternative.contains(',') {
        return parse_range(alternative);
    }
    let parts: Vec<&str> = alternative.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [lo, hi] if !lo.is_empty() && !hi.is_empty() => Some((lo.to_string(), hi.to_string())),
        _ => None,
    }
}

fn plain_alternatives(raw: &str) -> impl Iterator<Item = &str> {
    raw.split("||")
        .flat_map(|part| part.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Split on `||` and top-level commas. Commas inside `[...]` and the bound
/// separator of a `><lo,hi` expression stay with their alternative.
fn split_alternatives(raw: &str) -> Vec<&str> {
    let mut alternatives = Vec::new();
    for part in raw.split("||") {
        let mut rest = part;
        loop {
            let end = alternative_end(rest);
            alternatives.push(rest[..end].trim());
            if end >= rest.len() {
                break;
            }
            rest = &rest[end + 1..];
        }
    }
    alternatives
}

/// Byte offset of the comma closing the first alternative in `s`, or `s.len()`
fn alternative_end(s: &str) -> usize {
    let head = s.trim_start();
    let head = head.strip_prefix('!').unwrap_or(head).trim_start();
    let mut bound_commas = usize::from(head.starts_with("><"));
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                if bound_commas == 0 {
                    return i;
                }
                bound_commas -= 1;
            }
            _ => {}
        }
    }
    s.len()
}

fn decode(alternative: &str) -> OperandToken {
    if alternative == "~" {
        return OperandToken::new(Operator::Null, false, Vec::new());
    }
    let (negated, body) = match alternative.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, alternative),
    };
    if negated && body.is_empty() {
        return OperandToken::new(Operator::Null, true, Vec::new());
    }
    decode_body(body, negated).unwrap_or_else(|| OperandToken::literal(alternative))
}

/// `None` means malformed: the caller falls back to a literal match
fn decode_body(body: &str, negated: bool) -> Option<OperandToken> {
    if let Some(bounds) = body.strip_prefix("><") {
        let (lo, hi) = bounds.split_once(',')?;
        let (lo, hi) = (lo.trim(), hi.trim());
        if lo.is_empty() || hi.is_empty() {
            return None;
        }
        let values = vec![lo.to_string(), hi.to_string()];
        return Some(OperandToken::new(Operator::Range, negated, values));
    }

    for (prefix, operator) in [
        (">=", Operator::Gte),
        ("<=", Operator::Lte),
        (">", Operator::Gt),
        ("<", Operator::Lt),
    ] {
        if let Some(operand) = body.strip_prefix(prefix) {
            let operand = operand.trim();
            if operand.is_empty() || operand.starts_with(['<', '>', '=']) {
                return None;
            }
            return Some(OperandToken::single(operator, negated, operand));
        }
    }

    if let Some(list) = body.strip_prefix('[') {
        let values: Vec<String> = list
            .strip_suffix(']')?
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        if values.is_empty() {
            return None;
        }
        return Some(OperandToken::new(Operator::In, negated, values));
    }

    if body.contains('%') {
        // A range that also carries a wildcard has no defined meaning
        if parse_range(&body.replace('%', "")).is_some() {
            return None;
        }
        return Some(OperandToken::single(Operator::Like, negated, body));
    }

    if let Some((lo, hi)) = parse_range(body) {
        if negated {
            return None;
        }
        return Some(OperandToken::new(Operator::Range, false, vec![lo, hi]));
    }

    Some(OperandToken::single(Operator::Eq, negated, body))
}

/// Split `lo-hi` at the first dash where both sides are comparable values
fn parse_range(value: &str) -> Option<(String, String)> {
    value.match_indices('-').find_map(|(i, _)| {
        let (lo, hi) = (value[..i].trim(), value[i + 1..].trim());
        comparable_pair(lo, hi).then(|| (lo.to_string(), hi.to_string()))
    })
}

fn comparable_pair(lo: &str, hi: &str) -> bool {
    (is_number(lo) && is_number(hi)) || (is_date(lo) && is_date(hi))
}

fn is_number(value: &str) -> bool {
    value.parse::<f64>().is_ok_and(f64::is_finite)
}

fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

//! Filter type definitions
//!
//! A [`Filter`] is one atomic predicate: an expression fragment plus the
//! values bound to the placeholders it references.

use std::collections::HashMap;

use crate::data::query::{ComparisonOp, Expr, ExpressionBuilder, Parameters};
use crate::utils::sql::escape_like_wildcards;

use super::tokenizer::{OperandToken, Operator};

/// Atomic predicate with its own bound parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    fields: Vec<String>,
    alias: String,
    expression: Expr,
    parameters: Parameters,
}

impl Filter {
    /// Create a filter from a prebuilt expression.
    ///
    /// Used by field-specific handlers that bypass the parameter parser. The
    /// caller guarantees every placeholder in `expression` is in `parameters`.
    pub fn new(
        field_name: impl Into<String>,
        alias: impl Into<String>,
        expression: Expr,
        parameters: Parameters,
    ) -> Self {
        Self {
            fields: vec![field_name.into()],
            alias: alias.into(),
            expression,
            parameters,
        }
    }

    /// Build a filter comparing each `(field, tokens)` target against
    /// `alias.field`. All comparisons are ORed together.
    ///
    /// Returns `None` when no token produced a comparison.
    pub fn from_tokens(
        alias: &str,
        targets: &[(String, Vec<OperandToken>)],
        placeholders: &mut Placeholders,
        expr: &ExpressionBuilder,
    ) -> Option<Self> {
        let mut parameters = Parameters::new();
        let mut comparisons = Vec::new();
        for (field, tokens) in targets {
            let column = format!("{}.{}", alias, field);
            let mut binder = Binder {
                field: field.as_str(),
                placeholders: &mut *placeholders,
                parameters: &mut parameters,
            };
            for token in tokens {
                if let Some(comparison) = token_expression(expr, &column, token, &mut binder) {
                    comparisons.push(comparison);
                }
            }
        }

        let expression = match comparisons.len() {
            0 => return None,
            1 => comparisons.pop()?,
            _ => expr.or_x(comparisons),
        };

        Some(Self {
            fields: targets.iter().map(|(field, _)| field.clone()).collect(),
            alias: alias.to_string(),
            expression,
            parameters,
        })
    }

    /// First (usually only) field the filter targets
    pub fn field_name(&self) -> &str {
        self.fields.first().map_or("", String::as_str)
    }

    /// All fields the filter targets
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Override a bound value. Unknown placeholders are ignored.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<String>) {
        if let Some(slot) = self.parameters.get_mut(name) {
            *slot = value.into();
        }
    }
}

/// Per-field placeholder counters (`title_0`, `title_1`, ...)
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    counters: HashMap<String, usize>,
}

impl Placeholders {
    pub fn next(&mut self, field: &str) -> String {
        let counter = self.counters.entry(field.to_string()).or_insert(0);
        let name = format!("{}_{}", field, counter);
        *counter += 1;
        name
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

struct Binder<'a> {
    field: &'a str,
    placeholders: &'a mut Placeholders,
    parameters: &'a mut Parameters,
}

impl Binder<'_> {
    fn bind(&mut self, value: &str) -> String {
        let name = self.placeholders.next(self.field);
        self.parameters.insert(name.clone(), value.to_string());
        name
    }
}

fn token_expression(
    expr: &ExpressionBuilder,
    column: &str,
    token: &OperandToken,
    binder: &mut Binder<'_>,
) -> Option<Expr> {
    let negated = token.negated;
    let comparison = |op: ComparisonOp, binder: &mut Binder<'_>| -> Option<Expr> {
        let value = token.values.first()?;
        let cmp = expr.comparison(column, op, binder.bind(value));
        Some(if negated { expr.not(cmp) } else { cmp })
    };

    match token.operator {
        Operator::Eq => {
            let param = binder.bind(token.values.first()?);
            Some(if negated {
                expr.neq(column, param)
            } else {
                expr.eq(column, param)
            })
        }
        Operator::Gt => comparison(ComparisonOp::Gt, binder),
        Operator::Gte => comparison(ComparisonOp::Gte, binder),
        Operator::Lt => comparison(ComparisonOp::Lt, binder),
        Operator::Lte => comparison(ComparisonOp::Lte, binder),
        Operator::Like => {
            let pattern = escape_like_wildcards(token.values.first()?);
            Some(expr.like(column, binder.bind(&pattern), negated))
        }
        Operator::Range => {
            let [low, high] = token.values.as_slice() else {
                return None;
            };
            let low = binder.bind(low);
            let high = binder.bind(high);
            Some(expr.between(column, low, high, negated))
        }
        Operator::In => {
            if token.values.is_empty() {
                return None;
            }
            let params = token.values.iter().map(|v| binder.bind(v)).collect();
            Some(expr.in_list(column, params, negated))
        }
        Operator::Null => Some(expr.is_null(column, negated)),
    }
}

//! Boolean expression tree
//!
//! Expressions reference bound values only through named placeholders, so a
//! tree can be rendered for diagnostics (`:status_0`) or for execution with a
//! dialect's positional placeholders without ever splicing values into SQL.

use std::collections::BTreeMap;
use std::fmt;

/// Placeholder name → bound value
pub type Parameters = BTreeMap<String, String>;

/// Ordering/equality comparison between a column and a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparisonOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "<>",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
        }
    }
}

/// A boolean expression node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Comparison {
        column: String,
        op: ComparisonOp,
        param: String,
    },
    Like {
        column: String,
        param: String,
        negated: bool,
    },
    Between {
        column: String,
        low: String,
        high: String,
        negated: bool,
    },
    In {
        column: String,
        params: Vec<String>,
        negated: bool,
    },
    Null {
        column: String,
        negated: bool,
    },
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    /// Render the expression, asking `placeholder` for the SQL text of each
    /// placeholder in left-to-right order.
    pub fn render_with(&self, placeholder: &mut dyn FnMut(&str) -> String) -> String {
        match self {
            Self::Comparison { column, op, param } => {
                format!("{} {} {}", column, op.as_sql(), placeholder(param))
            }
            Self::Like {
                column,
                param,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                format!("{} {}LIKE {} ESCAPE '\\'", column, not, placeholder(param))
            }
            Self::Between {
                column,
                low,
                high,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                let low = placeholder(low);
                let high = placeholder(high);
                format!("{} {}BETWEEN {} AND {}", column, not, low, high)
            }
            Self::In {
                column,
                params,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                let list: Vec<String> = params.iter().map(|p| placeholder(p)).collect();
                format!("{} {}IN ({})", column, not, list.join(", "))
            }
            Self::Null { column, negated } => {
                if *negated {
                    format!("{} IS NOT NULL", column)
                } else {
                    format!("{} IS NULL", column)
                }
            }
            Self::Not(inner) => format!("NOT ({})", inner.render_with(placeholder)),
            Self::And(parts) => Self::render_group(parts, " AND ", "1=1", placeholder),
            Self::Or(parts) => Self::render_group(parts, " OR ", "1=0", placeholder),
        }
    }

    fn render_group(
        parts: &[Expr],
        separator: &str,
        empty: &str,
        placeholder: &mut dyn FnMut(&str) -> String,
    ) -> String {
        if parts.is_empty() {
            return empty.to_string();
        }
        if let [only] = parts {
            return only.render_with(placeholder);
        }
        parts
            .iter()
            .map(|part| {
                let sql = part.render_with(placeholder);
                if part.is_compound() {
                    format!("({})", sql)
                } else {
                    sql
                }
            })
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Renders as a bare AND/OR chain and needs parentheses when nested
    fn is_compound(&self) -> bool {
        match self {
            Self::And(parts) | Self::Or(parts) => match parts.as_slice() {
                [] => false,
                [only] => only.is_compound(),
                _ => true,
            },
            _ => false,
        }
    }

    /// Placeholder names in rendering order
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.render_with(&mut |name| {
            names.push(name.to_string());
            String::new()
        });
        names
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(&mut |name| format!(":{}", name)))
    }
}

/// Expression factory handed out by query builders
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionBuilder;

impl ExpressionBuilder {
    pub fn comparison(
        &self,
        column: impl Into<String>,
        op: ComparisonOp,
        param: impl Into<String>,
    ) -> Expr {
        Expr::Comparison {
            column: column.into(),
            op,
            param: param.into(),
        }
    }

    pub fn eq(&self, column: impl Into<String>, param: impl Into<String>) -> Expr {
        self.comparison(column, ComparisonOp::Eq, param)
    }

    pub fn neq(&self, column: impl Into<String>, param: impl Into<String>) -> Expr {
        self.comparison(column, ComparisonOp::Neq, param)
    }

    pub fn like(
        &self,
        column: impl Into<String>,
        param: impl Into<String>,
        negated: bool,
    ) -> Expr {
        Expr::Like {
            column: column.into(),
            param: param.into(),
            negated,
        }
    }

    pub fn between(
        &self,
        column: impl Into<String>,
        low: impl Into<String>,
        high: impl Into<String>,
        negated: bool,
    ) -> Expr {
        Expr::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated,
        }
    }

    pub fn in_list(&self, column: impl Into<String>, params: Vec<String>, negated: bool) -> Expr {
        Expr::In {
            column: column.into(),
            params,
            negated,
        }
    }

    pub fn is_null(&self, column: impl Into<String>, negated: bool) -> Expr {
        Expr::Null {
            column: column.into(),
            negated,
        }
    }

    pub fn not(&self, expr: Expr) -> Expr {
        Expr::Not(Box::new(expr))
    }

    pub fn and_x(&self, parts: Vec<Expr>) -> Expr {
        Expr::And(parts)
    }

    pub fn or_x(&self, parts: Vec<Expr>) -> Expr {
        Expr::Or(parts)
    }
}

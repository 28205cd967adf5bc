//! Backing query builder
//!
//! `SelectQuery` only ever talks to a [`QueryBuilder`]: it asks for the
//! expression factory, replaces the WHERE clause, binds parameters and caps
//! the result size. [`SelectBuilder`] is the SQL implementation.

use std::fmt;

use crate::data::error::DataError;
use crate::data::sql::{Backend, SqlDialect};

use super::expr::{Expr, ExpressionBuilder, Parameters};

/// Query builder collaborator configured by `SelectQuery::build`
pub trait QueryBuilder: Clone {
    /// Expression factory used to create filter fragments
    fn expr(&self) -> ExpressionBuilder {
        ExpressionBuilder
    }

    /// Replace the WHERE clause (`None` removes it)
    fn set_where(&mut self, expr: Option<Expr>);

    /// Replace all bound parameters
    fn set_parameters(&mut self, parameters: Parameters);

    /// Cap the number of returned rows (`None` for unbounded)
    fn set_max_results(&mut self, limit: Option<u32>);

    /// SQL text with named placeholders
    fn sql(&self) -> String;
}

/// Rendered query ready to hand to a driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalQuery {
    pub sql: String,
    pub values: Vec<String>,
}

/// `SELECT alias.* FROM table alias` query
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    alias: String,
    backend: Backend,
    where_expr: Option<Expr>,
    parameters: Parameters,
    max_results: Option<u32>,
}

impl SelectBuilder {
    /// Callers are responsible for passing registry-validated identifiers.
    pub fn new(table: impl Into<String>, alias: impl Into<String>, backend: Backend) -> Self {
        Self {
            table: table.into(),
            alias: alias.into(),
            backend,
            where_expr: None,
            parameters: Parameters::new(),
            max_results: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn where_expr(&self) -> Option<&Expr> {
        self.where_expr.as_ref()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn max_results(&self) -> Option<u32> {
        self.max_results
    }

    fn render(
        &self,
        dialect: &dyn SqlDialect,
        placeholder: &mut dyn FnMut(&str) -> String,
    ) -> String {
        let mut sql = format!("SELECT {}.* FROM {} {}", self.alias, self.table, self.alias);
        if let Some(expr) = &self.where_expr {
            sql.push_str(" WHERE ");
            sql.push_str(&expr.render_with(placeholder));
        }
        if let Some(limit) = self.max_results {
            sql.push(' ');
            sql.push_str(&dialect.limit(limit));
        }
        sql
    }

    /// Render for execution with this builder's backend
    pub fn positional(&self) -> Result<PositionalQuery, DataError> {
        self.positional_with(self.backend.dialect())
    }

    /// Render with `dialect` placeholders; values are ordered to match them
    pub fn positional_with(&self, dialect: &dyn SqlDialect) -> Result<PositionalQuery, DataError> {
        let mut values = Vec::new();
        let mut unbound: Option<String> = None;
        let sql = self.render(dialect, &mut |name| match self.parameters.get(name) {
            Some(value) => {
                values.push(value.clone());
                dialect.placeholder(values.len())
            }
            None => {
                unbound.get_or_insert_with(|| name.to_string());
                "NULL".to_string()
            }
        });
        if let Some(name) = unbound {
            return Err(DataError::UnboundParameter(name));
        }
        Ok(PositionalQuery { sql, values })
    }
}

impl QueryBuilder for SelectBuilder {
    fn set_where(&mut self, expr: Option<Expr>) {
        self.where_expr = expr;
    }

    fn set_parameters(&mut self, parameters: Parameters) {
        self.parameters = parameters;
    }

    fn set_max_results(&mut self, limit: Option<u32>) {
        self.max_results = limit;
    }

    fn sql(&self) -> String {
        self.render(self.backend.dialect(), &mut |name| format!(":{}", name))
    }
}

impl fmt::Display for SelectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

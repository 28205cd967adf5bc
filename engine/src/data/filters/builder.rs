//! Composite filter builder
//!
//! Joins every filter of a query into one `AND` condition and merges their
//! bound parameters.

use crate::data::query::{Expr, ExpressionBuilder, Parameters};

use super::types::Filter;

/// AND together all filter expressions, in order.
///
/// Returns `None` when there are no filters so the query keeps no WHERE clause.
pub fn combine(expr: &ExpressionBuilder, filters: &[Filter]) -> Option<Expr> {
    if filters.is_empty() {
        return None;
    }
    let parts = filters.iter().map(|f| f.expression().clone()).collect();
    Some(expr.and_x(parts))
}

/// Union of every filter's parameters.
///
/// # Panics
///
/// If two filters bind the same placeholder. Filters produced by one parser
/// never collide; a collision means a manually added filter reused a name.
pub fn combine_parameters(filters: &[Filter]) -> Parameters {
    let mut parameters = Parameters::new();
    for filter in filters {
        for (name, value) in filter.parameters() {
            let previous = parameters.insert(name.clone(), value.clone());
            assert!(
                previous.is_none(),
                "placeholder :{} is bound by more than one filter",
                name
            );
        }
    }
    parameters
}

//! Query model
//!
//! - `expr` - Boolean expression tree and its factory
//! - `builder` - Backing query builder trait and the SQL `SelectBuilder`
//! - `select` - `SelectQuery`, the per-request coordinator

mod builder;
mod expr;
mod select;

pub use builder::{PositionalQuery, QueryBuilder, SelectBuilder};
pub use expr::{ComparisonOp, Expr, ExpressionBuilder, Parameters};
pub use select::SelectQuery;

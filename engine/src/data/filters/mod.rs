//! Query-string filter engine
//!
//! Raw `key=value` parameters are decoded into typed [`Filter`]s that carry
//! an expression fragment plus their own bound values. Filters are composed
//! with `AND` and handed to a query builder; values never reach SQL text.
//!
//! Value syntax (alternatives split on `,` or `||` are ORed):
//!
//! - `value`: equality
//! - `!value`: inequality
//! - `>v`, `>=v`, `<v`, `<=v`: comparisons, negatable with a leading `!`
//! - `lo-hi`, `><lo,hi`: inclusive range over numbers or `YYYY-MM-DD` dates
//! - `%` anywhere: `LIKE` pattern
//! - `[a,b]`, `![a,b]`: membership
//! - `!` alone: `IS NOT NULL`; `~`: `IS NULL`
//!
//! Keys may carry an operator suffix (`title_like`, `id_gte`, `status_neq`),
//! end in `%` for a forced `LIKE` (`title%=hello`), and may target several
//! fields at once (`title|||body`).

mod builder;
mod params;
mod parser;
mod tokenizer;
mod types;

pub use builder::{combine, combine_parameters};
pub use params::{RawParameters, RawValue};
pub use parser::ParameterParser;
pub use tokenizer::{OperandToken, Operator, tokenize, tokenize_with};
pub use types::{Filter, Placeholders};

//! Compile query-string filters into parameterized SQL.
//!
//! ```text
//! status=published,held  date><2020-01-01,2020-12-31  title_like=hello
//! ```
//!
//! [`data::query::SelectQuery`] turns such a parameter map into filters for
//! one content type and builds a [`data::query::SelectBuilder`] whose SQL only
//! references bound placeholders.

pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;

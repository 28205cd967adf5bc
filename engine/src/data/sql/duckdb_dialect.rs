//! DuckDB SQL dialect implementation

use super::SqlDialect;

/// DuckDB SQL dialect
pub struct DuckdbDialect;

impl SqlDialect for DuckdbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        assert_eq!(DuckdbDialect.placeholder(3), "?");
    }
}

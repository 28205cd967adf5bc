//! Path helpers for config and database locations

use std::path::PathBuf;

/// Expand `~` and make relative paths absolute against the working directory.
///
/// ```text
/// expand_path("~/.contentquery/contentquery.json") // -> /home/user/.contentquery/contentquery.json
/// expand_path("site.db")                           // -> /current/dir/site.db
/// expand_path("/var/lib/site.db")                  // -> /var/lib/site.db
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = match path {
        "" => PathBuf::from("."),
        "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => match (path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        },
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Resolve a `--database` argument: `sqlite:` URLs pass through, anything
/// else is treated as a file path.
pub fn resolve_database(database: &str) -> String {
    let database = database.trim();
    if database.starts_with("sqlite:") {
        database.to_string()
    } else {
        expand_path(database).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute() {
        assert_eq!(expand_path("/var/lib/site.db"), PathBuf::from("/var/lib/site.db"));
        assert_eq!(expand_path("  /var/lib/site.db  "), PathBuf::from("/var/lib/site.db"));
    }

    #[test]
    fn test_expand_path_relative() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("site.db"), cwd.join("site.db"));
        assert_eq!(expand_path("../config"), cwd.join("../config"));
        assert!(expand_path("").is_absolute());
    }

    #[test]
    fn test_expand_path_tilde() {
        let result = expand_path("~/.contentquery/contentquery.json");
        assert!(result.is_absolute());
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with(".contentquery/contentquery.json"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
        }
    }

    #[test]
    fn test_resolve_database() {
        assert_eq!(resolve_database("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(resolve_database("sqlite://site.db?mode=ro"), "sqlite://site.db?mode=ro");
        assert!(resolve_database("site.db").ends_with("site.db"));
        assert!(PathBuf::from(resolve_database("site.db")).is_absolute());
    }
}

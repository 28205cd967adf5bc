//! Parameter parsing
//!
//! Turns one raw `key=value` pair into at most one [`Filter`]. Every failure
//! (key not whitelisted, unknown field, oversized value, nothing decodable)
//! yields `None`; callers never see an error for bad input.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::constants::{MAX_VALUE_LENGTH, MULTI_FIELD_SEPARATOR};
use crate::data::query::ExpressionBuilder;
use crate::data::traits::FieldRegistry;

use super::params::RawValue;
use super::tokenizer::{Operator, tokenize, tokenize_with};
use super::types::{Filter, Placeholders};

/// Fields a key resolves to, plus any operator forced by its suffix
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedKey {
    fields: Vec<String>,
    operator: Option<(Operator, bool)>,
}

/// Builds filters from raw parameters for one content type at a time
pub struct ParameterParser {
    registry: Arc<dyn FieldRegistry>,
    expr: ExpressionBuilder,
    whitelist: BTreeSet<String>,
    placeholders: Placeholders,
}

impl ParameterParser {
    pub fn new(registry: Arc<dyn FieldRegistry>, expr: ExpressionBuilder) -> Self {
        Self {
            registry,
            expr,
            whitelist: BTreeSet::new(),
            placeholders: Placeholders::default(),
        }
    }

    /// Restrict accepted keys. An empty whitelist accepts every key.
    pub fn set_whitelist<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = keys.into_iter().map(Into::into).collect();
    }

    pub fn whitelist(&self) -> &BTreeSet<String> {
        &self.whitelist
    }

    /// Restart placeholder numbering for a new parameter set
    pub fn reset(&mut self) {
        self.placeholders.reset();
    }

    /// Build the filter for `key=value` against content type `alias`
    pub fn get_filter(&mut self, alias: &str, key: &str, value: &RawValue) -> Option<Filter> {
        let key = key.trim();

        let Some(resolved) = self.resolve_key(alias, key) else {
            tracing::trace!(content_type = alias, key, "Ignoring parameter: unknown field");
            return None;
        };

        if !self.is_permitted(key) {
            tracing::trace!(content_type = alias, key, "Ignoring parameter: not whitelisted");
            return None;
        }

        if value.max_len() > MAX_VALUE_LENGTH {
            tracing::trace!(
                content_type = alias,
                key,
                max = MAX_VALUE_LENGTH,
                "Ignoring parameter: value too long"
            );
            return None;
        }

        let Some(field_values) = split_field_values(value, resolved.fields.len()) else {
            tracing::trace!(
                content_type = alias,
                key,
                "Ignoring parameter: value count does not match field count"
            );
            return None;
        };

        let targets: Vec<_> = resolved
            .fields
            .iter()
            .zip(field_values)
            .map(|(field, values)| {
                let tokens = values
                    .iter()
                    .flat_map(|raw| match resolved.operator {
                        Some((operator, negated)) => tokenize_with(raw, operator, negated),
                        None => tokenize(raw),
                    })
                    .collect();
                (field.clone(), tokens)
            })
            .collect();

        let filter = Filter::from_tokens(alias, &targets, &mut self.placeholders, &self.expr);
        if filter.is_none() {
            tracing::trace!(content_type = alias, key, "Ignoring parameter: no operands");
        }
        filter
    }

    /// Keys are matched verbatim: `title_like` and `title%` need their own entry
    fn is_permitted(&self, key: &str) -> bool {
        self.whitelist.is_empty() || self.whitelist.contains(key)
    }

    fn resolve_key(&self, alias: &str, key: &str) -> Option<ResolvedKey> {
        if key.contains(MULTI_FIELD_SEPARATOR) {
            let fields: Vec<String> = key
                .split(MULTI_FIELD_SEPARATOR)
                .map(str::trim)
                .map(str::to_string)
                .collect();
            let all_known = fields
                .iter()
                .all(|field| self.registry.field_exists(alias, field));
            return all_known.then_some(ResolvedKey {
                fields,
                operator: None,
            });
        }

        if self.registry.field_exists(alias, key) {
            return Some(ResolvedKey {
                fields: vec![key.to_string()],
                operator: None,
            });
        }

        if let Some(field) = key.strip_suffix('%').map(str::trim_end) {
            return self
                .registry
                .field_exists(alias, field)
                .then(|| ResolvedKey {
                    fields: vec![field.to_string()],
                    operator: Some((Operator::Like, false)),
                });
        }

        let (field, suffix) = key.rsplit_once('_')?;
        let operator = Operator::from_suffix(suffix)?;
        self.registry
            .field_exists(alias, field)
            .then(|| ResolvedKey {
                fields: vec![field.to_string()],
                operator: Some(operator),
            })
    }
}

/// Pair values with fields. A single value (or a list) applies to every
/// field; `a|||b` style values must supply exactly one part per field, so a
/// single-field key never accepts one.
fn split_field_values(value: &RawValue, field_count: usize) -> Option<Vec<Vec<&str>>> {
    match value {
        RawValue::One(raw) if raw.contains(MULTI_FIELD_SEPARATOR) => {
            let parts: Vec<&str> = raw.split(MULTI_FIELD_SEPARATOR).map(str::trim).collect();
            (parts.len() == field_count).then(|| parts.into_iter().map(|p| vec![p]).collect())
        }
        _ => Some(vec![value.alternatives(); field_count]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticRegistry(HashMap<&'static str, Vec<&'static str>>);

    impl FieldRegistry for StaticRegistry {
        fn field_exists(&self, content_type: &str, field: &str) -> bool {
            self.0
                .get(content_type)
                .is_some_and(|fields| fields.contains(&field))
        }
    }

    fn parser() -> ParameterParser {
        let registry = StaticRegistry(HashMap::from([
            ("pages", vec!["id", "title", "body", "status", "date_published"]),
            ("entries", vec!["id", "status"]),
        ]));
        ParameterParser::new(Arc::new(registry), ExpressionBuilder)
    }

    fn sql(filter: &Filter) -> String {
        filter.expression().to_string()
    }

    #[test]
    fn plain_key_infers_operator_from_value() {
        let mut parser = parser();
        let filter = parser.get_filter("pages", "id", &">5".into()).unwrap();
        assert_eq!(sql(&filter), "pages.id > :id_0");
    }

    #[test]
    fn explicit_suffix_overrides_inference() {
        let mut parser = parser();
        let filter = parser.get_filter("pages", "title_like", &"hello".into()).unwrap();
        assert_eq!(sql(&filter), r"pages.title LIKE :title_0 ESCAPE '\'");
        assert_eq!(filter.parameters()["title_0"], "%hello%");

        let filter = parser.get_filter("pages", "status_neq", &"draft".into()).unwrap();
        assert_eq!(sql(&filter), "pages.status <> :status_0");

        let filter = parser.get_filter("pages", "id_eq", &">5".into()).unwrap();
        assert_eq!(sql(&filter), "pages.id = :id_0");
        assert_eq!(filter.parameters()["id_0"], ">5");
    }

    #[test]
    fn percent_key_forces_like() {
        let mut parser = parser();
        let filter = parser.get_filter("pages", "title%", &"hello".into()).unwrap();
        assert_eq!(sql(&filter), r"pages.title LIKE :title_0 ESCAPE '\'");
        assert_eq!(filter.parameters()["title_0"], "%hello%");

        let filter = parser.get_filter("pages", "date_published%", &"2020-%".into()).unwrap();
        assert_eq!(filter.parameters()["date_published_0"], "2020-%");

        assert!(parser.get_filter("pages", "secret%", &"x".into()).is_none());
    }

    #[test]
    fn percent_key_matches_like_suffix() {
        let mut percent = parser();
        let mut suffix = parser();
        let a = percent.get_filter("pages", "title%", &"hello".into()).unwrap();
        let b = suffix.get_filter("pages", "title_like", &"hello".into()).unwrap();
        assert_eq!(a.expression(), b.expression());
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn suffix_like_matches_inferred_like() {
        let mut explicit = parser();
        let mut inferred = parser();
        let a = explicit.get_filter("pages", "title_like", &"hello%".into()).unwrap();
        let b = inferred.get_filter("pages", "title", &"hello%".into()).unwrap();
        assert_eq!(a.expression(), b.expression());
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn field_names_with_underscores_are_not_split() {
        let mut parser = parser();
        let filter = parser.get_filter("pages", "date_published", &">2020-01-01".into());
        assert_eq!(sql(&filter.unwrap()), "pages.date_published > :date_published_0");

        let filter = parser.get_filter("pages", "date_published_gte", &"2020-01-01".into());
        assert_eq!(sql(&filter.unwrap()), "pages.date_published >= :date_published_1");
    }

    #[test]
    fn unknown_fields_and_suffixes_are_ignored() {
        let mut parser = parser();
        assert!(parser.get_filter("pages", "secret", &"x".into()).is_none());
        assert!(parser.get_filter("pages", "title_bogus", &"x".into()).is_none());
        assert!(parser.get_filter("entries", "title", &"x".into()).is_none());
    }

    #[test]
    fn whitelist_filters_keys() {
        let mut parser = parser();
        parser.set_whitelist(["status"]);

        assert!(parser.get_filter("pages", "status", &"x".into()).is_some());
        assert!(parser.get_filter("pages", "title", &"x".into()).is_none());
    }

    #[test]
    fn whitelist_matches_keys_not_fields() {
        let mut parser = parser();
        parser.set_whitelist(["status", "title_like"]);

        assert!(parser.get_filter("pages", "status_like", &"x".into()).is_none());
        assert!(parser.get_filter("pages", "status_in", &"a,b".into()).is_none());
        assert!(parser.get_filter("pages", "status%", &"x".into()).is_none());
        assert!(parser.get_filter("pages", "title_like", &"x".into()).is_some());
        assert!(parser.get_filter("pages", "title", &"x".into()).is_none());
    }

    #[test]
    fn oversized_values_are_ignored() {
        let mut parser = parser();
        let long = "x".repeat(MAX_VALUE_LENGTH + 1);
        assert!(parser.get_filter("pages", "title", &long.into()).is_none());
    }

    #[test]
    fn list_values_are_alternatives() {
        let mut parser = parser();
        let value = RawValue::from(vec!["published", "held"]);
        let filter = parser.get_filter("pages", "status", &value).unwrap();
        assert_eq!(
            sql(&filter),
            "pages.status = :status_0 OR pages.status = :status_1"
        );
    }

    #[test]
    fn multi_field_key_pairs_values() {
        let mut parser = parser();
        let filter = parser
            .get_filter("pages", "title ||| body", &"%rust% ||| %cargo%".into())
            .unwrap();
        assert_eq!(
            sql(&filter),
            r"pages.title LIKE :title_0 ESCAPE '\' OR pages.body LIKE :body_0 ESCAPE '\'"
        );
        assert_eq!(filter.parameters()["body_0"], "%cargo%");
    }

    #[test]
    fn multi_field_key_shares_single_value() {
        let mut parser = parser();
        let filter = parser.get_filter("pages", "title|||body", &"rust".into()).unwrap();
        assert_eq!(
            sql(&filter),
            "pages.title = :title_0 OR pages.body = :body_0"
        );
    }

    #[test]
    fn single_field_key_rejects_multi_field_value() {
        let mut parser = parser();
        assert!(parser.get_filter("pages", "title", &"a|||b".into()).is_none());
        assert!(parser.get_filter("pages", "title_like", &"a|||b".into()).is_none());
        assert!(parser.get_filter("pages", "title", &"a||b".into()).is_some());
    }

    #[test]
    fn multi_field_key_rejects_mismatched_values_and_unknown_fields() {
        let mut parser = parser();
        assert!(parser.get_filter("pages", "title|||body", &"a|||b|||c".into()).is_none());
        assert!(parser.get_filter("pages", "title|||secret", &"a".into()).is_none());
    }

    #[test]
    fn alias_is_per_call() {
        let mut parser = parser();
        let page = parser.get_filter("pages", "status", &"a".into()).unwrap();
        let entry = parser.get_filter("entries", "status", &"b".into()).unwrap();
        assert_eq!(page.alias(), "pages");
        assert_eq!(sql(&entry), "entries.status = :status_1");
    }

    #[test]
    fn reset_restarts_numbering() {
        let mut parser = parser();
        parser.get_filter("pages", "status", &"a".into());
        parser.reset();
        let filter = parser.get_filter("pages", "status", &"b".into()).unwrap();
        assert!(filter.has_parameter("status_0"));
    }
}

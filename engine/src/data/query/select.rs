//! Query coordinator
//!
//! [`SelectQuery`] owns the filter list for one request. It turns a raw
//! parameter map into filters, lets callers adjust or extend them, and
//! produces a configured copy of its backing [`QueryBuilder`] on `build()`.

use std::fmt;
use std::sync::Arc;

use crate::data::filters::{
    Filter, ParameterParser, RawParameters, combine, combine_parameters,
};
use crate::data::traits::FieldRegistry;

use super::builder::{QueryBuilder, SelectBuilder};
use super::expr::{Expr, Parameters};

/// Filtered select over one content type
pub struct SelectQuery<Q: QueryBuilder = SelectBuilder> {
    query_builder: Q,
    parser: ParameterParser,
    content_type: Option<String>,
    filters: Vec<Filter>,
    single_fetch_mode: bool,
}

impl<Q: QueryBuilder> SelectQuery<Q> {
    pub fn new(query_builder: Q, registry: Arc<dyn FieldRegistry>) -> Self {
        let expr = query_builder.expr();
        Self {
            query_builder,
            parser: ParameterParser::new(registry, expr),
            content_type: None,
            filters: Vec::new(),
            single_fetch_mode: false,
        }
    }

    /// Content type the parameters are resolved against; also the SQL alias
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Restrict which keys may produce filters. Call before `set_parameters`.
    pub fn set_parameter_whitelist<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parser.set_whitelist(keys);
    }

    /// Replace all filters with those built from `params`.
    ///
    /// Empty entries are dropped and entries that produce no filter are
    /// ignored. Calling this again with the same input yields the same
    /// filters and placeholder names.
    ///
    /// # Panics
    ///
    /// If no content type has been set.
    pub fn set_parameters(&mut self, params: &RawParameters) {
        let content_type = self.require_content_type().to_string();
        let params = params.without_empty();

        self.filters.clear();
        self.parser.reset();

        for (key, value) in params.iter() {
            if let Some(filter) = self.parser.get_filter(&content_type, key, value) {
                self.filters.push(filter);
            }
        }

        tracing::debug!(
            content_type = %content_type,
            parameters = params.len(),
            filters = self.filters.len(),
            "Parsed query parameters"
        );
    }

    /// AND of every filter's expression, `None` without filters
    pub fn where_expression(&self) -> Option<Expr> {
        combine(&self.query_builder.expr(), &self.filters)
    }

    /// Every bound placeholder value across all filters
    pub fn where_parameters(&self) -> Parameters {
        combine_parameters(&self.filters)
    }

    /// Bound values whose placeholder name starts with `field_`.
    ///
    /// Prefix matching also picks up longer field names sharing the prefix:
    /// `title` matches `title_sub_0` as well as `title_0`.
    pub fn where_parameters_for(&self, field: &str) -> Parameters {
        self.where_parameters()
            .into_iter()
            .filter(|(name, _)| is_field_placeholder(name, field))
            .collect()
    }

    /// Override a bound value on whichever filter owns placeholder `key`
    pub fn set_where_parameter(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        for filter in &mut self.filters {
            if filter.has_parameter(key) {
                filter.set_parameter(key, value.clone());
            }
        }
    }

    /// Append a filter built outside the parameter parser
    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Limit the built query to one row
    pub fn set_single_fetch_mode(&mut self, single: bool) {
        self.single_fetch_mode = single;
    }

    pub fn single_fetch_mode(&self) -> bool {
        self.single_fetch_mode
    }

    pub fn query_builder(&self) -> &Q {
        &self.query_builder
    }

    pub fn set_query_builder(&mut self, query_builder: Q) {
        self.query_builder = query_builder;
    }

    /// Configured copy of the backing builder. The coordinator is unchanged,
    /// so `build` may be called any number of times.
    ///
    /// # Panics
    ///
    /// If no content type has been set.
    pub fn build(&self) -> Q {
        let content_type = self.require_content_type();

        let mut query = self.query_builder.clone();
        query.set_where(self.where_expression());
        query.set_parameters(self.where_parameters());
        query.set_max_results(self.single_fetch_mode.then_some(1));

        tracing::debug!(
            content_type,
            filters = self.filters.len(),
            single = self.single_fetch_mode,
            "Built select query"
        );
        query
    }

    fn require_content_type(&self) -> &str {
        match self.content_type.as_deref() {
            Some(content_type) => content_type,
            None => panic!("SelectQuery used before set_content_type"),
        }
    }
}

impl<Q: QueryBuilder> fmt::Display for SelectQuery<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build().sql())
    }
}

fn is_field_placeholder(name: &str, field: &str) -> bool {
    name.strip_prefix(field).is_some_and(|rest| rest.starts_with('_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::RawValue;
    use crate::data::query::ComparisonOp;
    use crate::data::sql::Backend;
    use std::collections::HashMap;

    struct StaticRegistry(HashMap<&'static str, Vec<&'static str>>);

    impl FieldRegistry for StaticRegistry {
        fn field_exists(&self, content_type: &str, field: &str) -> bool {
            self.0
                .get(content_type)
                .is_some_and(|fields| fields.contains(&field))
        }
    }

    fn query() -> SelectQuery {
        let registry = StaticRegistry(HashMap::from([(
            "pages",
            vec!["id", "title", "title_sub", "status", "datepublish"],
        )]));
        let mut query = SelectQuery::new(
            SelectBuilder::new("site_pages", "pages", Backend::Sqlite),
            Arc::new(registry),
        );
        query.set_content_type("pages");
        query
    }

    fn params(pairs: &[(&str, &str)]) -> RawParameters {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn status_list_round_trip() {
        let mut query = query();
        query.set_parameters(&params(&[("status", "published,held")]));

        assert_eq!(query.filters().len(), 1);
        assert_eq!(
            query.build().sql(),
            "SELECT pages.* FROM site_pages pages \
             WHERE pages.status = :status_0 OR pages.status = :status_1"
        );
        assert_eq!(
            query.where_parameters(),
            Parameters::from([
                ("status_0".to_string(), "published".to_string()),
                ("status_1".to_string(), "held".to_string()),
            ])
        );
    }

    #[test]
    fn one_filter_per_usable_key() {
        let mut query = query();
        query.set_parameters(&params(&[
            ("status", "published"),
            ("secret", "x"),
            ("title", ""),
            ("id", ">5"),
        ]));
        assert_eq!(query.filters().len(), 2);
        assert_eq!(query.filters()[0].field_name(), "status");
        assert_eq!(query.filters()[1].field_name(), "id");
    }

    #[test]
    fn set_parameters_is_idempotent() {
        let input = params(&[("status", "published,held"), ("id", "1-5")]);
        let mut query = query();
        query.set_parameters(&input);
        let first_sql = query.build().sql();
        let first_params = query.where_parameters();

        query.set_parameters(&input);
        assert_eq!(query.build().sql(), first_sql);
        assert_eq!(query.where_parameters(), first_params);
        assert_eq!(query.filters().len(), 2);
    }

    #[test]
    fn placeholders_are_unique_for_repeated_fields() {
        let mut query = query();
        let input: RawParameters = [
            ("title", RawValue::from("a%")),
            ("title_like", RawValue::from("b")),
            ("title_neq", RawValue::from("c")),
        ]
        .into_iter()
        .collect();
        query.set_parameters(&input);

        let parameters = query.where_parameters();
        assert_eq!(parameters.len(), 3);
        assert_eq!(
            parameters.keys().collect::<Vec<_>>(),
            vec!["title_0", "title_1", "title_2"]
        );
    }

    #[test]
    fn empty_parameters_have_no_where_clause() {
        let mut query = query();
        query.set_parameters(&RawParameters::new());
        assert!(query.where_expression().is_none());
        assert_eq!(query.build().sql(), "SELECT pages.* FROM site_pages pages");
    }

    #[test]
    fn suffix_like_equals_inferred_like() {
        let mut explicit = query();
        explicit.set_parameters(&params(&[("title_like", "hello%")]));
        let mut inferred = query();
        inferred.set_parameters(&params(&[("title", "hello%")]));

        assert_eq!(explicit.build().sql(), inferred.build().sql());
        assert_eq!(explicit.where_parameters(), inferred.where_parameters());
    }

    #[test]
    fn operator_key_forms_compile() {
        let mut query = query();
        query.set_parameters(&RawParameters::from_pairs([
            "title%=hello",
            "datepublish>=2020-01-01",
            "id<5",
        ]));

        assert_eq!(query.filters().len(), 3);
        assert_eq!(
            query.build().sql(),
            r"SELECT pages.* FROM site_pages pages WHERE pages.title LIKE :title_0 ESCAPE '\' AND pages.datepublish >= :datepublish_0 AND pages.id < :id_0"
        );
        assert_eq!(query.where_parameters()["title_0"], "%hello%");
        assert_eq!(query.where_parameters()["datepublish_0"], "2020-01-01");
    }

    #[test]
    fn whitelist_ignores_unlisted_keys() {
        let mut query = query();
        query.set_parameter_whitelist(["status"]);
        query.set_parameters(&params(&[("status", "published"), ("title", "x")]));

        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.filters()[0].field_name(), "status");
    }

    #[test]
    fn set_where_parameter_rebinds_without_changing_sql() {
        let mut query = query();
        query.set_parameters(&params(&[("status", "draft")]));
        let sql = query.build().sql();

        query.set_where_parameter("status_0", "published");
        query.set_where_parameter("status_7", "ignored");

        assert_eq!(query.build().sql(), sql);
        assert_eq!(query.where_parameters()["status_0"], "published");
        assert_eq!(query.where_parameters().len(), 1);
    }

    #[test]
    fn where_parameters_for_matches_field_prefix() {
        let mut query = query();
        query.set_parameters(&params(&[("title", "a"), ("title_sub", "b"), ("id", "3")]));

        let title = query.where_parameters_for("title");
        assert_eq!(title.len(), 2);
        assert_eq!(title["title_0"], "a");
        assert_eq!(title["title_sub_0"], "b");

        let title_sub = query.where_parameters_for("title_sub");
        assert_eq!(title_sub.len(), 1);
        assert_eq!(title_sub["title_sub_0"], "b");
        assert!(query.where_parameters_for("titl").is_empty());
    }

    #[test]
    fn where_parameters_for_includes_manual_placeholders() {
        let mut query = query();
        query.set_parameters(&params(&[("datepublish", ">2020-01-01")]));
        let x = query.query_builder().expr();
        query.add_filter(Filter::new(
            "datepublish",
            "pages",
            x.comparison("pages.datepublish", ComparisonOp::Lte, "datepublish_custom"),
            Parameters::from([("datepublish_custom".to_string(), "2024-01-01".to_string())]),
        ));

        let bound = query.where_parameters_for("datepublish");
        assert_eq!(bound.len(), 2);
        assert_eq!(bound["datepublish_0"], "2020-01-01");
        assert_eq!(bound["datepublish_custom"], "2024-01-01");
    }

    #[test]
    fn single_fetch_mode_limits_to_one() {
        let mut query = query();
        query.set_single_fetch_mode(true);
        query.set_parameters(&params(&[("id", "3")]));

        let built = query.build();
        assert_eq!(built.max_results(), Some(1));
        assert_eq!(
            built.sql(),
            "SELECT pages.* FROM site_pages pages WHERE pages.id = :id_0 LIMIT 1"
        );
    }

    #[test]
    fn build_does_not_mutate_coordinator() {
        let mut query = query();
        query.set_parameters(&params(&[("id", "3")]));
        let a = query.build();
        let b = query.build();
        assert_eq!(a.sql(), b.sql());
        assert!(query.query_builder().where_expr().is_none());
    }

    #[test]
    fn manual_filters_are_anded() {
        let mut query = query();
        query.set_parameters(&params(&[("status", "published")]));
        let x = query.query_builder().expr();
        query.add_filter(Filter::new(
            "datepublish",
            "pages",
            x.comparison("pages.datepublish", ComparisonOp::Lte, "now_0"),
            Parameters::from([("now_0".to_string(), "2024-01-01".to_string())]),
        ));

        assert_eq!(
            query.to_string(),
            "SELECT pages.* FROM site_pages pages \
             WHERE pages.status = :status_0 AND pages.datepublish <= :now_0"
        );
    }

    #[test]
    fn every_usable_key_becomes_a_filter() {
        struct AnyField;
        impl FieldRegistry for AnyField {
            fn field_exists(&self, _content_type: &str, _field: &str) -> bool {
                true
            }
        }

        let mut query: SelectQuery = SelectQuery::new(
            SelectBuilder::new("site_pages", "pages", Backend::Sqlite),
            Arc::new(AnyField),
        );
        query.set_content_type("pages");
        let input: RawParameters = (0..60).map(|i| (format!("f{}", i), "x")).collect();
        query.set_parameters(&input);

        assert_eq!(query.filters().len(), 60);
        assert_eq!(query.filters().last().map(Filter::field_name), Some("f59"));
    }

    #[test]
    fn rejected_keys_do_not_crowd_out_later_filters() {
        let mut query = query();
        query.set_parameter_whitelist(["status"]);
        let mut input: RawParameters = (0..60).map(|i| (format!("junk{}", i), "x")).collect();
        input.insert("status", "draft");
        query.set_parameters(&input);

        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.filters()[0].field_name(), "status");
    }

    #[test]
    #[should_panic(expected = "before set_content_type")]
    fn build_without_content_type_panics() {
        let registry = StaticRegistry(HashMap::new());
        let query: SelectQuery = SelectQuery::new(
            SelectBuilder::new("site_pages", "pages", Backend::Sqlite),
            Arc::new(registry),
        );
        query.build();
    }

    #[test]
    #[should_panic(expected = "before set_content_type")]
    fn set_parameters_without_content_type_panics() {
        let registry = StaticRegistry(HashMap::new());
        let mut query: SelectQuery = SelectQuery::new(
            SelectBuilder::new("site_pages", "pages", Backend::Sqlite),
            Arc::new(registry),
        );
        query.set_parameters(&params(&[("id", "1")]));
    }
}

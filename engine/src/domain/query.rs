//! Query service
//!
//! Hands out `SelectQuery` coordinators configured for a registered content
//! type: base builder with table and alias, dialect and whitelist applied.

use std::sync::Arc;

use crate::data::error::DataError;
use crate::data::filters::RawParameters;
use crate::data::query::{SelectBuilder, SelectQuery};
use crate::data::sql::Backend;

use super::content_types::ContentTypeRegistry;

pub struct QueryService {
    registry: Arc<ContentTypeRegistry>,
    backend: Backend,
    whitelist: Vec<String>,
}

impl QueryService {
    /// `whitelist` applies to content types without their own whitelist
    pub fn new(
        registry: Arc<ContentTypeRegistry>,
        backend: Backend,
        whitelist: Vec<String>,
    ) -> Self {
        Self {
            registry,
            backend,
            whitelist,
        }
    }

    pub fn registry(&self) -> &ContentTypeRegistry {
        &self.registry
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Empty coordinator for `content_type`
    pub fn select(&self, content_type: &str) -> Result<SelectQuery, DataError> {
        let ct = self.registry.get(content_type)?;

        let builder = SelectBuilder::new(ct.table(), ct.name(), self.backend);
        let mut query = SelectQuery::new(builder, self.registry.clone());
        query.set_content_type(ct.name());

        let whitelist = if ct.whitelist().is_empty() {
            self.whitelist.as_slice()
        } else {
            ct.whitelist()
        };
        query.set_parameter_whitelist(whitelist.iter().cloned());

        Ok(query)
    }

    /// Coordinator for `content_type` with `params` already applied
    pub fn compile(
        &self,
        content_type: &str,
        params: &RawParameters,
        single: bool,
    ) -> Result<SelectQuery, DataError> {
        let mut query = self.select(content_type)?;
        query.set_single_fetch_mode(single);
        query.set_parameters(params);

        tracing::debug!(
            content_type,
            backend = %self.backend,
            filters = query.filters().len(),
            "Compiled query"
        );
        Ok(query)
    }
}

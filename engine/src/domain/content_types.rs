//! Content type registry
//!
//! Maps content type names to their table and queryable fields. Only
//! registered identifiers ever reach SQL text, so names are validated once
//! when the registry is built.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::core::constants::CORE_FIELDS;
use crate::data::error::DataError;
use crate::data::traits::FieldRegistry;
use crate::utils::sql::is_identifier;

/// Content type section of the config file
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentTypeConfig {
    /// Table name, defaults to the content type name
    pub table: Option<String>,
    /// Fields beyond the core columns
    #[serde(default)]
    pub fields: Vec<String>,
    /// Accepted keys for this type (empty: the global whitelist applies)
    #[serde(default)]
    pub whitelist: Vec<String>,
}

/// A registered content type
#[derive(Debug, Clone)]
pub struct ContentType {
    name: String,
    table: String,
    fields: BTreeSet<String>,
    whitelist: Vec<String>,
}

impl ContentType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }
}

/// All content types known to the application
#[derive(Debug, Clone, Default)]
pub struct ContentTypeRegistry {
    types: BTreeMap<String, ContentType>,
}

impl ContentTypeRegistry {
    /// Build from config, rejecting names that are not plain SQL identifiers
    pub fn from_config(config: &BTreeMap<String, ContentTypeConfig>) -> Result<Self, DataError> {
        let mut types = BTreeMap::new();
        for (name, section) in config {
            let table = section.table.clone().unwrap_or_else(|| name.clone());
            let fields: BTreeSet<String> = CORE_FIELDS
                .iter()
                .map(|f| f.to_string())
                .chain(section.fields.iter().cloned())
                .collect();

            for identifier in std::iter::once(name).chain(std::iter::once(&table)).chain(&fields) {
                if !is_identifier(identifier) {
                    return Err(DataError::Config(format!(
                        "content type '{}': '{}' is not a valid identifier",
                        name, identifier
                    )));
                }
            }

            tracing::debug!(
                content_type = %name,
                table = %table,
                fields = fields.len(),
                "Registered content type"
            );
            types.insert(
                name.clone(),
                ContentType {
                    name: name.clone(),
                    table,
                    fields,
                    whitelist: section.whitelist.clone(),
                },
            );
        }
        Ok(Self { types })
    }

    pub fn get(&self, name: &str) -> Result<&ContentType, DataError> {
        self.types
            .get(name)
            .ok_or_else(|| DataError::UnknownContentType(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FieldRegistry for ContentTypeRegistry {
    fn field_exists(&self, content_type: &str, field: &str) -> bool {
        self.types
            .get(content_type)
            .is_some_and(|ct| ct.has_field(field))
    }
}

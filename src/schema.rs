//! # Table Metadata
//!
//! The slice of a table the hydration engine needs: its alias within a
//! query, the column types used for casting, and the factory that turns a
//! typed row into a record.

use crate::entity::{EntityFactory, GenericEntityFactory};
use crate::query::SelectColumn;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub type_name: String,
}

/// Column names and type names of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    /// Add a column; a repeated name replaces the earlier type.
    pub fn column(mut self, name: &str, type_name: &str) -> Self {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.type_name = type_name.to_string(),
            None => self.columns.push(ColumnSchema {
                name: name.to_string(),
                type_name: type_name.to_string(),
            }),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn column_type(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.type_name.as_str())
    }
}

/// A table as seen by one query: alias, schema and entity factory.
#[derive(Debug, Clone)]
pub struct Table {
    alias: String,
    registry_alias: String,
    schema: TableSchema,
    entity: Arc<dyn EntityFactory>,
}

impl Table {
    /// Create a table whose records hydrate into a generic entity named
    /// after the alias.
    pub fn new(alias: &str, schema: TableSchema) -> Self {
        Self {
            alias: alias.to_string(),
            registry_alias: alias.to_string(),
            schema,
            entity: Arc::new(GenericEntityFactory::new(alias)),
        }
    }

    pub fn with_entity(mut self, factory: impl EntityFactory + 'static) -> Self {
        self.entity = Arc::new(factory);
        self
    }

    pub fn with_shared_entity(mut self, factory: Arc<dyn EntityFactory>) -> Self {
        self.entity = factory;
        self
    }

    /// Alias used to register the table, e.g. a plugin-qualified name.
    pub fn with_registry_alias(mut self, registry_alias: &str) -> Self {
        self.registry_alias = registry_alias.to_string();
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn registry_alias(&self) -> &str {
        &self.registry_alias
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn entity_factory(&self) -> &Arc<dyn EntityFactory> {
        &self.entity
    }

    /// Every schema column selected as `alias__column` from `alias.column`.
    pub fn aliased_columns(&self) -> Vec<SelectColumn> {
        self.schema
            .columns()
            .iter()
            .map(|c| SelectColumn::aliased(&self.alias, &c.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_redefinition_replaces_type() {
        let schema = TableSchema::new("articles")
            .column("id", "integer")
            .column("id", "biginteger");

        assert_eq!(schema.columns().len(), 1);
        assert_eq!(schema.column_type("id"), Some("biginteger"));
    }

    #[test]
    fn test_table_defaults() {
        let table = Table::new("Authors", TableSchema::new("authors").column("id", "integer"));
        assert_eq!(table.registry_alias(), "Authors");
        assert_eq!(table.entity_factory().class_name(), "Authors");
        assert_eq!(
            table.aliased_columns(),
            vec![SelectColumn::new("Authors__id", "Authors.id")]
        );
    }
}

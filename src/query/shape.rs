use crate::association::Association;
use crate::config::HydrationConfig;
use crate::schema::Table;
use std::sync::Arc;

/// One entry of the select clause: the flat column name the statement
/// reports, and the expression it was selected from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumn {
    pub name: String,
    pub expression: String,
}

impl SelectColumn {
    pub fn new(name: &str, expression: &str) -> Self {
        Self {
            name: name.to_string(),
            expression: expression.to_string(),
        }
    }

    /// `alias__column` selected from `alias.column`
    pub fn aliased(alias: &str, column: &str) -> Self {
        Self {
            name: format!("{alias}__{column}"),
            expression: format!("{alias}.{column}"),
        }
    }
}

/// One association of the eager-load plan.
#[derive(Debug, Clone)]
pub struct EagerLoad {
    alias: String,
    association: Arc<dyn Association>,
    can_be_joined: bool,
    matching: bool,
    nest_key: String,
}

impl EagerLoad {
    /// Association whose columns arrive in the same row through a join.
    pub fn joined(association: Arc<dyn Association>) -> Self {
        let alias = association.name().to_string();
        Self {
            nest_key: alias.clone(),
            alias,
            association,
            can_be_joined: true,
            matching: false,
        }
    }

    /// Association loaded by a separate query and spliced into each row
    /// under its nest key before grouping.
    pub fn separate(association: Arc<dyn Association>) -> Self {
        Self {
            can_be_joined: false,
            ..Self::joined(association)
        }
    }

    /// Filter-only association whose columns surface under `_matchingData`.
    pub fn matching(association: Arc<dyn Association>) -> Self {
        Self {
            matching: true,
            ..Self::joined(association)
        }
    }

    /// Override the alias; joined associations also nest under it.
    pub fn with_alias(mut self, alias: &str) -> Self {
        if self.can_be_joined {
            self.nest_key = alias.to_string();
        }
        self.alias = alias.to_string();
        self
    }

    /// Override the key separately fetched data is spliced under, e.g. the
    /// dotted alias path of a nested contain.
    pub fn with_nest_key(mut self, nest_key: &str) -> Self {
        self.nest_key = nest_key.to_string();
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn association(&self) -> &Arc<dyn Association> {
        &self.association
    }

    pub fn can_be_joined(&self) -> bool {
        self.can_be_joined
    }

    pub fn is_matching(&self) -> bool {
        self.matching
    }

    pub fn nest_key(&self) -> &str {
        &self.nest_key
    }
}

/// Static shape of an executed query.
#[derive(Debug, Clone)]
pub struct QueryShape {
    repository: Table,
    select: Vec<SelectColumn>,
    hydrate: bool,
    buffer_results: bool,
    eager_loads: Vec<EagerLoad>,
}

impl QueryShape {
    /// Create a shape rooted at the given table
    pub fn new(repository: Table) -> Self {
        Self {
            repository,
            select: Vec::new(),
            hydrate: true,
            buffer_results: true,
            eager_loads: Vec::new(),
        }
    }

    /// Select root columns under their plain names
    pub fn select(mut self, columns: &[&str]) -> Self {
        let alias = self.repository.alias().to_string();
        self.select.extend(
            columns
                .iter()
                .map(|c| SelectColumn::new(c, &format!("{alias}.{c}"))),
        );
        self
    }

    /// Select a raw entry of the select clause
    pub fn select_expression(mut self, name: &str, expression: &str) -> Self {
        self.select.push(SelectColumn::new(name, expression));
        self
    }

    /// Select the given columns of an alias as `alias__column`
    pub fn select_aliased(mut self, alias: &str, columns: &[&str]) -> Self {
        self.select.extend(
            columns
                .iter()
                .map(|c| SelectColumn::aliased(alias, c)),
        );
        self
    }

    /// Select every schema column of a table as `alias__column`
    pub fn select_table(mut self, table: &Table) -> Self {
        self.select.extend(table.aliased_columns());
        self
    }

    /// Add an association to the eager-load plan
    pub fn contain(mut self, eager_load: EagerLoad) -> Self {
        self.eager_loads.push(eager_load);
        self
    }

    pub fn hydrate(mut self, hydrate: bool) -> Self {
        self.hydrate = hydrate;
        self
    }

    pub fn buffer_results(mut self, buffer_results: bool) -> Self {
        self.buffer_results = buffer_results;
        self
    }

    /// Apply the configured hydration and buffering defaults
    pub fn with_config(self, config: &HydrationConfig) -> Self {
        self.hydrate(config.hydrate)
            .buffer_results(config.buffer_results)
    }

    pub fn repository(&self) -> &Table {
        &self.repository
    }

    pub fn default_alias(&self) -> &str {
        self.repository.alias()
    }

    /// The select clause; an empty selection means every column of the
    /// root table, auto-aliased.
    pub fn select_clause(&self) -> Vec<SelectColumn> {
        if !self.select.is_empty() {
            return self.select.clone();
        }

        self.repository.aliased_columns()
    }

    pub fn hydrates(&self) -> bool {
        self.hydrate
    }

    pub fn buffers_results(&self) -> bool {
        self.buffer_results
    }

    pub fn eager_loads(&self) -> &[EagerLoad] {
        &self.eager_loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::AssociationDef;
    use crate::schema::TableSchema;

    fn articles() -> Table {
        Table::new(
            "Articles",
            TableSchema::new("articles")
                .column("id", "integer")
                .column("title", "string"),
        )
    }

    fn authors() -> Table {
        Table::new("Authors", TableSchema::new("authors").column("id", "integer"))
    }

    #[test]
    fn test_basic_shape_building() {
        let shape = QueryShape::new(articles())
            .select(&["id", "title"])
            .select_table(&authors())
            .buffer_results(false);

        let names: Vec<String> = shape.select_clause().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["id", "title", "Authors__id"]);
        assert_eq!(
            QueryShape::new(articles()).select_table(&authors()).select_clause(),
            QueryShape::new(articles())
                .select_aliased("Authors", &["id"])
                .select_clause()
        );
        assert!(!shape.buffers_results());
        assert!(shape.hydrates());
    }

    #[test]
    fn test_empty_selection_defaults_to_root_columns() {
        let shape = QueryShape::new(articles());
        let clause = shape.select_clause();
        assert_eq!(clause[0], SelectColumn::new("Articles__id", "Articles.id"));
        assert_eq!(clause.len(), 2);
    }

    #[test]
    fn test_eager_load_constructors() {
        let assoc: Arc<dyn Association> =
            Arc::new(AssociationDef::has_many("Comments", "Articles", authors()));

        let separate = EagerLoad::separate(assoc.clone()).with_nest_key("Articles.Comments");
        assert!(!separate.can_be_joined());
        assert_eq!(separate.alias(), "Comments");
        assert_eq!(separate.nest_key(), "Articles.Comments");

        let matching = EagerLoad::matching(assoc).with_alias("Filtered");
        assert!(matching.is_matching());
        assert_eq!(matching.nest_key(), "Filtered");
    }
}

//! Immutable hydration plan built once per result set.

use super::association_map::{contain_map, matching_map, AssociationDescriptor, LoadStrategy};
use super::column_map::{build_column_maps, ColumnMap};
use crate::entity::EntityFactory;
use crate::error::Result;
use crate::query::QueryShape;
use crate::types::{CastMap, TypeRegistry};
use crate::value::Fields;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Everything the row grouper needs, resolved up front: column buckets,
/// association order, cast maps and entity factories.
#[derive(Debug, Clone)]
pub struct HydrationPlan {
    default_alias: String,
    registry_alias: String,
    root_entity: Arc<dyn EntityFactory>,
    hydrate: bool,
    columns: ColumnMap,
    matching_columns: ColumnMap,
    matching: Vec<AssociationDescriptor>,
    contain: Vec<AssociationDescriptor>,
    casts: HashMap<String, CastMap>,
}

impl HydrationPlan {
    pub fn build(shape: &QueryShape, registry: &TypeRegistry) -> Result<Self> {
        let repository = shape.repository();
        let default_alias = repository.alias().to_string();

        let matching = matching_map(shape.eager_loads());
        let contain = contain_map(shape.eager_loads());
        let (columns, matching_columns) = build_column_maps(
            &shape.select_clause(),
            &default_alias,
            matching.iter().map(|d| d.alias.as_str()),
        );

        let mut casts = HashMap::new();
        casts.insert(default_alias.clone(), registry.cast_map(repository.schema())?);
        for descriptor in matching
            .iter()
            .chain(contain.iter().filter(|d| d.strategy == LoadStrategy::Joined))
        {
            if casts.contains_key(&descriptor.target_alias) {
                continue;
            }
            let cast_map = registry.cast_map(descriptor.association.target().schema())?;
            casts.insert(descriptor.target_alias.clone(), cast_map);
        }

        debug!(
            default_alias = %default_alias,
            aliases = columns.len(),
            columns = columns.column_count() + matching_columns.column_count(),
            matching = matching.len(),
            contain = contain.len(),
            hydrate = shape.hydrates(),
            "Hydration plan built"
        );

        Ok(Self {
            registry_alias: repository.registry_alias().to_string(),
            root_entity: repository.entity_factory().clone(),
            hydrate: shape.hydrates(),
            default_alias,
            columns,
            matching_columns,
            matching,
            contain,
            casts,
        })
    }

    pub fn default_alias(&self) -> &str {
        &self.default_alias
    }

    pub fn registry_alias(&self) -> &str {
        &self.registry_alias
    }

    pub fn root_entity(&self) -> &Arc<dyn EntityFactory> {
        &self.root_entity
    }

    pub fn hydrates(&self) -> bool {
        self.hydrate
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn matching_columns(&self) -> &ColumnMap {
        &self.matching_columns
    }

    pub fn matching(&self) -> &[AssociationDescriptor] {
        &self.matching
    }

    /// Non-matching associations in processing order.
    pub fn contain(&self) -> &[AssociationDescriptor] {
        &self.contain
    }

    /// Convert the values of a sub-row belonging to `alias`. Aliases with
    /// no cast map pass through unchanged.
    pub fn cast(&self, alias: &str, values: Fields) -> Result<Fields> {
        match self.casts.get(alias) {
            Some(cast_map) => cast_map.cast(values),
            None => Ok(values),
        }
    }
}

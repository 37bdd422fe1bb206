//! Matching and Contain maps derived from the eager-load plan.
//!
//! Both maps are computed once per result set. The contain map stores the
//! reversed declaration order explicitly: deeper associations are declared
//! after the ones they hang off, so walking the reversed list nests children
//! into their parents before the parents themselves are relocated.

use crate::association::Association;
use crate::entity::EntityFactory;
use crate::query::EagerLoad;
use std::sync::Arc;

/// How an association's data reaches the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Columns arrive in the same flat row.
    Joined,
    /// Data is fetched separately and spliced in under the nest key.
    Separate,
    /// Joined, but only used to filter; surfaces under `_matchingData`.
    Matching,
}

impl LoadStrategy {
    pub fn of(eager_load: &EagerLoad) -> Self {
        match (eager_load.is_matching(), eager_load.can_be_joined()) {
            (true, _) => LoadStrategy::Matching,
            (false, true) => LoadStrategy::Joined,
            (false, false) => LoadStrategy::Separate,
        }
    }

    pub fn is_joined(self) -> bool {
        !matches!(self, LoadStrategy::Separate)
    }
}

/// A resolved eager-load entry.
#[derive(Debug, Clone)]
pub struct AssociationDescriptor {
    pub alias: String,
    pub nest_key: String,
    pub strategy: LoadStrategy,
    pub association: Arc<dyn Association>,
    pub entity: Arc<dyn EntityFactory>,
    /// Alias of the target table; cast maps are keyed by it.
    pub target_alias: String,
}

impl AssociationDescriptor {
    pub fn from_eager_load(eager_load: &EagerLoad) -> Self {
        let association = eager_load.association().clone();
        let target = association.target();
        let strategy = LoadStrategy::of(eager_load);
        // joined data always lives in its alias bucket
        let nest_key = if strategy.is_joined() {
            eager_load.alias()
        } else {
            eager_load.nest_key()
        };

        Self {
            alias: eager_load.alias().to_string(),
            nest_key: nest_key.to_string(),
            strategy,
            entity: target.entity_factory().clone(),
            target_alias: target.alias().to_string(),
            association,
        }
    }

    pub fn can_be_joined(&self) -> bool {
        self.strategy.is_joined()
    }
}

/// Matching associations in declaration order, one per alias.
pub fn matching_map(eager_loads: &[EagerLoad]) -> Vec<AssociationDescriptor> {
    let mut map: Vec<AssociationDescriptor> = Vec::new();
    for descriptor in eager_loads
        .iter()
        .filter(|e| e.is_matching())
        .map(AssociationDescriptor::from_eager_load)
    {
        upsert(&mut map, descriptor, |d| d.alias.as_str());
    }
    map
}

/// Non-matching associations in reverse declaration order, one per nest key.
pub fn contain_map(eager_loads: &[EagerLoad]) -> Vec<AssociationDescriptor> {
    let mut map: Vec<AssociationDescriptor> = Vec::new();
    for descriptor in eager_loads
        .iter()
        .rev()
        .filter(|e| !e.is_matching())
        .map(AssociationDescriptor::from_eager_load)
    {
        upsert(&mut map, descriptor, |d| d.nest_key.as_str());
    }
    map
}

/// Replace an entry with the same key in place, or append.
fn upsert(
    map: &mut Vec<AssociationDescriptor>,
    descriptor: AssociationDescriptor,
    key: impl Fn(&AssociationDescriptor) -> &str,
) {
    match map.iter().position(|d| key(d) == key(&descriptor)) {
        Some(index) => map[index] = descriptor,
        None => map.push(descriptor),
    }
}

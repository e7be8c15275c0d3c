//! Per-arena group projections
//!
//! Turns the catalog plus a group assignment into chart-ready records for one
//! arena, with a mean per group. Projection is a pure function of its inputs;
//! [`ProjectionCache`] memoizes it by arena and membership snapshot.

use crate::arena::{self, ARENAS};
use crate::catalog::Catalog;
use crate::classifier::{GroupAssignment, GroupKey, MembershipSnapshot};
use crate::resolver::value_for;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// One bar: a card, its group and its wins in the projected arena
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRecord {
    pub card_name: String,
    pub group: GroupKey,
    pub value: f64,
}

/// Ordering of projection records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Tallest first; ties keep membership order
    #[default]
    ValueDescending,
    /// Canonical membership order
    Membership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProjectionOptions {
    pub sort: SortOrder,
}

/// Mean wins per group; `None` when a group has no qualifying member
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GroupMeans {
    pub toxic_troop: Option<f64>,
    pub cheap_spell: Option<f64>,
}

impl GroupMeans {
    pub fn get(&self, group: GroupKey) -> Option<f64> {
        match group {
            GroupKey::ToxicTroop => self.toxic_troop,
            GroupKey::CheapSpell => self.cheap_spell,
        }
    }

    fn set(&mut self, group: GroupKey, mean: Option<f64>) {
        match group {
            GroupKey::ToxicTroop => self.toxic_troop = mean,
            GroupKey::CheapSpell => self.cheap_spell = mean,
        }
    }
}

/// Chart data for one arena
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// Arena display name, or the raw reference when it names no known arena
    pub arena: String,
    pub records: Vec<ProjectionRecord>,
    pub means: GroupMeans,
}

impl Projection {
    pub fn mean(&self, group: GroupKey) -> Option<f64> {
        self.means.get(group)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Largest value, used to scale bars.
    pub fn max_value(&self) -> Option<f64> {
        self.records.iter().map(|r| r.value).reduce(f64::max)
    }
}

/// Label used for an arena reference in projection output.
pub fn arena_label(arena_ref: &str) -> String {
    arena::resolve_arena(arena_ref)
        .map(|a| a.display_name.to_string())
        .unwrap_or_else(|| arena_ref.to_string())
}

/// Project the assigned cards onto one arena.
///
/// Members absent from the catalog are skipped, as are cards with no wins
/// (value <= 0) in this arena.
pub fn project(
    catalog: &Catalog,
    groups: &GroupAssignment,
    arena_ref: &str,
    options: ProjectionOptions,
) -> Projection {
    let mut records: Vec<ProjectionRecord> = groups
        .canonical_order()
        .filter_map(|(group, member)| {
            let card = catalog.get_by_key(&member.key)?;
            let value = value_for(Some(card), arena_ref);
            if value <= 0.0 {
                return None;
            }
            Some(ProjectionRecord {
                card_name: card.name.clone(),
                group,
                value,
            })
        })
        .collect();

    if options.sort == SortOrder::ValueDescending {
        // stable: equal values keep membership order
        records.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    let means = group_means(&records);
    Projection {
        arena: arena_label(arena_ref),
        records,
        means,
    }
}

/// Arithmetic mean of each group's values in `records`.
pub fn group_means(records: &[ProjectionRecord]) -> GroupMeans {
    let mut means = GroupMeans::default();
    for group in GroupKey::ALL {
        let (sum, count) = records
            .iter()
            .filter(|r| r.group == group)
            .fold((0.0, 0usize), |(sum, n), r| (sum + r.value, n + 1));
        let mean = if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        };
        means.set(group, mean);
    }
    means
}

/// One projection per arena, in canonical arena order.
pub fn project_all_arenas(catalog: &Catalog, groups: &GroupAssignment) -> Vec<Projection> {
    ARENAS
        .iter()
        .map(|a| project(catalog, groups, a.column_key, ProjectionOptions::default()))
        .collect()
}

// ============================================================================
// Memoization
// ============================================================================

const MAX_CACHED_PROJECTIONS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    column: String,
    options: ProjectionOptions,
    membership: MembershipSnapshot,
}

/// Memoized projections over one catalog
pub struct ProjectionCache {
    catalog: Arc<Catalog>,
    entries: HashMap<CacheKey, Arc<Projection>>,
    hits: usize,
    misses: usize,
}

impl ProjectionCache {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        ProjectionCache {
            catalog,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Cached projection for this arena and membership, computing it on a miss.
    pub fn get(
        &mut self,
        groups: &GroupAssignment,
        arena_ref: &str,
        options: ProjectionOptions,
    ) -> Arc<Projection> {
        let key = CacheKey {
            column: arena::column_for(arena_ref)
                .unwrap_or(arena_ref)
                .to_string(),
            options,
            membership: groups.snapshot(),
        };

        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(hit);
        }

        self.misses += 1;
        if self.entries.len() >= MAX_CACHED_PROJECTIONS {
            log::debug!("Projection cache full, clearing {} entries", self.entries.len());
            self.entries.clear();
        }
        let projection = Arc::new(project(&self.catalog, groups, arena_ref, options));
        self.entries.insert(key, Arc::clone(&projection));
        projection
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Explorer session
//!
//! Owns the mutable state of one exploration: the group assignment, the
//! selected arena and the search filters. Every [`Action`] mutates that state
//! and then recomputes the whole view explicitly; nothing recomputes behind
//! the caller's back.

use crate::arena;
use crate::catalog::Catalog;
use crate::classifier::{GroupAssignment, GroupKey};
use crate::config::ExplorerConfig;
use crate::loader::{CatalogLoader, LoadError};
use crate::projection::{Projection, ProjectionCache, ProjectionOptions};
use crate::resolver::value_for;
use crate::search::{search, SearchQuery};
use serde::Serialize;
use std::sync::Arc;

/// A user action against the session
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectArena(String),
    SetText(Option<String>),
    SetCost(Option<u32>),
    SetRarity(Option<String>),
    SetCardType(Option<String>),
    Assign { name: String, group: GroupKey },
    Unassign { name: String, group: GroupKey },
    ResetToDefault,
    ClearAll,
}

/// One search result row, annotated with its current group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub card_type: String,
    pub rarity: String,
    pub cost: Option<u32>,
    /// Wins in the selected arena
    pub value: f64,
    pub group: Option<GroupKey>,
}

/// Members of one group, alphabetically
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinListing {
    pub group: GroupKey,
    pub members: Vec<String>,
}

/// Everything a front end needs to draw the explorer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerView {
    pub projection: Arc<Projection>,
    /// Ranked matches, cut to the configured limit
    pub results: Vec<SearchHit>,
    /// Matches before the limit was applied
    pub total_matches: usize,
    pub bins: Vec<BinListing>,
}

pub struct ExplorerSession {
    cache: ProjectionCache,
    groups: GroupAssignment,
    arena: String,
    filters: SearchQuery,
    result_limit: usize,
    view: ExplorerView,
}

impl ExplorerSession {
    /// Start a session over a loaded catalog, with the default groups.
    pub fn new(catalog: Arc<Catalog>, config: &ExplorerConfig) -> Self {
        let groups = GroupAssignment::seeded_from(&catalog);
        let arena = if arena::resolve_arena(&config.default_arena).is_some() {
            config.default_arena.clone()
        } else {
            arena::default_arena().display_name.to_string()
        };

        let mut cache = ProjectionCache::new(catalog);
        let projection = cache.get(&groups, &arena, ProjectionOptions::default());
        let mut session = ExplorerSession {
            cache,
            groups,
            arena,
            filters: SearchQuery::default(),
            result_limit: config.result_limit,
            view: ExplorerView {
                projection,
                results: Vec::new(),
                total_matches: 0,
                bins: Vec::new(),
            },
        };
        session.recompute();
        session
    }

    /// Wait for the catalog, then start a session. Load failures pass through.
    pub async fn open(loader: &CatalogLoader, config: &ExplorerConfig) -> Result<Self, LoadError> {
        let catalog = loader.load().await?;
        Ok(Self::new(catalog, config))
    }

    /// Apply one action, then recompute the view.
    pub fn apply(&mut self, action: Action) -> &ExplorerView {
        match action {
            Action::SelectArena(arena_ref) => {
                if arena::resolve_arena(&arena_ref).is_some() {
                    self.arena = arena_ref;
                } else {
                    log::warn!("Unknown arena '{}', keeping {}", arena_ref, self.arena);
                }
            }
            Action::SetText(text) => self.filters.text = text,
            Action::SetCost(cost) => self.filters.cost = cost,
            Action::SetRarity(rarity) => self.filters.rarity = rarity,
            Action::SetCardType(card_type) => self.filters.card_type = card_type,
            Action::Assign { name, group } => {
                // bins show the card list's spelling, not what was typed
                let name = match self.cache.catalog().get(&name) {
                    Some(card) => card.name.clone(),
                    None => name,
                };
                self.groups.assign(&name, group);
            }
            Action::Unassign { name, group } => {
                self.groups.unassign(&name, group);
            }
            Action::ResetToDefault => {
                let catalog = Arc::clone(self.cache.catalog());
                self.groups.reset_to_default(&catalog);
            }
            Action::ClearAll => self.groups.clear_all(),
        }
        self.recompute();
        &self.view
    }

    /// Rebuild projection, search results and bin listings from current state.
    pub fn recompute(&mut self) {
        let projection = self
            .cache
            .get(&self.groups, &self.arena, ProjectionOptions::default());

        let mut query = self.filters.clone();
        query.arena = Some(self.arena.clone());
        let catalog = Arc::clone(self.cache.catalog());
        let matches = search(&catalog, &query);
        let total_matches = matches.len();
        let results = matches
            .into_iter()
            .take(self.result_limit)
            .map(|card| SearchHit {
                name: card.name.clone(),
                card_type: card.card_type.clone(),
                rarity: card.rarity.clone(),
                cost: card.cost,
                value: value_for(Some(card), &self.arena),
                group: self.groups.group_of(&card.name),
            })
            .collect();

        let bins = GroupKey::ALL
            .into_iter()
            .map(|group| {
                let mut members: Vec<String> = self
                    .groups
                    .members(group)
                    .iter()
                    .map(|m| m.name.clone())
                    .collect();
                members.sort();
                BinListing { group, members }
            })
            .collect();

        self.view = ExplorerView {
            projection,
            results,
            total_matches,
            bins,
        };
    }

    pub fn view(&self) -> &ExplorerView {
        &self.view
    }

    pub fn groups(&self) -> &GroupAssignment {
        &self.groups
    }

    pub fn arena(&self) -> &str {
        &self.arena
    }

    pub fn filters(&self) -> &SearchQuery {
        &self.filters
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        self.cache.catalog()
    }

    pub fn cache(&self) -> &ProjectionCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardRecord;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::from_records(vec![
            CardRecord::new("Zap")
                .with_type("spell")
                .with_cost(2)
                .with_rarity("Common")
                .with_count("count_0", 50.0)
                .with_count("count_4", 20.0),
            CardRecord::new("Skeleton Army")
                .with_type("troop")
                .with_cost(3)
                .with_rarity("Epic")
                .with_count("count_4", 40.0),
            CardRecord::new("Hog Rider")
                .with_type("troop")
                .with_cost(4)
                .with_rarity("Rare")
                .with_count("count_0", 7.0)
                .with_count("count_4", 60.0),
        ]))
    }

    #[test]
    fn test_starts_on_default_arena_with_default_bins() {
        let session = ExplorerSession::new(catalog(), &ExplorerConfig::default());
        assert_eq!(session.arena(), "Legendary Arena");

        let view = session.view();
        assert_eq!(view.projection.arena, "Legendary Arena");
        let names: Vec<_> = view.projection.records.iter().map(|r| r.card_name.as_str()).collect();
        assert_eq!(names, vec!["Skeleton Army", "Zap"]);
        assert_eq!(view.bins[0].members, vec!["Skeleton Army"]);
        assert_eq!(view.bins[1].members, vec!["Zap"]);

        let results: Vec<_> = view.results.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(results, vec!["Hog Rider", "Skeleton Army", "Zap"]);
        assert_eq!(view.results[0].group, None);
    }

    #[test]
    fn test_assign_recomputes() {
        let mut session = ExplorerSession::new(catalog(), &ExplorerConfig::default());
        let view = session.apply(Action::Assign {
            name: "hog rider".to_string(),
            group: GroupKey::CheapSpell,
        });
        assert_eq!(view.projection.records[0].card_name, "Hog Rider");
        assert_eq!(view.projection.mean(GroupKey::CheapSpell), Some(40.0));
        assert_eq!(view.results[0].group, Some(GroupKey::CheapSpell));

        let view = session.apply(Action::Assign {
            name: "Hog Rider".to_string(),
            group: GroupKey::ToxicTroop,
        });
        assert_eq!(view.projection.mean(GroupKey::ToxicTroop), Some(50.0));
        assert_eq!(view.projection.mean(GroupKey::CheapSpell), Some(20.0));
    }

    #[test]
    fn test_clear_and_reset() {
        let mut session = ExplorerSession::new(catalog(), &ExplorerConfig::default());
        let view = session.apply(Action::ClearAll);
        assert!(view.projection.is_empty());
        assert_eq!(view.projection.mean(GroupKey::ToxicTroop), None);
        assert!(view.bins.iter().all(|b| b.members.is_empty()));

        let view = session.apply(Action::ResetToDefault);
        assert_eq!(view.projection.records.len(), 2);
    }

    #[test]
    fn test_filters_and_arena() {
        let mut session = ExplorerSession::new(catalog(), &ExplorerConfig::default());
        session.apply(Action::SelectArena("count_0".to_string()));
        let view = session.apply(Action::SetCardType(Some("troop".to_string())));
        let results: Vec<_> = view.results.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(results, vec!["Hog Rider"]);
        assert_eq!(view.results[0].value, 7.0);
        assert_eq!(view.projection.arena, "Spooky Town");

        session.apply(Action::SelectArena("Goblin Stadium".to_string()));
        assert_eq!(session.arena(), "count_0");
        session.apply(Action::SelectArena("count_9".to_string()));
        assert_eq!(session.arena(), "count_0");
        assert_eq!(session.view().projection.arena, "Spooky Town");
    }

    #[test]
    fn test_unknown_configured_arena_falls_back() {
        let config = ExplorerConfig {
            default_arena: "count_9".to_string(),
            ..ExplorerConfig::default()
        };
        let session = ExplorerSession::new(catalog(), &config);
        assert_eq!(session.arena(), "Legendary Arena");
    }

    #[test]
    fn test_bins_use_catalog_spelling() {
        let mut session = ExplorerSession::new(catalog(), &ExplorerConfig::default());
        let view = session.apply(Action::Assign {
            name: "  hog RIDER ".to_string(),
            group: GroupKey::ToxicTroop,
        });
        assert_eq!(view.bins[0].members, vec!["Hog Rider", "Skeleton Army"]);
        assert_eq!(view.projection.records[0].card_name, "Hog Rider");

        // names outside the card list keep the typed spelling
        let view = session.apply(Action::Assign {
            name: "Goblin Barrel".to_string(),
            group: GroupKey::CheapSpell,
        });
        assert_eq!(view.bins[1].members, vec!["Goblin Barrel", "Zap"]);
    }

    #[test]
    fn test_result_limit() {
        let config = ExplorerConfig {
            result_limit: 1,
            ..ExplorerConfig::default()
        };
        let session = ExplorerSession::new(catalog(), &config);
        assert_eq!(session.view().results.len(), 1);
        assert_eq!(session.view().total_matches, 3);
    }

    #[test]
    fn test_unchanged_state_hits_cache() {
        let mut session = ExplorerSession::new(catalog(), &ExplorerConfig::default());
        let misses = session.cache().misses();
        session.apply(Action::SetText(Some("zap".to_string())));
        assert_eq!(session.cache().misses(), misses);
        assert!(session.cache().hits() > 0);
    }

    #[test]
    fn test_open_reports_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CatalogLoader::new(crate::loader::CatalogSource::File(
            dir.path().join("missing.csv"),
        ));
        let result = futures::executor::block_on(ExplorerSession::open(
            &loader,
            &ExplorerConfig::default(),
        ));
        assert!(result.is_err());
    }
}

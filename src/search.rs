//! Catalog search and filtering
//!
//! All supplied filters are ANDed. With an arena filter, results are ranked by
//! wins in that arena; otherwise catalog order is kept.

use crate::catalog::{CardRecord, Catalog};
use crate::resolver::value_for;
use serde::Serialize;

/// Compound filter over the catalog. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Substring of name, type or rarity (case-insensitive)
    pub text: Option<String>,
    /// Exact elixir cost; cards with an unknown cost count as 0
    pub cost: Option<u32>,
    /// Rarity (case-insensitive equality)
    pub rarity: Option<String>,
    /// Card type (case-insensitive equality)
    pub card_type: Option<String>,
    /// Arena reference; only cards with wins there are kept
    pub arena: Option<String>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn rarity(mut self, rarity: &str) -> Self {
        self.rarity = Some(rarity.to_string());
        self
    }

    pub fn card_type(mut self, card_type: &str) -> Self {
        self.card_type = Some(card_type.to_string());
        self
    }

    pub fn arena(mut self, arena_ref: &str) -> Self {
        self.arena = Some(arena_ref.to_string());
        self
    }

    /// Lowercased search term, if one was given and is not blank.
    fn term(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
    }

    fn matches(&self, card: &CardRecord, term: Option<&str>) -> bool {
        if let Some(term) = term {
            let hit = [&card.name, &card.card_type, &card.rarity]
                .iter()
                .any(|field| field.to_lowercase().contains(term));
            if !hit {
                return false;
            }
        }
        if let Some(cost) = self.cost {
            if card.cost_or_zero() != cost {
                return false;
            }
        }
        if let Some(rarity) = &self.rarity {
            if !card.rarity.eq_ignore_ascii_case(rarity.trim()) {
                return false;
            }
        }
        if let Some(card_type) = &self.card_type {
            if !card.card_type.eq_ignore_ascii_case(card_type.trim()) {
                return false;
            }
        }
        if let Some(arena_ref) = &self.arena {
            if value_for(Some(card), arena_ref) <= 0.0 {
                return false;
            }
        }
        true
    }
}

/// Cards matching `query`, ranked by arena wins when an arena is given.
pub fn search<'a>(catalog: &'a Catalog, query: &SearchQuery) -> Vec<&'a CardRecord> {
    let term = query.term();
    let mut results: Vec<&CardRecord> = catalog
        .iter()
        .filter(|card| query.matches(card, term.as_deref()))
        .collect();

    if let Some(arena_ref) = &query.arena {
        results.sort_by(|a, b| {
            value_for(Some(*b), arena_ref).total_cmp(&value_for(Some(*a), arena_ref))
        });
    }

    results
}

/// Distinct filter values present in the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// Ascending, known costs only
    pub costs: Vec<u32>,
    /// Sorted
    pub rarities: Vec<String>,
    /// Sorted
    pub card_types: Vec<String>,
}

pub fn facets(catalog: &Catalog) -> Facets {
    let mut costs: Vec<u32> = catalog.iter().filter_map(|c| c.cost).collect();
    costs.sort_unstable();
    costs.dedup();

    Facets {
        costs,
        rarities: distinct_sorted(catalog.iter().map(|c| c.rarity.as_str())),
        card_types: distinct_sorted(catalog.iter().map(|c| c.card_type.as_str())),
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut values: Vec<String> = values
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    values.sort();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            CardRecord::new("Zap")
                .with_type("spell")
                .with_cost(2)
                .with_rarity("Common")
                .with_count("count_0", 50.0)
                .with_count("count_4", 5.0),
            CardRecord::new("Mega Knight")
                .with_type("troop")
                .with_cost(7)
                .with_rarity("Legendary")
                .with_count("count_4", 80.0),
            CardRecord::new("Tesla")
                .with_type("building")
                .with_cost(4)
                .with_rarity("Common")
                .with_count("count_0", 12.0)
                .with_count("count_4", 5.0),
            CardRecord::new("Giant Snowball")
                .with_type("spell")
                .with_cost(2)
                .with_rarity("Common"),
        ])
    }

    fn names(results: &[&CardRecord]) -> Vec<String> {
        results.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_text_matches_name_case_insensitively() {
        let catalog = catalog();
        let results = search(&catalog, &SearchQuery::new().text("zap"));
        assert_eq!(names(&results), vec!["Zap"]);
        let results = search(&catalog, &SearchQuery::new().text("  MEGA "));
        assert_eq!(names(&results), vec!["Mega Knight"]);
    }

    #[test]
    fn test_text_matches_type_and_rarity() {
        let catalog = catalog();
        let results = search(&catalog, &SearchQuery::new().text("spell"));
        assert_eq!(names(&results), vec!["Zap", "Giant Snowball"]);
        let results = search(&catalog, &SearchQuery::new().text("legend"));
        assert_eq!(names(&results), vec!["Mega Knight"]);
    }

    #[test]
    fn test_empty_query_keeps_catalog_order() {
        let catalog = catalog();
        let results = search(&catalog, &SearchQuery::new().text("   "));
        assert_eq!(
            names(&results),
            vec!["Zap", "Mega Knight", "Tesla", "Giant Snowball"]
        );
    }

    #[test]
    fn test_filters_are_anded() {
        let catalog = catalog();
        let query = SearchQuery::new().cost(2).rarity("common").card_type("Spell");
        assert_eq!(names(&search(&catalog, &query)), vec!["Zap", "Giant Snowball"]);

        let query = SearchQuery::new().cost(2).card_type("building");
        assert!(search(&catalog, &query).is_empty());
    }

    #[test]
    fn test_arena_filters_and_ranks() {
        let catalog = catalog();
        let results = search(&catalog, &SearchQuery::new().arena("Legendary Arena"));
        assert_eq!(names(&results), vec!["Mega Knight", "Zap", "Tesla"]);

        let results = search(&catalog, &SearchQuery::new().arena("count_0").text("common"));
        assert_eq!(names(&results), vec!["Zap", "Tesla"]);

        assert!(search(&catalog, &SearchQuery::new().arena("Nowhere")).is_empty());
    }

    #[test]
    fn test_facets() {
        let facets = facets(&catalog());
        assert_eq!(facets.costs, vec![2, 4, 7]);
        assert_eq!(facets.rarities, vec!["Common", "Legendary"]);
        assert_eq!(facets.card_types, vec!["building", "spell", "troop"]);
    }

    #[test]
    fn test_blank_elixir_is_not_a_facet() {
        let csv = "\
card_name,card_type,elixir,rarity,count_0
Zap,spell,2,Common,5
Mirror,spell,,Epic,3
Odd,troop,2.5,Rare,1
";
        let catalog = crate::loader::parse_catalog(csv.as_bytes(), "test").unwrap();
        assert_eq!(facets(&catalog).costs, vec![2]);

        // unknown costs still filter as 0
        let zero = search(&catalog, &SearchQuery::new().cost(0));
        assert_eq!(names(&zero), vec!["Mirror", "Odd"]);
        let two = search(&catalog, &SearchQuery::new().cost(2));
        assert_eq!(names(&two), vec!["Zap"]);
    }
}

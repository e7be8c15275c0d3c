//! Card records and the in-memory catalog
//!
//! A `Catalog` is built once from the card list and never mutated afterwards.
//! Name lookups are case-insensitive through [`NameKey`].

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Canonical lookup key for a card name: trimmed and lowercased.
///
/// Every name-keyed structure normalizes through this type, so callers never
/// case-fold by hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    pub fn new(name: &str) -> Self {
        NameKey(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for NameKey {
    fn from(name: &str) -> Self {
        NameKey::new(name)
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored per-arena value.
///
/// The loader always stores `Count`; `Raw` keeps an uncoerced cell for records
/// assembled elsewhere, and is coerced when read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArenaValue {
    Count(f64),
    Raw(String),
}

/// One row of the card list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRecord {
    /// Card name as written in the source
    pub name: String,
    /// troop / spell / building
    pub card_type: String,
    /// Elixir cost; `None` when the cell was blank or unreadable
    pub cost: Option<u32>,
    /// Common / Rare / Epic / Legendary
    pub rarity: String,
    /// Column key (e.g., "count_0") -> win count
    pub arena_values: BTreeMap<String, ArenaValue>,
    /// Total wins across all arenas
    pub overall_count: u64,
}

impl CardRecord {
    pub fn new(name: &str) -> Self {
        CardRecord {
            name: name.to_string(),
            card_type: String::new(),
            cost: None,
            rarity: String::new(),
            arena_values: BTreeMap::new(),
            overall_count: 0,
        }
    }

    pub fn with_type(mut self, card_type: &str) -> Self {
        self.card_type = card_type.to_string();
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_rarity(mut self, rarity: &str) -> Self {
        self.rarity = rarity.to_string();
        self
    }

    pub fn with_count(mut self, column_key: &str, wins: f64) -> Self {
        self.arena_values
            .insert(column_key.to_string(), ArenaValue::Count(wins));
        self
    }

    pub fn with_raw_value(mut self, column_key: &str, raw: &str) -> Self {
        self.arena_values
            .insert(column_key.to_string(), ArenaValue::Raw(raw.to_string()));
        self
    }

    pub fn with_overall_count(mut self, overall: u64) -> Self {
        self.overall_count = overall;
        self
    }

    /// Cost used for filtering: an unknown cost counts as 0.
    pub fn cost_or_zero(&self) -> u32 {
        self.cost.unwrap_or(0)
    }

    pub fn key(&self) -> NameKey {
        NameKey::new(&self.name)
    }
}

/// The full set of card records, in source order, with a case-insensitive index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    cards: Vec<CardRecord>,
    by_name: HashMap<NameKey, usize>,
}

impl Catalog {
    /// Build a catalog, dropping blank names and later duplicates of a name.
    pub fn from_records(records: Vec<CardRecord>) -> Self {
        let mut cards = Vec::with_capacity(records.len());
        let mut by_name = HashMap::with_capacity(records.len());

        for record in records {
            let key = record.key();
            if key.is_empty() {
                log::warn!("Skipping card row with a blank name");
                continue;
            }
            if by_name.contains_key(&key) {
                log::warn!("Duplicate card '{}' ignored (first row wins)", record.name);
                continue;
            }
            by_name.insert(key, cards.len());
            cards.push(record);
        }

        Catalog { cards, by_name }
    }

    /// Case-insensitive lookup by card name.
    pub fn get(&self, name: &str) -> Option<&CardRecord> {
        self.get_by_key(&NameKey::new(name))
    }

    pub fn get_by_key(&self, key: &NameKey) -> Option<&CardRecord> {
        self.by_name.get(key).map(|&i| &self.cards[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&NameKey::new(name))
    }

    pub fn records(&self) -> &[CardRecord] {
        &self.cards
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardRecord> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CardRecord;
    type IntoIter = std::slice::Iter<'a, CardRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

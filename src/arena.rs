//! Arena metadata
//!
//! The five arenas tracked by the dataset, bound 1:1 to the `count_N` columns
//! of the card list. Callers may refer to an arena by either its column key
//! or its display name.

use regex::Regex;
use serde::Serialize;

/// Static metadata for one arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArenaDescriptor {
    /// Ordinal position, defines canonical arena ordering
    pub index: usize,
    /// Raw win-count column in the card list (e.g., "count_0")
    pub column_key: &'static str,
    /// Human label (e.g., "Spooky Town")
    pub display_name: &'static str,
}

/// All arenas in canonical order.
pub const ARENAS: [ArenaDescriptor; 5] = [
    ArenaDescriptor {
        index: 0,
        column_key: "count_0",
        display_name: "Spooky Town",
    },
    ArenaDescriptor {
        index: 1,
        column_key: "count_1",
        display_name: "Rascal's Hideout",
    },
    ArenaDescriptor {
        index: 2,
        column_key: "count_2",
        display_name: "Serenity Peak",
    },
    ArenaDescriptor {
        index: 3,
        column_key: "count_3",
        display_name: "Miner's Mine",
    },
    ArenaDescriptor {
        index: 4,
        column_key: "count_4",
        display_name: "Legendary Arena",
    },
];

lazy_static::lazy_static! {
    static ref COLUMN_KEY_PATTERN: Regex = Regex::new(r"^count_").unwrap();
}

/// Whether `arena_ref` follows the column-key naming pattern (`count_...`).
pub fn is_column_key(arena_ref: &str) -> bool {
    COLUMN_KEY_PATTERN.is_match(arena_ref)
}

/// Look up an arena by its display name (exact match).
pub fn by_display_name(name: &str) -> Option<&'static ArenaDescriptor> {
    ARENAS.iter().find(|a| a.display_name == name)
}

/// Look up an arena by its column key (exact match).
pub fn by_column_key(key: &str) -> Option<&'static ArenaDescriptor> {
    ARENAS.iter().find(|a| a.column_key == key)
}

/// The arena the explorer opens on when nothing else is configured.
pub fn default_arena() -> &'static ArenaDescriptor {
    &ARENAS[ARENAS.len() - 1]
}

/// Map an arena reference (column key or display name) to the column to read.
///
/// A reference matching the column-key pattern is used verbatim, even when it
/// names a column outside the static table; the record then simply has no
/// value for it. Anything else must be a known display name.
pub fn column_for(arena_ref: &str) -> Option<&str> {
    if arena_ref.is_empty() {
        return None;
    }
    if is_column_key(arena_ref) {
        return Some(arena_ref);
    }
    by_display_name(arena_ref).map(|a| a.column_key)
}

/// Resolve an arena reference to its static descriptor, if it names one.
pub fn resolve_arena(arena_ref: &str) -> Option<&'static ArenaDescriptor> {
    if is_column_key(arena_ref) {
        by_column_key(arena_ref)
    } else {
        by_display_name(arena_ref)
    }
}

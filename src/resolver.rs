//! Arena value resolution
//!
//! Reads a card's win count for an arena referenced by column key or display
//! name. Lookup misses and bad cells resolve to 0; this never fails.

use crate::arena;
use crate::catalog::{ArenaValue, CardRecord};

pub use crate::arena::resolve_arena;

/// Win count of `record` in the arena named by `arena_ref`.
///
/// Returns 0 for a missing record, an unknown arena, a missing cell, or a cell
/// that does not coerce to a finite number.
pub fn value_for(record: Option<&CardRecord>, arena_ref: &str) -> f64 {
    let record = match record {
        Some(r) => r,
        None => return 0.0,
    };
    let column = match arena::column_for(arena_ref) {
        Some(c) => c,
        None => return 0.0,
    };

    match record.arena_values.get(column) {
        Some(value) => coerce(value),
        None => 0.0,
    }
}

/// Coerce a stored value to a finite number, or 0.
pub fn coerce(value: &ArenaValue) -> f64 {
    match value {
        ArenaValue::Count(n) if n.is_finite() => *n,
        ArenaValue::Count(_) => 0.0,
        ArenaValue::Raw(text) => parse_number(text).unwrap_or(0.0),
    }
}

/// Lenient numeric parse of a text cell: trimmed, finite values only.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ARENAS;

    fn sample() -> CardRecord {
        CardRecord::new("Valkyrie")
            .with_count("count_0", 12.0)
            .with_count("count_1", 0.0)
            .with_raw_value("count_2", "37")
            .with_raw_value("count_3", "NaN")
            .with_raw_value("count_4", "")
    }

    #[test]
    fn test_key_and_display_name_agree() {
        let record = sample();
        for arena in ARENAS.iter() {
            assert_eq!(
                value_for(Some(&record), arena.column_key),
                value_for(Some(&record), arena.display_name),
            );
        }
        assert_eq!(value_for(Some(&record), "Spooky Town"), 12.0);
    }

    #[test]
    fn test_raw_text_is_parsed() {
        assert_eq!(value_for(Some(&sample()), "count_2"), 37.0);
        assert_eq!(value_for(Some(&sample()), "Serenity Peak"), 37.0);
    }

    #[test]
    fn test_zero_cases() {
        let record = sample();
        assert_eq!(value_for(None, "count_0"), 0.0);
        assert_eq!(value_for(Some(&record), "Goblin Stadium"), 0.0);
        assert_eq!(value_for(Some(&record), ""), 0.0);
        assert_eq!(value_for(Some(&record), "count_3"), 0.0);
        assert_eq!(value_for(Some(&record), "count_4"), 0.0);
        assert_eq!(value_for(Some(&record), "count_7"), 0.0);
    }

    #[test]
    fn test_non_finite_counts_are_zero() {
        let record = CardRecord::new("Zap")
            .with_count("count_0", f64::NAN)
            .with_count("count_1", f64::INFINITY)
            .with_raw_value("count_2", "inf");
        assert_eq!(value_for(Some(&record), "count_0"), 0.0);
        assert_eq!(value_for(Some(&record), "count_1"), 0.0);
        assert_eq!(value_for(Some(&record), "count_2"), 0.0);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("3.5"), Some(3.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }
}

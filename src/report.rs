//! Text and JSON rendering of projections, search results and explorer views.
//!
//! These functions return formatted strings; the caller decides where they go.

use crate::catalog::CardRecord;
use crate::classifier::GroupKey;
use crate::explorer::ExplorerView;
use crate::projection::Projection;
use crate::resolver::value_for;
use crate::search::Facets;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;

/// Width of the longest bar, in characters.
const BAR_WIDTH: usize = 40;

pub const NO_MATCHES: &str = "No cards match these filters in this arena.";
pub const EMPTY_CHART: &str =
    "No cards in your bins have wins in this arena. Try adding cards or switching arenas.";

/// Pretty JSON for any serializable output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
}

fn bar_len(value: f64, max: f64) -> usize {
    if max <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize
}

fn group_marker(group: GroupKey) -> char {
    match group {
        GroupKey::ToxicTroop => '#',
        GroupKey::CheapSpell => '=',
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// "type · rarity · N elixir", leaving out whatever is unknown.
fn card_meta(card_type: &str, rarity: &str, cost: Option<u32>) -> String {
    let mut meta = Vec::new();
    if !card_type.is_empty() {
        meta.push(card_type.to_string());
    }
    if !rarity.is_empty() {
        meta.push(rarity.to_string());
    }
    if let Some(cost) = cost {
        meta.push(format!("{} elixir", cost));
    }
    meta.join(" · ")
}

/// Horizontal bar chart with one mean line per group.
pub fn format_projection(projection: &Projection) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", projection.arena)?;
    writeln!(out, "{}", "-".repeat(projection.arena.chars().count()))?;

    if projection.is_empty() {
        writeln!(out, "{}", EMPTY_CHART)?;
        return Ok(out);
    }

    let max = projection.max_value().unwrap_or(0.0);
    let name_width = projection
        .records
        .iter()
        .map(|r| r.card_name.chars().count())
        .max()
        .unwrap_or(0);

    for record in &projection.records {
        let bar: String = std::iter::repeat(group_marker(record.group))
            .take(bar_len(record.value, max))
            .collect();
        writeln!(
            out,
            "{:<width$}  {:<bar_width$}  {}",
            record.card_name,
            bar,
            format_number(record.value),
            width = name_width,
            bar_width = BAR_WIDTH
        )?;
    }

    writeln!(out)?;
    for group in GroupKey::ALL {
        // no mean line for a group without bars
        if let Some(mean) = projection.mean(group) {
            writeln!(
                out,
                "{} {} mean: {}",
                group_marker(group),
                group.label(),
                format_number(mean)
            )?;
        }
    }

    Ok(out)
}

/// Every arena's chart, one after another.
pub fn format_story(projections: &[Projection]) -> Result<String> {
    let charts = projections
        .iter()
        .map(format_projection)
        .collect::<Result<Vec<_>>>()?;
    Ok(charts.join("\n"))
}

/// Search results as a table; wins column only when an arena is given.
pub fn format_cards(cards: &[&CardRecord], arena_ref: Option<&str>) -> Result<String> {
    let mut out = String::new();
    if cards.is_empty() {
        writeln!(out, "{}", NO_MATCHES)?;
        return Ok(out);
    }

    for card in cards {
        let meta = card_meta(&card.card_type, &card.rarity, card.cost);
        write!(out, "{:<24} {}", card.name, meta)?;
        if let Some(arena_ref) = arena_ref {
            write!(out, "  ({} wins)", format_number(value_for(Some(*card), arena_ref)))?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

pub fn format_facets(facets: &Facets) -> Result<String> {
    let costs: Vec<String> = facets.costs.iter().map(|c| c.to_string()).collect();
    let mut out = String::new();
    writeln!(out, "Elixir:   {}", costs.join(", "))?;
    writeln!(out, "Rarities: {}", facets.rarities.join(", "))?;
    writeln!(out, "Types:    {}", facets.card_types.join(", "))?;
    Ok(out)
}

/// The whole explorer screen: chart, bins, then search results.
pub fn format_view(view: &ExplorerView) -> Result<String> {
    let mut out = format_projection(&view.projection)?;

    writeln!(out)?;
    for bin in &view.bins {
        let members = if bin.members.is_empty() {
            "No cards yet. Add from the search results.".to_string()
        } else {
            bin.members.join(", ")
        };
        writeln!(out, "\"{}\" bin: {}", bin.group.label(), members)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Search results ({} of {}):",
        view.results.len(),
        view.total_matches
    )?;
    if view.results.is_empty() {
        writeln!(out, "{}", NO_MATCHES)?;
    }
    for hit in &view.results {
        let status = match hit.group {
            Some(group) => format!("[in {} bin]", group.label().to_lowercase()),
            None => String::new(),
        };
        writeln!(
            out,
            "{:<24} {}  {} wins {}",
            hit.name,
            card_meta(&hit.card_type, &hit.rarity, hit.cost),
            format_number(hit.value),
            status
        )?;
    }

    Ok(out)
}

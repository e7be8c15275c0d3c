//! Card Explorer - per-arena win charts and card search in the terminal
//!
//! Loads the card list once, then prints the story charts for the default
//! groups, a single arena chart with custom groups, search results, or runs an
//! interactive explorer session on stdin.

use anyhow::{Context, Result};
use card_arena_explorer::classifier::{classify, GroupAssignment, GroupKey};
use card_arena_explorer::config::ExplorerConfig;
use card_arena_explorer::explorer::{Action, ExplorerSession};
use card_arena_explorer::loader::{CatalogLoader, CatalogSource};
use card_arena_explorer::projection::{project, project_all_arenas, ProjectionOptions, SortOrder};
use card_arena_explorer::search::{facets, search, SearchQuery};
use card_arena_explorer::{report, Catalog};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "card-explorer")]
#[command(about = "Compare per-arena wins of two card groups and search the card list")]
struct Cli {
    /// Card list CSV (path or http(s) URL)
    #[arg(long, global = true, env = "CARD_EXPLORER_DATA")]
    data: Option<String>,

    /// Settings file with key=value lines (data, default_arena, result_limit)
    #[arg(long, global = true, env = "CARD_EXPLORER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chart every arena for the default groups
    Story {
        /// Print JSON instead of text charts
        #[arg(long)]
        json: bool,
    },

    /// Chart one arena, optionally moving cards between groups first
    Chart {
        /// Arena display name or column key (default: configured arena)
        #[arg(short, long)]
        arena: Option<String>,

        /// Cards to put in the "toxic troop" group
        #[arg(long, value_delimiter = ',')]
        toxic: Vec<String>,

        /// Cards to put in the "cheap spell" group
        #[arg(long, value_delimiter = ',')]
        cheap: Vec<String>,

        /// Start from empty groups instead of the defaults
        #[arg(long)]
        empty: bool,

        /// Keep group order instead of tallest-first
        #[arg(long)]
        membership_order: bool,

        /// Print JSON instead of a text chart
        #[arg(long)]
        json: bool,
    },

    /// Search the card list
    Search {
        /// Substring of name, type or rarity
        #[arg(short, long)]
        text: Option<String>,

        /// Exact elixir cost
        #[arg(long)]
        cost: Option<u32>,

        /// Rarity (Common, Rare, Epic, Legendary)
        #[arg(long)]
        rarity: Option<String>,

        /// Card type (troop, spell, building)
        #[arg(long = "type")]
        card_type: Option<String>,

        /// Only cards with wins in this arena, ranked by those wins
        #[arg(short, long)]
        arena: Option<String>,

        /// Maximum rows to print (default: configured result limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the default group of each card name
    Classify {
        /// Card names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List the distinct elixir costs, rarities and types
    Facets {
        #[arg(long)]
        json: bool,
    },

    /// Interactive explorer reading one command per line from stdin
    Explore,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ExplorerConfig::from_file(path)?,
        None => ExplorerConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.data_source = data.clone();
    }

    match cli.command {
        Commands::Classify { names } => {
            for name in &names {
                let group = classify(name).map_or("unclassified", |g| g.key());
                println!("{}: {}", name, group);
            }
        }
        Commands::Story { json } => {
            let catalog = load_catalog(&config)?;
            let story = project_all_arenas(&catalog, &GroupAssignment::default_membership());
            if json {
                println!("{}", report::to_json(&story)?);
            } else {
                print!("{}", report::format_story(&story)?);
            }
        }
        Commands::Chart {
            arena,
            toxic,
            cheap,
            empty,
            membership_order,
            json,
        } => {
            let catalog = load_catalog(&config)?;
            let arena = arena.unwrap_or_else(|| config.default_arena.clone());
            let groups = build_groups(&catalog, empty, &toxic, &cheap);
            let options = ProjectionOptions {
                sort: if membership_order {
                    SortOrder::Membership
                } else {
                    SortOrder::ValueDescending
                },
            };
            let projection = project(&catalog, &groups, &arena, options);
            if json {
                println!("{}", report::to_json(&projection)?);
            } else {
                print!("{}", report::format_projection(&projection)?);
            }
        }
        Commands::Search {
            text,
            cost,
            rarity,
            card_type,
            arena,
            limit,
            json,
        } => {
            let catalog = load_catalog(&config)?;
            let query = SearchQuery {
                text,
                cost,
                rarity,
                card_type,
                arena,
            };
            let limit = limit.unwrap_or(config.result_limit);
            let results: Vec<_> = search(&catalog, &query).into_iter().take(limit).collect();
            if json {
                println!("{}", report::to_json(&results)?);
            } else {
                print!("{}", report::format_cards(&results, query.arena.as_deref())?);
            }
        }
        Commands::Facets { json } => {
            let catalog = load_catalog(&config)?;
            let facets = facets(&catalog);
            if json {
                println!("{}", report::to_json(&facets)?);
            } else {
                print!("{}", report::format_facets(&facets)?);
            }
        }
        Commands::Explore => run_explorer(load_catalog(&config)?, &config)?,
    }

    Ok(())
}

/// Load the card list named by the config, failing with the load error.
fn load_catalog(config: &ExplorerConfig) -> Result<Arc<Catalog>> {
    let loader = CatalogLoader::new(CatalogSource::parse(&config.data_source));
    loader
        .load_blocking()
        .with_context(|| format!("Failed to load card list from {}", loader.source()))
}

/// Default groups (or empty ones), then explicit moves in argument order.
fn build_groups(catalog: &Catalog, empty: bool, toxic: &[String], cheap: &[String]) -> GroupAssignment {
    let mut groups = if empty {
        GroupAssignment::new()
    } else {
        GroupAssignment::seeded_from(catalog)
    };
    for name in toxic {
        groups.assign(name, GroupKey::ToxicTroop);
    }
    for name in cheap {
        groups.assign(name, GroupKey::CheapSpell);
    }
    for name in toxic.iter().chain(cheap) {
        if !catalog.contains(name) {
            log::warn!("'{}' is not in the card list and will not be charted", name);
        }
    }
    groups
}

// ============================================================================
// Interactive explorer
// ============================================================================

const EXPLORER_HELP: &str = "\
Commands:
  arena <name|count_N>        switch arena
  search [text]               set (or clear) the search text
  cost <n|any>                filter by elixir cost
  rarity <name|any>           filter by rarity
  type <name|any>             filter by card type
  add <toxic|cheap> <card>    put a card in a group
  remove <toxic|cheap> <card> take a card out of a group
  reset                       restore the default groups
  clear                       empty both groups
  show                        redraw the current view
  help                        show this help
  quit                        leave the explorer";

#[derive(Debug, PartialEq)]
enum Command {
    Act(Action),
    Show,
    Help,
    Quit,
}

/// `None` clears a filter ("any" or nothing given).
fn optional_arg(rest: &str) -> Option<String> {
    let rest = rest.trim();
    if rest.is_empty() || rest.eq_ignore_ascii_case("any") {
        None
    } else {
        Some(rest.to_string())
    }
}

fn parse_group_and_name(rest: &str) -> Result<(GroupKey, String), String> {
    let (group, name) = rest
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| "expected a group and a card name".to_string())?;
    let group: GroupKey = group.parse()?;
    let name = name.trim();
    if name.is_empty() {
        return Err("expected a card name".to_string());
    }
    Ok((group, name.to_string()))
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let command = match word.to_lowercase().as_str() {
        "arena" => match optional_arg(rest) {
            Some(arena) => Command::Act(Action::SelectArena(arena)),
            None => return Err("expected an arena name or column key".to_string()),
        },
        "search" => Command::Act(Action::SetText(optional_arg(rest))),
        "cost" => {
            let cost = match optional_arg(rest) {
                Some(value) => Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("invalid elixir cost '{}'", value))?,
                ),
                None => None,
            };
            Command::Act(Action::SetCost(cost))
        }
        "rarity" => Command::Act(Action::SetRarity(optional_arg(rest))),
        "type" => Command::Act(Action::SetCardType(optional_arg(rest))),
        "add" => {
            let (group, name) = parse_group_and_name(rest)?;
            Command::Act(Action::Assign { name, group })
        }
        "remove" => {
            let (group, name) = parse_group_and_name(rest)?;
            Command::Act(Action::Unassign { name, group })
        }
        "reset" => Command::Act(Action::ResetToDefault),
        "clear" => Command::Act(Action::ClearAll),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };
    Ok(Some(command))
}

fn run_explorer(catalog: Arc<Catalog>, config: &ExplorerConfig) -> Result<()> {
    let mut session = ExplorerSession::new(catalog, config);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!("{}", EXPLORER_HELP);
    println!();
    print!("{}", report::format_view(session.view())?);

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read command")? == 0 {
            break;
        }

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(Command::Act(action))) => {
                let view = session.apply(action);
                print!("{}", report::format_view(view)?);
            }
            Ok(Some(Command::Show)) => print!("{}", report::format_view(session.view())?),
            Ok(Some(Command::Help)) => println!("{}", EXPLORER_HELP),
            Ok(Some(Command::Quit)) => break,
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

//! Card Arena Explorer
//!
//! Per-arena win counts for a card-game dataset, compared across two card
//! groups ("toxic troop" and "cheap spell").
//!
//! This library provides:
//! - `loader`: Load-once, shared fetch and lenient parse of the card list
//! - `classifier`: Default grouping and the mutable `GroupAssignment`
//! - `resolver`: Per-arena win lookup by column key or display name
//! - `projection`: Chart-ready per-arena records with group means
//! - `search`: Compound filters and facets over the catalog
//! - `explorer`: Session state with explicit recompute after every action
//!
//! Binaries:
//! - `card-explorer`: Story charts, search and an interactive explorer in the terminal

pub mod arena;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod explorer;
pub mod loader;
pub mod projection;
pub mod report;
pub mod resolver;
pub mod search;

pub use arena::{ArenaDescriptor, ARENAS};
pub use catalog::{ArenaValue, CardRecord, Catalog, NameKey};
pub use classifier::{classify, GroupAssignment, GroupKey};
pub use config::ExplorerConfig;
pub use explorer::{Action, ExplorerSession, ExplorerView};
pub use loader::{CatalogLoader, CatalogSource, LoadError};
pub use projection::{project, project_all_arenas, Projection, ProjectionOptions, ProjectionRecord};
pub use resolver::value_for;
pub use search::{search, SearchQuery};

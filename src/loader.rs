//! Catalog loading
//!
//! Fetches the card list once, parses it leniently, and shares the result.
//! Every `load()` call, whether made before or after the fetch finishes,
//! gets a clone of the same shared future, so the source is read exactly once.
//!
//! The fetch itself is blocking I/O (file read or HTTP GET). It runs on its own
//! thread and reports back through a oneshot channel, so `load()` is an
//! ordinary future that any executor can drive.

use crate::arena;
use crate::catalog::{ArenaValue, CardRecord, Catalog};
use crate::resolver::parse_number;
use csv::{ReaderBuilder, StringRecord, Trim};
use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Header of the mandatory name column.
pub const NAME_COLUMN: &str = "card_name";

/// Header prefixes of the battle-log exports, which carry a different schema.
const BATTLE_LOG_PREFIXES: &[&str] = &["team.", "winner.", "loser.", "opponent."];

/// Failure to produce a catalog. Cloneable so every waiter receives it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to fetch {url}: {message}")]
    Http { url: String, message: String },

    #[error("{origin} is not readable as CSV: {message}")]
    Csv { origin: String, message: String },

    #[error("{origin} has no '{column}' column")]
    MissingColumn { origin: String, column: String },

    #[error("{origin} uses the battle-log schema (found '{column}'); expected card_name/count_N columns")]
    UnsupportedSchema { origin: String, column: String },

    #[error("fetch of {origin} ended without a result")]
    FetchAborted { origin: String },
}

/// Where the card list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    /// Interpret `location` as a URL when it has an http(s) scheme, else a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            CatalogSource::Url(trimmed.to_string())
        } else {
            CatalogSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Url(url) => f.write_str(url),
        }
    }
}

/// Blocking byte fetch for a catalog source.
///
/// Called at most once per loader, from a dedicated thread.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, source: &CatalogSource) -> Result<Vec<u8>, LoadError>;
}

/// Reads files from disk and URLs over HTTP.
pub struct SourceFetcher;

impl Fetch for SourceFetcher {
    fn fetch(&self, source: &CatalogSource) -> Result<Vec<u8>, LoadError> {
        match source {
            CatalogSource::File(path) => std::fs::read(path).map_err(|e| LoadError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
            CatalogSource::Url(url) => fetch_url(url),
        }
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>, LoadError> {
    let http_err = |e: reqwest::Error| LoadError::Http {
        url: url.to_string(),
        message: e.to_string(),
    };

    let client = reqwest::blocking::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(http_err)?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(http_err)?;
    let bytes = response.bytes().map_err(http_err)?;
    Ok(bytes.to_vec())
}

/// Result shared by every waiter on a load.
pub type LoadResult = Result<Arc<Catalog>, LoadError>;

/// The single in-flight (or finished) load.
pub type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Load-once access to the card catalog
pub struct CatalogLoader {
    source: CatalogSource,
    fetcher: Arc<dyn Fetch>,
    inflight: Mutex<Option<SharedLoad>>,
}

impl CatalogLoader {
    pub fn new(source: CatalogSource) -> Self {
        Self::with_fetcher(source, Arc::new(SourceFetcher))
    }

    pub fn with_fetcher(source: CatalogSource, fetcher: Arc<dyn Fetch>) -> Self {
        CatalogLoader {
            source,
            fetcher,
            inflight: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// The catalog, fetched on first call and shared afterwards.
    ///
    /// A failed load is cached as well; it is not retried.
    pub fn load(&self) -> SharedLoad {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(load) = inflight.as_ref() {
            return load.clone();
        }
        let load = self.start().boxed().shared();
        *inflight = Some(load.clone());
        load
    }

    /// Drive the load to completion on the current thread.
    pub fn load_blocking(&self) -> LoadResult {
        futures::executor::block_on(self.load())
    }

    /// The finished result, if the load has completed.
    pub fn peek(&self) -> Option<LoadResult> {
        let inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight.as_ref().and_then(|load| load.peek().cloned())
    }

    fn start(&self) -> impl std::future::Future<Output = LoadResult> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let source = self.source.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let origin = self.source.to_string();

        log::info!("Loading card catalog from {}", origin);
        std::thread::spawn(move || {
            let origin = source.to_string();
            let result = fetcher
                .fetch(&source)
                .and_then(|bytes| parse_catalog(&bytes, &origin));
            let _ = tx.send(result);
        });

        async move {
            let result = rx.await.unwrap_or_else(|_| {
                Err(LoadError::FetchAborted {
                    origin: origin.clone(),
                })
            });
            match result {
                Ok(catalog) => {
                    log::info!("Loaded {} cards from {}", catalog.len(), origin);
                    Ok(Arc::new(catalog))
                }
                Err(e) => {
                    log::error!("Error loading card catalog: {}", e);
                    Err(e)
                }
            }
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

struct ColumnIndices {
    name: usize,
    card_type: Option<usize>,
    elixir: Option<usize>,
    rarity: Option<usize>,
    overall: Option<usize>,
    arenas: Vec<(usize, String)>,
}

fn find_columns(headers: &StringRecord, origin: &str) -> Result<ColumnIndices, LoadError> {
    let position = |name: &str| headers.iter().position(|h| h == name);

    let name = match position(NAME_COLUMN) {
        Some(i) => i,
        None => {
            let battle_log = headers
                .iter()
                .find(|h| BATTLE_LOG_PREFIXES.iter().any(|p| h.starts_with(p)));
            return Err(match battle_log {
                Some(column) => LoadError::UnsupportedSchema {
                    origin: origin.to_string(),
                    column: column.to_string(),
                },
                None => LoadError::MissingColumn {
                    origin: origin.to_string(),
                    column: NAME_COLUMN.to_string(),
                },
            });
        }
    };

    let arenas = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| arena::is_column_key(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    Ok(ColumnIndices {
        name,
        card_type: position("card_type"),
        elixir: position("elixir"),
        rarity: position("rarity"),
        overall: position("overall_count"),
        arenas,
    })
}

/// Parse card-list CSV bytes into a catalog.
///
/// Only a missing name column or an unreadable header fails the parse.
/// Unreadable rows are skipped; bad numeric cells become 0, and a blank or
/// unusable elixir cell leaves the cost unknown.
pub fn parse_catalog(bytes: &[u8], origin: &str) -> Result<Catalog, LoadError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv {
            origin: origin.to_string(),
            message: e.to_string(),
        })?
        .clone();
    let cols = find_columns(&headers, origin)?;

    let mut records = Vec::new();
    for (row_num, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Row {}: unreadable, skipped: {}", row_num + 1, e);
                continue;
            }
        };
        records.push(parse_row(&row, &cols, row_num + 1));
    }

    Ok(Catalog::from_records(records))
}

fn parse_row(row: &StringRecord, cols: &ColumnIndices, row_num: usize) -> CardRecord {
    let text = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("").to_string();

    let mut record = CardRecord::new(row.get(cols.name).unwrap_or(""));
    record.card_type = text(cols.card_type);
    record.rarity = text(cols.rarity);
    record.cost = coerce_whole(
        cols.elixir.and_then(|i| row.get(i)),
        "elixir",
        row_num,
        u32::MAX as f64,
    )
    .map(|n| n as u32);
    record.overall_count = coerce_whole(
        cols.overall.and_then(|i| row.get(i)),
        "overall_count",
        row_num,
        MAX_WHOLE_COUNT,
    )
    .unwrap_or(0);

    for (idx, column) in &cols.arenas {
        let wins = coerce_count(row.get(*idx), column, row_num);
        record
            .arena_values
            .insert(column.clone(), ArenaValue::Count(wins));
    }

    record
}

/// Largest whole count a cell may hold (integers above 2^53 lose precision).
const MAX_WHOLE_COUNT: f64 = 9_007_199_254_740_992.0;

/// Why a numeric cell was not usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellProblem {
    NonNumeric,
    Negative,
    Fractional,
    OutOfRange,
}

impl fmt::Display for CellProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellProblem::NonNumeric => "non-numeric",
            CellProblem::Negative => "negative",
            CellProblem::Fractional => "fractional",
            CellProblem::OutOfRange => "out-of-range",
        })
    }
}

fn read_count(cell: &str) -> Result<f64, CellProblem> {
    match parse_number(cell) {
        Some(n) if n >= 0.0 => Ok(n),
        Some(_) => Err(CellProblem::Negative),
        None => Err(CellProblem::NonNumeric),
    }
}

fn read_whole(cell: &str, max: f64) -> Result<u64, CellProblem> {
    let n = read_count(cell)?;
    if n.fract() != 0.0 {
        return Err(CellProblem::Fractional);
    }
    if n > max {
        return Err(CellProblem::OutOfRange);
    }
    Ok(n as u64)
}

fn log_bad_cell(row_num: usize, column: &str, cell: &str, problem: CellProblem) {
    log::debug!(
        "Row {}: {} {} value '{}' treated as 0",
        row_num,
        problem,
        column,
        cell
    );
}

/// Non-negative numeric cell, or 0 with a diagnostic.
fn coerce_count(cell: Option<&str>, column: &str, row_num: usize) -> f64 {
    let cell = match cell {
        Some(c) if !c.is_empty() => c,
        _ => return 0.0,
    };
    read_count(cell).unwrap_or_else(|problem| {
        log_bad_cell(row_num, column, cell, problem);
        0.0
    })
}

/// Whole count in `0..=max`, or `None` for a blank or unusable cell.
fn coerce_whole(cell: Option<&str>, column: &str, row_num: usize, max: f64) -> Option<u64> {
    let cell = cell.filter(|c| !c.is_empty())?;
    match read_whole(cell, max) {
        Ok(n) => Some(n),
        Err(problem) => {
            log_bad_cell(row_num, column, cell, problem);
            None
        }
    }
}

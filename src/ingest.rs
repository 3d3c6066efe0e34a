//! Ingestion run: the backfill/incremental pipeline.
//!
//! One run walks these stages in order, stopping at the first failure:
//!
//! ```text
//! Init -> ModeDetermined -> Fetched -> Filtered -> Persisted -> Aggregated
//! ```
//!
//! Init ensures the schema, ModeDetermined reads the watermark, Fetched pulls
//! every page newer than it, Filtered drops upcoming and non-newer launches,
//! Persisted inserts the survivors one by one, and Aggregated rebuilds the
//! summary row. [`run_logged`] is the only place a failed run is absorbed.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use jiff::Timestamp;

use crate::fetch::{FetchError, LaunchSource};
use crate::model::{AggregateRow, LaunchRecord};
use crate::storage::{InsertOutcome, LaunchStore, StorageError};

/// How much of the upstream history a run asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Nothing persisted yet: fetch everything.
    Backfill,

    /// Only launches strictly after the watermark.
    Incremental(Timestamp),
}

impl Mode {
    /// Picks the mode from the persisted watermark, if any.
    pub fn from_watermark(watermark: Option<Timestamp>) -> Self {
        watermark.map_or(Self::Backfill, Self::Incremental)
    }

    fn watermark(self) -> Option<Timestamp> {
        match self {
            Self::Backfill => None,
            Self::Incremental(since) => Some(since),
        }
    }
}

/// The pipeline stage a run was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ModeDetermined,
    Fetched,
    Persisted,
    Aggregated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "ensuring schema",
            Self::ModeDetermined => "reading watermark",
            Self::Fetched => "fetching launches",
            Self::Persisted => "persisting launches",
            Self::Aggregated => "recomputing aggregates",
        };
        f.write_str(name)
    }
}

/// A run-level failure: which stage broke and why.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{stage} failed: {source}")]
    Storage {
        stage: Stage,
        #[source]
        source: StorageError,
    },

    #[error("{stage} failed: {source}")]
    Fetch {
        stage: Stage,
        #[source]
        source: FetchError,
    },
}

impl IngestError {
    fn storage(stage: Stage) -> impl FnOnce(StorageError) -> Self {
        move |source| Self::Storage { stage, source }
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub mode: Mode,

    /// Valid launches returned by the fetch.
    pub fetched: usize,

    /// Launches that survived client-side filtering.
    pub candidates: usize,
    pub inserted: usize,

    /// Candidates whose id was already stored.
    pub already_present: usize,

    /// Ids whose insert failed. Later launches were still attempted.
    pub failed: Vec<String>,

    pub aggregates: AggregateRow,
}

/// Runs one ingestion pass end to end.
///
/// Aggregates are recomputed even when nothing new was inserted.
/// A failed insert is logged and skipped; every other failure ends the run.
pub fn run(store: &impl LaunchStore, source: &impl LaunchSource) -> Result<RunReport, IngestError> {
    store
        .ensure_schema()
        .map_err(IngestError::storage(Stage::Init))?;

    let watermark = store
        .latest_watermark()
        .map_err(IngestError::storage(Stage::ModeDetermined))?;
    let mode = Mode::from_watermark(watermark);
    match mode {
        Mode::Backfill => {
            log::info!("Database is empty. Performing a full backfill of all past launches.");
        }
        Mode::Incremental(since) => log::info!(
            "Database contains prior data. Performing incremental load for launches after {since}"
        ),
    }

    let launches = source
        .fetch(mode.watermark())
        .map_err(|source| IngestError::Fetch {
            stage: Stage::Fetched,
            source,
        })?;
    let fetched = launches.len();

    let candidates = filter_launches(launches, mode);
    let candidate_count = candidates.len();
    if candidates.is_empty() {
        log::info!("No new launches to ingest.");
    } else {
        log::info!("Found {candidate_count} new launches to ingest. Inserting into database...");
    }

    let mut inserted = 0;
    let mut already_present = 0;
    let mut failed = Vec::new();
    for (i, launch) in candidates.iter().enumerate() {
        log::debug!(
            "Inserting launch {}/{candidate_count}: {} ({})",
            i + 1,
            launch.name,
            launch.id
        );
        match store.insert(launch) {
            Ok(InsertOutcome::Inserted) => inserted += 1,
            Ok(InsertOutcome::AlreadyPresent) => already_present += 1,
            Err(e) => {
                log::error!(
                    "{} failed for launch ID {}: {}",
                    Stage::Persisted,
                    launch.id,
                    error_chain(&e)
                );
                failed.push(launch.id.clone());
            }
        }
    }
    if candidate_count > 0 {
        log::info!(
            "Inserted {inserted} new launch records ({already_present} already present, {} failed).",
            failed.len()
        );
    }

    let aggregates = store
        .recompute_aggregates()
        .map_err(IngestError::storage(Stage::Aggregated))?;

    Ok(RunReport {
        mode,
        fetched,
        candidates: candidate_count,
        inserted,
        already_present,
        failed,
        aggregates,
    })
}

/// Runs one ingestion pass and absorbs any failure.
///
/// This is the single point where a run error stops travelling: it is logged
/// with its full source chain and the caller gets `None` instead of an error,
/// so the process can still exit normally. A panic inside the run is caught
/// and logged the same way.
pub fn run_logged(store: &impl LaunchStore, source: &impl LaunchSource) -> Option<RunReport> {
    log::info!("--- Starting ingestion process ---");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(store, source)));
    let report = match outcome {
        Ok(Ok(report)) => {
            let mode = match report.mode {
                Mode::Backfill => "backfill",
                Mode::Incremental(_) => "incremental",
            };
            log::info!(
                "Run complete ({mode}): {} fetched, {} new, {} inserted, {} already present, aggregates as of {}.",
                report.fetched,
                report.candidates,
                report.inserted,
                report.already_present,
                report.aggregates.last_updated_utc
            );
            if !report.failed.is_empty() {
                log::error!(
                    "{} launches could not be inserted: {}",
                    report.failed.len(),
                    report.failed.join(", ")
                );
            }
            Some(report)
        }
        Ok(Err(e)) => {
            log::error!(
                "An unhandled error occurred during the ingestion process: {}",
                error_chain(&e)
            );
            None
        }
        Err(payload) => {
            log::error!(
                "An unhandled error occurred during the ingestion process: panicked: {}",
                panic_message(payload.as_ref())
            );
            None
        }
    };
    log::info!("--- Ingestion process finished ---");
    report
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Drops launches that should not be ingested, keeping order.
///
/// Upcoming launches always go: the server's date filter can let them
/// through. In incremental mode anything not strictly after the watermark
/// also goes, since the server's boundary handling is not trusted.
pub fn filter_launches(launches: Vec<LaunchRecord>, mode: Mode) -> Vec<LaunchRecord> {
    launches
        .into_iter()
        .filter(|launch| !launch.upcoming)
        .filter(|launch| match mode {
            Mode::Backfill => true,
            Mode::Incremental(since) => launch.date_utc.instant() > since,
        })
        .collect()
}

/// Formats an error and every source beneath it on one line.
pub fn error_chain(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // thiserror variants often repeat their source in the message.
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

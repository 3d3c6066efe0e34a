//! Aggregate row: summary metrics derived from every persisted launch.

use jiff::Timestamp;

/// The single summary row, rebuilt from scratch on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub total_launches: u64,
    pub successful_launches: u64,

    /// Mean of per-launch payload mass totals.
    /// Launches without any known payload mass are left out, not counted as zero.
    pub average_payload_mass_kg: Option<f64>,

    pub last_updated_utc: Timestamp,
}

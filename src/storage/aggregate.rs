//! Aggregate storage: rebuild the summary row from the raw table.

use jiff::Timestamp;

use crate::model::AggregateRow;

use super::{Result, Storage, StorageError};

/// Total and successful launch counts.
const COUNTS_SQL: &str = "
    SELECT COUNT(*),
           COUNT(*) FILTER (WHERE json_extract(launch_data, '$.success') = 1)
    FROM raw_launches";

/// Mean of per-launch payload mass totals. Launches whose payloads carry no
/// mass produce a NULL total, which `AVG` skips.
const AVERAGE_MASS_SQL: &str = "
    SELECT AVG(launch_mass)
    FROM (
        SELECT SUM(json_extract(payload.value, '$.mass_kg')) AS launch_mass
        FROM raw_launches, json_each(raw_launches.launch_data, '$.payloads') AS payload
        GROUP BY raw_launches.id
    )";

const UPSERT_SQL: &str = "
    INSERT INTO launch_aggregates
        (id, total_launches, successful_launches, average_payload_mass_kg, last_updated_utc)
    VALUES (1, ?1, ?2, ?3, ?4)
    ON CONFLICT (id) DO UPDATE SET
        total_launches = excluded.total_launches,
        successful_launches = excluded.successful_launches,
        average_payload_mass_kg = excluded.average_payload_mass_kg,
        last_updated_utc = excluded.last_updated_utc";

impl Storage {
    /// Recomputes the aggregate row over every stored launch and writes it.
    ///
    /// Reads and the upsert share one transaction. Returns the row written.
    pub fn recompute_aggregates(&self) -> Result<AggregateRow> {
        log::info!("Recomputing launch aggregates...");
        let row = self.in_transaction(|tx| {
            let (total, successful): (i64, i64) =
                tx.query_row(COUNTS_SQL, [], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let average: Option<f64> = tx.query_row(AVERAGE_MASS_SQL, [], |row| row.get(0))?;
            let now = Timestamp::now();

            tx.execute(
                UPSERT_SQL,
                rusqlite::params![total, successful, average, now.to_string()],
            )?;

            Ok(AggregateRow {
                total_launches: count(total)?,
                successful_launches: count(successful)?,
                average_payload_mass_kg: average,
                last_updated_utc: now,
            })
        })?;

        log::info!(
            "Aggregates updated: {} launches, {} successful, average payload mass {}",
            row.total_launches,
            row.successful_launches,
            row.average_payload_mass_kg
                .map_or_else(|| "n/a".to_string(), |kg| format!("{kg:.1} kg")),
        );
        Ok(row)
    }
}

fn count(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| StorageError::Corrupt(format!("negative count: {value}")))
}

//! Raw launch storage: idempotent inserts and the incremental watermark.

use jiff::Timestamp;

use crate::model::LaunchRecord;

use super::{InsertOutcome, Result, Storage, StorageError};

impl Storage {
    /// Returns the most recent `date_utc` across all stored launches,
    /// or `None` when nothing has been ingested yet.
    ///
    /// Dates are compared as instants, not as text. SQLite only resolves
    /// them to the millisecond, so every date tied at the top millisecond is
    /// read back and the maximum is taken after parsing.
    pub fn latest_watermark(&self) -> Result<Option<Timestamp>> {
        log::info!("Querying for the most recent launch date in the database.");
        let candidates: Vec<String> = self.in_transaction(|tx| {
            let mut stmt = tx.prepare(
                "WITH dates AS (
                     SELECT json_extract(launch_data, '$.date_utc') AS date_utc,
                            unixepoch(json_extract(launch_data, '$.date_utc'), 'subsec') AS instant
                     FROM raw_launches
                 )
                 SELECT date_utc FROM dates
                 WHERE instant = (SELECT MAX(instant) FROM dates)",
            )?;
            let dates = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?;
            Ok(dates)
        })?;

        let mut latest: Option<Timestamp> = None;
        for date in &candidates {
            let instant = date
                .parse::<Timestamp>()
                .map_err(|e| StorageError::Corrupt(format!("invalid date_utc {date:?}: {e}")))?;
            latest = latest.max(Some(instant));
        }

        match latest {
            Some(latest) => log::info!("Most recent launch date found: {latest}"),
            None => log::info!("No existing data found in 'raw_launches' table."),
        }
        Ok(latest)
    }

    /// Inserts a launch keyed by its id.
    ///
    /// An existing row with the same id wins: the insert is skipped and the
    /// stored payload is left exactly as it was.
    pub fn insert(&self, launch: &LaunchRecord) -> Result<InsertOutcome> {
        let launch_data = serde_json::to_string(launch)?;
        let rows = self.in_transaction(|tx| {
            Ok(tx.execute(
                "INSERT INTO raw_launches (id, launch_data) VALUES (?1, ?2)
                 ON CONFLICT (id) DO NOTHING",
                rusqlite::params![&launch.id, launch_data],
            )?)
        })?;

        if rows > 0 {
            log::debug!("Successfully inserted launch ID: {}", launch.id);
            Ok(InsertOutcome::Inserted)
        } else {
            log::debug!("Launch ID already exists, skipped: {}", launch.id);
            Ok(InsertOutcome::AlreadyPresent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::Value;
    use tempfile::TempDir;

    use crate::model::fixtures::launch_json;
    use crate::validate::validate;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("launches.sqlite"));
        storage.ensure_schema().unwrap();
        (dir, storage)
    }

    fn launch(id: &str, date_utc: &str) -> LaunchRecord {
        validate(&launch_json(id, 1, date_utc, false)).unwrap()
    }

    fn stored_rows(storage: &Storage) -> Vec<(String, Value)> {
        let conn = storage.connect().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, launch_data FROM raw_launches ORDER BY id")
            .unwrap();
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .unwrap()
            .map(|row| {
                let (id, data) = row.unwrap();
                (id, serde_json::from_str(&data).unwrap())
            })
            .collect();
        rows
    }

    #[test]
    fn watermark_is_none_when_empty() {
        let (_dir, storage) = test_storage();

        assert_eq!(storage.latest_watermark().unwrap(), None);
    }

    #[test]
    fn watermark_is_latest_date_regardless_of_insert_order() {
        let (_dir, storage) = test_storage();
        storage.insert(&launch("b", "2021-06-01T00:00:00.000Z")).unwrap();
        storage.insert(&launch("c", "2019-01-01T00:00:00.000Z")).unwrap();
        storage.insert(&launch("a", "2020-01-01T00:00:00.000Z")).unwrap();

        let watermark = storage.latest_watermark().unwrap().unwrap();

        assert_eq!(watermark, "2021-06-01T00:00:00Z".parse::<Timestamp>().unwrap());
    }

    #[test]
    fn watermark_compares_instants_not_text() {
        let (_dir, storage) = test_storage();
        // Later instant, but sorts lower as text because of the offset.
        let offset = launch_json("a", 1, "2020-01-01T10:00:00-05:00", false);
        storage
            .connect()
            .unwrap()
            .execute(
                "INSERT INTO raw_launches (id, launch_data) VALUES ('a', ?1)",
                [offset.to_string()],
            )
            .unwrap();
        storage.insert(&launch("b", "2020-01-01T12:00:00.000Z")).unwrap();

        let watermark = storage.latest_watermark().unwrap().unwrap();

        assert_eq!(watermark, "2020-01-01T15:00:00Z".parse::<Timestamp>().unwrap());
    }

    #[test]
    fn watermark_keeps_subsecond_precision() {
        let (_dir, storage) = test_storage();
        storage.insert(&launch("a", "2020-01-01T00:00:00.250Z")).unwrap();
        storage.insert(&launch("b", "2020-01-01T00:00:00.750Z")).unwrap();

        let watermark = storage.latest_watermark().unwrap().unwrap();

        assert_eq!(watermark, "2020-01-01T00:00:00.75Z".parse::<Timestamp>().unwrap());
    }

    #[test]
    fn watermark_resolves_dates_within_one_millisecond() {
        let (_dir, storage) = test_storage();
        storage.insert(&launch("b", "2020-01-01T00:00:00.0002Z")).unwrap();
        storage.insert(&launch("a", "2020-01-01T00:00:00.0001Z")).unwrap();
        storage.insert(&launch("c", "2019-12-31T23:59:59.999Z")).unwrap();

        let watermark = storage.latest_watermark().unwrap().unwrap();

        assert_eq!(watermark, "2020-01-01T00:00:00.0002Z".parse::<Timestamp>().unwrap());
    }

    #[test]
    fn insert_stores_the_record_as_json() {
        let (_dir, storage) = test_storage();
        let record = launch("a", "2020-01-01T00:00:00.000Z");

        let outcome = storage.insert(&record).unwrap();

        assert_eq!(outcome, InsertOutcome::Inserted);
        let rows = stored_rows(&storage);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "a");
        let stored: LaunchRecord = serde_json::from_value(rows[0].1.clone()).unwrap();
        assert_eq!(stored, record);
    }

    #[test]
    fn insert_keeps_upstream_date_text() {
        let (_dir, storage) = test_storage();

        storage.insert(&launch("a", "2006-03-24T22:30:00.000Z")).unwrap();

        assert_eq!(stored_rows(&storage)[0].1["date_utc"], "2006-03-24T22:30:00.000Z");
    }

    #[test]
    fn insert_twice_keeps_one_row() {
        let (_dir, storage) = test_storage();
        let record = launch("a", "2020-01-01T00:00:00.000Z");

        storage.insert(&record).unwrap();
        let second = storage.insert(&record).unwrap();

        assert_eq!(second, InsertOutcome::AlreadyPresent);
        assert_eq!(stored_rows(&storage).len(), 1);
    }

    #[test]
    fn insert_never_overwrites_existing_payload() {
        let (_dir, storage) = test_storage();
        let original = launch("a", "2020-01-01T00:00:00.000Z");
        let mut changed = original.clone();
        changed.name = "Renamed".into();

        storage.insert(&original).unwrap();
        storage.insert(&changed).unwrap();

        let rows = stored_rows(&storage);
        assert_eq!(rows[0].1["name"], original.name);
    }

    #[test]
    fn insert_without_schema_fails() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("launches.sqlite"));

        let err = storage
            .insert(&launch("a", "2020-01-01T00:00:00.000Z"))
            .unwrap_err();

        assert!(matches!(err, StorageError::Sqlite(_)));
    }
}

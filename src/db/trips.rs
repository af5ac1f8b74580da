use rusqlite::{params, params_from_iter, Row};

use crate::errors::StorageError;
use crate::models::Trip;

use super::Database;

fn row_to_trip(row: &Row) -> Result<Trip, rusqlite::Error> {
    Ok(Trip {
        id: row.get("id")?,
        start: row.get("start")?,
        end: row.get("end")?,
        distance: row.get("distance")?,
        average_speed: row.get("average_speed")?,
        max_speed: row.get("max_speed")?,
        duration: row.get("duration")?,
        date: row.get("date")?,
    })
}

impl Database {
    /// Inserts a finalized trip and returns the store-assigned id. The
    /// record's own `id` field is ignored.
    pub async fn insert_trip(&self, trip: &Trip) -> Result<i64, StorageError> {
        let record = trip.clone();
        let id = self
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO trips (start, \"end\", distance, average_speed, max_speed, duration, date)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        record.start,
                        record.end,
                        record.distance,
                        record.average_speed,
                        record.max_speed,
                        record.duration,
                        record.date,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        self.notify_changed();
        Ok(id)
    }

    /// All stored trips in insertion order.
    pub async fn list_trips(&self) -> Result<Vec<Trip>, StorageError> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, start, \"end\", distance, average_speed, max_speed, duration, date
                 FROM trips
                 ORDER BY id",
            )?;

            let mut rows = stmt.query([])?;
            let mut trips = Vec::new();
            while let Some(row) = rows.next()? {
                trips.push(row_to_trip(row)?);
            }

            Ok(trips)
        })
        .await
    }

    /// Removes the given trips and returns the affected-row count.
    /// Idempotent: ids with no matching record contribute 0.
    pub async fn delete_trips(&self, ids: &[i64]) -> Result<usize, StorageError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids = ids.to_vec();
        let deleted = self
            .execute(move |conn| {
                let placeholders = vec!["?"; ids.len()].join(", ");
                let sql = format!("DELETE FROM trips WHERE id IN ({placeholders})");
                Ok(conn.execute(&sql, params_from_iter(ids.iter()))?)
            })
            .await?;

        if deleted > 0 {
            self.notify_changed();
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::temp_db_path;
    use super::*;

    fn trip(start: &str) -> Trip {
        Trip {
            id: 0,
            start: start.to_string(),
            end: "37.43,-122.09".to_string(),
            distance: 0.03,
            average_speed: 36.0,
            max_speed: 72.0,
            duration: 3000,
            date: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn insert_then_list_includes_record() {
        let db = Database::new(temp_db_path("store-insert")).unwrap();

        let id = db.insert_trip(&trip("37.422,-122.084")).await.unwrap();
        assert!(id > 0);

        let trips = db.list_trips().await.unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, id);
        assert_eq!(trips[0].max_speed, 72.0);
    }

    #[tokio::test]
    async fn coordinate_strings_round_trip_verbatim() {
        let db = Database::new(temp_db_path("store-roundtrip")).unwrap();

        db.insert_trip(&trip("37.4220,-122.0840")).await.unwrap();

        let trips = db.list_trips().await.unwrap();
        assert_eq!(trips[0].start, "37.4220,-122.0840");
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let db = Database::new(temp_db_path("store-order")).unwrap();

        let first = db.insert_trip(&trip("1,1")).await.unwrap();
        let second = db.insert_trip(&trip("2,2")).await.unwrap();

        let ids: Vec<i64> = db.list_trips().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let db = Database::new(temp_db_path("store-delete")).unwrap();

        let id = db.insert_trip(&trip("1,1")).await.unwrap();
        let keep = db.insert_trip(&trip("2,2")).await.unwrap();

        assert_eq!(db.delete_trips(&[id]).await.unwrap(), 1);
        assert_eq!(db.delete_trips(&[id]).await.unwrap(), 0);
        assert_eq!(db.delete_trips(&[]).await.unwrap(), 0);

        let trips = db.list_trips().await.unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, keep);
    }

    #[tokio::test]
    async fn changes_notify_live_subscribers() {
        let db = Database::new(temp_db_path("store-changes")).unwrap();
        let mut changes = db.subscribe_changes();
        assert_eq!(*changes.borrow_and_update(), 0);

        let id = db.insert_trip(&trip("1,1")).await.unwrap();
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 1);

        db.delete_trips(&[id]).await.unwrap();
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 2);

        // Deleting nothing is not a visible change.
        db.delete_trips(&[id]).await.unwrap();
        assert!(!changes.has_changed().unwrap());
    }
}

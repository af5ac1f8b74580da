use serde::{Deserialize, Serialize};

use crate::errors::StorageError;

use super::GeoPoint;

/// A finalized, persisted trip record.
///
/// `start` and `end` hold coordinates in the `"<lat>,<lon>"` form and are
/// stored verbatim, so reading a record back never loses precision. `id` is
/// assigned by the store on insert; a record built by the engine carries 0
/// until then. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub start: String,
    pub end: String,
    pub distance: f64,
    pub average_speed: f64,
    pub max_speed: f64,
    pub duration: i64,
    pub date: i64,
}

impl Trip {
    /// Parses the persisted start coordinates. Fails with a data-integrity
    /// error when the stored string is malformed.
    pub fn start_position(&self) -> Result<GeoPoint, StorageError> {
        GeoPoint::decode(&self.start)
    }

    pub fn end_position(&self) -> Result<GeoPoint, StorageError> {
        GeoPoint::decode(&self.end)
    }
}

use thiserror::Error;

/// Failures raised at the location-subscription boundary.
///
/// Both variants mean the subscription never started; any trip state
/// accumulated so far is left untouched so the caller can retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission is not granted")]
    PermissionDenied,
    #[error("location is not enabled")]
    LocationUnavailable,
}

/// Failures raised by the trip store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database worker terminated unexpectedly")]
    WorkerGone,
    #[error("database version {found} is newer than supported schema {supported}")]
    SchemaTooNew { found: i32, supported: i32 },
    #[error("unknown migration target version: {0}")]
    UnknownMigration(i32),
    #[error("malformed coordinate string '{0}'")]
    MalformedCoordinates(String),
}

/// Errors surfaced by [`crate::engine::TripEngine`] lifecycle calls.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

//! Trip tracking engine with local trip history.
//!
//! The engine consumes a stream of GPS samples, maintains running
//! speed/distance/duration statistics through the trip lifecycle
//! (Idle → Started → Paused/Stopped → Idle) and hands finalized trips to a
//! SQLite-backed store. Presentation is out of scope: consumers observe the
//! engine through a last-value-wins [`TripSnapshot`] watch channel and the
//! store through a change-notified re-query.

pub mod db;
pub mod engine;
pub mod errors;
pub mod location;
pub mod models;

pub use db::Database;
pub use engine::{TripEngine, TripSnapshot, TripState};
pub use errors::{EngineError, LocationError, StorageError};
pub use location::{LocationClient, SimulatedLocationClient};
pub use models::{GeoPoint, LocationSample, Trip};

pub mod controller;
pub mod state;

pub use controller::TripEngine;
pub use state::{TripSnapshot, TripState, TripTelemetry};

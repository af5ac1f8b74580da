use serde::{Deserialize, Serialize};

use crate::models::{GeoPoint, LocationSample};

/// Trip lifecycle state. Exactly one variant holds at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TripState {
    Idle,
    Started,
    Paused,
    Stopped,
}

impl Default for TripState {
    fn default() -> Self {
        TripState::Idle
    }
}

/// Running statistics for the active tracking session.
///
/// Owned exclusively by the engine; consumers only ever see the derived
/// [`TripSnapshot`]. `distance_km`, `max_speed_kmh`, `sample_count` and
/// `duration_ms` never decrease except through [`TripTelemetry::reset`].
#[derive(Debug, Clone)]
pub struct TripTelemetry {
    pub state: TripState,
    pub current_speed_kmh: f64,
    pub distance_km: f64,
    pub max_speed_kmh: f64,
    pub duration_ms: u64,
    pub start_location: Option<GeoPoint>,
    pub last_location: Option<GeoPoint>,
    pub end_location: Option<GeoPoint>,
    sample_count: u64,
    speed_sum_kmh: f64,
}

impl Default for TripTelemetry {
    fn default() -> Self {
        Self {
            state: TripState::Idle,
            current_speed_kmh: 0.0,
            distance_km: 0.0,
            max_speed_kmh: 0.0,
            duration_ms: 0,
            start_location: None,
            last_location: None,
            end_location: None,
            sample_count: 0,
            speed_sum_kmh: 0.0,
        }
    }
}

impl TripTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean of all sample speeds so far; 0 before the first sample.
    pub fn avg_speed_kmh(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            self.speed_sum_kmh / self.sample_count as f64
        }
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Folds one location update into the running statistics.
    pub fn apply_sample(&mut self, sample: &LocationSample) {
        let speed_kmh = sample.speed_kmh();

        if self.last_location.is_none() {
            self.start_location = Some(sample.position());
        }
        self.last_location = Some(sample.position());
        self.current_speed_kmh = speed_kmh;

        // Time integration at the nominal 1 Hz update rate: km gained in
        // one second at the current speed. Kept over point-to-point
        // geodesic distance for parity with previously recorded trips.
        self.distance_km += speed_kmh / 3600.0;

        self.max_speed_kmh = self.max_speed_kmh.max(speed_kmh);
        self.sample_count += 1;
        self.speed_sum_kmh += speed_kmh;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> TripSnapshot {
        TripSnapshot {
            state: self.state,
            current_speed_kmh: self.current_speed_kmh,
            distance_km: self.distance_km,
            max_speed_kmh: self.max_speed_kmh,
            avg_speed_kmh: self.avg_speed_kmh(),
            duration_ms: self.duration_ms,
            start_location: self.start_location,
            current_location: self.last_location,
            end_location: self.end_location,
        }
    }
}

/// Last-value-wins view of the engine published to consumers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    pub state: TripState,
    pub current_speed_kmh: f64,
    pub distance_km: f64,
    pub max_speed_kmh: f64,
    pub avg_speed_kmh: f64,
    pub duration_ms: u64,
    pub start_location: Option<GeoPoint>,
    pub current_location: Option<GeoPoint>,
    pub end_location: Option<GeoPoint>,
}

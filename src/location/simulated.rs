use std::time::Duration;

use log::{debug, error};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::errors::LocationError;
use crate::models::LocationSample;

use super::LocationClient;

// Fallback fix used when no real position is available.
const START_LATITUDE: f64 = 37.422;
const START_LONGITUDE: f64 = -122.084;

// One degree of latitude is ~111 km, so meters travelled in one interval
// map to degrees via this factor.
const METERS_TO_DEGREES: f64 = 1.0 / 111_000.0;

const MAX_SPEED_MPS: f64 = 33.0;

/// Drives the engine without real hardware: produces a plausible random
/// walk of speed and position at the requested interval.
pub struct SimulatedLocationClient {
    permission_granted: bool,
    provider_enabled: bool,
}

impl SimulatedLocationClient {
    pub fn new() -> Self {
        Self {
            permission_granted: true,
            provider_enabled: true,
        }
    }

    /// A client that rejects every subscription, as a device with location
    /// permission revoked would.
    pub fn without_permission() -> Self {
        Self {
            permission_granted: false,
            provider_enabled: true,
        }
    }

    /// A client on a device with GPS and network providers both disabled.
    pub fn without_providers() -> Self {
        Self {
            permission_granted: true,
            provider_enabled: false,
        }
    }
}

impl Default for SimulatedLocationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationClient for SimulatedLocationClient {
    fn subscribe(
        &self,
        interval: Duration,
    ) -> Result<mpsc::Receiver<LocationSample>, LocationError> {
        if !self.permission_granted {
            error!("Location permission is not granted");
            return Err(LocationError::PermissionDenied);
        }
        if !self.provider_enabled {
            error!("Location is not enabled");
            return Err(LocationError::LocationUnavailable);
        }

        let (tx, rx) = mpsc::channel(32);
        let interval_secs = interval.as_secs_f64();

        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut latitude = START_LATITUDE;
            let mut longitude = START_LONGITUDE;
            let mut speed: f64 = 0.0;
            let mut heading: f64 = 0.0;

            loop {
                ticker.tick().await;

                {
                    let mut rng = rand::thread_rng();
                    speed = (speed + rng.gen_range(-1.5..2.0)).clamp(0.0, MAX_SPEED_MPS);
                    heading += rng.gen_range(-0.2..0.2);
                }

                let step = speed * interval_secs * METERS_TO_DEGREES;
                latitude += step * heading.cos();
                longitude += step * heading.sin();

                let sample = LocationSample {
                    latitude,
                    longitude,
                    speed,
                };
                if tx.send(sample).await.is_err() {
                    debug!("Location subscriber dropped; stopping updates");
                    break;
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn failing_devices_reject_subscriptions_up_front() {
        let denied = SimulatedLocationClient::without_permission();
        assert_eq!(
            denied.subscribe(Duration::from_millis(1000)).err(),
            Some(LocationError::PermissionDenied)
        );

        let disabled = SimulatedLocationClient::without_providers();
        assert_eq!(
            disabled.subscribe(Duration::from_millis(1000)).err(),
            Some(LocationError::LocationUnavailable)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn produces_plausible_samples() {
        let client = SimulatedLocationClient::new();
        let mut rx = client.subscribe(Duration::from_millis(1000)).unwrap();

        for _ in 0..5 {
            let sample = rx.recv().await.unwrap();
            assert!(sample.speed >= 0.0);
            assert!(sample.speed <= MAX_SPEED_MPS);
            assert!(sample.latitude.is_finite());
            assert!(sample.longitude.is_finite());
        }
    }
}

use std::time::Duration;

use tokio::sync::mpsc;

use crate::errors::LocationError;
use crate::models::LocationSample;

mod simulated;

pub use simulated::SimulatedLocationClient;

/// A cancellable source of location updates.
///
/// `subscribe` either starts delivering samples on the returned channel at
/// roughly `interval` spacing, or fails up front when the platform cannot
/// provide them (permission absent, no enabled provider). It must not
/// silently degrade into an empty stream.
///
/// Dropping the receiver cancels the subscription; a client must stop
/// producing once the channel is closed. Callers keep at most one
/// subscription active at a time.
pub trait LocationClient: Send + Sync + 'static {
    fn subscribe(
        &self,
        interval: Duration,
    ) -> Result<mpsc::Receiver<LocationSample>, LocationError>;
}

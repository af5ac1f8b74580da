mod location;
mod trip;

pub use location::{GeoPoint, LocationSample};
pub use trip::Trip;

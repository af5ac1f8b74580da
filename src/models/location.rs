use serde::{Deserialize, Serialize};

use crate::errors::StorageError;

/// One reading delivered by a location source.
///
/// `speed` is in meters per second, as reported by the device; it is
/// converted to km/h at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
}

impl LocationSample {
    pub fn position(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Device speed converted to km/h.
    pub fn speed_kmh(&self) -> f64 {
        self.speed * 3.6
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Encodes the point in the persisted `"<lat>,<lon>"` form.
    pub fn encode(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Parses the persisted `"<lat>,<lon>"` form. Whitespace around either
    /// component is tolerated for records written with a `", "` separator.
    pub fn decode(raw: &str) -> Result<Self, StorageError> {
        let malformed = || StorageError::MalformedCoordinates(raw.to_string());
        let (latitude, longitude) = raw.split_once(',').ok_or_else(malformed)?;
        Ok(Self {
            latitude: latitude.trim().parse().map_err(|_| malformed())?,
            longitude: longitude.trim().parse().map_err(|_| malformed())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_converts_to_kmh() {
        let sample = LocationSample {
            latitude: 0.0,
            longitude: 0.0,
            speed: 10.0,
        };
        assert!((sample.speed_kmh() - 36.0).abs() < f64::EPSILON);
    }

    #[test]
    fn encode_decode_round_trip() {
        let point = GeoPoint {
            latitude: 37.422,
            longitude: -122.084,
        };
        let encoded = point.encode();
        assert_eq!(encoded, "37.422,-122.084");
        assert_eq!(GeoPoint::decode(&encoded).unwrap(), point);
    }

    #[test]
    fn decode_tolerates_space_after_comma() {
        let point = GeoPoint::decode("37.422, -122.084").unwrap();
        assert_eq!(point.latitude, 37.422);
        assert_eq!(point.longitude, -122.084);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        for raw in ["", "37.422", "north,west", "37.422;-122.084"] {
            assert!(
                matches!(
                    GeoPoint::decode(raw),
                    Err(StorageError::MalformedCoordinates(_))
                ),
                "expected malformed error for {raw:?}"
            );
        }
    }
}

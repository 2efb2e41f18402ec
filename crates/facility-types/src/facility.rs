//! The facility record and its identifier.
//!
//! A [`Facility`] is a required-field struct plus an open-ended map of
//! every other top-level attribute found in the JSON document (contacts,
//! equipment, emergency procedures, ...). The map is flattened back into
//! the object on serialization so unknown fields survive a
//! read-mutate-write cycle untouched.

use std::borrow::Cow;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::patch::FacilityPatch;

/// JSON key of the facility identifier.
pub const ID_FIELD: &str = "id";
/// JSON key of the facility name.
pub const NAME_FIELD: &str = "name";
/// JSON key of the facility category.
pub const TYPE_FIELD: &str = "type";
/// JSON key of the two-letter region code.
pub const STATE_FIELD: &str = "state";
/// JSON key of the `[longitude, latitude]` pair.
pub const COORDINATES_FIELD: &str = "coordinates";

/// Integer identifier of a facility, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub u64);

impl FacilityId {
    /// Wrap a raw integer identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the inner integer value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for FacilityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FacilityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for FacilityId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

/// Reason a coordinate pair was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatesError {
    /// One of the components is NaN or infinite.
    #[error("coordinates must be finite numbers")]
    NotFinite,
    /// Longitude outside `[-180, 180]`.
    #[error("longitude must be within [-180, 180]")]
    LongitudeOutOfRange,
    /// Latitude outside `[-90, 90]`.
    #[error("latitude must be within [-90, 90]")]
    LatitudeOutOfRange,
}

/// A point on the map, serialized as `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    /// Degrees east of the prime meridian.
    pub longitude: f64,
    /// Degrees north of the equator.
    pub latitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, checking that it lies on the globe.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoordinatesError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(CoordinatesError::NotFinite);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::LongitudeOutOfRange);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::LatitudeOutOfRange);
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }
}

impl TryFrom<[f64; 2]> for Coordinates {
    type Error = CoordinatesError;

    fn try_from([longitude, latitude]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(longitude, latitude)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.longitude, c.latitude]
    }
}

/// A managed physical location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Unique identifier, immutable once assigned.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// Category such as `hub`, `warehouse` or `office`. Not enumerated.
    #[serde(rename = "type")]
    pub facility_type: String,
    /// Two-letter region code.
    pub state: String,
    /// Map position.
    pub coordinates: Coordinates,
    /// Every other top-level attribute, carried opaquely.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Facility {
    /// Overwrite the fields named in `patch`, leaving the rest untouched.
    ///
    /// Opaque attributes are merged key by key.
    pub fn apply(&mut self, patch: FacilityPatch) {
        let FacilityPatch {
            name,
            facility_type,
            state,
            coordinates,
            extra,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(facility_type) = facility_type {
            self.facility_type = facility_type;
        }
        if let Some(state) = state {
            self.state = state;
        }
        if let Some(coordinates) = coordinates {
            self.coordinates = coordinates;
        }
        for (key, value) in extra {
            self.extra.insert(key, value);
        }
    }

    /// Textual form of a top-level scalar field, used for exact-match
    /// filtering.
    ///
    /// Returns `None` for absent keys and for non-scalar values (objects,
    /// arrays, null, and the coordinate pair).
    pub fn scalar_text(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            ID_FIELD => Some(Cow::Owned(self.id.to_string())),
            NAME_FIELD => Some(Cow::Borrowed(self.name.as_str())),
            TYPE_FIELD => Some(Cow::Borrowed(self.facility_type.as_str())),
            STATE_FIELD => Some(Cow::Borrowed(self.state.as_str())),
            COORDINATES_FIELD => None,
            _ => match self.extra.get(key)? {
                Value::String(s) => Some(Cow::Borrowed(s.as_str())),
                Value::Number(n) => Some(Cow::Owned(n.to_string())),
                Value::Bool(b) => Some(Cow::Owned(b.to_string())),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            },
        }
    }

    /// An opaque attribute read as a non-negative integer.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(Value::as_u64)
    }

    /// An opaque attribute, or an empty JSON object when absent.
    pub fn extra_or_empty(&self, key: &str) -> Value {
        self.extra
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> Value {
        serde_json::json!({
            "id": 7,
            "name": "Columbus Hub",
            "type": "hub",
            "state": "OH",
            "coordinates": [-82.9988, 39.9612],
            "size_sqft": 120_000,
            "open_24h": true,
            "contacts": { "facility_manager": { "name": "Dana Ruiz" } },
            "equipment": ["HVAC System", "Forklifts"]
        })
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let original = sample_json();
        let facility: Facility = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(facility.extra.len(), 4);
        assert_eq!(serde_json::to_value(&facility).unwrap(), original);
    }

    #[test]
    fn coordinates_serialize_as_longitude_latitude_pair() {
        let c = Coordinates::new(-82.5, 39.25).unwrap();
        assert_eq!(serde_json::to_value(c).unwrap(), serde_json::json!([-82.5, 39.25]));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert_eq!(
            Coordinates::new(181.0, 0.0),
            Err(CoordinatesError::LongitudeOutOfRange)
        );
        assert_eq!(
            Coordinates::new(0.0, -90.5),
            Err(CoordinatesError::LatitudeOutOfRange)
        );
        assert_eq!(
            Coordinates::new(f64::NAN, 0.0),
            Err(CoordinatesError::NotFinite)
        );
        let parsed: Result<Facility, _> = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "x", "type": "hub", "state": "OH", "coordinates": [0.0, 95.0]
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn scalar_text_covers_named_and_opaque_fields() {
        let facility: Facility = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(facility.scalar_text("id").as_deref(), Some("7"));
        assert_eq!(facility.scalar_text("type").as_deref(), Some("hub"));
        assert_eq!(facility.scalar_text("size_sqft").as_deref(), Some("120000"));
        assert_eq!(facility.scalar_text("open_24h").as_deref(), Some("true"));
        assert_eq!(facility.scalar_text("contacts"), None);
        assert_eq!(facility.scalar_text("coordinates"), None);
        assert_eq!(facility.scalar_text("missing"), None);
    }

    #[test]
    fn facility_id_parses_from_path_segment() {
        assert_eq!("42".parse::<FacilityId>(), Ok(FacilityId(42)));
        assert!("stats".parse::<FacilityId>().is_err());
        assert!("-1".parse::<FacilityId>().is_err());
    }
}

//! Validated create/update payloads for facilities.
//!
//! [`FacilityPatch::from_json`] turns a raw request body into a typed set
//! of optional field replacements. Known fields are type-checked and
//! stored exactly as sent; non-canonical values are rejected rather
//! than rewritten. Everything else is kept verbatim as an
//! opaque attribute. An `id` in the payload is discarded because identity
//! is always assigned by the store.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::facility::{
    COORDINATES_FIELD, Coordinates, Facility, FacilityId, ID_FIELD, NAME_FIELD, STATE_FIELD,
    TYPE_FIELD,
};
use crate::fields::{into_object, take_text, take_typed};

/// A set of field replacements for a facility.
///
/// Used both for creation (where the four named fields are required) and
/// for partial updates (where any subset may be present).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement category.
    pub facility_type: Option<String>,
    /// Replacement region code, two upper-case letters.
    pub state: Option<String>,
    /// Replacement coordinates.
    pub coordinates: Option<Coordinates>,
    /// Opaque attributes to set, key by key.
    pub extra: Map<String, Value>,
}

impl FacilityPatch {
    /// Parse and validate a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotAnObject`] for non-object bodies and
    /// [`ValidationError::InvalidField`] when a known field is present
    /// with the wrong type or an unusable value.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut fields = into_object(value)?;
        fields.remove(ID_FIELD);

        let name = take_text(&mut fields, NAME_FIELD)?;
        let facility_type = take_text(&mut fields, TYPE_FIELD)?;
        let state = take_text(&mut fields, STATE_FIELD)?
            .map(check_state)
            .transpose()?;
        let coordinates = take_typed::<Coordinates>(&mut fields, COORDINATES_FIELD)?;

        Ok(Self {
            name,
            facility_type,
            state,
            coordinates,
            extra: fields,
        })
    }

    /// Names of the required fields this patch does not set.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push(NAME_FIELD);
        }
        if self.facility_type.is_none() {
            missing.push(TYPE_FIELD);
        }
        if self.state.is_none() {
            missing.push(STATE_FIELD);
        }
        if self.coordinates.is_none() {
            missing.push(COORDINATES_FIELD);
        }
        missing
    }

    /// Build a complete facility from this patch.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] listing every required
    /// field the patch leaves unset.
    pub fn into_facility(self, id: FacilityId) -> Result<Facility, ValidationError> {
        let missing = self.missing_required();
        let Self {
            name: Some(name),
            facility_type: Some(facility_type),
            state: Some(state),
            coordinates: Some(coordinates),
            extra,
        } = self
        else {
            return Err(ValidationError::MissingFields(missing));
        };

        Ok(Facility {
            id,
            name,
            facility_type,
            state,
            coordinates,
            extra,
        })
    }
}

/// Accept only a region code of two upper-case ASCII letters.
fn check_state(raw: String) -> Result<String, ValidationError> {
    if raw.len() == 2 && raw.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(raw)
    } else {
        Err(ValidationError::invalid(
            STATE_FIELD,
            "must be a two-letter upper-case region code",
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn full_payload_builds_facility() {
        let patch = FacilityPatch::from_json(json!({
            "name": "Alpha Hub",
            "type": "hub",
            "state": "OH",
            "coordinates": [-83.0, 40.0],
            "employees": 40
        }))
        .unwrap();

        let facility = patch.into_facility(FacilityId(3)).unwrap();
        assert_eq!(facility.id, FacilityId(3));
        assert_eq!(facility.name, "Alpha Hub");
        assert_eq!(facility.state, "OH");
        assert_eq!(facility.extra_u64("employees"), Some(40));
    }

    #[test]
    fn client_supplied_id_is_discarded() {
        let patch = FacilityPatch::from_json(json!({ "id": 99, "name": "Renamed" })).unwrap();
        assert!(!patch.extra.contains_key("id"));
        assert_eq!(patch.name.as_deref(), Some("Renamed"));
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let patch = FacilityPatch::from_json(json!({ "name": "Lonely" })).unwrap();
        let err = patch.into_facility(FacilityId(1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["type", "state", "coordinates"])
        );
        assert_eq!(
            err.to_string(),
            "missing required fields: type, state, coordinates"
        );
    }

    #[test]
    fn wrongly_typed_known_fields_are_rejected() {
        let cases = [
            json!({ "name": 12 }),
            json!({ "name": null }),
            json!({ "name": "   " }),
            json!({ "state": "Ohio" }),
            json!({ "state": "oh" }),
            json!({ "name": "  Alpha Hub " }),
            json!({ "type": "hub " }),
            json!({ "coordinates": [1.0] }),
            json!({ "coordinates": "north" }),
        ];
        for case in cases {
            assert!(
                matches!(
                    FacilityPatch::from_json(case.clone()),
                    Err(ValidationError::InvalidField { .. })
                ),
                "accepted {case}"
            );
        }
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(
            FacilityPatch::from_json(json!([1, 2, 3])),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn apply_only_touches_named_fields() {
        let mut facility = FacilityPatch::from_json(json!({
            "name": "Beta Warehouse",
            "type": "warehouse",
            "state": "CA",
            "coordinates": [-118.2, 34.0],
            "equipment": ["Dock Levelers"],
            "employees": 12
        }))
        .unwrap()
        .into_facility(FacilityId(2))
        .unwrap();

        let patch =
            FacilityPatch::from_json(json!({ "name": "Beta Depot", "employees": 15 })).unwrap();
        facility.apply(patch);

        assert_eq!(facility.name, "Beta Depot");
        assert_eq!(facility.facility_type, "warehouse");
        assert_eq!(facility.state, "CA");
        assert_eq!(facility.extra_u64("employees"), Some(15));
        assert_eq!(facility.extra["equipment"], json!(["Dock Levelers"]));
    }
}

//! The canonical in-memory facility collection.
//!
//! [`FacilityStore`] keeps records in insertion order and answers every
//! query with a linear scan; the dataset is a few hundred records at most.
//!
//! Identifiers come from a high-water mark rather than the current
//! maximum, so an id freed by a delete is never handed out again.

use std::collections::{BTreeMap, BTreeSet};

use facility_types::facility::STATE_FIELD;
use facility_types::{Facility, FacilityId, FacilityPatch, FacilityStats};
use serde_json::Value;

use crate::error::StoreError;

/// Opaque attribute summed into [`FacilityStats::total_sqft`].
const SIZE_FIELD: &str = "size_sqft";
/// Opaque attribute summed into [`FacilityStats::total_employees`].
const EMPLOYEES_FIELD: &str = "employees";
/// Opaque attribute served by the contacts endpoint.
const CONTACTS_FIELD: &str = "contacts";
/// Opaque attribute served by the emergency procedures endpoint.
const EMERGENCY_FIELD: &str = "emergency_procedures";

/// Exact-match criteria for [`FacilityStore::filter`], keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria(BTreeMap<String, String>);

impl FilterCriteria {
    /// Create an empty criteria set (matches everything).
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Whether no criteria are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for FilterCriteria {
    fn from(criteria: BTreeMap<String, String>) -> Self {
        Self(criteria)
    }
}

impl FromIterator<(String, String)> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The authoritative facility collection for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityStore {
    facilities: Vec<Facility>,
    /// Largest id this store has ever held.
    high_water: u64,
}

impl FacilityStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            facilities: Vec::new(),
            high_water: 0,
        }
    }

    /// Build a store from loaded records, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if two records share an id.
    pub fn from_records(records: Vec<Facility>) -> Result<Self, StoreError> {
        let mut seen = BTreeSet::new();
        for facility in &records {
            if !seen.insert(facility.id) {
                return Err(StoreError::DuplicateId(facility.id));
            }
        }
        let high_water = seen.last().map_or(0, |id| id.into_inner());
        Ok(Self {
            facilities: records,
            high_water,
        })
    }

    /// Number of facilities.
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Whether the store holds no facilities.
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Every facility, in insertion order.
    pub fn list_all(&self) -> &[Facility] {
        &self.facilities
    }

    /// Look up a facility by id.
    pub fn get(&self, id: FacilityId) -> Result<&Facility, StoreError> {
        self.facilities
            .iter()
            .find(|f| f.id == id)
            .ok_or(StoreError::FacilityNotFound(id))
    }

    /// Validate `patch` as a complete record, assign it a fresh id, and
    /// append it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if a required field is missing;
    /// the id counter is not advanced in that case.
    pub fn create(&mut self, patch: FacilityPatch) -> Result<Facility, StoreError> {
        let next = self
            .high_water
            .checked_add(1)
            .ok_or(StoreError::IdExhausted)?;
        let facility = patch.into_facility(FacilityId(next))?;
        self.high_water = next;
        self.facilities.push(facility.clone());
        Ok(facility)
    }

    /// Replace the fields named in `patch` on an existing facility.
    pub fn update(&mut self, id: FacilityId, patch: FacilityPatch) -> Result<Facility, StoreError> {
        let facility = self
            .facilities
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(StoreError::FacilityNotFound(id))?;
        facility.apply(patch);
        Ok(facility.clone())
    }

    /// Remove a facility and return it.
    pub fn delete(&mut self, id: FacilityId) -> Result<Facility, StoreError> {
        let index = self
            .facilities
            .iter()
            .position(|f| f.id == id)
            .ok_or(StoreError::FacilityNotFound(id))?;
        Ok(self.facilities.remove(index))
    }

    /// Case-insensitive substring search over name, type and state.
    ///
    /// A blank query matches every facility.
    pub fn search(&self, query: &str) -> Vec<&Facility> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.facilities.iter().collect();
        }
        self.facilities
            .iter()
            .filter(|f| {
                [&f.name, &f.facility_type, &f.state]
                    .into_iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Facilities whose fields equal every criterion.
    ///
    /// A criterion naming a field no facility carries is ignored. A
    /// facility that lacks a field some other facility carries does not
    /// match a criterion on it. Region codes compare case-insensitively,
    /// so `state=oh` finds `OH`; every other field must match exactly.
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&Facility> {
        let known: Vec<(&str, &str)> = criteria
            .iter()
            .filter(|(field, _)| {
                self.facilities
                    .iter()
                    .any(|f| f.scalar_text(field).is_some())
            })
            .collect();

        self.facilities
            .iter()
            .filter(|f| {
                known
                    .iter()
                    .all(|(field, value)| {
                        f.scalar_text(field)
                            .is_some_and(|actual| criterion_matches(field, &actual, value))
                    })
            })
            .collect()
    }

    /// Aggregate counts and totals, computed in one pass.
    pub fn stats(&self) -> FacilityStats {
        let mut stats = FacilityStats {
            total: self.facilities.len(),
            ..FacilityStats::default()
        };

        for facility in &self.facilities {
            bump(&mut stats.by_type, &facility.facility_type);
            bump(&mut stats.by_state, &facility.state);
            stats.total_sqft = stats
                .total_sqft
                .saturating_add(facility.extra_u64(SIZE_FIELD).unwrap_or(0));
            stats.total_employees = stats
                .total_employees
                .saturating_add(facility.extra_u64(EMPLOYEES_FIELD).unwrap_or(0));
        }

        let count = u64::try_from(stats.total).unwrap_or(u64::MAX);
        stats.avg_sqft = stats.total_sqft.checked_div(count).unwrap_or(0);
        stats.avg_employees = stats.total_employees.checked_div(count).unwrap_or(0);
        stats
    }

    /// The contact directory of a facility (empty object when absent).
    pub fn contacts(&self, id: FacilityId) -> Result<Value, StoreError> {
        Ok(self.get(id)?.extra_or_empty(CONTACTS_FIELD))
    }

    /// The emergency procedures of a facility (empty object when absent).
    pub fn emergency_procedures(&self, id: FacilityId) -> Result<Value, StoreError> {
        Ok(self.get(id)?.extra_or_empty(EMERGENCY_FIELD))
    }
}

fn criterion_matches(field: &str, actual: &str, wanted: &str) -> bool {
    if field == STATE_FIELD {
        actual.eq_ignore_ascii_case(wanted)
    } else {
        actual == wanted
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    let count = counts.entry(key.to_owned()).or_insert(0);
    *count = count.saturating_add(1);
}

use serde::Serialize;

use crate::models::FacilityCategory;

use super::facilities::{find_nearby, Facility, FacilitySource, LookupStatus};
use super::geo::Coordinates;
use super::geocoding::Geocoder;
use super::map::MapView;

/// Facilities listed per category in the results view. The map shows all.
pub const DISPLAY_LIMIT: usize = 5;

/// How the address lookup went. Logged, not serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeStatus {
    Found,
    NoMatch,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationResult {
    pub user: Option<Coordinates>,
    pub hospitals: Vec<Facility>,
    pub pharmacies: Vec<Facility>,
    #[serde(skip)]
    pub geocode_status: GeocodeStatus,
    #[serde(skip)]
    pub hospital_status: LookupStatus,
    #[serde(skip)]
    pub pharmacy_status: LookupStatus,
}

impl LocationResult {
    /// No coordinates: location-dependent features are disabled.
    pub fn unavailable(status: GeocodeStatus) -> Self {
        Self {
            user: None,
            hospitals: Vec::new(),
            pharmacies: Vec::new(),
            geocode_status: status,
            hospital_status: LookupStatus::NotAttempted,
            pharmacy_status: LookupStatus::NotAttempted,
        }
    }

    pub fn is_available(&self) -> bool {
        self.user.is_some()
    }

    pub fn display_hospitals(&self) -> Vec<&Facility> {
        display_list(&self.hospitals)
    }

    pub fn display_pharmacies(&self) -> Vec<&Facility> {
        display_list(&self.pharmacies)
    }

    pub fn map_view(&self) -> Option<MapView> {
        self.user
            .map(|user| MapView::new(user, &self.hospitals, &self.pharmacies))
    }
}

fn display_list(facilities: &[Facility]) -> Vec<&Facility> {
    facilities
        .iter()
        .filter(|f| f.name.is_some())
        .take(DISPLAY_LIMIT)
        .collect()
}

/// Geocode `address`, then search hospitals and pharmacies around it.
///
/// Never fails: an unknown or unreachable address yields
/// [`LocationResult::unavailable`], and facility failures read as empty lists.
pub fn locate(
    geocoder: &dyn Geocoder,
    facilities: &dyn FacilitySource,
    address: &str,
    radius_meters: u32,
) -> LocationResult {
    let user = match geocoder.geocode(address) {
        Ok(Some(coords)) => coords,
        Ok(None) => {
            tracing::info!("Address did not match any known place");
            return LocationResult::unavailable(GeocodeStatus::NoMatch);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Geocoding failed");
            return LocationResult::unavailable(GeocodeStatus::Unavailable);
        }
    };

    let hospitals = find_nearby(facilities, user, FacilityCategory::Hospital, radius_meters);
    let pharmacies = find_nearby(facilities, user, FacilityCategory::Pharmacy, radius_meters);

    let result = LocationResult {
        user: Some(user),
        geocode_status: GeocodeStatus::Found,
        hospital_status: hospitals.status(),
        pharmacy_status: pharmacies.status(),
        hospitals: hospitals.into_facilities(),
        pharmacies: pharmacies.into_facilities(),
    };

    tracing::info!(
        radius_meters,
        hospitals = result.hospitals.len(),
        pharmacies = result.pharmacies.len(),
        hospital_status = ?result.hospital_status,
        pharmacy_status = ?result.pharmacy_status,
        "Location resolved"
    );
    result
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::models::FacilityCategory;

use super::facilities::{FacilitySource, PointOfInterest};
use super::geo::Coordinates;
use super::geocoding::Geocoder;
use super::LocationError;

/// Geocoder returning a fixed answer.
pub struct MockGeocoder {
    result: Result<Option<Coordinates>, LocationError>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn found(at: Coordinates) -> Self {
        Self::with_result(Ok(Some(at)))
    }

    pub fn not_found() -> Self {
        Self::with_result(Ok(None))
    }

    pub fn failing(err: LocationError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: Result<Option<Coordinates>, LocationError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for MockGeocoder {
    fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Facility source with a canned answer per category. Unconfigured categories
/// return no matches.
#[derive(Default)]
pub struct MockFacilitySource {
    results: HashMap<FacilityCategory, Result<Vec<PointOfInterest>, LocationError>>,
    calls: AtomicUsize,
}

impl MockFacilitySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        category: FacilityCategory,
        result: Result<Vec<PointOfInterest>, LocationError>,
    ) -> Self {
        self.results.insert(category, result);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FacilitySource for MockFacilitySource {
    fn search(
        &self,
        _at: Coordinates,
        category: FacilityCategory,
        _radius_meters: u32,
    ) -> Result<Vec<PointOfInterest>, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.get(&category).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}

//! Nearby hospitals and pharmacies from the Overpass API.

use serde::{Deserialize, Serialize};

use crate::models::FacilityCategory;

use super::geo::Coordinates;
use super::{http_client, map_transport_error, read_json, LocationError};

/// A facility as reported by the points-of-interest service.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub category: FacilityCategory,
    pub name: Option<String>,
    pub coordinates: Coordinates,
}

/// A facility with its distance from the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
    pub category: FacilityCategory,
    pub name: Option<String>,
    pub coordinates: Coordinates,
    pub distance_km: f64,
}

impl Facility {
    pub fn from_poi(poi: PointOfInterest, origin: Coordinates) -> Self {
        Self {
            distance_km: origin.distance_km(&poi.coordinates),
            category: poi.category,
            name: poi.name,
            coordinates: poi.coordinates,
        }
    }

    /// Name, or the category label when the source has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.category.label())
    }
}

/// Points-of-interest lookup abstraction (allows mocking).
pub trait FacilitySource: Send + Sync {
    fn search(
        &self,
        at: Coordinates,
        category: FacilityCategory,
        radius_meters: u32,
    ) -> Result<Vec<PointOfInterest>, LocationError>;
}

/// Outcome of one nearby search.
#[derive(Debug, Clone, PartialEq)]
pub enum FacilityLookup {
    Found(Vec<Facility>),
    Unavailable(LocationError),
}

/// Observable summary of a lookup. Never shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupStatus {
    #[default]
    NotAttempted,
    Found(usize),
    NoMatches,
    Unavailable,
}

impl FacilityLookup {
    pub fn status(&self) -> LookupStatus {
        match self {
            Self::Found(list) if list.is_empty() => LookupStatus::NoMatches,
            Self::Found(list) => LookupStatus::Found(list.len()),
            Self::Unavailable(_) => LookupStatus::Unavailable,
        }
    }

    /// Collapse to a plain list: an unreachable service reads as "nothing nearby".
    pub fn into_facilities(self) -> Vec<Facility> {
        match self {
            Self::Found(list) => list,
            Self::Unavailable(_) => Vec::new(),
        }
    }
}

/// Search around `at` and attach distances, nearest first.
pub fn find_nearby(
    source: &dyn FacilitySource,
    at: Coordinates,
    category: FacilityCategory,
    radius_meters: u32,
) -> FacilityLookup {
    match source.search(at, category, radius_meters) {
        Ok(pois) => {
            let mut facilities: Vec<Facility> = pois
                .into_iter()
                .filter(|p| p.coordinates.is_valid())
                .map(|p| Facility::from_poi(p, at))
                .collect();
            facilities.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
            tracing::debug!(%category, count = facilities.len(), "Facility lookup complete");
            FacilityLookup::Found(facilities)
        }
        Err(e) => {
            tracing::warn!(%category, error = %e, "Facility lookup failed; reporting none nearby");
            FacilityLookup::Unavailable(e)
        }
    }
}

/// Overpass QL for every node/way/relation tagged with the category's amenity.
pub fn build_overpass_query(at: Coordinates, category: FacilityCategory, radius_meters: u32) -> String {
    let around = format!("(around:{},{},{})", radius_meters, at.lat, at.lon);
    let amenity = category.as_str();
    format!(
        "[out:json];\n(\n  node[\"amenity\"=\"{amenity}\"]{around};\n  way[\"amenity\"=\"{amenity}\"]{around};\n  relation[\"amenity\"=\"{amenity}\"]{around};\n);\nout center;"
    )
}

/// Overpass API interpreter client.
pub struct OverpassClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OverpassClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, LocationError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(user_agent)?,
        })
    }
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    /// Present on ways and relations when queried with `out center`.
    center: Option<Coordinates>,
    #[serde(default)]
    tags: OverpassTags,
}

#[derive(Deserialize, Default)]
struct OverpassTags {
    name: Option<String>,
}

impl OverpassElement {
    /// Elements without a position are dropped.
    fn into_poi(self, category: FacilityCategory) -> Option<PointOfInterest> {
        let coordinates = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Coordinates::new(lat, lon),
            (_, _, Some(center)) => center,
            _ => return None,
        };
        let name = self
            .tags
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Some(PointOfInterest {
            category,
            name,
            coordinates,
        })
    }
}

fn elements_to_pois(response: OverpassResponse, category: FacilityCategory) -> Vec<PointOfInterest> {
    response
        .elements
        .into_iter()
        .filter_map(|e| e.into_poi(category))
        .collect()
}

impl FacilitySource for OverpassClient {
    fn search(
        &self,
        at: Coordinates,
        category: FacilityCategory,
        radius_meters: u32,
    ) -> Result<Vec<PointOfInterest>, LocationError> {
        let query = build_overpass_query(at, category, radius_meters);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("data", query.as_str())])
            .send()
            .map_err(|e| map_transport_error(e, &self.base_url))?;

        let parsed: OverpassResponse = read_json(response)?;
        Ok(elements_to_pois(parsed, category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::mock::MockFacilitySource;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type":"node","id":1,"lat":0.0,"lon":0.02,"tags":{"amenity":"hospital","name":"North Clinic"}},
            {"type":"way","id":2,"center":{"lat":0.0,"lon":0.01},"tags":{"amenity":"hospital","name":"  "}},
            {"type":"relation","id":3,"tags":{"amenity":"hospital","name":"Nowhere General"}},
            {"type":"node","id":4,"lat":0.0,"lon":0.05}
        ]
    }"#;

    #[test]
    fn parses_nodes_and_centers_and_drops_positionless() {
        let response: OverpassResponse = serde_json::from_str(SAMPLE).unwrap();
        let pois = elements_to_pois(response, FacilityCategory::Hospital);
        assert_eq!(pois.len(), 3);
        assert_eq!(pois[0].name.as_deref(), Some("North Clinic"));
        assert_eq!(pois[1].coordinates, Coordinates::new(0.0, 0.01));
        assert_eq!(pois[1].name, None);
        assert_eq!(pois[2].name, None);
    }

    #[test]
    fn query_targets_all_element_kinds() {
        let q = build_overpass_query(Coordinates::new(51.5, -0.12), FacilityCategory::Pharmacy, 5000);
        assert!(q.starts_with("[out:json];"));
        assert!(q.contains("node[\"amenity\"=\"pharmacy\"](around:5000,51.5,-0.12);"));
        assert!(q.contains("way[\"amenity\"=\"pharmacy\"]"));
        assert!(q.contains("relation[\"amenity\"=\"pharmacy\"]"));
        assert!(q.ends_with("out center;"));
    }

    #[test]
    fn find_nearby_sorts_by_distance() {
        let source = MockFacilitySource::new().with(
            FacilityCategory::Hospital,
            Ok(vec![
                poi(FacilityCategory::Hospital, Some("Far"), 0.0, 0.05),
                poi(FacilityCategory::Hospital, Some("Near"), 0.0, 0.01),
            ]),
        );
        let lookup = find_nearby(&source, Coordinates::new(0.0, 0.0), FacilityCategory::Hospital, 5000);
        assert_eq!(lookup.status(), LookupStatus::Found(2));
        let list = lookup.into_facilities();
        assert_eq!(list[0].display_name(), "Near");
        assert!((list[0].distance_km - 1.112).abs() < 0.01);
        assert!(list[0].distance_km < list[1].distance_km);
    }

    #[test]
    fn failure_and_no_matches_collapse_to_empty() {
        let failing = MockFacilitySource::new().with(
            FacilityCategory::Pharmacy,
            Err(LocationError::Connection("http://overpass".into())),
        );
        let lookup = find_nearby(&failing, Coordinates::new(0.0, 0.0), FacilityCategory::Pharmacy, 5000);
        assert_eq!(lookup.status(), LookupStatus::Unavailable);
        assert!(lookup.into_facilities().is_empty());

        let empty = MockFacilitySource::new().with(FacilityCategory::Pharmacy, Ok(vec![]));
        let lookup = find_nearby(&empty, Coordinates::new(0.0, 0.0), FacilityCategory::Pharmacy, 5000);
        assert_eq!(lookup.status(), LookupStatus::NoMatches);
        assert!(lookup.into_facilities().is_empty());
    }

    #[test]
    fn unnamed_facility_uses_category_label() {
        let f = Facility::from_poi(
            poi(FacilityCategory::Pharmacy, None, 1.0, 1.0),
            Coordinates::new(1.0, 1.0),
        );
        assert_eq!(f.display_name(), "Pharmacy");
        assert_eq!(f.distance_km, 0.0);
    }

    fn poi(category: FacilityCategory, name: Option<&str>, lat: f64, lon: f64) -> PointOfInterest {
        PointOfInterest {
            category,
            name: name.map(String::from),
            coordinates: Coordinates::new(lat, lon),
        }
    }
}

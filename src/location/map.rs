use serde::Serialize;

use super::facilities::Facility;
use super::geo::Coordinates;

pub const DEFAULT_ZOOM: u8 = 13;
pub const USER_MARKER_LABEL: &str = "Your Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    User,
    Hospital,
    Pharmacy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub kind: MarkerKind,
    pub label: String,
    pub position: Coordinates,
}

/// Map centred on the user, with one marker per facility found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    pub fn new(user: Coordinates, hospitals: &[Facility], pharmacies: &[Facility]) -> Self {
        let mut markers = Vec::with_capacity(1 + hospitals.len() + pharmacies.len());
        markers.push(MapMarker {
            kind: MarkerKind::User,
            label: USER_MARKER_LABEL.to_string(),
            position: user,
        });
        markers.extend(hospitals.iter().map(|f| facility_marker(MarkerKind::Hospital, f)));
        markers.extend(pharmacies.iter().map(|f| facility_marker(MarkerKind::Pharmacy, f)));

        Self {
            center: user,
            zoom: DEFAULT_ZOOM,
            markers,
        }
    }
}

fn facility_marker(kind: MarkerKind, facility: &Facility) -> MapMarker {
    MapMarker {
        kind,
        label: facility.display_name().to_string(),
        position: facility.coordinates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FacilityCategory;

    fn facility(category: FacilityCategory, name: Option<&str>, lon: f64) -> Facility {
        Facility {
            category,
            name: name.map(String::from),
            coordinates: Coordinates::new(0.0, lon),
            distance_km: lon * 111.0,
        }
    }

    #[test]
    fn user_marker_first_then_every_facility() {
        let user = Coordinates::new(0.0, 0.0);
        let hospitals = vec![facility(FacilityCategory::Hospital, Some("St. Mary"), 0.01)];
        let pharmacies = vec![
            facility(FacilityCategory::Pharmacy, None, 0.02),
            facility(FacilityCategory::Pharmacy, Some("Corner Chemist"), 0.03),
        ];

        let view = MapView::new(user, &hospitals, &pharmacies);
        assert_eq!(view.center, user);
        assert_eq!(view.zoom, 13);
        assert_eq!(view.markers.len(), 4);
        assert_eq!(view.markers[0].kind, MarkerKind::User);
        assert_eq!(view.markers[0].label, "Your Location");
        assert_eq!(view.markers[1].label, "St. Mary");
        assert_eq!(view.markers[2].label, "Pharmacy");
        assert_eq!(view.markers[3].kind, MarkerKind::Pharmacy);
    }

    #[test]
    fn marker_kind_serializes_snake_case() {
        let json = serde_json::to_value(MarkerKind::Hospital).unwrap();
        assert_eq!(json, "hospital");
    }
}

use serde::Deserialize;

use super::geo::Coordinates;
use super::{http_client, map_transport_error, read_json, LocationError};

/// Free-text address to coordinates.
pub trait Geocoder: Send + Sync {
    /// First match for `address`, or `None` when the service knows no such place.
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, LocationError>;
}

/// OpenStreetMap Nominatim search client.
pub struct NominatimClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, LocationError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(user_agent)?,
        })
    }
}

#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

fn first_match(places: Vec<NominatimPlace>) -> Result<Option<Coordinates>, LocationError> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let parse = |field: &str, raw: &str| {
        raw.trim().parse::<f64>().map_err(|_| {
            LocationError::ResponseParsing(format!("invalid {field} value '{raw}'"))
        })
    };
    let coords = Coordinates::new(parse("lat", &place.lat)?, parse("lon", &place.lon)?);
    if !coords.is_valid() {
        return Err(LocationError::ResponseParsing(format!(
            "coordinates out of range: {}, {}",
            coords.lat, coords.lon
        )));
    }
    Ok(Some(coords))
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, LocationError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .map_err(|e| map_transport_error(e, &self.base_url))?;

        let places: Vec<NominatimPlace> = read_json(response)?;
        first_match(places)
    }
}

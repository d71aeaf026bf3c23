//! Location services: geocoding the user's address, finding nearby
//! facilities, and the map view built from them.
//!
//! External services are reached through the [`Geocoder`] and
//! [`FacilitySource`] traits. Their errors stay visible inside this module for
//! logging; the consultation view only sees coordinates or their absence, and
//! facility lists that may be empty.

pub mod facilities;
pub mod geo;
pub mod geocoding;
pub mod locator;
pub mod map;
#[cfg(test)]
pub mod mock;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use facilities::{
    find_nearby, Facility, FacilityLookup, FacilitySource, LookupStatus, OverpassClient,
    PointOfInterest,
};
pub use geo::{great_circle_km, Coordinates};
pub use geocoding::{Geocoder, NominatimClient};
pub use locator::{locate, GeocodeStatus, LocationResult, DISPLAY_LIMIT};
pub use map::{MapMarker, MapView, MarkerKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location service is not reachable at {0}")]
    Connection(String),

    #[error("Location service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

pub(crate) fn http_client(user_agent: &str) -> Result<reqwest::blocking::Client, LocationError> {
    reqwest::blocking::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| LocationError::HttpClient(e.to_string()))
}

pub(crate) fn map_transport_error(err: reqwest::Error, base_url: &str) -> LocationError {
    if err.is_connect() {
        LocationError::Connection(base_url.to_string())
    } else if err.is_timeout() {
        LocationError::HttpClient("Request timed out".into())
    } else {
        // The query string carries the user's address.
        LocationError::HttpClient(err.without_url().to_string())
    }
}

pub(crate) fn read_json<R: DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<R, LocationError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(LocationError::Service {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .map_err(|e| LocationError::ResponseParsing(e.without_url().to_string()))
}

//! HTTP detail sources.
//!
//! Thin reqwest clients for the external place-data services. The engine
//! treats them as opaque asynchronous sources returning typed results or
//! failures; callers decide retry policy (the preloader retries only at
//! the next natural trigger).

use crate::catalog::Landmark;
use crate::preload::{DetailSource, FetchError, LandmarkDetails, StreetViewPano};
use reqwest::StatusCode;

/// Place-details response (simplified).
#[derive(Debug, serde::Deserialize)]
struct PlaceResponse {
    result: Option<PlaceResult>,
    status: String,
}

#[allow(dead_code)]
#[derive(Debug, serde::Deserialize)]
struct PlaceResult {
    name: String,
    rating: Option<f32>,
    photos: Option<Vec<PlacePhoto>>,
    opening_hours: Option<PlaceHours>,
    formatted_address: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

#[derive(Debug, serde::Deserialize)]
struct PlaceHours {
    weekday_text: Option<Vec<String>>,
}

/// Fetches place details over HTTP.
pub struct PlaceDetailsSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlaceDetailsSource {
    /// Create a source against the given API base URL.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn build_url(&self, landmark: &Landmark) -> String {
        match &landmark.place_id {
            Some(place_id) => format!(
                "{}/details/json?place_id={}&key={}",
                self.base_url, place_id, self.api_key
            ),
            None => format!(
                "{}/findplacefromtext/json?input={}&locationbias=point:{},{}&key={}",
                self.base_url,
                landmark.name,
                landmark.coordinates.latitude,
                landmark.coordinates.longitude,
                self.api_key
            ),
        }
    }

    fn photo_url(&self, reference: &str) -> String {
        format!(
            "{}/photo?maxwidth=800&photo_reference={}&key={}",
            self.base_url, reference, self.api_key
        )
    }
}

impl DetailSource<LandmarkDetails> for PlaceDetailsSource {
    async fn fetch(&self, landmark: &Landmark) -> Result<LandmarkDetails, FetchError> {
        let url = self.build_url(landmark);
        tracing::debug!(id = %landmark.id, "Fetching place details");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(FetchError::RateLimited),
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound),
            status if !status.is_success() => {
                return Err(FetchError::Network(format!("status {status}")));
            }
            _ => {}
        }

        let body: PlaceResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if body.status == "OVER_QUERY_LIMIT" {
            return Err(FetchError::RateLimited);
        }
        let result = match body.result {
            Some(result) if body.status == "OK" => result,
            _ => return Err(FetchError::NotFound),
        };

        Ok(LandmarkDetails {
            name: result.name,
            rating: result.rating,
            photo_urls: result
                .photos
                .unwrap_or_default()
                .iter()
                .map(|p| self.photo_url(&p.photo_reference))
                .collect(),
            opening_hours: result
                .opening_hours
                .and_then(|h| h.weekday_text)
                .unwrap_or_default(),
            formatted_address: result.formatted_address,
        })
    }
}

/// Street-view metadata response (simplified).
#[allow(dead_code)]
#[derive(Debug, serde::Deserialize)]
struct PanoResponse {
    status: String,
    pano_id: Option<String>,
}

/// Fetches street-view panorama metadata over HTTP.
pub struct StreetViewSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Requested panorama dimensions
    width: u32,
    height: u32,
}

impl StreetViewSource {
    /// Create a source against the given API base URL.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            width: 640,
            height: 400,
        }
    }

    fn metadata_url(&self, landmark: &Landmark) -> String {
        format!(
            "{}/metadata?location={},{}&key={}",
            self.base_url,
            landmark.coordinates.latitude,
            landmark.coordinates.longitude,
            self.api_key
        )
    }

    fn image_url(&self, landmark: &Landmark) -> String {
        format!(
            "{}?size={}x{}&location={},{}&key={}",
            self.base_url,
            self.width,
            self.height,
            landmark.coordinates.latitude,
            landmark.coordinates.longitude,
            self.api_key
        )
    }
}

impl DetailSource<StreetViewPano> for StreetViewSource {
    async fn fetch(&self, landmark: &Landmark) -> Result<StreetViewPano, FetchError> {
        let url = self.metadata_url(landmark);
        tracing::debug!(id = %landmark.id, "Fetching street-view metadata");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(FetchError::Network(format!("status {}", response.status())));
        }

        let body: PanoResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        match (body.status.as_str(), body.pano_id) {
            ("OK", Some(pano_id)) => Ok(StreetViewPano {
                pano_id,
                image_url: self.image_url(landmark),
                width: self.width,
                height: self.height,
            }),
            ("ZERO_RESULTS", _) => Err(FetchError::NotFound),
            (other, _) => Err(FetchError::Network(format!("metadata status {other}"))),
        }
    }
}

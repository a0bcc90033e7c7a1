//! Auxiliary preloaders.
//!
//! Zone entries trigger best-effort pre-fetching of detail content (place
//! details, street-view panoramas) so it is already cached when the user
//! opens a card. Lookup order is memory, then the persistent offline
//! store, then the network with write-through to both.

pub mod cache;
pub mod preloader;
pub mod sources;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export main types
pub use cache::MemoryCache;
pub use preloader::Preloader;
pub use sources::{PlaceDetailsSource, StreetViewSource};

/// Typed failures from external detail sources.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The place has no record at the source
    #[error("no record for place")]
    NotFound,

    /// The source rate-limited us
    #[error("rate limited by source")]
    RateLimited,

    /// Network-level failure
    #[error("network error: {0}")]
    Network(String),
}

/// Detail payload fetched for a landmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkDetails {
    /// Name as known by the data source
    pub name: String,
    /// Aggregate rating
    pub rating: Option<f32>,
    /// Photo URLs
    pub photo_urls: Vec<String>,
    /// Opening hours lines, if published
    pub opening_hours: Vec<String>,
    /// Formatted street address
    pub formatted_address: Option<String>,
}

/// Street-view panorama metadata.
///
/// Metadata only; the image bytes themselves are fetched by the shell
/// from `image_url` when a panorama is actually shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreetViewPano {
    /// Panorama identifier
    pub pano_id: String,
    /// Resolved static image URL
    pub image_url: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

/// An asynchronous source of detail payloads.
pub trait DetailSource<T>: Send + Sync {
    /// Fetch the payload for a landmark.
    fn fetch(
        &self,
        landmark: &crate::catalog::Landmark,
    ) -> impl std::future::Future<Output = Result<T, FetchError>> + Send;
}

/// Object-safe face of a preloader, for the session wiring.
///
/// Lets the session drive differently typed preloaders (place details,
/// street-view) through one seam.
pub trait PreloadTarget: Send + Sync {
    /// Update the set of landmark ids still worth caching for.
    fn set_relevant(&self, ids: std::collections::HashSet<String>);

    /// Warm caches for one landmark, best-effort.
    fn warm<'a>(&'a self, landmark: &'a crate::catalog::Landmark)
        -> futures::future::BoxFuture<'a, ()>;
}

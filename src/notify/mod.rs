//! Notification coordination.
//!
//! Consumes zone-transition events and decides whether a user-visible
//! effect fires, enforcing a per-landmark cooldown window so the same
//! landmark cannot re-trigger while the user lingers nearby. The UI owns
//! all rendering; the coordinator only calls the surface seams below.

pub mod cooldown;
pub mod coordinator;

use crate::catalog::Landmark;
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Re-export main types
pub use cooldown::CooldownTable;
pub use coordinator::NotificationCoordinator;

/// Visual weight of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    /// Neutral informational toast
    Info,
    /// Prominent proximity alert
    Highlight,
    /// Transient error surfaced to the user
    Error,
}

/// Marker highlight style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightStyle {
    /// The single closest landmark
    Closest,
    /// A landmark the user just came near
    Nearby,
    /// Back to the default marker style
    None,
}

/// Notification rendering seam, owned by the UI shell.
pub trait NotificationSurface: Send + Sync {
    /// Show a toast message.
    fn show_toast(&self, message: &str, variant: ToastVariant, duration: Duration);

    /// Show a floating landmark card.
    fn show_card(&self, landmark: &Landmark);

    /// Play the proximity chime.
    fn play_chime(&self);
}

/// Map rendering seam, owned by the external map-tile engine.
pub trait MapSurface: Send + Sync {
    /// Place a marker for a landmark.
    fn add_marker(&self, id: &str, coordinates: Coordinates);

    /// Remove a landmark's marker.
    fn remove_marker(&self, id: &str);

    /// Change a marker's highlight style.
    fn highlight(&self, id: &str, style: HighlightStyle);
}

/// Coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Cooldown window per landmark key, in seconds
    pub cooldown_secs: u64,
    /// Play a chime on inner-zone alerts
    pub chime_on_inner: bool,
    /// How long proximity toasts stay visible, in seconds
    pub toast_duration_secs: u64,
    /// Cards waiting behind the active one before new ones are dropped
    pub max_queued_cards: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 600,
            chime_on_inner: true,
            toast_duration_secs: 6,
            max_queued_cards: 3,
        }
    }
}

impl NotifyConfig {
    /// Cooldown window as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Toast display duration.
    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }
}

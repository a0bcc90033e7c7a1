//! Maps proximity events to user-visible effects.

use crate::catalog::Landmark;
use crate::notify::{
    CooldownTable, HighlightStyle, MapSurface, NotificationSurface, NotifyConfig, ToastVariant,
};
use crate::proximity::{ProximityEvent, Zone};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Decides whether and how a zone transition reaches the user.
///
/// Single writer of the cooldown table and card queue; all mutation
/// happens on the session task that calls [`handle_event`].
///
/// [`handle_event`]: NotificationCoordinator::handle_event
pub struct NotificationCoordinator {
    config: NotifyConfig,
    surface: Arc<dyn NotificationSurface>,
    map: Arc<dyn MapSurface>,
    cooldowns: CooldownTable,
    /// Landmark id behind the card currently on screen
    active_card: Option<String>,
    /// Cards waiting for the active one to be dismissed
    card_queue: VecDeque<Landmark>,
    /// Marker id currently highlighted as closest
    highlighted: Option<String>,
    /// Preload requests for landmarks worth pre-fetching
    preload_tx: Option<mpsc::UnboundedSender<Landmark>>,
}

impl NotificationCoordinator {
    /// Create a coordinator bound to its surfaces.
    pub fn new(
        config: NotifyConfig,
        surface: Arc<dyn NotificationSurface>,
        map: Arc<dyn MapSurface>,
    ) -> Self {
        let cooldowns = CooldownTable::new(config.cooldown());
        Self {
            config,
            surface,
            map,
            cooldowns,
            active_card: None,
            card_queue: VecDeque::new(),
            highlighted: None,
            preload_tx: None,
        }
    }

    /// Get a receiver for preload requests.
    ///
    /// Inner and card zone entries enqueue their landmark here so the
    /// session can hand them to a preloader, fire-and-forget.
    pub fn preload_requests(&mut self) -> mpsc::UnboundedReceiver<Landmark> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.preload_tx = Some(tx);
        rx
    }

    /// React to one proximity event.
    pub fn handle_event(&mut self, event: &ProximityEvent) {
        self.handle_event_at(event, Instant::now());
    }

    /// React to one proximity event at an explicit time (test seam).
    pub fn handle_event_at(&mut self, event: &ProximityEvent, now: Instant) {
        match event {
            ProximityEvent::ClosestChanged { landmark, .. } => {
                if let Some(previous) = self.highlighted.take() {
                    self.map.highlight(&previous, HighlightStyle::None);
                }
                self.map.highlight(&landmark.id, HighlightStyle::Closest);
                self.highlighted = Some(landmark.id.clone());
            }
            ProximityEvent::ClosestLost => {
                if let Some(previous) = self.highlighted.take() {
                    self.map.highlight(&previous, HighlightStyle::None);
                }
            }
            ProximityEvent::ZoneEntered {
                landmark,
                zone,
                distance_m,
            } => {
                self.on_zone_enter(landmark, *zone, *distance_m, now);
            }
            ProximityEvent::ZoneExited { landmark } => {
                // Leaving past the outer boundary re-arms the landmark
                // for both notification kinds.
                self.cooldowns.clear(&Self::alert_key(landmark));
                self.cooldowns.clear(&Self::card_key(landmark));
                self.card_queue.retain(|queued| queued.id != landmark.id);
            }
        }
    }

    /// Cooldown key for prominent inner-zone alerts.
    fn alert_key(landmark: &Landmark) -> String {
        format!("alert:{}", landmark.notify_key())
    }

    /// Cooldown key for card/toast notifications.
    fn card_key(landmark: &Landmark) -> String {
        format!("card:{}", landmark.notify_key())
    }

    fn on_zone_enter(&mut self, landmark: &Landmark, zone: Zone, distance_m: f64, now: Instant) {
        // The same landmark may fire one alert and one card inside a
        // window, but never two of the same kind.
        let cooldown_key = match zone {
            Zone::Inner => Self::alert_key(landmark),
            Zone::Outer | Zone::Card => Self::card_key(landmark),
            Zone::Far => return,
        };
        if !self.cooldowns.check_and_arm(&cooldown_key, now) {
            tracing::debug!(key = %cooldown_key, %zone, "Zone entry suppressed by cooldown");
            return;
        }

        match zone {
            Zone::Inner => {
                tracing::info!(name = %landmark.name, distance_m, "Inner zone alert");
                self.surface.show_toast(
                    &format!("You are right next to {}", landmark.name),
                    ToastVariant::Highlight,
                    self.config.toast_duration(),
                );
                if self.config.chime_on_inner {
                    self.surface.play_chime();
                }
                self.map.highlight(&landmark.id, HighlightStyle::Nearby);
                self.request_preload(landmark);
            }
            Zone::Outer | Zone::Card => {
                self.show_or_queue_card(landmark);
                if zone == Zone::Card {
                    self.request_preload(landmark);
                }
            }
            Zone::Far => {}
        }
    }

    /// Show a card, or queue it behind the one on screen.
    ///
    /// A newly eligible landmark never preempts the active card; it waits
    /// for dismissal.
    fn show_or_queue_card(&mut self, landmark: &Landmark) {
        if self.active_card.is_some() {
            if self.card_queue.len() >= self.config.max_queued_cards {
                tracing::debug!(name = %landmark.name, "Card queue full, dropping");
                return;
            }
            self.card_queue.push_back(landmark.clone());
            return;
        }

        self.active_card = Some(landmark.id.clone());
        self.surface.show_card(landmark);
    }

    /// The UI dismissed the active card; show the next queued one.
    pub fn card_dismissed(&mut self) {
        self.active_card = None;
        if let Some(next) = self.card_queue.pop_front() {
            self.active_card = Some(next.id.clone());
            self.surface.show_card(&next);
        }
    }

    /// Drop expired cooldown entries. Driven by the session's fixed
    /// maintenance timer.
    pub fn prune_cooldowns(&mut self) {
        self.cooldowns.prune(Instant::now());
    }

    /// Number of live cooldown entries.
    pub fn cooldown_count(&self) -> usize {
        self.cooldowns.len()
    }

    fn request_preload(&self, landmark: &Landmark) {
        if let Some(tx) = &self.preload_tx {
            if tx.send(landmark.clone()).is_err() {
                tracing::debug!("Preload channel closed, skipping request");
            }
        }
    }
}

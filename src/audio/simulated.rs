//! Clock-driven media backend
//!
//! Plays nothing audible. Each loaded URL is treated as a track of fixed
//! length whose position advances with wall-clock time while playing. Lets
//! the terminal front end exercise the whole player without a decoder.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{MediaBackend, MediaEvent, ReadyState, Slot};

#[derive(Debug, Clone)]
struct Element {
    url: String,
    loaded_at: Instant,
}

/// Media backend driven by a monotonic clock
#[derive(Debug)]
pub struct SimulatedBackend {
    slots: HashMap<Slot, Element>,
    track_length: f64,
    load_latency: Duration,
    volume: f32,
    /// Position at the last play/pause/seek
    base_position: f64,
    /// Set while playing
    started_at: Option<Instant>,
    last_reported: Option<f64>,
    ended_reported: bool,
}

impl SimulatedBackend {
    pub fn new(track_length: Duration) -> Self {
        Self {
            slots: HashMap::new(),
            track_length: track_length.as_secs_f64().max(1.0),
            load_latency: Duration::from_millis(300),
            volume: 1.0,
            base_position: 0.0,
            started_at: None,
            last_reported: None,
            ended_reported: false,
        }
    }

    /// Time before a loaded slot reports `HaveEnoughData`
    pub fn with_load_latency(mut self, latency: Duration) -> Self {
        self.load_latency = latency;
        self
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn reset_clock(&mut self) {
        self.base_position = 0.0;
        self.started_at = None;
        self.last_reported = None;
        self.ended_reported = false;
    }
}

impl MediaBackend for SimulatedBackend {
    fn load(&mut self, slot: Slot, url: &str) {
        tracing::debug!("Simulated load {:?}: {}", slot, url);
        self.slots.insert(
            slot,
            Element {
                url: url.to_string(),
                loaded_at: Instant::now(),
            },
        );
        if slot == Slot::Current {
            self.reset_clock();
        }
    }

    fn clear(&mut self, slot: Slot) {
        self.slots.remove(&slot);
        if slot == Slot::Current {
            self.reset_clock();
        }
    }

    fn source(&self, slot: Slot) -> Option<String> {
        self.slots.get(&slot).map(|e| e.url.clone())
    }

    fn ready_state(&self, slot: Slot) -> ReadyState {
        match self.slots.get(&slot) {
            None => ReadyState::HaveNothing,
            Some(element) if element.loaded_at.elapsed() >= self.load_latency => {
                ReadyState::HaveEnoughData
            }
            Some(_) => ReadyState::HaveMetadata,
        }
    }

    fn promote(&mut self, slot: Slot) -> bool {
        if slot == Slot::Current {
            return self.slots.contains_key(&Slot::Current);
        }
        let Some(element) = self.slots.remove(&slot) else {
            return false;
        };
        self.slots.insert(Slot::Current, element);
        self.reset_clock();
        true
    }

    fn play(&mut self) {
        if self.started_at.is_none() && self.slots.contains_key(&Slot::Current) {
            self.started_at = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.base_position = self.position();
        self.started_at = None;
    }

    fn is_paused(&self) -> bool {
        self.started_at.is_none()
    }

    fn seek(&mut self, position: f64) {
        self.base_position = position.clamp(0.0, self.track_length);
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
        self.ended_reported = false;
    }

    fn position(&self) -> f64 {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (self.base_position + elapsed).min(self.track_length)
    }

    fn duration(&self) -> Option<f64> {
        self.slots
            .contains_key(&Slot::Current)
            .then_some(self.track_length)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        if !self.slots.contains_key(&Slot::Current) {
            return Vec::new();
        }
        let mut events = Vec::new();
        let position = self.position();
        if self.last_reported != Some(position) {
            self.last_reported = Some(position);
            events.push(MediaEvent::TimeUpdate(position));
        }
        if position >= self.track_length && !self.ended_reported {
            self.ended_reported = true;
            self.base_position = self.track_length;
            self.started_at = None;
            events.push(MediaEvent::Ended);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_moves_lookahead() {
        let mut backend =
            SimulatedBackend::new(Duration::from_secs(10)).with_load_latency(Duration::ZERO);
        backend.load(Slot::Current, "a");
        backend.load(Slot::Next, "b");
        assert_eq!(backend.ready_state(Slot::Next), ReadyState::HaveEnoughData);

        assert!(backend.promote(Slot::Next));
        assert_eq!(backend.source(Slot::Current).as_deref(), Some("b"));
        assert_eq!(backend.source(Slot::Next), None);
        assert!(!backend.promote(Slot::Prev));
    }

    #[test]
    fn test_not_ready_before_latency() {
        let mut backend =
            SimulatedBackend::new(Duration::from_secs(10)).with_load_latency(Duration::from_secs(60));
        backend.load(Slot::Prev, "p");
        assert!(!backend.ready_state(Slot::Prev).can_play());
        assert_eq!(backend.ready_state(Slot::Next), ReadyState::HaveNothing);
    }

    #[test]
    fn test_seek_to_end_reports_ended_once() {
        let mut backend = SimulatedBackend::new(Duration::from_secs(5));
        backend.load(Slot::Current, "a");
        backend.play();
        backend.seek(5.0);
        let events = backend.poll_events();
        assert!(events.contains(&MediaEvent::Ended));
        assert!(backend.is_paused());
        assert!(!backend.poll_events().contains(&MediaEvent::Ended));
    }

    #[test]
    fn test_paused_position_is_stable() {
        let mut backend = SimulatedBackend::new(Duration::from_secs(100));
        backend.load(Slot::Current, "a");
        backend.seek(12.0);
        assert_eq!(backend.position(), 12.0);
        assert_eq!(backend.poll_events(), vec![MediaEvent::TimeUpdate(12.0)]);
        assert!(backend.poll_events().is_empty());
    }
}

//! Overlay id allocation.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clipdeck_core::{Overlay, OverlayId};

/// Source of wall-clock milliseconds for timestamp ids.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

impl<F> Clock for F
where
    F: Fn() -> u64 + Send + Sync,
{
    fn now_millis(&self) -> u64 {
        self()
    }
}

/// Hands out ids that are not present in the collection.
#[derive(Clone)]
pub struct IdAllocator {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for IdAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdAllocator").finish_non_exhaustive()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl IdAllocator {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Next numeric id: one past the largest numeric id in use.
    ///
    /// With no numeric ids (or an overflowing maximum) the current timestamp
    /// is used instead. The result is checked against `existing` and probed
    /// forward from the timestamp until free.
    pub fn next_id(&self, existing: &[Overlay]) -> OverlayId {
        let derived = existing
            .iter()
            .filter_map(|o| o.id.as_numeric())
            .max()
            .and_then(|max| max.checked_add(1));

        if let Some(candidate) = derived {
            let id = OverlayId::Numeric(candidate);
            if !is_taken(existing, &id) {
                return id;
            }
            tracing::warn!(%id, "derived id collides, falling back to timestamp");
        }
        self.timestamp_id(existing)
    }

    /// Id for an imported audio overlay.
    ///
    /// A source key becomes `audio-<key>` (prefixed once). Without a key, or
    /// when the keyed id is already taken, a `audio-<name>-<timestamp>` id is
    /// synthesized.
    pub fn audio_id(
        &self,
        source_key: Option<&str>,
        source_name: &str,
        existing: &[Overlay],
    ) -> OverlayId {
        if let Some(key) = source_key.filter(|k| !k.trim().is_empty()) {
            let id = OverlayId::audio(key);
            if !is_taken(existing, &id) {
                return id;
            }
            tracing::warn!(%id, "keyed audio id already in use");
        }
        let name = if source_name.trim().is_empty() {
            "sound"
        } else {
            source_name.trim()
        };
        let mut stamp = self.clock.now_millis();
        loop {
            let id = OverlayId::audio(&format!("{name}-{stamp}"));
            if !is_taken(existing, &id) {
                return id;
            }
            stamp = stamp.wrapping_add(1);
        }
    }

    fn timestamp_id(&self, existing: &[Overlay]) -> OverlayId {
        let mut stamp = self.clock.now_millis();
        loop {
            let id = OverlayId::Numeric(stamp);
            if !is_taken(existing, &id) {
                return id;
            }
            stamp = stamp.wrapping_add(1);
        }
    }
}

fn is_taken(existing: &[Overlay], id: &OverlayId) -> bool {
    existing.iter().any(|o| o.id.same_as(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdeck_core::{FrameSpan, OverlayKind};

    fn overlay(id: impl Into<OverlayId>) -> Overlay {
        Overlay::new(id, OverlayKind::Sound, FrameSpan::new(0, 30), 0)
    }

    fn fixed(ms: u64) -> IdAllocator {
        IdAllocator::new(move || ms)
    }

    #[test]
    fn test_max_plus_one() {
        let ids = fixed(1_000);
        let existing = vec![overlay(3u64), overlay("audio-x"), overlay(9u64)];
        assert_eq!(ids.next_id(&existing), OverlayId::Numeric(10));
    }

    #[test]
    fn test_timestamp_when_no_numeric_ids() {
        let ids = fixed(1_700_000_000_000);
        assert_eq!(ids.next_id(&[]), OverlayId::Numeric(1_700_000_000_000));
        assert_eq!(
            ids.next_id(&[overlay("audio-k")]),
            OverlayId::Numeric(1_700_000_000_000)
        );
    }

    #[test]
    fn test_overflow_probes_past_timestamp_collision() {
        let ids = fixed(5);
        let existing = vec![overlay(u64::MAX), overlay(5u64), overlay(6u64)];
        assert_eq!(ids.next_id(&existing), OverlayId::Numeric(7));
    }

    #[test]
    fn test_audio_id_from_key() {
        let ids = fixed(42);
        assert_eq!(
            ids.audio_id(Some("track1"), "Song", &[]),
            OverlayId::audio("track1")
        );
        assert_eq!(
            ids.audio_id(Some("audio-track1"), "Song", &[]),
            OverlayId::audio("track1")
        );
    }

    #[test]
    fn test_audio_id_synthesized() {
        let ids = fixed(42);
        assert_eq!(
            ids.audio_id(None, "Song", &[]),
            OverlayId::Keyed("audio-Song-42".into())
        );
        let taken = vec![overlay("audio-k"), overlay("audio-sound-42")];
        assert_eq!(
            ids.audio_id(Some("k"), "", &taken),
            OverlayId::Keyed("audio-sound-43".into())
        );
    }
}

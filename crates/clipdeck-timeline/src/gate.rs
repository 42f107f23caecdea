//! Update-source gate.
//!
//! While the timeline widget's batch of track changes is being reconciled
//! into the store, the store must not project back into the widget and
//! per-item move/resize events must not land. The gate records which of the
//! two states the timeline is in and is shared by every clone.
//!
//! Each batch gets a generation number. A forced [`UpdateSourceGate::release`]
//! retires the current generation, so a guard outliving it can neither
//! reopen the gate under a newer batch nor count as holding it.

use std::sync::Arc;

use clipdeck_core::{ClipDeckError, Result};
use parking_lot::Mutex;

/// Who is currently allowed to write overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    ApplyingBatchFromTrackEdit,
}

#[derive(Debug, Default)]
struct GateInner {
    state: GateState,
    generation: u64,
}

/// Shared gate for one timeline instance.
#[derive(Debug, Clone, Default)]
pub struct UpdateSourceGate {
    inner: Arc<Mutex<GateInner>>,
}

impl UpdateSourceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.inner.lock().state
    }

    pub fn is_idle(&self) -> bool {
        self.state() == GateState::Idle
    }

    /// Enter batch reconciliation.
    ///
    /// The returned guard puts the gate back to idle when dropped, including
    /// on early return or unwinding.
    pub fn begin_batch(&self) -> Result<BatchGuard> {
        let mut inner = self.inner.lock();
        if inner.state != GateState::Idle {
            return Err(ClipDeckError::BatchInProgress);
        }
        inner.state = GateState::ApplyingBatchFromTrackEdit;
        inner.generation += 1;
        tracing::debug!(generation = inner.generation, "update gate: applying batch from track edit");
        Ok(BatchGuard {
            gate: self.clone(),
            generation: inner.generation,
        })
    }

    /// Force the gate back to idle. Returns whether a batch was in progress.
    ///
    /// Pointer-up calls this so a lost guard can never leave the timeline
    /// stuck. The outstanding guard, if any, stops being current.
    pub fn release(&self) -> bool {
        let mut inner = self.inner.lock();
        let was_busy = inner.state != GateState::Idle;
        if was_busy {
            inner.generation += 1;
        }
        inner.state = GateState::Idle;
        was_busy
    }
}

/// Holds the gate in [`GateState::ApplyingBatchFromTrackEdit`].
#[derive(Debug)]
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct BatchGuard {
    gate: UpdateSourceGate,
    generation: u64,
}

impl BatchGuard {
    /// Whether this guard still owns the gate, i.e. nothing released it.
    pub fn is_current(&self) -> bool {
        let inner = self.gate.inner.lock();
        inner.generation == self.generation && inner.state != GateState::Idle
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let mut inner = self.gate.inner.lock();
        if inner.generation == self.generation {
            inner.state = GateState::Idle;
            tracing::debug!("update gate: idle");
        } else {
            tracing::debug!(
                generation = self.generation,
                current = inner.generation,
                "update gate: stale guard dropped"
            );
        }
    }
}

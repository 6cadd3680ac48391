//! Block-rate control bindings shared between the UI and audio threads.
//!
//! UI code registers parameter-bearing controls (sliders with attached
//! modulators, typically) at any time; the audio thread evaluates every
//! live control once per block. The two sides meet only in a short
//! critical section: the audio thread copies the current list of shared
//! handles under the lock and evaluates them after releasing it, so the
//! lock is never held for longer than a pointer-list copy. The copy may
//! be one registration stale, which is acceptable; blocking the audio
//! thread is not.

use std::sync::{Arc, Mutex, PoisonError};
use std::vec::Vec;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle to a registered control.
    pub struct ControlKey;
}

/// A control evaluated once per audio block.
///
/// `samples_in` is the block-start offset, forwarded to the control's
/// modulation sources.
pub trait BlockControl: Send + Sync {
    fn compute(&self, samples_in: usize);
}

/// Registry of live block-rate controls.
///
/// Shared as `Arc<ControlBank>`: the UI thread inserts and removes, the
/// audio thread calls [`compute_block`](Self::compute_block) with its
/// own scratch list.
#[derive(Default)]
pub struct ControlBank {
    controls: Mutex<SlotMap<ControlKey, Arc<dyn BlockControl>>>,
}

impl ControlBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control. UI thread.
    pub fn insert(&self, control: Arc<dyn BlockControl>) -> ControlKey {
        self.lock().insert(control)
    }

    /// Drop a control. UI thread.
    pub fn remove(&self, key: ControlKey) {
        self.lock().remove(key);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Evaluate every live control for this block. Audio thread.
    ///
    /// `scratch` is caller-owned so its capacity persists across blocks;
    /// after the first few blocks the copy allocates nothing.
    pub fn compute_block(&self, scratch: &mut Vec<Arc<dyn BlockControl>>, samples_in: usize) {
        {
            let controls = self.lock();
            scratch.clear();
            scratch.extend(controls.values().cloned());
        }
        for control in scratch.iter() {
            control.compute(samples_in);
        }
        scratch.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotMap<ControlKey, Arc<dyn BlockControl>>> {
        // A poisoned registry is still structurally sound; keep going.
        self.controls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Handle-based sample store.
//!
//! Each handle owns an append-only sequence of samples. Unknown handles are
//! tolerated everywhere: `append` and `destroy` ignore them and `compute`
//! answers with [`CalibrationResult::zeroed`].

use crate::{calibrate, Calibration, CalibrationConfig, CalibrationError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use spacecal_core::{CalibrationResult, Pose, Sample};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Opaque calibration context identifier.
///
/// Handles start at 1 and are never reused by the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(i32);

impl Handle {
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    last_handle: i32,
    contexts: HashMap<Handle, Vec<Sample>>,
}

/// Thread-safe map from handles to sample sequences.
///
/// Lookups, inserts and removals are serialized by one lock. `compute`
/// copies the samples out under the lock and calibrates without holding it.
#[derive(Debug, Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
    config: CalibrationConfig,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CalibrationConfig) -> Self {
        Self {
            state: Mutex::default(),
            config,
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Samples stay consistent even if a holder panicked mid-append.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate an empty context, or `None` once `i32::MAX` handles have
    /// been issued.
    pub fn try_create(&self) -> Option<Handle> {
        let mut state = self.lock();
        state.last_handle = state.last_handle.checked_add(1)?;
        let handle = Handle(state.last_handle);
        state.contexts.insert(handle, Vec::new());
        debug!("created calibration {handle}");
        Some(handle)
    }

    /// Allocate an empty context.
    ///
    /// # Panics
    ///
    /// Panics once `i32::MAX` handles have been issued.
    pub fn create(&self) -> Handle {
        self.try_create().expect("calibration handle space exhausted")
    }

    /// Drop a context and its samples. Unknown handles are ignored.
    pub fn destroy(&self, handle: Handle) {
        if self.lock().contexts.remove(&handle).is_some() {
            debug!("destroyed calibration {handle}");
        }
    }

    /// Append a sample. Unknown handles are ignored.
    pub fn append(&self, handle: Handle, reference: Pose, target: Pose) {
        self.push(handle, Sample::new(reference, target));
    }

    pub fn push(&self, handle: Handle, sample: Sample) {
        match self.lock().contexts.get_mut(&handle) {
            Some(samples) => samples.push(sample),
            None => debug!("sample for unknown calibration {handle} ignored"),
        }
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.lock().contexts.contains_key(&handle)
    }

    /// Number of stored samples, `None` for an unknown handle.
    pub fn len(&self, handle: Handle) -> Option<usize> {
        self.lock().contexts.get(&handle).map(Vec::len)
    }

    /// Copy of the stored samples, `None` for an unknown handle.
    pub fn samples(&self, handle: Handle) -> Option<Vec<Sample>> {
        self.lock().contexts.get(&handle).cloned()
    }

    /// Calibrate over all samples of `handle`, reporting every failure.
    pub fn try_compute(&self, handle: Handle) -> Result<Calibration, CalibrationError> {
        let samples = self
            .samples(handle)
            .ok_or(CalibrationError::UnknownHandle(handle))?;
        calibrate(&samples, &self.config)
    }

    /// Calibrate over all samples of `handle`.
    ///
    /// Returns the zeroed result for an unknown handle or when the samples do
    /// not determine a calibration; callers must not treat all-zero as valid.
    pub fn compute(&self, handle: Handle) -> CalibrationResult {
        match self.try_compute(handle) {
            Ok(calibration) => calibration.result,
            Err(CalibrationError::UnknownHandle(_)) => CalibrationResult::zeroed(),
            Err(err) => {
                warn!("calibration {handle} failed: {err}");
                CalibrationResult::zeroed()
            }
        }
    }
}

//! C ABI for tracker space calibration.
//!
//! Contexts are addressed by integer handles from one process-wide
//! registry. Unknown handles are ignored and compute to the all-zero result,
//! which callers must treat as "no calibration". The generated C header is
//! written to `include/spacecal.h` by cbindgen.
//!
//! Poses cross the boundary as 7 doubles `(x, y, z, qx, qy, qz, qw)`.

mod logger;

pub use logger::LogCallback;

use spacecal_core::{CalibrationResult, Pose, RESULT_LEN};
use spacecal_pipeline::{Handle, Registry};
use std::ffi::c_int;
use std::sync::LazyLock;

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Calibration result in C-compatible layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacecalResult {
    /// Translation [x, y, z] in the trackers' unit.
    pub translation: [f64; 3],
    /// Euler angles [x, y, z] in radians, applied Z then Y then X.
    pub euler: [f64; 3],
    /// Quaternion [qx, qy, qz, qw].
    pub quaternion: [f64; 4],
}

impl From<CalibrationResult> for SpacecalResult {
    fn from(r: CalibrationResult) -> Self {
        Self {
            translation: [r.tx, r.ty, r.tz],
            euler: [r.rex, r.rey, r.rez],
            quaternion: [r.rqx, r.rqy, r.rqz, r.rqw],
        }
    }
}

/// Create an empty calibration context.
/// Returns its handle (always positive), or 0 if no handle is left.
#[no_mangle]
pub extern "C" fn spacecal_create() -> c_int {
    REGISTRY.try_create().map_or(0, Handle::raw)
}

/// Destroy a calibration context. Unknown handles are ignored.
#[no_mangle]
pub extern "C" fn spacecal_destroy(handle: c_int) {
    REGISTRY.destroy(Handle::from_raw(handle));
}

/// Append one simultaneous pose pair.
///
/// Ignored if either pointer is null or the handle is unknown.
///
/// # Safety
/// `reference` and `target` must each point to 7 readable doubles, or be null.
#[no_mangle]
pub unsafe extern "C" fn spacecal_add_sample(
    handle: c_int,
    reference: *const f64,
    target: *const f64,
) {
    if reference.is_null() || target.is_null() {
        return;
    }
    let reference = Pose::from_array(reference.cast::<[f64; 7]>().read_unaligned());
    let target = Pose::from_array(target.cast::<[f64; 7]>().read_unaligned());
    REGISTRY.append(Handle::from_raw(handle), reference, target);
}

/// Calibrate over every sample of `handle` and write
/// `(tx, ty, tz, rex, rey, rez, rqx, rqy, rqz, rqw)` to `out`.
///
/// All ten values are zero for an unknown handle or insufficient data.
///
/// # Safety
/// `out` must point to 10 writable doubles, or be null.
#[no_mangle]
pub unsafe extern "C" fn spacecal_compute(handle: c_int, out: *mut f64) {
    if out.is_null() {
        return;
    }
    let result = REGISTRY.compute(Handle::from_raw(handle));
    out.cast::<[f64; RESULT_LEN]>().write_unaligned(result.to_array());
}

/// Same as [`spacecal_compute`], returned by value.
#[no_mangle]
pub extern "C" fn spacecal_compute_result(handle: c_int) -> SpacecalResult {
    REGISTRY.compute(Handle::from_raw(handle)).into()
}

/// Receive diagnostic lines such as the calibrated rotation and translation.
/// Pass NULL to stop.
#[no_mangle]
pub extern "C" fn spacecal_set_log_callback(callback: Option<LogCallback>) {
    logger::set_callback(callback);
}

//! Drift measurement between the timeline clock and a resource's play head.

use crate::clip::seek::SeekOutcome;

/// Where the resource should be, in media time, for a clip-local time.
///
/// The result wraps into `[0, length)`. Returns `None` while the length is
/// unknown (zero or negative) so callers never take a modulo by it.
pub fn expected_position(start_offset: f64, local_time: f64, length: f64) -> Option<f64> {
    if !(length > 0.0) {
        return None;
    }
    Some((start_offset + local_time).rem_euclid(length))
}

/// Signed drift of `current` against `expected`, in seconds.
///
/// An offset more negative than `-unwrap_ratio * length` means the resource
/// has looped past zero while the timeline has not; one length is added
/// back so that a wraparound is not mistaken for a huge lag.
pub fn measure_offset(current: f64, expected: f64, length: f64, unwrap_ratio: f64) -> f64 {
    let offset = current - expected;
    if length > 0.0 && offset < -length * unwrap_ratio {
        offset + length
    } else {
        offset
    }
}

/// Drift outside tolerance needs a corrective seek.
pub fn exceeds_tolerance(offset: f64, tolerance: f64) -> bool {
    offset.abs() > tolerance
}

/// A corrective seek issued during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftCorrection {
    /// Position the resource was sent to
    pub expected: f64,
    /// Drift measured before correcting
    pub offset: f64,
    /// Set when the correction waited for its seek
    pub outcome: Option<SeekOutcome>,
}

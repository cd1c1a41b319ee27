//! Landmark geometry
//!
//! Small pure helpers shared by the gesture classifiers and the
//! sit-to-stand detector. All inputs are normalized-coordinate landmarks.

use crate::types::Landmark;

/// Euclidean distance between two landmarks in the image plane.
pub fn distance(a: Landmark, b: Landmark) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Angle in degrees at vertex `b`, between the vectors (a - b) and (c - b).
///
/// If either vector has zero length the landmarks coincide and no angle is
/// defined; returns 180.0, treated as "fully extended", so downstream knee
/// checks never see a NaN.
pub fn angle_at_deg(a: Landmark, b: Landmark, c: Landmark) -> f64 {
    let ba = (a.x - b.x, a.y - b.y);
    let bc = (c.x - b.x, c.y - b.y);

    let denom = ba.0.hypot(ba.1) * bc.0.hypot(bc.1);
    if denom == 0.0 {
        return 180.0;
    }

    let cos_angle = ((ba.0 * bc.0 + ba.1 * bc.1) / denom).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

//! Angle wrapping helpers
//!
//! All joint math works on raw radians; these helpers keep angles on the
//! 2π-branch we care about. Both are total and idempotent for finite input.

use std::f32::consts::TAU;

/// Wrap an angle into [-π, π).
///
/// `wrap(wrap(x)) == wrap(x)` for all finite `x`.
pub fn wrap(theta: f32) -> f32 {
    theta - TAU * (theta / TAU + 0.5).floor()
}

/// Wrap an angle onto the 2π-branch nearest `center`.
///
/// Used to compare a joint's current angle against its rest angle without
/// a spurious full-turn offset, and to sign heading errors correctly.
pub fn wrap_about(theta: f32, center: f32) -> f32 {
    theta - TAU * ((theta - center) / TAU + 0.5).floor()
}

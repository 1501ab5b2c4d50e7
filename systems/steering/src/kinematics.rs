//! Angle conventions shared by rotation and translation.
//!
//! Headings are degrees in `[0, 360)`. A heading of 0 faces increasing
//! columns and 270 faces increasing rows, matching the forward vector
//! `(cos(-heading), sin(-heading))` on a grid whose rows grow downward.

use glam::DVec2;
use gridwalk_world::normalize_heading;

/// Heading that points from `from` towards `to`.
pub(crate) fn bearing(from: DVec2, to: DVec2) -> f64 {
    let offset = from - to;
    normalize_heading(90.0 + offset.x.atan2(offset.y).to_degrees())
}

/// Unsigned angle between two headings measured the short way round.
pub(crate) fn angular_difference(target: f64, heading: f64) -> f64 {
    let clockwise = (target - heading).rem_euclid(360.0);
    clockwise.min(360.0 - clockwise)
}

/// `1.0` when increasing the heading reaches `target` soonest, `-1.0` otherwise.
pub(crate) fn rotation_sign(heading: f64, target: f64) -> f64 {
    if (target - heading).rem_euclid(360.0) <= 180.0 {
        1.0
    } else {
        -1.0
    }
}

/// Unit vector a unit travels along when facing `heading`.
pub(crate) fn forward(heading: f64) -> DVec2 {
    let radians = (-heading).to_radians();
    DVec2::new(radians.cos(), radians.sin())
}

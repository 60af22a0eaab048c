//! Geometric feature extraction.
//!
//! Pure functions from detector output (normalized coordinates) to pixel
//! coordinates, centimeter distances, and joint angles. Degenerate inputs
//! produce `None`, never a panic: an absent angle is not the same thing as a
//! zero-degree angle, and the payload schema keeps the distinction.

use crate::detect::Landmark;

/// A landmark projected into integer pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Scale a normalized landmark to pixel coordinates.
///
/// Returns `None` when the detector hands back non-finite coordinates.
pub fn to_pixel(landmark: &Landmark, width: u32, height: u32) -> Option<PixelPoint> {
    if !landmark.x.is_finite() || !landmark.y.is_finite() {
        return None;
    }
    Some(PixelPoint {
        x: (landmark.x * width as f32) as i32,
        y: (landmark.y * height as f32) as i32,
    })
}

/// Euclidean pixel distance converted to centimeters.
///
/// The conversion constant is an uncalibrated approximation carried in the
/// configuration (default 37.8 px/cm). Returns `None` when the constant is
/// unusable rather than producing infinities.
pub fn distance_cm(a: PixelPoint, b: PixelPoint, px_per_cm: f64) -> Option<f64> {
    if !px_per_cm.is_finite() || px_per_cm <= 0.0 {
        return None;
    }
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    Some(dx.hypot(dy) / px_per_cm)
}

/// Angle in degrees at `vertex` between the rays toward `a` and `c`.
///
/// Computed with the dot-product/arccos formula, with the cosine clamped to
/// [-1, 1] against floating-point overshoot. Returns `None` when either ray
/// has zero length; zero is a legitimate angle and must stay distinguishable
/// from "undefined".
pub fn vertex_angle(a: PixelPoint, vertex: PixelPoint, c: PixelPoint) -> Option<f64> {
    let vax = f64::from(a.x - vertex.x);
    let vay = f64::from(a.y - vertex.y);
    let vcx = f64::from(c.x - vertex.x);
    let vcy = f64::from(c.y - vertex.y);

    let norm_a = vax.hypot(vay);
    let norm_c = vcx.hypot(vcy);
    if norm_a == 0.0 || norm_c == 0.0 {
        return None;
    }

    let cos = ((vax * vcx + vay * vcy) / (norm_a * norm_c)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

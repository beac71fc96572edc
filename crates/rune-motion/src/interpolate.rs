//! Interpolation for keyframe and binding values.
//!
//! Vectors interpolate component-wise. When two vectors differ in length the
//! result keeps the source length, and components past the shorter vector are
//! copied from the source unchanged.

use crate::definition::TrackValue;

/// Trait for types that can be interpolated between two values.
pub trait Interpolate: Sized {
    /// Interpolate between self and another value.
    ///
    /// When t = 0.0, returns self.
    /// When t = 1.0, returns to.
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

/// Linear interpolation helper.
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp(*self, *to, t)
    }
}

impl Interpolate for Vec<f64> {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self.iter()
            .enumerate()
            .map(|(i, from)| match to.get(i) {
                Some(to) => lerp(*from, *to, t),
                None => *from,
            })
            .collect()
    }
}

impl Interpolate for TrackValue {
    /// Both values must be of the same variant. If they differ, returns self unchanged.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Self::Scalar(from), Self::Scalar(to)) => Self::Scalar(from.interpolate(to, t)),
            (Self::Vector(from), Self::Vector(to)) => Self::Vector(from.interpolate(to, t)),
            _ => self.clone(),
        }
    }
}

//! Keyframe track evaluation.
//!
//! A [`KeyframeTrack`] is the runtime form of a
//! [`TrackDefinition`]: keyframes sorted by time plus the track easing.
//! Evaluating at a normalized time finds the bracketing keyframes, eases the
//! local progress between them and interpolates their values.

use crate::definition::{Keyframe, TrackDefinition, TrackValue};
use crate::easing::Easing;
use crate::interpolate::Interpolate;

/// Runtime state for a single keyframed value.
#[derive(Debug, Clone)]
pub struct KeyframeTrack {
    name: String,
    /// Keyframes sorted by time.
    keyframes: Vec<Keyframe>,
    easing: Easing,
}

impl KeyframeTrack {
    /// Build a track from its definition, sorting keyframes by time.
    pub fn new(definition: &TrackDefinition) -> Self {
        let mut keyframes = definition.keyframes.clone();
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));

        Self {
            name: definition.name.clone(),
            keyframes,
            easing: definition.easing.unwrap_or_default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Keyframes in ascending time order.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Value of the track at normalized time `t` (clamped to `[0, 1]`).
    ///
    /// An empty track evaluates to `0`; a single keyframe is constant.
    pub fn value_at(&self, t: f64) -> TrackValue {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return TrackValue::Scalar(0.0),
        };

        if self.keyframes.len() == 1 || t <= first.time {
            return first.value.clone();
        }
        if t >= last.time {
            return last.value.clone();
        }

        let Some((prev, next)) = self
            .keyframes
            .windows(2)
            .map(|pair| (&pair[0], &pair[1]))
            .find(|(prev, next)| t >= prev.time && t <= next.time)
        else {
            return last.value.clone();
        };

        let range = next.time - prev.time;
        let local_progress = if range > 0.0 {
            (t - prev.time) / range
        } else {
            1.0
        };

        let eased = self.easing.evaluate(local_progress);
        prev.value.interpolate(&next.value, eased)
    }
}

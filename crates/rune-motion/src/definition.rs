//! Authored animation data: definitions, phases, tracks and keyframes.
//!
//! Definitions are plain data, built in code or parsed from JSON:
//!
//! ```json
//! {
//!   "name": "reveal",
//!   "duration": 1.0,
//!   "phases": [{ "name": "grow", "start": 0.0, "end": 0.5 }],
//!   "tracks": [{
//!     "name": "scale",
//!     "easing": "easeOutCubic",
//!     "keyframes": [{ "time": 0.0, "value": 0.0 }, { "time": 1.0, "value": [1.0, 2.0] }]
//!   }]
//! }
//! ```
//!
//! A definition is immutable once handed to a [`Transition`](crate::Transition)
//! and may be shared between playbacks through an `Rc`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::easing::Easing;
use crate::error::{MotionError, Result};

/// Value carried by a keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl TrackValue {
    /// Get the scalar, if this is one.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Vector(_) => None,
        }
    }

    /// Get the components, if this is a vector.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Self::Scalar(_) => None,
            Self::Vector(v) => Some(v),
        }
    }
}

impl Default for TrackValue {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

impl From<f64> for TrackValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for TrackValue {
    fn from(value: Vec<f64>) -> Self {
        Self::Vector(value)
    }
}

impl<const N: usize> From<[f64; N]> for TrackValue {
    fn from(value: [f64; N]) -> Self {
        Self::Vector(value.to_vec())
    }
}

/// A value anchored at a normalized time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Position in the track (0.0 to 1.0).
    pub time: f64,
    pub value: TrackValue,
}

impl Keyframe {
    pub fn new(time: f64, value: impl Into<TrackValue>) -> Self {
        Self {
            time,
            value: value.into(),
        }
    }
}

/// A named sub-interval `[start, end)` of playback progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub name: String,
    pub start: f64,
    pub end: f64,
}

impl PhaseDefinition {
    pub fn new(name: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Half-open membership test.
    pub fn contains(&self, progress: f64) -> bool {
        progress >= self.start && progress < self.end
    }

    /// Whether the phase has no extent.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A keyframed value curve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackDefinition {
    pub name: String,
    /// Keyframes in authored order. Tracks sort them on construction.
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    /// Easing applied between each pair of keyframes (linear when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
}

impl TrackDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyframes: Vec::new(),
            easing: None,
        }
    }

    /// Add a keyframe.
    pub fn keyframe(mut self, time: f64, value: impl Into<TrackValue>) -> Self {
        self.keyframes.push(Keyframe::new(time, value));
        self
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }
}

/// A complete one-shot animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDefinition {
    pub name: String,
    /// Playback length in seconds.
    pub duration: f64,
    #[serde(default)]
    pub phases: Vec<PhaseDefinition>,
    #[serde(default)]
    pub tracks: Vec<TrackDefinition>,
}

impl AnimationDefinition {
    /// Create an empty definition.
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            phases: Vec::new(),
            tracks: Vec::new(),
        }
    }

    /// Add a phase.
    pub fn phase(mut self, name: impl Into<String>, start: f64, end: f64) -> Self {
        self.phases.push(PhaseDefinition::new(name, start, end));
        self
    }

    /// Add a track.
    pub fn track(mut self, track: TrackDefinition) -> Self {
        self.tracks.push(track);
        self
    }

    /// Parse and validate a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Look up a phase by name.
    pub fn find_phase(&self, name: &str) -> Option<&PhaseDefinition> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// Check the structural invariants a playback relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(self.invalid(format!(
                "duration must be a positive number of seconds, got {}",
                self.duration
            )));
        }

        let mut names = HashSet::new();
        for phase in &self.phases {
            if !in_unit_range(phase.start) || !in_unit_range(phase.end) {
                return Err(self.invalid(format!(
                    "phase '{}' range [{}, {}) is outside [0, 1]",
                    phase.name, phase.start, phase.end
                )));
            }
            if phase.start > phase.end {
                return Err(self.invalid(format!(
                    "phase '{}' starts after it ends ({} > {})",
                    phase.name, phase.start, phase.end
                )));
            }
            if !names.insert(phase.name.as_str()) {
                return Err(self.invalid(format!("duplicate phase name '{}'", phase.name)));
            }
        }

        for track in &self.tracks {
            if let Some(kf) = track.keyframes.iter().find(|kf| !in_unit_range(kf.time)) {
                return Err(self.invalid(format!(
                    "track '{}' has a keyframe at {} outside [0, 1]",
                    track.name, kf.time
                )));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> MotionError {
        MotionError::InvalidDefinition {
            name: self.name.clone(),
            reason,
        }
    }
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

//! Events emitted by transitions.
//!
//! Consumers subscribe to a transition's [`EventBus`](crate::EventBus) and
//! match on [`MotionEvent`]:
//!
//! ```ignore
//! transition.subscribe(|event| match event {
//!     MotionEvent::TrackUpdate { track, value } => apply(track, value),
//!     MotionEvent::PhaseEnter { phase, .. } => tracing::info!("entered {}", phase),
//!     _ => {}
//! });
//! ```

use serde::{Deserialize, Serialize};

use crate::definition::TrackValue;

/// Lifecycle, phase and track notifications from a playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MotionEvent {
    /// A playback has started.
    #[serde(rename = "animation:start")]
    AnimationStart { animation_name: String },
    /// A playback reached the end of its duration.
    #[serde(rename = "animation:complete")]
    AnimationComplete { animation_name: String },
    /// A playback was stopped early (cancel, restart or dispose).
    #[serde(rename = "animation:cancel")]
    AnimationCancel { animation_name: String },
    /// Progress entered a phase.
    #[serde(rename = "phase:enter")]
    PhaseEnter { phase: String, progress: f64 },
    /// Per-frame progress of an active phase.
    #[serde(rename = "phase:progress")]
    PhaseProgress {
        phase: String,
        progress: f64,
        phase_progress: f64,
    },
    /// Progress left a phase.
    #[serde(rename = "phase:exit")]
    PhaseExit { phase: String, progress: f64 },
    /// Per-frame value of a track.
    #[serde(rename = "track:update")]
    TrackUpdate { track: String, value: TrackValue },
}

impl MotionEvent {
    /// Event taxonomy name, e.g. `"phase:enter"`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AnimationStart { .. } => "animation:start",
            Self::AnimationComplete { .. } => "animation:complete",
            Self::AnimationCancel { .. } => "animation:cancel",
            Self::PhaseEnter { .. } => "phase:enter",
            Self::PhaseProgress { .. } => "phase:progress",
            Self::PhaseExit { .. } => "phase:exit",
            Self::TrackUpdate { .. } => "track:update",
        }
    }

    /// Get the phase name for phase events.
    pub fn phase(&self) -> Option<&str> {
        match self {
            Self::PhaseEnter { phase, .. }
            | Self::PhaseProgress { phase, .. }
            | Self::PhaseExit { phase, .. } => Some(phase),
            _ => None,
        }
    }

    /// Check if this event ends a playback (complete or cancel).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AnimationComplete { .. } | Self::AnimationCancel { .. }
        )
    }
}

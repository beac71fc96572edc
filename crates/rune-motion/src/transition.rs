//! One-shot playback of an animation definition.
//!
//! A [`Transition`] wraps a [`PhaseTimeline`] and the definition's
//! [`KeyframeTrack`]s behind an [`EventBus`]. Every frame it re-emits phase
//! enter/exit, per-phase progress and per-track values as [`MotionEvent`]s.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──play──▶ Playing ──progress reaches 1──▶ Complete
//!                   │
//!                   └──cancel / play again / dispose──▶ Cancelled
//! ```
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use rune_motion::{AnimationDefinition, MotionEvent, TrackDefinition, Transition};
//!
//! let definition = Rc::new(
//!     AnimationDefinition::new("grow", 1.0)
//!         .phase("intro", 0.0, 0.5)
//!         .track(TrackDefinition::new("scale").keyframe(0.0, 0.0).keyframe(1.0, 1.0)),
//! );
//!
//! let mut transition = Transition::new();
//! transition.subscribe(|event| {
//!     if let MotionEvent::TrackUpdate { track, value } = event {
//!         println!("{} = {:?}", track, value);
//!     }
//! });
//! transition.play(Some(definition)).unwrap();
//! transition.update(0.016);
//! ```

use std::rc::Rc;

use crate::bus::{EventBus, Subscription};
use crate::definition::AnimationDefinition;
use crate::error::{MotionError, Result};
use crate::events::MotionEvent;
use crate::timeline::PhaseTimeline;
use crate::track::KeyframeTrack;

/// Orchestrates playbacks of one definition at a time.
#[derive(Default)]
pub struct Transition {
    bus: EventBus<MotionEvent>,
    definition: Option<Rc<AnimationDefinition>>,
    timeline: Option<PhaseTimeline<EventBus<MotionEvent>>>,
    tracks: Vec<KeyframeTrack>,
    playing: bool,
}

impl Transition {
    /// Create an idle transition with no stored definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle transition that plays `definition` by default.
    pub fn with_definition(definition: Rc<AnimationDefinition>) -> Self {
        Self {
            definition: Some(definition),
            ..Self::default()
        }
    }

    /// Subscribe to this transition's events.
    pub fn subscribe<F>(&self, handler: F) -> Subscription<MotionEvent>
    where
        F: Fn(&MotionEvent) + 'static,
    {
        self.bus.subscribe(handler)
    }

    /// The bus events are emitted on.
    pub fn events(&self) -> &EventBus<MotionEvent> {
        &self.bus
    }

    /// Start a playback.
    ///
    /// Uses `definition` when given (and stores it for later calls), otherwise
    /// the stored definition. A playback already in flight is cancelled first.
    ///
    /// # Errors
    /// [`MotionError::NoDefinition`] if neither is available, or
    /// [`MotionError::InvalidDefinition`] if the definition fails validation.
    pub fn play(&mut self, definition: Option<Rc<AnimationDefinition>>) -> Result<()> {
        let definition = definition
            .or_else(|| self.definition.clone())
            .ok_or(MotionError::NoDefinition)?;
        definition.validate()?;

        if self.playing {
            self.cancel();
        }
        if let Some(previous) = self.timeline.as_mut() {
            previous.reset();
        }

        self.tracks = definition.tracks.iter().map(KeyframeTrack::new).collect();
        self.timeline = Some(PhaseTimeline::new(Rc::clone(&definition), self.bus.clone()));
        self.definition = Some(Rc::clone(&definition));
        self.playing = true;

        tracing::debug!(animation = %definition.name, duration = definition.duration, "transition started");
        self.bus.emit(&MotionEvent::AnimationStart {
            animation_name: definition.name.clone(),
        });
        Ok(())
    }

    /// Advance the playback by `delta` seconds. Does nothing unless playing.
    pub fn update(&mut self, delta: f64) {
        if !self.playing {
            return;
        }
        let Some(timeline) = self.timeline.as_mut() else {
            return;
        };

        timeline.update(delta);
        let progress = timeline.progress();

        for track in &self.tracks {
            self.bus.emit(&MotionEvent::TrackUpdate {
                track: track.name().to_string(),
                value: track.value_at(progress),
            });
        }

        let active: Vec<(String, f64)> = timeline
            .active_phases()
            .map(|phase| {
                let local = PhaseTimeline::<EventBus<MotionEvent>>::local_progress(phase, progress);
                (phase.name.clone(), local)
            })
            .collect();
        for (phase, phase_progress) in active {
            self.bus.emit(&MotionEvent::PhaseProgress {
                phase,
                progress,
                phase_progress,
            });
        }

        if timeline.is_complete() {
            self.playing = false;
            let animation_name = timeline.definition().name.clone();
            tracing::debug!(animation = %animation_name, "transition complete");
            self.bus.emit(&MotionEvent::AnimationComplete { animation_name });
        }
    }

    /// Stop the current playback. Does nothing unless playing.
    pub fn cancel(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;

        let animation_name = self
            .timeline
            .as_ref()
            .map(|timeline| timeline.definition().name.clone())
            .unwrap_or_default();
        tracing::debug!(animation = %animation_name, "transition cancelled");
        self.bus.emit(&MotionEvent::AnimationCancel { animation_name });
    }

    /// Cancel, drop every subscriber and forget the definition.
    ///
    /// The transition can be reused by passing a new definition to [`play`](Self::play).
    pub fn dispose(&mut self) {
        self.cancel();
        self.bus.clear();
        self.timeline = None;
        self.tracks.clear();
        self.definition = None;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Progress of the current or last playback (0 before the first play).
    pub fn progress(&self) -> f64 {
        self.timeline.as_ref().map_or(0.0, |t| t.progress())
    }

    /// The stored definition, if any.
    pub fn definition(&self) -> Option<&Rc<AnimationDefinition>> {
        self.definition.as_ref()
    }

    /// Names of currently active phases, in definition order.
    pub fn active_phases(&self) -> Vec<String> {
        self.timeline
            .as_ref()
            .map(|t| t.active_phases().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("definition", &self.definition.as_ref().map(|d| d.name.as_str()))
            .field("playing", &self.playing)
            .field("progress", &self.progress())
            .field("subscribers", &self.bus.len())
            .finish()
    }
}

//! Phase timeline: normalized progress plus phase enter/exit detection.
//!
//! Each phase of an [`AnimationDefinition`] moves between *inactive* and
//! *active* as progress advances. Phases may overlap, so several can be active
//! at once. Enter/exit notifications go to a [`PhaseObserver`] supplied at
//! construction.
//!
//! # Detection rules (per phase, per update)
//!
//! ```text
//! was_in  = prev ∈ [start, end)
//! is_in   = progress ∈ [start, end)
//! before  = prev < start || (prev == 0 && start == 0)
//! spanned = before && progress >= end && progress > prev
//!
//! inactive && (is_in || was_in || spanned) → enter at max(start, prev)
//! active && !is_in                         → exit at progress
//! ```
//!
//! A phase jumped over by one large update is still entered (and then exited
//! in the same update), so consumers never miss a phase.

use std::rc::Rc;

use crate::bus::EventBus;
use crate::definition::{AnimationDefinition, PhaseDefinition};
use crate::events::MotionEvent;

/// Receiver for phase enter/exit notifications.
pub trait PhaseObserver {
    fn phase_entered(&mut self, phase: &str, progress: f64);
    fn phase_exited(&mut self, phase: &str, progress: f64);
}

impl PhaseObserver for () {
    fn phase_entered(&mut self, _phase: &str, _progress: f64) {}
    fn phase_exited(&mut self, _phase: &str, _progress: f64) {}
}

impl PhaseObserver for EventBus<MotionEvent> {
    fn phase_entered(&mut self, phase: &str, progress: f64) {
        self.emit(&MotionEvent::PhaseEnter {
            phase: phase.to_string(),
            progress,
        });
    }

    fn phase_exited(&mut self, phase: &str, progress: f64) {
        self.emit(&MotionEvent::PhaseExit {
            phase: phase.to_string(),
            progress,
        });
    }
}

type PhaseCallback = Box<dyn FnMut(&str, f64)>;

/// Closure-based [`PhaseObserver`].
#[derive(Default)]
pub struct PhaseHandlers {
    on_enter: Option<PhaseCallback>,
    on_exit: Option<PhaseCallback>,
}

impl PhaseHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enter handler.
    pub fn on_enter(mut self, handler: impl FnMut(&str, f64) + 'static) -> Self {
        self.on_enter = Some(Box::new(handler));
        self
    }

    /// Set the exit handler.
    pub fn on_exit(mut self, handler: impl FnMut(&str, f64) + 'static) -> Self {
        self.on_exit = Some(Box::new(handler));
        self
    }
}

impl PhaseObserver for PhaseHandlers {
    fn phase_entered(&mut self, phase: &str, progress: f64) {
        if let Some(handler) = self.on_enter.as_mut() {
            handler(phase, progress);
        }
    }

    fn phase_exited(&mut self, phase: &str, progress: f64) {
        if let Some(handler) = self.on_exit.as_mut() {
            handler(phase, progress);
        }
    }
}

/// Progress through one playback of a definition.
pub struct PhaseTimeline<O: PhaseObserver = ()> {
    definition: Rc<AnimationDefinition>,
    progress: f64,
    /// Active flag per phase, parallel to `definition.phases`.
    active: Vec<bool>,
    observer: O,
}

impl<O: PhaseObserver> PhaseTimeline<O> {
    /// Create a timeline at progress 0 with no active phases.
    pub fn new(definition: Rc<AnimationDefinition>, observer: O) -> Self {
        let active = vec![false; definition.phases.len()];
        Self {
            definition,
            progress: 0.0,
            active,
            observer,
        }
    }

    /// Advance by `delta` seconds and fire phase notifications.
    pub fn update(&mut self, delta: f64) {
        let delta = if delta.is_nan() { 0.0 } else { delta.max(0.0) };
        let prev = self.progress;
        self.progress = (prev + delta / self.definition.duration).min(1.0);
        if self.progress.is_nan() {
            self.progress = prev;
        }

        let definition = Rc::clone(&self.definition);
        for (i, phase) in definition.phases.iter().enumerate() {
            let was_in = phase.contains(prev);
            let is_in = phase.contains(self.progress);
            // A marker at 0 counts as ahead of a timeline that has not moved yet.
            let before = prev < phase.start || (prev == 0.0 && phase.start == 0.0);
            let spanned = before && self.progress >= phase.end && self.progress > prev;

            if !self.active[i] && (is_in || was_in || spanned) {
                self.active[i] = true;
                self.observer.phase_entered(&phase.name, phase.start.max(prev));
            }

            if self.active[i] && !is_in {
                self.active[i] = false;
                self.observer.phase_exited(&phase.name, self.progress);
            }
        }
    }

    /// Exit every active phase at the current progress, then rewind to 0.
    pub fn reset(&mut self) {
        let definition = Rc::clone(&self.definition);
        for (i, phase) in definition.phases.iter().enumerate() {
            if self.active[i] {
                self.active[i] = false;
                self.observer.phase_exited(&phase.name, self.progress);
            }
        }
        self.progress = 0.0;
    }

    /// Normalized progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn definition(&self) -> &Rc<AnimationDefinition> {
        &self.definition
    }

    /// Phases whose `[start, end)` range contains the current progress.
    pub fn current_phases(&self) -> Vec<&PhaseDefinition> {
        self.definition
            .phases
            .iter()
            .filter(|phase| phase.contains(self.progress))
            .collect()
    }

    /// Phases that have been entered and not yet exited, in definition order.
    pub fn active_phases(&self) -> impl Iterator<Item = &PhaseDefinition> {
        self.definition
            .phases
            .iter()
            .zip(self.active.iter())
            .filter_map(|(phase, active)| active.then_some(phase))
    }

    /// Whether the named phase is active.
    pub fn is_active(&self, name: &str) -> bool {
        self.active_phases().any(|phase| phase.name == name)
    }

    /// Progress within an active phase, or `None` if the phase is not active.
    ///
    /// Zero-width phases are entered and exited within one update, so they
    /// are never active between updates and always report `None` here.
    pub fn phase_progress(&self, name: &str) -> Option<f64> {
        let phase = self.active_phases().find(|phase| phase.name == name)?;
        Some(Self::local_progress(phase, self.progress))
    }

    /// Progress of `progress` within `phase`, clamped to `[0, 1]`; `1` for a
    /// zero-width phase.
    pub(crate) fn local_progress(phase: &PhaseDefinition, progress: f64) -> f64 {
        let range = phase.end - phase.start;
        if range <= 0.0 {
            1.0
        } else {
            ((progress - phase.start) / range).clamp(0.0, 1.0)
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        log: Vec<(String, String, f64)>,
    }

    impl PhaseObserver for Recorder {
        fn phase_entered(&mut self, phase: &str, progress: f64) {
            self.log.push(("enter".into(), phase.into(), progress));
        }

        fn phase_exited(&mut self, phase: &str, progress: f64) {
            self.log.push(("exit".into(), phase.into(), progress));
        }
    }

    impl Recorder {
        fn count(&self, kind: &str, phase: &str) -> usize {
            self.log
                .iter()
                .filter(|(k, p, _)| k == kind && p == phase)
                .count()
        }
    }

    fn two_phase() -> Rc<AnimationDefinition> {
        Rc::new(
            AnimationDefinition::new("two", 1.0)
                .phase("phase1", 0.0, 0.5)
                .phase("phase2", 0.5, 1.0),
        )
    }

    #[test]
    fn test_progress_advances_and_clamps() {
        let mut timeline = PhaseTimeline::new(Rc::new(AnimationDefinition::new("a", 2.0)), ());
        timeline.update(0.5);
        assert!((timeline.progress() - 0.25).abs() < 1e-12);
        assert!(!timeline.is_complete());

        timeline.update(10.0);
        assert_eq!(timeline.progress(), 1.0);
        assert!(timeline.is_complete());
    }

    #[test]
    fn test_phase_reentrancy() {
        let mut timeline = PhaseTimeline::new(two_phase(), Recorder::default());
        timeline.update(0.2);
        timeline.update(0.2);
        assert_eq!(timeline.observer().count("enter", "phase1"), 1);

        timeline.update(0.2);
        timeline.update(0.1);
        timeline.update(0.1);

        let rec = timeline.observer();
        assert_eq!(rec.count("exit", "phase1"), 1);
        assert_eq!(rec.count("enter", "phase2"), 1);
        assert_eq!(rec.count("exit", "phase2"), 0);
        assert!(timeline.is_active("phase2"));
        assert!(!timeline.is_active("phase1"));
    }

    #[test]
    fn test_exit_precedes_next_enter() {
        let mut timeline = PhaseTimeline::new(two_phase(), Recorder::default());
        timeline.update(0.25);
        timeline.update(0.5);

        let kinds: Vec<(&str, &str)> = timeline
            .observer()
            .log
            .iter()
            .map(|(k, p, _)| (k.as_str(), p.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![("enter", "phase1"), ("exit", "phase1"), ("enter", "phase2")]
        );
    }

    #[test]
    fn test_overlapping_phases() {
        let def = Rc::new(
            AnimationDefinition::new("overlap", 1.0)
                .phase("long", 0.0, 1.0)
                .phase("short", 0.25, 0.75),
        );
        let mut timeline = PhaseTimeline::new(def, ());
        timeline.update(0.5);

        let names: Vec<&str> = timeline
            .current_phases()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["long", "short"]);
        assert!(timeline.is_active("long"));
        assert!(timeline.is_active("short"));
        assert_eq!(timeline.phase_progress("long"), Some(0.5));
        assert_eq!(timeline.phase_progress("short"), Some(0.5));
    }

    #[test]
    fn test_jumped_phase_still_entered() {
        let def = Rc::new(
            AnimationDefinition::new("jump", 1.0)
                .phase("early", 0.0, 0.2)
                .phase("middle", 0.3, 0.4)
                .phase("late", 0.9, 1.0),
        );
        let mut timeline = PhaseTimeline::new(def, Recorder::default());
        timeline.update(0.95);

        let rec = timeline.observer();
        assert_eq!(rec.count("enter", "early"), 1);
        assert_eq!(rec.count("exit", "early"), 1);
        assert_eq!(rec.count("enter", "middle"), 1);
        assert_eq!(rec.count("exit", "middle"), 1);
        assert_eq!(rec.count("enter", "late"), 1);
        assert_eq!(rec.count("exit", "late"), 0);

        let middle_enter = rec
            .log
            .iter()
            .find(|(k, p, _)| k == "enter" && p == "middle")
            .map(|(_, _, progress)| *progress);
        assert_eq!(middle_enter, Some(0.3));
    }

    #[test]
    fn test_final_phase_exits_at_completion() {
        let mut timeline = PhaseTimeline::new(two_phase(), Recorder::default());
        timeline.update(0.6);
        timeline.update(1.0);

        assert!(timeline.is_complete());
        assert_eq!(timeline.observer().count("exit", "phase2"), 1);
        assert_eq!(timeline.active_phases().count(), 0);
    }

    #[test]
    fn test_reset_exits_active_phases() {
        let def = Rc::new(
            AnimationDefinition::new("overlap", 1.0)
                .phase("long", 0.0, 1.0)
                .phase("short", 0.25, 0.75),
        );
        let mut timeline = PhaseTimeline::new(def, Recorder::default());
        timeline.update(0.5);
        timeline.reset();

        let rec = timeline.observer();
        assert_eq!(rec.count("exit", "long"), 1);
        assert_eq!(rec.count("exit", "short"), 1);
        let exit_progress: Vec<f64> = rec
            .log
            .iter()
            .filter(|(k, _, _)| k == "exit")
            .map(|(_, _, p)| *p)
            .collect();
        assert_eq!(exit_progress, vec![0.5, 0.5]);
        assert_eq!(timeline.progress(), 0.0);
        assert_eq!(timeline.active_phases().count(), 0);
    }

    #[test]
    fn test_phase_progress_inactive_is_none() {
        let timeline = PhaseTimeline::new(two_phase(), ());
        assert_eq!(timeline.phase_progress("phase1"), None);
        assert_eq!(timeline.phase_progress("missing"), None);
    }

    #[test]
    fn test_zero_width_local_progress() {
        let phase = PhaseDefinition::new("marker", 0.5, 0.5);
        assert_eq!(PhaseTimeline::<()>::local_progress(&phase, 0.5), 1.0);
    }

    #[test]
    fn test_zero_width_markers_at_both_ends() {
        let definition = Rc::new(
            AnimationDefinition::new("markers", 1.0)
                .phase("marker0", 0.0, 0.0)
                .phase("marker1", 1.0, 1.0),
        );
        let mut timeline = PhaseTimeline::new(definition, Recorder::default());
        for _ in 0..20 {
            timeline.update(0.1);
        }

        let recorder = timeline.observer();
        for marker in ["marker0", "marker1"] {
            assert_eq!(recorder.count("enter", marker), 1, "{marker} entered");
            assert_eq!(recorder.count("exit", marker), 1, "{marker} exited");
        }
        assert_eq!(timeline.phase_progress("marker0"), None);
        assert_eq!(timeline.active_phases().count(), 0);
    }

    #[test]
    fn test_landing_on_marker_fires_once() {
        let definition = Rc::new(AnimationDefinition::new("m", 1.0).phase("half", 0.5, 0.5));
        let mut timeline = PhaseTimeline::new(definition, Recorder::default());
        timeline.update(0.5);
        timeline.update(0.1);
        timeline.update(0.1);
        assert_eq!(timeline.observer().count("enter", "half"), 1);
        assert_eq!(timeline.observer().count("exit", "half"), 1);
    }

    #[test]
    fn test_zero_width_marker_not_entered_without_progress() {
        let definition = Rc::new(AnimationDefinition::new("m", 1.0).phase("marker0", 0.0, 0.0));
        let mut timeline = PhaseTimeline::new(definition, Recorder::default());
        timeline.update(0.0);
        assert_eq!(timeline.observer().count("enter", "marker0"), 0);
    }

    #[test]
    fn test_closure_handlers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let enter_seen = Rc::clone(&seen);
        let exit_seen = Rc::clone(&seen);
        let handlers = PhaseHandlers::new()
            .on_enter(move |phase, _| enter_seen.borrow_mut().push(format!("+{}", phase)))
            .on_exit(move |phase, _| exit_seen.borrow_mut().push(format!("-{}", phase)));

        let mut timeline = PhaseTimeline::new(two_phase(), handlers);
        timeline.update(0.6);
        assert_eq!(*seen.borrow(), vec!["+phase1", "-phase1", "+phase2"]);
    }
}

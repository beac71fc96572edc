//! Frame driver.
//!
//! [`MotionEngine`] owns every animated subsystem and advances them in a fixed
//! order once per rendered frame:
//!
//! ```text
//! tick(raw_delta)
//!   ├─ TimeAuthority::update          cap, scale, pause
//!   ├─ LoopRegistry::update           elapsed → uniforms
//!   ├─ Transition::update × N         insertion order
//!   ├─ PropagationAnimator::update
//!   └─ InstanceBindingManager::update_bindings
//! ```

use rune_motion_config::MotionConfig;

use crate::instance::InstanceBindingManager;
use crate::loops::LoopRegistry;
use crate::propagation::{PathFinder, PropagationAnimator, PropagationSettings};
use crate::time::TimeAuthority;
use crate::transition::Transition;

/// Timing of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Accumulated scaled seconds.
    pub elapsed: f64,
    /// Seconds this frame advanced by, after capping and scaling.
    pub delta: f64,
    /// Number of ticks so far, including this one.
    pub frame: u64,
}

/// Owns and ticks the animation subsystems for one scene.
#[derive(Debug, Default)]
pub struct MotionEngine {
    time: TimeAuthority,
    loops: LoopRegistry,
    transitions: Vec<(String, Transition)>,
    propagation: Option<PropagationAnimator>,
    propagation_settings: PropagationSettings,
    bindings: InstanceBindingManager,
}

impl MotionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MotionConfig) -> Self {
        Self {
            time: TimeAuthority::from_config(&config.time),
            propagation_settings: PropagationSettings::from(&config.propagation),
            bindings: InstanceBindingManager::from_config(&config.bindings),
            ..Self::default()
        }
    }

    /// Advance one frame by `raw_delta` wall-clock seconds.
    pub fn tick(&mut self, raw_delta: f64) -> FrameTime {
        self.time.update(raw_delta);
        let elapsed = self.time.elapsed();
        let delta = self.time.delta();

        self.loops.update(elapsed);
        for (_, transition) in &mut self.transitions {
            transition.update(delta);
        }
        if let Some(propagation) = self.propagation.as_mut() {
            propagation.update(delta);
        }
        self.bindings.update_bindings(delta);

        FrameTime {
            elapsed,
            delta,
            frame: self.time.frame(),
        }
    }

    pub fn time(&self) -> &TimeAuthority {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut TimeAuthority {
        &mut self.time
    }

    pub fn loops(&self) -> &LoopRegistry {
        &self.loops
    }

    pub fn loops_mut(&mut self) -> &mut LoopRegistry {
        &mut self.loops
    }

    /// The transition named `name`, created idle if it does not exist yet.
    pub fn add_transition(&mut self, name: &str) -> &mut Transition {
        let index = match self.transitions.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.transitions.push((name.to_string(), Transition::new()));
                self.transitions.len() - 1
            }
        };
        &mut self.transitions[index].1
    }

    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn transition_mut(&mut self, name: &str) -> Option<&mut Transition> {
        self.transitions
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Dispose and remove a transition. Returns `false` if it did not exist.
    pub fn remove_transition(&mut self, name: &str) -> bool {
        let Some(index) = self.transitions.iter().position(|(n, _)| n == name) else {
            return false;
        };
        let (_, mut transition) = self.transitions.remove(index);
        transition.dispose();
        true
    }

    /// Transition names in insertion order.
    pub fn transition_names(&self) -> impl Iterator<Item = &str> {
        self.transitions.iter().map(|(n, _)| n.as_str())
    }

    /// Install a propagation animator using the engine's settings, replacing
    /// any previous one.
    pub fn set_path_finder(&mut self, finder: impl PathFinder + 'static) -> &mut PropagationAnimator {
        if let Some(previous) = self.propagation.as_mut() {
            previous.dispose();
        }
        self.propagation
            .insert(PropagationAnimator::new(finder, self.propagation_settings))
    }

    pub fn propagation(&self) -> Option<&PropagationAnimator> {
        self.propagation.as_ref()
    }

    pub fn propagation_mut(&mut self) -> Option<&mut PropagationAnimator> {
        self.propagation.as_mut()
    }

    pub fn propagation_settings(&self) -> &PropagationSettings {
        &self.propagation_settings
    }

    pub fn bindings(&self) -> &InstanceBindingManager {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut InstanceBindingManager {
        &mut self.bindings
    }

    /// Tear down every subsystem and reset time.
    pub fn dispose(&mut self) {
        for (_, transition) in &mut self.transitions {
            transition.dispose();
        }
        self.transitions.clear();
        if let Some(mut propagation) = self.propagation.take() {
            propagation.dispose();
        }
        self.loops.clear();
        self.bindings.dispose();
        self.time.reset();
        tracing::debug!("motion engine disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{AnimationDefinition, TrackDefinition};
    use crate::events::MotionEvent;
    use crate::instance::InstanceAttribute;
    use crate::loops::UniformCell;
    use crate::propagation::NodeId;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn definition() -> Rc<AnimationDefinition> {
        Rc::new(
            AnimationDefinition::new("fade", 1.0)
                .phase("in", 0.0, 1.0)
                .track(TrackDefinition::new("opacity").keyframe(0.0, 0.0).keyframe(1.0, 1.0)),
        )
    }

    fn chain(_: &NodeId, _: &NodeId) -> Option<Vec<NodeId>> {
        Some(vec!["a".into(), "b".into()])
    }

    #[test]
    fn test_tick_reports_frame_time() {
        let mut engine = MotionEngine::new();
        let first = engine.tick(0.016);
        let second = engine.tick(1.0);

        assert_eq!(first.frame, 1);
        assert!(approx_eq(first.delta, 0.016));
        assert_eq!(second.frame, 2);
        assert!(approx_eq(second.delta, 0.1));
        assert!(approx_eq(second.elapsed, 0.116));
    }

    #[test]
    fn test_tick_drives_loops_with_elapsed() {
        let mut engine = MotionEngine::new();
        let uniform = UniformCell::default();
        engine.loops_mut().register("wave", uniform.clone()).with_frequency(2.0);

        engine.tick(0.05);
        engine.tick(0.05);
        assert!(approx_eq(uniform.get(), 0.2));
    }

    #[test]
    fn test_tick_drives_transitions_in_insertion_order() {
        let mut engine = MotionEngine::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for name in ["second", "first"] {
            let transition = engine.add_transition(name);
            let sink = Rc::clone(&order);
            let label = name.to_string();
            transition.subscribe(move |event| {
                if let MotionEvent::TrackUpdate { .. } = event {
                    sink.borrow_mut().push(label.clone());
                }
            });
            transition.play(Some(definition())).unwrap();
        }

        engine.tick(0.05);
        assert_eq!(*order.borrow(), vec!["second".to_string(), "first".to_string()]);
        assert!(approx_eq(engine.transition("first").unwrap().progress(), 0.05));
    }

    #[test]
    fn test_add_transition_is_idempotent() {
        let mut engine = MotionEngine::new();
        engine.add_transition("a").play(Some(definition())).unwrap();
        assert!(engine.add_transition("a").is_playing());
        assert_eq!(engine.transition_names().count(), 1);
    }

    #[test]
    fn test_remove_transition_disposes() {
        let mut engine = MotionEngine::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let transition = engine.add_transition("a");
        transition.subscribe(move |event| sink.borrow_mut().push(event.tag()));
        transition.play(Some(definition())).unwrap();

        assert!(engine.remove_transition("a"));
        assert!(!engine.remove_transition("a"));
        assert_eq!(*events.borrow(), vec!["animation:start", "animation:cancel"]);
        assert!(engine.transition("a").is_none());
    }

    #[test]
    fn test_paused_tick_advances_nothing() {
        let mut engine = MotionEngine::new();
        engine.add_transition("a").play(Some(definition())).unwrap();
        engine.time_mut().pause();

        let frame = engine.tick(0.05);
        assert_eq!(frame.delta, 0.0);
        assert_eq!(engine.transition("a").unwrap().progress(), 0.0);
    }

    #[test]
    fn test_tick_drives_propagation_and_bindings() {
        let mut config = MotionConfig::default();
        config.propagation.pulse_speed = 10.0;
        config.bindings.transition_duration = 0.1;
        let mut engine = MotionEngine::from_config(&config);

        assert!(engine.set_path_finder(chain).start_pulse(&"a".into(), &"b".into()));
        engine
            .bindings_mut()
            .register_attribute("glow", InstanceAttribute::new(1));
        let binding = engine.bindings_mut().create_binding("glow", 0, false, |on: &bool| {
            if *on { 1.0 } else { 0.0 }
        });
        binding.borrow_mut().set_state(true);

        engine.tick(0.1);
        assert!(engine.propagation().unwrap().is_breathing());
        assert_eq!(engine.bindings().attribute("glow").unwrap().get(0), Some(1.0));
    }

    #[test]
    fn test_dispose() {
        let mut engine = MotionEngine::new();
        engine.loops_mut().register("wave", UniformCell::default());
        engine.add_transition("a").play(Some(definition())).unwrap();
        engine.set_path_finder(chain);
        engine.tick(0.05);

        engine.dispose();
        assert!(engine.loops().is_empty());
        assert_eq!(engine.transition_names().count(), 0);
        assert!(engine.propagation().is_none());
        assert_eq!(engine.time().elapsed(), 0.0);
        assert_eq!(engine.time().frame(), 0);
    }
}

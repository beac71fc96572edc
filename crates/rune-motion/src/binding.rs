//! State-driven numeric values with timed transitions.
//!
//! A [`ReactiveBinding`] maps a piece of state (`bool`, an enum, anything) to a
//! number through a transform. Changing the state ramps the output linearly
//! from wherever it currently is to the new target over `duration` seconds,
//! so interrupting a transition never makes the value jump.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a binding, as returned by
/// [`InstanceBindingManager::create_binding`](crate::InstanceBindingManager::create_binding).
pub type BindingHandle<T> = Rc<RefCell<ReactiveBinding<T>>>;

type Transform<T> = Box<dyn Fn(&T) -> f64>;

/// Default transition length in seconds.
pub const DEFAULT_TRANSITION_DURATION: f64 = 0.3;

pub struct ReactiveBinding<T> {
    state: T,
    initial_state: T,
    transform: Transform<T>,
    start_value: f64,
    target_value: f64,
    current_value: f64,
    duration: f64,
    progress: f64,
}

impl<T: Clone> ReactiveBinding<T> {
    /// Create a settled binding at `transform(&initial)`.
    pub fn new<F>(initial: T, transform: F) -> Self
    where
        F: Fn(&T) -> f64 + 'static,
    {
        let value = transform(&initial);
        Self {
            state: initial.clone(),
            initial_state: initial,
            transform: Box::new(transform),
            start_value: value,
            target_value: value,
            current_value: value,
            duration: DEFAULT_TRANSITION_DURATION,
            progress: 1.0,
        }
    }

    /// Set the transition duration in seconds. `<= 0` makes state changes snap.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.set_duration(duration);
        self
    }

    /// Negative or NaN durations are stored as `0`.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_nan() { 0.0 } else { duration.max(0.0) };
    }

    /// Change the state and start ramping toward `transform(&state)`.
    ///
    /// The ramp starts from the current value, so a change mid-transition
    /// continues smoothly from where the value is now.
    pub fn set_state(&mut self, state: T) {
        let target = (self.transform)(&state);
        self.state = state;
        self.target_value = target;

        if self.duration <= 0.0 {
            self.start_value = target;
            self.current_value = target;
            self.progress = 1.0;
        } else {
            self.start_value = self.current_value;
            self.progress = 0.0;
        }
    }

    /// Advance the ramp by `delta` seconds and return the current value.
    pub fn update(&mut self, delta: f64) -> f64 {
        if self.progress >= 1.0 {
            return self.current_value;
        }

        if self.duration <= 0.0 {
            self.progress = 1.0;
            self.current_value = self.target_value;
            return self.current_value;
        }

        let delta = if delta.is_nan() { 0.0 } else { delta.max(0.0) };
        self.progress = (self.progress + delta / self.duration).clamp(0.0, 1.0);

        self.current_value = if self.progress >= 1.0 {
            self.target_value
        } else {
            self.start_value + (self.target_value - self.start_value) * self.progress
        };
        self.current_value
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn target_value(&self) -> f64 {
        self.target_value
    }

    pub fn state(&self) -> &T {
        &self.state
    }

    /// Ramp progress in `[0, 1]`; `1` when settled.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_transitioning(&self) -> bool {
        self.progress < 1.0
    }

    /// Return to the initial state, settled.
    pub fn dispose(&mut self) {
        let value = (self.transform)(&self.initial_state);
        self.state = self.initial_state.clone();
        self.start_value = value;
        self.target_value = value;
        self.current_value = value;
        self.progress = 1.0;
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveBinding")
            .field("state", &self.state)
            .field("current_value", &self.current_value)
            .field("target_value", &self.target_value)
            .field("progress", &self.progress)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

//! Frame-driven animation coordination for 3D scenes.
//!
//! This crate provides:
//! - **Time**: A single pause-aware, scale-aware, delta-capped clock
//! - **Transitions**: One-shot playbacks with phase events and keyframe tracks
//! - **Continuous loops**: Elapsed-time driven uniforms for ever-running effects
//! - **Propagation**: A pulse travelling along a graph path, then breathing
//! - **Reactive bindings**: Discrete state smoothed into ramped scalars
//!
//! # Architecture
//!
//! ```text
//! MotionEngine::tick(raw_delta)
//!   ├── TimeAuthority          (elapsed / delta)
//!   ├── LoopRegistry           (elapsed → uniforms)
//!   ├── Transition*            (PhaseTimeline + KeyframeTracks → EventBus)
//!   ├── PropagationAnimator    (pulse / breathing intensities)
//!   └── InstanceBindingManager (ReactiveBindings → instance attributes)
//! ```
//!
//! Nothing here owns a clock source or spawns threads; the host render loop
//! calls [`MotionEngine::tick`] (or the individual `update` methods) once per
//! frame.

pub mod binding;
pub mod bus;
pub mod definition;
pub mod easing;
pub mod engine;
pub mod error;
pub mod events;
pub mod instance;
pub mod interpolate;
pub mod loops;
pub mod propagation;
pub mod time;
pub mod timeline;
pub mod track;
pub mod transition;

pub use binding::{BindingHandle, ReactiveBinding};
pub use bus::{EventBus, Subscription};
pub use definition::{AnimationDefinition, Keyframe, PhaseDefinition, TrackDefinition, TrackValue};
pub use easing::Easing;
pub use engine::{FrameTime, MotionEngine};
pub use error::{MotionError, Result};
pub use events::MotionEvent;
pub use instance::{AttributeSink, InstanceAttribute, InstanceBindingManager};
pub use interpolate::Interpolate;
pub use loops::{LoopEntry, LoopRegistry, UniformCell};
pub use propagation::{
    EdgeKey, NodeId, PathFinder, PropagationAnimator, PropagationMode, PropagationSettings,
};
pub use time::TimeAuthority;
pub use timeline::{PhaseHandlers, PhaseObserver, PhaseTimeline};
pub use track::KeyframeTrack;
pub use transition::Transition;

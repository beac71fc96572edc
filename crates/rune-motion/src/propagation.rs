//! Pulse propagation along a graph path.
//!
//! A [`PropagationAnimator`] asks a [`PathFinder`] for a path between two
//! nodes, then animates a highlight travelling along it edge by edge. Once the
//! pulse reaches the last node every node on the path lights up and settles
//! into a slow "breathing" oscillation.
//!
//! # Modes
//!
//! ```text
//! Idle ──start_pulse (path found)──▶ Pulsing ──pulse reaches end──▶ Breathing
//!   ▲                                   ▲                              │
//!   └────────────dispose────────────────┴────────start_pulse───────────┘
//! ```
//!
//! # Intensities while pulsing
//!
//! With `p = pulse_progress` (edges traversed), `k = floor(p)` and
//! `f = p - k`:
//!
//! | element | rule |
//! |---|---|
//! | node `k` (leaving) | `1 - 0.5 f` |
//! | node `k + 1` (approaching) | `f` |
//! | node `i < k` (passed) | `0.5 · fade(i + 1)` |
//! | edge `k` (current) | `1` |
//! | edge `j < k` (passed) | `fade(j + 1)` |
//! | anything else | `0` |
//!
//! where `fade(x) = max(0, 1 - ((p - x) / pulse_speed) / glow_duration)`, i.e.
//! a linear fade over `glow_duration` seconds after the pulse moved on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::fmt;

use rune_motion_config::PropagationConfig;

/// Identifier of a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Undirected edge between two nodes; `EdgeKey::new(a, b) == EdgeKey::new(b, a)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    pub fn new(a: &NodeId, b: &NodeId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }

    /// The two endpoints, in sorted order.
    pub fn nodes(&self) -> (&NodeId, &NodeId) {
        (&self.0, &self.1)
    }
}

/// Source of paths between nodes.
///
/// Returning `None` or an empty path means "no path"; the animator stays idle.
pub trait PathFinder {
    fn find_path(&self, from: &NodeId, to: &NodeId) -> Option<Vec<NodeId>>;
}

impl<F> PathFinder for F
where
    F: Fn(&NodeId, &NodeId) -> Option<Vec<NodeId>>,
{
    fn find_path(&self, from: &NodeId, to: &NodeId) -> Option<Vec<NodeId>> {
        self(from, to)
    }
}

/// Current animator mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMode {
    #[default]
    Idle,
    Pulsing,
    Breathing,
}

/// Speeds and durations driving the pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationSettings {
    /// Edges per second.
    pub pulse_speed: f64,
    /// Seconds for a passed node or edge to fade out.
    pub glow_duration: f64,
    /// Breathing cycles per second.
    pub breathing_speed: f64,
}

impl Default for PropagationSettings {
    fn default() -> Self {
        Self::from(&PropagationConfig::default())
    }
}

impl From<&PropagationConfig> for PropagationSettings {
    fn from(config: &PropagationConfig) -> Self {
        Self {
            pulse_speed: config.pulse_speed.max(0.0),
            glow_duration: config.glow_duration.max(0.0),
            breathing_speed: config.breathing_speed.max(0.0),
        }
    }
}

/// Animates a pulse along a path, then breathes.
pub struct PropagationAnimator {
    finder: Box<dyn PathFinder>,
    settings: PropagationSettings,
    path: Vec<NodeId>,
    pulse_progress: f64,
    breathing_phase: f64,
    mode: PropagationMode,
    node_intensity: HashMap<NodeId, f64>,
    edge_intensity: HashMap<EdgeKey, f64>,
}

impl PropagationAnimator {
    pub fn new(finder: impl PathFinder + 'static, settings: PropagationSettings) -> Self {
        Self {
            finder: Box::new(finder),
            settings,
            path: Vec::new(),
            pulse_progress: 0.0,
            breathing_phase: 0.0,
            mode: PropagationMode::Idle,
            node_intensity: HashMap::new(),
            edge_intensity: HashMap::new(),
        }
    }

    /// Start a pulse from `from` to `to`.
    ///
    /// Returns `false` and leaves the animator untouched when no path exists.
    pub fn start_pulse(&mut self, from: &NodeId, to: &NodeId) -> bool {
        let path = match self.finder.find_path(from, to) {
            Some(path) if !path.is_empty() => path,
            _ => {
                tracing::debug!(%from, %to, "no propagation path");
                return false;
            }
        };

        self.node_intensity.clear();
        self.edge_intensity.clear();
        for node in &path {
            self.node_intensity.insert(node.clone(), 0.0);
        }
        for pair in path.windows(2) {
            self.edge_intensity.insert(EdgeKey::new(&pair[0], &pair[1]), 0.0);
        }

        tracing::debug!(%from, %to, nodes = path.len(), "pulse started");
        self.path = path;
        self.pulse_progress = 0.0;
        self.breathing_phase = 0.0;
        self.mode = PropagationMode::Pulsing;
        true
    }

    /// Advance by `delta` seconds.
    pub fn update(&mut self, delta: f64) {
        let delta = if delta.is_nan() { 0.0 } else { delta.max(0.0) };
        match self.mode {
            PropagationMode::Idle => {}
            PropagationMode::Pulsing => self.update_pulse(delta),
            PropagationMode::Breathing => self.update_breathing(delta),
        }
    }

    fn update_pulse(&mut self, delta: f64) {
        self.pulse_progress += delta * self.settings.pulse_speed;

        let edge_count = self.path.len().saturating_sub(1);
        if self.pulse_progress >= edge_count as f64 {
            self.enter_breathing();
            return;
        }

        let progress = self.pulse_progress;
        let current = progress.floor() as usize;
        let fraction = progress - current as f64;

        for (i, node) in self.path.iter().enumerate() {
            let intensity = if i < current {
                0.5 * self.fade(i + 1)
            } else if i == current {
                1.0 - 0.5 * fraction
            } else if i == current + 1 {
                fraction
            } else {
                0.0
            };
            self.node_intensity.insert(node.clone(), intensity);
        }

        for (j, pair) in self.path.windows(2).enumerate() {
            let intensity = if j < current {
                self.fade(j + 1)
            } else if j == current {
                1.0
            } else {
                0.0
            };
            self.edge_intensity
                .insert(EdgeKey::new(&pair[0], &pair[1]), intensity);
        }
    }

    /// Linear fade for something the pulse left at `left_at` edges.
    fn fade(&self, left_at: usize) -> f64 {
        let speed = self.settings.pulse_speed;
        let glow = self.settings.glow_duration;
        if speed <= 0.0 || glow <= 0.0 {
            return 0.0;
        }
        let seconds_since = (self.pulse_progress - left_at as f64).max(0.0) / speed;
        (1.0 - seconds_since / glow).clamp(0.0, 1.0)
    }

    fn enter_breathing(&mut self) {
        self.mode = PropagationMode::Breathing;
        self.breathing_phase = 0.0;
        for node in &self.path {
            self.node_intensity.insert(node.clone(), 1.0);
        }
        for pair in self.path.windows(2) {
            self.edge_intensity.insert(EdgeKey::new(&pair[0], &pair[1]), 1.0);
        }
        tracing::debug!(nodes = self.path.len(), "pulse arrived, breathing");
    }

    fn update_breathing(&mut self, delta: f64) {
        self.breathing_phase += delta * self.settings.breathing_speed;
        let intensity = Self::breathing_intensity(self.breathing_phase);
        for node in &self.path {
            self.node_intensity.insert(node.clone(), intensity);
        }
    }

    /// Node intensity while breathing, bounded in `[0.4, 1.0]`.
    pub fn breathing_intensity(phase: f64) -> f64 {
        0.7 + 0.3 * (phase * TAU).sin()
    }

    /// Intensity of a node; `0` for nodes off the current path.
    pub fn get_node_intensity(&self, id: &NodeId) -> f64 {
        self.node_intensity.get(id).copied().unwrap_or(0.0)
    }

    /// Intensity of the edge between `a` and `b` in either direction; `0` off path.
    pub fn get_edge_intensity(&self, a: &NodeId, b: &NodeId) -> f64 {
        self.edge_intensity
            .get(&EdgeKey::new(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Copy of every node intensity.
    pub fn get_all_node_intensities(&self) -> HashMap<NodeId, f64> {
        self.node_intensity.clone()
    }

    /// Copy of every edge intensity.
    pub fn get_all_edge_intensities(&self) -> HashMap<EdgeKey, f64> {
        self.edge_intensity.clone()
    }

    pub fn mode(&self) -> PropagationMode {
        self.mode
    }

    pub fn is_pulsing(&self) -> bool {
        self.mode == PropagationMode::Pulsing
    }

    pub fn is_breathing(&self) -> bool {
        self.mode == PropagationMode::Breathing
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Edges traversed so far.
    pub fn pulse_progress(&self) -> f64 {
        self.pulse_progress
    }

    pub fn breathing_phase(&self) -> f64 {
        self.breathing_phase
    }

    pub fn settings(&self) -> &PropagationSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: PropagationSettings) {
        self.settings = settings;
    }

    /// Stop and clear the path and every intensity.
    pub fn dispose(&mut self) {
        self.mode = PropagationMode::Idle;
        self.path.clear();
        self.node_intensity.clear();
        self.edge_intensity.clear();
        self.pulse_progress = 0.0;
        self.breathing_phase = 0.0;
    }
}

impl fmt::Debug for PropagationAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropagationAnimator")
            .field("mode", &self.mode)
            .field("path", &self.path)
            .field("pulse_progress", &self.pulse_progress)
            .field("breathing_phase", &self.breathing_phase)
            .finish_non_exhaustive()
    }
}

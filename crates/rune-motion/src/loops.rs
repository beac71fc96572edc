//! Continuously driven uniforms.
//!
//! Effects that run forever (an animated surface, a flowing background) do not
//! need playback state, only a value derived from elapsed time. The
//! [`LoopRegistry`] maps a name to a [`UniformCell`] and writes
//! `elapsed * frequency_multiplier + phase_offset` into each cell every frame,
//! in registration order.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared numeric cell a consumer (e.g. a shader uniform) reads from.
///
/// Clones refer to the same cell.
#[derive(Debug, Clone, Default)]
pub struct UniformCell(Rc<Cell<f64>>);

impl UniformCell {
    pub fn new(value: f64) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }

    pub fn set(&self, value: f64) {
        self.0.set(value);
    }

    /// Whether two handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// One registered loop.
#[derive(Debug, Clone)]
pub struct LoopEntry {
    name: String,
    target: UniformCell,
    pub frequency_multiplier: f64,
    pub phase_offset: f64,
}

impl LoopEntry {
    fn new(name: String, target: UniformCell) -> Self {
        Self {
            name,
            target,
            frequency_multiplier: 1.0,
            phase_offset: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &UniformCell {
        &self.target
    }

    /// Set the frequency multiplier.
    pub fn with_frequency(&mut self, multiplier: f64) -> &mut Self {
        self.frequency_multiplier = multiplier;
        self
    }

    /// Set the phase offset.
    pub fn with_phase_offset(&mut self, offset: f64) -> &mut Self {
        self.phase_offset = offset;
        self
    }

    /// Value this loop produces at `elapsed` seconds.
    pub fn value_at(&self, elapsed: f64) -> f64 {
        elapsed * self.frequency_multiplier + self.phase_offset
    }

    fn apply(&self, elapsed: f64) {
        self.target.set(self.value_at(elapsed));
    }
}

/// Named continuous loops, updated in registration order.
#[derive(Debug, Default)]
pub struct LoopRegistry {
    entries: HashMap<String, LoopEntry>,
    order: Vec<String>,
}

impl LoopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loop driving `target`.
    ///
    /// If `name` is already registered the existing entry is returned and
    /// `target` is ignored.
    pub fn register(&mut self, name: &str, target: UniformCell) -> &mut LoopEntry {
        if !self.entries.contains_key(name) {
            tracing::debug!(name, "loop registered");
            self.order.push(name.to_string());
        }
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| LoopEntry::new(name.to_string(), target))
    }

    /// Remove a loop. Returns `true` if it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        let removed = self.entries.remove(name).is_some();
        if removed {
            self.order.retain(|n| n != name);
            tracing::debug!(name, "loop unregistered");
        }
        removed
    }

    /// Write the current value of every loop into its target.
    pub fn update(&self, elapsed: f64) {
        for name in &self.order {
            if let Some(entry) = self.entries.get(name) {
                entry.apply(elapsed);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&LoopEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut LoopEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every loop.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

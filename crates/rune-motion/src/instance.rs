//! Batch application of reactive bindings to per-instance attributes.
//!
//! Instanced geometry keeps one value per instance in a flat attribute
//! buffer. An [`InstanceBindingManager`] owns those buffers by name and a list
//! of bindings targeting `(attribute, index)` slots. Each frame
//! [`update_bindings`](InstanceBindingManager::update_bindings) advances every
//! binding and writes its value into the slot, flagging the buffer for upload.
//!
//! Attributes can be registered and detached independently of the bindings
//! pointing at them; a binding whose attribute is missing keeps animating but
//! writes nowhere.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rune_motion_config::BindingsConfig;

use crate::binding::{BindingHandle, ReactiveBinding};

/// Destination a binding writes into.
pub trait AttributeSink {
    /// Overwrite the value at `index`.
    fn write(&mut self, index: usize, value: f64);

    /// Flag the sink as changed since it was last consumed.
    fn mark_dirty(&mut self);
}

/// Flat `f32` attribute buffer with a dirty flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceAttribute {
    values: Vec<f32>,
    needs_update: bool,
    version: u64,
}

impl InstanceAttribute {
    /// A buffer of `len` zeros.
    pub fn new(len: usize) -> Self {
        Self::from_values(vec![0.0; len])
    }

    pub fn from_values(values: Vec<f32>) -> Self {
        Self {
            values,
            needs_update: false,
            version: 0,
        }
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Number of times the buffer has been marked dirty.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }
}

impl AttributeSink for InstanceAttribute {
    fn write(&mut self, index: usize, value: f64) {
        // Out of range writes are dropped.
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value as f32;
        }
    }

    fn mark_dirty(&mut self) {
        self.needs_update = true;
        self.version += 1;
    }
}

/// Type-erased view of a `ReactiveBinding<T>`.
trait DrivenBinding {
    fn advance(&mut self, delta: f64) -> f64;
    fn dispose(&mut self);
}

impl<T: Clone> DrivenBinding for ReactiveBinding<T> {
    fn advance(&mut self, delta: f64) -> f64 {
        self.update(delta)
    }

    fn dispose(&mut self) {
        ReactiveBinding::dispose(self);
    }
}

struct BoundSlot {
    attribute: String,
    index: usize,
    binding: Rc<RefCell<dyn DrivenBinding>>,
}

/// Owns attribute sinks and the bindings that write into them.
pub struct InstanceBindingManager<S: AttributeSink = InstanceAttribute> {
    attributes: HashMap<String, S>,
    bindings: Vec<BoundSlot>,
    default_duration: f64,
}

impl<S: AttributeSink> Default for InstanceBindingManager<S> {
    fn default() -> Self {
        Self::new(crate::binding::DEFAULT_TRANSITION_DURATION)
    }
}

impl<S: AttributeSink> InstanceBindingManager<S> {
    /// Create a manager whose [`create_binding`](Self::create_binding) uses
    /// `default_duration` seconds per transition.
    pub fn new(default_duration: f64) -> Self {
        Self {
            attributes: HashMap::new(),
            bindings: Vec::new(),
            default_duration,
        }
    }

    pub fn from_config(config: &BindingsConfig) -> Self {
        Self::new(config.transition_duration.max(0.0))
    }

    pub fn default_duration(&self) -> f64 {
        self.default_duration
    }

    /// Register (or replace) the sink named `name`.
    pub fn register_attribute(&mut self, name: &str, sink: S) -> Option<S> {
        self.attributes.insert(name.to_string(), sink)
    }

    /// Detach a sink. Bindings targeting it stay alive and are skipped.
    pub fn detach_attribute(&mut self, name: &str) -> Option<S> {
        self.attributes.remove(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&S> {
        self.attributes.get(name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut S> {
        self.attributes.get_mut(name)
    }

    /// Bind slot `index` of `attribute` to a new binding over `initial`.
    ///
    /// The attribute does not need to exist yet.
    pub fn create_binding<T, F>(
        &mut self,
        attribute: &str,
        index: usize,
        initial: T,
        transform: F,
    ) -> BindingHandle<T>
    where
        T: Clone + 'static,
        F: Fn(&T) -> f64 + 'static,
    {
        let binding = ReactiveBinding::new(initial, transform).with_duration(self.default_duration);
        self.add_binding(attribute, index, binding)
    }

    /// Bind slot `index` of `attribute` to an already configured binding.
    pub fn add_binding<T>(
        &mut self,
        attribute: &str,
        index: usize,
        binding: ReactiveBinding<T>,
    ) -> BindingHandle<T>
    where
        T: Clone + 'static,
    {
        let handle = Rc::new(RefCell::new(binding));
        let erased: Rc<RefCell<dyn DrivenBinding>> = handle.clone();
        self.bindings.push(BoundSlot {
            attribute: attribute.to_string(),
            index,
            binding: erased,
        });
        handle
    }

    /// Advance every binding and write values into registered attributes.
    pub fn update_bindings(&mut self, delta: f64) {
        for slot in &self.bindings {
            let value = slot.binding.borrow_mut().advance(delta);
            if let Some(sink) = self.attributes.get_mut(&slot.attribute) {
                sink.write(slot.index, value);
                sink.mark_dirty();
            }
        }
    }

    /// Dispose and drop the first binding on `(attribute, index)`.
    ///
    /// Returns `false` if there was none.
    pub fn remove_binding(&mut self, attribute: &str, index: usize) -> bool {
        let Some(position) = self
            .bindings
            .iter()
            .position(|slot| slot.attribute == attribute && slot.index == index)
        else {
            return false;
        };
        let slot = self.bindings.remove(position);
        slot.binding.borrow_mut().dispose();
        true
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Dispose every binding and drop every attribute.
    pub fn dispose(&mut self) {
        for slot in self.bindings.drain(..) {
            slot.binding.borrow_mut().dispose();
        }
        self.attributes.clear();
    }
}

impl<S: AttributeSink> std::fmt::Debug for InstanceBindingManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut attributes: Vec<&String> = self.attributes.keys().collect();
        attributes.sort();
        f.debug_struct("InstanceBindingManager")
            .field("attributes", &attributes)
            .field("bindings", &self.bindings.len())
            .field("default_duration", &self.default_duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn flag(on: &bool) -> f64 {
        if *on { 1.0 } else { 0.0 }
    }

    #[test]
    fn test_attribute_write_and_dirty() {
        let mut attr = InstanceAttribute::new(2);
        attr.write(1, 0.5);
        attr.write(9, 1.0);
        assert_eq!(attr.values(), &[0.0, 0.5]);
        assert!(!attr.needs_update());

        attr.mark_dirty();
        assert_eq!(attr.version(), 1);
        assert!(attr.take_dirty());
        assert!(!attr.take_dirty());
    }

    #[test]
    fn test_update_writes_and_marks_dirty() {
        let mut manager: InstanceBindingManager = InstanceBindingManager::new(0.5);
        manager.register_attribute("highlight", InstanceAttribute::new(4));
        let binding = manager.create_binding("highlight", 2, false, flag);

        binding.borrow_mut().set_state(true);
        manager.update_bindings(0.25);

        let attr = manager.attribute("highlight").unwrap();
        assert!((attr.get(2).unwrap() - 0.5).abs() < EPSILON);
        assert_eq!(attr.get(0), Some(0.0));
        assert!(attr.needs_update());
    }

    #[test]
    fn test_missing_attribute_is_skipped() {
        let mut manager: InstanceBindingManager = InstanceBindingManager::new(0.5);
        let binding = manager.create_binding("later", 0, false, flag);
        binding.borrow_mut().set_state(true);
        manager.update_bindings(0.25);
        assert!(binding.borrow().is_transitioning());

        manager.register_attribute("later", InstanceAttribute::new(1));
        manager.update_bindings(0.25);
        assert_eq!(manager.attribute("later").unwrap().get(0), Some(1.0));
    }

    #[test]
    fn test_detach_attribute() {
        let mut manager: InstanceBindingManager = InstanceBindingManager::default();
        manager.register_attribute("a", InstanceAttribute::new(1));
        manager.create_binding("a", 0, 3.0_f64, |v: &f64| *v);

        let detached = manager.detach_attribute("a").unwrap();
        assert!(!detached.needs_update());
        manager.update_bindings(0.1);
        assert!(manager.attribute("a").is_none());
    }

    #[test]
    fn test_remove_binding() {
        let mut manager: InstanceBindingManager = InstanceBindingManager::new(0.5);
        manager.register_attribute("a", InstanceAttribute::new(2));
        let binding = manager.create_binding("a", 1, false, flag);
        binding.borrow_mut().set_state(true);
        manager.update_bindings(0.1);

        assert!(!manager.remove_binding("a", 0));
        assert!(manager.remove_binding("a", 1));
        assert!(!manager.remove_binding("a", 1));
        assert_eq!(manager.binding_count(), 0);
        // disposed back to the initial state
        assert_eq!(binding.borrow().current_value(), 0.0);
    }

    #[test]
    fn test_dispose() {
        let mut manager: InstanceBindingManager = InstanceBindingManager::new(0.5);
        manager.register_attribute("a", InstanceAttribute::new(1));
        let binding = manager.create_binding("a", 0, false, flag);
        binding.borrow_mut().set_state(true);

        manager.dispose();
        assert_eq!(manager.binding_count(), 0);
        assert!(manager.attribute("a").is_none());
        assert!(!binding.borrow().is_transitioning());
    }

    #[test]
    fn test_custom_sink() {
        #[derive(Default)]
        struct Recorder {
            writes: Vec<(usize, f64)>,
            dirty: usize,
        }

        impl AttributeSink for Recorder {
            fn write(&mut self, index: usize, value: f64) {
                self.writes.push((index, value));
            }

            fn mark_dirty(&mut self) {
                self.dirty += 1;
            }
        }

        let mut manager: InstanceBindingManager<Recorder> = InstanceBindingManager::new(0.0);
        manager.register_attribute("r", Recorder::default());
        manager.create_binding("r", 7, 2.0_f64, |v: &f64| *v * 2.0);
        manager.update_bindings(0.016);

        let recorder = manager.attribute("r").unwrap();
        assert_eq!(recorder.writes, vec![(7, 4.0)]);
        assert_eq!(recorder.dirty, 1);
    }

    #[test]
    fn test_from_config() {
        let config = BindingsConfig {
            transition_duration: 0.75,
        };
        let manager: InstanceBindingManager = InstanceBindingManager::from_config(&config);
        assert_eq!(manager.default_duration(), 0.75);
    }
}

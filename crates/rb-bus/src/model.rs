//! Shared Model
//!
//! String-keyed field store. Reads take a default for missing or mistyped
//! fields. A `set` that changes a field publishes `On{Field}Changed` on the
//! attached bus after the write lock is released.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use rb_core::field_changed_event;

use crate::bus::EventBus;
use crate::value::Value;

/// Cloneable handle to the shared field store
#[derive(Debug, Clone)]
pub struct SharedModel {
    fields: Arc<RwLock<HashMap<String, Value>>>,
    bus: EventBus,
}

impl SharedModel {
    /// Create a model that announces changes on `bus`
    pub fn new(bus: EventBus) -> Self {
        Self {
            fields: Arc::new(RwLock::new(HashMap::new())),
            bus,
        }
    }

    /// Bus used for change notifications
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Write a field. Returns true when the stored value changed.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let changed = {
            let mut fields = self.fields.write();
            if fields.get(field) == Some(&value) {
                false
            } else {
                fields.insert(field.to_string(), value);
                true
            }
        };

        if changed {
            log::trace!("model {field} changed");
            self.bus.publish(&field_changed_event(field), &[]);
        }
        changed
    }

    /// Raw field value
    pub fn get(&self, field: &str) -> Option<Value> {
        self.fields.read().get(field).cloned()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.read().contains_key(field)
    }

    pub fn get_bool(&self, field: &str, default: bool) -> bool {
        self.get(field).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    pub fn get_int(&self, field: &str, default: i64) -> i64 {
        self.get(field).and_then(|v| v.as_int()).unwrap_or(default)
    }

    pub fn get_float(&self, field: &str, default: f64) -> f64 {
        self.get(field).and_then(|v| v.as_float()).unwrap_or(default)
    }

    pub fn get_string(&self, field: &str, default: &str) -> String {
        self.get(field)
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| default.to_string())
    }

    /// Remove a field; publishes a change if it existed
    pub fn remove(&self, field: &str) -> Option<Value> {
        let removed = self.fields.write().remove(field);
        if removed.is_some() {
            self.bus.publish(&field_changed_event(field), &[]);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_defaults_for_missing_fields() {
        let model = SharedModel::new(EventBus::new());
        assert!(model.get_bool("BtnStartEnable", true));
        assert_eq!(model.get_int("SlotPendingStops", 1), 1);
        assert_eq!(model.get_float("Speed", 0.5), 0.5);
        assert_eq!(model.get_string("Key", "space"), "space");
    }

    #[test]
    fn test_mistyped_field_uses_default() {
        let model = SharedModel::new(EventBus::new());
        model.set("SlotReelsCount", "three");
        assert_eq!(model.get_int("SlotReelsCount", 1), 1);
    }

    #[test]
    fn test_change_notification_fires_once_per_change() {
        let bus = EventBus::new();
        let model = SharedModel::new(bus.clone());
        let hits = Arc::new(AtomicU32::new(0));
        {
            let hits = hits.clone();
            bus.subscribe("OnBtnStopEnableChanged", move |_| {
                hits.fetch_add(1, Ordering::Relaxed);
            });
        }

        assert!(model.set("BtnStopEnable", false));
        assert!(!model.set("BtnStopEnable", false));
        assert!(model.set("BtnStopEnable", true));

        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_handler_can_read_model_during_notification() {
        let bus = EventBus::new();
        let model = SharedModel::new(bus.clone());
        let seen = Arc::new(AtomicU32::new(0));
        {
            let model = model.clone();
            let seen = seen.clone();
            bus.subscribe("OnSlotPendingStopsChanged", move |_| {
                seen.store(model.get_int("SlotPendingStops", -1) as u32, Ordering::Relaxed);
            });
        }

        model.set("SlotPendingStops", 3usize);
        assert_eq!(seen.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_remove() {
        let model = SharedModel::new(EventBus::new());
        model.set("A", 1i64);
        assert!(model.contains("A"));
        assert_eq!(model.remove("A"), Some(Value::Int(1)));
        assert!(!model.contains("A"));
        assert_eq!(model.remove("A"), None);
    }
}

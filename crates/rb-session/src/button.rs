//! Button surface
//!
//! A named button gated by a boolean model field. Pressing an enabled button
//! publishes `OnBtn(name)`; pressing a disabled one does nothing.

use rb_bus::{EventBus, SharedModel, SubscriptionId, Value};
use rb_core::{EVENT_BUTTON, button_enable_field, field_changed_event};

#[derive(Debug, Clone)]
pub struct Button {
    name: String,
    enable_field: String,
    /// Interactability before the field is first written
    default_enabled: bool,
    model: SharedModel,
}

impl Button {
    /// Button bound to its conventional `Btn{name}Enable` field
    pub fn new(name: &str, model: SharedModel) -> Self {
        Self::with_enable_field(name, &button_enable_field(name), model)
    }

    pub fn with_enable_field(name: &str, enable_field: &str, model: SharedModel) -> Self {
        Self {
            name: name.to_string(),
            enable_field: enable_field.to_string(),
            default_enabled: true,
            model,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enable_field(&self) -> &str {
        &self.enable_field
    }

    pub fn is_enabled(&self) -> bool {
        self.model.get_bool(&self.enable_field, self.default_enabled)
    }

    /// Publish `OnBtn(name)` if enabled. Returns whether the press went out.
    pub fn press(&self) -> bool {
        if !self.is_enabled() {
            log::debug!("button {} pressed while disabled", self.name);
            return false;
        }

        log::debug!("button {} pressed", self.name);
        self.model
            .bus()
            .publish(EVENT_BUTTON, &[Value::from(self.name.as_str())]);
        true
    }

    /// Call `handler` with the new state whenever the enable field changes
    pub fn on_enable_changed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let model = self.model.clone();
        let field = self.enable_field.clone();
        let default = self.default_enabled;
        self.bus()
            .subscribe(&field_changed_event(&self.enable_field), move |_| {
                handler(model.get_bool(&field, default))
            })
    }

    fn bus(&self) -> &EventBus {
        self.model.bus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rb_core::{START_BUTTON, START_ENABLE_FIELD};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    fn start_button() -> (Button, Arc<AtomicU32>) {
        let model = SharedModel::new(EventBus::new());
        let presses = Arc::new(AtomicU32::new(0));
        {
            let presses = presses.clone();
            model.bus().subscribe(EVENT_BUTTON, move |e| {
                assert_eq!(e.arg_str(0), Some(START_BUTTON));
                presses.fetch_add(1, Ordering::Relaxed);
            });
        }
        (Button::new(START_BUTTON, model), presses)
    }

    #[test]
    fn test_enabled_by_default() {
        let (button, presses) = start_button();
        assert_eq!(button.enable_field(), START_ENABLE_FIELD);
        assert!(button.press());
        assert_eq!(presses.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_disabled_press_is_ignored() {
        let (button, presses) = start_button();
        button.model.set(START_ENABLE_FIELD, false);
        assert!(!button.press());
        assert_eq!(presses.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_enable_change_notifies() {
        let (button, _) = start_button();
        let seen = Arc::new(AtomicBool::new(true));
        {
            let seen = seen.clone();
            button.on_enable_changed(move |enabled| seen.store(enabled, Ordering::Relaxed));
        }

        button.model.set(START_ENABLE_FIELD, false);
        assert!(!seen.load(Ordering::Relaxed));
        button.model.set(START_ENABLE_FIELD, true);
        assert!(seen.load(Ordering::Relaxed));
    }
}

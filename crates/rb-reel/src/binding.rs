//! Bus binding for a reel controller
//!
//! Subscribes the controller to `SlotStartSpin` / `SlotStopSpin` and
//! publishes `SlotVisualStopped` (argument: reel index) when a stop-and-snap
//! sequence settles. The controller lock is released before publishing, so
//! listeners may freely broadcast back to reels.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use rb_bus::{EventBus, SubscriptionId, Value};
use rb_core::{EVENT_START_SPIN, EVENT_STOP_SPIN, EVENT_VISUAL_STOPPED};

use crate::controller::{ReelController, TickReport};

/// A reel controller wired to the event bus
pub struct ReelBinding {
    index: usize,
    controller: Arc<Mutex<ReelController>>,
    bus: EventBus,
    subscriptions: Vec<SubscriptionId>,
}

impl ReelBinding {
    /// Take ownership of `controller` and subscribe it to spin signals
    pub fn attach(controller: ReelController, bus: &EventBus) -> Self {
        let index = controller.index();
        let controller = Arc::new(Mutex::new(controller));

        let on_start = {
            let controller = controller.clone();
            bus.subscribe(EVENT_START_SPIN, move |_| controller.lock().start_spin())
        };
        let on_stop = {
            let controller = controller.clone();
            bus.subscribe(EVENT_STOP_SPIN, move |_| {
                controller.lock().stop_spin();
            })
        };

        Self {
            index,
            controller,
            bus: bus.clone(),
            subscriptions: vec![on_start, on_stop],
        }
    }

    /// Advance the reel one frame, announcing a completed stop
    pub fn tick(&self, dt: f32) -> TickReport {
        let report = self.controller.lock().tick(dt);

        if report.stopped {
            self.bus
                .publish(EVENT_VISUAL_STOPPED, &[Value::from(self.index)]);
        }
        report
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Lock the controller for inspection
    ///
    /// Do not publish spin signals while holding the guard.
    pub fn controller(&self) -> MutexGuard<'_, ReelController> {
        self.controller.lock()
    }
}

impl Drop for ReelBinding {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }
    }
}

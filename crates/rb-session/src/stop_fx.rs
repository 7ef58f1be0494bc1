//! Stop feedback
//!
//! Restarts a one-shot effect each time a reel reports it has stopped. The
//! effect itself lives with the presentation layer; this counts restarts and
//! records which reel triggered the last one.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use rb_bus::{EventBus, SubscriptionId};
use rb_core::EVENT_VISUAL_STOPPED;

#[derive(Debug, Default)]
struct FxCounters {
    restarts: AtomicU64,
    last_reel: AtomicI64,
}

pub struct StopFx {
    counters: Arc<FxCounters>,
    bus: EventBus,
    subscription: SubscriptionId,
}

impl StopFx {
    pub fn attach(bus: &EventBus) -> Self {
        let counters = Arc::new(FxCounters {
            restarts: AtomicU64::new(0),
            last_reel: AtomicI64::new(-1),
        });

        let subscription = {
            let counters = counters.clone();
            bus.subscribe(EVENT_VISUAL_STOPPED, move |event| {
                let reel = event.arg(0).and_then(|v| v.as_int()).unwrap_or(-1);
                counters.restarts.fetch_add(1, Ordering::Relaxed);
                counters.last_reel.store(reel, Ordering::Relaxed);
                log::trace!("stop fx restarted by reel {reel}");
            })
        };

        Self {
            counters,
            bus: bus.clone(),
            subscription,
        }
    }

    /// Times the effect has been (re)started
    pub fn restarts(&self) -> u64 {
        self.counters.restarts.load(Ordering::Relaxed)
    }

    /// Reel index behind the latest restart
    pub fn last_reel(&self) -> Option<usize> {
        usize::try_from(self.counters.last_reel.load(Ordering::Relaxed)).ok()
    }
}

impl Drop for StopFx {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}

//! Spin session states
//!
//! ```text
//! Bootstrap ──► Idle ──Start──► Accelerating ──(unlock delay)──► SpinningReady
//!                ▲                                                    │ Stop
//!                └──────────── all reels stopped ◄──── Stopping ◄─────┘
//! ```
//!
//! Each state owns the button enable flags while it is active and writes
//! them on enter, before publishing anything.

use rb_bus::BusEvent;
use rb_core::{
    EVENT_BUTTON, EVENT_START_SPIN, EVENT_STOP_SPIN, EVENT_VISUAL_STOPPED, PENDING_STOPS_FIELD,
    REELS_COUNT_FIELD, START_BUTTON, START_ENABLE_FIELD, STOP_BUTTON, STOP_ENABLE_FIELD,
};

use crate::fsm::{SessionState, StateContext, StateName, TimerTag};

/// Timer tag for the minimum-spin-time unlock
pub const UNLOCK_STOP: TimerTag = "unlock_stop";

fn set_buttons(ctx: &StateContext<'_>, start: bool, stop: bool) {
    ctx.model().set(START_ENABLE_FIELD, start);
    ctx.model().set(STOP_ENABLE_FIELD, stop);
}

fn is_button(event: &BusEvent, button: &str) -> bool {
    event.name == EVENT_BUTTON && event.arg_str(0) == Some(button)
}

/// Entry state: publish initial button flags, then hand over to Idle
#[derive(Debug, Default)]
pub struct BootstrapState;

impl BootstrapState {
    pub const NAME: StateName = "Bootstrap";
}

impl SessionState for BootstrapState {
    fn name(&self) -> StateName {
        Self::NAME
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        set_buttons(ctx, true, false);
        ctx.change(IdleState::NAME);
    }
}

/// Waiting for the player
#[derive(Debug, Default)]
pub struct IdleState;

impl IdleState {
    pub const NAME: StateName = "Idle";
}

impl SessionState for IdleState {
    fn name(&self) -> StateName {
        Self::NAME
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        set_buttons(ctx, true, false);
    }

    fn on_event(&mut self, event: &BusEvent, ctx: &mut StateContext<'_>) {
        if is_button(event, START_BUTTON) {
            ctx.change(AcceleratingState::NAME);
        }
    }
}

/// Reels spinning up; stop stays locked for `unlock_delay` seconds
#[derive(Debug)]
pub struct AcceleratingState {
    unlock_delay: f32,
}

impl AcceleratingState {
    pub const NAME: StateName = "Accelerating";

    pub fn new(unlock_delay: f32) -> Self {
        Self { unlock_delay }
    }

    pub fn unlock_delay(&self) -> f32 {
        self.unlock_delay
    }
}

impl Default for AcceleratingState {
    fn default() -> Self {
        Self::new(rb_core::SessionConfig::default().stop_unlock_delay)
    }
}

impl SessionState for AcceleratingState {
    fn name(&self) -> StateName {
        Self::NAME
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        set_buttons(ctx, false, false);
        log::info!("spin started, stop unlocks in {:.2}s", self.unlock_delay);
        ctx.bus().publish(EVENT_START_SPIN, &[]);
        ctx.schedule_once(self.unlock_delay, UNLOCK_STOP);
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut StateContext<'_>) {
        if tag == UNLOCK_STOP {
            ctx.change(SpinningReadyState::NAME);
        }
    }
}

/// Full spin, stop allowed
#[derive(Debug, Default)]
pub struct SpinningReadyState;

impl SpinningReadyState {
    pub const NAME: StateName = "SpinningReady";
}

impl SessionState for SpinningReadyState {
    fn name(&self) -> StateName {
        Self::NAME
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        set_buttons(ctx, false, true);
    }

    fn on_event(&mut self, event: &BusEvent, ctx: &mut StateContext<'_>) {
        if is_button(event, STOP_BUTTON) {
            ctx.change(StoppingState::NAME);
        }
    }
}

/// Stop barrier: waits for one visual-stopped per reel
#[derive(Debug, Default)]
pub struct StoppingState;

impl StoppingState {
    pub const NAME: StateName = "Stopping";
}

impl SessionState for StoppingState {
    fn name(&self) -> StateName {
        Self::NAME
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        set_buttons(ctx, false, false);

        let reels = ctx.model().get_int(REELS_COUNT_FIELD, 1).max(1);
        ctx.model().set(PENDING_STOPS_FIELD, reels);
        log::info!("stopping, waiting for {reels} reel(s)");

        ctx.bus().publish(EVENT_STOP_SPIN, &[]);
    }

    fn on_event(&mut self, event: &BusEvent, ctx: &mut StateContext<'_>) {
        if event.name != EVENT_VISUAL_STOPPED {
            return;
        }

        let pending = ctx.model().get_int(PENDING_STOPS_FIELD, 1) - 1;
        ctx.model().set(PENDING_STOPS_FIELD, pending);
        log::debug!(
            "reel {} stopped, {pending} pending",
            event.arg(0).and_then(|v| v.as_int()).unwrap_or(-1)
        );

        if pending <= 0 {
            ctx.change(IdleState::NAME);
        }
    }
}

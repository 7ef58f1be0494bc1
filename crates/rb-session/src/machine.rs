//! Slot machine assembly
//!
//! Wires one shared model and bus to the reels, the session FSM, the two
//! buttons and the stop effect, then drives them from a single frame tick.

use rb_bus::{EventBus, SharedModel, SubscriptionId};
use rb_core::{
    EVENT_BUTTON, EVENT_VISUAL_STOPPED, MachineConfig, PENDING_STOPS_FIELD, REELS_COUNT_FIELD,
    RbResult, ReelConfig, START_BUTTON, STOP_BUTTON,
};
use rb_reel::binding::ReelBinding;
use rb_reel::controller::{ReelController, SpinMode};

use crate::button::Button;
use crate::fsm::{FsmHandle, StateMachine, StateName};
use crate::states::{
    AcceleratingState, BootstrapState, IdleState, SpinningReadyState, StoppingState,
};
use crate::stop_fx::StopFx;

/// Complete spin session: reels, orchestrator and controls
pub struct SlotMachine {
    config: MachineConfig,
    model: SharedModel,
    bus: EventBus,
    fsm: FsmHandle,
    reels: Vec<ReelBinding>,
    start_button: Button,
    stop_button: Button,
    stop_fx: StopFx,
    routes: Vec<SubscriptionId>,
    elapsed: f64,
}

impl SlotMachine {
    pub fn new(config: MachineConfig) -> RbResult<Self> {
        config.validate()?;

        let bus = EventBus::new();
        let model = SharedModel::new(bus.clone());

        let reel_configs = if config.reels.is_empty() {
            log::warn!("no reels configured, using a single default reel");
            vec![ReelConfig::default()]
        } else {
            config.reels.clone()
        };

        let reels: Vec<ReelBinding> = reel_configs
            .into_iter()
            .enumerate()
            .map(|(index, reel)| {
                let seed = config.seed.map(|s| s.wrapping_add(index as u64));
                ReelBinding::attach(ReelController::new(index, reel, seed), &bus)
            })
            .collect();

        model.set(REELS_COUNT_FIELD, reels.len().max(1));

        let mut machine = StateMachine::new(model.clone(), bus.clone());
        machine
            .add(BootstrapState)
            .add(IdleState)
            .add(AcceleratingState::new(config.session.stop_unlock_delay))
            .add(SpinningReadyState)
            .add(StoppingState);

        let fsm = FsmHandle::new(machine);
        let routes = vec![
            fsm.route(&bus, EVENT_BUTTON),
            fsm.route(&bus, EVENT_VISUAL_STOPPED),
        ];

        let stop_fx = StopFx::attach(&bus);
        let start_button = Button::new(START_BUTTON, model.clone());
        let stop_button = Button::new(STOP_BUTTON, model.clone());

        fsm.start(BootstrapState::NAME)?;

        log::info!(
            "slot machine ready: {} reel(s), stop unlock {:.2}s",
            reels.len(),
            config.session.stop_unlock_delay
        );

        Ok(Self {
            config,
            model,
            bus,
            fsm,
            reels,
            start_button,
            stop_button,
            stop_fx,
            routes,
            elapsed: 0.0,
        })
    }

    /// Advance one frame: session timers first, then every reel in order
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += f64::from(dt);

        self.fsm.update(dt);
        for reel in &self.reels {
            reel.tick(dt);
        }
    }

    pub fn press_start(&self) -> bool {
        self.start_button.press()
    }

    pub fn press_stop(&self) -> bool {
        self.stop_button.press()
    }

    pub fn state(&self) -> Option<StateName> {
        self.fsm.current()
    }

    pub fn start_enabled(&self) -> bool {
        self.start_button.is_enabled()
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_button.is_enabled()
    }

    pub fn pending_stops(&self) -> i64 {
        self.model.get_int(PENDING_STOPS_FIELD, 0)
    }

    pub fn reels_count(&self) -> usize {
        self.reels.len()
    }

    pub fn reels(&self) -> &[ReelBinding] {
        &self.reels
    }

    pub fn start_button(&self) -> &Button {
        &self.start_button
    }

    pub fn stop_button(&self) -> &Button {
        &self.stop_button
    }

    pub fn stop_fx(&self) -> &StopFx {
        &self.stop_fx
    }

    pub fn fsm(&self) -> &FsmHandle {
        &self.fsm
    }

    pub fn model(&self) -> &SharedModel {
        &self.model
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Simulated time since construction (seconds)
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Symbol under the center line of each reel
    pub fn center_symbols(&self) -> Vec<Option<String>> {
        self.reels
            .iter()
            .map(|reel| reel.controller().center_symbol().map(str::to_string))
            .collect()
    }

    /// Session back in Idle with every reel at rest
    pub fn is_settled(&self) -> bool {
        self.state() == Some(IdleState::NAME)
            && self
                .reels
                .iter()
                .all(|reel| reel.controller().mode() == SpinMode::Idle)
    }
}

impl Drop for SlotMachine {
    fn drop(&mut self) {
        // routes hold the FSM, which holds the bus: break the cycle
        for id in self.routes.drain(..) {
            self.bus.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_idle() {
        let machine = SlotMachine::new(MachineConfig::three_reel().with_seed(1)).unwrap();
        assert_eq!(machine.state(), Some(IdleState::NAME));
        assert_eq!(machine.reels_count(), 3);
        assert_eq!(machine.model().get_int(REELS_COUNT_FIELD, 0), 3);
        assert!(machine.start_enabled());
        assert!(!machine.stop_enabled());
    }

    #[test]
    fn test_empty_reel_list_gets_default_reel() {
        let machine = SlotMachine::new(MachineConfig::default()).unwrap();
        assert_eq!(machine.reels_count(), 1);
        assert_eq!(machine.model().get_int(REELS_COUNT_FIELD, 0), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MachineConfig::three_reel();
        config.session.stop_unlock_delay = -1.0;
        assert!(SlotMachine::new(config).is_err());
    }

    #[test]
    fn test_drop_releases_routes() {
        let machine = SlotMachine::new(MachineConfig::three_reel()).unwrap();
        let bus = machine.bus().clone();
        drop(machine);
        assert_eq!(bus.subscriber_count(EVENT_BUTTON), 0);
        assert_eq!(bus.subscriber_count(EVENT_VISUAL_STOPPED), 0);
    }

    #[test]
    fn test_same_seed_same_faces() {
        let a = SlotMachine::new(MachineConfig::three_reel().with_seed(42)).unwrap();
        let b = SlotMachine::new(MachineConfig::three_reel().with_seed(42)).unwrap();
        assert_eq!(a.center_symbols(), b.center_symbols());
    }
}

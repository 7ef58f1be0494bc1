//! FSM Runtime
//!
//! Named states with enter/exit hooks, event handlers, and one-shot timers
//! scoped to the state that scheduled them. Every state change cancels all
//! pending timers, regardless of what caused the change.
//!
//! `FsmHandle` shares a machine with bus subscribers. Events are queued in an
//! inbox and drained run-to-completion: an event posted while the machine is
//! already handling another one (a hook publishing on the bus) is processed
//! right after the current handler returns, before control leaves the
//! outermost call.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use rb_bus::{BusEvent, EventBus, SharedModel, SubscriptionId};
use rb_core::{RbError, RbResult};

/// State identifier
pub type StateName = &'static str;

/// Identifies a scheduled one-shot within its state
pub type TimerTag = &'static str;

/// Guard against states that bounce between each other on enter
const MAX_CHAINED_TRANSITIONS: usize = 16;

/// What a hook may do: touch shared state, request a change, schedule timers
pub struct StateContext<'a> {
    model: &'a SharedModel,
    bus: &'a EventBus,
    next: Option<StateName>,
    timers: Vec<(f32, TimerTag)>,
}

impl<'a> StateContext<'a> {
    fn new(model: &'a SharedModel, bus: &'a EventBus) -> Self {
        Self {
            model,
            bus,
            next: None,
            timers: Vec::new(),
        }
    }

    pub fn model(&self) -> &SharedModel {
        self.model
    }

    pub fn bus(&self) -> &EventBus {
        self.bus
    }

    /// Request a transition once the current hook returns
    pub fn change(&mut self, state: StateName) {
        self.next = Some(state);
    }

    /// Fire `on_timer(tag)` after `delay` seconds unless the state exits first
    pub fn schedule_once(&mut self, delay: f32, tag: TimerTag) {
        self.timers.push((delay.max(0.0), tag));
    }
}

/// A state registered with the runtime
pub trait SessionState: Send {
    fn name(&self) -> StateName;

    fn enter(&mut self, _ctx: &mut StateContext<'_>) {}

    fn exit(&mut self, _ctx: &mut StateContext<'_>) {}

    fn on_event(&mut self, _event: &BusEvent, _ctx: &mut StateContext<'_>) {}

    fn on_timer(&mut self, _tag: TimerTag, _ctx: &mut StateContext<'_>) {}
}

#[derive(Debug, Default)]
struct HookOutcome {
    next: Option<StateName>,
    timers: Vec<(f32, TimerTag)>,
}

#[derive(Debug, Clone, Copy)]
struct ScopedTimer {
    tag: TimerTag,
    remaining: f32,
}

/// Flat state machine with scoped timers
pub struct StateMachine {
    states: HashMap<StateName, Box<dyn SessionState>>,
    current: Arc<RwLock<Option<StateName>>>,
    timers: Vec<ScopedTimer>,
    /// Bumped on every state change; timers from older generations never fire
    generation: u64,
    enter_counts: HashMap<StateName, u64>,
    model: SharedModel,
    bus: EventBus,
}

impl StateMachine {
    pub fn new(model: SharedModel, bus: EventBus) -> Self {
        Self {
            states: HashMap::new(),
            current: Arc::new(RwLock::new(None)),
            timers: Vec::new(),
            generation: 0,
            enter_counts: HashMap::new(),
            model,
            bus,
        }
    }

    /// Register a state; replaces any state with the same name
    pub fn add<S: SessionState + 'static>(&mut self, state: S) -> &mut Self {
        self.states.insert(state.name(), Box::new(state));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn current(&self) -> Option<StateName> {
        *self.current.read()
    }

    /// Times `name` has been entered
    pub fn enter_count(&self, name: &str) -> u64 {
        self.enter_counts.get(name).copied().unwrap_or(0)
    }

    /// Timers waiting to fire in the current state
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Enter the initial state
    pub fn start(&mut self, name: &str) -> RbResult<()> {
        self.change(name)
    }

    /// Programmatic transition
    pub fn change(&mut self, name: &str) -> RbResult<()> {
        let Some((&key, _)) = self.states.get_key_value(name) else {
            return Err(RbError::UnknownState(name.to_string()));
        };
        self.transition(key);
        Ok(())
    }

    /// Advance scoped timers by `dt` seconds, firing the ones that expire
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let Some(current) = self.current() else {
            return;
        };

        let mut fired = Vec::new();
        self.timers.retain_mut(|timer| {
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                fired.push(timer.tag);
                false
            } else {
                true
            }
        });

        let generation = self.generation;
        for tag in fired {
            if self.generation != generation {
                break;
            }
            let outcome = self.run_hook(current, |state, ctx| state.on_timer(tag, ctx));
            self.apply(outcome);
        }
    }

    /// Deliver an event to the current state
    pub fn dispatch(&mut self, event: &BusEvent) {
        let Some(current) = self.current() else {
            return;
        };
        let outcome = self.run_hook(current, |state, ctx| state.on_event(event, ctx));
        self.apply(outcome);
    }

    fn run_hook<F>(&mut self, name: StateName, hook: F) -> HookOutcome
    where
        F: FnOnce(&mut dyn SessionState, &mut StateContext<'_>),
    {
        let Some(state) = self.states.get_mut(name) else {
            return HookOutcome::default();
        };

        let mut ctx = StateContext::new(&self.model, &self.bus);
        hook(state.as_mut(), &mut ctx);

        HookOutcome {
            next: ctx.next,
            timers: ctx.timers,
        }
    }

    fn apply(&mut self, outcome: HookOutcome) {
        self.schedule(outcome.timers);
        if let Some(next) = outcome.next {
            self.transition(next);
        }
    }

    fn schedule(&mut self, timers: Vec<(f32, TimerTag)>) {
        self.timers.extend(
            timers
                .into_iter()
                .map(|(remaining, tag)| ScopedTimer { tag, remaining }),
        );
    }

    fn transition(&mut self, target: StateName) {
        let mut next = target;

        for _ in 0..MAX_CHAINED_TRANSITIONS {
            if !self.states.contains_key(next) {
                log::warn!("fsm: change to unknown state {next} ignored");
                return;
            }

            let previous = self.current();
            if let Some(prev) = previous {
                let outcome = self.run_hook(prev, |state, ctx| state.exit(ctx));
                if outcome.next.is_some() {
                    log::warn!("fsm: change requested from {prev} exit hook ignored");
                }
            }

            self.timers.clear();
            self.generation += 1;
            *self.current.write() = Some(next);
            *self.enter_counts.entry(next).or_default() += 1;
            log::info!("fsm: {} -> {next}", previous.unwrap_or("<none>"));

            let outcome = self.run_hook(next, |state, ctx| state.enter(ctx));
            self.schedule(outcome.timers);

            match outcome.next {
                Some(chained) => next = chained,
                None => return,
            }
        }

        log::warn!("fsm: more than {MAX_CHAINED_TRANSITIONS} chained transitions, stopped at {next}");
    }
}

/// Shared, bus-routable handle to a state machine
#[derive(Clone)]
pub struct FsmHandle {
    machine: Arc<Mutex<StateMachine>>,
    current: Arc<RwLock<Option<StateName>>>,
    inbox: Arc<Mutex<VecDeque<BusEvent>>>,
}

impl FsmHandle {
    pub fn new(machine: StateMachine) -> Self {
        let current = machine.current.clone();
        Self {
            machine: Arc::new(Mutex::new(machine)),
            current,
            inbox: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Forward every `name` event on `bus` to the current state
    pub fn route(&self, bus: &EventBus, name: &str) -> SubscriptionId {
        let handle = self.clone();
        bus.subscribe(name, move |event| handle.post(event.clone()))
    }

    /// Queue an event and process it unless a handler is already running
    pub fn post(&self, event: BusEvent) {
        self.inbox.lock().push_back(event);
        self.pump();
    }

    pub fn start(&self, name: &str) -> RbResult<()> {
        let result = self.machine.lock().start(name);
        self.pump();
        result
    }

    pub fn change(&self, name: &str) -> RbResult<()> {
        let result = self.machine.lock().change(name);
        self.pump();
        result
    }

    pub fn update(&self, dt: f32) {
        self.machine.lock().update(dt);
        self.pump();
    }

    /// Current state, readable from inside hooks and bus handlers
    pub fn current(&self) -> Option<StateName> {
        *self.current.read()
    }

    /// Inspect the machine. Must not be called from inside a hook.
    pub fn with<R>(&self, f: impl FnOnce(&StateMachine) -> R) -> R {
        f(&self.machine.lock())
    }

    fn pump(&self) {
        // Already locked means we are nested inside a handler; the outer
        // pump drains the inbox once that handler returns.
        let Some(mut machine) = self.machine.try_lock() else {
            return;
        };

        loop {
            let next = self.inbox.lock().pop_front();
            match next {
                Some(event) => machine.dispatch(&event),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Ping;
    impl SessionState for Ping {
        fn name(&self) -> StateName {
            "Ping"
        }
        fn enter(&mut self, ctx: &mut StateContext<'_>) {
            ctx.model().set("Where", "ping");
            ctx.schedule_once(1.0, "go");
        }
        fn on_timer(&mut self, tag: TimerTag, ctx: &mut StateContext<'_>) {
            if tag == "go" {
                ctx.change("Pong");
            }
        }
        fn on_event(&mut self, event: &BusEvent, ctx: &mut StateContext<'_>) {
            if event.name == "Skip" {
                ctx.change("Pong");
            }
        }
    }

    struct Pong {
        exits: Arc<AtomicU32>,
    }
    impl SessionState for Pong {
        fn name(&self) -> StateName {
            "Pong"
        }
        fn enter(&mut self, ctx: &mut StateContext<'_>) {
            ctx.model().set("Where", "pong");
        }
        fn exit(&mut self, _ctx: &mut StateContext<'_>) {
            self.exits.fetch_add(1, Ordering::Relaxed);
        }
        fn on_event(&mut self, event: &BusEvent, ctx: &mut StateContext<'_>) {
            if event.name == "Back" {
                ctx.change("Ping");
            }
        }
    }

    struct Bounce;
    impl SessionState for Bounce {
        fn name(&self) -> StateName {
            "Bounce"
        }
        fn enter(&mut self, ctx: &mut StateContext<'_>) {
            ctx.change("Bounce");
        }
    }

    fn machine() -> (StateMachine, SharedModel, Arc<AtomicU32>) {
        let bus = EventBus::new();
        let model = SharedModel::new(bus.clone());
        let exits = Arc::new(AtomicU32::new(0));
        let mut fsm = StateMachine::new(model.clone(), bus);
        fsm.add(Ping).add(Pong {
            exits: exits.clone(),
        });
        (fsm, model, exits)
    }

    #[test]
    fn test_start_enters_state() {
        let (mut fsm, model, _) = machine();
        fsm.start("Ping").unwrap();
        assert_eq!(fsm.current(), Some("Ping"));
        assert_eq!(model.get_string("Where", ""), "ping");
        assert_eq!(fsm.pending_timers(), 1);
    }

    #[test]
    fn test_unknown_state_is_error() {
        let (mut fsm, _, _) = machine();
        assert!(matches!(fsm.start("Nope"), Err(RbError::UnknownState(_))));
        assert_eq!(fsm.current(), None);
    }

    #[test]
    fn test_timer_fires_after_delay() {
        let (mut fsm, _, _) = machine();
        fsm.start("Ping").unwrap();

        fsm.update(0.5);
        assert_eq!(fsm.current(), Some("Ping"));
        fsm.update(0.5);
        assert_eq!(fsm.current(), Some("Pong"));
        assert_eq!(fsm.pending_timers(), 0);
    }

    #[test]
    fn test_timer_canceled_on_early_exit() {
        let (mut fsm, _, exits) = machine();
        fsm.start("Ping").unwrap();
        fsm.update(0.5);

        fsm.dispatch(&BusEvent::new("Skip", vec![]));
        assert_eq!(fsm.current(), Some("Pong"));
        assert_eq!(fsm.pending_timers(), 0);

        // back to Ping: fresh timer, old one must not leak in
        fsm.dispatch(&BusEvent::new("Back", vec![]));
        assert_eq!(exits.load(Ordering::Relaxed), 1);
        fsm.update(0.6);
        assert_eq!(fsm.current(), Some("Ping"));
        fsm.update(0.4);
        assert_eq!(fsm.current(), Some("Pong"));
        assert_eq!(fsm.enter_count("Ping"), 2);
        assert_eq!(fsm.enter_count("Pong"), 2);
    }

    #[test]
    fn test_chained_transitions_are_bounded() {
        let bus = EventBus::new();
        let model = SharedModel::new(bus.clone());
        let mut fsm = StateMachine::new(model, bus);
        fsm.add(Bounce);
        fsm.start("Bounce").unwrap();
        assert_eq!(fsm.enter_count("Bounce"), MAX_CHAINED_TRANSITIONS as u64);
    }

    #[test]
    fn test_handle_routes_bus_events() {
        let (fsm, model, _) = machine();
        let bus = model.bus().clone();
        let handle = FsmHandle::new(fsm);
        handle.route(&bus, "Skip");

        handle.start("Ping").unwrap();
        bus.publish("Skip", &[]);
        assert_eq!(handle.current(), Some("Pong"));
    }

    #[test]
    fn test_nested_post_runs_after_current_handler() {
        let (fsm, model, _) = machine();
        let bus = model.bus().clone();
        let handle = FsmHandle::new(fsm);
        handle.route(&bus, "Skip");
        handle.route(&bus, "Back");

        // entering Pong changes "Where", whose notification posts "Back"
        {
            let bus_inner = bus.clone();
            bus.subscribe("OnWhereChanged", move |_| bus_inner.publish("Back", &[]));
        }

        handle.start("Ping").unwrap();
        bus.publish("Skip", &[]);

        // Skip -> Pong, nested Back -> Ping, all before publish returned
        assert_eq!(handle.current(), Some("Ping"));
        assert_eq!(handle.with(|m| m.enter_count("Pong")), 1);
    }
}

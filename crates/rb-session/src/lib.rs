//! # rb-session: Spin session orchestrator
//!
//! Owns the Start/Stop button gating, the minimum spin time before stop is
//! allowed, and the barrier that waits for every reel to report it has
//! visually stopped before the session returns to Idle.
//!
//! ## Architecture
//!
//! ```text
//! Button ──OnBtn──► FsmHandle (inbox, run-to-completion)
//!                      │
//!                      v
//!                   StateMachine ── Bootstrap / Idle / Accelerating /
//!                      │            SpinningReady / Stopping
//!                      │ SlotStartSpin / SlotStopSpin
//!                      v
//!                   ReelBinding × N ──SlotVisualStopped──► FsmHandle, StopFx
//! ```
//!
//! `SlotMachine` assembles all of the above over one shared model and bus.

pub mod button;
pub mod fsm;
pub mod machine;
pub mod states;
pub mod stop_fx;

pub use button::Button;
pub use fsm::{FsmHandle, SessionState, StateContext, StateMachine, StateName, TimerTag};
pub use machine::SlotMachine;
pub use states::*;
pub use stop_fx::StopFx;

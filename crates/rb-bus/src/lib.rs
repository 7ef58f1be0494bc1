//! # rb-bus: Shared model and event bus for Reel Bank
//!
//! The two capabilities every Reel Bank component is injected with:
//!
//! - **SharedModel**: string-keyed typed fields (`set` / `get_*` with default).
//!   Every real change publishes `On{Field}Changed` on the bus.
//! - **EventBus**: named multicast events, delivered synchronously to all
//!   current subscribers in registration order.
//!
//! Both are cheap-to-clone handles over shared state. No lock is held while
//! a subscriber runs, so handlers may publish or mutate the model freely.

mod bus;
mod model;
mod value;

pub use bus::*;
pub use model::*;
pub use value::*;

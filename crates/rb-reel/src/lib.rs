//! # rb-reel: Reel Motion Controller
//!
//! One controller per physical reel. Converts two signals ("start spin",
//! "stop spin") into a continuous vertical scroll with a bounded
//! acceleration / deceleration / snap profile.
//!
//! ## Architecture
//!
//! ```text
//! ReelBinding (bus subscriptions, publishes SlotVisualStopped)
//!     │
//!     v
//! ReelController (phase machine: Idle → Accelerating → Running
//!     │                          → Decelerating → Snapping → Idle)
//!     ├── ReelStrip (fixed item pool, translate + wrap-around recycling)
//!     └── SymbolCatalog (face values drawn on recycle)
//! ```

pub mod binding;
pub mod controller;
pub mod strip;
pub mod symbols;

pub use binding::*;
pub use controller::*;
pub use strip::*;
pub use symbols::*;

//! rb-core: Shared types, contracts, and utilities for Reel Bank
//!
//! This crate provides the foundational types used across all Reel Bank crates:
//!
//! - **Curves**: easing curves for reel acceleration/deceleration and snap
//! - **Contracts**: field and event names shared between the session and reels
//! - **Config**: reel, session, and machine configuration with YAML/JSON loading
//! - **Errors**: the workspace error type

mod config;
mod contracts;
mod curve;
mod error;

pub use config::*;
pub use contracts::*;
pub use curve::*;
pub use error::*;

//! Core functionality for catchpoint
//!
//! This module contains the low-level machinery for guarded calls: the
//! library context with its single catch-point slot, and the trampoline
//! that arms, runs, and restores.

pub mod context;
pub mod trampoline;

pub use context::{ArmState, RawContext};
pub use trampoline::{Outcome, RawOperation, catch_on, try_on_raw};

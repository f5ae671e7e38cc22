//! catchpoint - a framework for calling longjmp-reporting C libraries
//!
//! Some C libraries report fatal conditions by abandoning their call stack
//! and jumping to a previously recorded resumption point instead of
//! returning an error. Calling such a library from Rust is unsafe unless
//! every call runs under a matching catch point that records the resumption
//! point first, distinguishes a normal return from an error-induced jump,
//! and refuses to be armed twice on the same context.
//!
//! This crate provides exactly that adapter: a context holding a single
//! catch-point slot, a trampoline that arms it, runs one operation, and
//! converts the library's jump-based signal into an ordinary `Result`, plus
//! a session layer with stream capture and call statistics on top.
//!
//! # Getting Started
//!
//! ```rust
//! let mut session = catchpoint::new().capture_stderr(true).build()?;
//!
//! // Operations run under an armed catch point; a library that aborts
//! // through its error-exit path surfaces as an Err instead of tearing
//! // down the stack.
//! let sum = session.try_on(|_ctx| 2 + 2)?;
//! assert_eq!(sum, 4);
//! # Ok::<(), catchpoint::CatchError>(())
//! ```
//!
//! The wrapped library reaches the error-exit path through
//! [`RawContext::error_exit`] (or the equivalent C primitive); the guarded
//! call then reports the supplied code:
//!
//! ```rust
//! let mut session = catchpoint::new().build()?;
//!
//! let result: catchpoint::Result<()> = session.try_on(|ctx| {
//!     // Stand-in for a library call that hits a fatal condition.
//!     unsafe { ctx.error_exit(42) }
//! });
//!
//! assert_eq!(result.unwrap_err().code(), Some(42));
//! assert!(session.context().is_ready());
//! # Ok::<(), catchpoint::CatchError>(())
//! ```

pub mod core;
pub mod io;
pub mod session;
pub mod util;

pub use catchpoint_sys as sys;

pub use crate::core::{ArmState, Outcome, RawContext, RawOperation, catch_on, try_on_raw};
pub use crate::session::{CatchError, Result, Session, SessionBuilder, SessionConfig, SessionStats};

/// Create a new session builder
#[must_use]
pub fn new() -> SessionBuilder {
	SessionBuilder::new()
}

/// Initialize a session with default settings
///
/// This is equivalent to `new().build()`
///
/// # Errors
///
/// Returns an error if a configured capture sink could not be created.
pub fn init() -> Result<Session> {
	new().build()
}

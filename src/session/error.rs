//! Error types for guarded sessions
//!
//! This module contains error types and a result type for the session
//! layer.

use std::io;

use thiserror::Error;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, CatchError>;

/// Error type for guarded calls
#[derive(Debug, Error)]
pub enum CatchError {
	/// A guarded call was attempted while another one was already active on
	/// the same context. The enclosing call is unaffected and the context
	/// remains usable.
	#[error("a guarded call is already active on this context")]
	AlreadyArmed,

	/// The library took its error-exit path during the operation.
	///
	/// The operation's side effects on the context may be incomplete or
	/// inconsistent. `diagnostics` carries whatever the library wrote to its
	/// captured error stream, when capture is enabled.
	#[error("library aborted with code {code}")]
	Raised {
		/// The code the library passed to its error-exit path.
		code: i32,
		/// Captured diagnostic output, when available.
		diagnostics: Option<String>,
	},

	/// An I/O error occurred while managing capture sinks
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
}

impl CatchError {
	/// The library error code, when the library aborted the operation.
	#[must_use]
	pub const fn code(&self) -> Option<i32> {
		match self {
			Self::Raised { code, .. } => Some(*code),
			_ => None,
		}
	}
}

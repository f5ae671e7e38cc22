//! Builder for creating sessions
//!
//! This module contains the `SessionBuilder` struct and related
//! functionality for configuring and building sessions.

use crate::session::{Result, Session};

/// Configuration for a session
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
	/// Whether each checkpoint saves the signal mask and restores it when an
	/// operation aborts
	pub save_sigmask: bool,
	/// Whether to capture the library's output stream
	pub capture_stdout: bool,
	/// Whether to capture the library's diagnostic stream
	pub capture_stderr: bool,
	/// Whether to log each guarded call
	pub trace: bool,
}

/// Builder for creating sessions
///
/// This struct provides a builder pattern for configuring and
/// creating sessions.
#[derive(Debug, Default)]
#[must_use]
pub struct SessionBuilder {
	config: SessionConfig,
}

impl SessionBuilder {
	/// Create a new session builder with default settings
	pub fn new() -> Self {
		Self {
			config: SessionConfig::default(),
		}
	}

	/// Save the signal mask with each checkpoint and restore it when an
	/// operation aborts
	pub const fn save_sigmask(mut self, save: bool) -> Self {
		self.config.save_sigmask = save;
		self
	}

	/// Capture the library's output stream instead of writing it to the
	/// process's standard output
	pub const fn capture_stdout(mut self, capture: bool) -> Self {
		self.config.capture_stdout = capture;
		self
	}

	/// Capture the library's diagnostic stream and attach its contents to
	/// errors instead of writing it to the process's standard error
	pub const fn capture_stderr(mut self, capture: bool) -> Self {
		self.config.capture_stderr = capture;
		self
	}

	/// Enable or disable logging of each guarded call
	pub const fn trace(mut self, trace: bool) -> Self {
		self.config.trace = trace;
		self
	}

	/// Build the session
	///
	/// # Errors
	///
	/// Returns an error if a configured capture sink could not be created.
	pub fn build(self) -> Result<Session> {
		// Make sure diagnostics are visible before anything else happens
		crate::util::init_logging();

		Session::with_config(self.config)
	}
}

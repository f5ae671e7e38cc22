//! Guarded-call sessions
//!
//! This module contains the high-level session layer: a configured context
//! plus capture sinks, with a checked entry point for running operations
//! against a longjmp-reporting library.

mod builder;
mod error;

pub use builder::{SessionBuilder, SessionConfig};
pub use error::{CatchError, Result};
use tracing::{debug, warn};

use crate::core::{Outcome, RawContext, catch_on};
use crate::io::CaptureFile;

/// Statistics about guarded calls
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionStats {
	/// Number of operations that ran to completion
	pub completed: usize,
	/// Number of operations aborted through the error-exit path
	pub aborted: usize,
	/// Number of calls refused outright (nested arming)
	pub rejected: usize,
}

impl SessionStats {
	/// Mark an operation as having run to completion
	pub const fn mark_completed(&mut self) {
		self.completed += 1;
	}

	/// Mark an operation as aborted by the library
	pub const fn mark_aborted(&mut self) {
		self.aborted += 1;
	}

	/// Mark a call as refused
	pub const fn mark_rejected(&mut self) {
		self.rejected += 1;
	}

	/// Total number of guarded calls issued
	#[must_use]
	pub const fn total(&self) -> usize {
		self.completed + self.aborted + self.rejected
	}
}

/// A configured guarded-call session
///
/// A session owns one library context, the capture sinks bound to its
/// streams, and statistics about the calls issued through it. It is created
/// with a [`SessionBuilder`].
#[derive(Debug)]
pub struct Session {
	context: RawContext,
	config: SessionConfig,
	out_capture: Option<CaptureFile>,
	err_capture: Option<CaptureFile>,
	stats: SessionStats,
}

impl Session {
	/// Create a new builder
	pub fn builder() -> SessionBuilder {
		SessionBuilder::new()
	}

	pub(crate) fn with_config(config: SessionConfig) -> Result<Self> {
		let mut context = RawContext::new();
		context.set_save_sigmask(config.save_sigmask);

		let out_capture = config.capture_stdout.then(CaptureFile::new).transpose()?;
		let err_capture = config.capture_stderr.then(CaptureFile::new).transpose()?;

		if let Some(capture) = &out_capture {
			context.fout = capture.handle();
		}
		if let Some(capture) = &err_capture {
			context.ferr = capture.handle();
		}

		debug!(
			"session ready (save_sigmask: {}, capture_stdout: {}, capture_stderr: {})",
			config.save_sigmask, config.capture_stdout, config.capture_stderr
		);

		Ok(Self {
			context,
			config,
			out_capture,
			err_capture,
			stats: SessionStats::default(),
		})
	}

	/// Run an operation under an armed catch point.
	///
	/// Returns the operation's value when it completes. When the library
	/// takes its error-exit path, returns [`CatchError::Raised`] carrying
	/// the library's code and, if diagnostic capture is enabled, whatever
	/// the library wrote to its error stream during the call. The context is
	/// ready for the next call either way; after an abort, its other side
	/// effects may be incomplete.
	///
	/// Operations that can abort must take care not to hold droppable state
	/// across calls into the library; see
	/// [`RawContext::error_exit`] for the contract.
	///
	/// # Errors
	///
	/// [`CatchError::AlreadyArmed`] when called from inside another guarded
	/// call on the same context, [`CatchError::Raised`] when the library
	/// aborted the operation.
	pub fn try_on<T, F>(&mut self, f: F) -> Result<T>
	where
		F: FnOnce(&mut RawContext) -> T,
	{
		match unsafe { catch_on(&mut self.context, f) } {
			Ok(value) => {
				self.stats.mark_completed();
				if self.config.trace {
					debug!("guarded call completed");
				}
				Ok(value)
			}
			Err(code) => {
				let error = match Outcome::from_status(code) {
					Outcome::Usage => {
						self.stats.mark_rejected();
						CatchError::AlreadyArmed
					}
					_ => {
						self.stats.mark_aborted();
						CatchError::Raised {
							code,
							diagnostics: self.drain_err_capture(),
						}
					}
				};
				if self.config.trace {
					debug!("guarded call failed: {error}");
				}
				Err(error)
			}
		}
	}

	/// Take everything the library has written to the captured output
	/// stream so far.
	///
	/// Returns `None` when output capture is not enabled. The capture sink
	/// is replaced by a fresh one, so consecutive calls return consecutive
	/// chunks.
	///
	/// # Errors
	///
	/// Returns an error if the replacement sink could not be created or the
	/// captured bytes could not be read back.
	pub fn take_captured_output(&mut self) -> Result<Option<String>> {
		let Some(old) = self.out_capture.take() else {
			return Ok(None);
		};

		let fresh = CaptureFile::new()?;
		self.context.fout = fresh.handle();
		self.out_capture = Some(fresh);

		Ok(Some(old.read_and_close()?))
	}

	/// The session's context.
	#[must_use]
	pub const fn context(&self) -> &RawContext {
		&self.context
	}

	/// A mutable reference to the session's context.
	pub const fn context_mut(&mut self) -> &mut RawContext {
		&mut self.context
	}

	/// Statistics for the calls issued through this session.
	#[must_use]
	pub const fn stats(&self) -> SessionStats {
		self.stats
	}

	// Swap the diagnostic capture for a fresh sink and return what the old
	// one collected. Capture failures degrade to uncaptured diagnostics
	// rather than masking the library error.
	fn drain_err_capture(&mut self) -> Option<String> {
		let old = self.err_capture.take()?;

		match CaptureFile::new() {
			Ok(fresh) => {
				self.context.ferr = fresh.handle();
				self.err_capture = Some(fresh);
			}
			Err(e) => {
				warn!("failed to replace diagnostic capture: {e}");
				self.context.ferr = crate::io::stderr_handle();
			}
		}

		match old.read_and_close() {
			Ok(contents) if contents.is_empty() => None,
			Ok(contents) => Some(contents),
			Err(e) => {
				warn!("failed to read captured diagnostics: {e}");
				None
			}
		}
	}
}

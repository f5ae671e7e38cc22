//! Library context handle
//!
//! This module contains the `RawContext` struct, the owned handle a wrapped
//! library computes against, and the arm state of its single catch-point
//! slot.

use std::ffi::c_int;

use libc::FILE;
use tracing::debug;

use crate::sys;

/// State of a context's catch-point slot.
///
/// A context starts `Ready`. Arming a catch point moves it to `Armed` for the
/// duration of one guarded call; attempting to arm again while `Armed` is a
/// usage error. The discriminants follow the C convention of a
/// "no error exit armed" flag, so a value of 1 means "free to arm".
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
	/// A catch point is active; the error-exit path will jump to it.
	Armed = 0,
	/// No catch point is active; one may be armed.
	Ready = 1,
}

/// An owned library context.
///
/// Holds the single resumable-checkpoint slot the error-exit path jumps to,
/// the arm state guarding it, and the stream bindings handed to wrapped
/// libraries for their diagnostics. The layout is C-compatible so that
/// operations written in C can receive the context pointer directly.
///
/// A context is a single-flow resource: the raw stream and checkpoint
/// pointers make it neither `Send` nor `Sync`, and no internal locking is
/// provided. Use one context per worker, or an external lock held for the
/// full duration of each guarded call.
#[repr(C)]
#[derive(Debug)]
pub struct RawContext {
	state: ArmState,
	pub(crate) checkpoint: *mut sys::cpt_checkpoint,
	save_sigmask: c_int,
	/// Input stream handed to wrapped libraries.
	pub fin: *mut FILE,
	/// Output stream handed to wrapped libraries.
	pub fout: *mut FILE,
	/// Diagnostic stream handed to wrapped libraries.
	pub ferr: *mut FILE,
}

impl Default for RawContext {
	fn default() -> Self {
		Self::new()
	}
}

impl RawContext {
	/// Create a new context in the `Ready` state, bound to the process-wide
	/// standard streams.
	#[must_use]
	pub fn new() -> Self {
		Self {
			state: ArmState::Ready,
			checkpoint: std::ptr::null_mut(),
			save_sigmask: 0,
			fin: crate::io::stdin_handle(),
			fout: crate::io::stdout_handle(),
			ferr: crate::io::stderr_handle(),
		}
	}

	/// Current state of the catch-point slot.
	#[must_use]
	pub const fn state(&self) -> ArmState {
		self.state
	}

	/// Whether a catch point may currently be armed.
	#[must_use]
	pub const fn is_ready(&self) -> bool {
		matches!(self.state, ArmState::Ready)
	}

	/// Whether the signal mask is captured with each checkpoint and restored
	/// when an operation aborts.
	#[must_use]
	pub const fn save_sigmask(&self) -> bool {
		self.save_sigmask != 0
	}

	/// Capture the signal mask with each checkpoint and restore it when an
	/// operation aborts.
	pub const fn set_save_sigmask(&mut self, save: bool) {
		self.save_sigmask = save as c_int;
	}

	pub(crate) const fn set_state(&mut self, state: ArmState) {
		self.state = state;
	}

	pub(crate) const fn sigmask_flag(&self) -> c_int {
		self.save_sigmask
	}

	/// Abort the guarded operation currently running on this context.
	///
	/// This is the error-exit path a wrapped library takes on a fatal
	/// condition: control jumps back to the armed catch point and the
	/// enclosing guarded call reports `code` as its outcome. A code of 0 is
	/// reported as 1, per `longjmp`.
	///
	/// # Panics
	///
	/// Panics if no catch point is armed on this context. The process is
	/// never aborted from here.
	///
	/// # Safety
	///
	/// Must be called from within an operation running under this context's
	/// armed catch point, on the same thread. Every stack frame between this
	/// call and the catch point is discarded without running destructors, so
	/// there must be no pending drops.
	pub unsafe fn error_exit(&mut self, code: c_int) -> ! {
		if self.state == ArmState::Armed && !self.checkpoint.is_null() {
			debug!("error_exit: aborting guarded operation with code {code}");
			unsafe { sys::cpt_error_exit(self.checkpoint, code) }
		}

		panic!("error_exit({code}) called with no armed catch point");
	}
}

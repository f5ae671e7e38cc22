//! catchpoint-sys - low-level primitives for the catchpoint framework
//!
//! This crate carries the C shim that isolates raw non-local-jump semantics
//! into a single one-shot checkpoint primitive, plus the process-wide stream
//! handle accessors. The declarations below are maintained by hand against
//! `src/checkpoint.h`; nothing else in the workspace touches `setjmp` or
//! `longjmp` directly.

#![allow(non_camel_case_types)]

use std::ffi::{c_int, c_void};

use libc::FILE;

/// Reserved status for misuse of the guarded-call machinery itself (null
/// arguments, nested arming). Distinguished from every legitimate library
/// error code.
pub const CPT_USAGE_ERROR: c_int = 10071;

/// One-shot resumable checkpoint.
///
/// Opaque: it lives on the stack frame of [`cpt_run_guarded`] for exactly one
/// call and is only ever handled through pointers.
#[repr(C)]
pub struct cpt_checkpoint {
	_opaque: [u8; 0],
}

/// A guarded operation: receives the context and an opaque payload, returns
/// nothing. Results are communicated exclusively through side effects.
pub type cpt_operation = Option<unsafe extern "C" fn(ctx: *mut c_void, data: *mut c_void)>;

unsafe extern "C" {
	/// Runs `op(ctx, data)` with a freshly captured checkpoint published
	/// through `*slot`. `*slot` is cleared again before returning, on both
	/// paths.
	///
	/// Returns 0 when the operation ran to completion, the nonzero code
	/// passed to [`cpt_error_exit`] when the operation aborted, or
	/// [`CPT_USAGE_ERROR`] when `slot` or `op` is null. When `save_sigmask`
	/// is nonzero the signal mask is captured with the checkpoint and
	/// restored on abort.
	///
	/// # Safety
	///
	/// `slot` must be valid for the duration of the call and `op` must not
	/// unwind. If `op` aborts through [`cpt_error_exit`], every stack frame
	/// between the abort and this call is discarded without cleanup.
	pub fn cpt_run_guarded(
		slot: *mut *mut cpt_checkpoint,
		save_sigmask: c_int,
		op: cpt_operation,
		ctx: *mut c_void,
		data: *mut c_void,
	) -> c_int;

	/// Aborts the operation running under `cp` by jumping back to its
	/// capture point. A code of 0 is reported as 1, per `longjmp`.
	///
	/// # Safety
	///
	/// `cp` must be the checkpoint currently published by an in-progress
	/// [`cpt_run_guarded`] call on this thread. Jumping discards every
	/// intervening stack frame without cleanup.
	pub fn cpt_error_exit(cp: *mut cpt_checkpoint, code: c_int) -> !;

	pub fn cpt_stdin() -> *mut FILE;
	pub fn cpt_stdout() -> *mut FILE;
	pub fn cpt_stderr() -> *mut FILE;
}

#[cfg(test)]
mod tests {
	use std::ptr;

	use super::*;

	struct Probe {
		slot: *mut *mut cpt_checkpoint,
		calls: i32,
	}

	unsafe extern "C" fn complete_op(_ctx: *mut c_void, data: *mut c_void) {
		let probe = unsafe { &mut *data.cast::<Probe>() };
		probe.calls += 1;
	}

	unsafe extern "C" fn abort_op(_ctx: *mut c_void, data: *mut c_void) {
		let probe = unsafe { &mut *data.cast::<Probe>() };
		probe.calls += 1;
		unsafe { cpt_error_exit(*probe.slot, 33) };
	}

	#[test]
	fn completion_reports_zero_and_clears_slot() {
		let mut slot: *mut cpt_checkpoint = ptr::null_mut();
		let slot_ptr = &raw mut slot;
		let mut probe = Probe {
			slot: slot_ptr,
			calls: 0,
		};

		let status = unsafe {
			cpt_run_guarded(
				slot_ptr,
				0,
				Some(complete_op),
				ptr::null_mut(),
				(&raw mut probe).cast(),
			)
		};

		assert_eq!(status, 0);
		assert_eq!(probe.calls, 1);
		assert!(slot.is_null());
	}

	#[test]
	fn abort_reports_jump_code_and_clears_slot() {
		let mut slot: *mut cpt_checkpoint = ptr::null_mut();
		let slot_ptr = &raw mut slot;
		let mut probe = Probe {
			slot: slot_ptr,
			calls: 0,
		};

		let status = unsafe {
			cpt_run_guarded(
				slot_ptr,
				0,
				Some(abort_op),
				ptr::null_mut(),
				(&raw mut probe).cast(),
			)
		};

		assert_eq!(status, 33);
		assert_eq!(probe.calls, 1);
		assert!(slot.is_null());
	}

	#[test]
	fn null_operation_is_rejected() {
		let mut slot: *mut cpt_checkpoint = ptr::null_mut();

		let status =
			unsafe { cpt_run_guarded(&raw mut slot, 0, None, ptr::null_mut(), ptr::null_mut()) };

		assert_eq!(status, CPT_USAGE_ERROR);
		assert!(slot.is_null());
	}

	#[test]
	fn stream_handles_are_distinct_and_non_null() {
		let (fin, fout, ferr) = unsafe { (cpt_stdin(), cpt_stdout(), cpt_stderr()) };

		assert!(!fin.is_null());
		assert!(!fout.is_null());
		assert!(!ferr.is_null());
		assert_ne!(fin, fout);
		assert_ne!(fout, ferr);
	}
}

//! The guarded-call trampoline
//!
//! This module contains the machinery that arms a catch point on a context,
//! runs one operation, and reports whether the operation returned normally
//! or was aborted through the library's error-exit path. The raw jump itself
//! lives behind the checkpoint primitive in `catchpoint-sys`; nothing above
//! this module ever observes non-local control transfer.

use std::any::Any;
use std::ffi::{c_int, c_void};
use std::mem;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use tracing::error;

use crate::core::context::{ArmState, RawContext};
use crate::sys;

/// A raw guarded operation: receives the context it runs against and an
/// opaque payload. Results are communicated exclusively through side effects
/// on the context and the payload.
pub type RawOperation = Option<unsafe extern "C" fn(ctx: *mut RawContext, data: *mut c_void)>;

/// Classified outcome of a guarded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// The operation ran to completion without taking the error-exit path.
	Completed,
	/// The call itself was refused: null arguments, or an arming attempt
	/// nested inside an already-armed catch point.
	Usage,
	/// The library took the error-exit path and supplied this code.
	Raised(c_int),
}

impl Outcome {
	/// Classify a raw status value.
	#[must_use]
	pub const fn from_status(status: c_int) -> Self {
		match status {
			0 => Self::Completed,
			sys::CPT_USAGE_ERROR => Self::Usage,
			code => Self::Raised(code),
		}
	}

	/// The raw status value for this outcome.
	#[must_use]
	pub const fn status(self) -> c_int {
		match self {
			Self::Completed => 0,
			Self::Usage => sys::CPT_USAGE_ERROR,
			Self::Raised(code) => code,
		}
	}

	/// Whether the operation ran to completion.
	#[must_use]
	pub const fn is_completed(self) -> bool {
		matches!(self, Self::Completed)
	}
}

/// Arm a catch point on `ctx`, run `op(ctx, data)`, and report the outcome.
///
/// Returns 0 when the operation ran to completion, the nonzero code the
/// library passed to its error-exit path when the operation aborted, or
/// [`sys::CPT_USAGE_ERROR`] when the call was refused outright: `ctx` or
/// `op` null, or `ctx` already armed by an enclosing guarded call. Refusal
/// touches neither the context state nor the enclosing catch point, so the
/// outer call still completes and reports accurately.
///
/// On every path that armed a catch point, the context is restored to
/// `Ready` before returning; a failed operation never leaves the context
/// unusable.
///
/// # Safety
///
/// `ctx` must be null or valid for exclusive access for the duration of the
/// call. `op` must not unwind. If the operation takes the error-exit path,
/// every stack frame between that call and this one is discarded without
/// running destructors.
pub unsafe fn try_on_raw(ctx: *mut RawContext, op: RawOperation, data: *mut c_void) -> c_int {
	let Some(op) = op else {
		error!("try_on_raw: operation is null");
		return sys::CPT_USAGE_ERROR;
	};

	if ctx.is_null() {
		error!("try_on_raw: context is null");
		return sys::CPT_USAGE_ERROR;
	}

	// No reference into the context may live across the operation, which
	// receives the same pointer; all accesses here are short-lived.
	match unsafe { (*ctx).state() } {
		ArmState::Armed => {
			// The single slot is owned by an enclosing call; arming again
			// would shadow its resumption point.
			error!("try_on_raw: catch point already armed on this context");
			sys::CPT_USAGE_ERROR
		}
		ArmState::Ready => {
			let erased = unsafe {
				mem::transmute::<
					unsafe extern "C" fn(*mut RawContext, *mut c_void),
					unsafe extern "C" fn(*mut c_void, *mut c_void),
				>(op)
			};

			let status = unsafe {
				(*ctx).set_state(ArmState::Armed);
				let slot = &raw mut (*ctx).checkpoint;
				let sigmask = (*ctx).sigmask_flag();

				sys::cpt_run_guarded(slot, sigmask, Some(erased), ctx.cast(), data)
			};

			unsafe { (*ctx).set_state(ArmState::Ready) };

			status
		}
	}
}

struct CallData<F, T> {
	func: Option<F>,
	result: Option<T>,
	panic: Option<Box<dyn Any + Send>>,
}

unsafe extern "C" fn closure_shim<F, T>(ctx: *mut RawContext, data: *mut c_void)
where
	F: FnOnce(&mut RawContext) -> T,
{
	let data = unsafe { &mut *data.cast::<CallData<F, T>>() };
	let context = unsafe { &mut *ctx };

	// The armed-state guard means this shim runs at most once per call.
	let func = data.func.take().expect("guarded operation invoked twice");

	// A Rust panic must not cross the C frame below; capture it here and let
	// the trampoline resume it once the context has been restored.
	match catch_unwind(AssertUnwindSafe(|| func(context))) {
		Ok(value) => data.result = Some(value),
		Err(payload) => data.panic = Some(payload),
	}
}

/// Run a closure under an armed catch point on `ctx`.
///
/// Returns the closure's value when it completes, or `Err(code)` when the
/// library aborted it through the error-exit path (`code` is the sentinel
/// [`sys::CPT_USAGE_ERROR`] when the call was refused because a catch point
/// was already armed). A panic inside the closure is caught before it
/// reaches the checkpoint frame and resumed after the context is restored.
///
/// # Safety
///
/// If any call made by the closure can take the error-exit path, the closure
/// must have no pending drops at that point: the frames between the
/// error-exit and the catch point are discarded without cleanup, and the
/// in-flight closure itself is leaked rather than dropped.
pub unsafe fn catch_on<T, F>(ctx: &mut RawContext, f: F) -> Result<T, c_int>
where
	F: FnOnce(&mut RawContext) -> T,
{
	let mut data = CallData::<F, T> {
		func: Some(f),
		result: None,
		panic: None,
	};

	let status = unsafe { try_on_raw(ctx, Some(closure_shim::<F, T>), (&raw mut data).cast()) };

	if let Some(payload) = data.panic.take() {
		resume_unwind(payload);
	}

	match status {
		0 => Ok(data
			.result
			.take()
			.expect("guarded operation completed without a result")),
		code => Err(code),
	}
}

#[cfg(test)]
mod tests {
	use std::panic::{AssertUnwindSafe, catch_unwind};
	use std::ptr;

	use super::*;

	unsafe extern "C" fn nop_op(_ctx: *mut RawContext, _data: *mut c_void) {}

	#[test]
	fn completion_returns_value_and_rearms() {
		let mut ctx = RawContext::new();
		let mut calls = 0;

		let result = unsafe {
			catch_on(&mut ctx, |_ctx| {
				calls += 1;
				calls * 10
			})
		};

		assert_eq!(result, Ok(10));
		assert_eq!(calls, 1);
		assert!(ctx.is_ready());
	}

	#[test]
	fn error_exit_reports_code_and_skips_rest() {
		let mut ctx = RawContext::new();
		let mut before = 0;
		let mut after = 0;

		let op = |ctx: &mut RawContext| {
			before += 1;
			if before == 1 {
				unsafe { ctx.error_exit(42) };
			}
			after += 1;
		};
		let result = unsafe { catch_on(&mut ctx, op) };

		assert_eq!(result, Err(42));
		assert_eq!(before, 1);
		assert_eq!(after, 0);
		assert!(ctx.is_ready());
	}

	#[test]
	fn null_context_is_refused_without_side_effects() {
		let status = unsafe { try_on_raw(ptr::null_mut(), Some(nop_op), ptr::null_mut()) };

		assert_eq!(status, sys::CPT_USAGE_ERROR);
	}

	#[test]
	fn null_operation_is_refused_without_touching_context() {
		let mut ctx = RawContext::new();

		let status = unsafe { try_on_raw(&raw mut ctx, None, ptr::null_mut()) };

		assert_eq!(status, sys::CPT_USAGE_ERROR);
		assert!(ctx.is_ready());
	}

	#[test]
	fn nested_arming_is_refused_and_outer_completes() {
		let mut ctx = RawContext::new();
		let mut inner_status = 0;

		let op = |ctx: &mut RawContext| {
			inner_status = unsafe { try_on_raw(ctx, Some(nop_op), ptr::null_mut()) };
		};
		let result = unsafe { catch_on(&mut ctx, op) };

		assert_eq!(result, Ok(()));
		assert_eq!(inner_status, sys::CPT_USAGE_ERROR);
		assert!(ctx.is_ready());
	}

	#[test]
	fn nested_refusal_leaves_outer_catch_point_intact() {
		let mut ctx = RawContext::new();
		let mut inner_status = 0;

		// The outer operation aborts after a refused nested attempt; the
		// jump must land on the outer catch point.
		let op = |ctx: &mut RawContext| {
			inner_status = unsafe { try_on_raw(ctx, Some(nop_op), ptr::null_mut()) };
			if inner_status != 0 {
				unsafe { ctx.error_exit(7) };
			}
		};
		let result: Result<(), c_int> = unsafe { catch_on(&mut ctx, op) };

		assert_eq!(result, Err(7));
		assert_eq!(inner_status, sys::CPT_USAGE_ERROR);
		assert!(ctx.is_ready());
	}

	#[test]
	fn sequential_calls_are_independent() {
		let mut ctx = RawContext::new();

		let abort_op = |ctx: &mut RawContext| unsafe { ctx.error_exit(9) };
		let first: Result<(), c_int> = unsafe { catch_on(&mut ctx, abort_op) };
		assert_eq!(first, Err(9));
		assert!(ctx.is_ready());

		let second = unsafe { catch_on(&mut ctx, |_ctx| "fine") };
		assert_eq!(second, Ok("fine"));
		assert!(ctx.is_ready());
	}

	#[test]
	fn panic_resumes_after_context_is_restored() {
		let mut ctx = RawContext::new();

		let caught = catch_unwind(AssertUnwindSafe(|| {
			let _: Result<(), c_int> = unsafe { catch_on(&mut ctx, |_ctx| panic!("boom")) };
		}));

		assert!(caught.is_err());
		assert!(ctx.is_ready());
	}

	#[test]
	fn outcome_round_trips_raw_status() {
		assert_eq!(Outcome::from_status(0), Outcome::Completed);
		assert_eq!(Outcome::from_status(sys::CPT_USAGE_ERROR), Outcome::Usage);
		assert_eq!(Outcome::from_status(42), Outcome::Raised(42));
		assert_eq!(Outcome::Raised(42).status(), 42);
		assert!(Outcome::Completed.is_completed());
		assert!(!Outcome::Usage.is_completed());
	}
}

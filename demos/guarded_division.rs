//! Demo: wrapping a routine that aborts through the error-exit path
//!
//! The "library" here is a stand-in for a C routine that reports fatal
//! conditions by jumping to the armed catch point instead of returning.
//!
//! Run it with:
//! ```bash
//! cargo run --example guarded_division
//! ```

use catchpoint::RawContext;

const DIVIDE_BY_ZERO: i32 = 2;

/// Divides `num` by each divisor, the way a longjmp-reporting library
/// would: a zero divisor is a fatal condition, not a return value.
///
/// # Safety
///
/// Must run under an armed catch point on `ctx`.
unsafe fn lib_divide_all(ctx: &mut RawContext, num: f64, divisors: &[f64]) -> Vec<f64> {
	// Abort before anything droppable is live; the jump runs no destructors.
	for &d in divisors {
		if d == 0.0 {
			unsafe { ctx.error_exit(DIVIDE_BY_ZERO) };
		}
	}
	divisors.iter().map(|d| num / d).collect()
}

fn main() -> catchpoint::Result<()> {
	let mut session = catchpoint::new().trace(true).build()?;

	let quotients = session.try_on(|ctx| unsafe { lib_divide_all(ctx, 12.0, &[2.0, 3.0, 4.0]) })?;
	println!("12 divided: {quotients:?}");

	match session.try_on(|ctx| unsafe { lib_divide_all(ctx, 12.0, &[2.0, 0.0, 4.0]) }) {
		Err(e) => println!("rejected as expected: {e}"),
		Ok(_) => unreachable!("division by zero must abort"),
	}

	let stats = session.stats();
	println!(
		"{} calls: {} completed, {} aborted",
		stats.total(),
		stats.completed,
		stats.aborted
	);

	Ok(())
}

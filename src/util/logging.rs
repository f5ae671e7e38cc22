//! Logging utilities for catchpoint
//!
//! This module provides logging functionality for catchpoint.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Initialize logging once
static INIT: Once = Once::new();

/// Initialize the tracing system
///
/// This function sets up tracing with an `EnvFilter` that:
/// - Honors the `RUST_LOG` environment variable if set
/// - Uses the `CATCHPOINT_DEBUG` environment variable to control logging level
/// - Only logs warnings and errors by default
///
/// Initialization is idempotent; if another subscriber is already installed
/// it is left in place.
pub fn init_logging() {
	INIT.call_once(|| {
		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if std::env::var("CATCHPOINT_DEBUG").is_ok() {
				EnvFilter::new("catchpoint=debug")
			} else {
				EnvFilter::new("catchpoint=warn")
			}
		});

		let _ = tracing_subscriber::registry()
			.with(fmt::layer().with_target(true))
			.with(filter)
			.try_init();
	});
}

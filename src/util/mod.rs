//! Utility modules for catchpoint
//!
//! This module contains utility functions used by catchpoint.

pub mod logging;

// Re-export all utility functions
pub use logging::init_logging;

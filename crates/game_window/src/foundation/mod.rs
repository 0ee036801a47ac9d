//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types shared by the grid transform and the sphere tools
//! - Handle maps for registered input handlers and render modules
//! - Logging setup for the demo binaries
//! - Poison-tolerant locking for state shared with the background worker

pub mod collections;
pub mod logging;
pub mod math;
pub mod sync;

//! Filter operations
//!
//! This module provides spatial filter operations for image processing.

/// Filter kernels
pub mod kernels;

/// 2D correlation with replicated borders
mod convolution;
pub use convolution::filter2d;

/// Smoothing and noise reduction filters
mod ops;
pub use ops::*;

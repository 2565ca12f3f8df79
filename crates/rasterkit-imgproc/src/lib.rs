#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color space conversions module.
pub mod color;

/// image cropping module.
pub mod crop;

/// utilities to draw on images.
pub mod draw;

/// edge detection module.
pub mod edges;

/// brightness, contrast and negative adjustments.
pub mod enhance;

/// image filtering module.
pub mod filter;

/// image flipping and rotation module.
pub mod flip;

/// frequency domain filtering module.
pub mod frequency;

/// compute image histogram module.
pub mod histogram;

/// straight line detection module.
pub mod hough;

/// utilities for interpolation.
pub mod interpolation;

/// erosion and dilation module.
pub mod morphology;

/// operations to normalize images.
pub mod normalize;

/// module containing parallization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

/// color clustering module.
pub mod segmentation;

/// interactive crop and perspective selection.
pub mod selection;

/// operations to threshold images.
pub mod threshold;

/// image geometric transformations module.
pub mod warp;

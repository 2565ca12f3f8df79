//! Frequency-domain filtering.
//!
//! Intensity images are moved to a centered spectrum, multiplied by a radial mask and
//! transformed back.

mod fft;
pub use fft::*;

mod mask;
pub use mask::*;

mod ops;
pub use ops::*;

//! Pointer driven selection state for the geometric operations that need user input.
//!
//! Both state machines work in display coordinates, the space of the scaled preview the
//! user interacts with, and map their result onto the image on commit.

mod crop_region;
pub use crop_region::*;

mod error;
pub use error::SelectionError;

mod perspective_quad;
pub use perspective_quad::*;

use rasterkit_image::ImageSize;

/// Side of the square bounding the main preview.
pub const DISPLAY_BOUND: usize = 400;

/// Side of the square bounding the preview of the crop dialog.
pub const CROP_DIALOG_BOUND: usize = 500;

/// Fit an image inside a `bound x bound` square keeping its aspect ratio.
///
/// Images smaller than the bound are scaled up. The result is never empty.
///
/// # Example
///
/// ```
/// use rasterkit_image::ImageSize;
/// use rasterkit_imgproc::selection::fit_display_size;
///
/// let size = fit_display_size(ImageSize { width: 800, height: 200 }, 400);
/// assert_eq!(size, ImageSize { width: 400, height: 100 });
/// ```
pub fn fit_display_size(size: ImageSize, bound: usize) -> ImageSize {
    let (w, h) = (size.width.max(1), size.height.max(1));
    // width obtained when the height fills the bound
    let rw = bound * w / h;
    let (width, height) = if rw <= bound {
        (rw, bound)
    } else {
        (bound, bound * h / w)
    };
    ImageSize {
        width: width.max(1),
        height: height.max(1),
    }
}

use rasterkit_image::{Image, ImageError, ImageSize};

use crate::interpolation::{grid::meshgrid_from_fn, interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Largest supported scale factor.
pub const MAX_SCALE_FACTOR: f32 = 5.0;

/// Compute the output size of a uniform scale.
///
/// Both dimensions are rounded to the nearest integer and are at least one pixel.
///
/// # Errors
///
/// Returns an error if `factor` is not in (0, 5].
pub fn scaled_size(size: ImageSize, factor: f32) -> Result<ImageSize, ImageError> {
    if !(factor > 0.0 && factor <= MAX_SCALE_FACTOR) {
        return Err(ImageError::InvalidParameter(
            "scale",
            format!("{factor} is outside (0, {MAX_SCALE_FACTOR}]"),
        ));
    }

    Ok(ImageSize {
        width: ((size.width as f32 * factor).round() as usize).max(1),
        height: ((size.height as f32 * factor).round() as usize).max(1),
    })
}

/// Resize an image to the size of `dst`.
///
/// Pixel centres are aligned, so that a destination pixel `x` samples the source at
/// `(x + 0.5) * src_w / dst_w - 0.5`. Resizing to the same size returns the input.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, its size selects the output resolution.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::interpolation::InterpolationMode;
/// use rasterkit_imgproc::resize::resize_native;
///
/// let image = Image::<f32, 3>::from_size_val(ImageSize { width: 4, height: 5 }, 1.0).unwrap();
/// let new_size = ImageSize { width: 2, height: 3 };
/// let mut resized = Image::<f32, 3>::from_size_val(new_size, 0.0).unwrap();
///
/// resize_native(&image, &mut resized, InterpolationMode::Bilinear).unwrap();
/// assert_eq!(resized.size().width, 2);
/// assert_eq!(resized.size().height, 3);
/// ```
pub fn resize_native<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    let scale_x = src.width() as f32 / dst.width() as f32;
    let scale_y = src.height() as f32 / dst.height() as f32;

    let (map_x, map_y) = meshgrid_from_fn(dst.cols(), dst.rows(), |x, y| {
        let u = (x as f32 + 0.5) * scale_x - 0.5;
        let v = (y as f32 + 0.5) * scale_y - 0.5;
        Ok((u, v))
    })?;

    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, dst_pixel| {
        dst_pixel.copy_from_slice(&interpolate_pixel(src, x, y, interpolation));
    });

    Ok(())
}

/// Scale an image uniformly by `factor` with bilinear resampling.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `factor` - The scale factor in (0, 5].
///
/// # Returns
///
/// A new image of size [`scaled_size`].
pub fn scale<const C: usize>(
    src: &Image<f32, C>,
    factor: f32,
) -> Result<Image<f32, C>, ImageError> {
    let new_size = scaled_size(src.size(), factor)?;
    let mut dst = Image::from_size_val(new_size, 0.0)?;
    resize_native(src, &mut dst, InterpolationMode::Bilinear)?;
    Ok(dst)
}

use rasterkit_image::{Image, ImageError};

use crate::parallel;

fn check_sizes<const C: usize>(src: &Image<u8, C>, dst: &Image<u8, C>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }
    Ok(())
}

fn check_delta(name: &'static str, delta: i32) -> Result<(), ImageError> {
    if !(-100..=100).contains(&delta) {
        return Err(ImageError::InvalidParameter(
            name,
            format!("{delta} is outside [-100, 100]"),
        ));
    }
    Ok(())
}

/// Adjust the brightness of an image.
///
/// dst(x,y,c) = clamp(src(x,y,c) + delta, 0, 255)
///
/// The adjustment is absolute: callers pass the unmodified image as `src` so that
/// successive calls with different `delta` do not accumulate.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image to store the result.
/// * `delta` - The offset added to each sample, in [-100, 100].
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match or `delta` is out of range.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::enhance::adjust_brightness;
///
/// let src = Image::<u8, 1>::new(ImageSize { width: 2, height: 1 }, vec![10, 250]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// adjust_brightness(&src, &mut dst, 20).unwrap();
/// assert_eq!(dst.as_slice(), &[30, 255]);
/// ```
pub fn adjust_brightness<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    delta: i32,
) -> Result<(), ImageError> {
    check_sizes(src, dst)?;
    check_delta("brightness", delta)?;

    parallel::par_iter_rows_val(src, dst, |&src_pixel, dst_pixel| {
        *dst_pixel = (src_pixel as i32 + delta).clamp(0, 255) as u8;
    });

    Ok(())
}

/// Adjust the contrast of an image.
///
/// dst(x,y,c) = clamp(src(x,y,c) * alpha, 0, 255) with alpha = 1 + delta / 100
///
/// Like [`adjust_brightness`] the adjustment is relative to the `src` passed in.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image to store the result.
/// * `delta` - The contrast change in percent, in [-100, 100].
pub fn adjust_contrast<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    delta: i32,
) -> Result<(), ImageError> {
    check_sizes(src, dst)?;
    check_delta("contrast", delta)?;

    let alpha = 1.0 + delta as f32 / 100.0;

    parallel::par_iter_rows_val(src, dst, |&src_pixel, dst_pixel| {
        *dst_pixel = (src_pixel as f32 * alpha).round().clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

/// Invert an image: dst(x,y,c) = 255 - src(x,y,c).
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image to store the result.
pub fn negative<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    check_sizes(src, dst)?;

    parallel::par_iter_rows_val(src, dst, |&src_pixel, dst_pixel| {
        *dst_pixel = 255 - src_pixel;
    });

    Ok(())
}

//! Intensity normalization used to bring filter responses back into the displayable range.

use rasterkit_image::{Image, ImageError};

use crate::parallel;

/// Linearly stretch an image so that its minimum maps to `min` and its maximum to `max`.
///
/// The output is rounded and saturated to 8 bits. A constant input maps to `min`.
///
/// # Arguments
///
/// * `src` - The input image, typically a filter response.
/// * `dst` - The output 8-bit image with the same size as `src`.
/// * `min` - The output value of the smallest input sample.
/// * `max` - The output value of the largest input sample.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::normalize::normalize_min_max;
///
/// let size = ImageSize { width: 3, height: 1 };
/// let image = Image::<f32, 1>::new(size, vec![-1.0, 0.0, 1.0]).unwrap();
/// let mut out = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// normalize_min_max(&image, &mut out, 0.0, 255.0).unwrap();
/// assert_eq!(out.as_slice(), &[0, 128, 255]);
/// ```
pub fn normalize_min_max<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<u8, C>,
    min: f32,
    max: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (lo, hi) = find_min_max(src.as_slice());
    let range = hi - lo;

    let (scale, offset) = if range > f32::EPSILON {
        let scale = (max - min) / range;
        (scale, min - lo * scale)
    } else {
        (0.0, min)
    };

    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = (src_val * scale + offset).round().clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

/// Find the smallest and largest value of a slice of samples.
///
/// Returns `(0, 0)` for an empty slice.
pub fn find_min_max(data: &[f32]) -> (f32, f32) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    data.iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

use num_traits::Zero;
use std::cmp::PartialOrd;

use rasterkit_image::{Image, ImageError};

use crate::{
    color::{gray_from_rgb_u8, rgb_from_gray},
    parallel,
};

/// Apply a binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is greater than the threshold.
///
/// # Examples
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // run the thresholding operation in parallel
    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            max_value
        } else {
            T::zero()
        };
    });

    Ok(())
}

/// Threshold the luminance of an RGB8 image.
///
/// Each pixel becomes white when its luminance is strictly greater than `threshold`
/// and black otherwise; the result is replicated across the three channels.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output RGB8 image holding only 0 and 255 samples.
/// * `threshold` - The intensity threshold in [0, 255].
pub fn threshold_luminance(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    threshold: u8,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let mut gray = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    gray_from_rgb_u8(src, &mut gray)?;

    let mut binary = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    threshold_binary(&gray, &mut binary, threshold, 255)?;

    rgb_from_gray(&binary, dst)
}

#[cfg(test)]
mod tests {
    use rasterkit_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_threshold_binary() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![100, 101],
        )?;
        let mut thresholded = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::threshold_binary(&image, &mut thresholded, 100, 255)?;
        assert_eq!(thresholded.as_slice(), &[0, 255]);
        Ok(())
    }

    #[test]
    fn test_threshold_luminance_is_binary() -> Result<(), ImageError> {
        let data: Vec<u8> = (0..=255u8).flat_map(|v| [v, v / 2, 255 - v]).collect();
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 16,
                height: 16,
            },
            data,
        )?;
        let mut out = Image::<u8, 3>::from_size_val(image.size(), 7)?;
        super::threshold_luminance(&image, &mut out, 127)?;
        assert!(out.as_slice().iter().all(|&v| v == 0 || v == 255));
        assert!(out.as_slice().contains(&0));
        assert!(out.as_slice().contains(&255));
        Ok(())
    }
}

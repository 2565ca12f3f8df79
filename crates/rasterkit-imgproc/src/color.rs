use crate::parallel;
use rasterkit_image::{Image, ImageError};

/// Define the RGB weights for the grayscale conversion.
const RW: f32 = 0.299;
const GW: f32 = 0.587;
const BW: f32 = 0.114;

// 14-bit fixed point versions of the weights above.
const RW_FIXED: u32 = 4899;
const GW_FIXED: u32 = 9617;
const BW_FIXED: u32 = 1868;
const FIXED_SHIFT: u32 = 14;

/// Weighted luminance of one RGB8 pixel, rounded to the nearest integer.
#[inline]
pub fn luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    let y = r as u32 * RW_FIXED + g as u32 * GW_FIXED + b as u32 * BW_FIXED;
    ((y + (1 << (FIXED_SHIFT - 1))) >> FIXED_SHIFT) as u8
}

/// Convert an RGB8 image to grayscale using the formula:
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::color::gray_from_rgb_u8;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 1,
///         height: 1,
///     },
///     vec![255, 255, 255],
/// )
/// .unwrap();
///
/// let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// gray_from_rgb_u8(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[255]);
/// ```
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = luminance_u8(src_pixel[0], src_pixel[1], src_pixel[2]);
    });

    Ok(())
}

/// Convert an RGB image to a floating point grayscale image.
///
/// # Arguments
///
/// * `src` - The input RGB image with values in any range.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
pub fn gray_from_rgb(src: &Image<f32, 3>, dst: &mut Image<f32, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = RW * src_pixel[0] + GW * src_pixel[1] + BW * src_pixel[2];
    });

    Ok(())
}

/// Convert a grayscale image to an RGB image by replicating the gray value on all three channels.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output RGB image.
///
/// Precondition: the input and output images must have the same size.
pub fn rgb_from_gray<T>(src: &Image<T, 1>, dst: &mut Image<T, 3>) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let v = src_pixel[0];
        dst_pixel.copy_from_slice(&[v, v, v]);
    });

    Ok(())
}

/// Convert an RGB8 image to a channel-equal gray RGB8 image.
///
/// Every output pixel carries the weighted luminance of the input pixel in all three
/// channels.
pub fn grayscale_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let y = luminance_u8(src_pixel[0], src_pixel[1], src_pixel[2]);
        dst_pixel.copy_from_slice(&[y, y, y]);
    });

    Ok(())
}

/// Split an RGB8 image into three displayable images, one per channel.
///
/// Each returned image replicates the channel values into all three channels, in R, G, B
/// order.
pub fn split_channels_rgb_u8(src: &Image<u8, 3>) -> Result<[Image<u8, 3>; 3], ImageError> {
    let planes = src.split_channels()?;
    let mut out = [
        Image::from_size_val(src.size(), 0u8)?,
        Image::from_size_val(src.size(), 0u8)?,
        Image::from_size_val(src.size(), 0u8)?,
    ];
    for (plane, dst) in planes.iter().zip(out.iter_mut()) {
        rgb_from_gray(plane, dst)?;
    }
    Ok(out)
}

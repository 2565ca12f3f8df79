use rasterkit_image::{ops::saturate_cast_u8, Image, ImageError};

use super::{convolution::replicate_index, filter2d, kernels, kernels::Kernel};
use crate::{
    morphology::{morphology, MorphOp},
    parallel,
};

/// Kernel sizes accepted by the smoothing filters.
pub const SMOOTHING_KERNEL_SIZES: [usize; 3] = [3, 5, 7];

fn check_kernel_size(kernel_size: usize) -> Result<(), ImageError> {
    if !SMOOTHING_KERNEL_SIZES.contains(&kernel_size) {
        return Err(ImageError::InvalidKernelSize(kernel_size));
    }
    Ok(())
}

fn check_same_size<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &Image<U, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Correlate an 8-bit image with a kernel and saturate the result back to 8 bits.
fn filter2d_u8<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel: &Kernel,
) -> Result<(), ImageError> {
    let src_f32 = src.cast::<f32>()?;
    let mut out = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    filter2d(&src_f32, &mut out, kernel)?;
    saturate_cast_u8(&out, dst)
}

/// Blur an image with a uniform `k x k` kernel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The kernel side, one of 3, 5 or 7.
pub fn mean_filter<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    check_kernel_size(kernel_size)?;
    check_same_size(src, dst)?;
    filter2d_u8(src, dst, &kernels::box_kernel(kernel_size))
}

/// Blur an image with a normalized `k x k` gaussian kernel.
///
/// The sigma is derived from the kernel size, see [`kernels::gaussian_sigma`].
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The kernel side, one of 3, 5 or 7.
pub fn gaussian_filter<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    check_kernel_size(kernel_size)?;
    check_same_size(src, dst)?;
    filter2d_u8(src, dst, &kernels::gaussian_kernel(kernel_size))
}

/// Replace every sample by the median of its `k x k` neighbourhood.
///
/// The border is handled by replicating the edge samples.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The kernel side, one of 3, 5 or 7.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::filter::median_filter;
///
/// let mut data = vec![10u8; 9];
/// data[4] = 255;
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 3 }, data).unwrap();
/// let mut out = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// median_filter(&image, &mut out, 3).unwrap();
/// assert_eq!(out.as_slice(), &[10u8; 9]);
/// ```
pub fn median_filter<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    check_kernel_size(kernel_size)?;
    check_same_size(src, dst)?;

    let (cols, rows) = (src.cols(), src.rows());
    let half = (kernel_size / 2) as isize;
    let src_data = src.as_slice();

    parallel::par_iter_rows_indexed(dst, |r, c, dst_pixel| {
        let mut window = Vec::with_capacity(kernel_size * kernel_size);
        for (ch, out) in dst_pixel.iter_mut().enumerate() {
            window.clear();
            for dy in -half..=half {
                let y = replicate_index(r as isize + dy, rows);
                for dx in -half..=half {
                    let x = replicate_index(c as isize + dx, cols);
                    window.push(src_data[(y * cols + x) * C + ch]);
                }
            }
            let mid = window.len() / 2;
            *out = *window.select_nth_unstable(mid).1;
        }
    });

    Ok(())
}

/// Clamp every sample into the range spanned by its neighbourhood.
///
/// The bounds are the erosion and dilation of `src` with a full `k x k` structuring
/// element, the same window used by [`crate::morphology::erode`] and
/// [`crate::morphology::dilate`]. Since that window holds the centre sample, the output only
/// differs from the input where it would fall outside those bounds.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The kernel side, one of 3, 5 or 7.
pub fn conservative_filter<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    check_kernel_size(kernel_size)?;
    check_same_size(src, dst)?;

    let mut lo = Image::<u8, C>::from_size_val(src.size(), 0)?;
    let mut hi = Image::<u8, C>::from_size_val(src.size(), 0)?;
    morphology(src, &mut lo, kernel_size, MorphOp::Erode)?;
    morphology(src, &mut hi, kernel_size, MorphOp::Dilate)?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice())
        .zip(lo.as_slice().iter().zip(hi.as_slice()))
        .for_each(|((out, &v), (&l, &h))| *out = v.clamp(l, h));

    Ok(())
}

/// One Crimmins pass over a single channel.
///
/// A pass nudges every sample that is a strict extremum against its four axis-aligned
/// neighbours by one level towards them. Neighbours wrap around the image edges, so the
/// left column is compared against the right column and the top row against the bottom row.
/// The four directional sub-iterations of a pass all compare against the pass input, so
/// each extremum moves by exactly one level per pass.
fn crimmins_pass(src: &[u8], dst: &mut [u8], cols: usize, rows: usize, dark: bool) {
    for r in 0..rows {
        let up = (r + rows - 1) % rows;
        let down = (r + 1) % rows;
        for c in 0..cols {
            let left = (c + cols - 1) % cols;
            let right = (c + 1) % cols;
            let v = src[r * cols + c];
            let neighbours = [
                src[up * cols + c],
                src[down * cols + c],
                src[r * cols + left],
                src[r * cols + right],
            ];
            dst[r * cols + c] = if dark && neighbours.iter().all(|&n| v < n) {
                v + 1
            } else if !dark && neighbours.iter().all(|&n| v > n) {
                v - 1
            } else {
                v
            };
        }
    }
}

/// Reduce speckle noise with the Crimmins complementary hulling filter.
///
/// Each channel runs a dark pass, which lifts isolated dark samples, followed by a light
/// pass, which lowers isolated bright samples. Neighbour addressing wraps around the
/// image borders.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
pub fn crimmins_speckle<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    let (cols, rows) = (src.cols(), src.rows());
    let mut channels = src.split_channels()?;
    for channel in channels.iter_mut() {
        let mut dark = vec![0u8; cols * rows];
        crimmins_pass(channel.as_slice(), &mut dark, cols, rows, true);
        crimmins_pass(&dark, channel.as_slice_mut(), cols, rows, false);
    }

    for (i, pixel) in dst.as_slice_mut().chunks_exact_mut(C).enumerate() {
        for (ch, out) in pixel.iter_mut().enumerate() {
            *out = channels[ch].as_slice()[i];
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rasterkit_image::{Image, ImageError, ImageSize};

    fn gray(width: usize, height: usize, data: Vec<u8>) -> Result<Image<u8, 1>, ImageError> {
        Image::new(ImageSize { width, height }, data)
    }

    #[test]
    fn test_kernel_size_validation() -> Result<(), ImageError> {
        let image = gray(3, 3, vec![0; 9])?;
        let mut out = image.clone();
        assert_eq!(
            super::mean_filter(&image, &mut out, 4),
            Err(ImageError::InvalidKernelSize(4))
        );
        assert!(super::median_filter(&image, &mut out, 9).is_err());
        Ok(())
    }

    #[test]
    fn test_mean_filter() -> Result<(), ImageError> {
        let mut data = vec![0u8; 25];
        data[12] = 90;
        let image = gray(5, 5, data)?;
        let mut out = Image::from_size_val(image.size(), 0)?;
        super::mean_filter(&image, &mut out, 3)?;
        assert_eq!(out.as_slice()[12], 10);
        assert_eq!(out.as_slice()[6], 10);
        assert_eq!(out.as_slice()[0], 0);
        Ok(())
    }

    #[test]
    fn test_gaussian_filter_preserves_constant() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 6,
                height: 4,
            },
            77,
        )?;
        let mut out = Image::from_size_val(image.size(), 0)?;
        for k in [3, 5, 7] {
            super::gaussian_filter(&image, &mut out, k)?;
            assert!(out.as_slice().iter().all(|&v| v == 77));
        }
        Ok(())
    }

    #[test]
    fn test_median_removes_salt() -> Result<(), ImageError> {
        let mut data = vec![50u8; 49];
        data[10] = 255;
        data[30] = 0;
        let image = gray(7, 7, data)?;
        let mut out = Image::from_size_val(image.size(), 0)?;
        super::median_filter(&image, &mut out, 5)?;
        assert!(out.as_slice().iter().all(|&v| v == 50));
        Ok(())
    }

    #[test]
    fn test_conservative_filter_matches_morphology() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = gray(3, 3, vec![
            10, 20, 30,
            40, 99, 50,
            60, 70, 80,
        ])?;

        let mut lo = Image::from_size_val(image.size(), 0)?;
        let mut hi = Image::from_size_val(image.size(), 0)?;
        crate::morphology::erode(&image, &mut lo)?;
        crate::morphology::dilate(&image, &mut hi)?;
        let expected: Vec<u8> = image
            .as_slice()
            .iter()
            .zip(lo.as_slice().iter().zip(hi.as_slice()))
            .map(|(&v, (&l, &h))| v.clamp(l, h))
            .collect();

        let mut out = Image::from_size_val(image.size(), 0)?;
        super::conservative_filter(&image, &mut out, 3)?;
        assert_eq!(out.as_slice(), expected.as_slice());
        // the window holds the centre, so every sample already lies within its bounds
        assert_eq!(out.as_slice(), image.as_slice());

        for k in [5, 7] {
            super::conservative_filter(&image, &mut out, k)?;
            assert_eq!(out.as_slice(), image.as_slice());
        }
        Ok(())
    }

    #[test]
    fn test_crimmins_nudges_extrema() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = gray(4, 4, vec![
            100, 100, 100, 100,
            100,  10, 100, 100,
            100, 100, 100, 100,
            100, 100, 100, 200,
        ])?;
        let mut out = Image::from_size_val(image.size(), 0)?;
        super::crimmins_speckle(&image, &mut out)?;
        assert_eq!(out.as_slice()[5], 11);
        assert_eq!(out.as_slice()[15], 199);
        assert_eq!(out.as_slice()[0], 100);
        Ok(())
    }

    #[test]
    fn test_crimmins_wraps_around() -> Result<(), ImageError> {
        // the right edge is the left neighbour of the corner, so the corner is no maximum
        #[rustfmt::skip]
        let image = gray(3, 3, vec![
            9, 5, 10,
            5, 6, 6,
            5, 6, 6,
        ])?;
        let mut out = Image::from_size_val(image.size(), 0)?;
        super::crimmins_speckle(&image, &mut out)?;
        assert_eq!(out.as_slice()[0], 9);
        assert_eq!(out.as_slice()[2], 9);
        Ok(())
    }
}

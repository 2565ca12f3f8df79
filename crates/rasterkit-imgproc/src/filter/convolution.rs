use rasterkit_image::{Image, ImageError};

use super::kernels::Kernel;
use crate::parallel;

/// Clamp a signed index into `[0, len)`, replicating the border sample.
#[inline]
pub(crate) fn replicate_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Correlate each channel of an image with a 2D kernel.
///
/// Samples outside the image replicate the nearest border sample. The output is kept in
/// floating point so that signed and out-of-range responses survive for later magnitude
/// or normalization steps.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The kernel, anchored at its centre.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::filter::{filter2d, kernels::box_kernel};
///
/// let image = Image::<f32, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 3.0).unwrap();
/// let mut out = Image::<f32, 1>::from_size_val(image.size(), 0.0).unwrap();
///
/// filter2d(&image, &mut out, &box_kernel(3)).unwrap();
/// assert!(out.as_slice().iter().all(|&v| (v - 3.0).abs() < 1e-5));
/// ```
pub fn filter2d<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel: &Kernel,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (cols, rows) = (src.cols(), src.rows());
    let (anchor_x, anchor_y) = kernel.anchor();
    let (k_width, k_height) = (kernel.width(), kernel.height());
    let weights = kernel.data();
    let src_data = src.as_slice();

    parallel::par_iter_rows_indexed(dst, |r, c, dst_pixel| {
        let mut acc = [0.0f32; C];
        for ky in 0..k_height {
            let y = replicate_index(r as isize + ky as isize - anchor_y as isize, rows);
            let row_offset = y * cols;
            for kx in 0..k_width {
                let w = weights[ky * k_width + kx];
                if w == 0.0 {
                    continue;
                }
                let x = replicate_index(c as isize + kx as isize - anchor_x as isize, cols);
                let offset = (row_offset + x) * C;
                for (a, &s) in acc.iter_mut().zip(src_data[offset..offset + C].iter()) {
                    *a += w * s;
                }
            }
        }
        dst_pixel.copy_from_slice(&acc);
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernels;
    use rasterkit_image::ImageSize;

    #[test]
    fn test_replicate_index() {
        assert_eq!(replicate_index(-2, 5), 0);
        assert_eq!(replicate_index(3, 5), 3);
        assert_eq!(replicate_index(7, 5), 4);
    }

    #[test]
    fn test_filter2d_sobel_ramp() -> Result<(), ImageError> {
        // horizontal ramp: gx is 8 inside, halved at the replicated borders
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 3,
            },
            vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0],
        )?;
        let (gx, gy) = kernels::sobel_kernels();

        let mut out = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
        filter2d(&image, &mut out, &gx)?;
        #[rustfmt::skip]
        assert_eq!(out.as_slice(), &[
            4.0, 8.0, 8.0, 4.0,
            4.0, 8.0, 8.0, 4.0,
            4.0, 8.0, 8.0, 4.0,
        ]);

        filter2d(&image, &mut out, &gy)?;
        assert!(out.as_slice().iter().all(|&v| v == 0.0));
        Ok(())
    }

    #[test]
    fn test_filter2d_multichannel_impulse() -> Result<(), ImageError> {
        let mut data = vec![0.0f32; 3 * 3 * 2];
        data[(3 + 1) * 2] = 1.0;
        data[(3 + 1) * 2 + 1] = 2.0;
        let image = Image::<f32, 2>::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            data,
        )?;
        let kernel = Kernel::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let mut out = Image::<f32, 2>::from_size_val(image.size(), 0.0)?;
        filter2d(&image, &mut out, &kernel)?;

        // correlation mirrors the kernel around the impulse
        let ch0: Vec<f32> = out.as_slice().chunks_exact(2).map(|p| p[0]).collect();
        assert_eq!(ch0, vec![9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let ch1: Vec<f32> = out.as_slice().chunks_exact(2).map(|p| p[1]).collect();
        assert_eq!(ch1[4], 10.0);
        Ok(())
    }
}

use rasterkit_image::{Image, ImageError};

use crate::parallel;

/// Side of the square structuring element used by [`erode`] and [`dilate`].
pub const STRUCTURING_ELEMENT_SIZE: usize = 3;

#[derive(Clone, Copy)]
pub(crate) enum MorphOp {
    Erode,
    Dilate,
}

/// Min or max over a full `k x k` window, per channel.
pub(crate) fn morphology<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
    op: MorphOp,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_size));
    }

    let (cols, rows) = (src.cols() as isize, src.rows() as isize);
    let half = (kernel_size / 2) as isize;
    let src_data = src.as_slice();

    // neighbours outside the image do not take part in the min/max
    parallel::par_iter_rows_indexed(dst, |r, c, dst_pixel| {
        let (r, c) = (r as isize, c as isize);
        let mut acc = match op {
            MorphOp::Erode => [u8::MAX; C],
            MorphOp::Dilate => [u8::MIN; C],
        };
        for y in (r - half).max(0)..=(r + half).min(rows - 1) {
            for x in (c - half).max(0)..=(c + half).min(cols - 1) {
                let offset = ((y * cols + x) as usize) * C;
                for (a, &v) in acc.iter_mut().zip(&src_data[offset..offset + C]) {
                    *a = match op {
                        MorphOp::Erode => (*a).min(v),
                        MorphOp::Dilate => (*a).max(v),
                    };
                }
            }
        }
        dst_pixel.copy_from_slice(&acc);
    });

    Ok(())
}

/// Erode an image with a full 3x3 structuring element.
///
/// Each sample is replaced by the minimum over its neighbourhood, independently per
/// channel.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image with the same size as `src`.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::morphology::erode;
///
/// let mut data = vec![0u8; 9];
/// data[4] = 255;
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 3 }, data).unwrap();
/// let mut eroded = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// erode(&image, &mut eroded).unwrap();
/// assert!(eroded.as_slice().iter().all(|&v| v == 0));
/// ```
pub fn erode<const C: usize>(src: &Image<u8, C>, dst: &mut Image<u8, C>) -> Result<(), ImageError> {
    morphology(src, dst, STRUCTURING_ELEMENT_SIZE, MorphOp::Erode)
}

/// Dilate an image with a full 3x3 structuring element.
///
/// Each sample is replaced by the maximum over its neighbourhood, independently per
/// channel.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image with the same size as `src`.
pub fn dilate<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    morphology(src, dst, STRUCTURING_ELEMENT_SIZE, MorphOp::Dilate)
}

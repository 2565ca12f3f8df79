use rasterkit_image::{Image, ImageError, ImageSize};

use crate::interpolation::{grid::meshgrid_from_fn, interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Largest supported absolute shear factor.
pub const MAX_SHEAR_FACTOR: f32 = 2.0;

/// Inverts a 2x3 affine transformation matrix.
///
/// # Arguments
///
/// * `m` - The 2x3 affine transformation matrix in row-major order.
///
/// # Errors
///
/// Returns an error if the linear part of the matrix is singular.
pub fn invert_affine_transform(m: &[f32; 6]) -> Result<[f32; 6], ImageError> {
    let (a, b, c, d, e, f) = (m[0], m[1], m[2], m[3], m[4], m[5]);

    let determinant = a * e - b * d;
    if determinant == 0.0 {
        return Err(ImageError::CannotComputeDeterminant);
    }
    let inv_determinant = 1.0 / determinant;

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    Ok([new_a, new_b, new_c, new_d, new_e, new_f])
}

/// Applies an affine transformation to a point.
fn transform_point(x: f32, y: f32, m: &[f32; 6]) -> (f32, f32) {
    let u = m[0] * x + m[1] * y + m[2];
    let v = m[3] * x + m[4] * y + m[5];
    (u, v)
}

/// Applies an affine transformation to an image.
///
/// Destination pixels that map outside the source are set to zero (black).
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (new_height, new_width, channels).
/// * `m` - The 2x3 affine transformation matrix src -> dst.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::interpolation::InterpolationMode;
/// use rasterkit_imgproc::warp::warp_affine;
///
/// let src = Image::<_, 3>::from_size_val(ImageSize { width: 4, height: 5 }, 1f32).unwrap();
/// let mut dst = Image::<_, 3>::from_size_val(src.size(), 0.0).unwrap();
///
/// let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
/// warp_affine(&src, &mut dst, &m, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
pub fn warp_affine<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    m: &[f32; 6],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    // invert affine transform matrix to find corresponding positions in src from dst
    let m_inv = invert_affine_transform(m)?;

    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());
    let (map_x, map_y) = meshgrid_from_fn(dst_cols, dst_rows, |x, y| {
        Ok(transform_point(x as f32, y as f32, &m_inv))
    })?;

    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);
    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, dst_pixel| {
        if x >= 0.0f32 && x < src_cols && y >= 0.0f32 && y < src_rows {
            dst_pixel.copy_from_slice(&interpolate_pixel(src, x, y, interpolation));
        } else {
            dst_pixel.fill(0.0);
        }
    });

    Ok(())
}

/// Shift the image contents by `(tx, ty)` pixels.
///
/// The canvas size is unchanged; content shifted out of bounds is dropped and the
/// exposed area is black. Integer offsets are reproduced exactly.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image with the same size as `src`.
/// * `tx` - Horizontal offset, positive to the right.
/// * `ty` - Vertical offset, positive downwards.
pub fn translate<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    tx: f32,
    ty: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    warp_affine(
        src,
        dst,
        &[1.0, 0.0, tx, 0.0, 1.0, ty],
        InterpolationMode::Bilinear,
    )
}

/// Compute the output size of a horizontal shear: width grows by `|k| * H`.
///
/// # Errors
///
/// Returns an error if `k` is not in [-2, 2].
pub fn sheared_size(size: ImageSize, k: f32) -> Result<ImageSize, ImageError> {
    if !(-MAX_SHEAR_FACTOR..=MAX_SHEAR_FACTOR).contains(&k) {
        return Err(ImageError::InvalidParameter(
            "shear",
            format!("{k} is outside [-{MAX_SHEAR_FACTOR}, {MAX_SHEAR_FACTOR}]"),
        ));
    }

    Ok(ImageSize {
        width: size.width + (k.abs() * size.height as f32).round() as usize,
        height: size.height,
    })
}

/// Apply a horizontal shear `x' = x + k * y`.
///
/// For negative `k` the result is shifted right by `|k| * H` so the sheared content stays
/// on the canvas. The uncovered area is black.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `k` - The shear factor in [-2, 2].
///
/// # Returns
///
/// A new image of size [`sheared_size`].
pub fn shear<const C: usize>(src: &Image<f32, C>, k: f32) -> Result<Image<f32, C>, ImageError> {
    let new_size = sheared_size(src.size(), k)?;
    let offset = if k < 0.0 {
        -k * src.height() as f32
    } else {
        0.0
    };

    let mut dst = Image::from_size_val(new_size, 0.0)?;
    warp_affine(
        src,
        &mut dst,
        &[1.0, k, offset, 0.0, 1.0, 0.0],
        InterpolationMode::Bilinear,
    )?;

    Ok(dst)
}

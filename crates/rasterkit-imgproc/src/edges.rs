//! Gradient, compass, laplacian and gabor edge responses, and the Canny edge detector.
//!
//! The edge operators work on the luminance of an RGB8 image. Responses are computed in
//! floating point, normalized to [0, 255] and replicated back into three channels.

use rasterkit_image::{Image, ImageError};

use crate::{
    color::{gray_from_rgb, rgb_from_gray},
    filter::{
        filter2d,
        kernels::{self, GaborParams, Kernel},
    },
    normalize::normalize_min_max,
};

/// Canny thresholds used when edges are the final result.
pub const CANNY_THRESHOLDS: (f32, f32) = (100.0, 200.0);

/// Canny thresholds used when edges feed the Hough line transform.
pub const HOUGH_CANNY_THRESHOLDS: (f32, f32) = (50.0, 150.0);

/// The supported edge operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeOperator {
    /// 3x3 sobel gradient magnitude.
    Sobel,
    /// 3x3 prewitt gradient magnitude.
    Prewitt,
    /// 2x2 roberts cross gradient magnitude.
    Roberts,
    /// Maximum response over the eight kirsch compass kernels.
    Compass,
    /// Absolute 4-neighbour laplacian.
    Laplacian,
    /// Magnitude of the quadrature gabor response.
    Gabor(GaborParams),
}

fn correlate(src: &Image<f32, 1>, kernel: &Kernel) -> Result<Image<f32, 1>, ImageError> {
    let mut out = Image::from_size_val(src.size(), 0.0)?;
    filter2d(src, &mut out, kernel)?;
    Ok(out)
}

fn magnitude(gx: &Image<f32, 1>, gy: &Image<f32, 1>) -> Result<Image<f32, 1>, ImageError> {
    let data = gx
        .as_slice()
        .iter()
        .zip(gy.as_slice())
        .map(|(&x, &y)| x.hypot(y))
        .collect();
    Image::new(gx.size(), data)
}

/// Compute the raw, unnormalized response of an edge operator on an intensity image.
///
/// # Arguments
///
/// * `src` - The intensity image.
/// * `operator` - The edge operator to apply.
pub fn edge_response(
    src: &Image<f32, 1>,
    operator: EdgeOperator,
) -> Result<Image<f32, 1>, ImageError> {
    match operator {
        EdgeOperator::Sobel => {
            let (kx, ky) = kernels::sobel_kernels();
            magnitude(&correlate(src, &kx)?, &correlate(src, &ky)?)
        }
        EdgeOperator::Prewitt => {
            let (kx, ky) = kernels::prewitt_kernels();
            magnitude(&correlate(src, &kx)?, &correlate(src, &ky)?)
        }
        EdgeOperator::Roberts => {
            let (kx, ky) = kernels::roberts_kernels();
            magnitude(&correlate(src, &kx)?, &correlate(src, &ky)?)
        }
        EdgeOperator::Compass => {
            let mut response = Image::from_size_val(src.size(), f32::NEG_INFINITY)?;
            for kernel in kernels::kirsch_kernels().iter() {
                let r = correlate(src, kernel)?;
                response
                    .as_slice_mut()
                    .iter_mut()
                    .zip(r.as_slice())
                    .for_each(|(m, &v)| *m = m.max(v));
            }
            Ok(response)
        }
        EdgeOperator::Laplacian => {
            let mut response = correlate(src, &kernels::laplacian_kernel())?;
            response.as_slice_mut().iter_mut().for_each(|v| *v = v.abs());
            Ok(response)
        }
        EdgeOperator::Gabor(params) => {
            let even = correlate(src, &kernels::gabor_kernel(&params, 0.0))?;
            let odd = correlate(
                src,
                &kernels::gabor_kernel(&params, std::f32::consts::FRAC_PI_2),
            )?;
            magnitude(&even, &odd)
        }
    }
}

/// Apply an edge operator to an RGB8 image.
///
/// The response is computed on the luminance, min-max normalized to [0, 255] and written
/// to all three output channels.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output RGB8 image with the same size as `src`.
/// * `operator` - The edge operator to apply.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::edges::{detect_edges, EdgeOperator};
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 8, height: 8 }, 90).unwrap();
/// let mut edges = Image::<u8, 3>::from_size_val(image.size(), 1).unwrap();
///
/// detect_edges(&image, &mut edges, EdgeOperator::Sobel).unwrap();
/// assert!(edges.as_slice().iter().all(|&v| v == 0));
/// ```
pub fn detect_edges(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    operator: EdgeOperator,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let rgb = src.cast::<f32>()?;
    let mut gray = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    gray_from_rgb(&rgb, &mut gray)?;

    let response = edge_response(&gray, operator)?;
    log::debug!("edge operator {operator:?} on {}", src.size());

    let mut normalized = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    normalize_min_max(&response, &mut normalized, 0.0, 255.0)?;
    rgb_from_gray(&normalized, dst)
}

/// Detect edges with the Canny algorithm.
///
/// The gradient is computed with 3x3 sobel kernels and its L1 magnitude is thinned by
/// non-maximum suppression along the quantized gradient direction. Pixels above `high`
/// seed the edges, which then grow through 8-connected pixels above `low`.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output binary edge map with values 0 and 255.
/// * `low` - The lower hysteresis threshold.
/// * `high` - The upper hysteresis threshold.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::edges::canny;
///
/// let data = (0..64).map(|i| if i % 8 < 4 { 0 } else { 255 }).collect();
/// let image = Image::<u8, 1>::new(ImageSize { width: 8, height: 8 }, data).unwrap();
/// let mut edges = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// canny(&image, &mut edges, 100.0, 200.0).unwrap();
/// assert!(edges.as_slice().iter().any(|&v| v == 255));
/// ```
pub fn canny(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    low: f32,
    high: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    if !(low >= 0.0 && low <= high) {
        return Err(ImageError::InvalidParameter(
            "canny",
            format!("thresholds must satisfy 0 <= low <= high, got ({low}, {high})"),
        ));
    }

    let (cols, rows) = (src.cols(), src.rows());
    let gray = src.cast::<f32>()?;
    let (kx, ky) = kernels::sobel_kernels();
    let gx = correlate(&gray, &kx)?;
    let gy = correlate(&gray, &ky)?;
    let (gx, gy) = (gx.as_slice(), gy.as_slice());

    let mag: Vec<f32> = gx.iter().zip(gy).map(|(x, y)| x.abs() + y.abs()).collect();
    let at = |r: isize, c: isize| -> f32 {
        if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
            0.0
        } else {
            mag[r as usize * cols + c as usize]
        }
    };

    // tan(22.5) and tan(67.5)
    let tan22 = 0.414_213_57f32;
    let tan67 = 2.414_213_6f32;

    const NONE: u8 = 0;
    const WEAK: u8 = 1;
    const STRONG: u8 = 2;
    let mut labels = vec![NONE; cols * rows];
    let mut stack = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            let idx = r * cols + c;
            let m = mag[idx];
            if m <= low {
                continue;
            }
            let (ri, ci) = (r as isize, c as isize);
            let (ax, ay) = (gx[idx].abs(), gy[idx].abs());
            let is_max = if ay < ax * tan22 {
                m > at(ri, ci - 1) && m >= at(ri, ci + 1)
            } else if ay > ax * tan67 {
                m > at(ri - 1, ci) && m >= at(ri + 1, ci)
            } else {
                let s = if (gx[idx] < 0.0) != (gy[idx] < 0.0) {
                    -1
                } else {
                    1
                };
                m > at(ri - 1, ci - s) && m > at(ri + 1, ci + s)
            };
            if !is_max {
                continue;
            }
            if m > high {
                labels[idx] = STRONG;
                stack.push(idx);
            } else {
                labels[idx] = WEAK;
            }
        }
    }

    // hysteresis: grow strong edges through 8-connected weak pixels
    while let Some(idx) = stack.pop() {
        let (r, c) = ((idx / cols) as isize, (idx % cols) as isize);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (y, x) = (r + dy, c + dx);
                if y < 0 || x < 0 || y >= rows as isize || x >= cols as isize {
                    continue;
                }
                let n = y as usize * cols + x as usize;
                if labels[n] == WEAK {
                    labels[n] = STRONG;
                    stack.push(n);
                }
            }
        }
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(labels.iter())
        .for_each(|(out, &l)| *out = if l == STRONG { 255 } else { 0 });

    Ok(())
}

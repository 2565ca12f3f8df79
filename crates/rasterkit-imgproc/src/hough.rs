use rasterkit_image::{Image, ImageError};

use crate::{
    color::{gray_from_rgb_u8, rgb_from_gray},
    draw::draw_line,
    edges::{canny, HOUGH_CANNY_THRESHOLDS},
};

/// Minimum number of votes for a line to be detected by [`hough_line_detection`].
pub const HOUGH_THRESHOLD: usize = 120;

/// Maximum number of lines rendered by [`draw_hough_lines`].
pub const MAX_DRAWN_LINES: usize = 100;

/// Half length of the segment used to render an infinite line.
const LINE_EXTENT: f64 = 1000.0;

const LINE_COLOR: [u8; 3] = [0, 255, 0];
const LINE_THICKNESS: usize = 2;

/// A line in polar form `x * cos(theta) + y * sin(theta) = rho`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughLine {
    /// Signed distance from the origin in pixels.
    pub rho: f64,
    /// Angle of the line normal in radians, in `[0, pi)`.
    pub theta: f64,
    /// Number of edge pixels voting for the line.
    pub votes: usize,
}

/// Detect lines in a binary edge image with the standard Hough transform.
///
/// Every non-zero pixel votes in a `(rho, theta)` accumulator. Cells above `threshold`
/// that are local maxima along both axes are returned, strongest first.
///
/// # Arguments
///
/// * `edges` - The edge image, non-zero pixels are edge points.
/// * `rho` - The distance resolution of the accumulator in pixels.
/// * `theta` - The angle resolution of the accumulator in radians.
/// * `threshold` - Only cells with more votes than this are reported.
pub fn hough_lines(
    edges: &Image<u8, 1>,
    rho: f64,
    theta: f64,
    threshold: usize,
) -> Result<Vec<HoughLine>, ImageError> {
    if !(rho > 0.0) {
        return Err(ImageError::InvalidParameter("rho", rho.to_string()));
    }
    if !(theta > 0.0 && theta < std::f64::consts::PI) {
        return Err(ImageError::InvalidParameter("theta", theta.to_string()));
    }

    let (cols, rows) = (edges.cols(), edges.rows());
    let num_angle = ((std::f64::consts::PI / theta).round() as usize).max(1);
    let num_rho = (((cols + rows) * 2 + 1) as f64 / rho).round() as usize;
    let rho_offset = (num_rho as f64 - 1.0) * 0.5;

    let trig: Vec<(f64, f64)> = (0..num_angle)
        .map(|n| {
            let (s, c) = (n as f64 * theta).sin_cos();
            (c / rho, s / rho)
        })
        .collect();

    // padded by one cell on every side for the local maximum test
    let stride = num_rho + 2;
    let mut accum = vec![0usize; (num_angle + 2) * stride];

    for (r, row) in edges.as_slice().chunks_exact(cols).enumerate() {
        for (c, _) in row.iter().enumerate().filter(|(_, &v)| v != 0) {
            for (n, &(cos_n, sin_n)) in trig.iter().enumerate() {
                let bin = (c as f64 * cos_n + r as f64 * sin_n).round() + rho_offset;
                if bin < 0.0 || bin >= num_rho as f64 {
                    continue;
                }
                accum[(n + 1) * stride + bin as usize + 1] += 1;
            }
        }
    }

    let mut lines = Vec::new();
    for n in 0..num_angle {
        for r in 0..num_rho {
            let base = (n + 1) * stride + r + 1;
            let v = accum[base];
            if v > threshold
                && v > accum[base - 1]
                && v >= accum[base + 1]
                && v > accum[base - stride]
                && v >= accum[base + stride]
            {
                lines.push(HoughLine {
                    rho: (r as f64 - rho_offset) * rho,
                    theta: n as f64 * theta,
                    votes: v,
                });
            }
        }
    }

    // stable, so equal votes keep accumulator order
    lines.sort_by(|a, b| b.votes.cmp(&a.votes));

    log::debug!("hough: {} lines above {threshold} votes", lines.len());

    Ok(lines)
}

/// Render up to [`MAX_DRAWN_LINES`] lines as green segments reaching far outside the image.
pub fn draw_hough_lines(img: &mut Image<u8, 3>, lines: &[HoughLine]) {
    for line in lines.iter().take(MAX_DRAWN_LINES) {
        let (b, a) = line.theta.sin_cos();
        let (x0, y0) = (a * line.rho, b * line.rho);
        let p0 = ((x0 - LINE_EXTENT * b) as i64, (y0 + LINE_EXTENT * a) as i64);
        let p1 = ((x0 + LINE_EXTENT * b) as i64, (y0 - LINE_EXTENT * a) as i64);
        draw_line(img, p0, p1, LINE_COLOR, LINE_THICKNESS);
    }
}

/// Detect straight lines and draw them over the grayscale version of the image.
///
/// The image is converted to gray, edges are found with [`canny`] using
/// [`HOUGH_CANNY_THRESHOLDS`], lines are voted with a 1 pixel and 1 degree resolution and
/// kept above [`HOUGH_THRESHOLD`] votes. The output is the gray image replicated on the
/// three channels with the strongest lines drawn in green.
///
/// # Arguments
///
/// * `src` - The source RGB image.
/// * `dst` - The destination image with the same size as `src`.
pub fn hough_line_detection(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
) -> Result<Vec<HoughLine>, ImageError> {
    let mut gray = Image::from_size_val(src.size(), 0u8)?;
    gray_from_rgb_u8(src, &mut gray)?;

    let mut edges = Image::from_size_val(src.size(), 0u8)?;
    let (low, high) = HOUGH_CANNY_THRESHOLDS;
    canny(&gray, &mut edges, low, high)?;

    let lines = hough_lines(
        &edges,
        1.0,
        std::f64::consts::PI / 180.0,
        HOUGH_THRESHOLD,
    )?;

    rgb_from_gray(&gray, dst)?;
    draw_hough_lines(dst, &lines);

    Ok(lines)
}

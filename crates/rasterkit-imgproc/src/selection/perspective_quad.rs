use rasterkit_image::{Image, ImageSize};

use super::SelectionError;
use crate::{
    interpolation::InterpolationMode,
    warp::{get_perspective_transform, warp_perspective},
};

/// Number of points defining the quadrilateral.
pub const QUAD_POINTS: usize = 4;

// twice the triangle area below which three points are treated as collinear
const COLLINEAR_TOLERANCE: f64 = 1e-6;

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

fn cross(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Size of the rectangle a quadrilateral is rectified to.
///
/// The width is the longer of the top and bottom sides and the height is the longer of
/// the left and right sides, both truncated to whole pixels.
pub fn rectified_size(points: &[(f64, f64); 4]) -> (f64, f64) {
    let [p0, p1, p2, p3] = *points;
    let width = distance(p0, p1).max(distance(p2, p3));
    let height = distance(p1, p2).max(distance(p3, p0));
    (width, height)
}

/// Warp the quadrilateral `points` of `image` onto an upright rectangle.
///
/// The points are taken in clockwise order starting from the top left corner and are
/// mapped onto the corners `(0, 0)`, `(w - 1, 0)`, `(w - 1, h - 1)` and `(0, h - 1)` of the
/// output, where `(w, h)` is given by [`rectified_size`].
///
/// # Arguments
///
/// * `image` - The source image.
/// * `points` - The four corners of the quadrilateral in image coordinates.
///
/// # Errors
///
/// Returns [`SelectionError::DegenerateGeometry`] if three of the points are collinear,
/// if the output would be empty or if no homography maps the points onto the rectangle.
pub fn rectify<const C: usize>(
    image: &Image<f32, C>,
    points: &[(f64, f64); 4],
) -> Result<Image<f32, C>, SelectionError> {
    let [p0, p1, p2, p3] = *points;
    let degenerate = [(p0, p1, p2), (p1, p2, p3), (p2, p3, p0), (p3, p0, p1)]
        .iter()
        .any(|&(a, b, c)| cross(a, b, c).abs() < COLLINEAR_TOLERANCE);
    if degenerate {
        log::warn!("rectify rejected: collinear points {points:?}");
        return Err(SelectionError::DegenerateGeometry);
    }

    let (width, height) = rectified_size(points);
    if width < 1.0 || height < 1.0 {
        log::warn!("rectify rejected: output of {width}x{height} pixels");
        return Err(SelectionError::DegenerateGeometry);
    }

    let dst_points = [
        (0.0, 0.0),
        (width - 1.0, 0.0),
        (width - 1.0, height - 1.0),
        (0.0, height - 1.0),
    ];
    let m = get_perspective_transform(points, &dst_points)
        .map_err(|_| SelectionError::DegenerateGeometry)?;

    let mut dst = Image::from_size_val(
        ImageSize {
            width: width as usize,
            height: height as usize,
        },
        0.0,
    )?;
    warp_perspective(image, &mut dst, &m, InterpolationMode::Bilinear)
        .map_err(|_| SelectionError::DegenerateGeometry)?;

    log::debug!("rectified to {}x{}", dst.cols(), dst.rows());

    Ok(dst)
}

/// Collects the four corners of a perspective correction one click at a time.
///
/// Clicks are given in display coordinates and stored in image coordinates, scaling
/// each axis by `image / display`. Points are never reordered: the click order decides
/// which output corner each point maps to.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::selection::PerspectiveQuad;
///
/// let size = ImageSize { width: 8, height: 8 };
/// let image = Image::<f32, 1>::from_size_val(size, 1.0).unwrap();
///
/// let mut quad = PerspectiveQuad::new(size, size);
/// for (x, y) in [(1, 1), (6, 1), (6, 5), (1, 5)] {
///     quad.push(x, y);
/// }
/// assert!(quad.is_complete());
///
/// let out = quad.rectify(&image).unwrap();
/// assert_eq!((out.cols(), out.rows()), (5, 4));
/// assert!(quad.points().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveQuad {
    display: ImageSize,
    image: ImageSize,
    points: Vec<(f64, f64)>,
}

impl PerspectiveQuad {
    /// Start collecting points on a display of size `display` showing an image of size
    /// `image`.
    pub fn new(display: ImageSize, image: ImageSize) -> Self {
        Self {
            display,
            image,
            points: Vec::with_capacity(QUAD_POINTS),
        }
    }

    /// Add a clicked point. Returns `true` once the quadrilateral is complete.
    ///
    /// Clicks after the fourth one are ignored.
    pub fn push(&mut self, x: i64, y: i64) -> bool {
        if self.points.len() < QUAD_POINTS {
            let sx = self.image.width as f64 / self.display.width.max(1) as f64;
            let sy = self.image.height as f64 / self.display.height.max(1) as f64;
            self.points.push((x as f64 * sx, y as f64 * sy));
        }
        self.is_complete()
    }

    /// The collected points in image coordinates.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Whether all four points were collected.
    pub fn is_complete(&self) -> bool {
        self.points.len() == QUAD_POINTS
    }

    /// Drop the collected points.
    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// Rectify the collected quadrilateral of `image`.
    ///
    /// The points are consumed when the quadrilateral is rectified or rejected as
    /// degenerate.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::IncompleteQuad`] before the fourth point and
    /// [`SelectionError::DegenerateGeometry`] if the points cannot be rectified.
    pub fn rectify<const C: usize>(
        &mut self,
        image: &Image<f32, C>,
    ) -> Result<Image<f32, C>, SelectionError> {
        let points: [(f64, f64); 4] = self
            .points
            .as_slice()
            .try_into()
            .map_err(|_| SelectionError::IncompleteQuad(self.points.len()))?;

        let result = rectify(image, &points);
        if matches!(result, Ok(_) | Err(SelectionError::DegenerateGeometry)) {
            self.reset();
        }
        result
    }
}

use super::bilinear::bilinear_interpolation;
use super::nearest::nearest_neighbor_interpolation;
use rasterkit_image::Image;

/// Interpolation mode for the resampling operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// Kernel for interpolating a pixel value
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
///
/// # Returns
///
/// The interpolated pixel values for all channels.
pub fn interpolate_pixel<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
) -> [f32; C] {
    match interpolation {
        InterpolationMode::Bilinear => bilinear_interpolation(image, u, v),
        InterpolationMode::Nearest => nearest_neighbor_interpolation(image, u, v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_image::{ImageError, ImageSize};

    #[test]
    fn bilinear_midpoint() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, 10.0, 20.0, 30.0],
        )?;
        let px = interpolate_pixel(&image, 0.5, 0.5, InterpolationMode::Bilinear);
        assert_eq!(px, [15.0]);
        let px = interpolate_pixel(&image, 1.0, 1.0, InterpolationMode::Bilinear);
        assert_eq!(px, [30.0]);
        Ok(())
    }

    #[test]
    fn nearest_rounds() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![1.0, 2.0],
        )?;
        assert_eq!(
            interpolate_pixel(&image, 0.6, 0.0, InterpolationMode::Nearest),
            [2.0]
        );
        assert_eq!(
            interpolate_pixel(&image, -3.0, 0.0, InterpolationMode::Nearest),
            [1.0]
        );
        Ok(())
    }
}

use rasterkit_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftDirection, FftPlanner};

use crate::normalize::normalize_min_max;

/// A centered 2D spectrum.
///
/// The coefficients are stored row-major with the zero frequency at `(rows / 2, cols / 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    size: ImageSize,
    data: Vec<Complex<f64>>,
}

impl Spectrum {
    /// Create a spectrum from centered coefficients.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not hold one coefficient per pixel of `size`.
    pub fn new(size: ImageSize, data: Vec<Complex<f64>>) -> Result<Self, ImageError> {
        if data.len() != size.area() {
            return Err(ImageError::InvalidChannelShape(data.len(), size.area()));
        }
        Ok(Self { size, data })
    }

    /// The size of the spectrum.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The coefficients in row-major order.
    pub fn as_slice(&self) -> &[Complex<f64>] {
        &self.data
    }

    /// The mutable coefficients in row-major order.
    pub fn as_slice_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.data
    }

    /// Render the log-magnitude `ln(1 + |F|)` of the spectrum normalized to [0, 255].
    pub fn magnitude_spectrum(&self, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
        let log_magnitude = self
            .data
            .iter()
            .map(|c| c.norm().ln_1p() as f32)
            .collect();
        let log_magnitude = Image::<f32, 1>::new(self.size, log_magnitude)?;
        normalize_min_max(&log_magnitude, dst, 0.0, 255.0)
    }
}

/// Run an in-place 2D FFT over a row-major buffer, rows first then columns.
fn fft_2d(width: usize, height: usize, data: &mut [Complex<f64>], direction: FftDirection) {
    let mut planner = FftPlanner::<f64>::new();

    let row_fft = planner.plan_fft(width, direction);
    data.par_chunks_exact_mut(width)
        .for_each(|row| row_fft.process(row));

    let mut transposed = transpose(width, height, data);
    let col_fft = planner.plan_fft(height, direction);
    transposed
        .par_chunks_exact_mut(height)
        .for_each(|col| col_fft.process(col));

    data.copy_from_slice(&transpose(height, width, &transposed));
}

/// Transpose a `height x width` row-major buffer into a `width x height` one.
fn transpose(width: usize, height: usize, data: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); data.len()];
    for (r, row) in data.chunks_exact(width).enumerate() {
        for (c, &v) in row.iter().enumerate() {
            out[c * height + r] = v;
        }
    }
    out
}

/// Circularly shift a row-major buffer by `(shift_x, shift_y)`.
fn roll_2d<T: Copy>(
    width: usize,
    height: usize,
    data: &[T],
    shift_x: usize,
    shift_y: usize,
) -> Vec<T> {
    let mut out = data.to_vec();
    for (r, row) in data.chunks_exact(width).enumerate() {
        let dst_r = (r + shift_y) % height;
        for (c, &v) in row.iter().enumerate() {
            out[dst_r * width + (c + shift_x) % width] = v;
        }
    }
    out
}

/// Move the zero frequency from the origin to `(rows / 2, cols / 2)`.
pub fn fftshift<T: Copy>(size: ImageSize, data: &[T]) -> Vec<T> {
    roll_2d(size.width, size.height, data, size.width / 2, size.height / 2)
}

/// Undo [`fftshift`], also for odd sizes.
pub fn ifftshift<T: Copy>(size: ImageSize, data: &[T]) -> Vec<T> {
    roll_2d(
        size.width,
        size.height,
        data,
        size.width - size.width / 2,
        size.height - size.height / 2,
    )
}

/// Compute the centered spectrum of an intensity image.
///
/// # Arguments
///
/// * `src` - The single channel intensity image.
///
/// # Returns
///
/// The 2D DFT of `src` with the zero frequency moved to the centre.
pub fn forward_transform(src: &Image<f32, 1>) -> Result<Spectrum, ImageError> {
    let size = src.size();
    let mut data: Vec<Complex<f64>> = src
        .as_slice()
        .iter()
        .map(|&v| Complex::new(v as f64, 0.0))
        .collect();

    fft_2d(size.width, size.height, &mut data, FftDirection::Forward);

    Spectrum::new(size, fftshift(size, &data))
}

/// Undo the centering of a spectrum and compute its inverse DFT.
///
/// The result is scaled by `1 / (rows * cols)` so that it inverts [`forward_transform`].
pub fn inverse_transform_complex(spectrum: &Spectrum) -> Vec<Complex<f64>> {
    let size = spectrum.size();
    let mut data = ifftshift(size, spectrum.as_slice());

    fft_2d(size.width, size.height, &mut data, FftDirection::Inverse);

    let scale = 1.0 / size.area() as f64;
    data.iter_mut().for_each(|v| *v *= scale);
    data
}

/// Compute the spatial image of a centered spectrum.
///
/// The magnitude of the inverse transform is min-max normalized to [0, 255].
///
/// # Arguments
///
/// * `spectrum` - The centered spectrum.
/// * `dst` - The output intensity image with the size of the spectrum.
pub fn inverse_transform(spectrum: &Spectrum, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    let magnitude = inverse_transform_complex(spectrum)
        .iter()
        .map(|c| c.norm() as f32)
        .collect();
    let magnitude = Image::<f32, 1>::new(spectrum.size(), magnitude)?;
    normalize_min_max(&magnitude, dst, 0.0, 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_roundtrip_odd() {
        let size = ImageSize {
            width: 3,
            height: 5,
        };
        let data: Vec<usize> = (0..15).collect();
        let shifted = fftshift(size, &data);
        // the origin lands on the centre
        assert_eq!(shifted[2 * 3 + 1], 0);
        assert_eq!(ifftshift(size, &shifted), data);
    }

    #[test]
    fn test_dc_at_centre() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 6,
                height: 4,
            },
            2.0,
        )?;
        let spectrum = forward_transform(&image)?;
        let centre = spectrum.as_slice()[2 * 6 + 3];
        approx::assert_relative_eq!(centre.re, 48.0, epsilon = 1e-9);
        let rest: f64 = spectrum
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 2 * 6 + 3)
            .map(|(_, c)| c.norm())
            .sum();
        assert!(rest < 1e-9);
        Ok(())
    }

    #[test]
    fn test_inverse_recovers_image() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 8,
            height: 5,
        };
        let data: Vec<f32> = (0..40).map(|i| ((i * 37) % 256) as f32).collect();
        let image = Image::<f32, 1>::new(size, data.clone())?;
        let spectrum = forward_transform(&image)?;
        let back = inverse_transform_complex(&spectrum);
        for (b, &d) in back.iter().zip(data.iter()) {
            approx::assert_relative_eq!(b.re, d as f64, epsilon = 1e-6);
            assert!(b.im.abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_magnitude_spectrum_peaks_at_centre() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let image = Image::<f32, 1>::new(size, (0..16).map(|v| v as f32).collect())?;
        let spectrum = forward_transform(&image)?;
        let mut view = Image::<u8, 1>::from_size_val(size, 0)?;
        spectrum.magnitude_spectrum(&mut view)?;
        assert_eq!(view.as_slice()[2 * 4 + 2], 255);
        Ok(())
    }
}

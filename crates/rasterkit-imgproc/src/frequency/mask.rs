use rasterkit_image::{Image, ImageError, ImageSize};
use serde::{Deserialize, Serialize};

/// Parameters of the homomorphic filter `(high - low) * (1 - exp(-c * D^2 / d0^2)) + low`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomomorphicParams {
    /// Gain applied to high frequencies.
    pub high: f64,
    /// Gain applied to low frequencies.
    pub low: f64,
    /// Cutoff distance `d0`.
    pub cutoff: f64,
    /// Slope `c` of the transition.
    pub c: f64,
}

impl Default for HomomorphicParams {
    fn default() -> Self {
        Self {
            high: 2.5,
            low: 0.5,
            cutoff: 10.0,
            c: 1.0,
        }
    }
}

/// A frequency-domain filter and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrequencyFilter {
    /// Pass frequencies within `radius` of the centre.
    IdealLowPass {
        /// Cutoff radius.
        radius: f64,
    },
    /// Pass frequencies farther than `radius` from the centre.
    IdealHighPass {
        /// Cutoff radius.
        radius: f64,
    },
    /// Pass the open annulus between `inner` and `outer`.
    BandPass {
        /// Inner radius.
        inner: f64,
        /// Outer radius.
        outer: f64,
    },
    /// Reject the open annulus between `inner` and `outer`.
    BandStop {
        /// Inner radius.
        inner: f64,
        /// Outer radius.
        outer: f64,
    },
    /// Gaussian attenuation of the high frequencies.
    GaussianLowPass {
        /// Standard deviation of the gaussian.
        sigma: f64,
    },
    /// Complement of the gaussian low pass.
    GaussianHighPass {
        /// Standard deviation of the gaussian.
        sigma: f64,
    },
    /// Butterworth low pass of the given order.
    Butterworth {
        /// Cutoff distance `D0`.
        cutoff: f64,
        /// Filter order `n`.
        order: u32,
    },
    /// Log-domain illumination/reflectance filter.
    Homomorphic(HomomorphicParams),
}

impl FrequencyFilter {
    /// Ideal low pass with the default radius of 30.
    pub const IDEAL_LOW_PASS: Self = Self::IdealLowPass { radius: 30.0 };
    /// Ideal high pass with the default radius of 30.
    pub const IDEAL_HIGH_PASS: Self = Self::IdealHighPass { radius: 30.0 };
    /// Band pass with the default radii 20 and 50.
    pub const BAND_PASS: Self = Self::BandPass {
        inner: 20.0,
        outer: 50.0,
    };
    /// Band stop with the default radii 20 and 50.
    pub const BAND_STOP: Self = Self::BandStop {
        inner: 20.0,
        outer: 50.0,
    };
    /// Gaussian low pass with the default sigma of 30.
    pub const GAUSSIAN_LOW_PASS: Self = Self::GaussianLowPass { sigma: 30.0 };
    /// Gaussian high pass with the default sigma of 30.
    pub const GAUSSIAN_HIGH_PASS: Self = Self::GaussianHighPass { sigma: 30.0 };
    /// Butterworth low pass with `D0 = 30` and `n = 2`.
    pub const BUTTERWORTH: Self = Self::Butterworth {
        cutoff: 30.0,
        order: 2,
    };
    /// Homomorphic filter with `rh = 2.5`, `rl = 0.5`, `d0 = 10` and `c = 1`.
    pub const HOMOMORPHIC: Self = Self::Homomorphic(HomomorphicParams {
        high: 2.5,
        low: 0.5,
        cutoff: 10.0,
        c: 1.0,
    });

    fn validate(&self) -> Result<(), ImageError> {
        let positive = |name: &'static str, v: f64| {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(ImageError::InvalidParameter(
                    name,
                    format!("must be positive, got {v}"),
                ))
            }
        };
        match *self {
            Self::IdealLowPass { radius } | Self::IdealHighPass { radius } => {
                positive("radius", radius)
            }
            Self::BandPass { inner, outer } | Self::BandStop { inner, outer } => {
                positive("outer", outer)?;
                if !(inner >= 0.0 && inner < outer) {
                    return Err(ImageError::InvalidParameter(
                        "inner",
                        format!("must be in [0, {outer}), got {inner}"),
                    ));
                }
                Ok(())
            }
            Self::GaussianLowPass { sigma } | Self::GaussianHighPass { sigma } => {
                positive("sigma", sigma)
            }
            Self::Butterworth { cutoff, order } => {
                positive("cutoff", cutoff)?;
                if order == 0 || order > MAX_BUTTERWORTH_ORDER {
                    return Err(ImageError::InvalidParameter(
                        "order",
                        format!("must be in [1, {MAX_BUTTERWORTH_ORDER}], got {order}"),
                    ));
                }
                Ok(())
            }
            Self::Homomorphic(params) => {
                positive("cutoff", params.cutoff)?;
                positive("c", params.c)
            }
        }
    }
}

/// Largest order accepted for the butterworth filter.
pub const MAX_BUTTERWORTH_ORDER: u32 = 64;

/// Build a mask from a function of the distance to the spectrum centre `(rows / 2, cols / 2)`.
fn radial_mask(size: ImageSize, f: impl Fn(f64) -> f64) -> Result<Image<f64, 1>, ImageError> {
    let (crow, ccol) = ((size.height / 2) as f64, (size.width / 2) as f64);
    let data = (0..size.height)
        .flat_map(|r| (0..size.width).map(move |c| (r as f64, c as f64)))
        .map(|(r, c)| f(((r - crow).powi(2) + (c - ccol).powi(2)).sqrt()))
        .collect();
    Image::new(size, data)
}

fn complement(mut mask: Image<f64, 1>) -> Image<f64, 1> {
    mask.as_slice_mut().iter_mut().for_each(|v| *v = 1.0 - *v);
    mask
}

/// Ideal low pass: 1 within `radius` of the centre, 0 elsewhere.
pub fn ideal_low_pass(size: ImageSize, radius: f64) -> Result<Image<f64, 1>, ImageError> {
    radial_mask(size, |d| if d <= radius { 1.0 } else { 0.0 })
}

/// Ideal high pass, the complement of [`ideal_low_pass`].
pub fn ideal_high_pass(size: ImageSize, radius: f64) -> Result<Image<f64, 1>, ImageError> {
    Ok(complement(ideal_low_pass(size, radius)?))
}

/// Band pass: 1 on the open annulus `inner < D < outer`, 0 elsewhere.
pub fn band_pass(size: ImageSize, inner: f64, outer: f64) -> Result<Image<f64, 1>, ImageError> {
    radial_mask(size, |d| if inner < d && d < outer { 1.0 } else { 0.0 })
}

/// Band stop, the complement of [`band_pass`].
pub fn band_stop(size: ImageSize, inner: f64, outer: f64) -> Result<Image<f64, 1>, ImageError> {
    Ok(complement(band_pass(size, inner, outer)?))
}

/// Gaussian low pass `exp(-D^2 / (2 sigma^2))`.
pub fn gaussian_low_pass(size: ImageSize, sigma: f64) -> Result<Image<f64, 1>, ImageError> {
    let denom = 2.0 * sigma * sigma;
    radial_mask(size, |d| (-(d * d) / denom).exp())
}

/// Gaussian high pass, `1 - `[`gaussian_low_pass`].
pub fn gaussian_high_pass(size: ImageSize, sigma: f64) -> Result<Image<f64, 1>, ImageError> {
    Ok(complement(gaussian_low_pass(size, sigma)?))
}

/// Butterworth low pass `1 / (1 + (D / D0)^(2n))`.
pub fn butterworth_low_pass(
    size: ImageSize,
    cutoff: f64,
    order: u32,
) -> Result<Image<f64, 1>, ImageError> {
    let exponent = 2.0 * f64::from(order);
    radial_mask(size, |d| 1.0 / (1.0 + (d / cutoff).powf(exponent)))
}

/// Homomorphic emphasis mask `(high - low) * (1 - exp(-c * D^2 / d0^2)) + low`.
pub fn homomorphic_mask(
    size: ImageSize,
    params: &HomomorphicParams,
) -> Result<Image<f64, 1>, ImageError> {
    let d0_sq = params.cutoff * params.cutoff;
    radial_mask(size, |d| {
        (params.high - params.low) * (1.0 - (-params.c * d * d / d0_sq).exp()) + params.low
    })
}

/// Build the mask of a frequency filter for a spectrum of the given size.
///
/// # Errors
///
/// Returns an error if the filter parameters are out of range.
///
/// # Example
///
/// ```
/// use rasterkit_image::ImageSize;
/// use rasterkit_imgproc::frequency::{build_mask, FrequencyFilter};
///
/// let size = ImageSize { width: 64, height: 64 };
/// let mask = build_mask(&FrequencyFilter::IDEAL_LOW_PASS, size).unwrap();
///
/// assert_eq!(mask.as_slice()[32 * 64 + 32], 1.0);
/// assert_eq!(mask.as_slice()[0], 0.0);
/// ```
pub fn build_mask(filter: &FrequencyFilter, size: ImageSize) -> Result<Image<f64, 1>, ImageError> {
    filter.validate()?;
    match *filter {
        FrequencyFilter::IdealLowPass { radius } => ideal_low_pass(size, radius),
        FrequencyFilter::IdealHighPass { radius } => ideal_high_pass(size, radius),
        FrequencyFilter::BandPass { inner, outer } => band_pass(size, inner, outer),
        FrequencyFilter::BandStop { inner, outer } => band_stop(size, inner, outer),
        FrequencyFilter::GaussianLowPass { sigma } => gaussian_low_pass(size, sigma),
        FrequencyFilter::GaussianHighPass { sigma } => gaussian_high_pass(size, sigma),
        FrequencyFilter::Butterworth { cutoff, order } => butterworth_low_pass(size, cutoff, order),
        FrequencyFilter::Homomorphic(params) => homomorphic_mask(size, &params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: ImageSize = ImageSize {
        width: 101,
        height: 80,
    };

    #[test]
    fn test_band_pass_and_stop_are_complements() -> Result<(), ImageError> {
        let pass = build_mask(&FrequencyFilter::BAND_PASS, SIZE)?;
        let stop = build_mask(&FrequencyFilter::BAND_STOP, SIZE)?;
        assert!(pass
            .as_slice()
            .iter()
            .zip(stop.as_slice())
            .all(|(p, s)| p + s == 1.0));
        // the centre is inside the inner radius
        assert_eq!(pass.as_slice()[40 * 101 + 50], 0.0);
        // 30 px to the right lies on the annulus
        assert_eq!(pass.as_slice()[40 * 101 + 80], 1.0);
        Ok(())
    }

    #[test]
    fn test_ideal_masks() -> Result<(), ImageError> {
        let lpf = build_mask(&FrequencyFilter::IDEAL_LOW_PASS, SIZE)?;
        let hpf = build_mask(&FrequencyFilter::IDEAL_HIGH_PASS, SIZE)?;
        // the radius itself belongs to the pass band of the low pass
        assert_eq!(lpf.as_slice()[40 * 101 + 80], 1.0);
        assert_eq!(lpf.as_slice()[40 * 101 + 81], 0.0);
        assert!(lpf
            .as_slice()
            .iter()
            .zip(hpf.as_slice())
            .all(|(l, h)| l + h == 1.0));
        Ok(())
    }

    #[test]
    fn test_smooth_masks() -> Result<(), ImageError> {
        let centre = 40 * 101 + 50;
        let glpf = build_mask(&FrequencyFilter::GAUSSIAN_LOW_PASS, SIZE)?;
        let ghpf = build_mask(&FrequencyFilter::GAUSSIAN_HIGH_PASS, SIZE)?;
        assert_eq!(glpf.as_slice()[centre], 1.0);
        assert_eq!(ghpf.as_slice()[centre], 0.0);
        // one sigma away
        approx::assert_relative_eq!(glpf.as_slice()[centre + 30], (-0.5f64).exp());

        let bw = build_mask(&FrequencyFilter::BUTTERWORTH, SIZE)?;
        assert_eq!(bw.as_slice()[centre], 1.0);
        approx::assert_relative_eq!(bw.as_slice()[centre + 30], 0.5);

        let homo = build_mask(&FrequencyFilter::HOMOMORPHIC, SIZE)?;
        approx::assert_relative_eq!(homo.as_slice()[centre], 0.5);
        assert!(homo.as_slice()[0] > 2.49);
        Ok(())
    }

    #[test]
    fn test_invalid_parameters() {
        let bad = [
            FrequencyFilter::IdealLowPass { radius: 0.0 },
            FrequencyFilter::BandPass {
                inner: 50.0,
                outer: 20.0,
            },
            FrequencyFilter::GaussianHighPass { sigma: -1.0 },
            FrequencyFilter::Butterworth {
                cutoff: 30.0,
                order: 0,
            },
            FrequencyFilter::Butterworth {
                cutoff: 30.0,
                order: MAX_BUTTERWORTH_ORDER + 1,
            },
            FrequencyFilter::Butterworth {
                cutoff: 30.0,
                order: 1 << 31,
            },
        ];
        for filter in bad.iter() {
            assert!(build_mask(filter, SIZE).is_err(), "{filter:?}");
        }
    }
}

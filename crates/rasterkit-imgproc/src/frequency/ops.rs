use rasterkit_image::{Image, ImageError};

use super::{
    build_mask, forward_transform, homomorphic_mask, inverse_transform, inverse_transform_complex,
    FrequencyFilter, HomomorphicParams, Spectrum,
};
use crate::{
    color::{gray_from_rgb_u8, rgb_from_gray},
    normalize::normalize_min_max,
};

/// Smallest intensity fed to the logarithm of the homomorphic filter.
pub const HOMOMORPHIC_EPSILON: f32 = 0.001;

/// Multiply every coefficient of a spectrum by the matching mask value.
///
/// # Errors
///
/// Returns an error if the mask and the spectrum differ in size.
pub fn apply_mask(spectrum: &Spectrum, mask: &Image<f64, 1>) -> Result<Spectrum, ImageError> {
    if spectrum.size() != mask.size() {
        return Err(ImageError::InvalidImageSize(
            spectrum.size().width,
            spectrum.size().height,
            mask.cols(),
            mask.rows(),
        ));
    }

    let data = spectrum
        .as_slice()
        .iter()
        .zip(mask.as_slice())
        .map(|(&c, &m)| c * m)
        .collect();
    Spectrum::new(spectrum.size(), data)
}

/// Filter an intensity image in the frequency domain.
///
/// Runs the forward transform, applies the mask of `filter` and transforms back, giving
/// the normalized magnitude. The homomorphic filter is routed to [`homomorphic_filter`].
///
/// # Arguments
///
/// * `src` - The input intensity image.
/// * `dst` - The output intensity image with the same size as `src`.
/// * `filter` - The filter to apply.
pub fn filter_intensity(
    src: &Image<f32, 1>,
    dst: &mut Image<u8, 1>,
    filter: &FrequencyFilter,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if let FrequencyFilter::Homomorphic(params) = filter {
        return homomorphic_filter(src, dst, params);
    }

    let mask = build_mask(filter, src.size())?;
    log::debug!("frequency filter {filter:?} on {}", src.size());

    let spectrum = forward_transform(src)?;
    let filtered = apply_mask(&spectrum, &mask)?;
    inverse_transform(&filtered, dst)
}

/// Apply the homomorphic filter to an intensity image.
///
/// Intensities are clamped to at least [`HOMOMORPHIC_EPSILON`] and moved to the log domain,
/// filtered with [`homomorphic_mask`], brought back with the exponential of the real part of
/// the inverse transform and min-max normalized to [0, 255].
///
/// NOTE: the exponential is taken of the real part, not of the complex magnitude. Regions
/// whose filtered log intensity is negative therefore stay dark, while a magnitude based
/// pipeline folds them onto bright values and gives a different result there.
///
/// # Arguments
///
/// * `src` - The input intensity image.
/// * `dst` - The output intensity image with the same size as `src`.
/// * `params` - The filter gains and cutoff.
pub fn homomorphic_filter(
    src: &Image<f32, 1>,
    dst: &mut Image<u8, 1>,
    params: &HomomorphicParams,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // validates the parameters as well
    build_mask(&FrequencyFilter::Homomorphic(*params), src.size())?;
    let mask = homomorphic_mask(src.size(), params)?;

    let log_data = src
        .as_slice()
        .iter()
        .map(|&v| v.max(HOMOMORPHIC_EPSILON).ln())
        .collect();
    let log_image = Image::<f32, 1>::new(src.size(), log_data)?;

    let spectrum = apply_mask(&forward_transform(&log_image)?, &mask)?;
    let restored = inverse_transform_complex(&spectrum)
        .iter()
        .map(|c| c.re.exp() as f32)
        .collect();
    let restored = Image::<f32, 1>::new(src.size(), restored)?;

    normalize_min_max(&restored, dst, 0.0, 255.0)
}

/// Filter an RGB8 image in the frequency domain.
///
/// The filter runs on the luminance of `src` and the result is replicated into all three
/// channels, so the output is always gray.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output RGB8 image with the same size as `src`.
/// * `filter` - The filter to apply.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::frequency::{apply_frequency_filter, FrequencyFilter};
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 16, height: 16 }, 100).unwrap();
/// let mut out = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// apply_frequency_filter(&image, &mut out, &FrequencyFilter::GAUSSIAN_LOW_PASS).unwrap();
/// assert_eq!(out.size(), image.size());
/// ```
pub fn apply_frequency_filter(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    filter: &FrequencyFilter,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let mut gray = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    gray_from_rgb_u8(src, &mut gray)?;

    let mut filtered = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    filter_intensity(&gray.cast::<f32>()?, &mut filtered, filter)?;

    rgb_from_gray(&filtered, dst)
}

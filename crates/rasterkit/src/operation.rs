use rasterkit_image::{ops::saturate_cast_u8, Image, ImageError};
use rasterkit_imgproc::{
    color::{gray_from_rgb_u8, grayscale_rgb_u8, rgb_from_gray},
    edges::{canny, detect_edges, EdgeOperator},
    enhance::{adjust_brightness, adjust_contrast, negative},
    filter::{conservative_filter, crimmins_speckle, gaussian_filter, mean_filter, median_filter},
    flip::{flip, rotate90_clockwise, rotated90_size, FlipAxis},
    frequency::{apply_frequency_filter, FrequencyFilter},
    histogram::equalize_histogram,
    hough::hough_line_detection,
    morphology::{dilate, erode},
    resize::scale,
    segmentation::{kmeans_segment, KMeansConfig},
    threshold::threshold_luminance,
    warp::{shear, translate},
};

/// A single editing operation on an RGB buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Add a delta in `[-100, 100]` to every sample.
    Brightness(i32),
    /// Multiply every sample by `1 + delta / 100`, delta in `[-100, 100]`.
    Contrast(i32),
    /// Binarize the luminance against a threshold.
    Threshold(u8),
    /// Invert every sample.
    Negative,
    /// Replace every pixel by its luminance.
    Grayscale,
    /// Equalize the histogram of each channel.
    EqualizeHistogram,
    /// Mirror about an axis.
    Flip(FlipAxis),
    /// Rotate by 90 degrees clockwise.
    Rotate90,
    /// Shift the content, filling the exposed area with black.
    Translate {
        /// Horizontal offset in pixels.
        tx: f32,
        /// Vertical offset in pixels.
        ty: f32,
    },
    /// Resize by a factor in `(0, 5]`.
    Scale(f32),
    /// Horizontal shear by a factor in `[-2, 2]`.
    Shear(f32),
    /// Box filter with the given kernel size.
    MeanFilter(usize),
    /// Median filter with the given kernel size.
    MedianFilter(usize),
    /// Gaussian filter with the given kernel size.
    GaussianFilter(usize),
    /// Conservative smoothing with the given kernel size.
    ConservativeFilter(usize),
    /// Crimmins speckle removal.
    CrimminsSpeckle,
    /// Gradient based edge map.
    Edges(EdgeOperator),
    /// Canny edge detector.
    Canny {
        /// Hysteresis low threshold.
        low: f32,
        /// Hysteresis high threshold.
        high: f32,
    },
    /// Erosion with a 3x3 structuring element.
    Erode,
    /// Dilation with a 3x3 structuring element.
    Dilate,
    /// Frequency domain filtering of the intensity.
    Frequency(FrequencyFilter),
    /// K-means color segmentation.
    KMeans(KMeansConfig),
    /// Hough line detection drawn over the grayscale image.
    HoughLines,
}

fn map_same_size(
    src: &Image<u8, 3>,
    f: impl FnOnce(&Image<u8, 3>, &mut Image<u8, 3>) -> Result<(), ImageError>,
) -> Result<Image<u8, 3>, ImageError> {
    let mut dst = Image::from_size_val(src.size(), 0)?;
    f(src, &mut dst)?;
    Ok(dst)
}

fn map_f32(
    src: &Image<u8, 3>,
    f: impl FnOnce(&Image<f32, 3>) -> Result<Image<f32, 3>, ImageError>,
) -> Result<Image<u8, 3>, ImageError> {
    let out = f(&src.cast::<f32>()?)?;
    let mut dst = Image::from_size_val(out.size(), 0)?;
    saturate_cast_u8(&out, &mut dst)?;
    Ok(dst)
}

impl Operation {
    /// Whether the operation starts from the original buffer instead of the processed one.
    ///
    /// Brightness, contrast and threshold are slider driven and always relative to the
    /// original, so moving the slider back and forth does not accumulate.
    pub fn reads_original(&self) -> bool {
        matches!(
            self,
            Operation::Brightness(_) | Operation::Contrast(_) | Operation::Threshold(_)
        )
    }

    /// A short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Brightness(_) => "brightness",
            Operation::Contrast(_) => "contrast",
            Operation::Threshold(_) => "threshold",
            Operation::Negative => "negative",
            Operation::Grayscale => "grayscale",
            Operation::EqualizeHistogram => "equalize",
            Operation::Flip(_) => "flip",
            Operation::Rotate90 => "rotate90",
            Operation::Translate { .. } => "translate",
            Operation::Scale(_) => "scale",
            Operation::Shear(_) => "shear",
            Operation::MeanFilter(_) => "mean",
            Operation::MedianFilter(_) => "median",
            Operation::GaussianFilter(_) => "gaussian",
            Operation::ConservativeFilter(_) => "conservative",
            Operation::CrimminsSpeckle => "crimmins",
            Operation::Edges(_) => "edges",
            Operation::Canny { .. } => "canny",
            Operation::Erode => "erode",
            Operation::Dilate => "dilate",
            Operation::Frequency(_) => "frequency",
            Operation::KMeans(_) => "kmeans",
            Operation::HoughLines => "hough",
        }
    }

    /// Run the operation on `src` and return the result in a new buffer.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying engine operation, `src` is never modified.
    pub fn apply(&self, src: &Image<u8, 3>) -> Result<Image<u8, 3>, ImageError> {
        match self {
            Operation::Brightness(delta) => {
                map_same_size(src, |s, d| adjust_brightness(s, d, *delta))
            }
            Operation::Contrast(delta) => map_same_size(src, |s, d| adjust_contrast(s, d, *delta)),
            Operation::Threshold(t) => map_same_size(src, |s, d| threshold_luminance(s, d, *t)),
            Operation::Negative => map_same_size(src, |s, d| negative(s, d)),
            Operation::Grayscale => map_same_size(src, grayscale_rgb_u8),
            Operation::EqualizeHistogram => map_same_size(src, |s, d| equalize_histogram(s, d)),
            Operation::Flip(axis) => map_same_size(src, |s, d| flip(s, d, *axis)),
            Operation::Rotate90 => {
                let mut dst = Image::from_size_val(rotated90_size(src.size()), 0)?;
                rotate90_clockwise(src, &mut dst)?;
                Ok(dst)
            }
            Operation::Translate { tx, ty } => map_f32(src, |s| {
                let mut out = Image::from_size_val(s.size(), 0.0)?;
                translate(s, &mut out, *tx, *ty)?;
                Ok(out)
            }),
            Operation::Scale(factor) => map_f32(src, |s| scale(s, *factor)),
            Operation::Shear(k) => map_f32(src, |s| shear(s, *k)),
            Operation::MeanFilter(k) => map_same_size(src, |s, d| mean_filter(s, d, *k)),
            Operation::MedianFilter(k) => map_same_size(src, |s, d| median_filter(s, d, *k)),
            Operation::GaussianFilter(k) => map_same_size(src, |s, d| gaussian_filter(s, d, *k)),
            Operation::ConservativeFilter(k) => {
                map_same_size(src, |s, d| conservative_filter(s, d, *k))
            }
            Operation::CrimminsSpeckle => map_same_size(src, |s, d| crimmins_speckle(s, d)),
            Operation::Edges(operator) => map_same_size(src, |s, d| detect_edges(s, d, *operator)),
            Operation::Canny { low, high } => map_same_size(src, |s, d| {
                let mut gray = Image::from_size_val(s.size(), 0)?;
                gray_from_rgb_u8(s, &mut gray)?;
                let mut edges = Image::from_size_val(s.size(), 0)?;
                canny(&gray, &mut edges, *low, *high)?;
                rgb_from_gray(&edges, d)
            }),
            Operation::Erode => map_same_size(src, |s, d| erode(s, d)),
            Operation::Dilate => map_same_size(src, |s, d| dilate(s, d)),
            Operation::Frequency(filter) => {
                map_same_size(src, |s, d| apply_frequency_filter(s, d, filter))
            }
            Operation::KMeans(config) => map_same_size(src, |s, d| kmeans_segment(s, d, config)),
            Operation::HoughLines => map_same_size(src, |s, d| {
                let lines = hough_line_detection(s, d)?;
                log::debug!("hough: drew {} lines", lines.len());
                Ok(())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_image::ImageSize;

    fn gradient() -> Result<Image<u8, 3>, ImageError> {
        let size = ImageSize {
            width: 6,
            height: 4,
        };
        let data = (0..6 * 4 * 3).map(|i| (i * 3) as u8).collect();
        Image::new(size, data)
    }

    #[test]
    fn test_reads_original() {
        assert!(Operation::Brightness(10).reads_original());
        assert!(Operation::Threshold(127).reads_original());
        assert!(!Operation::Negative.reads_original());
        assert!(!Operation::Scale(2.0).reads_original());
    }

    #[test]
    fn test_geometry_changes_size() -> Result<(), ImageError> {
        let image = gradient()?;
        assert_eq!(
            Operation::Rotate90.apply(&image)?.size(),
            ImageSize {
                width: 4,
                height: 6
            }
        );
        assert_eq!(
            Operation::Scale(0.5).apply(&image)?.size(),
            ImageSize {
                width: 3,
                height: 2
            }
        );
        assert_eq!(
            Operation::Shear(1.0).apply(&image)?.size(),
            ImageSize {
                width: 10,
                height: 4
            }
        );
        assert_eq!(Operation::Scale(1.0).apply(&image)?, image);
        Ok(())
    }

    #[test]
    fn test_negative_round_trip() -> Result<(), ImageError> {
        let image = gradient()?;
        let twice = Operation::Negative.apply(&Operation::Negative.apply(&image)?)?;
        assert_eq!(twice, image);
        Ok(())
    }

    #[test]
    fn test_invalid_parameters_are_errors() -> Result<(), ImageError> {
        let image = gradient()?;
        assert!(Operation::MeanFilter(4).apply(&image).is_err());
        assert!(Operation::Brightness(150).apply(&image).is_err());
        assert!(Operation::Scale(6.0).apply(&image).is_err());
        assert!(Operation::Shear(-2.5).apply(&image).is_err());
        Ok(())
    }

    #[test]
    fn test_canny_output_is_binary_gray() -> Result<(), ImageError> {
        let image = gradient()?;
        let out = Operation::Canny {
            low: 100.0,
            high: 200.0,
        }
        .apply(&image)?;
        for p in out.as_slice().chunks_exact(3) {
            assert!(p[0] == p[1] && p[1] == p[2]);
            assert!(p[0] == 0 || p[0] == 255);
        }
        Ok(())
    }
}

use std::path::Path;

use rasterkit_imgproc::{
    edges::CANNY_THRESHOLDS,
    frequency::{FrequencyFilter, HomomorphicParams},
    segmentation::KMeansConfig,
    selection::{CROP_DIALOG_BOUND, DISPLAY_BOUND, HANDLE_HIT_RADIUS},
};
use serde::{Deserialize, Serialize};

/// An error type for the config module.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Error to read the file.
    #[error("Failed to read the config file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to parse the JSON content.
    #[error("Failed to parse the config file. {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Defaults used when an operation is requested without explicit parameters.
///
/// Every field is optional in the JSON representation and falls back to its default.
///
/// # Example
///
/// ```
/// use rasterkit::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "kernel_size": 5 }"#).unwrap();
/// assert_eq!(config.kernel_size, 5);
/// assert_eq!(config.kmeans.k, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Kernel size of the smoothing filters.
    pub kernel_size: usize,
    /// Low and high thresholds of the canny operation.
    pub canny_thresholds: (f32, f32),
    /// Radius of the ideal low and high pass filters.
    pub ideal_radius: f64,
    /// Inner and outer radius of the band pass and band stop filters.
    pub band_radii: (f64, f64),
    /// Sigma of the gaussian low and high pass filters.
    pub gaussian_sigma: f64,
    /// Cutoff of the butterworth filter.
    pub butterworth_cutoff: f64,
    /// Order of the butterworth filter.
    pub butterworth_order: u32,
    /// Parameters of the homomorphic filter.
    pub homomorphic: HomomorphicParams,
    /// Parameters of the k-means segmentation.
    pub kmeans: KMeansConfig,
    /// Side of the square bounding the main preview.
    pub display_bound: usize,
    /// Side of the square bounding the crop preview.
    pub crop_dialog_bound: usize,
    /// Pointer distance within which a crop corner is grabbed.
    pub crop_hit_radius: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            canny_thresholds: CANNY_THRESHOLDS,
            ideal_radius: 30.0,
            band_radii: (20.0, 50.0),
            gaussian_sigma: 30.0,
            butterworth_cutoff: 30.0,
            butterworth_order: 2,
            homomorphic: HomomorphicParams::default(),
            kmeans: KMeansConfig::default(),
            display_bound: DISPLAY_BOUND,
            crop_dialog_bound: CROP_DIALOG_BOUND,
            crop_hit_radius: HANDLE_HIT_RADIUS,
        }
    }
}

impl SessionConfig {
    /// Names accepted by [`SessionConfig::frequency_filter`].
    pub const FREQUENCY_FILTERS: [&'static str; 8] = [
        "ideal-low-pass",
        "ideal-high-pass",
        "band-pass",
        "band-stop",
        "gaussian-low-pass",
        "gaussian-high-pass",
        "butterworth",
        "homomorphic",
    ];

    /// Load a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Build a frequency filter from its name with the configured parameters.
    ///
    /// Returns `None` for an unknown name.
    pub fn frequency_filter(&self, name: &str) -> Option<FrequencyFilter> {
        let (inner, outer) = self.band_radii;
        let filter = match name {
            "ideal-low-pass" => FrequencyFilter::IdealLowPass {
                radius: self.ideal_radius,
            },
            "ideal-high-pass" => FrequencyFilter::IdealHighPass {
                radius: self.ideal_radius,
            },
            "band-pass" => FrequencyFilter::BandPass { inner, outer },
            "band-stop" => FrequencyFilter::BandStop { inner, outer },
            "gaussian-low-pass" => FrequencyFilter::GaussianLowPass {
                sigma: self.gaussian_sigma,
            },
            "gaussian-high-pass" => FrequencyFilter::GaussianHighPass {
                sigma: self.gaussian_sigma,
            },
            "butterworth" => FrequencyFilter::Butterworth {
                cutoff: self.butterworth_cutoff,
                order: self.butterworth_order,
            },
            "homomorphic" => FrequencyFilter::Homomorphic(self.homomorphic),
            _ => return None,
        };
        Some(filter)
    }
}

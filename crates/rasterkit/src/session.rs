use std::path::Path;

use rasterkit_image::{ops::saturate_cast_u8, Image, ImageError, ImageSize};
use rasterkit_imgproc::{
    color::{rgb_from_gray, split_channels_rgb_u8},
    histogram::channel_histograms,
    selection::{fit_display_size, CropRegion, PerspectiveQuad, SelectionError},
};
use rasterkit_io::{
    functional::{read_image_any_mono8, read_image_any_rgb8, write_image_rgb8},
    IoError,
};

use crate::{config::SessionConfig, operation::Operation};

/// An error type for the session module.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// Error when an operation is requested before an image is loaded.
    #[error("No image is loaded")]
    NoImage,

    /// Error from an engine operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from a crop or perspective selection.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Error from reading or writing a file.
    #[error(transparent)]
    Io(#[from] IoError),
}

#[derive(Debug, Clone)]
struct Buffers {
    original: Image<u8, 3>,
    processed: Image<u8, 3>,
}

/// The original and processed buffers of an editing session.
///
/// Operations are computed into a new buffer which replaces the processed one only on
/// success; a failed operation leaves both buffers untouched.
///
/// # Example
///
/// ```
/// use rasterkit::{Operation, Session};
/// use rasterkit::image::{Image, ImageSize};
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 2, height: 2 }, 100).unwrap();
/// let mut session = Session::new(image);
///
/// session.apply(&Operation::Negative).unwrap();
/// assert!(session.processed().unwrap().as_slice().iter().all(|&v| v == 155));
///
/// // brightness always starts from the original
/// session.apply(&Operation::Brightness(10)).unwrap();
/// assert!(session.processed().unwrap().as_slice().iter().all(|&v| v == 110));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Session {
    buffers: Option<Buffers>,
    config: SessionConfig,
}

impl Session {
    /// Start a session on an image.
    pub fn new(image: Image<u8, 3>) -> Self {
        let mut session = Self::default();
        session.load(image);
        session
    }

    /// Start an empty session with the given defaults.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            buffers: None,
            config,
        }
    }

    /// Start a session on an image file.
    ///
    /// With `grayscale` the file is decoded to a single intensity channel replicated on the
    /// three channels.
    pub fn open(path: impl AsRef<Path>, grayscale: bool) -> Result<Self, SessionError> {
        let mut session = Self::default();
        session.load_file(path, grayscale)?;
        Ok(session)
    }

    /// The session defaults.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the session defaults.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// Install an image as both the original and the processed buffer.
    pub fn load(&mut self, image: Image<u8, 3>) {
        self.buffers = Some(Buffers {
            processed: image.clone(),
            original: image,
        });
    }

    /// Decode an image file and install it.
    ///
    /// Nothing is installed if decoding fails.
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        grayscale: bool,
    ) -> Result<(), SessionError> {
        let path = path.as_ref();
        let image = if grayscale {
            let gray = read_image_any_mono8(path)?;
            let mut rgb = Image::from_size_val(gray.size(), 0)?;
            rgb_from_gray(&gray, &mut rgb)?;
            rgb
        } else {
            read_image_any_rgb8(path)?
        };

        log::debug!(
            "loaded {} ({}x{})",
            path.display(),
            image.cols(),
            image.rows()
        );
        self.load(image);
        Ok(())
    }

    /// Whether an image is loaded.
    pub fn is_loaded(&self) -> bool {
        self.buffers.is_some()
    }

    fn buffers(&self) -> Result<&Buffers, SessionError> {
        self.buffers.as_ref().ok_or(SessionError::NoImage)
    }

    /// The image as loaded.
    pub fn original(&self) -> Result<&Image<u8, 3>, SessionError> {
        Ok(&self.buffers()?.original)
    }

    /// The result of the operations applied so far.
    pub fn processed(&self) -> Result<&Image<u8, 3>, SessionError> {
        Ok(&self.buffers()?.processed)
    }

    fn replace_processed(&mut self, image: Image<u8, 3>) -> Result<(), SessionError> {
        let buffers = self.buffers.as_mut().ok_or(SessionError::NoImage)?;
        buffers.processed = image;
        Ok(())
    }

    /// Discard every edit and return to the original.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let original = self.original()?.clone();
        self.replace_processed(original)
    }

    /// Apply an operation and replace the processed buffer with its result.
    ///
    /// See [`Operation::reads_original`] for the buffer each operation starts from.
    pub fn apply(&mut self, op: &Operation) -> Result<(), SessionError> {
        let buffers = self.buffers()?;
        let base = if op.reads_original() {
            &buffers.original
        } else {
            &buffers.processed
        };

        let result = op.apply(base).map_err(|err| {
            log::warn!("{} failed: {err}", op.name());
            err
        })?;

        log::debug!(
            "{}: {}x{} -> {}x{}",
            op.name(),
            base.cols(),
            base.rows(),
            result.cols(),
            result.rows()
        );
        self.replace_processed(result)
    }

    /// Per channel histograms of the processed buffer.
    pub fn histogram(&self) -> Result<[[usize; 256]; 3], SessionError> {
        Ok(channel_histograms(self.processed()?))
    }

    /// The red, green and blue channels of the processed buffer, each shown as gray.
    pub fn split_channels(&self) -> Result<[Image<u8, 3>; 3], SessionError> {
        Ok(split_channels_rgb_u8(self.processed()?)?)
    }

    /// The size of the main preview of the processed buffer.
    pub fn display_size(&self) -> Result<ImageSize, SessionError> {
        Ok(fit_display_size(
            self.processed()?.size(),
            self.config.display_bound,
        ))
    }

    /// Start a crop interaction on the crop preview of the processed buffer.
    pub fn crop_region(&self) -> Result<CropRegion, SessionError> {
        let display = fit_display_size(self.processed()?.size(), self.config.crop_dialog_bound);
        Ok(CropRegion::centered(display).with_hit_radius(self.config.crop_hit_radius))
    }

    /// Crop the processed buffer with a region from [`Session::crop_region`].
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::EmptyRegion`] and keeps the processed buffer if the region
    /// has no area on the image.
    pub fn commit_crop(&mut self, region: &CropRegion) -> Result<(), SessionError> {
        let cropped = region.crop(self.processed()?)?;
        self.replace_processed(cropped)
    }

    /// Start collecting perspective points, clicked on the processed buffer at full size.
    pub fn perspective_quad(&self) -> Result<PerspectiveQuad, SessionError> {
        let size = self.processed()?.size();
        Ok(PerspectiveQuad::new(size, size))
    }

    /// Rectify the quadrilateral collected in `quad` and replace the processed buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::DegenerateGeometry`] and keeps the processed buffer if the
    /// points cannot be rectified; the points of `quad` are dropped.
    pub fn rectify(&mut self, quad: &mut PerspectiveQuad) -> Result<(), SessionError> {
        let src = self.processed()?.cast::<f32>()?;
        let rectified = quad.rectify(&src)?;
        let mut dst = Image::from_size_val(rectified.size(), 0)?;
        saturate_cast_u8(&rectified, &mut dst)?;
        self.replace_processed(dst)
    }

    /// Write the processed buffer to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        write_image_rgb8(path, self.processed()?)?;
        Ok(())
    }
}

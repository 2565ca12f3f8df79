use std::path::Path;

use image::{DynamicImage, ImageFormat};
use rasterkit_image::{Image, ImageSize};
use rasterkit_imgproc::color::luminance_u8;

use crate::error::IoError;

/// File extensions accepted by [`write_image_rgb8`].
pub const WRITE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

fn decode_any(file_path: &Path) -> Result<DynamicImage, IoError> {
    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    log::debug!(
        "decoded {} ({}x{}, {:?})",
        file_path.display(),
        img.width(),
        img.height(),
        img.color()
    );

    Ok(img)
}

fn image_size(img: &DynamicImage) -> ImageSize {
    ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    }
}

/// Blend every pixel over an opaque white background.
fn composite_on_white(img: DynamicImage) -> Vec<u8> {
    if !img.color().has_alpha() {
        return img.into_rgb8().into_raw();
    }

    img.into_rgba8()
        .pixels()
        .flat_map(|p| {
            let a = p[3] as u32;
            let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
            [blend(p[0]), blend(p[1]), blend(p[2])]
        })
        .collect()
}

/// Reads an image from the given file path as 8-bit RGB.
///
/// The format is guessed from the file content. Grayscale images are replicated to three
/// channels and images with an alpha channel are composited onto a white background.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Errors
///
/// Returns [`IoError::FileDoesNotExist`] for a missing file and
/// [`IoError::UnsupportedFormat`] when the content cannot be decoded.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let img = decode_any(file_path.as_ref())?;
    let size = image_size(&img);
    Ok(Image::new(size, composite_on_white(img))?)
}

/// Reads an image from the given file path as 8-bit grayscale.
///
/// Color images are composited onto white and converted with the same luminance weights
/// as the rest of the engine.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
pub fn read_image_any_mono8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let img = decode_any(file_path.as_ref())?;
    let size = image_size(&img);

    let data = match img {
        DynamicImage::ImageLuma8(gray) => gray.into_raw(),
        img => composite_on_white(img)
            .chunks_exact(3)
            .map(|p| luminance_u8(p[0], p[1], p[2]))
            .collect(),
    };

    Ok(Image::new(size, data)?)
}

/// Writes an 8-bit RGB image to the given file path.
///
/// The encoder is chosen from the file extension, one of [`WRITE_EXTENSIONS`].
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `image` - The image to write.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let format = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| WRITE_EXTENSIONS.contains(&ext.as_str()))
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| IoError::InvalidFileExtension(file_path.to_path_buf()))?;

    image::save_buffer_with_format(
        file_path,
        image.as_slice(),
        image.cols() as u32,
        image.rows() as u32,
        image::ExtendedColorType::Rgb8,
        format,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Result<Image<u8, 3>, IoError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let data = (0..4 * 3 * 3).map(|i| (i * 7) as u8).collect();
        Ok(Image::new(size, data)?)
    }

    #[test]
    fn test_png_round_trip() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("sample.png");

        let image = sample()?;
        write_image_rgb8(&file_path, &image)?;
        let read = read_image_any_rgb8(&file_path)?;

        assert_eq!(read.size(), image.size());
        assert_eq!(read.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn test_jpeg_and_bmp_keep_size() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let image = sample()?;
        for name in ["sample.jpg", "sample.JPEG", "sample.bmp"] {
            let file_path = tmp_dir.path().join(name);
            write_image_rgb8(&file_path, &image)?;
            assert_eq!(read_image_any_rgb8(&file_path)?.size(), image.size());
        }
        Ok(())
    }

    #[test]
    fn test_write_rejects_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let image = sample()?;
        for name in ["sample.gif", "sample"] {
            let res = write_image_rgb8(tmp_dir.path().join(name), &image);
            assert!(matches!(res, Err(IoError::InvalidFileExtension(_))));
        }
        Ok(())
    }

    #[test]
    fn test_read_errors() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;

        let missing = read_image_any_rgb8(tmp_dir.path().join("missing.png"));
        assert!(matches!(missing, Err(IoError::FileDoesNotExist(_))));

        let corrupt_path = tmp_dir.path().join("corrupt.png");
        std::fs::write(&corrupt_path, b"not an image")?;
        let corrupt = read_image_any_rgb8(&corrupt_path);
        assert!(matches!(corrupt, Err(IoError::UnsupportedFormat(_))));
        Ok(())
    }

    #[test]
    fn test_alpha_is_composited_on_white() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("alpha.png");

        let rgba = image::RgbaImage::from_raw(
            3,
            1,
            vec![0, 0, 0, 0, 255, 0, 0, 255, 0, 0, 0, 128],
        )
        .ok_or_else(|| std::io::Error::other("bad buffer"))?;
        rgba.save(&file_path)?;

        let read = read_image_any_rgb8(&file_path)?;
        assert_eq!(read.as_slice(), &[255, 255, 255, 255, 0, 0, 127, 127, 127]);
        Ok(())
    }

    #[test]
    fn test_read_mono8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("color.png");

        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![255, 0, 0, 10, 20, 30],
        )?;
        write_image_rgb8(&file_path, &image)?;

        let gray = read_image_any_mono8(&file_path)?;
        assert_eq!(
            gray.as_slice(),
            &[luminance_u8(255, 0, 0), luminance_u8(10, 20, 30)]
        );
        Ok(())
    }
}

use crate::{Image, ImageError};

/// Convert a floating point image into 8-bit samples by rounding and saturating.
///
/// # Arguments
///
/// * `src` - The source image with values expected in [0, 255].
/// * `dst` - The destination 8-bit image.
pub fn saturate_cast_u8<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(out, &inp)| *out = inp.round().clamp(0.0, 255.0) as u8);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageSize;

    #[test]
    fn test_saturate_cast_u8() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                height: 1,
                width: 4,
            },
            vec![-3.0, 12.4, 12.6, 300.0],
        )?;
        let mut out = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        saturate_cast_u8(&image, &mut out)?;
        assert_eq!(out.as_slice(), &[0, 12, 13, 255]);
        Ok(())
    }
}

use rasterkit_image::{Image, ImageError, ImageSize};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::{ParallelSlice, ParallelSliceMut},
};

/// The axis to mirror an image about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    /// Mirror left to right.
    Horizontal,
    /// Mirror top to bottom.
    Vertical,
    /// Mirror about both axes, a 180 degree rotation.
    Both,
}

/// Flip the input image horizontally.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
/// * `dst` - The output image with shape (H, W, C).
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::flip::horizontal_flip;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 2, height: 1 }, vec![1, 2]).unwrap();
/// let mut flipped = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// horizontal_flip(&image, &mut flipped).unwrap();
/// assert_eq!(flipped.as_slice(), &[2, 1]);
/// ```
pub fn horizontal_flip<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let cols = src.cols();
    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .zip(src.as_slice().par_chunks_exact(cols * C))
        .for_each(|(dst_row, src_row)| {
            for (dst_pixel, src_pixel) in dst_row
                .chunks_exact_mut(C)
                .zip(src_row.chunks_exact(C).rev())
            {
                dst_pixel.copy_from_slice(src_pixel);
            }
        });

    Ok(())
}

/// Flip the input image vertically.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
/// * `dst` - The output image with shape (H, W, C).
pub fn vertical_flip<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let row_len = src.cols() * C;
    let rows = src.rows();
    dst.as_slice_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(r, dst_row)| {
            let offset = (rows - 1 - r) * row_len;
            dst_row.copy_from_slice(&src.as_slice()[offset..offset + row_len]);
        });

    Ok(())
}

/// Flip the input image about the given axis.
pub fn flip<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    axis: FlipAxis,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    match axis {
        FlipAxis::Horizontal => horizontal_flip(src, dst),
        FlipAxis::Vertical => vertical_flip(src, dst),
        FlipAxis::Both => {
            let mut tmp = src.clone();
            vertical_flip(src, &mut tmp)?;
            horizontal_flip(&tmp, dst)
        }
    }
}

/// Size of an image rotated by 90 degrees.
pub fn rotated90_size(size: ImageSize) -> ImageSize {
    ImageSize {
        width: size.height,
        height: size.width,
    }
}

/// Rotate the input image 90 degrees clockwise.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
/// * `dst` - The output image with shape (W, H, C), see [`rotated90_size`].
pub fn rotate90_clockwise<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if dst.size() != rotated90_size(src.size()) {
        return Err(ImageError::InvalidImageSize(
            src.rows(),
            src.cols(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (src_rows, src_cols) = (src.rows(), src.cols());
    let dst_cols = dst.cols();
    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(r, dst_row)| {
            // dst(r, c) = src(src_rows - 1 - c, r)
            for (c, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
                let offset = ((src_rows - 1 - c) * src_cols + r) * C;
                dst_pixel.copy_from_slice(&src.as_slice()[offset..offset + C]);
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::FlipAxis;
    use rasterkit_image::{Image, ImageError, ImageSize};

    fn sample() -> Result<Image<u8, 1>, ImageError> {
        Image::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            vec![0u8, 1, 2, 3, 4, 5],
        )
    }

    #[test]
    fn test_hflip() -> Result<(), ImageError> {
        let image = sample()?;
        let mut flipped = Image::from_size_val(image.size(), 0)?;
        super::horizontal_flip(&image, &mut flipped)?;
        assert_eq!(flipped.as_slice(), &[1u8, 0, 3, 2, 5, 4]);
        Ok(())
    }

    #[test]
    fn test_vflip() -> Result<(), ImageError> {
        let image = sample()?;
        let mut flipped = Image::from_size_val(image.size(), 0)?;
        super::vertical_flip(&image, &mut flipped)?;
        assert_eq!(flipped.as_slice(), &[4u8, 5, 2, 3, 0, 1]);
        Ok(())
    }

    #[test]
    fn test_flip_twice_is_identity() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            (0..18).collect(),
        )?;
        for axis in [FlipAxis::Horizontal, FlipAxis::Vertical, FlipAxis::Both] {
            let mut once = Image::from_size_val(image.size(), 0)?;
            let mut twice = Image::from_size_val(image.size(), 0)?;
            super::flip(&image, &mut once, axis)?;
            super::flip(&once, &mut twice, axis)?;
            assert_eq!(twice, image);
        }
        Ok(())
    }

    #[test]
    fn test_rotate90() -> Result<(), ImageError> {
        let image = sample()?;
        let mut rotated = Image::from_size_val(super::rotated90_size(image.size()), 0)?;
        super::rotate90_clockwise(&image, &mut rotated)?;
        assert_eq!(rotated.width(), 3);
        assert_eq!(rotated.height(), 2);
        #[rustfmt::skip]
        assert_eq!(rotated.as_slice(), &[
            4u8, 2, 0,
            5, 3, 1,
        ]);

        let mut current = image.clone();
        for _ in 0..4 {
            let mut next = Image::from_size_val(super::rotated90_size(current.size()), 0)?;
            super::rotate90_clockwise(&current, &mut next)?;
            current = next;
        }
        assert_eq!(current, image);
        Ok(())
    }
}

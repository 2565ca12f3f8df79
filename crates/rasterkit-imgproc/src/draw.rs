use rasterkit_image::Image;

/// Helper function to set a pixel's color, ignoring points outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// The endpoints may lie outside the image; only the visible part of the line is drawn.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line, drawn as a square brush around each point.
///
/// # Example
///
/// ```
/// use rasterkit_image::{Image, ImageSize};
/// use rasterkit_imgproc::draw::draw_line;
///
/// let mut img = Image::<u8, 1>::from_size_val(ImageSize { width: 3, height: 3 }, 0).unwrap();
/// draw_line(&mut img, (0, 0), (2, 2), [255], 1);
///
/// assert_eq!(img.as_slice(), &[255, 0, 0, 0, 255, 0, 0, 0, 255]);
/// ```
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    // brush extent, `thickness` pixels wide
    let thickness = thickness.max(1) as i64;
    let lo = -(thickness / 2);
    let hi = (thickness - 1) / 2;

    loop {
        for i in lo..=hi {
            for j in lo..=hi {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::draw_line;
    use rasterkit_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_draw_line() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 5,
                height: 5,
            },
            0,
        )?;
        draw_line(&mut img, (0, 0), (4, 4), [255], 1);
        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            vec![
                255,   0,   0,   0,   0,
                  0, 255,   0,   0,   0,
                  0,   0, 255,   0,   0,
                  0,   0,   0, 255,   0,
                  0,   0,   0,   0, 255,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_draw_thick_clipped_line() -> Result<(), ImageError> {
        let mut img = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0,
        )?;
        // a horizontal line through row 2 that starts and ends far outside the image
        draw_line(&mut img, (-1000, 2), (1000, 2), [0, 255, 0], 2);
        for (i, px) in img.as_slice().chunks_exact(3).enumerate() {
            let row = i / 4;
            let expected = if row == 1 || row == 2 { [0, 255, 0] } else { [0, 0, 0] };
            assert_eq!(px, expected);
        }
        Ok(())
    }
}

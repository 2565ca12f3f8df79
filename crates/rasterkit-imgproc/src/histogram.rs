use rasterkit_image::{Image, ImageError};
use rayon::prelude::*;

/// Compute a 256-bin histogram for every channel of an 8-bit image.
///
/// # Returns
///
/// One histogram per channel, in channel order.
pub fn channel_histograms<const C: usize>(src: &Image<u8, C>) -> [[usize; 256]; C] {
    let mut hists = [[0usize; 256]; C];
    for pixel in src.as_slice().chunks_exact(C) {
        for (ch, &v) in pixel.iter().enumerate() {
            hists[ch][v as usize] += 1;
        }
    }
    hists
}

/// Build the equalization lookup table of a 256-bin histogram.
///
/// The first non-empty bin maps to 0 and the cumulative counts above it are stretched
/// to [0, 255]. A histogram with a single populated bin yields the identity table.
fn equalization_lut(hist: &[usize; 256]) -> [u8; 256] {
    let total: usize = hist.iter().sum();
    let mut lut = [0u8; 256];

    let Some(first) = hist.iter().position(|&h| h != 0) else {
        return lut;
    };

    if hist[first] == total {
        for (i, v) in lut.iter_mut().enumerate() {
            *v = i as u8;
        }
        return lut;
    }

    let scale = 255.0 / (total - hist[first]) as f64;
    let mut sum = 0usize;
    for i in first + 1..256 {
        sum += hist[i];
        lut[i] = (sum as f64 * scale).round().clamp(0.0, 255.0) as u8;
    }

    lut
}

/// Equalize the histogram of each channel independently.
///
/// Each channel is remapped through the equalization curve derived from its own
/// cumulative distribution, so the channels are not coupled through a luminance.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image with the same size as `src`.
pub fn equalize_histogram<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let hists = channel_histograms(src);
    let luts: Vec<[u8; 256]> = hists.iter().map(equalization_lut).collect();

    dst.as_slice_mut()
        .par_chunks_exact_mut(C)
        .zip(src.as_slice().par_chunks_exact(C))
        .for_each(|(dst_pixel, src_pixel)| {
            for ch in 0..C {
                dst_pixel[ch] = luts[ch][src_pixel[ch] as usize];
            }
        });

    Ok(())
}

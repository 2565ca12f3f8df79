use rand::prelude::*;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use rasterkit_image::{Image, ImageError};

/// Parameters of the k-means color segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Number of clusters.
    pub k: usize,
    /// Maximum number of refinement iterations per attempt.
    pub max_iter: usize,
    /// Stop an attempt once no centre moves by more than this distance.
    pub epsilon: f32,
    /// Number of independent attempts; the most compact labelling wins.
    pub attempts: usize,
    /// Seed for the centre initialization. `None` draws a fresh seed.
    pub seed: Option<u64>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 4,
            max_iter: 10,
            epsilon: 1.0,
            attempts: 10,
            seed: None,
        }
    }
}

type Sample = [f32; 3];

#[inline]
fn distance_sq(a: &Sample, b: &Sample) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the nearest centre and the squared distance to it.
fn nearest(centres: &[Sample], sample: &Sample) -> (usize, f32) {
    let mut best = (0, f32::INFINITY);
    for (i, c) in centres.iter().enumerate() {
        let d = distance_sq(c, sample);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn assign(centres: &[Sample], samples: &[Sample]) -> Vec<(usize, f32)> {
    samples.par_iter().map(|s| nearest(centres, s)).collect()
}

fn bounding_box(samples: &[Sample]) -> (Sample, Sample) {
    let mut lo = [f32::MAX; 3];
    let mut hi = [f32::MIN; 3];
    for s in samples {
        for ch in 0..3 {
            lo[ch] = lo[ch].min(s[ch]);
            hi[ch] = hi[ch].max(s[ch]);
        }
    }
    (lo, hi)
}

struct Clustering {
    centres: Vec<Sample>,
    labels: Vec<usize>,
    compactness: f32,
}

fn run_attempt(samples: &[Sample], config: &KMeansConfig, rng: &mut StdRng) -> Clustering {
    let (lo, hi) = bounding_box(samples);
    let mut centres: Vec<Sample> = (0..config.k)
        .map(|_| std::array::from_fn(|ch| rng.random_range(lo[ch]..=hi[ch])))
        .collect();

    let mut iterations = 0;
    while iterations < config.max_iter {
        iterations += 1;
        let assignment = assign(&centres, samples);

        let mut sums = vec![[0.0f64; 3]; config.k];
        let mut counts = vec![0usize; config.k];
        for (s, &(label, _)) in samples.iter().zip(&assignment) {
            counts[label] += 1;
            for ch in 0..3 {
                sums[label][ch] += s[ch] as f64;
            }
        }

        let mut updated: Vec<Sample> = sums
            .iter()
            .zip(&counts)
            .zip(&centres)
            .map(|((sum, &count), old)| {
                if count == 0 {
                    *old
                } else {
                    std::array::from_fn(|ch| (sum[ch] / count as f64) as f32)
                }
            })
            .collect();

        // an empty cluster takes over the sample worst served by its centre
        let mut taken = vec![false; samples.len()];
        for label in (0..config.k).filter(|&l| counts[l] == 0) {
            let farthest = assignment
                .iter()
                .enumerate()
                .filter(|(i, _)| !taken[*i])
                .max_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
                .map(|(i, _)| i);
            if let Some(i) = farthest {
                taken[i] = true;
                updated[label] = samples[i];
            }
        }

        let shift = centres
            .iter()
            .zip(&updated)
            .map(|(a, b)| distance_sq(a, b))
            .fold(0.0f32, f32::max)
            .sqrt();
        centres = updated;

        if shift <= config.epsilon {
            break;
        }
    }

    let assignment = assign(&centres, samples);
    let compactness = assignment.iter().map(|&(_, d)| d).sum();
    log::debug!("k-means attempt: {iterations} iterations, compactness {compactness}");

    Clustering {
        centres,
        labels: assignment.into_iter().map(|(label, _)| label).collect(),
        compactness,
    }
}

/// Segment a color image by k-means clustering of its pixel colors.
///
/// Every pixel is replaced by the color of the centre of its cluster. Centres are
/// initialized uniformly at random inside the bounding box of the pixel colors, so two
/// runs only agree when `config.seed` is set. Each attempt stops after
/// `config.max_iter` iterations or once no centre moves by more than `config.epsilon`,
/// whichever comes first.
///
/// # Arguments
///
/// * `src` - The source RGB image.
/// * `dst` - The destination image with the same size as `src`.
/// * `config` - The clustering parameters.
///
/// # Errors
///
/// Returns an error if `k` is zero or exceeds the number of pixels, if `attempts` is
/// zero or if `epsilon` is negative.
pub fn kmeans_segment(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    config: &KMeansConfig,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let num_pixels = src.cols() * src.rows();
    if config.k == 0 || config.k > num_pixels {
        return Err(ImageError::InvalidParameter(
            "k",
            format!("{} clusters for {num_pixels} pixels", config.k),
        ));
    }
    if config.attempts == 0 {
        return Err(ImageError::InvalidParameter(
            "attempts",
            config.attempts.to_string(),
        ));
    }
    if config.epsilon.is_nan() || config.epsilon < 0.0 {
        return Err(ImageError::InvalidParameter(
            "epsilon",
            config.epsilon.to_string(),
        ));
    }

    let samples: Vec<Sample> = src
        .as_slice()
        .chunks_exact(3)
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect();

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            let mut tr = rand::rng();
            StdRng::from_rng(&mut tr)
        }
    };

    let mut best = run_attempt(&samples, config, &mut rng);
    for _ in 1..config.attempts {
        let candidate = run_attempt(&samples, config, &mut rng);
        if candidate.compactness < best.compactness {
            best = candidate;
        }
    }

    let palette: Vec<[u8; 3]> = best
        .centres
        .iter()
        .map(|c| c.map(|v| v.round().clamp(0.0, 255.0) as u8))
        .collect();

    dst.as_slice_mut()
        .par_chunks_exact_mut(3)
        .zip(best.labels.par_iter())
        .for_each(|(pixel, &label)| pixel.copy_from_slice(&palette[label]));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_image::ImageSize;
    use std::collections::HashSet;

    fn two_tone(width: usize, height: usize) -> Result<Image<u8, 3>, ImageError> {
        let data = (0..width * height)
            .flat_map(|i| {
                if i % width < width / 2 {
                    [200, 30, 30]
                } else {
                    [20, 40, 220]
                }
            })
            .collect();
        Image::new(ImageSize { width, height }, data)
    }

    #[test]
    fn test_two_tones_are_recovered() -> Result<(), ImageError> {
        let image = two_tone(8, 4)?;
        let mut out = Image::from_size_val(image.size(), 0)?;
        let config = KMeansConfig {
            k: 2,
            seed: Some(7),
            ..Default::default()
        };
        kmeans_segment(&image, &mut out, &config)?;
        assert_eq!(out.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn test_palette_has_at_most_k_colors() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 16,
            height: 16,
        };
        let data = (0..size.width * size.height * 3)
            .map(|i| ((i * 37) % 256) as u8)
            .collect();
        let image = Image::<u8, 3>::new(size, data)?;

        let config = KMeansConfig {
            seed: Some(42),
            ..Default::default()
        };
        let mut first = Image::from_size_val(size, 0)?;
        kmeans_segment(&image, &mut first, &config)?;

        let colors: HashSet<&[u8]> = first.as_slice().chunks_exact(3).collect();
        assert!(!colors.is_empty() && colors.len() <= config.k);

        // a fixed seed reproduces the labelling
        let mut second = Image::from_size_val(size, 0)?;
        kmeans_segment(&image, &mut second, &config)?;
        assert_eq!(first.as_slice(), second.as_slice());
        Ok(())
    }

    #[test]
    fn test_constant_image() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 5,
                height: 3,
            },
            90,
        )?;
        let mut out = Image::from_size_val(image.size(), 0)?;
        kmeans_segment(&image, &mut out, &KMeansConfig::default())?;
        assert!(out.as_slice().iter().all(|&v| v == 90));
        Ok(())
    }

    #[test]
    fn test_single_attempt_writes_output() -> Result<(), ImageError> {
        let image = two_tone(6, 2)?;
        let mut out = Image::from_size_val(image.size(), 7)?;
        let config = KMeansConfig {
            k: 2,
            attempts: 1,
            seed: Some(3),
            ..Default::default()
        };
        kmeans_segment(&image, &mut out, &config)?;
        assert!(out.as_slice().chunks_exact(3).all(|p| p != [7, 7, 7]));
        Ok(())
    }

    #[test]
    fn test_invalid_config() -> Result<(), ImageError> {
        let image = two_tone(2, 1)?;
        let mut out = Image::from_size_val(image.size(), 0)?;
        for config in [
            KMeansConfig {
                k: 0,
                ..Default::default()
            },
            KMeansConfig {
                k: 3,
                ..Default::default()
            },
            KMeansConfig {
                k: 1,
                attempts: 0,
                ..Default::default()
            },
        ] {
            assert!(kmeans_segment(&image, &mut out, &config).is_err());
        }
        Ok(())
    }
}

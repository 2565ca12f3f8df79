use rasterkit_image::ImageError;

/// A dense 2D filter kernel stored in row-major order.
///
/// The kernel is applied as a correlation with its anchor at `(width / 2, height / 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Kernel {
    /// Create a new kernel from its weights.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel is empty or `data` does not hold `width * height` weights.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidKernelSize(width.max(height)));
        }
        if data.len() != width * height {
            return Err(ImageError::InvalidChannelShape(data.len(), width * height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a kernel from a fixed-size array of rows.
    pub fn from_rows<const W: usize, const H: usize>(rows: [[f32; W]; H]) -> Self {
        Self {
            width: W,
            height: H,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    /// The kernel weights in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The number of kernel columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of kernel rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The `(x, y)` position of the kernel element aligned with the output pixel.
    pub fn anchor(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }
}

/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// The gaussian sigma implied by a kernel size: `0.3 * ((k - 1) / 2 - 1) + 0.8`.
pub fn gaussian_sigma(kernel_size: usize) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Build a 2D kernel as the outer product of a vertical and a horizontal 1D kernel.
pub fn outer_product(kernel_y: &[f32], kernel_x: &[f32]) -> Kernel {
    let data = kernel_y
        .iter()
        .flat_map(|&ky| kernel_x.iter().map(move |&kx| ky * kx))
        .collect();
    Kernel {
        width: kernel_x.len(),
        height: kernel_y.len(),
        data,
    }
}

/// Create a normalized `k x k` box kernel.
pub fn box_kernel(kernel_size: usize) -> Kernel {
    let k = box_blur_kernel_1d(kernel_size);
    outer_product(&k, &k)
}

/// Create a normalized `k x k` gaussian kernel with the sigma implied by `k`.
pub fn gaussian_kernel(kernel_size: usize) -> Kernel {
    let k = gaussian_kernel_1d(kernel_size, gaussian_sigma(kernel_size));
    outer_product(&k, &k)
}

/// Create the 3x3 sobel kernels `(gx, gy)`.
#[rustfmt::skip]
pub fn sobel_kernels() -> (Kernel, Kernel) {
    (
        Kernel::from_rows([
            [-1.0, 0.0, 1.0],
            [-2.0, 0.0, 2.0],
            [-1.0, 0.0, 1.0],
        ]),
        Kernel::from_rows([
            [-1.0, -2.0, -1.0],
            [ 0.0,  0.0,  0.0],
            [ 1.0,  2.0,  1.0],
        ]),
    )
}

/// Create the 3x3 prewitt kernels `(gx, gy)`.
#[rustfmt::skip]
pub fn prewitt_kernels() -> (Kernel, Kernel) {
    (
        Kernel::from_rows([
            [1.0, 0.0, -1.0],
            [1.0, 0.0, -1.0],
            [1.0, 0.0, -1.0],
        ]),
        Kernel::from_rows([
            [ 1.0,  1.0,  1.0],
            [ 0.0,  0.0,  0.0],
            [-1.0, -1.0, -1.0],
        ]),
    )
}

/// Create the 2x2 roberts cross kernels.
#[rustfmt::skip]
pub fn roberts_kernels() -> (Kernel, Kernel) {
    (
        Kernel::from_rows([
            [1.0,  0.0],
            [0.0, -1.0],
        ]),
        Kernel::from_rows([
            [ 0.0, 1.0],
            [-1.0, 0.0],
        ]),
    )
}

/// Create the eight 3x3 kirsch compass kernels, from east counter-clockwise.
#[rustfmt::skip]
pub fn kirsch_kernels() -> [Kernel; 8] {
    [
        Kernel::from_rows([[-3.0, -3.0,  5.0], [-3.0, 0.0,  5.0], [-3.0, -3.0,  5.0]]),
        Kernel::from_rows([[-3.0,  5.0,  5.0], [-3.0, 0.0,  5.0], [-3.0, -3.0, -3.0]]),
        Kernel::from_rows([[ 5.0,  5.0,  5.0], [-3.0, 0.0, -3.0], [-3.0, -3.0, -3.0]]),
        Kernel::from_rows([[ 5.0,  5.0, -3.0], [ 5.0, 0.0, -3.0], [-3.0, -3.0, -3.0]]),
        Kernel::from_rows([[ 5.0, -3.0, -3.0], [ 5.0, 0.0, -3.0], [ 5.0, -3.0, -3.0]]),
        Kernel::from_rows([[-3.0, -3.0, -3.0], [ 5.0, 0.0, -3.0], [ 5.0,  5.0, -3.0]]),
        Kernel::from_rows([[-3.0, -3.0, -3.0], [-3.0, 0.0, -3.0], [ 5.0,  5.0,  5.0]]),
        Kernel::from_rows([[-3.0, -3.0, -3.0], [-3.0, 0.0,  5.0], [-3.0,  5.0,  5.0]]),
    ]
}

/// Create the 4-neighbour 3x3 laplacian kernel.
#[rustfmt::skip]
pub fn laplacian_kernel() -> Kernel {
    Kernel::from_rows([
        [0.0,  1.0, 0.0],
        [1.0, -4.0, 1.0],
        [0.0,  1.0, 0.0],
    ])
}

/// Parameters of a gabor kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaborParams {
    /// Kernel side length in pixels.
    pub size: usize,
    /// Standard deviation of the gaussian envelope.
    pub sigma: f32,
    /// Orientation of the normal to the stripes, in radians.
    pub theta: f32,
    /// Wavelength of the sinusoidal factor.
    pub lambda: f32,
    /// Spatial aspect ratio.
    pub gamma: f32,
}

impl Default for GaborParams {
    fn default() -> Self {
        Self {
            size: 21,
            sigma: 8.0,
            theta: std::f32::consts::FRAC_PI_4,
            lambda: 10.0,
            gamma: 0.5,
        }
    }
}

/// Create a real gabor kernel with phase offset `psi`.
///
/// The kernel is `exp(-(x'^2 + gamma^2 y'^2) / (2 sigma^2)) * cos(2 pi x' / lambda + psi)`
/// where `(x', y')` are the coordinates rotated by `theta`.
pub fn gabor_kernel(params: &GaborParams, psi: f32) -> Kernel {
    let half = (params.size / 2) as i32;
    let sigma_y = params.sigma / params.gamma;
    let ex = -0.5 / (params.sigma * params.sigma);
    let ey = -0.5 / (sigma_y * sigma_y);
    let scale = 2.0 * std::f32::consts::PI / params.lambda;
    let (s, c) = params.theta.sin_cos();

    let side = (2 * half + 1) as usize;
    let mut data = vec![0.0f32; side * side];
    for y in -half..=half {
        for x in -half..=half {
            let xr = x as f32 * c + y as f32 * s;
            let yr = -(x as f32) * s + y as f32 * c;
            let v = (ex * xr * xr + ey * yr * yr).exp() * (scale * xr + psi).cos();
            // stored flipped about both axes
            let row = (half - y) as usize;
            let col = (half - x) as usize;
            data[row * side + col] = v;
        }
    }

    Kernel {
        width: side,
        height: side,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 0.5);

        let expected = [
            0.00026386508,
            0.10645077,
            0.78657067,
            0.10645077,
            0.00026386508,
        ];

        for (i, &k) in kernel.iter().enumerate() {
            assert_eq!(k, expected[i]);
        }
    }

    #[test]
    fn test_gaussian_kernel_2d_is_normalized() {
        for k in [3, 5, 7] {
            let kernel = gaussian_kernel(k);
            assert_eq!(kernel.width(), k);
            assert_eq!(kernel.height(), k);
            let sum: f32 = kernel.data().iter().sum();
            approx::assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        }
        approx::assert_relative_eq!(gaussian_sigma(3), 0.8);
        approx::assert_relative_eq!(gaussian_sigma(7), 1.4, epsilon = 1e-5);
    }

    #[test]
    fn test_kernel_shapes() -> Result<(), ImageError> {
        let (rx, _) = roberts_kernels();
        assert_eq!((rx.width(), rx.height()), (2, 2));
        assert_eq!(rx.anchor(), (1, 1));

        for k in kirsch_kernels() {
            assert_eq!(k.data().iter().sum::<f32>(), 0.0);
        }
        assert_eq!(laplacian_kernel().data().iter().sum::<f32>(), 0.0);

        assert!(Kernel::new(2, 2, vec![0.0; 3]).is_err());
        assert!(Kernel::new(0, 2, vec![]).is_err());
        Ok(())
    }

    #[test]
    fn test_gabor_kernel() {
        let params = GaborParams::default();
        let even = gabor_kernel(&params, 0.0);
        assert_eq!(even.width(), 21);
        // the envelope peaks at the centre and the cosine is 1 there
        approx::assert_relative_eq!(even.data()[10 * 21 + 10], 1.0);

        let odd = gabor_kernel(&params, std::f32::consts::FRAC_PI_2);
        approx::assert_relative_eq!(odd.data()[10 * 21 + 10], 0.0, epsilon = 1e-6);
    }
}

use std::path::PathBuf;

use argh::FromArgs;
use rasterkit::{
    imgproc::{
        edges::EdgeOperator, filter::kernels::GaborParams, flip::FlipAxis,
        segmentation::KMeansConfig,
    },
    Operation, Session, SessionConfig,
};

/// Apply image processing operations to an image file
#[derive(Debug, FromArgs)]
struct Args {
    /// input image path
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// output image path, png, jpg or bmp
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// operation to apply, repeat to chain several
    #[argh(option, short = 'p')]
    op: Vec<String>,

    /// JSON file with the session defaults
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// decode the input as grayscale
    #[argh(switch, short = 'g')]
    grayscale: bool,

    /// delta in [-100, 100] for brightness and contrast
    #[argh(option, default = "0")]
    delta: i32,

    /// threshold in [0, 255]
    #[argh(option, default = "127")]
    threshold: u8,

    /// factor of the scale and shear operations
    #[argh(option, default = "1.0")]
    factor: f32,

    /// horizontal offset of the translate operation
    #[argh(option, default = "0.0")]
    tx: f32,

    /// vertical offset of the translate operation
    #[argh(option, default = "0.0")]
    ty: f32,

    /// kernel size of the smoothing filters, overrides the config
    #[argh(option, short = 'k')]
    kernel_size: Option<usize>,

    /// seed of the k-means initialization, overrides the config
    #[argh(option)]
    seed: Option<u64>,
}

fn parse_operation(name: &str, args: &Args, config: &SessionConfig) -> Result<Operation, String> {
    let kernel_size = args.kernel_size.unwrap_or(config.kernel_size);
    let (low, high) = config.canny_thresholds;

    let op = match name {
        "brightness" => Operation::Brightness(args.delta),
        "contrast" => Operation::Contrast(args.delta),
        "threshold" => Operation::Threshold(args.threshold),
        "negative" => Operation::Negative,
        "grayscale" => Operation::Grayscale,
        "equalize" => Operation::EqualizeHistogram,
        "flip-horizontal" => Operation::Flip(FlipAxis::Horizontal),
        "flip-vertical" => Operation::Flip(FlipAxis::Vertical),
        "flip-both" => Operation::Flip(FlipAxis::Both),
        "rotate90" => Operation::Rotate90,
        "translate" => Operation::Translate {
            tx: args.tx,
            ty: args.ty,
        },
        "scale" => Operation::Scale(args.factor),
        "shear" => Operation::Shear(args.factor),
        "mean" => Operation::MeanFilter(kernel_size),
        "median" => Operation::MedianFilter(kernel_size),
        "gaussian" => Operation::GaussianFilter(kernel_size),
        "conservative" => Operation::ConservativeFilter(kernel_size),
        "crimmins" => Operation::CrimminsSpeckle,
        "sobel" => Operation::Edges(EdgeOperator::Sobel),
        "prewitt" => Operation::Edges(EdgeOperator::Prewitt),
        "roberts" => Operation::Edges(EdgeOperator::Roberts),
        "compass" => Operation::Edges(EdgeOperator::Compass),
        "laplacian" => Operation::Edges(EdgeOperator::Laplacian),
        "gabor" => Operation::Edges(EdgeOperator::Gabor(GaborParams::default())),
        "canny" => Operation::Canny { low, high },
        "erode" => Operation::Erode,
        "dilate" => Operation::Dilate,
        "kmeans" => Operation::KMeans(KMeansConfig {
            seed: args.seed.or(config.kmeans.seed),
            ..config.kmeans
        }),
        "hough" => Operation::HoughLines,
        other => match config.frequency_filter(other) {
            Some(filter) => Operation::Frequency(filter),
            None => return Err(format!("Unsupported operation: {other}")),
        },
    };

    Ok(op)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };

    let ops = args
        .op
        .iter()
        .map(|name| parse_operation(name, &args, &config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = Session::open(&args.input, args.grayscale)?;
    session.set_config(config);

    for op in &ops {
        session.apply(op)?;
        log::info!("applied {}", op.name());
    }

    session.save(&args.output)?;

    let out = session.processed()?;
    log::info!(
        "wrote {} ({}x{})",
        args.output.display(),
        out.cols(),
        out.rows()
    );

    Ok(())
}

use argh::FromArgs;
use std::path::PathBuf;

use circlecv::{
    image::Image,
    imgproc::{
        self,
        hough::{CircleResult, HoughCircleDetector, HoughCirclesConfig},
    },
};

#[derive(FromArgs)]
/// Detect circles in an image with the gradient Hough transform
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// path to a JSON file with the detection parameters
    #[argh(option)]
    config: Option<PathBuf>,

    /// path to write the JSON report to
    #[argh(option)]
    report: Option<PathBuf>,

    /// size of the gaussian kernel applied before detection
    #[argh(option, default = "7")]
    blur_kernel: usize,

    /// sigma of the gaussian applied before detection
    #[argh(option, default = "2.0")]
    blur_sigma: f32,

    /// minimum number of votes, overrides the config
    #[argh(option)]
    param2: Option<f32>,

    /// smallest radius searched, overrides the config
    #[argh(option)]
    min_radius: Option<i32>,

    /// largest radius searched, overrides the config
    #[argh(option)]
    max_radius: Option<i32>,
}

#[derive(serde::Serialize)]
struct Report<'a> {
    image_path: &'a PathBuf,
    width: usize,
    height: usize,
    config: &'a HoughCirclesConfig,
    result: &'a CircleResult,
}

fn load_config(args: &Args) -> Result<HoughCirclesConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => HoughCirclesConfig::default(),
    };

    if let Some(param2) = args.param2 {
        config = config.with_thresholds(config.param1, param2);
    }
    let min_radius = args.min_radius.unwrap_or(config.min_radius);
    let max_radius = args.max_radius.unwrap_or(config.max_radius);

    Ok(config.with_radius_range(min_radius, max_radius))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = load_config(&args)?;
    let mut detector = HoughCircleDetector::new(config)?;

    // read the image and convert it to a smoothed grayscale field
    let rgb = image::open(&args.image_path)?.to_rgb8();
    let size = [rgb.width() as usize, rgb.height() as usize].into();
    let img = Image::<u8, 3>::new(size, rgb.into_raw())?;

    let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
    imgproc::color::gray_from_rgb_u8(&img, &mut gray)?;

    let gray_f32 = gray.cast::<f32>()?;

    let mut field = Image::<f32, 1>::from_size_val(size, 0.0)?;
    imgproc::filter::gaussian_blur(
        &gray_f32,
        &mut field,
        (args.blur_kernel, args.blur_kernel),
        (args.blur_sigma, args.blur_sigma),
    )?;

    let result = detector.detect(&field)?;
    log::info!("detection finished at stage {:?}", detector.stage());

    println!("No of circles: {}", result.count());
    match result.mean_radius() {
        Some(mean) => println!("Average radius: {mean:.2}"),
        None => println!("Average radius: n/a"),
    }
    for (i, circle) in result.iter().enumerate() {
        println!(
            "circle {i}: center=({}, {}) radius={} votes={}",
            circle.center_x.round() as u16,
            circle.center_y.round() as u16,
            circle.radius,
            circle.votes
        );
    }

    if let Some(path) = &args.report {
        let report = Report {
            image_path: &args.image_path,
            width: size.width,
            height: size.height,
            config: detector.config(),
            result: &result,
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

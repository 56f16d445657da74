use argh::FromArgs;
use std::path::PathBuf;

use circlecv::{image::Image, imgproc};

#[derive(FromArgs)]
/// Print the intensity statistics and histogram of an image
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// number of histogram bins, 0 to skip the histogram
    #[argh(option, default = "16")]
    bins: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // read the image
    let rgb = image::open(&args.image_path)?.to_rgb8();
    let size = [rgb.width() as usize, rgb.height() as usize].into();
    let img = Image::<u8, 3>::new(size, rgb.into_raw())?;
    log::debug!("loaded {} from {}", size, args.image_path.display());

    let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
    imgproc::color::gray_from_rgb_u8(&img, &mut gray)?;

    let stats = imgproc::histogram::intensity_stats(&gray)?;
    println!("Mean: {:.2}", stats.mean);
    println!("Median: {:.2}", stats.median);
    println!("Std Dev: {:.2}", stats.std_dev);

    if args.bins == 0 {
        return Ok(());
    }

    let mut hist = vec![0; args.bins];
    imgproc::histogram::compute_histogram(&gray, &mut hist, args.bins)?;

    let max = hist.iter().copied().max().unwrap_or(0).max(1);
    for (i, count) in hist.iter().enumerate() {
        let lo = i * 256 / args.bins;
        let hi = (i + 1) * 256 / args.bins - 1;
        let bar = "#".repeat(count * 50 / max);
        println!("{lo:>3}-{hi:>3} {count:>8} {bar}");
    }

    Ok(())
}

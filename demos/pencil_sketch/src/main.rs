use argh::FromArgs;
use std::path::PathBuf;

use circlecv::{image::Image, imgproc};

#[derive(FromArgs)]
/// Turn an image into a grayscale pencil sketch
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// path to save the sketch to
    #[argh(option, short = 'o')]
    output_path: PathBuf,

    /// size of the gaussian kernel, must be odd
    #[argh(option, default = "21")]
    blur_kernel: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.blur_kernel % 2 == 0 {
        return Err(format!("the kernel size must be odd, got {}", args.blur_kernel).into());
    }

    // read the image
    let rgb = image::open(&args.image_path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let size = [width as usize, height as usize].into();
    let img = Image::<u8, 3>::new(size, rgb.into_raw())?;

    let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
    imgproc::color::gray_from_rgb_u8(&img, &mut gray)?;

    let mut sketch = Image::<u8, 1>::from_size_val(size, 0)?;
    imgproc::enhance::pencil_sketch(&gray, &mut sketch, args.blur_kernel)?;
    log::debug!("sketched a {size} image with a {} kernel", args.blur_kernel);

    let out = image::GrayImage::from_raw(width, height, sketch.into_vec())
        .ok_or("sketch buffer does not match the image size")?;
    out.save(&args.output_path)?;
    println!("Sketch saved to: {}", args.output_path.display());

    Ok(())
}

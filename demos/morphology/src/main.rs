use argh::FromArgs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};
use morpho::image::{DepthImage, Image, ImageError, ImageSize, PixelDepth};
use morpho::imgproc::{
    channels::map_planes,
    morphology::{self, ElementShape, MorphOp, MorphologyError, StructuringElement, FOREGROUND},
    threshold::threshold_binary,
};

#[derive(FromArgs)]
/// Apply a morphological operation to an image file
struct Args {
    /// path to an input image
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the output image
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// operation: erode, dilate, open, close, gradient, tophat, bottomhat,
    /// median, erodebug, skeleton or prune
    #[argh(option, default = "Task::Morph(MorphOp::Erode)")]
    op: Task,

    /// structuring element shape: square, cross, disk or shift
    #[argh(option, default = "ElementShape::Square")]
    shape: ElementShape,

    /// structuring element size, odd and at most 31
    #[argh(option, default = "3")]
    size: usize,

    /// binarize the result of a grayscale operation, or the input of a
    /// binary one, keeping values strictly above this threshold
    #[argh(option)]
    threshold: Option<f32>,

    /// maximum spur length removed by skeleton and prune
    #[argh(option, default = "0")]
    prune: usize,
}

#[derive(Debug, Clone, Copy)]
enum Task {
    Morph(MorphOp),
    ErodeBug,
    Skeleton,
    Prune,
}

impl FromStr for Task {
    type Err = MorphologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "erodebug" => Ok(Task::ErodeBug),
            "skeleton" | "skeletonize" => Ok(Task::Skeleton),
            "prune" => Ok(Task::Prune),
            _ => s.parse().map(Task::Morph),
        }
    }
}

fn binarize(src: &Image<f32, 1>, threshold: f32) -> Result<Image<f32, 1>, ImageError> {
    let mut dst = Image::from_size_val(src.size(), 0.0)?;
    threshold_binary(src, &mut dst, threshold, FOREGROUND)?;
    Ok(dst)
}

/// Run one task on a single plane.
fn run_plane(
    task: Task,
    se: &StructuringElement,
    threshold: Option<f32>,
    prune: usize,
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
) -> Result<(), MorphologyError> {
    match task {
        Task::Morph(op) => op.apply(src, dst, se)?,
        Task::ErodeBug => morphology::erode_bug(src, dst)?,
        Task::Skeleton | Task::Prune => {
            let binary = match threshold {
                Some(t) => binarize(src, t)?,
                None => src.clone(),
            };
            return match task {
                Task::Prune => morphology::prune(&binary, dst, prune),
                _ => morphology::skeletonize_and_prune(&binary, dst, prune),
            };
        }
    }

    log::trace!("plane range before threshold: {:?}", dst.min_max());

    if let Some(t) = threshold {
        *dst = binarize(dst, t)?;
    }

    Ok(())
}

fn to_depth_image(img: DynamicImage) -> Result<DepthImage, ImageError> {
    let color = img.color();
    let channels = color.channel_count();
    let bits = (color.bits_per_pixel() / channels as u16) as u8;
    let depth = PixelDepth::from_format(bits, channels)?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let image = match depth {
        PixelDepth::Gray8 => DepthImage::Gray8(Image::new(size, img.into_luma8().into_raw())?),
        PixelDepth::Gray16 => DepthImage::Gray16(Image::new(size, img.into_luma16().into_raw())?),
        PixelDepth::Gray32 => DepthImage::Gray32(Image::new(size, img.to_luma32f().into_raw())?),
        PixelDepth::Rgb => DepthImage::Rgb(Image::new(size, img.into_rgb8().into_raw())?),
    };

    Ok(image)
}

fn to_dynamic_image(img: DepthImage) -> Result<DynamicImage, Box<dyn std::error::Error>> {
    let size = img.size();
    let (w, h) = (size.width as u32, size.height as u32);
    let invalid = "buffer does not match the image size";

    let out = match img {
        DepthImage::Gray8(img) => {
            DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, img.into_vec()).ok_or(invalid)?)
        }
        DepthImage::Gray16(img) => DynamicImage::ImageLuma16(
            ImageBuffer::<Luma<u16>, _>::from_raw(w, h, img.into_vec()).ok_or(invalid)?,
        ),
        DepthImage::Gray32(img) => {
            let data = img
                .into_vec()
                .into_iter()
                .map(|v| PixelDepth::Gray8.clip(v) as u8)
                .collect();
            DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, data).ok_or(invalid)?)
        }
        DepthImage::Rgb(img) => {
            DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, img.into_vec()).ok_or(invalid)?)
        }
    };

    Ok(out)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let se = StructuringElement::new(args.shape, args.size)?;
    log::debug!("structuring element {} {}:\n{se}", args.shape, args.size);

    let image = to_depth_image(image::open(&args.input)?)?;
    log::info!(
        "loaded {} ({:?}, {})",
        args.input.display(),
        image.depth(),
        image.size()
    );

    let start = Instant::now();
    let output = map_planes(&image, |src, dst| {
        run_plane(args.op, &se, args.threshold, args.prune, src, dst)
    })?;
    log::info!("{:?} took {:?}", args.op, start.elapsed());

    to_dynamic_image(output)?.save(&args.output)?;
    log::info!("saved {}", args.output.display());

    Ok(())
}

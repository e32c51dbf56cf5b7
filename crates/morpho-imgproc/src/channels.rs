use rayon::prelude::*;

use morpho_image::{DepthImage, Image, ImageError};

/// Apply a single channel operation to every plane of an image.
///
/// The image is split into `f32` planes (one for grayscale, three for RGB),
/// `op` runs on each plane in parallel, and the results are recombined into
/// the source depth. Integer depths are rounded and clamped on the way back.
///
/// # Arguments
///
/// * `image` - The input image.
/// * `op` - The operation, writing from its first argument into its second.
///
/// # Errors
///
/// Returns the first error raised by `op`, or an image error if the planes
/// cannot be converted.
///
/// # Example
///
/// ```
/// use morpho_image::{DepthImage, Image};
/// use morpho_imgproc::channels::map_planes;
/// use morpho_imgproc::morphology::{dilate, ElementShape, StructuringElement};
///
/// let image = DepthImage::Gray8(Image::new([3, 1].into(), vec![0, 200, 0]).unwrap());
/// let se = StructuringElement::new(ElementShape::Square, 3).unwrap();
///
/// let out = map_planes(&image, |src, dst| dilate(src, dst, &se)).unwrap();
/// assert_eq!(out, DepthImage::Gray8(Image::new([3, 1].into(), vec![200, 200, 200]).unwrap()));
/// ```
pub fn map_planes<E, F>(image: &DepthImage, op: F) -> Result<DepthImage, E>
where
    E: From<ImageError> + Send,
    F: Fn(&Image<f32, 1>, &mut Image<f32, 1>) -> Result<(), E> + Send + Sync,
{
    let planes = image.to_planes()?;

    let outputs = planes
        .par_iter()
        .map(|plane| -> Result<Image<f32, 1>, E> {
            let mut out = Image::<f32, 1>::from_size_val(plane.size(), 0.0)?;
            op(plane, &mut out)?;
            Ok(out)
        })
        .collect::<Result<Vec<_>, E>>()?;

    Ok(DepthImage::from_planes(image.depth(), outputs)?)
}

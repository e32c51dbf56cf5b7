use num_traits::Zero;
use std::cmp::PartialOrd;

use morpho_image::{Image, ImageError};

use crate::parallel;

/// Default threshold used when binarizing the output of a morphological operation.
pub const DEFAULT_THRESHOLD: f32 = 100.0;

/// Apply a binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The value written when the input value is strictly greater than the threshold.
///
/// # Examples
///
/// ```
/// use morpho_image::{Image, ImageSize};
/// use morpho_imgproc::threshold::threshold_binary;
///
/// let data = vec![100.0f32, 200.0, 50.0, 150.0, 100.5, 250.0];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0.0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100.0, 255.0).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0.0, 255.0, 0.0, 255.0, 255.0, 255.0]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // run the thresholding operation in parallel
    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            max_value
        } else {
            T::zero()
        };
    });

    Ok(())
}

use morpho_image::Image;

/// Clamp a signed coordinate into `[0, len)`.
#[inline]
pub(crate) fn replicate_index(idx: isize, len: usize) -> usize {
    idx.clamp(0, len as isize - 1) as usize
}

/// Read a pixel with edge replication.
///
/// Coordinates outside the image are clamped to the nearest valid edge before
/// reading, so border pixels repeat outwards indefinitely. Every neighborhood
/// reduction samples through this function.
///
/// The image must not be empty.
///
/// # Example
///
/// ```
/// use morpho_image::Image;
/// use morpho_imgproc::morphology::sample_replicate;
///
/// let image = Image::<f32, 1>::new([2, 2].into(), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(sample_replicate(&image, -5, 0), 1.0);
/// assert_eq!(sample_replicate(&image, 7, 9), 4.0);
/// ```
#[inline]
pub fn sample_replicate(image: &Image<f32, 1>, x: isize, y: isize) -> f32 {
    let width = image.width();
    let nx = replicate_index(x, width);
    let ny = replicate_index(y, image.height());
    image.as_slice()[ny * width + nx]
}

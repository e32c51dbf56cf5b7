use morpho_image::Image;

use super::binary::{self, BinaryMask, EAST, NORTH, SOUTH, WEST};
use super::prune::prune_mask;
use super::{check_same_size, MorphologyError};

const DIRECTIONS: [(usize, &str); 4] = [
    (NORTH, "north"),
    (SOUTH, "south"),
    (EAST, "east"),
    (WEST, "west"),
];

/// A foreground pixel is deletable from the `direction` border when that
/// neighbor is background, removing it keeps the local 8-connectivity, and it
/// is not the end of a line.
fn is_deletable(mask: &BinaryMask, x: usize, y: usize, direction: usize) -> bool {
    let n = mask.neighbors(x, y);
    n[direction] == 0
        && binary::foreground_count(&n) >= 2
        && binary::connectivity_number(&n) == 1
}

/// Thin the mask in place until a full pass removes nothing. Returns the number of passes.
pub(crate) fn thin_mask(mask: &mut BinaryMask) -> usize {
    let mut scratch = mask.empty_like();
    let mut passes = 0;

    loop {
        passes += 1;
        let mut removed_in_pass = 0;

        for (direction, name) in DIRECTIONS {
            let removed = binary::sweep(mask, &mut scratch, |m, x, y| {
                is_deletable(m, x, y, direction)
            });
            std::mem::swap(mask, &mut scratch);
            log::trace!("skeleton pass {passes} {name}: removed {removed}");
            removed_in_pass += removed;
        }

        log::debug!(
            "skeleton pass {passes}: removed {removed_in_pass}, {} remaining",
            mask.count_foreground()
        );

        if removed_in_pass == 0 {
            return passes;
        }
    }
}

/// Reduce the foreground of a binary image to a one pixel wide skeleton.
///
/// The input must be a strict binary image: every pixel [`super::FOREGROUND`]
/// or [`super::BACKGROUND`] with both values present. Pixels outside the
/// image are treated as background.
///
/// Each pass peels the north, south, east and west borders in turn. A border
/// pixel is removed only when doing so keeps the number of 8-connected
/// foreground components and 4-connected background components around it,
/// and it is not a line end. Passes repeat until nothing changes, so the
/// result keeps the topology of the input and isolated pixels survive.
///
/// # Arguments
///
/// * `src` - The binary source image.
/// * `dst` - The destination image (will be overwritten with 0/255 values).
///
/// # Errors
///
/// Returns [`MorphologyError::NotBinary`] if `src` is not a strict 0/255
/// image, or a size error if `src` and `dst` differ in size.
///
/// # Example
///
/// ```
/// use morpho_image::Image;
/// use morpho_imgproc::morphology::skeletonize;
///
/// // a 3 pixel thick bar thins to its middle row
/// let mut src = Image::<f32, 1>::from_size_val([7, 5].into(), 0.0).unwrap();
/// for y in 1..4 {
///     for x in 1..6 {
///         src.set_pixel(x, y, 0, 255.0).unwrap();
///     }
/// }
///
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
/// skeletonize(&src, &mut dst).unwrap();
///
/// let remaining = dst.as_slice().iter().filter(|&&v| v == 255.0).count();
/// assert!(remaining > 0 && remaining <= 5);
/// ```
pub fn skeletonize(src: &Image<f32, 1>, dst: &mut Image<f32, 1>) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;

    let mut mask = BinaryMask::from_image(src)?;
    let passes = thin_mask(&mut mask);
    log::debug!("skeletonize converged after {passes} passes");

    mask.write_to(dst);
    Ok(())
}

/// Skeletonize a binary image and then prune spurs of up to `length` pixels.
///
/// Equivalent to [`skeletonize`] followed by [`super::prune`] without the
/// intermediate encoding.
///
/// # Errors
///
/// Same as [`skeletonize`].
pub fn skeletonize_and_prune(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    length: usize,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;

    let mut mask = BinaryMask::from_image(src)?;
    thin_mask(&mut mask);
    prune_mask(&mut mask, length);

    mask.write_to(dst);
    Ok(())
}

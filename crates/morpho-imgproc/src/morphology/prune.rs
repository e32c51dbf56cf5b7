use morpho_image::Image;

use super::binary::{self, BinaryMask, NEIGHBORS};
use super::{check_same_size, MorphologyError};

/// Whether neighbor `k` of a pixel comes after it in raster order.
fn is_later(k: usize) -> bool {
    let (dx, dy) = NEIGHBORS[k];
    dy > 0 || (dy == 0 && dx > 0)
}

fn is_removable_endpoint(mask: &BinaryMask, x: usize, y: usize) -> bool {
    let n = mask.neighbors(x, y);
    if binary::foreground_count(&n) != 1 {
        return false;
    }

    // a two pixel component loses only its later pixel
    let Some(k) = n.iter().position(|&v| v == 1) else {
        return false;
    };
    let (dx, dy) = NEIGHBORS[k];
    let qx = x as isize + dx;
    let qy = y as isize + dy;
    let q_is_endpoint = NEIGHBORS
        .iter()
        .map(|&(ex, ey)| mask.get(qx + ex, qy + ey))
        .sum::<u8>()
        == 1;

    !(q_is_endpoint && is_later(k))
}

/// Remove endpoints for up to `length` rounds. Returns the number of removed pixels.
pub(crate) fn prune_mask(mask: &mut BinaryMask, length: usize) -> usize {
    let mut scratch = mask.empty_like();
    let mut total = 0;

    for round in 1..=length {
        let removed = binary::sweep(mask, &mut scratch, is_removable_endpoint);
        std::mem::swap(mask, &mut scratch);
        log::debug!("prune round {round}: removed {removed} endpoints");

        if removed == 0 {
            break;
        }
        total += removed;
    }

    total
}

/// Remove spurs from a skeleton by peeling line endpoints.
///
/// Each round deletes, simultaneously, every foreground pixel with exactly one
/// foreground neighbor (8-connectivity). After `length` rounds every branch
/// shorter than `length` pixels hanging off a junction is gone, while closed
/// loops are untouched. Isolated pixels are never removed, and a component
/// reduced to two pixels keeps its earlier pixel in raster order. Stops early
/// once a round removes nothing.
///
/// Main branches are shortened at their free ends by the same amount.
///
/// # Arguments
///
/// * `src` - The binary source image, usually the output of [`super::skeletonize`].
/// * `dst` - The destination image (will be overwritten with 0/255 values).
/// * `length` - The maximum number of rounds.
///
/// # Errors
///
/// Returns [`MorphologyError::NotBinary`] if `src` is not a strict 0/255
/// image, or a size error if `src` and `dst` differ in size.
pub fn prune(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    length: usize,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;

    let mut mask = BinaryMask::from_image(src)?;
    let removed = prune_mask(&mut mask, length);
    log::debug!("prune removed {removed} pixels in total");

    mask.write_to(dst);
    Ok(())
}

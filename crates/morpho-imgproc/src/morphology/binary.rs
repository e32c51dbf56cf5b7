use morpho_image::Image;

use super::MorphologyError;
use crate::parallel;

/// Pixel value of the foreground in a binary image.
pub const FOREGROUND: f32 = 255.0;

/// Pixel value of the background in a binary image.
pub const BACKGROUND: f32 = 0.0;

/// Neighbor offsets in counter-clockwise order starting east, with `y` pointing down.
pub(crate) const NEIGHBORS: [(isize, isize); 8] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // N
    (-1, -1), // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // S
    (1, 1),   // SE
];

pub(crate) const EAST: usize = 0;
pub(crate) const NORTH: usize = 2;
pub(crate) const WEST: usize = 4;
pub(crate) const SOUTH: usize = 6;

/// A 0/1 mask decoded from a strict 0/255 image.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Decode a binary image.
    ///
    /// Every pixel must be exactly [`BACKGROUND`] or [`FOREGROUND`] and both
    /// values must occur.
    pub(crate) fn from_image(src: &Image<f32, 1>) -> Result<Self, MorphologyError> {
        let mut has_fg = false;
        let mut has_bg = false;

        let mut data = Vec::with_capacity(src.as_slice().len());
        for (idx, &v) in src.as_slice().iter().enumerate() {
            if v == FOREGROUND {
                has_fg = true;
                data.push(1);
            } else if v == BACKGROUND {
                has_bg = true;
                data.push(0);
            } else {
                return Err(MorphologyError::NotBinary(format!(
                    "value {v} at ({}, {})",
                    idx % src.width(),
                    idx / src.width()
                )));
            }
        }

        match (has_fg, has_bg) {
            (true, true) => Ok(Self {
                width: src.width(),
                height: src.height(),
                data,
            }),
            (false, true) => Err(MorphologyError::NotBinary(
                "image has no foreground".to_string(),
            )),
            (true, false) => Err(MorphologyError::NotBinary(
                "image has no background".to_string(),
            )),
            (false, false) => Err(MorphologyError::NotBinary("image is empty".to_string())),
        }
    }

    /// An all-background mask of the same shape.
    pub(crate) fn empty_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: vec![0; self.data.len()],
        }
    }

    #[inline]
    pub(crate) fn get(&self, x: isize, y: isize) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }

    /// The eight neighbors of `(x, y)` in [`NEIGHBORS`] order. Outside the image is background.
    #[inline]
    pub(crate) fn neighbors(&self, x: usize, y: usize) -> [u8; 8] {
        let mut n = [0u8; 8];
        for (value, &(dx, dy)) in n.iter_mut().zip(NEIGHBORS.iter()) {
            *value = self.get(x as isize + dx, y as isize + dy);
        }
        n
    }

    pub(crate) fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v == 1).count()
    }

    /// Encode back to 0/255 into `dst`, which must have the mask's shape.
    pub(crate) fn write_to(&self, dst: &mut Image<f32, 1>) {
        for (out, &v) in dst.as_slice_mut().iter_mut().zip(self.data.iter()) {
            *out = if v == 1 { FOREGROUND } else { BACKGROUND };
        }
    }
}

/// Number of foreground pixels among the neighbors.
#[inline]
pub(crate) fn foreground_count(n: &[u8; 8]) -> u8 {
    n.iter().sum()
}

/// Yokoi 8-connectivity number of the center pixel.
///
/// Counts the 8-connected foreground components touching the center. A value
/// of 1 means the center can be removed without splitting or merging regions
/// (given it is a border pixel).
pub(crate) fn connectivity_number(n: &[u8; 8]) -> u8 {
    let inv = n.map(|v| 1 - v);
    [0, 2, 4, 6]
        .iter()
        .map(|&k| inv[k] - inv[k] * inv[(k + 1) % 8] * inv[(k + 2) % 8])
        .sum()
}

/// One double-buffered sweep.
///
/// `next` receives a copy of `current` with every foreground pixel for which
/// `remove` holds set to background. Classification reads `current` only, so
/// rows are processed in parallel. Returns the number of removed pixels.
pub(crate) fn sweep<F>(current: &BinaryMask, next: &mut BinaryMask, remove: F) -> usize
where
    F: Fn(&BinaryMask, usize, usize) -> bool + Send + Sync,
{
    let width = current.width;
    parallel::par_fill_rows_count(&mut next.data, width, |y, row| {
        let src_row = &current.data[y * width..(y + 1) * width];
        let mut removed = 0;
        for (x, (out, &v)) in row.iter_mut().zip(src_row.iter()).enumerate() {
            *out = v;
            if v == 1 && remove(current, x, y) {
                *out = 0;
                removed += 1;
            }
        }
        removed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(width: usize, height: usize, fg: &[(usize, usize)]) -> BinaryMask {
        let mut data = vec![0; width * height];
        for &(x, y) in fg {
            data[y * width + x] = 1;
        }
        BinaryMask {
            width,
            height,
            data,
        }
    }

    #[test]
    fn test_from_image() -> Result<(), MorphologyError> {
        let src = Image::<f32, 1>::new([3, 1].into(), vec![0.0, 255.0, 0.0])?;
        let m = BinaryMask::from_image(&src)?;
        assert_eq!(m.data, vec![0, 1, 0]);
        assert_eq!(m.count_foreground(), 1);

        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 7.0)?;
        m.write_to(&mut dst);
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn test_from_image_rejects_non_binary() -> Result<(), MorphologyError> {
        let gray = Image::<f32, 1>::new([2, 2].into(), vec![0.0, 255.0, 128.0, 0.0])?;
        assert_eq!(
            BinaryMask::from_image(&gray),
            Err(MorphologyError::NotBinary("value 128 at (0, 1)".to_string()))
        );

        for val in [0.0, 255.0] {
            let flat = Image::<f32, 1>::from_size_val([2, 2].into(), val)?;
            assert!(matches!(
                BinaryMask::from_image(&flat),
                Err(MorphologyError::NotBinary(_))
            ));
        }

        let empty = Image::<f32, 1>::new([0, 3].into(), vec![])?;
        assert!(BinaryMask::from_image(&empty).is_err());
        Ok(())
    }

    #[test]
    fn test_neighbors_order() {
        // only the north-east neighbor of (1, 1) is set
        let m = mask(3, 3, &[(1, 1), (2, 0)]);
        assert_eq!(m.neighbors(1, 1), [0, 1, 0, 0, 0, 0, 0, 0]);
        // outside the image reads as background
        assert_eq!(m.neighbors(2, 0), [0, 0, 0, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_connectivity_number() {
        // isolated and interior pixels
        assert_eq!(connectivity_number(&[0; 8]), 0);
        assert_eq!(connectivity_number(&[1; 8]), 0);
        // end of a line
        assert_eq!(connectivity_number(&[1, 0, 0, 0, 0, 0, 0, 0]), 1);
        // middle of a horizontal line
        assert_eq!(connectivity_number(&[1, 0, 0, 0, 1, 0, 0, 0]), 2);
        // corner of a filled block
        assert_eq!(connectivity_number(&[1, 0, 0, 0, 0, 0, 1, 1]), 1);
        // diagonal neighbors joined through the center only
        assert_eq!(connectivity_number(&[0, 1, 0, 0, 0, 1, 0, 0]), 2);
    }

    #[test]
    fn test_sweep_reads_previous_state() {
        // removing every pixel with a west background neighbor only hits the
        // leftmost pixel of each run
        let current = mask(4, 2, &[(0, 0), (1, 0), (2, 0), (1, 1), (2, 1)]);
        let mut next = current.empty_like();
        let removed = sweep(&current, &mut next, |m, x, y| m.neighbors(x, y)[WEST] == 0);
        assert_eq!(removed, 2);
        assert_eq!(next, mask(4, 2, &[(1, 0), (2, 0), (2, 1)]));
    }

    #[test]
    fn test_foreground_count() {
        assert_eq!(foreground_count(&[1, 0, 1, 0, 0, 0, 1, 1]), 4);
    }
}

use std::fmt;
use std::str::FromStr;

use super::MorphologyError;

/// Largest structuring element side length that can be generated.
pub const MAX_ELEMENT_SIZE: usize = 31;

/// Shapes of a [`StructuringElement`].
///
/// All shapes are laid out on a square `size x size` grid anchored at the
/// center cell `(size / 2, size / 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementShape {
    /// Every cell of the grid is active.
    Square,

    /// Only the cells on the center row and the center column are active.
    Cross,

    /// Cells whose Euclidean distance to the center is at most `size / 2`
    /// (real valued, so a size 3 disk has radius 1.5).
    Disk,

    /// The diagonal half-line running from the center to the bottom-right
    /// corner, cells `(c + k, c + k)` for `k = 0..=c`.
    ///
    /// Sampling through this element reads pixels down and to the right of the
    /// anchor, so a dilation drags bright structures up and to the left.
    Shift,
}

impl ElementShape {
    /// All shapes in the order they are usually presented.
    pub const ALL: [ElementShape; 4] = [
        ElementShape::Square,
        ElementShape::Cross,
        ElementShape::Disk,
        ElementShape::Shift,
    ];

    fn contains(&self, i: usize, j: usize, size: usize) -> bool {
        let c = size / 2;
        match self {
            ElementShape::Square => true,
            ElementShape::Cross => i == c || j == c,
            ElementShape::Disk => {
                let dx = i as f64 - c as f64;
                let dy = j as f64 - c as f64;
                let radius = size as f64 / 2.0;
                dx * dx + dy * dy <= radius * radius
            }
            ElementShape::Shift => i == j && i >= c,
        }
    }
}

impl fmt::Display for ElementShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementShape::Square => "square",
            ElementShape::Cross => "cross",
            ElementShape::Disk => "disk",
            ElementShape::Shift => "shift",
        };
        f.write_str(name)
    }
}

impl FromStr for ElementShape {
    type Err = MorphologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(ElementShape::Square),
            "cross" => Ok(ElementShape::Cross),
            "disk" => Ok(ElementShape::Disk),
            "shift" => Ok(ElementShape::Shift),
            other => Err(MorphologyError::UndefinedElement(format!(
                "unknown shape `{other}`"
            ))),
        }
    }
}

/// A morphological structuring element.
///
/// A square boolean mask of odd side length, anchored at its center cell.
/// Cell `(i, j)` is column `i` and row `j`; an active cell contributes the
/// neighbor at offset `(i - c, j - c)` where `c = size / 2`.
///
/// # Example
///
/// ```rust
/// use morpho_imgproc::morphology::{ElementShape, StructuringElement};
///
/// let se = StructuringElement::new(ElementShape::Cross, 3).unwrap();
/// assert_eq!(se.size(), 3);
/// assert_eq!(se.center(), 1);
/// assert_eq!(se.num_active(), 5);
/// assert!(!se.is_active(0, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    size: usize,
    cells: Vec<bool>,
}

impl StructuringElement {
    /// Generate a structuring element from a shape and an odd size in `[1, 31]`.
    ///
    /// # Errors
    ///
    /// Returns [`MorphologyError::UndefinedElement`] if the size is even or
    /// out of range.
    pub fn new(shape: ElementShape, size: usize) -> Result<Self, MorphologyError> {
        validate_size(size)?;

        let mut cells = vec![false; size * size];
        for j in 0..size {
            for i in 0..size {
                cells[j * size + i] = shape.contains(i, j, size);
            }
        }

        Ok(Self { size, cells })
    }

    /// Build a structuring element from an explicit row-major mask.
    ///
    /// # Errors
    ///
    /// Returns [`MorphologyError::UndefinedElement`] if the size is invalid,
    /// the mask does not hold `size * size` cells, or no cell is active.
    pub fn from_mask(size: usize, cells: Vec<bool>) -> Result<Self, MorphologyError> {
        validate_size(size)?;

        if cells.len() != size * size {
            return Err(MorphologyError::UndefinedElement(format!(
                "mask has {} cells, expected {}",
                cells.len(),
                size * size
            )));
        }

        if !cells.iter().any(|&c| c) {
            return Err(MorphologyError::UndefinedElement(
                "all mask cells are inactive".to_string(),
            ));
        }

        Ok(Self { size, cells })
    }

    /// Side length of the mask.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the anchor cell along both axes.
    pub fn center(&self) -> usize {
        self.size / 2
    }

    /// Whether cell `(i, j)` (column, row) is active. Out of range cells are inactive.
    pub fn is_active(&self, i: usize, j: usize) -> bool {
        i < self.size && j < self.size && self.cells[j * self.size + i]
    }

    /// Get the raw mask, row-major.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of active cells.
    pub fn num_active(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Relative `(dx, dy)` neighbor offsets of the active cells, row-major.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let c = self.center() as isize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, active)| **active)
            .map(|(idx, _)| {
                let i = (idx % self.size) as isize;
                let j = (idx / self.size) as isize;
                (i - c, j - c)
            })
            .collect()
    }

    /// Whether the mask is unchanged by a 180 degree rotation about its center.
    pub fn is_symmetric(&self) -> bool {
        let n = self.cells.len();
        (0..n).all(|idx| self.cells[idx] == self.cells[n - 1 - idx])
    }
}

impl fmt::Display for StructuringElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            let line: String = row.iter().map(|&c| if c { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn validate_size(size: usize) -> Result<(), MorphologyError> {
    if size % 2 == 0 {
        return Err(MorphologyError::UndefinedElement(format!(
            "size {size} is even"
        )));
    }
    if size > MAX_ELEMENT_SIZE {
        return Err(MorphologyError::UndefinedElement(format!(
            "size {size} exceeds {MAX_ELEMENT_SIZE}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_element() -> Result<(), MorphologyError> {
        let se = StructuringElement::new(ElementShape::Square, 3)?;
        assert_eq!(se.size(), 3);
        assert!(se.cells().iter().all(|&c| c));
        assert_eq!(se.offsets().len(), 9);
        Ok(())
    }

    #[test]
    fn test_cross_element() -> Result<(), MorphologyError> {
        let se = StructuringElement::new(ElementShape::Cross, 5)?;
        assert_eq!(se.to_string(), "..#..\n..#..\n#####\n..#..\n..#..\n");
        assert_eq!(se.num_active(), 9);
        Ok(())
    }

    #[test]
    fn test_disk_element() -> Result<(), MorphologyError> {
        // radius 1.5 reaches the corners at distance sqrt(2)
        let se3 = StructuringElement::new(ElementShape::Disk, 3)?;
        assert_eq!(se3.num_active(), 9);

        let se5 = StructuringElement::new(ElementShape::Disk, 5)?;
        assert_eq!(se5.to_string(), ".###.\n#####\n#####\n#####\n.###.\n");
        assert_eq!(se5.num_active(), 21);
        Ok(())
    }

    #[test]
    fn test_shift_element() -> Result<(), MorphologyError> {
        let se = StructuringElement::new(ElementShape::Shift, 5)?;
        assert_eq!(se.to_string(), ".....\n.....\n..#..\n...#.\n....#\n");
        assert_eq!(se.offsets(), vec![(0, 0), (1, 1), (2, 2)]);
        assert!(!se.is_symmetric());
        Ok(())
    }

    #[test]
    fn test_size_one_is_a_single_cell() -> Result<(), MorphologyError> {
        for shape in ElementShape::ALL {
            let se = StructuringElement::new(shape, 1)?;
            assert_eq!(se.offsets(), vec![(0, 0)]);
        }
        Ok(())
    }

    #[test]
    fn test_all_sizes_and_shapes() -> Result<(), MorphologyError> {
        for size in (1..=MAX_ELEMENT_SIZE).step_by(2) {
            for shape in ElementShape::ALL {
                let se = StructuringElement::new(shape, size)?;
                assert_eq!(se.cells().len(), size * size);
                if shape != ElementShape::Shift {
                    assert!(se.is_active(se.center(), se.center()));
                    assert!(se.is_symmetric());
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_undefined_sizes() {
        for size in [0, 2, 4, 30, 32, 33, 101] {
            let res = StructuringElement::new(ElementShape::Square, size);
            assert!(matches!(res, Err(MorphologyError::UndefinedElement(_))));
        }
    }

    #[test]
    fn test_shape_from_str() -> Result<(), MorphologyError> {
        assert_eq!("Square".parse::<ElementShape>()?, ElementShape::Square);
        assert_eq!(" disk ".parse::<ElementShape>()?, ElementShape::Disk);
        assert!(matches!(
            "hexagon".parse::<ElementShape>(),
            Err(MorphologyError::UndefinedElement(_))
        ));
        for shape in ElementShape::ALL {
            assert_eq!(shape.to_string().parse::<ElementShape>()?, shape);
        }
        Ok(())
    }

    #[test]
    fn test_from_mask() -> Result<(), MorphologyError> {
        let se = StructuringElement::from_mask(
            3,
            vec![false, true, false, false, false, false, false, false, false],
        )?;
        assert_eq!(se.offsets(), vec![(0, -1)]);

        assert!(StructuringElement::from_mask(3, vec![false; 9]).is_err());
        assert!(StructuringElement::from_mask(3, vec![true; 8]).is_err());
        assert!(StructuringElement::from_mask(2, vec![true; 4]).is_err());
        Ok(())
    }
}

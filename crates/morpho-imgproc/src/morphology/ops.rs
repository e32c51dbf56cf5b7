use std::fmt;
use std::str::FromStr;

use morpho_image::Image;

use super::border::{replicate_index, sample_replicate};
use super::kernels::StructuringElement;
use super::{check_same_size, MorphologyError};
use crate::parallel;

#[derive(Debug, Clone, Copy)]
enum Reduction {
    Min,
    Max,
    Median,
}

fn new_like(src: &Image<f32, 1>) -> Result<Image<f32, 1>, MorphologyError> {
    Ok(Image::from_size_val(src.size(), 0.0)?)
}

/// Lower median: the order statistic at `(n - 1) / 2`.
fn lower_median(samples: &mut [f32]) -> f32 {
    let k = (samples.len() - 1) / 2;
    let (_, median, _) = samples.select_nth_unstable_by(k, |a, b| a.total_cmp(b));
    *median
}

fn reduce(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
    reduction: Reduction,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;

    let width = src.width();
    if width == 0 || src.height() == 0 {
        return Ok(());
    }

    let offsets = se.offsets();

    parallel::par_fill_rows(dst.as_slice_mut(), width, |y, row| {
        let mut samples = Vec::with_capacity(offsets.len());
        for (x, out) in row.iter_mut().enumerate() {
            samples.clear();
            samples.extend(
                offsets
                    .iter()
                    .map(|&(dx, dy)| sample_replicate(src, x as isize + dx, y as isize + dy)),
            );

            *out = match reduction {
                Reduction::Min => samples.iter().copied().fold(f32::INFINITY, f32::min),
                Reduction::Max => samples.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                Reduction::Median => lower_median(&mut samples),
            };
        }
    });

    Ok(())
}

/// Erode an image using a [`StructuringElement`].
///
/// Erosion shrinks bright regions in the image. Each pixel is replaced
/// by the minimum value in the neighborhood defined by the element, with
/// out-of-image neighbors resolved by edge replication.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `se` - The structuring element.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
///
/// # Example
///
/// ```
/// use morpho_image::Image;
/// use morpho_imgproc::morphology::{erode, ElementShape, StructuringElement};
///
/// let src = Image::<f32, 1>::new([3, 1].into(), vec![5.0, 1.0, 9.0]).unwrap();
/// let mut dst = Image::from_size_val(src.size(), 0.0).unwrap();
/// let se = StructuringElement::new(ElementShape::Square, 3).unwrap();
///
/// erode(&src, &mut dst, &se).unwrap();
/// assert_eq!(dst.as_slice(), &[1.0, 1.0, 1.0]);
/// ```
pub fn erode(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
) -> Result<(), MorphologyError> {
    reduce(src, dst, se, Reduction::Min)
}

/// Dilate an image using a [`StructuringElement`].
///
/// Dilation expands bright regions in the image. Each pixel is replaced
/// by the maximum value in the neighborhood defined by the element.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn dilate(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
) -> Result<(), MorphologyError> {
    reduce(src, dst, se, Reduction::Max)
}

/// Median filter over a [`StructuringElement`] neighborhood.
///
/// For `n` sampled values the output is the lower median, the value at index
/// `(n - 1) / 2` of the ascending order. With an even number of samples this
/// is the smaller of the two central values, so the output is always one of
/// the input values.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn median(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
) -> Result<(), MorphologyError> {
    reduce(src, dst, se, Reduction::Median)
}

/// Legacy 3x3 erosion computed in place.
///
/// The source is copied into `dst`, which is then scanned row by row (top to
/// bottom, left to right). Each pixel becomes the minimum of its 3x3
/// neighborhood in `dst` as it stands at that moment, so values already
/// lowered earlier in the scan take part in later minima. Dark pixels therefore
/// propagate down and to the right across the whole image instead of by one
/// pixel. The boundary is edge replication, as in [`erode`].
///
/// This is kept as a distinct operation to compare against historical
/// results and is sequential by construction.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn erode_bug(src: &Image<f32, 1>, dst: &mut Image<f32, 1>) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;

    let (width, height) = (src.width(), src.height());
    let buf = dst.as_slice_mut();
    buf.copy_from_slice(src.as_slice());

    for y in 0..height {
        for x in 0..width {
            let mut min_val = f32::INFINITY;
            for dy in -1..=1 {
                let ny = replicate_index(y as isize + dy, height);
                for dx in -1..=1 {
                    let nx = replicate_index(x as isize + dx, width);
                    min_val = min_val.min(buf[ny * width + nx]);
                }
            }
            buf[y * width + x] = min_val;
        }
    }

    Ok(())
}

/// Opening: erosion followed by dilation.
///
/// Removes bright features smaller than the element and smooths object boundaries.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn open(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;
    let mut temp_img = new_like(src)?;
    erode(src, &mut temp_img, se)?;
    dilate(&temp_img, dst, se)?;
    Ok(())
}

/// Closing: dilation followed by erosion.
///
/// Fills dark features smaller than the element and smooths object boundaries.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn close(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;
    let mut temp_img = new_like(src)?;
    dilate(src, &mut temp_img, se)?;
    erode(&temp_img, dst, se)?;
    Ok(())
}

/// Morphological gradient: dilation minus erosion.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn gradient(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;
    let mut dilated = new_like(src)?;
    let mut eroded = new_like(src)?;
    dilate(src, &mut dilated, se)?;
    erode(src, &mut eroded, se)?;
    parallel::par_iter_rows_val_two(&dilated, &eroded, dst, |d, e, out| *out = d - e);
    Ok(())
}

/// Top-hat: the source minus its opening.
///
/// Keeps the bright features that the opening removed.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn top_hat(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;
    let mut opened = new_like(src)?;
    open(src, &mut opened, se)?;
    parallel::par_iter_rows_val_two(src, &opened, dst, |s, o, out| *out = s - o);
    Ok(())
}

/// Bottom-hat: the closing minus the source.
///
/// Keeps the dark features that the closing filled.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn bottom_hat(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    se: &StructuringElement,
) -> Result<(), MorphologyError> {
    check_same_size(src, dst)?;
    let mut closed = new_like(src)?;
    close(src, &mut closed, se)?;
    parallel::par_iter_rows_val_two(&closed, src, dst, |c, s, out| *out = c - s);
    Ok(())
}

/// The grayscale operators selectable with a structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorphOp {
    /// [`erode`]
    Erode,
    /// [`dilate`]
    Dilate,
    /// [`open`]
    Open,
    /// [`close`]
    Close,
    /// [`gradient`]
    Gradient,
    /// [`top_hat`]
    TopHat,
    /// [`bottom_hat`]
    BottomHat,
    /// [`median`]
    Median,
}

impl MorphOp {
    /// All operators.
    pub const ALL: [MorphOp; 8] = [
        MorphOp::Erode,
        MorphOp::Dilate,
        MorphOp::Open,
        MorphOp::Close,
        MorphOp::Gradient,
        MorphOp::TopHat,
        MorphOp::BottomHat,
        MorphOp::Median,
    ];

    /// Run the operator on `src` into `dst`.
    ///
    /// # Example
    ///
    /// ```
    /// use morpho_image::Image;
    /// use morpho_imgproc::morphology::{ElementShape, MorphOp, StructuringElement};
    ///
    /// let src = Image::<f32, 1>::new([3, 1].into(), vec![5.0, 1.0, 9.0]).unwrap();
    /// let mut dst = Image::from_size_val(src.size(), 0.0).unwrap();
    /// let se = StructuringElement::new(ElementShape::Cross, 3).unwrap();
    ///
    /// let op: MorphOp = "Gradient".parse().unwrap();
    /// op.apply(&src, &mut dst, &se).unwrap();
    /// assert_eq!(dst.as_slice(), &[4.0, 8.0, 8.0]);
    /// ```
    pub fn apply(
        &self,
        src: &Image<f32, 1>,
        dst: &mut Image<f32, 1>,
        se: &StructuringElement,
    ) -> Result<(), MorphologyError> {
        match self {
            MorphOp::Erode => erode(src, dst, se),
            MorphOp::Dilate => dilate(src, dst, se),
            MorphOp::Open => open(src, dst, se),
            MorphOp::Close => close(src, dst, se),
            MorphOp::Gradient => gradient(src, dst, se),
            MorphOp::TopHat => top_hat(src, dst, se),
            MorphOp::BottomHat => bottom_hat(src, dst, se),
            MorphOp::Median => median(src, dst, se),
        }
    }
}

impl fmt::Display for MorphOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MorphOp::Erode => "erode",
            MorphOp::Dilate => "dilate",
            MorphOp::Open => "open",
            MorphOp::Close => "close",
            MorphOp::Gradient => "gradient",
            MorphOp::TopHat => "tophat",
            MorphOp::BottomHat => "bottomhat",
            MorphOp::Median => "median",
        };
        f.write_str(name)
    }
}

impl FromStr for MorphOp {
    type Err = MorphologyError;

    /// Parse an operator name. Case, spaces, dashes and underscores are
    /// ignored, so `"Top Hat"`, `"top-hat"` and `"tophat"` are equivalent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "erode" | "erosion" => Ok(MorphOp::Erode),
            "dilate" | "dilation" => Ok(MorphOp::Dilate),
            "open" | "opening" => Ok(MorphOp::Open),
            "close" | "closing" => Ok(MorphOp::Close),
            "gradient" => Ok(MorphOp::Gradient),
            "tophat" => Ok(MorphOp::TopHat),
            "bottomhat" | "blackhat" => Ok(MorphOp::BottomHat),
            "median" => Ok(MorphOp::Median),
            _ => Err(MorphologyError::UnknownOperation(s.to_string())),
        }
    }
}

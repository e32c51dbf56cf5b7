use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use morpho_image::{Image, ImageSize};
use morpho_imgproc::morphology::{
    self, ElementShape, MorphOp, MorphologyError, StructuringElement, BACKGROUND, FOREGROUND,
};
use morpho_imgproc::threshold::{threshold_binary, DEFAULT_THRESHOLD};

const SIZES: [usize; 3] = [1, 3, 5];

fn random_image(rng: &mut StdRng) -> Result<Image<f32, 1>, MorphologyError> {
    let width = rng.random_range(3..16);
    let height = rng.random_range(3..16);
    let data = (0..width * height)
        .map(|_| rng.random_range(0..=255u8) as f32)
        .collect();
    Ok(Image::new(ImageSize { width, height }, data)?)
}

fn apply(
    op: MorphOp,
    src: &Image<f32, 1>,
    se: &StructuringElement,
) -> Result<Image<f32, 1>, MorphologyError> {
    let mut dst = Image::from_size_val(src.size(), 0.0)?;
    op.apply(src, &mut dst, se)?;
    Ok(dst)
}

/// Direct single threaded evaluation of a neighborhood reduction.
fn serial_reference(
    src: &Image<f32, 1>,
    se: &StructuringElement,
    reduce: impl Fn(&mut Vec<f32>) -> f32,
) -> Vec<f32> {
    let (w, h) = (src.width() as isize, src.height() as isize);
    let c = se.center() as isize;
    let mut out = Vec::with_capacity(src.as_slice().len());
    for y in 0..h {
        for x in 0..w {
            let mut samples = Vec::new();
            for j in 0..se.size() {
                for i in 0..se.size() {
                    if !se.is_active(i, j) {
                        continue;
                    }
                    let sx = (x + i as isize - c).clamp(0, w - 1);
                    let sy = (y + j as isize - c).clamp(0, h - 1);
                    samples.push(src.as_slice()[(sy * w + sx) as usize]);
                }
            }
            out.push(reduce(&mut samples));
        }
    }
    out
}

fn all_le(a: &Image<f32, 1>, b: &Image<f32, 1>) -> bool {
    a.as_slice().iter().zip(b.as_slice()).all(|(x, y)| x <= y)
}

#[test]
fn erosion_below_image_below_dilation() -> Result<(), MorphologyError> {
    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..20 {
        let src = random_image(&mut rng)?;
        for shape in ElementShape::ALL {
            for size in SIZES {
                let se = StructuringElement::new(shape, size)?;
                let eroded = apply(MorphOp::Erode, &src, &se)?;
                let dilated = apply(MorphOp::Dilate, &src, &se)?;
                let median = apply(MorphOp::Median, &src, &se)?;

                assert!(all_le(&eroded, &src), "{shape} {size}");
                assert!(all_le(&src, &dilated), "{shape} {size}");
                assert!(all_le(&eroded, &median) && all_le(&median, &dilated));
            }
        }
    }
    Ok(())
}

#[test]
fn opening_and_closing_are_idempotent() -> Result<(), MorphologyError> {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let src = random_image(&mut rng)?;
        for shape in [ElementShape::Square, ElementShape::Cross, ElementShape::Disk] {
            for size in SIZES {
                let se = StructuringElement::new(shape, size)?;

                let opened = apply(MorphOp::Open, &src, &se)?;
                assert_eq!(apply(MorphOp::Open, &opened, &se)?, opened);
                assert!(all_le(&opened, &src));

                let closed = apply(MorphOp::Close, &src, &se)?;
                assert_eq!(apply(MorphOp::Close, &closed, &se)?, closed);
                assert!(all_le(&src, &closed));
            }
        }
    }
    Ok(())
}

#[test]
fn erosion_dilation_duality() -> Result<(), MorphologyError> {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..10 {
        let src = random_image(&mut rng)?;
        let inverted = Image::new(
            src.size(),
            src.as_slice().iter().map(|v| 255.0 - v).collect(),
        )?;

        for shape in [ElementShape::Square, ElementShape::Cross, ElementShape::Disk] {
            let se = StructuringElement::new(shape, 3)?;
            let eroded = apply(MorphOp::Erode, &src, &se)?;
            let dilated_inv = apply(MorphOp::Dilate, &inverted, &se)?;

            for (e, d) in eroded.as_slice().iter().zip(dilated_inv.as_slice()) {
                approx::assert_abs_diff_eq!(*e, 255.0 - d);
            }
        }
    }
    Ok(())
}

#[test]
fn residuals_are_non_negative() -> Result<(), MorphologyError> {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let src = random_image(&mut rng)?;
        for shape in [ElementShape::Square, ElementShape::Cross, ElementShape::Disk] {
            let se = StructuringElement::new(shape, 5)?;
            for op in [MorphOp::Gradient, MorphOp::TopHat, MorphOp::BottomHat] {
                let out = apply(op, &src, &se)?;
                assert!(out.as_slice().iter().all(|&v| v >= 0.0), "{op} {shape}");
            }
        }

        let shift = StructuringElement::new(ElementShape::Shift, 5)?;
        let grad = apply(MorphOp::Gradient, &src, &shift)?;
        assert!(grad.as_slice().iter().all(|&v| v >= 0.0));
    }
    Ok(())
}

#[test]
fn parallel_rows_match_serial_reference() -> Result<(), MorphologyError> {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..10 {
        let src = random_image(&mut rng)?;
        for shape in ElementShape::ALL {
            for size in SIZES {
                let se = StructuringElement::new(shape, size)?;

                let min = serial_reference(&src, &se, |s| {
                    s.iter().copied().fold(f32::INFINITY, f32::min)
                });
                let max = serial_reference(&src, &se, |s| {
                    s.iter().copied().fold(f32::NEG_INFINITY, f32::max)
                });
                let med = serial_reference(&src, &se, |s| {
                    s.sort_by(|a, b| a.total_cmp(b));
                    s[(s.len() - 1) / 2]
                });

                assert_eq!(apply(MorphOp::Erode, &src, &se)?.as_slice(), &min[..]);
                assert_eq!(apply(MorphOp::Dilate, &src, &se)?.as_slice(), &max[..]);
                assert_eq!(apply(MorphOp::Median, &src, &se)?.as_slice(), &med[..]);
            }
        }
    }
    Ok(())
}

#[test]
fn thresholded_skeleton_pipeline() -> Result<(), MorphologyError> {
    let mut rng = StdRng::seed_from_u64(5);
    let size = ImageSize {
        width: 40,
        height: 30,
    };

    // noisy bright rectangle on a dark background
    let data = (0..size.width * size.height)
        .map(|i| {
            let (x, y) = (i % size.width, i / size.width);
            let inside = (5..35).contains(&x) && (8..22).contains(&y);
            let base: f32 = if inside { 200.0 } else { 20.0 };
            base + rng.random_range(-15.0f32..15.0)
        })
        .collect();
    let src = Image::<f32, 1>::new(size, data)?;

    let se = StructuringElement::new(ElementShape::Square, 3)?;
    let smoothed = apply(MorphOp::Median, &src, &se)?;

    let mut binary = Image::from_size_val(size, 0.0)?;
    threshold_binary(&smoothed, &mut binary, DEFAULT_THRESHOLD, FOREGROUND)?;

    let mut skeleton = Image::from_size_val(size, 0.0)?;
    morphology::skeletonize_and_prune(&binary, &mut skeleton, 2)?;

    let fg = skeleton
        .as_slice()
        .iter()
        .filter(|&&v| v == FOREGROUND)
        .count();
    assert!(fg > 0);
    assert!(fg < 30 * 14);
    assert!(skeleton
        .as_slice()
        .iter()
        .all(|&v| v == FOREGROUND || v == BACKGROUND));
    Ok(())
}

use rayon::prelude::*;

use morpho_image::Image;

/// Apply a function to each pixel value in the image in parallel.
///
/// Rows of `src` and `dst` are processed on the rayon thread pool; each worker
/// writes only its own destination row.
pub fn par_iter_rows_val<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&T1, &mut T2) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    if src.cols() == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * src.cols())
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * src.cols()))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .iter()
                .zip(dst_chunk.iter_mut())
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to each pixel value of two images in parallel.
pub fn par_iter_rows_val_two<T1, const C1: usize, T2, const C2: usize, T3, const C3: usize>(
    src1: &Image<T1, C1>,
    src2: &Image<T2, C2>,
    dst: &mut Image<T3, C3>,
    f: impl Fn(&T1, &T2, &mut T3) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
    T3: Clone + Send + Sync,
{
    if src1.cols() == 0 {
        return;
    }

    src1.as_slice()
        .par_chunks_exact(C1 * src1.cols())
        .zip(src2.as_slice().par_chunks_exact(C2 * src1.cols()))
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C3 * src1.cols()))
        .for_each(|((src1_chunk, src2_chunk), dst_chunk)| {
            src1_chunk
                .iter()
                .zip(src2_chunk.iter())
                .zip(dst_chunk.iter_mut())
                .for_each(|((src1_pixel, src2_pixel), dst_pixel)| {
                    f(src1_pixel, src2_pixel, dst_pixel);
                });
        });
}

/// Fill each row of a destination buffer in parallel.
///
/// The closure receives the row index and the mutable row slice of length
/// `row_len`. It is expected to read only from state shared immutably across
/// workers.
pub fn par_fill_rows<T>(dst: &mut [T], row_len: usize, f: impl Fn(usize, &mut [T]) + Send + Sync)
where
    T: Send,
{
    if row_len == 0 {
        return;
    }

    dst.par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Fill each row of a destination buffer in parallel and sum a per-row count.
///
/// Used by the iterative binary operations to count how many pixels changed in
/// one double-buffered sweep.
pub fn par_fill_rows_count<T>(
    dst: &mut [T],
    row_len: usize,
    f: impl Fn(usize, &mut [T]) -> usize + Send + Sync,
) -> usize
where
    T: Send,
{
    if row_len == 0 {
        return 0;
    }

    dst.par_chunks_exact_mut(row_len)
        .enumerate()
        .map(|(y, row)| f(y, row))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use morpho_image::ImageError;

    #[test]
    fn test_par_iter_rows_val() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([2, 2].into(), vec![1, 2, 3, 4])?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        par_iter_rows_val(&src, &mut dst, |s, d| *d = *s * 2);
        assert_eq!(dst.as_slice(), &[2, 4, 6, 8]);
        Ok(())
    }

    #[test]
    fn test_par_iter_rows_val_two() -> Result<(), ImageError> {
        let a = Image::<f32, 1>::new([2, 2].into(), vec![5.0, 6.0, 7.0, 8.0])?;
        let b = Image::<f32, 1>::new([2, 2].into(), vec![1.0, 2.0, 3.0, 4.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(a.size(), 0.0)?;
        par_iter_rows_val_two(&a, &b, &mut dst, |x, y, d| *d = x - y);
        assert_eq!(dst.as_slice(), &[4.0, 4.0, 4.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_par_fill_rows() {
        let mut dst = vec![0usize; 6];
        par_fill_rows(&mut dst, 3, |y, row| {
            row.iter_mut().enumerate().for_each(|(x, v)| *v = y * 10 + x);
        });
        assert_eq!(dst, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn test_par_fill_rows_count() {
        let mut dst = vec![0u8; 8];
        let count = par_fill_rows_count(&mut dst, 4, |y, row| {
            row[0] = 1;
            y + 1
        });
        assert_eq!(count, 3);
        assert_eq!(dst, vec![1, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_empty_rows() {
        let mut dst: Vec<u8> = vec![];
        assert_eq!(par_fill_rows_count(&mut dst, 0, |_, _| 1), 0);
    }
}

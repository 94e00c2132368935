use crate::{CubicKernel, Dims, Raster, Sample};
use homography_core::{nalgebra::Matrix3, HomographyMatrix};
use log::*;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// What a destination pixel receives when its mapped location is outside the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Border {
    /// Leave the pixel at the background value (zero).
    #[default]
    Background,
    /// Clamp the location into the source, repeating the edge pixels outwards.
    Replicate,
}

/// Settings for [`warp_interpolated_with`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WarpOptions {
    pub kernel: CubicKernel,
    pub border: Border,
    /// Size of the destination. Defaults to the source's size.
    pub output_dims: Option<(usize, usize)>,
}

/// Resamples `source` into the reference frame without interpolation.
///
/// `h` must map reference-frame coordinates to source-frame coordinates. Every
/// destination pixel `(x, y)` is sent through `h`, rounded to the nearest source
/// pixel (halves round up) and, if that pixel exists, all its channels are copied.
/// Pixels that land outside the source keep the background value, as do
/// destination channels the source does not have.
///
/// The destination has shape `reference_dims`.
pub fn warp_nearest<T: Sample>(
    h: &HomographyMatrix,
    source: &Raster<T>,
    reference_dims: Dims,
) -> Raster<T> {
    trace!(
        "nearest warp of {:?} into {:?}",
        source.dims(),
        reference_dims
    );
    let mut destination = Raster::new(reference_dims);
    let m = h.matrix();
    let channels = reference_dims.channels.min(source.channels());
    let row_len = reference_dims.width * reference_dims.channels;
    let process_row = |(y, row): (usize, &mut [T])| {
        for (x, out) in row.chunks_exact_mut(reference_dims.channels).enumerate() {
            let Some((sx, sy)) = map_pixel(&m, x, y) else {
                continue;
            };
            let (sx, sy) = ((sx + 0.5).floor(), (sy + 0.5).floor());
            if sx >= 0.0
                && sy >= 0.0
                && sx < source.width() as f64
                && sy < source.height() as f64
            {
                let pixel = source.pixel(sx as usize, sy as usize);
                out[..channels].copy_from_slice(&pixel[..channels]);
            }
        }
    };
    if row_len == 0 {
        return destination;
    }
    #[cfg(not(feature = "rayon"))]
    destination
        .data_mut()
        .chunks_exact_mut(row_len)
        .enumerate()
        .for_each(process_row);
    #[cfg(feature = "rayon")]
    destination
        .data_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(process_row);
    destination
}

/// Resamples `source` through `h` with the default bicubic kernel.
///
/// The destination has the source's size and channel count. See
/// [`warp_interpolated_with`].
pub fn warp_interpolated<T: Sample>(h: &HomographyMatrix, source: &Raster<T>) -> Raster<T> {
    warp_interpolated_with(h, source, &WarpOptions::default())
}

/// Resamples `source` through `h`, reconstructing the image with a cubic kernel.
///
/// `h` maps destination (reference-frame) coordinates to source coordinates.
/// Each destination pixel is the kernel-weighted sum of the 4x4 source pixels
/// around its mapped location, computed per channel; taps that fall off the
/// source reuse the nearest edge pixel. With [`Border::Background`] a pixel whose
/// location does not round into the source is left at zero, the same footprint
/// [`warp_nearest`] fills.
pub fn warp_interpolated_with<T: Sample>(
    h: &HomographyMatrix,
    source: &Raster<T>,
    options: &WarpOptions,
) -> Raster<T> {
    let (width, height) = options
        .output_dims
        .unwrap_or((source.width(), source.height()));
    let dims = Dims::new(width, height, source.channels());
    trace!("interpolated warp of {:?} into {:?}", source.dims(), dims);
    let mut destination = Raster::new(dims);
    if dims.is_empty() || source.dims().is_empty() {
        return destination;
    }
    let m = h.matrix();
    let row_len = dims.width * dims.channels;
    let process_row = |(y, row): (usize, &mut [T])| {
        let mut acc = vec![0.0; dims.channels];
        for (x, out) in row.chunks_exact_mut(dims.channels).enumerate() {
            let Some((sx, sy)) = map_pixel(&m, x, y) else {
                continue;
            };
            let (sx, sy) = match options.border {
                Border::Background => {
                    if !covers(sx, source.width()) || !covers(sy, source.height()) {
                        continue;
                    }
                    (sx, sy)
                }
                Border::Replicate => (
                    sx.clamp(0.0, (source.width() - 1) as f64),
                    sy.clamp(0.0, (source.height() - 1) as f64),
                ),
            };
            sample_cubic(source, &options.kernel, sx, sy, &mut acc);
            for (o, &v) in out.iter_mut().zip(&acc) {
                *o = T::from_f64(v);
            }
        }
    };
    #[cfg(not(feature = "rayon"))]
    destination
        .data_mut()
        .chunks_exact_mut(row_len)
        .enumerate()
        .for_each(process_row);
    #[cfg(feature = "rayon")]
    destination
        .data_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(process_row);
    destination
}

/// Sends pixel `(x, y)` through `m` and divides by `w`.
///
/// `None` when the pixel maps to infinity.
#[inline]
fn map_pixel(m: &Matrix3<f64>, x: usize, y: usize) -> Option<(f64, f64)> {
    let (x, y) = (x as f64, y as f64);
    let w = m[(2, 0)] * x + m[(2, 1)] * y + m[(2, 2)];
    let sx = (m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)]) / w;
    let sy = (m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)]) / w;
    if sx.is_finite() && sy.is_finite() {
        Some((sx, sy))
    } else {
        None
    }
}

/// Does coordinate `s` round to a pixel index in `0..len`?
#[inline]
fn covers(s: f64, len: usize) -> bool {
    s >= -0.5 && s < len as f64 - 0.5
}

/// Evaluates the separable 4x4 cubic filter at `(sx, sy)` into `acc`.
fn sample_cubic<T: Sample>(
    source: &Raster<T>,
    kernel: &CubicKernel,
    sx: f64,
    sy: f64,
    acc: &mut [f64],
) {
    let (fx, fy) = (sx.floor(), sy.floor());
    let wx = kernel.weights(sx - fx);
    let wy = kernel.weights(sy - fy);
    let clamp = |v: f64, len: usize| v.max(0.0).min((len - 1) as f64) as usize;
    let mut xs = [0usize; 4];
    let mut ys = [0usize; 4];
    for k in 0..4 {
        let offset = k as f64 - 1.0;
        xs[k] = clamp(fx + offset, source.width());
        ys[k] = clamp(fy + offset, source.height());
    }
    acc.iter_mut().for_each(|a| *a = 0.0);
    for (&y, &wy) in ys.iter().zip(&wy) {
        for (&x, &wx) in xs.iter().zip(&wx) {
            let weight = wx * wy;
            if weight == 0.0 {
                continue;
            }
            for (a, &v) in acc.iter_mut().zip(source.pixel(x, y)) {
                *a += weight * v.to_f64();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homography_core::Point2D;

    fn translation(tx: f64, ty: f64) -> HomographyMatrix {
        HomographyMatrix::from_row_slice(&[1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0])
    }

    fn ramp(width: usize, height: usize) -> Raster<u8> {
        Raster::from_fn(Dims::new(width, height, 1), |x, y, _| (x * 10 + y) as u8)
    }

    #[test]
    fn nearest_identity_copies_the_source() {
        let source = ramp(6, 5);
        let out = warp_nearest(&HomographyMatrix::identity(), &source, source.dims());
        assert_eq!(out, source);
    }

    #[test]
    fn nearest_translation_shifts_and_leaves_background() {
        let source = ramp(6, 5);
        let out = warp_nearest(&translation(2.0, 1.0), &source, source.dims());
        // Destination (x, y) reads source (x + 2, y + 1).
        assert_eq!(out.get(0, 0, 0), source.get(2, 1, 0));
        assert_eq!(out.get(3, 3, 0), source.get(5, 4, 0));
        // Off the right and bottom edges of the source.
        assert_eq!(out.get(4, 0, 0), Some(0));
        assert_eq!(out.get(0, 4, 0), Some(0));
    }

    #[test]
    fn nearest_rounds_halves_up() {
        let source = ramp(4, 4);
        // -0.5 rounds to 0 and stays inside the source.
        let out = warp_nearest(&translation(-0.5, -0.5), &source, source.dims());
        assert_eq!(out.get(0, 0, 0), source.get(0, 0, 0));
        assert_eq!(out.get(2, 1, 0), source.get(2, 1, 0));
        // 1.5 rounds to 2.
        let out = warp_nearest(&translation(1.5, 0.0), &source, source.dims());
        assert_eq!(out.get(0, 0, 0), source.get(2, 0, 0));
    }

    #[test]
    fn nearest_uses_reference_dims() {
        let source = Raster::from_fn(Dims::new(4, 4, 3), |_, _, c| c as u8 + 1);
        let out = warp_nearest(&HomographyMatrix::identity(), &source, Dims::new(6, 2, 4));
        assert_eq!(out.dims(), Dims::new(6, 2, 4));
        assert_eq!(out.pixel(1, 1), &[1, 2, 3, 0]);
        assert_eq!(out.pixel(5, 1), &[0, 0, 0, 0]);
    }

    #[test]
    fn points_at_infinity_are_background() {
        let source = Raster::from_fn(Dims::new(4, 4, 1), |_, _, _| 9u8);
        // w = 1 - x vanishes on the column x = 1.
        let h = HomographyMatrix::from_row_slice(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 1.0]);
        let out = warp_nearest(&h, &source, source.dims());
        assert_eq!(out.get(1, 2, 0), Some(0));
        let out = warp_interpolated(&h, &source);
        assert_eq!(out.get(1, 2, 0), Some(0));
    }

    #[test]
    fn interpolated_identity_is_exact() {
        let source = ramp(7, 6);
        let out = warp_interpolated(&HomographyMatrix::identity(), &source);
        assert_eq!(out, source);
    }

    #[test]
    fn interpolated_integer_translation_matches_nearest_inside() {
        let source = ramp(8, 8);
        let h = translation(1.0, 2.0);
        let near = warp_nearest(&h, &source, source.dims());
        let smooth = warp_interpolated(&h, &source);
        for y in 0..6 {
            for x in 0..7 {
                assert_eq!(near.get(x, y, 0), smooth.get(x, y, 0), "at ({}, {})", x, y);
            }
        }
        assert_eq!(smooth.get(7, 0, 0), Some(0));
    }

    #[test]
    fn constant_image_stays_constant() {
        let source = Raster::from_fn(Dims::new(10, 10, 2), |_, _, c| 100.0f32 + c as f32);
        let h = HomographyMatrix::from_row_slice(&[
            0.9, 0.05, 0.7, -0.03, 1.1, 0.2, 1e-3, -2e-3, 1.0,
        ]);
        let out = warp_interpolated(&h, &source);
        let m = h.matrix();
        for y in 0..10 {
            for x in 0..10 {
                let inside = map_pixel(&m, x, y)
                    .map_or(false, |(sx, sy)| covers(sx, 10) && covers(sy, 10));
                let expected: &[f32] = if inside { &[100.0, 101.0] } else { &[0.0, 0.0] };
                for (got, want) in out.pixel(x, y).iter().zip(expected) {
                    assert!((got - want).abs() < 1e-3, "({}, {}): {} != {}", x, y, got, want);
                }
            }
        }
    }

    #[test]
    fn half_pixel_shift_interpolates_between_samples() {
        let source = Raster::from_fn(Dims::new(8, 1, 1), |x, _, _| x as f32 * 10.0);
        let options = WarpOptions {
            kernel: CubicKernel::catmull_rom(),
            ..Default::default()
        };
        let out = warp_interpolated_with(&translation(0.5, 0.0), &source, &options);
        // Cubic interpolation reproduces linear ramps away from the edges.
        for x in 1..6 {
            let want = x as f32 * 10.0 + 5.0;
            assert!((out.get(x, 0, 0).unwrap() - want).abs() < 1e-4);
        }
    }

    #[test]
    fn replicate_border_extends_edges() {
        let source = Raster::from_fn(Dims::new(4, 4, 1), |_, _, _| 50u8);
        let options = WarpOptions {
            border: Border::Replicate,
            output_dims: Some((6, 6)),
            ..Default::default()
        };
        let out = warp_interpolated_with(&translation(-3.0, -3.0), &source, &options);
        assert_eq!(out.dims(), Dims::new(6, 6, 1));
        assert!(out.data().iter().all(|&v| v == 50));
    }

    #[test]
    fn mapped_corners_agree_with_transform_point() {
        let h = HomographyMatrix::from_row_slice(&[1.2, 0.1, 3.0, -0.2, 0.8, 1.0, 1e-3, 2e-3, 1.0]);
        let (sx, sy) = map_pixel(&h.matrix(), 5, 7).unwrap();
        let p = h.transform_point(Point2D::new(5.0, 7.0)).unwrap();
        assert!((sx - p.x).abs() < 1e-12 && (sy - p.y).abs() < 1e-12);
    }
}

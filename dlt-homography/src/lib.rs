//! Planar homography estimation by the
//! [direct linear transform](https://en.wikipedia.org/wiki/Direct_linear_transformation).
//!
//! Given at least eight index-aligned correspondences between a reference image
//! and a source image, [`Dlt`] finds the [`HomographyMatrix`] `H` that maps
//! reference-frame points onto source-frame points:
//!
//! ```text
//! s * [x_src, y_src, 1]^T = H * [x_ref, y_ref, 1]^T
//! ```
//!
//! Every correspondence contributes two rows to a `2N x 9` design matrix `A`
//! and `H` is the right singular vector of `A` belonging to its smallest singular
//! value, reshaped row-major. That vector minimises `|A h|` under `|h| = 1`, so
//! the result has unit Frobenius norm and is **not** scaled to `H[2][2] = 1`;
//! use [`HomographyMatrix::normalized`] when that form is needed.
//!
//! ```
//! use dlt_homography::Dlt;
//! use homography_core::{CorrespondenceSet, HomographyMatrix, Point2D};
//!
//! let truth = HomographyMatrix::from_row_slice(&[1.0, 0.1, 4.0, 0.0, 0.9, -2.0, 1e-4, 0.0, 1.0]);
//! let dst: Vec<Point2D> = (0..9)
//!     .map(|i| Point2D::new((i % 3) as f64 * 50.0, (i / 3) as f64 * 50.0))
//!     .collect();
//! let src: Vec<Point2D> = dst.iter().map(|&p| truth.transform_point(p).unwrap()).collect();
//!
//! let set = CorrespondenceSet::new(&src[..], &dst[..]).unwrap();
//! let estimate = Dlt::new().estimate(&set).unwrap();
//! assert!(estimate.homography.approx_eq_projective(&truth, 1e-8));
//! assert!(estimate.residual() < 1e-6);
//! ```

mod conditioning;
mod estimate;

pub use estimate::Estimate;

use float_ord::FloatOrd;
use homography_core::{
    nalgebra::{DMatrix, SVD},
    CorrespondenceError, CorrespondenceSet, HomographyMatrix, Point2D,
};
use log::*;
use std::cmp::Reverse;
use thiserror::Error;

/// The number of unknowns in a homography.
const DOF: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EstimationError {
    #[error(transparent)]
    Correspondence(#[from] CorrespondenceError),
    #[error("singular value decomposition did not converge within {max_iterations} iterations")]
    SvdNotConverged { max_iterations: usize },
}

/// Estimates a homography from a [`CorrespondenceSet`] with the direct linear transform.
#[derive(Copy, Clone, Debug)]
pub struct Dlt {
    /// Convergence threshold handed to [`SVD::try_new`].
    pub epsilon: f64,
    /// Iteration cap handed to [`SVD::try_new`]. `0` means no cap, which is what
    /// `nalgebra` itself uses for `Matrix::svd`.
    pub max_iterations: usize,
    /// Condition both point sets (centroid at the origin, mean distance `sqrt(2)`)
    /// before building the design matrix.
    ///
    /// This improves accuracy for large pixel coordinates. The returned singular
    /// values are then those of the conditioned system.
    pub precondition: bool,
    /// An estimate is flagged degenerate when the two smallest singular values
    /// differ by no more than this fraction of the largest one.
    pub degeneracy_ratio: f64,
}

impl Dlt {
    pub fn new() -> Self {
        Default::default()
    }

    /// A `Dlt` with point conditioning turned on.
    pub fn preconditioned() -> Self {
        Self {
            precondition: true,
            ..Default::default()
        }
    }

    /// Estimates the homography mapping `set.dst()` (reference frame) onto
    /// `set.src()` (source frame).
    ///
    /// Poorly constrained sets still produce a best-effort matrix; inspect
    /// [`Estimate::residual`] and [`Estimate::is_degenerate`] to judge it.
    pub fn estimate(&self, set: &CorrespondenceSet) -> Result<Estimate, EstimationError> {
        if self.precondition {
            let (src, src_transform) = conditioning::condition(set.src());
            let (dst, dst_transform) = conditioning::condition(set.dst());
            let (conditioned, singular_values) = self.solve(&src, &dst)?;
            // H = T_src^-1 * H' * T_dst
            let homography = HomographyMatrix::new(
                src_transform.inverse() * conditioned.matrix() * dst_transform.matrix(),
            );
            let homography = homography.unit_norm().unwrap_or(homography);
            Ok(self.finish(homography, singular_values))
        } else {
            let (homography, singular_values) = self.solve(set.src(), set.dst())?;
            Ok(self.finish(homography, singular_values))
        }
    }

    fn solve(
        &self,
        src: &[Point2D],
        dst: &[Point2D],
    ) -> Result<(HomographyMatrix, [f64; DOF]), EstimationError> {
        let not_converged = EstimationError::SvdNotConverged {
            max_iterations: self.max_iterations,
        };
        let design = encode_dlt_equations(src, dst);
        let svd = SVD::try_new(design, false, true, self.epsilon, self.max_iterations)
            .ok_or(not_converged)?;
        let v_t = svd.v_t.ok_or(not_converged)?;

        // Sort descending ourselves rather than relying on the decomposition's order.
        let mut order = [0usize; DOF];
        for (i, ix) in order.iter_mut().enumerate() {
            *ix = i;
        }
        order.sort_by_key(|&ix| Reverse(FloatOrd(svd.singular_values[ix])));
        let mut singular_values = [0.0; DOF];
        for (value, &ix) in singular_values.iter_mut().zip(&order) {
            *value = svd.singular_values[ix];
        }

        let mut h = [0.0; DOF];
        for (entry, &v) in h.iter_mut().zip(v_t.row(order[DOF - 1]).iter()) {
            *entry = v;
        }
        trace!("singular values = {:?}", singular_values);
        Ok((HomographyMatrix::from_row_slice(&h), singular_values))
    }

    fn finish(&self, homography: HomographyMatrix, singular_values: [f64; DOF]) -> Estimate {
        let gap = singular_values[DOF - 2] - singular_values[DOF - 1];
        let degenerate = gap <= self.degeneracy_ratio * singular_values[0];
        debug!(
            "goodness of fit = {}, degenerate = {}",
            singular_values[DOF - 1],
            degenerate
        );
        Estimate::new(homography, singular_values, degenerate)
    }
}

impl Default for Dlt {
    fn default() -> Self {
        Self {
            epsilon: f64::EPSILON,
            max_iterations: 0,
            precondition: false,
            degeneracy_ratio: 1e-12,
        }
    }
}

/// Estimates the homography mapping `dst` (reference frame) onto `src` (source frame)
/// with a default [`Dlt`].
///
/// The counts are validated before anything else is computed.
pub fn estimate(src: &[Point2D], dst: &[Point2D]) -> Result<Estimate, EstimationError> {
    let set = CorrespondenceSet::new(src, dst)?;
    Dlt::new().estimate(&set)
}

/// Builds the `2N x 9` design matrix.
///
/// With `(x1, y1)` a reference point and `(x2, y2)` its source match, the rows
/// encode `x2 = (h0 x1 + h1 y1 + h2) / (h6 x1 + h7 y1 + h8)` and the same for
/// `y2`, multiplied out so that no division remains.
fn encode_dlt_equations(src: &[Point2D], dst: &[Point2D]) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(2 * src.len(), DOF);
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        let (x1, y1) = (d.x, d.y);
        let (x2, y2) = (s.x, s.y);
        out.row_mut(2 * i).copy_from_slice(&[
            -x1,
            -y1,
            -1.0,
            0.0,
            0.0,
            0.0,
            x2 * x1,
            x2 * y1,
            x2,
        ]);
        out.row_mut(2 * i + 1).copy_from_slice(&[
            0.0,
            0.0,
            0.0,
            -x1,
            -y1,
            -1.0,
            y2 * x1,
            y2 * y1,
            y2,
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_rows_follow_the_dlt_layout() {
        let src = [Point2D::new(5.0, 7.0)];
        let dst = [Point2D::new(2.0, 3.0)];
        let a = encode_dlt_equations(&src, &dst);
        assert_eq!(a.shape(), (2, 9));
        let row0: Vec<f64> = a.row(0).iter().copied().collect();
        let row1: Vec<f64> = a.row(1).iter().copied().collect();
        assert_eq!(row0, vec![-2.0, -3.0, -1.0, 0.0, 0.0, 0.0, 10.0, 15.0, 5.0]);
        assert_eq!(row1, vec![0.0, 0.0, 0.0, -2.0, -3.0, -1.0, 14.0, 21.0, 7.0]);
    }

    #[test]
    fn count_is_checked_before_anything_else() {
        let pts = vec![Point2D::new(0.0, 0.0); 7];
        assert_eq!(
            estimate(&pts, &pts).unwrap_err(),
            EstimationError::Correspondence(CorrespondenceError::InvalidCorrespondenceCount {
                src: 7,
                dst: 7,
                minimum: 8,
            })
        );
    }

    #[test]
    fn identical_points_are_flagged_degenerate() {
        let pts = vec![Point2D::new(3.0, 4.0); 8];
        let estimate = estimate(&pts, &pts).unwrap();
        assert!(estimate.is_degenerate());
    }

    #[test]
    fn singular_values_are_descending() {
        let dst: Vec<Point2D> = (0..12)
            .map(|i| Point2D::new((i % 4) as f64 * 13.0 + 1.0, (i / 4) as f64 * 17.0 + 2.0))
            .collect();
        let src: Vec<Point2D> = dst.iter().map(|p| Point2D::new(p.x + 0.5, p.y * 1.1)).collect();
        let estimate = estimate(&src, &dst).unwrap();
        assert!(estimate
            .singular_values
            .windows(2)
            .all(|w| w[0] >= w[1] && w[1] >= 0.0));
        assert!(!estimate.is_degenerate());
    }
}

use crate::Point2D;
use derive_more::{AsRef, Deref, Into};
use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Below this magnitude `H[2][2]` is treated as zero by [`HomographyMatrix::normalized`].
const NORMALIZE_EPSILON: f64 = 1e-12;

/// A 3x3 projective transform mapping reference-frame points to source-frame points.
///
/// ```text
/// s * [x_src, y_src, 1]^T = H * [x_ref, y_ref, 1]^T
/// ```
///
/// A homography is only defined up to scale. Estimators in this crate family
/// return it with unit Frobenius norm, so `H[2][2]` is generally **not** `1`.
/// Call [`HomographyMatrix::normalized`] explicitly when that form is needed.
///
/// The matrix is read-only once created; recomputation produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, AsRef, Deref, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct HomographyMatrix(Matrix3<f64>);

impl HomographyMatrix {
    /// Wraps a matrix that maps reference-frame points to source-frame points.
    pub fn new(matrix: Matrix3<f64>) -> Self {
        Self(matrix)
    }

    /// Builds the matrix from its row-major entries, `H[i][j] = h[i * 3 + j]`.
    pub fn from_row_slice(h: &[f64; 9]) -> Self {
        Self(Matrix3::from_row_slice(h))
    }

    /// The transform that leaves every point where it is.
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        self.0
    }

    /// The row-major 9-vector form, `h[i * 3 + j] = H[i][j]`.
    pub fn flattened(&self) -> [f64; 9] {
        let m = &self.0;
        [
            m[(0, 0)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 0)],
            m[(1, 1)],
            m[(1, 2)],
            m[(2, 0)],
            m[(2, 1)],
            m[(2, 2)],
        ]
    }

    /// Applies the transform to a homogeneous coordinate without dividing.
    pub fn transform_homogeneous(&self, v: Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }

    /// Maps a reference-frame point into the source frame.
    ///
    /// Returns `None` when the point maps to infinity.
    pub fn transform_point(&self, p: Point2D) -> Option<Point2D> {
        Point2D::from_homogeneous(self.transform_homogeneous(p.homogeneous()))
    }

    /// Rescales the matrix so that `H[2][2] == 1`.
    ///
    /// Returns `None` if `H[2][2]` is (numerically) zero, in which case no such
    /// scaling exists.
    pub fn normalized(&self) -> Option<Self> {
        let s = self.0[(2, 2)];
        if s.abs() < NORMALIZE_EPSILON {
            return None;
        }
        Some(Self(self.0 / s))
    }

    /// Rescales the matrix to unit Frobenius norm, preserving its sign.
    pub fn unit_norm(&self) -> Option<Self> {
        let norm = self.0.norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        Some(Self(self.0 / norm))
    }

    /// The transform in the opposite direction (source frame to reference frame).
    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Whether two matrices describe the same transform, ignoring scale and sign.
    ///
    /// Both are brought to unit norm and compared entrywise against `epsilon`.
    pub fn approx_eq_projective(&self, other: &Self, epsilon: f64) -> bool {
        let (Some(a), Some(b)) = (self.unit_norm(), other.unit_norm()) else {
            return false;
        };
        let same = (a.0 - b.0).amax() < epsilon;
        let flipped = (a.0 + b.0).amax() < epsilon;
        same || flipped
    }
}

impl Default for HomographyMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix3<f64>> for HomographyMatrix {
    fn from(matrix: Matrix3<f64>) -> Self {
        Self(matrix)
    }
}

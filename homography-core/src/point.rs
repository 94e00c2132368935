use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::{Point2, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A point on an image frame in pixel coordinates.
///
/// The `x` axis points right and the `y` axis points down, with `(0, 0)` at the
/// center of the top-left pixel. Pixel `(x, y)` of a raster therefore sits at
/// the integer coordinate `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Point2D(pub Point2<f64>);

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point2::new(x, y))
    }

    /// Retrieve the homogeneous coordinate `(x, y, 1)`.
    pub fn homogeneous(self) -> Vector3<f64> {
        self.0.to_homogeneous()
    }

    /// Recover the euclidean point from a homogeneous coordinate.
    ///
    /// Returns `None` for points at infinity (`w == 0`) or when the division
    /// does not produce finite coordinates.
    pub fn from_homogeneous(v: Vector3<f64>) -> Option<Self> {
        if v.z == 0.0 {
            return None;
        }
        let x = v.x / v.z;
        let y = v.y / v.z;
        if x.is_finite() && y.is_finite() {
            Some(Self::new(x, y))
        } else {
            None
        }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        nalgebra::distance(&self.0, &other.0)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Allows the retrieval of the point on the image an annotation came from.
pub trait ImagePoint {
    /// Retrieves the point on the image
    fn image_point(&self) -> Point2D;
}

impl ImagePoint for Point2D {
    fn image_point(&self) -> Point2D {
        *self
    }
}

/// A point annotated with an integer label.
///
/// Annotation tools typically name the corresponding points of two images with the
/// same number. The label is only used to pair points up; see
/// [`CorrespondenceSet::from_labeled`](crate::CorrespondenceSet::from_labeled).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LabeledPoint {
    pub label: u32,
    pub point: Point2D,
}

impl LabeledPoint {
    pub fn new(label: u32, x: f64, y: f64) -> Self {
        Self {
            label,
            point: Point2D::new(x, y),
        }
    }
}

impl ImagePoint for LabeledPoint {
    fn image_point(&self) -> Point2D {
        self.point
    }
}

//! Mapping positions between several views of the same planar scene.
//!
//! A viewer that shows a reference image next to other views wants to move a
//! cursor in the reference and show the matching position everywhere else. That
//! takes one homography per view, which [`ViewHomographies`] estimates on first
//! use and keeps until the view's annotations change.

use crate::estimate::{Dlt, Estimate, EstimationError};
use crate::{CorrespondenceSet, HomographyMatrix, LabeledPoint, Point2D};
use log::*;
use std::collections::HashMap;
use std::hash::Hash;

/// Homographies from a reference view into other views, keyed by view.
///
/// Estimation failures (for instance a view with fewer than eight annotated
/// points) are not propagated: the view is given the identity so that positions
/// pass through unchanged. Call [`ViewHomographies::invalidate`] whenever the
/// annotations of the reference or of a view change.
#[derive(Debug, Clone)]
pub struct ViewHomographies<K> {
    dlt: Dlt,
    homographies: HashMap<K, HomographyMatrix>,
}

impl<K> ViewHomographies<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_estimator(Dlt::new())
    }

    pub fn with_estimator(dlt: Dlt) -> Self {
        Self {
            dlt,
            homographies: HashMap::new(),
        }
    }

    /// The cached homography for `view`, if any.
    pub fn get(&self, view: &K) -> Option<&HomographyMatrix> {
        self.homographies.get(view)
    }

    /// Stores a homography computed elsewhere, returning the one it replaces.
    pub fn insert(&mut self, view: K, homography: HomographyMatrix) -> Option<HomographyMatrix> {
        self.homographies.insert(view, homography)
    }

    /// Returns the cached homography for `view`, or estimates it from points that
    /// are already paired by index (`reference[i]` with `view_points[i]`).
    pub fn get_or_estimate(
        &mut self,
        view: K,
        reference: &[Point2D],
        view_points: &[Point2D],
    ) -> HomographyMatrix {
        let dlt = self.dlt;
        *self.homographies.entry(view).or_insert_with(|| {
            or_identity(
                CorrespondenceSet::new(view_points, reference)
                    .map_err(Into::into)
                    .and_then(|set| dlt.estimate(&set)),
            )
        })
    }

    /// Like [`ViewHomographies::get_or_estimate`], pairing the points by label first.
    pub fn get_or_estimate_labeled(
        &mut self,
        view: K,
        reference: &[LabeledPoint],
        view_points: &[LabeledPoint],
    ) -> HomographyMatrix {
        let dlt = self.dlt;
        *self.homographies.entry(view).or_insert_with(|| {
            or_identity(
                CorrespondenceSet::from_labeled(
                    view_points.iter().copied(),
                    reference.iter().copied(),
                )
                .map_err(Into::into)
                .and_then(|set| dlt.estimate(&set)),
            )
        })
    }

    /// Maps a reference-view position into `view` with the cached homography.
    ///
    /// Returns `None` if nothing is cached for `view` or the point maps to infinity.
    pub fn map_point(&self, view: &K, point: Point2D) -> Option<Point2D> {
        self.homographies.get(view)?.transform_point(point)
    }

    /// Forgets the homography of `view` so that the next lookup re-estimates it.
    pub fn invalidate(&mut self, view: &K) -> Option<HomographyMatrix> {
        self.homographies.remove(view)
    }

    /// Forgets every view, for instance after the reference annotations changed.
    pub fn clear(&mut self) {
        self.homographies.clear();
    }

    pub fn len(&self) -> usize {
        self.homographies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homographies.is_empty()
    }
}

impl<K> Default for ViewHomographies<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

fn or_identity(estimate: Result<Estimate, EstimationError>) -> HomographyMatrix {
    match estimate {
        Ok(estimate) => estimate.homography,
        Err(e) => {
            warn!("falling back to the identity for a view: {}", e);
            HomographyMatrix::identity()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn shifted(points: &[Point2D], dx: f64, dy: f64) -> Vec<Point2D> {
        points.iter().map(|p| Point2D::new(p.x + dx, p.y + dy)).collect()
    }

    fn reference() -> Vec<Point2D> {
        (0..9)
            .map(|i| Point2D::new((i % 3) as f64 * 40.0 + 2.0, (i / 3) as f64 * 30.0 + 1.0))
            .collect()
    }

    #[test]
    fn maps_positions_into_each_view() {
        let reference = reference();
        let mut views = ViewHomographies::new();
        views.get_or_estimate(1u32, &reference, &shifted(&reference, 5.0, -3.0));
        views.get_or_estimate(2u32, &reference, &shifted(&reference, -10.0, 0.0));
        let cursor = Point2D::new(33.0, 21.0);
        assert_relative_eq!(
            views.map_point(&1, cursor).unwrap().0,
            Point2D::new(38.0, 18.0).0,
            epsilon = 1e-8
        );
        assert_relative_eq!(
            views.map_point(&2, cursor).unwrap().0,
            Point2D::new(23.0, 21.0).0,
            epsilon = 1e-8
        );
        assert!(views.map_point(&3, cursor).is_none());
    }

    #[test]
    fn too_few_points_fall_back_to_identity() {
        let reference = reference();
        let mut views = ViewHomographies::new();
        let h = views.get_or_estimate("sparse", &reference[..5], &reference[..5]);
        assert_eq!(h, HomographyMatrix::identity());
        let cursor = Point2D::new(7.0, 8.0);
        assert_eq!(views.map_point(&"sparse", cursor), Some(cursor));
    }

    #[test]
    fn cached_until_invalidated() {
        let reference = reference();
        let mut views = ViewHomographies::new();
        let first = views.get_or_estimate(0u8, &reference, &shifted(&reference, 1.0, 1.0));
        // Different points, but the cached matrix is returned.
        let again = views.get_or_estimate(0u8, &reference, &shifted(&reference, 50.0, 0.0));
        assert_eq!(first, again);

        assert_eq!(views.invalidate(&0), Some(first));
        let fresh = views.get_or_estimate(0u8, &reference, &shifted(&reference, 50.0, 0.0));
        assert!(!fresh.approx_eq_projective(&first, 1e-6));
        views.clear();
        assert!(views.is_empty());
    }

    #[test]
    fn labeled_views_are_paired_by_label() {
        let reference: Vec<LabeledPoint> = reference()
            .into_iter()
            .enumerate()
            .map(|(i, p)| LabeledPoint { label: i as u32, point: p })
            .collect();
        // Annotated in reverse order in the other view.
        let view: Vec<LabeledPoint> = reference
            .iter()
            .rev()
            .map(|lp| LabeledPoint::new(lp.label, lp.point.x + 2.0, lp.point.y))
            .collect();
        let mut views = ViewHomographies::new();
        views.get_or_estimate_labeled('b', &reference, &view);
        let mapped = views.map_point(&'b', Point2D::new(10.0, 10.0)).unwrap();
        assert_relative_eq!(mapped.0, Point2D::new(12.0, 10.0).0, epsilon = 1e-8);
    }
}

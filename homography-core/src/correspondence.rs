use crate::{CorrespondenceError, LabeledPoint, Point2D};
use std::borrow::Cow;

/// The number of correspondences required to estimate a homography.
///
/// Four points already determine a homography exactly, but the linear system is
/// only trusted to average out annotation noise from eight pairs on.
pub const MIN_CORRESPONDENCES: usize = 8;

/// Two index-aligned sequences of points: `src[i]` (in the source image) is the
/// same physical point as `dst[i]` (in the reference image).
///
/// The invariant `src.len() == dst.len() >= MIN_CORRESPONDENCES` is enforced on
/// construction, so every `CorrespondenceSet` that exists can be handed to an
/// estimator. Points passed in as slices are borrowed rather than copied.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrespondenceSet<'a> {
    src: Cow<'a, [Point2D]>,
    dst: Cow<'a, [Point2D]>,
}

impl<'a> CorrespondenceSet<'a> {
    /// Pairs `src[i]` with `dst[i]`.
    ///
    /// Fails with [`CorrespondenceError::InvalidCorrespondenceCount`] when either
    /// side holds fewer than [`MIN_CORRESPONDENCES`] points or the sides differ
    /// in length.
    pub fn new(
        src: impl Into<Cow<'a, [Point2D]>>,
        dst: impl Into<Cow<'a, [Point2D]>>,
    ) -> Result<Self, CorrespondenceError> {
        let src = src.into();
        let dst = dst.into();
        check_counts(src.len(), dst.len())?;
        Ok(Self { src, dst })
    }

    /// Builds a set from labeled annotations of both images.
    ///
    /// Each side is sorted by label and the points are then paired by index, so
    /// the `n`th smallest label of `dst` is matched with the `n`th smallest label
    /// of `src`. A label used twice on one side is rejected.
    pub fn from_labeled(
        src: impl IntoIterator<Item = LabeledPoint>,
        dst: impl IntoIterator<Item = LabeledPoint>,
    ) -> Result<CorrespondenceSet<'static>, CorrespondenceError> {
        let src = sorted_by_label(src)?;
        let dst = sorted_by_label(dst)?;
        CorrespondenceSet::new(src, dst)
    }

    /// Points in the source image (image 2).
    pub fn src(&self) -> &[Point2D] {
        &self.src
    }

    /// Points in the reference image (image 1).
    pub fn dst(&self) -> &[Point2D] {
        &self.dst
    }

    /// Iterates over `(src, dst)` pairs in index order.
    pub fn pairs(&self) -> impl Iterator<Item = (Point2D, Point2D)> + Clone + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }
}

fn check_counts(src: usize, dst: usize) -> Result<(), CorrespondenceError> {
    if src < MIN_CORRESPONDENCES || dst < MIN_CORRESPONDENCES || src != dst {
        return Err(CorrespondenceError::InvalidCorrespondenceCount {
            src,
            dst,
            minimum: MIN_CORRESPONDENCES,
        });
    }
    Ok(())
}

fn sorted_by_label(
    points: impl IntoIterator<Item = LabeledPoint>,
) -> Result<Vec<Point2D>, CorrespondenceError> {
    let mut points: Vec<LabeledPoint> = points.into_iter().collect();
    points.sort_by_key(|p| p.label);
    if let Some(w) = points.windows(2).find(|w| w[0].label == w[1].label) {
        return Err(CorrespondenceError::DuplicateLabel { label: w[0].label });
    }
    Ok(points.into_iter().map(|p| p.point).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Vec<Point2D> {
        (0..n)
            .map(|i| Point2D::new((i % 4) as f64 * 10.0, (i / 4) as f64 * 10.0))
            .collect()
    }

    #[test]
    fn seven_is_too_few() {
        let pts = grid(7);
        let err = CorrespondenceSet::new(&pts[..], &pts[..]).unwrap_err();
        assert_eq!(
            err,
            CorrespondenceError::InvalidCorrespondenceCount {
                src: 7,
                dst: 7,
                minimum: 8
            }
        );
        assert!(!err.is_mismatch());
    }

    #[test]
    fn eight_is_enough() {
        let pts = grid(8);
        let set = CorrespondenceSet::new(&pts[..], &pts[..]).unwrap();
        assert_eq!(set.len(), 8);
        assert!(!set.is_empty());
        assert!(matches!(set.src, Cow::Borrowed(_)));
    }

    #[test]
    fn mismatched_lengths_fail() {
        let a = grid(9);
        let b = grid(10);
        let err = CorrespondenceSet::new(&a[..], &b[..]).unwrap_err();
        assert!(err.is_mismatch());
        assert_eq!(
            err.to_string(),
            "invalid correspondence count (sizes: 9, 10); both sets need the same number \
             of points and at least 8"
        );
    }

    #[test]
    fn labeled_points_are_paired_by_label() {
        let dst = (0..8u32).map(|l| LabeledPoint::new(l + 1, l as f64, 0.0));
        // Same labels, reversed annotation order and shifted by 100 in x.
        let src = (0..8u32)
            .rev()
            .map(|l| LabeledPoint::new(l + 1, l as f64 + 100.0, 0.0));
        let set = CorrespondenceSet::from_labeled(src, dst).unwrap();
        for (s, d) in set.pairs() {
            assert_eq!(s.x - 100.0, d.x);
        }
    }

    #[test]
    fn labels_sort_numerically() {
        // "10" must come after "9", not after "1".
        let labels = [10u32, 1, 9, 2, 8, 3, 7, 4];
        let dst = labels.iter().map(|&l| LabeledPoint::new(l, l as f64, 0.0));
        let src = labels.iter().map(|&l| LabeledPoint::new(l, 0.0, l as f64));
        let set = CorrespondenceSet::from_labeled(src, dst).unwrap();
        let xs: Vec<f64> = set.dst().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0, 7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let dst: Vec<_> = (0..8u32).map(|l| LabeledPoint::new(l, 0.0, 0.0)).collect();
        let mut src = dst.clone();
        src[3].label = 5;
        assert_eq!(
            CorrespondenceSet::from_labeled(src, dst).unwrap_err(),
            CorrespondenceError::DuplicateLabel { label: 5 }
        );
    }
}

use homography_core::{CorrespondenceSet, HomographyMatrix};

/// The outcome of a homography estimation.
///
/// Besides the matrix itself this carries the singular values of the design
/// matrix, which are the only goodness-of-fit information the direct linear
/// transform produces. Nothing here is ever turned into an error: a poorly
/// constrained set still yields a best-effort matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Maps reference-frame points onto source-frame points, with unit Frobenius norm.
    pub homography: HomographyMatrix,
    /// All nine singular values of the design matrix, largest first.
    pub singular_values: [f64; 9],
    degenerate: bool,
}

impl Estimate {
    pub(crate) fn new(
        homography: HomographyMatrix,
        singular_values: [f64; 9],
        degenerate: bool,
    ) -> Self {
        Self {
            homography,
            singular_values,
            degenerate,
        }
    }

    /// The smallest singular value.
    ///
    /// This is `|A h|` for the returned `h`. It is close to zero when the
    /// correspondences agree with a single homography and grows with noise or
    /// mismatched pairs.
    pub fn residual(&self) -> f64 {
        self.singular_values[8]
    }

    /// Whether the two smallest singular values are numerically indistinguishable.
    ///
    /// In that case the null space of the design matrix is more than one
    /// dimensional (for instance when points repeat or are collinear) and the
    /// returned matrix is one arbitrary member of it.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Distance in source pixels between `H * dst[i]` and `src[i]` for every pair.
    ///
    /// Reference points that map to infinity report `f64::INFINITY`.
    pub fn reprojection_errors(&self, set: &CorrespondenceSet) -> Vec<f64> {
        set.pairs()
            .map(|(src, dst)| {
                self.homography
                    .transform_point(dst)
                    .map_or(f64::INFINITY, |mapped| mapped.distance(&src))
            })
            .collect()
    }

    /// Root mean square of [`Estimate::reprojection_errors`].
    pub fn rms_reprojection_error(&self, set: &CorrespondenceSet) -> f64 {
        let errors = self.reprojection_errors(set);
        let sum: f64 = errors.iter().map(|e| e * e).sum();
        (sum / errors.len() as f64).sqrt()
    }
}

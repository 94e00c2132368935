use homography_core::{nalgebra::Matrix3, Point2D};

/// An isotropic similarity `p' = s * (p - c)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Conditioning {
    scale: f64,
    cx: f64,
    cy: f64,
}

impl Conditioning {
    pub(crate) fn matrix(&self) -> Matrix3<f64> {
        let s = self.scale;
        Matrix3::new(s, 0.0, -s * self.cx, 0.0, s, -s * self.cy, 0.0, 0.0, 1.0)
    }

    pub(crate) fn inverse(&self) -> Matrix3<f64> {
        let r = self.scale.recip();
        Matrix3::new(r, 0.0, self.cx, 0.0, r, self.cy, 0.0, 0.0, 1.0)
    }

    fn apply(&self, p: Point2D) -> Point2D {
        Point2D::new(self.scale * (p.x - self.cx), self.scale * (p.y - self.cy))
    }
}

/// Moves the centroid of `points` to the origin and scales them so that their
/// mean distance from it is `sqrt(2)` (Hartley & Zisserman, section 4.4.4).
pub(crate) fn condition(points: &[Point2D]) -> (Vec<Point2D>, Conditioning) {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    let mean_distance = points
        .iter()
        .map(|p| (p.x - cx).hypot(p.y - cy))
        .sum::<f64>()
        / n;
    // All points coincide: only translate.
    let scale = if mean_distance > 1e-12 {
        std::f64::consts::SQRT_2 / mean_distance
    } else {
        1.0
    };
    let conditioning = Conditioning { scale, cx, cy };
    let conditioned = points.iter().map(|&p| conditioning.apply(p)).collect();
    (conditioned, conditioning)
}

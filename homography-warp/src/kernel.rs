/// A two-lobe cubic convolution kernel (Keys, 1981).
///
/// ```text
/// k(t) = (a + 2)|t|^3 - (a + 3)|t|^2 + 1      for |t| <= 1
///        a|t|^3 - 5a|t|^2 + 8a|t| - 4a         for 1 < |t| < 2
///        0                                     otherwise
/// ```
///
/// Every member of this family interpolates (`k(0) = 1`, `k(±1) = k(±2) = 0`)
/// and its integer translates sum to one, so flat regions stay flat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicKernel {
    pub a: f64,
}

impl CubicKernel {
    /// `a = -1.0`, the sharper of the two classic bicubic kernels.
    pub fn bicubic2() -> Self {
        Self { a: -1.0 }
    }

    /// `a = -0.5`, the Catmull-Rom spline.
    pub fn catmull_rom() -> Self {
        Self { a: -0.5 }
    }

    pub fn weight(&self, t: f64) -> f64 {
        let a = self.a;
        let t = t.abs();
        if t <= 1.0 {
            ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0
        } else if t < 2.0 {
            ((a * t - 5.0 * a) * t + 8.0 * a) * t - 4.0 * a
        } else {
            0.0
        }
    }

    /// Weights of the four samples at `floor(s) - 1 ..= floor(s) + 2` for a
    /// sample position `s` whose fractional part is `frac`.
    pub fn weights(&self, frac: f64) -> [f64; 4] {
        [
            self.weight(frac + 1.0),
            self.weight(frac),
            self.weight(1.0 - frac),
            self.weight(2.0 - frac),
        ]
    }
}

impl Default for CubicKernel {
    fn default() -> Self {
        Self::bicubic2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kernels_interpolate() {
        for kernel in [CubicKernel::bicubic2(), CubicKernel::catmull_rom()] {
            assert_eq!(kernel.weight(0.0), 1.0);
            assert_relative_eq!(kernel.weight(1.0), 0.0, epsilon = 1e-15);
            assert_relative_eq!(kernel.weight(-1.0), 0.0, epsilon = 1e-15);
            assert_eq!(kernel.weight(2.0), 0.0);
            assert_eq!(kernel.weight(3.5), 0.0);
            assert_eq!(kernel.weights(0.0), [0.0, 1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn weights_are_a_partition_of_unity() {
        for kernel in [CubicKernel::bicubic2(), CubicKernel::catmull_rom()] {
            for i in 0..=20 {
                let frac = i as f64 / 20.0;
                let sum: f64 = kernel.weights(frac).iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn catmull_rom_midpoint() {
        // Halfway between samples the outer taps are -1/16 and the inner 9/16.
        let w = CubicKernel::catmull_rom().weights(0.5);
        assert_relative_eq!(w[0], -0.0625, epsilon = 1e-15);
        assert_relative_eq!(w[1], 0.5625, epsilon = 1e-15);
        assert_relative_eq!(w[2], 0.5625, epsilon = 1e-15);
        assert_relative_eq!(w[3], -0.0625, epsilon = 1e-15);
    }
}

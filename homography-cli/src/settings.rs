use homography::estimate::Dlt;
use homography::warp::{Border, CubicKernel, WarpOptions};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The interpolation kernels selectable by name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelChoice {
    Bicubic2,
    CatmullRom,
}

impl KernelChoice {
    pub fn kernel(self) -> CubicKernel {
        match self {
            Self::Bicubic2 => CubicKernel::bicubic2(),
            Self::CatmullRom => CubicKernel::catmull_rom(),
        }
    }
}

impl Default for KernelChoice {
    fn default() -> Self {
        Self::Bicubic2
    }
}

impl FromStr for KernelChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bicubic2" => Ok(Self::Bicubic2),
            "catmull-rom" => Ok(Self::CatmullRom),
            other => Err(format!(
                "unknown kernel {:?} (expected bicubic2 or catmull-rom)",
                other
            )),
        }
    }
}

impl fmt::Display for KernelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bicubic2 => "bicubic2",
            Self::CatmullRom => "catmull-rom",
        })
    }
}

/// The settings of the `homography` tool.
///
/// Every field is optional in the JSON file; command-line flags take precedence.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Condition the points before building the DLT system
    #[serde(default = "default_precondition")]
    pub precondition: bool,
    /// The kernel used for the interpolated output
    #[serde(default)]
    pub kernel: KernelChoice,
    /// Repeat the edge pixels of the source instead of leaving the background
    #[serde(default = "default_replicate_border")]
    pub replicate_border: bool,
    /// Fraction of the largest singular value under which the two smallest are
    /// considered equal
    #[serde(default = "default_degeneracy_ratio")]
    pub degeneracy_ratio: f64,
    /// SVD convergence threshold
    #[serde(default = "default_svd_epsilon")]
    pub svd_epsilon: f64,
    /// SVD iteration cap (0 for none)
    #[serde(default = "default_svd_max_iterations")]
    pub svd_max_iterations: usize,
}

impl Settings {
    pub fn dlt(&self) -> Dlt {
        Dlt {
            epsilon: self.svd_epsilon,
            max_iterations: self.svd_max_iterations,
            precondition: self.precondition,
            degeneracy_ratio: self.degeneracy_ratio,
        }
    }

    /// Options for the interpolated warp into a `width` by `height` reference frame.
    pub fn warp_options(&self, width: usize, height: usize) -> WarpOptions {
        WarpOptions {
            kernel: self.kernel.kernel(),
            border: if self.replicate_border {
                Border::Replicate
            } else {
                Border::Background
            },
            output_dims: Some((width, height)),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precondition: default_precondition(),
            kernel: KernelChoice::default(),
            replicate_border: default_replicate_border(),
            degeneracy_ratio: default_degeneracy_ratio(),
            svd_epsilon: default_svd_epsilon(),
            svd_max_iterations: default_svd_max_iterations(),
        }
    }
}

fn default_precondition() -> bool {
    false
}

fn default_replicate_border() -> bool {
    false
}

fn default_degeneracy_ratio() -> f64 {
    Dlt::new().degeneracy_ratio
}

fn default_svd_epsilon() -> f64 {
    Dlt::new().epsilon
}

fn default_svd_max_iterations() -> usize {
    Dlt::new().max_iterations
}

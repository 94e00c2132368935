//! # `homography`
//!
//! Batteries-included planar homography estimation and image warping.
//!
//! This crate gathers the pieces of the workspace in one place for scripts and
//! tools. Libraries should depend on the individual crates instead.
//!
//! The usual flow is:
//!
//! 1. pair up the annotated points of two images into a [`CorrespondenceSet`]
//! 2. [`estimate()`] the [`HomographyMatrix`] that maps the reference image onto the source image
//! 3. resample the source into the reference frame with [`warp::warp_nearest`] or
//!    [`warp::warp_interpolated`]
//!
//! ## Modules
//! * [`mod@estimate`] - estimation of homographies from correspondences
//! * [`warp`] - resampling through a homography
//! * [`views`] - a per-view cache of homographies for mapping positions between views

pub use homography_core::*;

pub use image;

/// Estimation of a homography from point correspondences
#[cfg(feature = "dlt-homography")]
pub mod estimate {
    pub use dlt_homography::{estimate, Dlt, Estimate, EstimationError};
}

#[cfg(feature = "dlt-homography")]
pub use estimate::estimate;

/// Resampling a source image into the reference frame
#[cfg(feature = "homography-warp")]
pub mod warp {
    pub use homography_warp::*;
}

#[cfg(feature = "dlt-homography")]
pub mod views;

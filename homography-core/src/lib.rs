//! # Homography Core
//!
//! Common types shared by the crates that estimate and apply planar homographies.
//! The estimator (`dlt-homography`) and the resampler (`homography-warp`) only
//! talk to each other through the types defined here, so that neither depends on
//! the internals of the other.
//!
//! ## Conventions
//!
//! Two images take part in every computation:
//!
//! * the *reference* image (image 1), whose frame the result is expressed in
//! * the *source* image (image 2), which gets resampled into the reference frame
//!
//! A [`HomographyMatrix`] in this crate family always maps **reference-frame**
//! coordinates to **source-frame** coordinates:
//!
//! ```text
//! s * [x_src, y_src, 1]^T = H * [x_ref, y_ref, 1]^T
//! ```
//!
//! This is the direction a resampler needs: every destination pixel lives in the
//! reference frame and is looked up in the source through `H`. To map the other
//! way use [`HomographyMatrix::try_inverse`].
//!
//! A [`CorrespondenceSet`] pairs `src[i]` with `dst[i]` by index. The pairing is
//! established before the set is built (see [`CorrespondenceSet::from_labeled`])
//! and is never rediscovered by the algorithms.

mod correspondence;
mod error;
mod homography;
mod point;

pub use correspondence::*;
pub use error::*;
pub use homography::*;
pub use nalgebra;
pub use point::*;

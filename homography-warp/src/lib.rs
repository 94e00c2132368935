//! Resampling of a source image into a reference frame through a [`HomographyMatrix`].
//!
//! Two strategies are offered:
//!
//! * [`warp_nearest`] copies the source pixel nearest to each mapped location. No
//!   new values are invented, which makes it the right choice for label images
//!   and for checking an alignment by eye.
//! * [`warp_interpolated`] reconstructs the source with a two-lobe cubic kernel
//!   ([`CubicKernel`]) at every mapped location. It looks smoother and costs
//!   sixteen taps per pixel.
//!
//! Both take a matrix that maps **reference-frame** coordinates to **source-frame**
//! coordinates (what `dlt-homography` estimates), never modify the source and
//! return a freshly allocated [`Raster`]. Enabling the `rayon` feature spreads
//! the rows of the destination over a thread pool.
//!
//! [`HomographyMatrix`]: homography_core::HomographyMatrix

mod kernel;
mod raster;
mod warp;

pub use kernel::*;
pub use raster::*;
pub use warp::*;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("pixel buffer holds {actual} samples but {expected} are required")]
    BufferSize { expected: usize, actual: usize },
    #[error("unsupported image layout: {0}")]
    UnsupportedImage(String),
}

impl DynamicRaster {
    /// [`warp_nearest`] for whichever sample type the raster holds.
    ///
    /// `reference` supplies the destination width and height; the channel count
    /// is the source's.
    pub fn warp_nearest(
        &self,
        h: &homography_core::HomographyMatrix,
        reference: (usize, usize),
    ) -> DynamicRaster {
        let dims = |channels| Dims::new(reference.0, reference.1, channels);
        match self {
            Self::U8(r) => warp_nearest(h, r, dims(r.channels())).into(),
            Self::U16(r) => warp_nearest(h, r, dims(r.channels())).into(),
            Self::F32(r) => warp_nearest(h, r, dims(r.channels())).into(),
        }
    }

    /// [`warp_interpolated_with`] for whichever sample type the raster holds.
    pub fn warp_interpolated(
        &self,
        h: &homography_core::HomographyMatrix,
        options: &WarpOptions,
    ) -> DynamicRaster {
        match self {
            Self::U8(r) => warp_interpolated_with(h, r, options).into(),
            Self::U16(r) => warp_interpolated_with(h, r, options).into(),
            Self::F32(r) => warp_interpolated_with(h, r, options).into(),
        }
    }
}

//! Library half of the `homography` tool.
//!
//! The binary only deals with paths, flags and logging. Everything that turns
//! two decoded images and their annotations into aligned outputs lives here so
//! it can be tested without touching the filesystem.

pub mod points;
pub mod settings;

use homography::estimate::Estimate;
use homography::image::{DynamicImage, GenericImageView, Rgba};
use homography::warp::{DynamicRaster, RasterError};
use homography::{CorrespondenceError, CorrespondenceSet, ImagePoint};
use imageproc::drawing;
use log::*;
use points::Annotations;
use settings::Settings;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    #[error(transparent)]
    Correspondence(#[from] CorrespondenceError),
    #[error(transparent)]
    Estimation(#[from] homography::estimate::EstimationError),
    #[error("failed to convert between image and raster: {0}")]
    Raster(#[from] RasterError),
}

/// Wall-clock time spent in each stage of [`align`].
#[derive(Debug, Default, Copy, Clone)]
pub struct Timings {
    pub estimate: Duration,
    pub nearest: Duration,
    pub interpolated: Duration,
}

/// Everything [`align`] produces.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub estimate: Estimate,
    /// The label-paired points the estimate was computed from.
    pub correspondences: CorrespondenceSet<'static>,
    pub nearest: DynamicImage,
    pub interpolated: DynamicImage,
    pub timings: Timings,
}

/// Estimates the homography from the reference annotations onto the source
/// annotations and resamples `source` into the frame of `reference` both ways.
///
/// Only the size of `reference` is used. Both outputs take that width and
/// height so that they overlay the reference pixel for pixel; the channel
/// count and sample type stay those of `source`.
pub fn align(
    reference: &DynamicImage,
    source: &DynamicImage,
    annotations: &Annotations,
    settings: &Settings,
) -> Result<Alignment, AlignError> {
    let set = CorrespondenceSet::from_labeled(
        annotations.source.iter().copied(),
        annotations.reference.iter().copied(),
    )?;
    debug!("paired {} correspondences", set.len());

    let start = Instant::now();
    let estimate = settings.dlt().estimate(&set)?;
    let estimate_time = start.elapsed();

    let (width, height) = reference.dimensions();
    let (width, height) = (width as usize, height as usize);
    let raster = DynamicRaster::from_dynamic(source)?;

    let start = Instant::now();
    let nearest = raster.warp_nearest(&estimate.homography, (width, height));
    let nearest_time = start.elapsed();

    let start = Instant::now();
    let interpolated = raster.warp_interpolated(
        &estimate.homography,
        &settings.warp_options(width, height),
    );
    let interpolated_time = start.elapsed();

    Ok(Alignment {
        estimate,
        correspondences: set,
        nearest: nearest.into_dynamic()?,
        interpolated: interpolated.into_dynamic()?,
        timings: Timings {
            estimate: estimate_time,
            nearest: nearest_time,
            interpolated: interpolated_time,
        },
    })
}

/// Draws a cross at every annotation, returning an 8-bit RGBA image.
pub fn mark_points<P: ImagePoint>(
    image: &DynamicImage,
    points: impl IntoIterator<Item = P>,
) -> DynamicImage {
    let mut image = drawing::Blend(image.to_rgba8());
    for point in points {
        let point = point.image_point();
        drawing::draw_cross_mut(
            &mut image,
            Rgba([255, 0, 255, 192]),
            point.x.round() as i32,
            point.y.round() as i32,
        );
    }
    DynamicImage::ImageRgba8(image.0)
}

/// Converts floating point images to 8 bits so that any format can store them.
pub fn storable(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb8(image.to_rgb8()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba8(image.to_rgba8()),
        other => other,
    }
}

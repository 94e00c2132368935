use anyhow::{Context, Result};
use homography::image::{self, DynamicImage};
use homography_cli::{
    align, mark_points, points,
    settings::{KernelChoice, Settings},
    storable,
};
use log::*;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "homography",
    about = "Aligns a source image onto a reference image from annotated point correspondences"
)]
struct Opt {
    /// The correspondence file.
    ///
    /// Files ending in `.json` hold `{"reference": [[label, x, y], ...], "source": [...]}`,
    /// anything else is read as CSV rows of `label,ref_x,ref_y,src_x,src_y`.
    #[structopt(short, long, parse(from_os_str))]
    points: PathBuf,
    /// The file where settings are specified.
    ///
    /// Defaults are used for anything the file leaves out, or when it doesn't exist.
    #[structopt(short, long, default_value = "homography-settings.json")]
    settings: PathBuf,
    /// Output path of the nearest neighbor warp.
    ///
    /// Defaults to `<source-stem>_transformed.png` next to the source.
    #[structopt(long, parse(from_os_str))]
    nearest: Option<PathBuf>,
    /// Output path of the interpolated warp.
    ///
    /// Like the nearest neighbor output it has the reference's size, so the two
    /// can be compared pixel for pixel. Defaults to `<source-stem>_transformed_int.png` next to the source.
    #[structopt(long, parse(from_os_str))]
    interpolated: Option<PathBuf>,
    /// The interpolation kernel (bicubic2 or catmull-rom).
    #[structopt(long)]
    kernel: Option<KernelChoice>,
    /// Repeat the source's edge pixels instead of leaving uncovered pixels black.
    #[structopt(long)]
    replicate_border: bool,
    /// Condition the points before estimation.
    #[structopt(long)]
    precondition: bool,
    /// Draw a cross at every reference point on the outputs.
    #[structopt(long)]
    mark: bool,
    /// The reference image, which decides the size of the outputs.
    #[structopt(parse(from_os_str))]
    reference: PathBuf,
    /// The image that gets warped onto the reference.
    #[structopt(parse(from_os_str))]
    source: PathBuf,
}

fn main() -> Result<()> {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let settings = std::fs::File::open(&opt.settings)
        .ok()
        .map(|file| serde_json::from_reader::<_, Settings>(file))
        .transpose()
        .with_context(|| format!("invalid settings file {}", opt.settings.display()))?;
    if settings.is_some() {
        info!("loaded settings from {}", opt.settings.display());
    } else {
        info!("used default settings");
    }
    let mut settings = settings.unwrap_or_default();
    if let Some(kernel) = opt.kernel {
        settings.kernel = kernel;
    }
    settings.replicate_border |= opt.replicate_border;
    settings.precondition |= opt.precondition;

    let reference = open(&opt.reference)?;
    let source = open(&opt.source)?;
    let annotations = points::load(&opt.points)
        .with_context(|| format!("failed to load points from {}", opt.points.display()))?;
    info!(
        "loaded {} reference and {} source points",
        annotations.reference.len(),
        annotations.source.len()
    );

    let alignment = align(&reference, &source, &annotations, &settings)
        .context("failed to align the source onto the reference")?;
    let estimate = &alignment.estimate;
    let errors = estimate.reprojection_errors(&alignment.correspondences);

    info!("homography (reference to source): {:?}", estimate.homography.flattened());
    info!("singular values: {:?}", estimate.singular_values);
    info!("goodness of fit (smallest singular value): {:e}", estimate.residual());
    info!(
        "reprojection error: rms {:.4} px, max {:.4} px",
        estimate.rms_reprojection_error(&alignment.correspondences),
        errors.iter().copied().fold(0.0, f64::max)
    );
    if estimate.is_degenerate() {
        warn!("the correspondences barely constrain the homography; check for collinear or repeated points");
    }
    info!("estimation took {:?}", alignment.timings.estimate);
    info!("nearest warp took {:?}", alignment.timings.nearest);
    info!("interpolated warp took {:?}", alignment.timings.interpolated);

    let finish = |image: DynamicImage| {
        if opt.mark {
            mark_points(&image, annotations.reference.iter().copied())
        } else {
            storable(image)
        }
    };

    let nearest_path = opt
        .nearest
        .clone()
        .unwrap_or_else(|| sibling(&opt.source, "_transformed"));
    let interpolated_path = opt
        .interpolated
        .clone()
        .unwrap_or_else(|| sibling(&opt.source, "_transformed_int"));
    save(finish(alignment.nearest), &nearest_path)?;
    save(finish(alignment.interpolated), &interpolated_path)?;
    Ok(())
}

fn open(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("failed to open image {}", path.display()))
}

fn save(image: DynamicImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("failed to write image {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// `<dir>/<stem><suffix>.png` for the stem of `source`.
fn sibling(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{}{}.png", stem, suffix))
}

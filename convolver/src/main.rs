use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use halo_convolution as hc;
use halo_convolution::PixelGrid;
use image::{DynamicImage, ImageFormat, ImageReader};
use log::{debug, info};

mod structs;

#[derive(Parser)]
#[clap(version, about, long_about = None)]
#[clap(disable_help_flag = true)]
struct Cli {
    #[clap(long, action = clap::ArgAction::HelpLong)]
    help: Option<bool>,

    /// Path to source image file (PGM, PPM or PNG)
    #[clap(value_parser)]
    source_path: PathBuf,

    /// Path to result image file
    #[clap(value_parser)]
    destination_path: Option<PathBuf>,

    /// Name of filter to apply, can be repeated to build a chain of filters.
    /// Unknown names are replaced with the "identity" filter.
    #[clap(short, long = "filter", value_parser)]
    filters: Vec<String>,

    /// Count of workers the image is split between
    #[clap(short, long, value_parser, default_value_t = 1)]
    workers: usize,

    /// How pixels on edges of the image are handled
    #[clap(short, long, value_enum, default_value_t = structs::EdgePolicy::Zero)]
    edge: structs::EdgePolicy,

    /// Use channels without buffering between workers
    #[clap(long, action)]
    rendezvous: bool,

    /// Overwrite destination file
    #[clap(short, long, action)]
    overwrite: bool,

    /// Compare the result with the reference image and report
    /// count of different samples
    #[clap(long, value_parser)]
    compare: Option<PathBuf>,

    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();
    convolve(&cli)
}

fn convolve(cli: &Cli) -> Result<()> {
    let src_grid = open_image(&cli.source_path)?;

    let capacity = if cli.rendezvous {
        hc::Capacity::Rendezvous
    } else {
        hc::Capacity::Unbounded
    };
    let options = hc::ConvolveOptions::new()
        .workers(cli.workers)
        .edge_policy(cli.edge.into())
        .capacity(capacity);
    let convolver = hc::Convolver::new(options);

    debug!(
        "Apply filters {:?} to {}x{} image with {} workers",
        cli.filters,
        src_grid.width(),
        src_grid.height(),
        cli.workers
    );
    let dst_grid = convolver
        .convolve_by_names(&src_grid, cli.filters.as_slice())
        .with_context(|| "Failed to convolve image")?;

    if let Some(reference_path) = &cli.compare {
        compare_with_reference(&dst_grid, reference_path)?;
    }
    save_result(cli, dst_grid)
}

fn open_image(path: &Path) -> Result<PixelGrid> {
    debug!("Opening the image {:?}", path);
    let reader = ImageReader::open(path)
        .with_context(|| format!("Failed to read file from {:?}", path))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read file from {:?}", path))?;
    if reader.format() == Some(ImageFormat::Pnm) {
        // Max value of PGM/PPM header must survive the round trip.
        return PixelGrid::read_pnm(reader.into_inner())
            .with_context(|| format!("Failed to decode image {:?}", path));
    }
    let image = reader
        .decode()
        .with_context(|| format!("Failed to decode image {:?}", path))?;
    let image = match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        _ => {
            return Err(anyhow!(
                "Unsupported pixel's format of image {:?}: {:?}",
                path,
                image.color()
            ))
        }
    };
    PixelGrid::try_from(&image).with_context(|| "Failed to create pixels grid")
}

fn compare_with_reference(grid: &PixelGrid, reference_path: &Path) -> Result<()> {
    let reference = open_image(reference_path)?;
    let count = structs::count_different_samples(grid, &reference).ok_or_else(|| {
        anyhow!(
            "Size of reference image {}x{} doesn't match to the result {}x{}",
            reference.width(),
            reference.height(),
            grid.width(),
            grid.height()
        )
    })?;
    info!(
        "{} of {} samples differ from the reference image",
        count,
        grid.samples().len()
    );
    println!("{}", count);
    Ok(())
}

fn save_result(cli: &Cli, grid: PixelGrid) -> Result<()> {
    let result_path = if let Some(path) = cli.destination_path.clone() {
        path
    } else {
        let mut path = PathBuf::from("./");
        let ext = cli
            .source_path
            .extension()
            .unwrap_or_else(|| OsStr::new("png"));
        path.push("result");
        path.set_extension(ext);
        path
    };
    if result_path.exists() && !cli.overwrite {
        return Err(anyhow!(
            "Destination path {:?} already exists.",
            result_path
        ));
    };

    debug!("Save the result image into the file {:?}", result_path);
    if structs::is_pnm_path(&result_path) {
        let file = File::create(&result_path)
            .with_context(|| format!("Failed to create file {:?}", result_path))?;
        let mut writer = BufWriter::new(file);
        grid.write_pnm(&mut writer)
            .with_context(|| "Failed to save the result image")?;
        writer
            .flush()
            .with_context(|| "Failed to save the result image")?;
        return Ok(());
    }
    grid.into_dynamic_image()
        .with_context(|| "Failed to create result image")?
        .save(&result_path)
        .with_context(|| "Failed to save the result image")?;
    Ok(())
}

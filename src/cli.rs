//! Command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rastercam_camtools::raster::{distance_to_image, load_image};
use rastercam_camtools::{save_paths, CamPipeline};
use rastercam_settings::JobSettings;
use std::path::PathBuf;
use tracing::info;

/// Raster CAM toolpath generator
#[derive(Debug, Parser)]
#[command(
    name = "rastercam",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about
)]
pub struct Cli {
    /// Job settings file (.json or .toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the distance field of a thresholded image as grayscale
    Distance {
        /// Input image
        input: PathBuf,
        /// Output image
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Cut offset contours around the occupied region of an image
    Contour {
        /// Input image
        input: PathBuf,
        /// Output toolpaths (.svg or .json)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Raster finishing passes over a height-map image
    Finish {
        /// Input height map (16-bit grayscale preferred)
        input: PathBuf,
        /// Output toolpaths (.svg or .json)
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn load_settings(config: Option<&PathBuf>) -> Result<JobSettings> {
    match config {
        Some(path) => JobSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(JobSettings::default()),
    }
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_ref())?;
    let pipeline = CamPipeline::new(settings)?;

    match cli.command {
        Command::Distance { input, output } => {
            let img = load_image(&input)?;
            let distances = pipeline.distances(&pipeline.occupancy(&img));
            distance_to_image(&distances)
                .save(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                "Distance field {}x{} written to {}",
                distances.ni(),
                distances.nj(),
                output.display()
            );
        }
        Command::Contour { input, output } => {
            let img = load_image(&input)?;
            let paths = pipeline.contours(&pipeline.occupancy(&img))?;
            save_paths(&output, &paths, &pipeline.svg_options())?;
        }
        Command::Finish { input, output } => {
            let img = load_image(&input)?;
            let paths = pipeline.finishing(&pipeline.heights(&img))?;
            save_paths(&output, &paths, &pipeline.svg_options())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};
    use std::path::Path;
    use tempfile::tempdir;

    fn write_square_image(path: &Path) {
        let img = GrayImage::from_fn(40, 40, |x, y| {
            if (15..25).contains(&x) && (15..25).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        img.save(path).unwrap();
    }

    fn write_settings(dir: &Path) -> std::path::PathBuf {
        let mut settings = JobSettings::new();
        settings.raster.pixels_per_mm = 1.0;
        settings.contour.bit_diameter = 3.0;
        settings.contour.offsets = 2;
        settings.finish.bit_diameter = 4.0;
        let path = dir.join("job.toml");
        settings.save_to_file(&path).unwrap();
        path
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["rastercam", "contour", "in.png", "-o", "out.svg"]).unwrap();
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Command::Contour { .. }));

        let cli = Cli::try_parse_from([
            "rastercam", "finish", "in.png", "--output", "out.json", "--config", "job.toml",
        ])
        .unwrap();
        assert_eq!(cli.config.unwrap(), Path::new("job.toml"));

        assert!(Cli::try_parse_from(["rastercam", "contour", "in.png"]).is_err());
    }

    #[test]
    fn test_contour_job_writes_svg() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("square.png");
        let output = dir.path().join("square.svg");
        write_square_image(&input);
        let config = write_settings(dir.path());

        let cli = Cli::try_parse_from([
            "rastercam",
            "--config",
            config.to_str().unwrap(),
            "contour",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).unwrap();

        let svg = std::fs::read_to_string(&output).unwrap();
        assert_eq!(svg.matches("<path").count(), 2);
    }

    #[test]
    fn test_distance_job_writes_image() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("square.png");
        let output = dir.path().join("distance.png");
        write_square_image(&input);

        let cli = Cli::try_parse_from([
            "rastercam",
            "distance",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).unwrap();

        let img = image::open(&output).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (40, 40));
        assert_eq!(img.get_pixel(20, 20).0[0], 0);
        assert!(img.get_pixel(0, 0).0[0] > 200);
    }

    #[test]
    fn test_finish_job_writes_json() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("heights.png");
        let output = dir.path().join("finish.json");
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(30, 20, |x, y| Luma([((x + y) * 500) as u16]));
        buf.save(&input).unwrap();
        let config = write_settings(dir.path());

        let cli = Cli::try_parse_from([
            "rastercam",
            "finish",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).unwrap();

        let paths = rastercam_camtools::load_json(&output).unwrap();
        // margin 2, step 2: columns 2..26, rows 2..16
        assert_eq!(paths.len(), 13 + 8);
    }

    #[test]
    fn test_missing_config_is_reported() {
        let dir = tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "rastercam",
            "-c",
            dir.path().join("absent.toml").to_str().unwrap(),
            "distance",
            "in.png",
            "-o",
            "out.png",
        ])
        .unwrap();
        assert!(run(cli).is_err());
    }
}

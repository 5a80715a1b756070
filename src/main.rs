//! `edgestag` command line: run the edge pipeline on one image.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, info};

use edgestag::config::{load_config, EdgeConfig};
use edgestag::logging::{init_logging, verbosity_level};
use edgestag::{DisplayImage, EdgeSession, LineMode, Region, Viewport};

/// Buffer written to the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    /// The (cropped) input image
    Image,
    /// The edge map after deletions and pruning
    Edges,
    /// The composed line art
    Line,
}

/// Detect edges in an image, prune them and export line art.
#[derive(Debug, Parser)]
#[command(name = "edgestag", version, about)]
struct Cli {
    /// Image to process
    input: PathBuf,

    /// Output file; the format follows the extension
    #[arg(short, long)]
    output: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Crop to a rectangle, corners in any order
    #[arg(long, value_name = "X1,Y1,X2,Y2")]
    crop: Option<Region>,

    /// Interpret --crop and --delete in a canvas of this size
    #[arg(long, value_name = "W,H")]
    canvas: Option<Viewport>,

    /// Canny weak-edge threshold
    #[arg(long)]
    low: Option<f32>,

    /// Canny strong-edge threshold
    #[arg(long)]
    high: Option<f32>,

    /// Gaussian blur sigma
    #[arg(long)]
    sigma: Option<f32>,

    /// Use the L2 gradient norm
    #[arg(long)]
    l2: bool,

    /// Delete edges inside a rectangle (repeatable)
    #[arg(long = "delete", value_name = "X1,Y1,X2,Y2")]
    deletes: Vec<Region>,

    /// Remove edge components smaller than N pixels
    #[arg(long, value_name = "N")]
    min_edge_size: Option<usize>,

    /// Compose a line from the remaining edges
    #[arg(long, value_name = "trace|outline")]
    line: Option<LineMode>,

    /// Line thickness in pixels
    #[arg(long)]
    thickness: Option<u32>,

    /// Save this stage instead of the display image
    #[arg(long, value_enum)]
    stage: Option<Stage>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply_overrides(&self, config: &mut EdgeConfig) {
        if let Some(low) = self.low {
            config.canny.low_threshold = low;
        }
        if let Some(high) = self.high {
            config.canny.high_threshold = high;
        }
        if let Some(sigma) = self.sigma {
            config.canny.blur_sigma = sigma;
        }
        if self.l2 {
            config.canny.l2_gradient = true;
        }
        if let Some(size) = self.min_edge_size {
            config.edit.min_edge_size = size;
        }
        if let Some(mode) = self.line {
            config.line.mode = mode;
        }
        if let Some(thickness) = self.thickness {
            config.line.thickness = thickness;
        }
    }

    fn wants_edges(&self) -> bool {
        self.stage != Some(Stage::Image)
    }

    fn wants_line(&self) -> bool {
        match self.stage {
            Some(Stage::Line) => true,
            Some(_) => false,
            None => self.line.is_some(),
        }
    }
}

/// Map a region through the canvas, if one was given.
fn to_image_region(cli: &Cli, session: &EdgeSession, region: Region) -> anyhow::Result<Region> {
    let Some(canvas) = cli.canvas else {
        return Ok(region);
    };
    let Some(current) = session.current() else {
        bail!("No image loaded");
    };
    let (height, width, _) = current.dim();
    match canvas.to_image_region((region.x1, region.y1), (region.x2, region.y2), width, height) {
        Some(mapped) => {
            debug!(%region, %mapped, "canvas region mapped");
            Ok(mapped)
        }
        None => bail!("canvas {}x{} has no area", canvas.width, canvas.height),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid options")?;

    init_logging(&verbosity_level(cli.verbose, &config.logging.level));
    debug!(?config, "configuration resolved");

    let mut session = EdgeSession::new(config);
    session.load_image(&cli.input)?;

    if let Some(region) = cli.crop {
        let region = to_image_region(cli, &session, region)?;
        session.crop_image(region.x1, region.y1, region.x2, region.y2)?;
    }

    if cli.wants_edges() {
        session.find_edges()?;

        for &region in &cli.deletes {
            let region = to_image_region(cli, &session, region)?;
            session.delete_edges_in_region(region.x1, region.y1, region.x2, region.y2)?;
        }

        if let Some(min_size) = cli.min_edge_size {
            session.remove_small_edges(min_size)?;
        }

        if cli.wants_line() {
            session.create_line()?;
        }
    }

    let image = match cli.stage {
        Some(Stage::Image) => session.current().map(|c| DisplayImage::Color(c.view())),
        Some(Stage::Edges) => session.edges().map(|e| DisplayImage::Gray(e.view())),
        Some(Stage::Line) => session.line().map(|l| DisplayImage::Gray(l.image.view())),
        None => None,
    };
    session
        .save_image(&cli.output, image)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!(output = %cli.output.display(), "done");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_full_pipeline() {
        let cli = Cli::try_parse_from([
            "edgestag",
            "in.png",
            "-o",
            "out.png",
            "--crop",
            "10,10,90,90",
            "--delete",
            "0,0,5,5",
            "--delete",
            "20,20,30,30",
            "--line",
            "outline",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.crop, Some(Region::new(10, 10, 90, 90)));
        assert_eq!(cli.deletes.len(), 2);
        assert_eq!(cli.line, Some(LineMode::Outline));
        assert_eq!(cli.verbose, 2);
        assert!(cli.wants_line());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "edgestag", "in.png", "-o", "out.png", "--low", "20", "--high", "90", "--l2",
            "--thickness", "3",
        ])
        .unwrap();
        let mut config = EdgeConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.canny.low_threshold, 20.0);
        assert_eq!(config.canny.high_threshold, 90.0);
        assert!(config.canny.l2_gradient);
        assert_eq!(config.line.thickness, 3);
        assert_eq!(config.canny.blur_sigma, 1.4);
    }

    #[test]
    fn test_stage_image_skips_edges() {
        let cli = Cli::try_parse_from([
            "edgestag", "in.png", "-o", "out.png", "--stage", "image", "--line", "trace",
        ])
        .unwrap();
        assert!(!cli.wants_edges());
        assert!(!cli.wants_line());
    }

    #[test]
    fn test_cli_rejects_bad_region() {
        assert!(Cli::try_parse_from(["edgestag", "in.png", "-o", "out.png", "--crop", "1,2,3"]).is_err());
    }
}

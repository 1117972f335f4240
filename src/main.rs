//! Count the regions of a packing puzzle that can hold their required shapes.

use clap::{Parser, ValueEnum};
use quota_dlx::{
    placement::FitMode,
    polyomino::ShapeTransform,
    puzzle::{FitOptions, Puzzle, Verdict},
};
use std::{error::Error, path::PathBuf, time::Duration};

/// Decide, for every region of a puzzle, whether the listed shapes fit.
#[derive(Parser)]
#[command(name = "quota-dlx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Puzzle file with shape drawings followed by region lines
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Orientations each shape may be placed in
    #[arg(short, long, value_enum, default_value_t = Transform::Full)]
    transform: Transform,

    /// Allow cells to be left empty instead of requiring a perfect tiling
    #[arg(short, long)]
    packing: bool,

    /// Give up on a single region after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Number of worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transform {
    /// Shapes are placed exactly as drawn
    #[value(name = "none")]
    Fixed,
    /// Shapes may be rotated by quarter turns
    Rotate,
    /// Shapes may be rotated and mirrored
    Full,
}

impl From<Transform> for ShapeTransform {
    fn from(transform: Transform) -> Self {
        match transform {
            Transform::Fixed => ShapeTransform::NoTransform,
            Transform::Rotate => ShapeTransform::PureRotation,
            Transform::Full => ShapeTransform::FullSymmetry,
        }
    }
}

fn main() -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    env_logger::init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let input = std::fs::read_to_string(&cli.input)?;
    let puzzle = Puzzle::parse(&input)?;

    let options = FitOptions {
        transform: cli.transform.into(),
        mode: if cli.packing {
            FitMode::Packing
        } else {
            FitMode::Exact
        },
        timeout: cli.timeout_ms.map(Duration::from_millis),
    };

    let report = puzzle.check_all(&options)?;

    for (index, verdict) in report.verdicts.iter().enumerate() {
        if *verdict == Verdict::TimedOut {
            let region = &puzzle.regions[index];
            log::warn!(
                "Region [{}] ({}x{}) timed out and was not counted.",
                index,
                region.width,
                region.height
            );
        }
    }
    if report.timed_out() > 0 {
        eprintln!("{} region(s) timed out", report.timed_out());
    }

    println!("{}", report.fits());

    Ok(())
}

// ttempsmooth-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ttempsmooth_core::config::{PlaneMode, ProcessingMode};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "TTempSmooth: motion-adaptive temporal smoothing",
    long_about = "Inspects parameters, weight tables and throughput of the TTempSmooth temporal denoiser."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write log output to this file.
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve, validate and print the filter parameters
    Validate(ValidateArgs),
    /// Print the blend weight table of one plane
    Weights(WeightsArgs),
    /// Run the filter over a synthetic noisy clip and report speed and PSNR
    Bench(BenchArgs),
}

/// Parameter sources shared by every subcommand.
///
/// Precedence, lowest first: defaults, `--config` file, `TTEMPSMOOTH_*`
/// environment variables, explicit flags.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// JSON parameter file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ignore TTEMPSMOOTH_* environment variables
    #[arg(long)]
    pub no_env: bool,

    /// Temporal radius (1-7)
    #[arg(long, value_name = "FRAMES")]
    pub maxr: Option<usize>,

    /// Frames around the center that get full weight (1-8)
    #[arg(long, value_name = "FRAMES")]
    pub strength: Option<u32>,

    /// Scene-change threshold in percent, 0 disables detection
    #[arg(long, value_name = "PERCENT")]
    pub scthresh: Option<f32>,

    /// Renormalize instead of falling back to the center sample
    #[arg(long)]
    pub no_fp: bool,

    /// Processing mode
    #[arg(long, value_enum, value_name = "MODE")]
    pub pmode: Option<PmodeArg>,

    /// Process each plane on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Per-plane thresholds as Y,U,V
    #[arg(long, value_delimiter = ',', num_args = 1..=3, value_name = "Y,U,V")]
    pub thresh: Option<Vec<u16>>,

    /// Per-plane full-weight difference floors as Y,U,V
    #[arg(long, value_delimiter = ',', num_args = 1..=3, value_name = "Y,U,V")]
    pub mdiff: Option<Vec<u16>>,

    /// Per-plane memory update thresholds as Y,U,V (best-match mode)
    #[arg(long, value_delimiter = ',', num_args = 1..=3, value_name = "Y,U,V")]
    pub thupd: Option<Vec<u32>>,

    /// Per-plane replacement penalties as Y,U,V (best-match mode)
    #[arg(long, value_delimiter = ',', num_args = 1..=3, value_name = "Y,U,V")]
    pub pnew: Option<Vec<u32>>,

    /// Per-plane handling as Y,U,V
    #[arg(long, value_enum, value_delimiter = ',', num_args = 1..=3, value_name = "Y,U,V")]
    pub planes: Option<Vec<PlaneModeArg>>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Print the resolved parameters as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct WeightsArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Plane to inspect
    #[arg(long, value_enum, default_value_t = PlaneArg::Y)]
    pub plane: PlaneArg,

    /// Bit depth used to report the effective integer thresholds
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(8..=16))]
    pub bits: u32,

    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BenchArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    #[arg(long, default_value_t = 640)]
    pub width: usize,

    #[arg(long, default_value_t = 360)]
    pub height: usize,

    /// Number of frames in the synthetic clip
    #[arg(long, default_value_t = 48)]
    pub frames: usize,

    /// Sample format of the synthetic clip
    #[arg(long, value_enum, default_value_t = FormatArg::Yuv420p8)]
    pub format: FormatArg,

    /// Peak noise amplitude in 8-bit units
    #[arg(long, default_value_t = 6.0)]
    pub noise: f32,

    /// Frame index where the picture content changes abruptly
    #[arg(long, value_name = "FRAME")]
    pub scene_cut: Option<usize>,

    /// Seed for the noise generator
    #[arg(long, default_value_t = 0x7453)]
    pub seed: u64,
}

// --- Value enums ---

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmodeArg {
    /// Weighted blending of similar frames (mode 0)
    Adaptive,
    /// Best-match selection with memory, 8-bit only (mode 1)
    BestMatch,
}

impl From<PmodeArg> for ProcessingMode {
    fn from(arg: PmodeArg) -> Self {
        match arg {
            PmodeArg::Adaptive => ProcessingMode::Adaptive,
            PmodeArg::BestMatch => ProcessingMode::BestMatch,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneModeArg {
    Skip,
    Copy,
    Filter,
}

impl From<PlaneModeArg> for PlaneMode {
    fn from(arg: PlaneModeArg) -> Self {
        match arg {
            PlaneModeArg::Skip => PlaneMode::Skip,
            PlaneModeArg::Copy => PlaneMode::Copy,
            PlaneModeArg::Filter => PlaneMode::Filter,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneArg {
    Y,
    U,
    V,
}

impl PlaneArg {
    pub fn index(self) -> usize {
        match self {
            PlaneArg::Y => 0,
            PlaneArg::U => 1,
            PlaneArg::V => 2,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    #[value(name = "gray8")]
    Gray8,
    #[value(name = "yuv420p8")]
    Yuv420p8,
    #[value(name = "yuv420p10")]
    Yuv420p10,
    #[value(name = "yuv444p8")]
    Yuv444p8,
    #[value(name = "yuv444p16")]
    Yuv444p16,
    #[value(name = "yuv444ps")]
    Yuv444ps,
}

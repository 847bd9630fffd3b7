// ============================================================================
// ttempsmooth-cli/src/commands/bench.rs
// ============================================================================
//
// BENCH COMMAND: run the filter over a synthetic noisy clip
//
// Generates a deterministic clip (gradient pattern plus uniform noise,
// optionally with a hard cut), filters every frame in order with a
// progress bar and reports throughput together with the luma PSNR of the
// noisy and the smoothed clip against the clean one.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use ttempsmooth_core::synthetic::mean_psnr;
use ttempsmooth_core::utils::{format_bytes, format_elapsed, format_rate, frame_size_bytes};
use ttempsmooth_core::{FrameFormat, FrameSource, SyntheticClip, TTempSmooth};

use crate::cli::{BenchArgs, FormatArg};
use crate::commands::resolve_config;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{create_progress_bar, print_config_block, print_heading, print_section, print_success};

/// Summary of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub frames: usize,
    pub elapsed: std::time::Duration,
    pub bytes: u64,
    pub noisy_psnr: f64,
    pub smoothed_psnr: f64,
}

fn frame_format(arg: FormatArg) -> CliResult<FrameFormat> {
    match arg {
        FormatArg::Gray8 => Ok(FrameFormat::gray8()),
        FormatArg::Yuv420p8 => FrameFormat::yuv420p(8),
        FormatArg::Yuv420p10 => FrameFormat::yuv420p(10),
        FormatArg::Yuv444p8 => FrameFormat::yuv444p(8),
        FormatArg::Yuv444p16 => FrameFormat::yuv444p(16),
        FormatArg::Yuv444ps => Ok(FrameFormat::yuv444ps()),
    }
}

/// Execute the bench command
pub fn execute_bench(args: BenchArgs) -> CliResult<BenchReport> {
    let config = resolve_config(&args.params)?;
    let format = frame_format(args.format)?;

    print_heading("TTempSmooth Benchmark");
    print_config_block(&[
        ("clip", format!("{} frames of {}x{} {}", args.frames, args.width, args.height, format)),
        ("noise", format!("{} (8-bit units)", args.noise)),
        (
            "scene cut",
            args.scene_cut
                .map_or_else(|| "none".to_string(), |n| format!("at frame {}", n)),
        ),
        ("seed", args.seed.to_string()),
        ("maxr", config.maxr.to_string()),
        ("pmode", format!("{:?}", config.pmode)),
        (
            "threads",
            if config.parallel {
                format!("{} logical processors", num_cpus::get())
            } else {
                "1 (sequential)".to_string()
            },
        ),
    ]);

    let clip = SyntheticClip::new(format, args.width, args.height, args.frames)
        .noise(args.noise)
        .scene_cut(args.scene_cut)
        .seed(args.seed)
        .generate()
        .cli_context("Failed to generate the synthetic clip")?;
    debug!("Generated {} synthetic frames", clip.noisy.len());

    let source: Arc<dyn FrameSource> = Arc::new(clip.noisy_source()?);
    let filter = TTempSmooth::new(config, source, None)?;

    let pb = create_progress_bar(filter.num_frames() as u64, "Smoothing");
    let start = Instant::now();
    let mut smoothed = Vec::with_capacity(filter.num_frames());
    for (n, frame) in filter.frames().enumerate() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                pb.abandon();
                return Err(e).cli_with_context(|| format!("Failed to smooth frame {}", n));
            }
        };
        smoothed.push(frame);
        pb.inc(1);
    }
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    let report = BenchReport {
        frames: smoothed.len(),
        elapsed,
        bytes: frame_size_bytes(&format, args.width, args.height) * smoothed.len() as u64,
        noisy_psnr: mean_psnr(&clip.noisy, &clip.clean, 0)?,
        smoothed_psnr: mean_psnr(&smoothed, &clip.clean, 0)?,
    };
    info!(
        "Smoothed {} frames in {} ({})",
        report.frames,
        format_elapsed(report.elapsed),
        format_rate(report.frames, report.elapsed)
    );

    print_section("Results");
    let secs = report.elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        format!("{}/s", format_bytes((report.bytes as f64 / secs) as u64))
    } else {
        "n/a".to_string()
    };
    print_config_block(&[
        ("elapsed", format_elapsed(report.elapsed)),
        ("rate", format_rate(report.frames, report.elapsed)),
        ("throughput", throughput),
        ("noisy PSNR (Y)", format!("{:.2} dB", report.noisy_psnr)),
        ("smoothed PSNR (Y)", format!("{:.2} dB", report.smoothed_psnr)),
        (
            "gain",
            format!("{:+.2} dB", report.smoothed_psnr - report.noisy_psnr),
        ),
    ]);
    print_success("Benchmark complete");

    Ok(report)
}

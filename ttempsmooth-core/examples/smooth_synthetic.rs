use std::sync::Arc;

use ttempsmooth_core::config::{ProcessingMode, SmoothConfigBuilder};
use ttempsmooth_core::synthetic::mean_psnr;
use ttempsmooth_core::{FrameFormat, FrameSource, SyntheticClip, TTempSmooth};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example 1: Smooth a noisy synthetic clip with the adaptive blender
    println!("Example 1: Adaptive blending");

    let clip = SyntheticClip::new(FrameFormat::yuv420p(8)?, 128, 72, 24)
        .noise(5.0)
        .scene_cut(Some(12))
        .generate()?;
    let source: Arc<dyn FrameSource> = Arc::new(clip.noisy_source()?);

    let config = SmoothConfigBuilder::new().maxr(3).thresh(0, 8).build()?;
    let filter = TTempSmooth::new(config, source.clone(), None)?;
    let smoothed = filter.frames().collect::<Result<Vec<_>, _>>()?;

    println!("Noisy PSNR:    {:.2} dB", mean_psnr(&clip.noisy, &clip.clean, 0)?);
    println!("Smoothed PSNR: {:.2} dB", mean_psnr(&smoothed, &clip.clean, 0)?);

    // Example 2: Best-match selection with memory, frames strictly in order
    println!("\nExample 2: Best-match selection with memory");

    let config = SmoothConfigBuilder::new()
        .pmode(ProcessingMode::BestMatch)
        .thresh(0, 12)
        .thupd(0, 3)
        .pnew(0, 2)
        .build()?;
    let filter = TTempSmooth::new(config, source, None)?;
    let mut memory = filter.new_memory();
    let mut selected = Vec::with_capacity(filter.num_frames());
    for n in 0..filter.num_frames() {
        selected.push(filter.get_frame(n, Some(&mut memory))?);
    }

    println!("Selected PSNR: {:.2} dB", mean_psnr(&selected, &clip.clean, 0)?);

    Ok(())
}

//! Deterministic synthetic clips and quality measurement.
//!
//! Used by the benchmark command and the integration tests to exercise the
//! filter without any decoder. A clip is a static gradient per plane with
//! seeded uniform noise on top, optionally switching to an inverted pattern
//! at a chosen frame to provoke a scene change.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CoreError, CoreResult};
use crate::frame::{Frame, FrameFormat, Plane, PlaneData, Sample};
use crate::source::VecSource;

/// Parameters of a generated clip.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticClip {
    pub format: FrameFormat,
    pub width: usize,
    pub height: usize,
    pub frames: usize,
    /// Peak noise amplitude on the 8-bit scale.
    pub noise: f32,
    /// First frame of the second scene.
    pub scene_cut: Option<usize>,
    pub seed: u64,
}

/// The noise-free frames and their noisy counterparts.
#[derive(Debug, Clone)]
pub struct GeneratedClip {
    pub clean: Vec<Frame>,
    pub noisy: Vec<Frame>,
}

impl GeneratedClip {
    pub fn noisy_source(&self) -> CoreResult<VecSource> {
        VecSource::new(self.noisy.clone())
    }
}

impl SyntheticClip {
    pub fn new(format: FrameFormat, width: usize, height: usize, frames: usize) -> Self {
        Self {
            format,
            width,
            height,
            frames,
            noise: 6.0,
            scene_cut: None,
            seed: 0x7453,
        }
    }

    pub fn noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }

    pub fn scene_cut(mut self, frame: Option<usize>) -> Self {
        self.scene_cut = frame;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Normalized clean value of a sample.
    fn pattern(&self, n: usize, plane: usize, x: usize, y: usize, w: usize, h: usize) -> f32 {
        let fx = x as f32 / w.max(1) as f32;
        let fy = y as f32 / h.max(1) as f32;
        let base = 0.15 + 0.35 * fx + 0.25 * fy + 0.05 * plane as f32;
        match self.scene_cut {
            Some(cut) if n >= cut => 1.0 - base,
            _ => base,
        }
    }

    /// Generates every frame of the clip.
    pub fn generate(&self) -> CoreResult<GeneratedClip> {
        if self.frames == 0 || self.width == 0 || self.height == 0 {
            return Err(CoreError::FrameGeometry(format!(
                "synthetic clip needs frames and area, got {} frames of {}x{}",
                self.frames, self.width, self.height
            )));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(CoreError::invalid(
                "noise",
                format!("must be a non-negative amplitude, got {}", self.noise),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let amplitude = self.noise / 255.0;
        let mut clean = Vec::with_capacity(self.frames);
        let mut noisy = Vec::with_capacity(self.frames);

        for n in 0..self.frames {
            let mut clean_frame = Frame::new(self.format, self.width, self.height);
            let mut noisy_frame = Frame::new(self.format, self.width, self.height);

            for plane in 0..self.format.num_planes {
                let (w, h) = self.format.plane_dimensions(plane, self.width, self.height);
                for y in 0..h {
                    for x in 0..w {
                        let value = self.pattern(n, plane, x, y, w, h);
                        let jitter = if amplitude > 0.0 {
                            rng.gen_range(-amplitude..=amplitude)
                        } else {
                            0.0
                        };
                        store(clean_frame.plane_mut(plane), x, y, value, &self.format);
                        store(noisy_frame.plane_mut(plane), x, y, value + jitter, &self.format);
                    }
                }
            }

            clean.push(clean_frame);
            noisy.push(noisy_frame);
        }

        log::debug!(
            "Generated {} synthetic {} frames at {}x{} (noise {}, cut {:?})",
            self.frames,
            self.format,
            self.width,
            self.height,
            self.noise,
            self.scene_cut
        );
        Ok(GeneratedClip { clean, noisy })
    }
}

fn store(plane: &mut PlaneData, x: usize, y: usize, value: f32, format: &FrameFormat) {
    let value = value.clamp(0.0, 1.0);
    match plane {
        PlaneData::U8(p) => p.set(x, y, (value * 255.0).round() as u8),
        PlaneData::U16(p) => p.set(x, y, (value * format.peak_value()).round() as u16),
        PlaneData::F32(p) => p.set(x, y, value),
    }
}

/// Peak signal-to-noise ratio of plane `plane` in dB. Identical planes give
/// infinity.
pub fn psnr(a: &Frame, b: &Frame, plane: usize) -> CoreResult<f64> {
    if !a.same_geometry(b) || plane >= a.num_planes() {
        return Err(CoreError::FrameGeometry(
            "psnr needs two frames of the same geometry".to_string(),
        ));
    }
    let peak = f64::from(a.format().peak_value());

    let (sum, count) = match (a.plane(plane), b.plane(plane)) {
        (PlaneData::U8(pa), PlaneData::U8(pb)) => squared_error(pa, pb),
        (PlaneData::U16(pa), PlaneData::U16(pb)) => squared_error(pa, pb),
        (PlaneData::F32(pa), PlaneData::F32(pb)) => squared_error(pa, pb),
        _ => {
            return Err(CoreError::FrameGeometry(
                "psnr planes differ in sample type".to_string(),
            ))
        }
    };

    let mse = sum / count as f64 / (peak * peak);
    if mse == 0.0 {
        Ok(f64::INFINITY)
    } else {
        Ok(10.0 * (1.0 / mse).log10())
    }
}

fn squared_error<T: Sample>(a: &Plane<T>, b: &Plane<T>) -> (f64, usize) {
    a.samples().zip(b.samples()).fold((0.0, 0), |(sum, count), (x, y)| {
        let d = f64::from(x.to_f32()) - f64::from(y.to_f32());
        (sum + d * d, count + 1)
    })
}

/// Mean PSNR of plane `plane` over two equally long frame lists.
pub fn mean_psnr(a: &[Frame], b: &[Frame], plane: usize) -> CoreResult<f64> {
    if a.len() != b.len() || a.is_empty() {
        return Err(CoreError::FrameGeometry(format!(
            "cannot compare {} frames against {}",
            a.len(),
            b.len()
        )));
    }
    let mut total = 0.0;
    for (fa, fb) in a.iter().zip(b) {
        // Cap identical frames so one perfect frame does not dominate.
        total += psnr(fa, fb, plane)?.min(100.0);
    }
    Ok(total / a.len() as f64)
}

// ============================================================================
// ttempsmooth-core/src/source.rs
// ============================================================================
//
// FRAME SOURCES AND WINDOWS: The Host-Side Collaborator Contract
//
// The kernel never decodes or schedules anything itself. A host hands it a
// `FrameSource`, and for every output frame the kernel gathers a `Window` of
// `2 * maxr + 1` neighboring frames, repeating the first and last frame of
// the clip when the window runs past either end.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::frame::{Frame, FrameFormat};

/// A random-access clip of frames provided by the host.
///
/// Implementations may decode, cache or block inside `get_frame`; the kernel
/// only requires that every returned frame matches `format()`, `width()` and
/// `height()`.
pub trait FrameSource: Send + Sync {
    fn format(&self) -> FrameFormat;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn num_frames(&self) -> usize;

    fn get_frame(&self, n: usize) -> CoreResult<Arc<Frame>>;
}

/// An in-memory clip. Used by tests, the benchmark command and hosts that
/// already hold decoded frames.
#[derive(Debug, Clone)]
pub struct VecSource {
    format: FrameFormat,
    width: usize,
    height: usize,
    frames: Vec<Arc<Frame>>,
}

impl VecSource {
    /// Wraps decoded frames. All frames must share one geometry.
    pub fn new(frames: Vec<Frame>) -> CoreResult<Self> {
        let first = frames
            .first()
            .ok_or_else(|| CoreError::FrameGeometry("a clip needs at least one frame".to_string()))?;
        let (format, width, height) = (*first.format(), first.width(), first.height());

        if let Some((index, _)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| *f.format() != format || f.width() != width || f.height() != height)
        {
            return Err(CoreError::FrameGeometry(format!(
                "frame {} does not match the {} {}x{} geometry of frame 0",
                index, format, width, height
            )));
        }

        Ok(Self {
            format,
            width,
            height,
            frames: frames.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn frames(&self) -> &[Arc<Frame>] {
        &self.frames
    }
}

impl FrameSource for VecSource {
    fn format(&self) -> FrameFormat {
        self.format
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn num_frames(&self) -> usize {
        self.frames.len()
    }

    fn get_frame(&self, n: usize) -> CoreResult<Arc<Frame>> {
        self.frames
            .get(n)
            .cloned()
            .ok_or(CoreError::FrameIndexOutOfRange {
                requested: n,
                len: self.frames.len(),
            })
    }
}

/// The `2 * maxr + 1` frames surrounding one output frame.
///
/// Index `maxr` is the center. Positions are window-relative: 0 is the
/// furthest past frame, `diameter - 1` the furthest future frame.
#[derive(Debug, Clone)]
pub struct Window {
    maxr: usize,
    frames: Vec<Arc<Frame>>,
}

impl Window {
    /// Gathers the window around frame `n`, clamping out-of-range neighbors
    /// to the first or last frame.
    pub fn gather(source: &dyn FrameSource, n: usize, maxr: usize) -> CoreResult<Self> {
        let len = source.num_frames();
        if n >= len {
            return Err(CoreError::FrameIndexOutOfRange { requested: n, len });
        }

        let mut frames = Vec::with_capacity(maxr * 2 + 1);
        for offset in -(maxr as isize)..=(maxr as isize) {
            let index = (n as isize + offset).clamp(0, len as isize - 1) as usize;
            let frame = source.get_frame(index)?;
            if *frame.format() != source.format()
                || frame.width() != source.width()
                || frame.height() != source.height()
            {
                return Err(CoreError::FrameGeometry(format!(
                    "source returned frame {} as {} {}x{}, expected {} {}x{}",
                    index,
                    frame.format(),
                    frame.width(),
                    frame.height(),
                    source.format(),
                    source.width(),
                    source.height()
                )));
            }
            frames.push(frame);
        }

        Ok(Self { maxr, frames })
    }

    /// Builds a window from frames already in window order.
    pub fn from_frames(frames: Vec<Arc<Frame>>) -> CoreResult<Self> {
        if frames.is_empty() || frames.len() % 2 == 0 {
            return Err(CoreError::FrameGeometry(format!(
                "a window needs an odd number of frames, got {}",
                frames.len()
            )));
        }
        let center = &frames[frames.len() / 2];
        if frames.iter().any(|f| !f.same_geometry(center)) {
            return Err(CoreError::FrameGeometry(
                "window frames differ in geometry".to_string(),
            ));
        }
        Ok(Self {
            maxr: frames.len() / 2,
            frames,
        })
    }

    pub fn maxr(&self) -> usize {
        self.maxr
    }

    pub fn diameter(&self) -> usize {
        self.frames.len()
    }

    pub fn center(&self) -> &Frame {
        &self.frames[self.maxr]
    }

    pub fn frame(&self, index: usize) -> &Frame {
        &self.frames[index]
    }

    pub fn frames(&self) -> &[Arc<Frame>] {
        &self.frames
    }
}

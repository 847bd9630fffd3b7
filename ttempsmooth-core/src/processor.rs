// ============================================================================
// ttempsmooth-core/src/processor.rs
// ============================================================================
//
// FILTER INSTANCE: Configuration, Dispatch and Frame Production
//
// `TTempSmooth` is built once from a validated `SmoothConfig` and a source
// clip (plus an optional reference clip). Construction derives everything
// that stays fixed for the lifetime of the instance: per-plane weight
// tables, thresholds and the scene-change detector. After that, producing a
// frame is pure computation over the gathered windows.
//
// The adaptive mode needs nothing but `&self` and may run for any frames in
// any order or concurrently. The best-match mode threads a caller-owned
// `IirMemory` through every call and demands strictly increasing frames.

use std::sync::Arc;

use crate::best_match::{BestMatch, SelectionStats};
use crate::blend::{AdaptiveBlend, Blendable};
use crate::config::{PlaneMode, ProcessingMode, SmoothConfig, PLANE_NAMES};
use crate::error::{CoreError, CoreResult};
use crate::frame::{Frame, FrameFormat, Plane, PlaneData, SampleType};
use crate::memory::{IirMemory, MemoryCell};
use crate::scene::{ScanWindowBounds, SceneChangeDetector};
use crate::source::{FrameSource, Window};
use crate::weights::WeightTable;

/// Derived, read-only parameters of one plane.
#[derive(Debug, Clone)]
struct PlaneParams {
    mode: PlaneMode,
    thresh: u16,
    thupd: u32,
    pnew: u32,
    table: WeightTable,
}

/// A configured temporal smoothing filter over one source clip.
pub struct TTempSmooth {
    config: SmoothConfig,
    source: Arc<dyn FrameSource>,
    reference: Option<Arc<dyn FrameSource>>,
    format: FrameFormat,
    width: usize,
    height: usize,
    planes: Vec<PlaneParams>,
    detector: SceneChangeDetector,
}

impl std::fmt::Debug for TTempSmooth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TTempSmooth")
            .field("config", &self.config)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("num_frames", &self.source.num_frames())
            .field("has_reference", &self.reference.is_some())
            .finish()
    }
}

impl TTempSmooth {
    /// Validates the configuration against the clip and builds the filter.
    ///
    /// `reference`, when given, supplies the samples compared for similarity
    /// and must match the source in format, dimensions and length.
    pub fn new(
        config: SmoothConfig,
        source: Arc<dyn FrameSource>,
        reference: Option<Arc<dyn FrameSource>>,
    ) -> CoreResult<Self> {
        config.validate()?;

        let format = source.format();
        let (width, height) = (source.width(), source.height());

        if width == 0 || height == 0 || source.num_frames() == 0 {
            return Err(CoreError::FrameGeometry(format!(
                "source clip is empty ({}x{}, {} frames)",
                width,
                height,
                source.num_frames()
            )));
        }

        if config.pmode == ProcessingMode::BestMatch && format.sample_type != SampleType::U8 {
            return Err(CoreError::UnsupportedFormat(format!(
                "best-match mode requires 8-bit input, got {}",
                format
            )));
        }

        if let Some(reference) = &reference {
            if reference.format() != format
                || reference.width() != width
                || reference.height() != height
            {
                return Err(CoreError::ReferenceMismatch(format!(
                    "reference is {} {}x{}, source is {} {}x{}",
                    reference.format(),
                    reference.width(),
                    reference.height(),
                    format,
                    width,
                    height
                )));
            }
            if reference.num_frames() != source.num_frames() {
                return Err(CoreError::ReferenceMismatch(format!(
                    "reference has {} frames, source has {}",
                    reference.num_frames(),
                    source.num_frames()
                )));
            }
        }

        let planes = config
            .planes
            .iter()
            .take(format.num_planes.min(3))
            .map(|settings| PlaneParams {
                mode: settings.mode,
                thresh: settings.thresh,
                thupd: settings.thupd,
                pnew: settings.pnew,
                table: WeightTable::build(config.maxr, config.strength, settings.thresh, settings.mdiff),
            })
            .collect::<Vec<_>>();

        log::info!(
            "TTempSmooth: {} {}x{}, {} frames, maxr={}, mode={:?}, scthresh={}, fp={}",
            format,
            width,
            height,
            source.num_frames(),
            config.maxr,
            config.pmode,
            config.scthresh,
            config.fp
        );
        for (index, plane) in planes.iter().enumerate() {
            log::debug!(
                "Plane {}: {:?}, thresh={}, {:?}, cw={:.5}",
                PLANE_NAMES[index],
                plane.mode,
                plane.thresh,
                plane.table.regime(),
                plane.table.center_weight()
            );
        }

        Ok(Self {
            detector: SceneChangeDetector::new(config.scthresh),
            config,
            source,
            reference,
            format,
            width,
            height,
            planes,
        })
    }

    pub fn config(&self) -> &SmoothConfig {
        &self.config
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_frames(&self) -> usize {
        self.source.num_frames()
    }

    /// Weight table of plane `plane` (0..3).
    pub fn weight_table(&self, plane: usize) -> Option<&WeightTable> {
        self.planes.get(plane).map(|p| &p.table)
    }

    /// True when frames must be produced in order with an `IirMemory`.
    pub fn requires_memory(&self) -> bool {
        self.config.pmode == ProcessingMode::BestMatch
            && self
                .planes
                .iter()
                .any(|p| p.mode == PlaneMode::Filter && p.thupd > 0)
    }

    /// Allocates the best-match memory for this instance. Planes without a
    /// memory threshold get no cells.
    pub fn new_memory(&self) -> IirMemory {
        let mut dimensions = [None; 3];
        for (index, plane) in self.planes.iter().enumerate() {
            if self.config.pmode == ProcessingMode::BestMatch
                && plane.mode == PlaneMode::Filter
                && plane.thupd > 0
            {
                dimensions[index] = Some(self.format.plane_dimensions(index, self.width, self.height));
            }
        }
        IirMemory::new(dimensions, self.config.maxr)
    }

    /// Produces output frame `n`.
    ///
    /// In best-match mode with memory enabled, `memory` is required and `n`
    /// must follow the previously produced frame. In adaptive mode `memory`
    /// is ignored.
    pub fn get_frame(&self, n: usize, memory: Option<&mut IirMemory>) -> CoreResult<Frame> {
        let maxr = self.config.maxr;
        let src_window = Window::gather(self.source.as_ref(), n, maxr)?;
        let ref_window = match &self.reference {
            Some(reference) => Window::gather(reference.as_ref(), n, maxr)?,
            None => src_window.clone(),
        };

        let mut memory = match self.config.pmode {
            ProcessingMode::BestMatch => {
                if let Some(memory) = memory.as_deref() {
                    self.check_memory(memory)?;
                    memory.check_next(n)?;
                } else if self.requires_memory() {
                    return Err(CoreError::MissingMemory);
                }
                memory
            }
            ProcessingMode::Adaptive => None,
        };

        // Best-match scores the whole window regardless of cuts.
        let bounds = match self.config.pmode {
            ProcessingMode::Adaptive => self.detector.detect(&ref_window),
            ProcessingMode::BestMatch => ScanWindowBounds::full(maxr * 2 + 1),
        };
        let center = src_window.center();
        let mut output = Frame::new(self.format, self.width, self.height);

        for index in 0..self.format.num_planes {
            let Some(params) = self.planes.get(index) else {
                // Alpha follows the center frame.
                output.plane_mut(index).copy_from(center.plane(index));
                continue;
            };

            match params.mode {
                PlaneMode::Skip => {}
                PlaneMode::Copy => {
                    output.plane_mut(index).copy_from(center.plane(index));
                }
                PlaneMode::Filter => match self.config.pmode {
                    ProcessingMode::Adaptive => {
                        self.blend_plane(index, params, bounds, &src_window, &ref_window, &mut output)?;
                    }
                    ProcessingMode::BestMatch => {
                        let cells = memory
                            .as_deref_mut()
                            .and_then(|m| m.plane_mut(index))
                            .map(|m| m.cells_mut());
                        let stats = self.select_plane(
                            index,
                            params,
                            &src_window,
                            &ref_window,
                            &mut output,
                            cells,
                        )?;
                        log::trace!(
                            "Frame {} plane {}: {}/{} samples from other frames, {} memory hits",
                            n,
                            PLANE_NAMES[index],
                            stats.non_center,
                            stats.pixels,
                            stats.memory_hits
                        );
                    }
                },
            }
        }

        if let Some(memory) = memory {
            memory.claim(n)?;
        }
        Ok(output)
    }

    /// Iterates over every output frame in order, threading a fresh memory
    /// through the calls.
    pub fn frames(&self) -> SmoothedFrames<'_> {
        SmoothedFrames {
            filter: self,
            memory: self.new_memory(),
            next: 0,
        }
    }

    fn check_memory(&self, memory: &IirMemory) -> CoreResult<()> {
        for (index, plane) in self.planes.iter().enumerate() {
            if plane.mode != PlaneMode::Filter || plane.thupd == 0 {
                continue;
            }
            let expected = self.format.plane_dimensions(index, self.width, self.height);
            match memory.plane(index) {
                Some(cells) if (cells.width(), cells.height()) == expected => {}
                _ => {
                    return Err(CoreError::FrameGeometry(format!(
                        "memory does not cover plane {} ({}x{})",
                        PLANE_NAMES[index], expected.0, expected.1
                    )))
                }
            }
        }
        Ok(())
    }

    fn blend_plane(
        &self,
        index: usize,
        params: &PlaneParams,
        bounds: ScanWindowBounds,
        src: &Window,
        reference: &Window,
        output: &mut Frame,
    ) -> CoreResult<()> {
        let blend = AdaptiveBlend {
            table: &params.table,
            thresh: params.thresh,
            shift: self.format.depth_shift(),
            fp: self.config.fp,
            bounds,
        };
        let dst = output.plane_mut(index);
        match self.format.sample_type {
            SampleType::U8 => blend_typed::<u8>(&blend, index, src, reference, dst, self.config.parallel),
            SampleType::U16 => blend_typed::<u16>(&blend, index, src, reference, dst, self.config.parallel),
            SampleType::F32 => blend_typed::<f32>(&blend, index, src, reference, dst, self.config.parallel),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn select_plane(
        &self,
        index: usize,
        params: &PlaneParams,
        src: &Window,
        reference: &Window,
        output: &mut Frame,
        cells: Option<&mut [MemoryCell]>,
    ) -> CoreResult<SelectionStats> {
        let matcher = BestMatch {
            maxr: self.config.maxr,
            thresh: params.thresh,
            thupd: params.thupd,
            pnew: params.pnew,
        };
        let src_planes = typed_planes::<u8>(src, index)?;
        let ref_planes = typed_planes::<u8>(reference, index)?;
        let dst = typed_plane_mut::<u8>(output.plane_mut(index), index)?;
        Ok(matcher.select_plane(&src_planes, &ref_planes, dst, cells, self.config.parallel))
    }
}

fn typed_planes<T: Blendable>(window: &Window, index: usize) -> CoreResult<Vec<&Plane<T>>> {
    window
        .frames()
        .iter()
        .map(|frame| {
            frame.plane_as::<T>(index).ok_or_else(|| {
                CoreError::FrameGeometry(format!("plane {} does not hold {} samples", index, T::TYPE))
            })
        })
        .collect()
}

fn typed_plane_mut<T: Blendable>(data: &mut PlaneData, index: usize) -> CoreResult<&mut Plane<T>> {
    let found = data.sample_type();
    T::plane_mut(data).ok_or_else(|| {
        CoreError::FrameGeometry(format!(
            "output plane {} holds {} samples, expected {}",
            index,
            found,
            T::TYPE
        ))
    })
}

fn blend_typed<T: Blendable>(
    blend: &AdaptiveBlend<'_>,
    index: usize,
    src: &Window,
    reference: &Window,
    dst: &mut PlaneData,
    parallel: bool,
) -> CoreResult<()> {
    let src_planes = typed_planes::<T>(src, index)?;
    let ref_planes = typed_planes::<T>(reference, index)?;
    let dst = typed_plane_mut::<T>(dst, index)?;
    blend.blend_plane(&src_planes, &ref_planes, dst, parallel);
    Ok(())
}

/// In-order iterator over all output frames of a filter.
pub struct SmoothedFrames<'a> {
    filter: &'a TTempSmooth,
    memory: IirMemory,
    next: usize,
}

impl Iterator for SmoothedFrames<'_> {
    type Item = CoreResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.filter.num_frames() {
            return None;
        }
        let n = self.next;
        self.next += 1;
        Some(self.filter.get_frame(n, Some(&mut self.memory)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.filter.num_frames().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SmoothedFrames<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmoothConfigBuilder;
    use crate::source::VecSource;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn clip(values: &[u8]) -> Arc<dyn FrameSource> {
        let frames = values
            .iter()
            .map(|v| {
                Frame::from_planes(
                    FrameFormat::gray8(),
                    4,
                    2,
                    vec![PlaneData::U8(Plane::filled(4, 2, *v))],
                )
                .unwrap()
            })
            .collect();
        Arc::new(VecSource::new(frames).unwrap())
    }

    #[test]
    fn test_reference_length_must_match() {
        let result = TTempSmooth::new(
            SmoothConfig::default(),
            clip(&[1, 2, 3]),
            Some(clip(&[1, 2])),
        );
        assert!(matches!(result, Err(CoreError::ReferenceMismatch(_))));
    }

    #[test]
    fn test_best_match_rejects_high_bit_depth() {
        let format = FrameFormat::yuv444p(10).unwrap();
        let frame = Frame::new(format, 2, 2);
        let source: Arc<dyn FrameSource> = Arc::new(VecSource::new(vec![frame]).unwrap());
        let config = SmoothConfigBuilder::new()
            .pmode(ProcessingMode::BestMatch)
            .build()
            .unwrap();
        assert!(matches!(
            TTempSmooth::new(config, source, None),
            Err(CoreError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_memory_is_required_when_enabled() {
        let config = SmoothConfigBuilder::new()
            .pmode(ProcessingMode::BestMatch)
            .thupd(0, 4)
            .build()
            .unwrap();
        let filter = TTempSmooth::new(config, clip(&[5, 5, 5]), None).unwrap();
        assert!(filter.requires_memory());
        assert!(matches!(filter.get_frame(0, None), Err(CoreError::MissingMemory)));

        let mut memory = filter.new_memory();
        assert!(filter.get_frame(1, Some(&mut memory)).is_ok());
        assert!(matches!(
            filter.get_frame(0, Some(&mut memory)),
            Err(CoreError::OutOfOrderFrame { expected: 2, requested: 0 })
        ));
        memory.reset();
        assert!(filter.get_frame(0, Some(&mut memory)).is_ok());
    }

    /// Serves a gray clip but fails the first request for one frame.
    struct FlakySource {
        inner: VecSource,
        fail_on: usize,
        failed: AtomicBool,
    }

    impl FrameSource for FlakySource {
        fn format(&self) -> FrameFormat {
            self.inner.format()
        }

        fn width(&self) -> usize {
            self.inner.width()
        }

        fn height(&self) -> usize {
            self.inner.height()
        }

        fn num_frames(&self) -> usize {
            self.inner.num_frames()
        }

        fn get_frame(&self, n: usize) -> CoreResult<Arc<Frame>> {
            if n == self.fail_on && !self.failed.swap(true, Ordering::SeqCst) {
                return Err(CoreError::OperationFailed(format!("frame {} unavailable", n)));
            }
            self.inner.get_frame(n)
        }
    }

    #[test]
    fn test_failed_frame_can_be_retried_with_memory() {
        let config = SmoothConfigBuilder::new()
            .maxr(1)
            .pmode(ProcessingMode::BestMatch)
            .thupd(0, 4)
            .build()
            .unwrap();
        let frames = [7u8, 7, 7, 7]
            .iter()
            .map(|v| {
                Frame::from_planes(FrameFormat::gray8(), 4, 2, vec![PlaneData::U8(Plane::filled(4, 2, *v))])
                    .unwrap()
            })
            .collect();
        let source = FlakySource {
            inner: VecSource::new(frames).unwrap(),
            fail_on: 2,
            failed: AtomicBool::new(false),
        };
        let filter = TTempSmooth::new(config, Arc::new(source), None).unwrap();
        let mut memory = filter.new_memory();

        assert!(filter.get_frame(0, Some(&mut memory)).is_ok());
        assert!(filter.get_frame(1, Some(&mut memory)).is_err());
        assert_eq!(memory.next_frame(), Some(1));

        let frame = filter.get_frame(1, Some(&mut memory)).unwrap();
        assert!(frame.plane_as::<u8>(0).unwrap().samples().all(|s| s == 7));
        assert_eq!(memory.next_frame(), Some(2));
    }

    #[test]
    fn test_out_of_order_request_does_no_work() {
        let config = SmoothConfigBuilder::new()
            .pmode(ProcessingMode::BestMatch)
            .thupd(0, 4)
            .build()
            .unwrap();
        let filter = TTempSmooth::new(config, clip(&[3, 3, 3]), None).unwrap();
        let mut memory = filter.new_memory();
        filter.get_frame(0, Some(&mut memory)).unwrap();
        let before = memory.plane(0).unwrap().cell(0, 0);

        assert!(filter.get_frame(2, Some(&mut memory)).is_err());
        assert_eq!(memory.next_frame(), Some(1));
        assert_eq!(memory.plane(0).unwrap().cell(0, 0), before);
    }

    #[test]
    fn test_frames_iterator_covers_clip() {
        let filter = TTempSmooth::new(SmoothConfig::default(), clip(&[9, 9, 9, 9]), None).unwrap();
        let frames: Vec<Frame> = filter.frames().collect::<CoreResult<_>>().unwrap();
        assert_eq!(frames.len(), 4);
        for frame in frames {
            assert!(frame.plane_as::<u8>(0).unwrap().samples().all(|s| s == 9));
        }
    }
}

// ============================================================================
// ttempsmooth-core/src/frame.rs
// ============================================================================
//
// FRAME MODEL: Planar Frames, Planes and Sample Types
//
// This module defines the pixel containers the kernel reads and writes.
// Frames are planar: one `PlaneData` per component, each plane a row-strided
// buffer of 8-bit, 16-bit or 32-bit float samples. The host describes the
// layout with a `FrameFormat`; the kernel never introspects anything beyond
// what the format states.
//
// KEY COMPONENTS:
// - SampleType / Sample: the three supported sample representations
// - FrameFormat: sample type, bit depth, plane count and chroma subsampling
// - Plane<T>: a single row-strided plane
// - Frame: an ordered set of planes sharing one format

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// ============================================================================
// SAMPLE TYPES
// ============================================================================

/// Storage type of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    /// 8-bit unsigned integer samples.
    U8,
    /// 16-bit unsigned integer samples holding 9 to 16 significant bits.
    U16,
    /// 32-bit floating point samples, nominal range 0.0 to 1.0.
    F32,
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleType::U8 => write!(f, "u8"),
            SampleType::U16 => write!(f, "u16"),
            SampleType::F32 => write!(f, "f32"),
        }
    }
}

/// A sample type the kernel can operate on.
///
/// Implemented for `u8`, `u16` and `f32`. The plane accessors let generic
/// code pull a typed plane out of a `PlaneData` without matching on every
/// variant at each call site.
pub trait Sample: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE: SampleType;

    fn to_f32(self) -> f32;

    fn plane(data: &PlaneData) -> Option<&Plane<Self>>;

    fn plane_mut(data: &mut PlaneData) -> Option<&mut Plane<Self>>;

    fn wrap(plane: Plane<Self>) -> PlaneData;
}

impl Sample for u8 {
    const TYPE: SampleType = SampleType::U8;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    fn plane(data: &PlaneData) -> Option<&Plane<Self>> {
        match data {
            PlaneData::U8(p) => Some(p),
            _ => None,
        }
    }

    fn plane_mut(data: &mut PlaneData) -> Option<&mut Plane<Self>> {
        match data {
            PlaneData::U8(p) => Some(p),
            _ => None,
        }
    }

    fn wrap(plane: Plane<Self>) -> PlaneData {
        PlaneData::U8(plane)
    }
}

impl Sample for u16 {
    const TYPE: SampleType = SampleType::U16;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    fn plane(data: &PlaneData) -> Option<&Plane<Self>> {
        match data {
            PlaneData::U16(p) => Some(p),
            _ => None,
        }
    }

    fn plane_mut(data: &mut PlaneData) -> Option<&mut Plane<Self>> {
        match data {
            PlaneData::U16(p) => Some(p),
            _ => None,
        }
    }

    fn wrap(plane: Plane<Self>) -> PlaneData {
        PlaneData::U16(plane)
    }
}

impl Sample for f32 {
    const TYPE: SampleType = SampleType::F32;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    fn plane(data: &PlaneData) -> Option<&Plane<Self>> {
        match data {
            PlaneData::F32(p) => Some(p),
            _ => None,
        }
    }

    fn plane_mut(data: &mut PlaneData) -> Option<&mut Plane<Self>> {
        match data {
            PlaneData::F32(p) => Some(p),
            _ => None,
        }
    }

    fn wrap(plane: Plane<Self>) -> PlaneData {
        PlaneData::F32(plane)
    }
}

// ============================================================================
// FRAME FORMAT
// ============================================================================

/// Layout of a planar frame as described by the host.
///
/// Planes 1 and 2 are chroma and are subsampled by `2^subsampling_w`
/// horizontally and `2^subsampling_h` vertically. Plane 0 (luma) and an
/// optional plane 3 (alpha) are full size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFormat {
    pub sample_type: SampleType,
    pub bits_per_sample: u32,
    pub num_planes: usize,
    pub subsampling_w: u32,
    pub subsampling_h: u32,
}

impl FrameFormat {
    /// Creates and validates a frame format.
    pub fn new(
        sample_type: SampleType,
        bits_per_sample: u32,
        num_planes: usize,
        subsampling_w: u32,
        subsampling_h: u32,
    ) -> CoreResult<Self> {
        let bits_ok = match sample_type {
            SampleType::U8 => bits_per_sample == 8,
            SampleType::U16 => (9..=16).contains(&bits_per_sample),
            SampleType::F32 => bits_per_sample == 32,
        };
        if !bits_ok {
            return Err(CoreError::UnsupportedFormat(format!(
                "{} samples cannot hold {} bits",
                sample_type, bits_per_sample
            )));
        }
        if !(1..=4).contains(&num_planes) {
            return Err(CoreError::UnsupportedFormat(format!(
                "expected 1 to 4 planes, got {}",
                num_planes
            )));
        }
        if subsampling_w > 2 || subsampling_h > 2 {
            return Err(CoreError::UnsupportedFormat(format!(
                "chroma subsampling {}x{} is not supported",
                subsampling_w, subsampling_h
            )));
        }
        if num_planes < 3 && (subsampling_w != 0 || subsampling_h != 0) {
            return Err(CoreError::UnsupportedFormat(
                "subsampling requires chroma planes".to_string(),
            ));
        }

        Ok(Self {
            sample_type,
            bits_per_sample,
            num_planes,
            subsampling_w,
            subsampling_h,
        })
    }

    /// Single-plane 8-bit format.
    pub fn gray8() -> Self {
        Self {
            sample_type: SampleType::U8,
            bits_per_sample: 8,
            num_planes: 1,
            subsampling_w: 0,
            subsampling_h: 0,
        }
    }

    /// Three-plane 4:2:0 format at the given integer bit depth.
    pub fn yuv420p(bits_per_sample: u32) -> CoreResult<Self> {
        let sample_type = if bits_per_sample > 8 {
            SampleType::U16
        } else {
            SampleType::U8
        };
        Self::new(sample_type, bits_per_sample, 3, 1, 1)
    }

    /// Three-plane 4:4:4 format at the given integer bit depth.
    pub fn yuv444p(bits_per_sample: u32) -> CoreResult<Self> {
        let sample_type = if bits_per_sample > 8 {
            SampleType::U16
        } else {
            SampleType::U8
        };
        Self::new(sample_type, bits_per_sample, 3, 0, 0)
    }

    /// Three-plane 4:4:4 single precision float format.
    pub fn yuv444ps() -> Self {
        Self {
            sample_type: SampleType::F32,
            bits_per_sample: 32,
            num_planes: 3,
            subsampling_w: 0,
            subsampling_h: 0,
        }
    }

    /// Dimensions of `plane` for a frame of `width` x `height` luma samples.
    pub fn plane_dimensions(&self, plane: usize, width: usize, height: usize) -> (usize, usize) {
        if plane == 1 || plane == 2 {
            let round_w = (1usize << self.subsampling_w) - 1;
            let round_h = (1usize << self.subsampling_h) - 1;
            (
                (width + round_w) >> self.subsampling_w,
                (height + round_h) >> self.subsampling_h,
            )
        } else {
            (width, height)
        }
    }

    /// Largest representable sample value (1.0 for float).
    pub fn peak_value(&self) -> f32 {
        match self.sample_type {
            SampleType::F32 => 1.0,
            _ => ((1u32 << self.bits_per_sample) - 1) as f32,
        }
    }

    /// Shift that maps an integer difference onto the 8-bit scale.
    pub fn depth_shift(&self) -> u32 {
        match self.sample_type {
            SampleType::F32 => 0,
            _ => self.bits_per_sample - 8,
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = match (self.num_planes, self.subsampling_w, self.subsampling_h) {
            (1, _, _) => "gray".to_string(),
            (_, 1, 1) => "yuv420".to_string(),
            (_, 1, 0) => "yuv422".to_string(),
            (_, 0, 0) => "yuv444".to_string(),
            (_, w, h) => format!("yuv(ss {}x{})", w, h),
        };
        let alpha = if self.num_planes == 4 { "a" } else { "" };
        match self.sample_type {
            SampleType::F32 => write!(f, "{}{}ps", layout, alpha),
            _ => write!(f, "{}{}p{}", layout, alpha, self.bits_per_sample),
        }
    }
}

// ============================================================================
// PLANE
// ============================================================================

/// A single row-strided plane of samples.
///
/// `stride` is measured in samples and may exceed `width` when rows are
/// padded. Only the first `width` samples of each row are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    stride: usize,
}

impl<T: Sample> Plane<T> {
    /// Creates a zero-filled plane without row padding.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Creates a plane with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
            stride: width,
        }
    }

    /// Wraps tightly packed sample data.
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> CoreResult<Self> {
        Self::from_vec_padded(data, width, height, width)
    }

    /// Wraps sample data whose rows are `stride` samples apart.
    pub fn from_vec_padded(
        data: Vec<T>,
        width: usize,
        height: usize,
        stride: usize,
    ) -> CoreResult<Self> {
        if stride < width {
            return Err(CoreError::FrameGeometry(format!(
                "stride {} is smaller than width {}",
                stride, width
            )));
        }
        if data.len() != stride * height {
            return Err(CoreError::FrameGeometry(format!(
                "expected {} samples for {}x{} with stride {}, got {}",
                stride * height,
                width,
                height,
                stride,
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The meaningful samples of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[y * self.stride + x] = value;
    }

    /// Raw storage including row padding.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Copies the visible samples of `other`, ignoring padding on both sides.
    pub fn copy_from(&mut self, other: &Plane<T>) {
        for y in 0..self.height.min(other.height) {
            let n = self.width.min(other.width);
            self.row_mut(y)[..n].copy_from_slice(&other.row(y)[..n]);
        }
    }

    /// Iterator over the visible samples in raster order.
    pub fn samples(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.height).flat_map(move |y| self.row(y).iter().copied())
    }
}

/// A plane of any supported sample type.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaneData {
    U8(Plane<u8>),
    U16(Plane<u16>),
    F32(Plane<f32>),
}

impl PlaneData {
    /// Allocates a zero-filled plane of the given sample type.
    pub fn zeroed(sample_type: SampleType, width: usize, height: usize) -> Self {
        match sample_type {
            SampleType::U8 => PlaneData::U8(Plane::new(width, height)),
            SampleType::U16 => PlaneData::U16(Plane::new(width, height)),
            SampleType::F32 => PlaneData::F32(Plane::new(width, height)),
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            PlaneData::U8(_) => SampleType::U8,
            PlaneData::U16(_) => SampleType::U16,
            PlaneData::F32(_) => SampleType::F32,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            PlaneData::U8(p) => p.width(),
            PlaneData::U16(p) => p.width(),
            PlaneData::F32(p) => p.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            PlaneData::U8(p) => p.height(),
            PlaneData::U16(p) => p.height(),
            PlaneData::F32(p) => p.height(),
        }
    }

    /// Copies visible samples from a plane of the same type.
    ///
    /// Returns false when the sample types differ.
    pub fn copy_from(&mut self, other: &PlaneData) -> bool {
        match (self, other) {
            (PlaneData::U8(dst), PlaneData::U8(src)) => dst.copy_from(src),
            (PlaneData::U16(dst), PlaneData::U16(src)) => dst.copy_from(src),
            (PlaneData::F32(dst), PlaneData::F32(src)) => dst.copy_from(src),
            _ => return false,
        }
        true
    }
}

// ============================================================================
// FRAME
// ============================================================================

/// A planar frame: `format.num_planes` planes sharing one sample type.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    format: FrameFormat,
    width: usize,
    height: usize,
    planes: Vec<PlaneData>,
}

impl Frame {
    /// Allocates a zero-filled frame.
    pub fn new(format: FrameFormat, width: usize, height: usize) -> Self {
        let planes = (0..format.num_planes)
            .map(|p| {
                let (w, h) = format.plane_dimensions(p, width, height);
                PlaneData::zeroed(format.sample_type, w, h)
            })
            .collect();
        Self {
            format,
            width,
            height,
            planes,
        }
    }

    /// Assembles a frame from host-provided planes, checking their layout.
    pub fn from_planes(
        format: FrameFormat,
        width: usize,
        height: usize,
        planes: Vec<PlaneData>,
    ) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::FrameGeometry(format!(
                "frame dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if planes.len() != format.num_planes {
            return Err(CoreError::FrameGeometry(format!(
                "format {} has {} planes, got {}",
                format,
                format.num_planes,
                planes.len()
            )));
        }
        for (index, plane) in planes.iter().enumerate() {
            if plane.sample_type() != format.sample_type {
                return Err(CoreError::FrameGeometry(format!(
                    "plane {} holds {} samples, format expects {}",
                    index,
                    plane.sample_type(),
                    format.sample_type
                )));
            }
            let (w, h) = format.plane_dimensions(index, width, height);
            if plane.width() != w || plane.height() != h {
                return Err(CoreError::FrameGeometry(format!(
                    "plane {} is {}x{}, expected {}x{}",
                    index,
                    plane.width(),
                    plane.height(),
                    w,
                    h
                )));
            }
        }
        Ok(Self {
            format,
            width,
            height,
            planes,
        })
    }

    pub fn format(&self) -> &FrameFormat {
        &self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    pub fn plane(&self, index: usize) -> &PlaneData {
        &self.planes[index]
    }

    pub fn plane_mut(&mut self, index: usize) -> &mut PlaneData {
        &mut self.planes[index]
    }

    pub fn planes(&self) -> &[PlaneData] {
        &self.planes
    }

    /// Typed view of plane `index`, or `None` if the sample type differs.
    pub fn plane_as<T: Sample>(&self, index: usize) -> Option<&Plane<T>> {
        self.planes.get(index).and_then(T::plane)
    }

    /// True when both frames share format and dimensions.
    pub fn same_geometry(&self, other: &Frame) -> bool {
        self.format == other.format && self.width == other.width && self.height == other.height
    }
}

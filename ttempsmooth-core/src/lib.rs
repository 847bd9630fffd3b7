//! Core library for motion-adaptive temporal smoothing of planar video.
//!
//! This crate provides the TTempSmooth filter: per-plane weight tables,
//! scene-change window clamping, the adaptive chain blender and the 8-bit
//! best-match selector with its persistent per-pixel memory. Frame I/O is
//! left to the host, which supplies clips through the `FrameSource` trait.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ttempsmooth_core::{
//!     FrameFormat, FrameSource, SmoothConfigBuilder, SyntheticClip, TTempSmooth,
//! };
//!
//! let clip = SyntheticClip::new(FrameFormat::yuv420p(8).unwrap(), 32, 16, 6)
//!     .generate()
//!     .unwrap();
//! let source: Arc<dyn FrameSource> = Arc::new(clip.noisy_source().unwrap());
//!
//! let config = SmoothConfigBuilder::new().maxr(2).build().unwrap();
//! let filter = TTempSmooth::new(config, source, None).unwrap();
//!
//! let mut memory = filter.new_memory();
//! for n in 0..filter.num_frames() {
//!     let frame = filter.get_frame(n, Some(&mut memory)).unwrap();
//!     assert_eq!(frame.width(), 32);
//! }
//! ```

pub mod best_match;
pub mod blend;
pub mod config;
pub mod error;
pub mod frame;
pub mod memory;
pub mod processor;
pub mod scene;
pub mod source;
pub mod synthetic;
pub mod utils;
pub mod weights;

// Re-exports for public API
pub use config::{PlaneMode, PlaneSettings, ProcessingMode, SmoothConfig, SmoothConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use frame::{Frame, FrameFormat, Plane, PlaneData, Sample, SampleType};
pub use memory::IirMemory;
pub use processor::{SmoothedFrames, TTempSmooth};
pub use scene::{ScanWindowBounds, SceneChangeDetector};
pub use source::{FrameSource, VecSource, Window};
pub use synthetic::{psnr, GeneratedClip, SyntheticClip};
pub use weights::{WeightRegime, WeightTable};

//! End-to-end behavior of the filter over small clips.
//!
//! These tests drive `TTempSmooth` through in-memory sources and check the
//! observable guarantees: identity on static content, chain truncation,
//! scene-change clamping, memory freezing and plane dispatch.

use std::sync::Arc;

use ttempsmooth_core::config::{PlaneMode, ProcessingMode, SmoothConfigBuilder};
use ttempsmooth_core::synthetic::mean_psnr;
use ttempsmooth_core::{
    CoreError, Frame, FrameFormat, FrameSource, Plane, PlaneData, SampleType, SmoothConfig,
    SyntheticClip, TTempSmooth, VecSource,
};

/// A clip of 8-bit single-plane frames, each filled with one value.
fn gray_clip(values: &[u8]) -> Arc<dyn FrameSource> {
    let frames = values
        .iter()
        .map(|v| {
            Frame::from_planes(
                FrameFormat::gray8(),
                6,
                4,
                vec![PlaneData::U8(Plane::filled(6, 4, *v))],
            )
            .unwrap()
        })
        .collect();
    Arc::new(VecSource::new(frames).unwrap())
}

fn center_value(frame: &Frame) -> u8 {
    let plane = frame.plane_as::<u8>(0).unwrap();
    let value = plane.get(0, 0);
    assert!(plane.samples().all(|s| s == value), "plane is not uniform");
    value
}

fn adaptive(maxr: usize, thresh: u16, mdiff: u16, scthresh: f32) -> SmoothConfig {
    SmoothConfigBuilder::new()
        .maxr(maxr)
        .scthresh(scthresh)
        .all_planes(thresh, mdiff, PlaneMode::Filter)
        .build()
        .unwrap()
}

#[test]
fn test_identical_frames_are_reproduced_exactly() {
    let still = SyntheticClip::new(FrameFormat::yuv420p(8).unwrap(), 16, 8, 1)
        .noise(20.0)
        .generate()
        .unwrap();
    let frame = still.noisy[0].clone();
    let source: Arc<dyn FrameSource> =
        Arc::new(VecSource::new(vec![frame.clone(), frame.clone(), frame.clone()]).unwrap());

    for pmode in [ProcessingMode::Adaptive, ProcessingMode::BestMatch] {
        for fp in [true, false] {
            let config = SmoothConfigBuilder::new()
                .maxr(1)
                .scthresh(0.0)
                .pmode(pmode)
                .fp(fp)
                .build()
                .unwrap();
            let filter = TTempSmooth::new(config, source.clone(), None).unwrap();
            let mut memory = filter.new_memory();
            for n in 0..3 {
                let out = filter.get_frame(n, Some(&mut memory)).unwrap();
                assert_eq!(out, frame, "pmode {:?} fp {} frame {}", pmode, fp, n);
            }
        }
    }
}

#[test]
fn test_constant_planes_unchanged_at_every_depth() {
    let formats = [
        FrameFormat::yuv420p(8).unwrap(),
        FrameFormat::yuv420p(10).unwrap(),
        FrameFormat::yuv444p(16).unwrap(),
        FrameFormat::yuv444ps(),
    ];
    for format in formats {
        let clip = SyntheticClip::new(format, 8, 8, 5)
            .noise(0.0)
            .generate()
            .unwrap();
        let source: Arc<dyn FrameSource> = Arc::new(clip.noisy_source().unwrap());
        let filter = TTempSmooth::new(SmoothConfig::default(), source, None).unwrap();
        for (n, expected) in clip.clean.iter().enumerate() {
            let out = filter.get_frame(n, None).unwrap();
            match (out.plane(0), expected.plane(0)) {
                (PlaneData::F32(a), PlaneData::F32(b)) => {
                    for (x, y) in a.samples().zip(b.samples()) {
                        assert!((x - y).abs() < 1e-5, "{} vs {}", x, y);
                    }
                }
                _ => assert_eq!(&out, expected, "format {}", format),
            }
        }
    }
}

#[test]
fn test_chain_truncates_at_first_failure() {
    // Center is frame 2. Frame 1 is thresh + 1 away, frame 0 thresh - 1.
    let config = adaptive(2, 4, 2, 0.0);
    let filter = TTempSmooth::new(config.clone(), gray_clip(&[103, 105, 100, 100, 100]), None).unwrap();
    let out = center_value(&filter.get_frame(2, None).unwrap());
    assert_eq!(out, 100);

    let far = TTempSmooth::new(config, gray_clip(&[250, 105, 100, 100, 100]), None).unwrap();
    assert_eq!(center_value(&far.get_frame(2, None).unwrap()), out);
}

#[test]
fn test_scene_change_clamps_window_at_threshold() {
    // scthresh 10 means a normalized mean difference above 0.1.
    let config = adaptive(2, 256, 0, 10.0);

    // 26 / 255 > 0.1: the future side is cut off.
    let cut = TTempSmooth::new(config.clone(), gray_clip(&[100, 100, 100, 126, 126]), None).unwrap();
    assert_eq!(center_value(&cut.get_frame(2, None).unwrap()), 100);

    // 25 / 255 < 0.1: the future frames blend in.
    let no_cut = TTempSmooth::new(config.clone(), gray_clip(&[100, 100, 100, 125, 125]), None).unwrap();
    assert!(center_value(&no_cut.get_frame(2, None).unwrap()) > 100);

    // Same on the past side.
    let cut = TTempSmooth::new(config, gray_clip(&[60, 60, 100, 100, 100]), None).unwrap();
    assert_eq!(center_value(&cut.get_frame(2, None).unwrap()), 100);
}

#[test]
fn test_disabled_scene_detection_blends_across_cut() {
    let filter = TTempSmooth::new(adaptive(2, 256, 0, 0.0), gray_clip(&[10, 10, 10, 200, 200]), None).unwrap();
    assert!(center_value(&filter.get_frame(2, None).unwrap()) > 10);
}

#[test]
fn test_best_match_memory_freezes_output() {
    let values = [100, 100, 100, 101, 101, 101, 101];
    let build = |thupd: u32| {
        let config = SmoothConfigBuilder::new()
            .maxr(1)
            .scthresh(0.0)
            .pmode(ProcessingMode::BestMatch)
            .thresh(0, 16)
            .thupd(0, thupd)
            .build()
            .unwrap();
        TTempSmooth::new(config, gray_clip(&values), None).unwrap()
    };

    let with_memory: Vec<u8> = build(4)
        .frames()
        .map(|f| center_value(&f.unwrap()))
        .collect();
    let without_memory: Vec<u8> = build(0)
        .frames()
        .map(|f| center_value(&f.unwrap()))
        .collect();

    assert_eq!(with_memory, vec![100; 7]);
    assert_eq!(&without_memory[3..], &[101, 101, 101, 101]);
}

#[test]
fn test_best_match_requires_in_order_frames() {
    let config = SmoothConfigBuilder::new()
        .pmode(ProcessingMode::BestMatch)
        .thupd(0, 2)
        .build()
        .unwrap();
    let filter = TTempSmooth::new(config, gray_clip(&[1, 2, 3, 4]), None).unwrap();
    let mut memory = filter.new_memory();

    filter.get_frame(0, Some(&mut memory)).unwrap();
    filter.get_frame(1, Some(&mut memory)).unwrap();
    let err = filter.get_frame(3, Some(&mut memory)).unwrap_err();
    assert!(matches!(err, CoreError::OutOfOrderFrame { expected: 2, requested: 3 }));
    assert_eq!(memory.next_frame(), Some(2));
}

fn best_match(maxr: usize, scthresh: f32, thresh: u16, thupd: u32) -> SmoothConfig {
    SmoothConfigBuilder::new()
        .maxr(maxr)
        .scthresh(scthresh)
        .pmode(ProcessingMode::BestMatch)
        .thresh(0, thresh)
        .thupd(0, thupd)
        .build()
        .unwrap()
}

fn best_match_center(values: &[u8], config: SmoothConfig) -> u8 {
    let n = values.len() / 2;
    let filter = TTempSmooth::new(config, gray_clip(values), None).unwrap();
    let mut memory = filter.new_memory();
    center_value(&filter.get_frame(n, Some(&mut memory)).unwrap())
}

#[test]
fn test_best_match_isolated_center_between_cuts() {
    // Cuts on both sides of the center. The whole window is still scored:
    // 200 wins with a sum of 195 and the gate rejects it.
    assert_eq!(best_match_center(&[200, 200, 5, 200, 200], best_match(2, 10.0, 8, 0)), 5);

    // Same shape, but the winner is close enough to pass the gate.
    assert_eq!(best_match_center(&[20, 20, 14, 20, 20], best_match(2, 2.0, 8, 0)), 20);
    assert_eq!(best_match_center(&[20, 20, 14, 20, 20], best_match(2, 0.0, 8, 0)), 20);
}

#[test]
fn test_best_match_cut_next_to_center() {
    // The cut sits right after (then right before) the center, yet the
    // center still takes part and wins with 380 against 382.
    for values in [[10, 10, 12, 200, 200], [200, 200, 12, 10, 10]] {
        let with_cut = best_match_center(&values, best_match(2, 10.0, 4, 0));
        let without_detection = best_match_center(&values, best_match(2, 0.0, 4, 0));
        assert_eq!(with_cut, 12, "clip {:?}", values);
        assert_eq!(with_cut, without_detection, "clip {:?}", values);
    }
}

#[test]
fn test_best_match_memory_across_cuts() {
    let filter = TTempSmooth::new(best_match(1, 10.0, 8, 4), gray_clip(&[200, 5, 200]), None).unwrap();
    let output: Vec<u8> = filter
        .frames()
        .map(|f| center_value(&f.unwrap()))
        .collect();
    assert_eq!(output, vec![200, 5, 200]);
}

#[test]
fn test_reference_clip_drives_similarity() {
    // The source alone would reject 94, but a flat reference accepts every
    // candidate at full weight: (94 + 100 + 100) / 3.
    let source = gray_clip(&[94, 100, 100]);
    let flat = TTempSmooth::new(adaptive(1, 4, 2, 0.0), source.clone(), Some(gray_clip(&[50, 50, 50]))).unwrap();
    assert_eq!(center_value(&flat.get_frame(1, None).unwrap()), 98);

    let own = TTempSmooth::new(adaptive(1, 4, 2, 0.0), source, None).unwrap();
    assert_eq!(center_value(&own.get_frame(1, None).unwrap()), 100);

    // A reference that jumps rejects every candidate, even though the
    // source would have accepted the 103s.
    let source = gray_clip(&[103, 100, 103]);
    let jumpy = TTempSmooth::new(adaptive(1, 4, 2, 0.0), source.clone(), Some(gray_clip(&[0, 100, 200]))).unwrap();
    assert_eq!(center_value(&jumpy.get_frame(1, None).unwrap()), 100);

    let own = TTempSmooth::new(adaptive(1, 4, 2, 0.0), source, None).unwrap();
    assert!(center_value(&own.get_frame(1, None).unwrap()) > 100);
}

#[test]
fn test_reference_geometry_must_match() {
    let source = gray_clip(&[1, 2, 3]);
    let wide = Frame::new(FrameFormat::gray8(), 7, 4);
    let reference: Arc<dyn FrameSource> = Arc::new(VecSource::new(vec![wide.clone(), wide.clone(), wide]).unwrap());
    assert!(matches!(
        TTempSmooth::new(SmoothConfig::default(), source, Some(reference)),
        Err(CoreError::ReferenceMismatch(_))
    ));
}

#[test]
fn test_plane_modes_and_alpha() {
    // 4:4:4 with alpha.
    let format = FrameFormat::new(SampleType::U8, 8, 4, 0, 0).unwrap();
    let clip = SyntheticClip::new(format, 8, 4, 3).noise(30.0).generate().unwrap();
    let source: Arc<dyn FrameSource> = Arc::new(clip.noisy_source().unwrap());

    let config = SmoothConfigBuilder::new()
        .plane_mode(1, PlaneMode::Copy)
        .plane_mode(2, PlaneMode::Skip)
        .build()
        .unwrap();
    let filter = TTempSmooth::new(config, source, None).unwrap();
    let out = filter.get_frame(1, None).unwrap();
    let center = &clip.noisy[1];

    assert_eq!(out.plane(1), center.plane(1));
    assert!(out.plane_as::<u8>(2).unwrap().samples().all(|s| s == 0));
    assert_eq!(out.plane(3), center.plane(3));
}

#[test]
fn test_filtering_reduces_noise() {
    let clip = SyntheticClip::new(FrameFormat::yuv420p(8).unwrap(), 48, 32, 12)
        .noise(6.0)
        .seed(3)
        .generate()
        .unwrap();
    let source: Arc<dyn FrameSource> = Arc::new(clip.noisy_source().unwrap());
    let before = mean_psnr(&clip.noisy, &clip.clean, 0).unwrap();

    for pmode in [ProcessingMode::Adaptive, ProcessingMode::BestMatch] {
        let config = SmoothConfigBuilder::new()
            .maxr(3)
            .pmode(pmode)
            .all_planes(16, 4, PlaneMode::Filter)
            .build()
            .unwrap();
        let filter = TTempSmooth::new(config, source.clone(), None).unwrap();
        let smoothed: Vec<Frame> = filter.frames().collect::<Result<_, _>>().unwrap();
        let after = mean_psnr(&smoothed, &clip.clean, 0).unwrap();
        assert!(after > before + 1.0, "{:?}: {:.2} dB -> {:.2} dB", pmode, before, after);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let clip = SyntheticClip::new(FrameFormat::yuv420p(10).unwrap(), 33, 17, 5)
        .noise(8.0)
        .scene_cut(Some(3))
        .generate()
        .unwrap();
    let source: Arc<dyn FrameSource> = Arc::new(clip.noisy_source().unwrap());

    let run = |parallel: bool| {
        let config = SmoothConfigBuilder::new().parallel(parallel).build().unwrap();
        let filter = TTempSmooth::new(config, source.clone(), None).unwrap();
        filter.frames().collect::<Result<Vec<_>, _>>().unwrap()
    };
    assert_eq!(run(true), run(false));
}

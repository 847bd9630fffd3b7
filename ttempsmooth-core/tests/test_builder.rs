use ttempsmooth_core::config::{PlaneMode, ProcessingMode, SmoothConfig, SmoothConfigBuilder};

#[test]
fn test_builder_pattern() {
    let config = SmoothConfigBuilder::new()
        .maxr(5)
        .strength(3)
        .scthresh(0.0)
        .fp(false)
        .pmode(ProcessingMode::BestMatch)
        .parallel(false)
        .all_planes(10, 4, PlaneMode::Filter)
        .plane_mode(2, PlaneMode::Copy)
        .build()
        .unwrap();

    assert_eq!(config.maxr, 5);
    assert_eq!(config.strength, 3);
    assert_eq!(config.scthresh, 0.0);
    assert!(!config.fp);
    assert!(!config.parallel);
    assert_eq!(config.pmode, ProcessingMode::BestMatch);
    assert!(config.planes.iter().all(|p| p.thresh == 10 && p.mdiff == 4));
    assert_eq!(config.planes[2].mode, PlaneMode::Copy);
}

#[test]
fn test_builder_starts_from_existing_config() {
    let base = SmoothConfigBuilder::new().maxr(1).build().unwrap();
    let derived = SmoothConfigBuilder::from_config(base.clone())
        .thresh(0, 12)
        .build()
        .unwrap();

    assert_eq!(derived.maxr, 1);
    assert_eq!(derived.planes[0].thresh, 12);
    assert_eq!(derived.planes[1], base.planes[1]);
    assert_ne!(derived, SmoothConfig::default());
}

//! Regression baselines for the shipped map calibrations.
//!
//! The per-map multipliers and offsets were tuned by eye. They are recorded
//! here verbatim so any change to them is deliberate.

#[cfg(test)]
mod calibration_regression_tests {
    use annomap::{
        core::{calibration::CalibrationRegistry, projection::MapProjection},
        CoordinateTransform, Point, WorldPoint,
    };

    const EPS: f64 = 1e-9;

    /// (map, extent, tiles wide, tiles high, multiplier, offset)
    const BASELINES: &[(&str, [f64; 4], u32, u32, (f64, f64), (f64, f64))] = &[
        ("dam", [0.0, 0.0, 8192.0, 8192.0], 16, 16, (1.0, 1.0), (0.0, 0.0)),
        ("spaceport", [0.0, 0.0, 9216.0, 6144.0], 9, 6, (0.56, 0.56), (0.0, 0.0)),
        ("buried-city", [0.0, 0.0, 15360.0, 10240.0], 15, 10, (0.93, 0.93), (2.0, -2.0)),
        ("blue-gate", [0.0, 0.0, 10240.0, 8192.0], 10, 8, (0.53, 0.53), (-50.5, 11.0)),
    ];

    #[test]
    fn test_builtin_values_match_baselines() {
        let registry = CalibrationRegistry::builtin();
        assert_eq!(registry.len(), BASELINES.len());

        for (name, extent, wide, high, multiplier, offset) in BASELINES {
            let calibration = registry.get(name).expect("baseline map missing");
            let e = &calibration.world_extent;
            assert_eq!([e.min_x, e.min_y, e.max_x, e.max_y], *extent, "{} extent", name);
            assert_eq!(calibration.tile_size, 512, "{} tile size", name);
            assert_eq!(calibration.native_max_zoom, 4, "{} native max zoom", name);
            assert_eq!((calibration.tiles_wide, calibration.tiles_high), (*wide, *high), "{} grid", name);
            assert_eq!(
                (calibration.manual_scale_multiplier.x, calibration.manual_scale_multiplier.y),
                *multiplier,
                "{} multiplier",
                name
            );
            assert_eq!(
                (calibration.manual_offset.x, calibration.manual_offset.y),
                *offset,
                "{} offset",
                name
            );
        }
    }

    #[test]
    fn test_extent_corners_land_on_canvas() {
        let registry = CalibrationRegistry::builtin();

        for (name, calibration) in registry.iter() {
            let projection = MapProjection::new(calibration);
            let size = calibration.tile_size as f64;
            let tolerance = Point::new(
                calibration.manual_offset.x.abs() + EPS,
                calibration.manual_offset.y.abs() + EPS,
            );

            let corners = calibration.world_extent.corners();
            for corner in projection.project_all(&corners) {
                assert!(
                    corner.x >= -tolerance.x && corner.x <= size + tolerance.x,
                    "{}: corner x {} off canvas",
                    name,
                    corner.x
                );
                assert!(
                    corner.y >= -tolerance.y && corner.y <= size + tolerance.y,
                    "{}: corner y {} off canvas",
                    name,
                    corner.y
                );
            }
        }
    }

    #[test]
    fn test_dam_center_lands_on_canvas_center() {
        let registry = CalibrationRegistry::builtin();
        let projection = MapProjection::new(registry.get("dam").unwrap());
        let center = projection.project_unadjusted(WorldPoint::new(4096.0, 4096.0));
        assert!((center.x - 256.0).abs() < EPS && (center.y - 256.0).abs() < EPS);
    }

    #[test]
    fn test_unproject_inverts_project_for_every_map() {
        let registry = CalibrationRegistry::builtin();
        for (name, calibration) in registry.iter() {
            let projection = MapProjection::new(calibration);
            let world = WorldPoint::new(1234.5, 2345.25);
            let back = projection.unproject(projection.project(world));
            assert!(
                (back.x - world.x).abs() < 1e-6 && (back.y - world.y).abs() < 1e-6,
                "{}: {:?} came back as {:?}",
                name,
                world,
                back
            );
        }
    }

    #[test]
    fn test_calibration_file_overrides_defaults() {
        let json = r#"{
            "dam": { "worldExtent": [0, 0, 8192, 8192], "tileSize": 512,
                     "tilesWide": 16, "tilesHigh": 16, "center": [4096, 4096] },
            "test-range": { "worldExtent": [0, 0, 2048, 1024], "tileSize": 256,
                            "tilesWide": 8, "tilesHigh": 4, "nativeMaxZoom": 3,
                            "manualScaleMultiplier": [0.9, 1.1], "manualOffset": [1, -1] }
        }"#;
        let registry = CalibrationRegistry::from_json(json).unwrap();
        let range = registry.get("test-range").unwrap();
        assert_eq!(range.native_max_zoom, 3);
        assert_eq!(range.manual_scale_multiplier, Point::new(0.9, 1.1));
        assert_eq!(range.manual_offset, Point::new(1.0, -1.0));
        assert_eq!(registry.get("dam").unwrap().manual_scale_multiplier, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_invalid_calibration_file_rejected() {
        let json = r#"{ "broken": { "worldExtent": [0, 0, 0, 100], "tileSize": 512,
                                    "tilesWide": 1, "tilesHigh": 1 } }"#;
        assert!(CalibrationRegistry::from_json(json).is_err());
    }
}

#[cfg(test)]
mod viewer_lifecycle_tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::path::Path;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use annomap::{
        layers::LayerType,
        tiles::{loader::TileFetch, TileCache},
        AnnotationCatalog, AnnotationRecord, CalibrationRegistry, CategoryTaxonomy, MapError,
        DrawCommand, MapCalibration, Point, TileLoader, ViewController, ViewerConfig, ViewerState,
        WorldExtent, WorldPoint,
    };

    struct MemoryFetch;

    impl TileFetch for MemoryFetch {
        fn fetch(&self, _path: &Path) -> annomap::Result<Vec<u8>> {
            Ok(vec![0; 4])
        }
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn catalog() -> AnnotationCatalog {
        AnnotationCatalog::from_records(vec![
            AnnotationRecord::new("d1", "containers", "raider_cache", WorldPoint::new(4096.0, 4096.0), "dam")
                .with_label("Center Cache"),
            AnnotationRecord::new("d2", "containers", "raider_cache", WorldPoint::new(1000.0, 1000.0), "dam"),
            AnnotationRecord::new("d3", "arc", "wasp", WorldPoint::new(7000.0, 2000.0), "dam"),
            AnnotationRecord::new("d4", "nature", "olive", WorldPoint::new(2000.0, 7000.0), "dam"),
            AnnotationRecord::new("d5", "mystery", "thing", WorldPoint::new(100.0, 100.0), "dam"),
            AnnotationRecord::new("s1", "arc", "wasp", WorldPoint::new(4608.0, 3072.0), "spaceport"),
            AnnotationRecord::new("s2", "locations", "extraction", WorldPoint::new(100.0, 200.0), "spaceport"),
        ])
    }

    fn viewer() -> ViewController {
        init_logging();
        ViewController::new(
            Point::new(800.0, 600.0),
            Ok(CalibrationRegistry::builtin()),
            catalog(),
            CategoryTaxonomy::builtin().clone(),
            ViewerConfig::default(),
        )
        .with_tile_loader(TileLoader::new(Arc::new(MemoryFetch), TileCache::new(64)))
    }

    fn ready(map: &str) -> ViewerState {
        ViewerState::Ready {
            map: map.to_string(),
        }
    }

    #[test]
    fn test_mount_loads_default_map() {
        let mut viewer = viewer();
        assert_eq!(viewer.state(), &ViewerState::Empty);

        viewer.mount().unwrap();
        assert_eq!(viewer.state(), &ready("dam"));
        assert_eq!(viewer.active_map(), Some("dam"));
        // the unknown subcategory is not part of the initial filter
        assert_eq!(viewer.marker_count(), 4);
        assert!(viewer.group_keys().contains("mystery_thing"));
    }

    #[test]
    fn test_unknown_map_keeps_current_view() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();
        let generation = viewer.generation();

        let err = viewer.load_map("atlantis").unwrap_err();
        assert!(matches!(err, MapError::UnknownMap(ref name) if name == "atlantis"));
        assert_eq!(viewer.state(), &ready("dam"));
        assert_eq!(viewer.generation(), generation);
        assert_eq!(viewer.marker_count(), 4);
    }

    #[test]
    fn test_round_trip_does_not_leak_groups() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();
        let first_count = viewer.marker_count();
        let first_layers = viewer.surface().unwrap().layers().len();

        viewer.load_map("spaceport").unwrap();
        assert_eq!(viewer.marker_count(), 2);

        viewer.load_map("dam").unwrap();
        assert_eq!(viewer.marker_count(), first_count);
        assert_eq!(viewer.surface().unwrap().layers().len(), first_layers);
    }

    #[test]
    fn test_empty_filter_removes_every_marker_layer() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();
        let all: BTreeSet<String> = viewer.group_keys();

        let cleared = viewer.apply_filter(Vec::<String>::new()).unwrap();
        assert_eq!(cleared.removed, 3);
        assert_eq!(viewer.marker_count(), 0);
        // only the tile layer is left
        let layers = viewer.surface().unwrap().layers();
        assert!(layers.ids_of_type(LayerType::Marker).is_empty());
        assert_eq!(layers.ids_of_type(LayerType::Tile), vec!["dam-tiles"]);

        let restored = viewer.apply_filter(all.clone()).unwrap();
        assert_eq!(restored.added, 4);
        assert_eq!(viewer.marker_count(), 5);

        let again = viewer.apply_filter(all).unwrap();
        assert!(again.is_noop());
        assert_eq!(viewer.marker_count(), 5);
    }

    #[test]
    fn test_category_toggle_cascades() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();

        viewer.set_category("containers", false).unwrap();
        assert!(!viewer.is_category_checked("containers"));
        assert!(!viewer.filter().contains("containers_raider_cache"));
        assert!(!viewer.surface().unwrap().is_attached("containers_raider_cache"));
        assert_eq!(viewer.marker_count(), 2);

        viewer.set_category("containers", true).unwrap();
        assert!(viewer.is_category_checked("containers"));
        assert_eq!(viewer.marker_count(), 4);

        // checking an already-checked category duplicates nothing
        let outcome = viewer.set_category("containers", true).unwrap();
        assert!(outcome.is_noop());
        assert_eq!(viewer.marker_count(), 4);
    }

    #[test]
    fn test_filter_survives_map_switch() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();
        viewer.set_visible("arc_wasp", false).unwrap();

        viewer.load_map("spaceport").unwrap();
        assert!(!viewer.surface().unwrap().is_attached("arc_wasp"));
        assert_eq!(viewer.marker_count(), 1);
    }

    #[test]
    fn test_show_and_hide_all() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();

        viewer.hide_all().unwrap();
        assert_eq!(viewer.marker_count(), 0);

        viewer.show_all().unwrap();
        assert_eq!(viewer.marker_count(), 4);
    }

    #[test]
    fn test_missing_calibration_disables_viewer() {
        init_logging();
        let mut viewer = ViewController::new(
            Point::new(800.0, 600.0),
            Err(MapError::CalibrationUnavailable),
            catalog(),
            CategoryTaxonomy::builtin().clone(),
            ViewerConfig::default(),
        );
        assert_eq!(viewer.state(), &ViewerState::Disabled);
        assert!(matches!(viewer.load_map("dam"), Err(MapError::CalibrationUnavailable)));
        assert!(viewer.available_maps().is_empty());
        assert_eq!(viewer.render().unwrap().get_drawing_queue().len(), 0);

        viewer.destroy();
        assert_eq!(viewer.state(), &ViewerState::Disabled);
    }

    #[test]
    fn test_destroy_releases_surface() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();
        viewer.destroy();

        assert_eq!(viewer.state(), &ViewerState::Empty);
        assert!(viewer.surface().is_none());
        assert_eq!(viewer.marker_count(), 0);

        viewer.load_map("dam").unwrap();
        assert_eq!(viewer.marker_count(), 4);
    }

    #[test]
    fn test_stale_tiles_are_dropped() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();
        viewer.load_map("spaceport").unwrap();

        let requested = {
            let tiles = viewer.surface().unwrap().tile_layer().unwrap();
            tiles.pending_count()
        };
        assert!(requested > 0);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut applied = 0;
        loop {
            applied += viewer.poll_tiles();
            let pending = viewer.surface().unwrap().tile_layer().unwrap().pending_count();
            if pending == 0 || Instant::now() > deadline {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        let tiles = viewer.surface().unwrap().tile_layer().unwrap();
        assert_eq!(tiles.pending_count(), 0, "tiles never arrived");
        assert_eq!(applied, requested);
        assert_eq!(tiles.loaded_count(), requested);
        assert!(tiles.visible_tiles().all(|address| address.map_name == "spaceport"));
    }

    #[test]
    fn test_render_draws_tiles_under_markers() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();
        viewer.zoom_to(-1.0, None);

        let frame = viewer.render().unwrap();
        assert_eq!(frame.tile_count(), 1);
        assert_eq!(frame.marker_count(), 4);
        assert!(matches!(
            frame.get_drawing_queue().first(),
            Some(DrawCommand::Tile { .. })
        ));
    }

    #[test]
    fn test_marker_click_opens_popup_and_notifies() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();

        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicks);
        viewer.on_marker_click(move |click| sink.borrow_mut().push(click.clone()));

        // d1 sits at the surface center, which is the middle of the container
        let click = viewer.click(Point::new(402.0, 299.0)).expect("marker hit");
        assert_eq!(click.record_id, "d1");
        assert_eq!(click.key, "containers_raider_cache");
        assert_eq!(click.label, "Raider Cache");
        assert_eq!(click.instance_label.as_deref(), Some("Center Cache"));
        assert_eq!(click.world_position, WorldPoint::new(4096.0, 4096.0));
        assert_eq!(clicks.borrow().len(), 1);

        let popup = viewer.open_popup().expect("popup open");
        assert_eq!(popup.text(), "Raider Cache\nCenter Cache");

        // hiding the marker's group closes its popup
        viewer.set_visible("containers_raider_cache", false).unwrap();
        assert!(viewer.open_popup().is_none());
        assert!(viewer.click(Point::new(400.0, 300.0)).is_none());
        assert_eq!(clicks.borrow().len(), 1);
    }

    #[test]
    fn test_click_on_empty_space_closes_popup() {
        let mut viewer = viewer();
        viewer.load_map("dam").unwrap();
        viewer.click(Point::new(400.0, 300.0)).expect("marker hit");

        assert!(viewer.click(Point::new(10.0, 10.0)).is_none());
        assert!(viewer.open_popup().is_none());
    }

    #[test]
    fn test_padded_subcategory_is_shown_with_its_glyph() {
        init_logging();
        let catalog = AnnotationCatalog::from_records(vec![AnnotationRecord::new(
            "h1",
            "arc",
            "hornet ",
            WorldPoint::new(4096.0, 4096.0),
            "dam",
        )]);
        let mut viewer = ViewController::new(
            Point::new(800.0, 600.0),
            Ok(CalibrationRegistry::builtin()),
            catalog,
            CategoryTaxonomy::builtin().clone(),
            ViewerConfig::default(),
        )
        .with_tile_loader(TileLoader::new(Arc::new(MemoryFetch), TileCache::new(8)));

        viewer.load_map("dam").unwrap();
        assert_eq!(viewer.marker_count(), 1);
        assert!(viewer.surface().unwrap().is_attached("arc_hornet"));

        viewer.hide_all().unwrap();
        viewer.show_all().unwrap();
        assert_eq!(viewer.marker_count(), 1);

        let frame = viewer.render().unwrap();
        let glyphs: Vec<&str> = frame
            .get_drawing_queue()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Marker { icon, .. } => Some(icon.glyph.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(glyphs, vec!["🐝"]);
    }

    #[test]
    fn test_group_named_like_tile_layer_keeps_imagery() {
        init_logging();
        let mut calibrations = CalibrationRegistry::new();
        calibrations
            .insert(
                "old_town",
                MapCalibration::new(WorldExtent::new(0.0, 0.0, 4096.0, 4096.0), 256, 4, 4),
            )
            .unwrap();
        let catalog = AnnotationCatalog::from_records(vec![
            AnnotationRecord::new("c1", "old", "town-tiles", WorldPoint::new(10.0, 10.0), "old_town"),
            AnnotationRecord::new("c2", "arc", "wasp", WorldPoint::new(2048.0, 2048.0), "old_town"),
        ]);
        let mut viewer = ViewController::new(
            Point::new(800.0, 600.0),
            Ok(calibrations),
            catalog,
            CategoryTaxonomy::builtin().clone(),
            ViewerConfig::default(),
        )
        .with_tile_loader(TileLoader::new(Arc::new(MemoryFetch), TileCache::new(8)));

        viewer.load_map("old_town").unwrap();
        assert_eq!(viewer.state(), &ready("old_town"));
        let outcome = viewer.apply_filter(vec!["old_town-tiles", "arc_wasp"]).unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(viewer.marker_count(), 1);
        viewer.hide_all().unwrap();

        let layers = viewer.surface().unwrap().layers();
        assert_eq!(layers.ids_of_type(LayerType::Tile), vec!["old_town-tiles"]);
        assert!(viewer.surface().unwrap().tile_layer().is_some());
        assert_eq!(viewer.marker_count(), 0);
    }
}

use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::Path;

use annomap::{
    data::taxonomy::layer_key, AnnotationCatalog, CalibrationRegistry, CategoryTaxonomy, Color,
    DrawCommand, MapError, Point, TileAddress, ViewController, ViewerConfig, ViewerState,
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, TextureHandle, Vec2};
use lru::LruCache;

const CALIBRATION_FILE: &str = "assets/maps/calibration.json";
const ANNOTATION_FILE: &str = "assets/maps/annotations.json";
const CONFIG_FILE: &str = "assets/viewer.json";

/// Standalone annotated map viewer
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_title("annomap"),
        ..Default::default()
    };

    eframe::run_native(
        "annomap-app",
        options,
        Box::new(|cc| Box::new(ViewerApp::new(cc))),
    )
    .map_err(|e| anyhow::anyhow!("viewer window failed: {}", e))?;

    Ok(())
}

fn load_config() -> ViewerConfig {
    if !Path::new(CONFIG_FILE).exists() {
        return ViewerConfig::default();
    }
    match ViewerConfig::from_file(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("ignoring {}: {}", CONFIG_FILE, e);
            ViewerConfig::default()
        }
    }
}

fn load_calibrations() -> annomap::Result<CalibrationRegistry> {
    if !Path::new(CALIBRATION_FILE).exists() {
        log::info!("{} not found, using built-in calibrations", CALIBRATION_FILE);
        return Ok(CalibrationRegistry::builtin());
    }
    let file = File::open(CALIBRATION_FILE)?;
    CalibrationRegistry::from_reader(BufReader::new(file))
}

fn load_catalog() -> AnnotationCatalog {
    let opened = File::open(ANNOTATION_FILE).map_err(MapError::from);
    match opened.and_then(|file| AnnotationCatalog::from_reader(BufReader::new(file))) {
        Ok(catalog) => {
            log::info!("loaded {} annotations for {} maps", catalog.len(), catalog.maps().len());
            catalog
        }
        Err(e) => {
            log::warn!("no annotations loaded from {}: {}", ANNOTATION_FILE, e);
            AnnotationCatalog::new()
        }
    }
}

fn to_color32(color: Color, opacity: f32) -> Color32 {
    let alpha = (color.a as f32 * opacity.clamp(0.0, 1.0)) as u8;
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

fn to_pos(origin: Pos2, point: Point) -> Pos2 {
    Pos2::new(origin.x + point.x as f32, origin.y + point.y as f32)
}

type TextureStore = LruCache<TileAddress, Option<TextureHandle>>;

/// Texture store holding at most `capacity` tiles (at least one)
fn texture_store(capacity: usize) -> TextureStore {
    LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
}

/// Filter edits collected while the side panel borrows the viewer
enum FilterAction {
    Category(String, bool),
    Subcategory(String, bool),
    ShowAll,
    HideAll,
}

struct ViewerApp {
    viewer: ViewController,
    /// Decoded tiles, bounded like the byte cache; `None` marks bytes that
    /// failed to decode
    textures: TextureStore,
    selected_map: String,
    last_size: Vec2,
    status: Option<String>,
}

impl ViewerApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = load_config();
        let mut viewer = ViewController::new(
            Point::new(1000.0, 800.0),
            load_calibrations(),
            load_catalog(),
            CategoryTaxonomy::builtin().clone(),
            config,
        );

        let textures = texture_store(viewer.config().tile_cache_size);
        let status = viewer.mount().err().map(|e| e.to_string());
        let selected_map = viewer
            .active_map()
            .map(String::from)
            .unwrap_or_else(|| viewer.config().default_map.clone());

        Self {
            viewer,
            textures,
            selected_map,
            last_size: Vec2::ZERO,
            status,
        }
    }

    fn map_selector(&mut self, ui: &mut egui::Ui) {
        let maps: Vec<String> = self.viewer.available_maps().into_iter().map(String::from).collect();
        let mut selected = self.selected_map.clone();

        ui.add_enabled_ui(!maps.is_empty(), |ui| {
            egui::ComboBox::from_label("Map")
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for name in &maps {
                        ui.selectable_value(&mut selected, name.clone(), name.as_str());
                    }
                });
        });

        if selected != self.selected_map {
            match self.viewer.load_map(&selected) {
                Ok(()) => {
                    self.selected_map = selected;
                    self.status = None;
                }
                Err(e) => self.status = Some(e.to_string()),
            }
        }
    }

    fn filter_panel(&mut self, ui: &mut egui::Ui) {
        let mut actions = Vec::new();

        ui.horizontal(|ui| {
            if ui.button("Show all").clicked() {
                actions.push(FilterAction::ShowAll);
            }
            if ui.button("Hide all").clicked() {
                actions.push(FilterAction::HideAll);
            }
        });
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for category in self.viewer.taxonomy().categories() {
                let mut checked = self.viewer.is_category_checked(&category.name);
                let title = egui::RichText::new(&category.display_label)
                    .strong()
                    .color(to_color32(category.color, 1.0));
                if ui.checkbox(&mut checked, title).changed() {
                    actions.push(FilterAction::Category(category.name.clone(), checked));
                }

                ui.indent(&category.name, |ui| {
                    for sub in &category.subcategories {
                        let key = layer_key(&category.name, &sub.name);
                        let mut visible = self.viewer.filter().contains(&key);
                        let text = format!("{} {}", sub.glyph, sub.display_label);
                        if ui.checkbox(&mut visible, text).changed() {
                            actions.push(FilterAction::Subcategory(key, visible));
                        }
                    }
                });
            }

            let known = self.viewer.taxonomy().keys();
            let others: Vec<String> = self
                .viewer
                .group_keys()
                .into_iter()
                .filter(|key| !known.contains(key))
                .collect();
            if !others.is_empty() {
                ui.separator();
                ui.label("Uncategorized");
                for key in others {
                    let mut visible = self.viewer.filter().contains(&key);
                    if ui.checkbox(&mut visible, key.as_str()).changed() {
                        actions.push(FilterAction::Subcategory(key, visible));
                    }
                }
            }
        });

        for action in actions {
            let outcome = match action {
                FilterAction::Category(name, visible) => {
                    self.viewer.set_category(&name, visible).map(|_| ())
                }
                FilterAction::Subcategory(key, visible) => {
                    self.viewer.set_visible(&key, visible).map(|_| ())
                }
                FilterAction::ShowAll => self.viewer.show_all().map(|_| ()),
                FilterAction::HideAll => self.viewer.hide_all().map(|_| ()),
            };
            if let Err(e) = outcome {
                log::error!("filter update failed: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn tile_texture(&mut self, ctx: &egui::Context, address: &TileAddress, bytes: &[u8]) -> Option<egui::TextureId> {
        if let Some(cached) = self.textures.get(address) {
            return cached.as_ref().map(|texture| texture.id());
        }

        let texture = match image::load_from_memory(bytes) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let pixels = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                Some(ctx.load_texture(address.to_string(), pixels, egui::TextureOptions::LINEAR))
            }
            Err(e) => {
                log::warn!("tile {} could not be decoded: {}", address, e);
                None
            }
        };
        let id = texture.as_ref().map(|texture| texture.id());
        // evicted handles free their GPU texture on drop
        self.textures.put(address.clone(), texture);
        id
    }

    fn map_canvas(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        if rect.size() != self.last_size {
            self.last_size = rect.size();
            self.viewer.resize(Point::new(rect.width() as f64, rect.height() as f64));
        }

        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                self.viewer.pan(Point::new(delta.x as f64, delta.y as f64));
            }
        }

        if let Some(hover) = response.hover_pos() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                if let Some(zoom) = self.viewer.surface().map(|s| s.viewport().zoom) {
                    let focus = Point::new((hover.x - rect.min.x) as f64, (hover.y - rect.min.y) as f64);
                    self.viewer.zoom_to(zoom + scroll as f64 * 0.005, Some(focus));
                }
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let screen = Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
                if let Some(click) = self.viewer.click(screen) {
                    log::info!(
                        "clicked {} ({}) at world ({:.1}, {:.1})",
                        click.record_id,
                        click.key,
                        click.world_position.x,
                        click.world_position.y
                    );
                }
            }
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(24));

        let frame = match self.viewer.render() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("render failed: {}", e);
                return;
            }
        };

        for command in frame.get_drawing_queue() {
            match command {
                DrawCommand::Tile {
                    address,
                    bounds,
                    data,
                    opacity,
                } => {
                    let tile_rect = Rect::from_two_pos(to_pos(rect.min, bounds.0), to_pos(rect.min, bounds.1));
                    let texture = data
                        .as_ref()
                        .and_then(|bytes| self.tile_texture(ui.ctx(), address, bytes));
                    match texture {
                        Some(id) => painter.image(
                            id,
                            tile_rect,
                            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                            Color32::WHITE.gamma_multiply(*opacity),
                        ),
                        None => painter.rect_filled(tile_rect, 0.0, Color32::from_gray(40)),
                    };
                }
                DrawCommand::Marker {
                    position,
                    icon,
                    opacity,
                    ..
                } => {
                    let top_left = to_pos(rect.min, *position)
                        - Vec2::new(icon.anchor.0 as f32, icon.anchor.1 as f32);
                    let center = top_left + Vec2::new(icon.size.0 as f32, icon.size.1 as f32) / 2.0;
                    let radius = (icon.size.0.min(icon.size.1) / 2.0) as f32;
                    painter.circle(
                        center,
                        radius,
                        to_color32(icon.color, *opacity),
                        Stroke::new(1.5, Color32::WHITE),
                    );
                    painter.text(
                        center,
                        Align2::CENTER_CENTER,
                        &icon.glyph,
                        FontId::proportional(radius * 1.1),
                        Color32::WHITE,
                    );
                }
            }
        }

        self.popup(ui.ctx(), rect);
    }

    fn popup(&self, ctx: &egui::Context, rect: Rect) {
        let (Some(popup), Some(surface)) = (self.viewer.open_popup(), self.viewer.surface()) else {
            return;
        };
        let tip = to_pos(rect.min, popup.screen_position(surface.viewport()));
        if !rect.contains(tip) {
            return;
        }

        egui::Area::new(egui::Id::new(popup.id.as_str()))
            .fixed_pos(tip + Vec2::new(12.0, -12.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.heading(popup.content.title.as_str());
                    if let Some(body) = &popup.content.body {
                        ui.label(body.as_str());
                    }
                });
            });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.viewer.close_popup();
        }

        let applied = self.viewer.poll_tiles();
        if applied > 0 {
            log::debug!("applied {} tiles", applied);
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                self.map_selector(ui);
                ui.separator();
                if ui.button("+").clicked() {
                    self.viewer.zoom_in();
                }
                if ui.button("-").clicked() {
                    self.viewer.zoom_out();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let state = match self.viewer.state() {
                        ViewerState::Disabled => "calibration unavailable".to_string(),
                        ViewerState::Empty => "no map".to_string(),
                        ViewerState::Loading { map } => format!("loading {}", map),
                        ViewerState::Ready { map } => {
                            let zoom = self.viewer.surface().map(|s| s.viewport().zoom).unwrap_or(0.0);
                            format!(
                                "{} | zoom {:.2} | {} markers | {} tiles cached",
                                map,
                                zoom,
                                self.viewer.marker_count(),
                                self.viewer.tile_loader().cache().len()
                            )
                        }
                    };
                    ui.label(state);
                    if let Some(status) = &self.status {
                        ui.colored_label(Color32::LIGHT_RED, status.as_str());
                    }
                });
            });
        });

        egui::SidePanel::left("filter_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Annotations");
                self.filter_panel(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.map_canvas(ui));

        // tiles arrive on background threads
        if self.viewer.surface().and_then(|s| s.tile_layer()).map(|t| t.pending_count() > 0).unwrap_or(false) {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(map: &str, col: u32) -> TileAddress {
        TileAddress {
            map_name: map.to_string(),
            level: 2,
            col,
            row: 0,
        }
    }

    #[test]
    fn test_texture_store_is_bounded_across_maps() {
        let mut store = texture_store(3);
        for map in ["dam", "spaceport"] {
            for col in 0..4 {
                store.put(address(map, col), None);
            }
        }

        assert_eq!(store.len(), 3);
        assert!(store.contains(&address("spaceport", 3)));
        assert!(!store.contains(&address("dam", 0)));
    }

    #[test]
    fn test_zero_capacity_keeps_one_texture() {
        let mut store = texture_store(0);
        store.put(address("dam", 0), None);
        store.put(address("dam", 1), None);
        assert_eq!(store.len(), 1);
    }
}

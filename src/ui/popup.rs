use crate::{
    core::{geo::Point, viewport::Viewport},
    layers::marker::{Marker, MarkerPopup},
    ui::overlay::Overlay,
};

/// Popup opened over a clicked marker
#[derive(Debug, Clone)]
pub struct Popup {
    pub id: String,
    pub record_id: String,
    /// Layer key of the marker's group
    pub key: String,
    /// Surface position the popup points at
    pub position: Point,
    pub content: MarkerPopup,
    pub visible: bool,
}

impl Popup {
    pub fn for_marker(key: &str, marker: &Marker) -> Self {
        Self {
            id: format!("popup-{}", marker.record_id),
            record_id: marker.record_id.clone(),
            key: key.to_string(),
            position: marker.position,
            content: marker.popup.clone(),
            visible: true,
        }
    }

    /// Where the popup's tip sits on screen for the given view
    pub fn screen_position(&self, viewport: &Viewport) -> Point {
        viewport.surface_to_screen(self.position)
    }

    /// Title line followed by the body, if any
    pub fn text(&self) -> String {
        match &self.content.body {
            Some(body) => format!("{}\n{}", self.content.title, body),
            None => self.content.title.clone(),
        }
    }
}

impl Overlay for Popup {
    fn id(&self) -> &str {
        &self.id
    }

    fn teardown(&mut self) {
        self.visible = false;
    }
}

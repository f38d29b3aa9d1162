use eframe::egui;
use tracing::info;

use crate::models::Point;
use crate::services::coords;
use crate::services::map_library::{self, MapLibrary};

/// Texture of the map currently on screen; reloaded when the map changes.
#[derive(Default)]
pub struct MapCanvas {
    loaded: Option<(String, Option<egui::TextureHandle>)>,
}

/// One frame's square drawing area.
pub struct CanvasFrame {
    pub response: egui::Response,
    pub painter: egui::Painter,
    pub rect: egui::Rect,
    /// Side length in whole pixels; the viewport size points are captured in.
    pub side: u32,
}

impl CanvasFrame {
    /// Click position relative to the map's top-left corner.
    pub fn clicked_offset(&self) -> Option<(u32, u32)> {
        if !self.response.clicked() {
            return None;
        }
        let pos = self.response.interact_pointer_pos()?;
        let offset = pos - self.rect.min;
        if offset.x < 0.0 || offset.y < 0.0 {
            return None;
        }
        let (x, y) = (offset.x as u32, offset.y as u32);
        (x < self.side && y < self.side).then_some((x, y))
    }

    pub fn draw_marker(&self, x: u32, y: u32, radius: f32, fill: egui::Color32) {
        let center = self.rect.min + egui::vec2(x as f32, y as f32);
        self.painter
            .circle(center, radius, fill, egui::Stroke::new(1.0, egui::Color32::BLACK));
    }

    /// Draws a stored point rescaled to this canvas. Points with a broken
    /// reference size are skipped.
    pub fn draw_point(&self, point: &Point, radius: f32, fill: egui::Color32) {
        if let Ok((x, y)) = coords::render(point, self.side, self.side) {
            self.draw_marker(x, y, radius, fill);
        }
    }
}

impl MapCanvas {
    fn texture(
        &mut self,
        ctx: &egui::Context,
        maps: &MapLibrary,
        map_name: &str,
        max_dimension: u32,
    ) -> Option<&egui::TextureHandle> {
        let stale = self
            .loaded
            .as_ref()
            .is_none_or(|(loaded_name, _)| loaded_name != map_name);
        if stale {
            let texture = map_library::decode_map(&maps.path_of(map_name), max_dimension).map(
                |decoded| {
                    let image = egui::ColorImage::from_rgba_unmultiplied(
                        [decoded.width, decoded.height],
                        &decoded.rgba,
                    );
                    ctx.load_texture(
                        format!("map:{map_name}"),
                        image,
                        egui::TextureOptions::LINEAR,
                    )
                },
            );
            info!("Loaded map texture {} (ok={})", map_name, texture.is_some());
            self.loaded = Some((map_name.to_string(), texture));
        }
        self.loaded.as_ref().and_then(|(_, texture)| texture.as_ref())
    }

    /// Draws `map_name` into the largest square that fits the remaining space.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        maps: &MapLibrary,
        map_name: &str,
        max_dimension: u32,
    ) -> Option<CanvasFrame> {
        let available = ui.available_size();
        let side = coords::fit_square(available.x, available.y);
        if side == 0 {
            return None;
        }

        let ctx = ui.ctx().clone();
        let texture_id = self
            .texture(&ctx, maps, map_name, max_dimension)
            .map(|texture| texture.id());

        let (response, painter) =
            ui.allocate_painter(egui::vec2(side as f32, side as f32), egui::Sense::click());
        let rect = response.rect;
        match texture_id {
            Some(id) => {
                painter.image(
                    id,
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            None => {
                painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    format!("Cannot display {map_name}"),
                    egui::FontId::proportional(18.0),
                    egui::Color32::LIGHT_RED,
                );
            }
        }

        Some(CanvasFrame {
            response,
            painter,
            rect,
            side,
        })
    }
}

//! Overlay rendering: the ruler and spotlight via gizmos, region areas and
//! on-map labels via egui.

use bevy::camera::visibility::RenderLayers;
use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::atlas::geometry::fill_polygon;
use crate::atlas::AtlasEngine;
use crate::constants::SPOTLIGHT_RADIUS;
use crate::theme;

use super::camera::MapView;
use super::places::{PlaceSelection, Spotlight};
use super::surface::AreaLayer;

/// Dash and gap of the segment preview, in screen pixels
const PREVIEW_DASH_PX: f32 = 4.0;
const PREVIEW_GAP_PX: f32 = 6.0;

/// Vertex dot radius on the measured path, in screen pixels
const VERTEX_RADIUS_PX: f32 = 3.0;

/// Ruler label offset from the last point, in screen pixels
const LABEL_OFFSET: egui::Vec2 = egui::vec2(8.0, 0.0);

const LABEL_FONT_SIZE: f32 = 13.0;

/// Gizmo group for overlay graphics
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct AtlasGizmoGroup;

/// Overlay gizmos render on layer 1
pub fn configure_atlas_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<AtlasGizmoGroup>();
    config.render_layers = RenderLayers::layer(1);
    config.line.width = 2.5;
}

/// Split `from..to` into dashes; lengths are in world units.
fn dash_segments(from: Vec2, to: Vec2, dash: f32, gap: f32) -> Vec<(Vec2, Vec2)> {
    let length = from.distance(to);
    if length <= f32::EPSILON || dash <= 0.0 {
        return Vec::new();
    }
    let direction = (to - from) / length;
    let mut segments = Vec::new();
    let mut along = 0.0;
    while along < length {
        let end = (along + dash).min(length);
        segments.push((from + direction * along, from + direction * end));
        along = end + gap.max(0.0);
    }
    segments
}

pub fn render_ruler(mut gizmos: Gizmos<AtlasGizmoGroup>, engine: Res<AtlasEngine>, view: Res<MapView>) {
    let overlay = engine.ruler_overlay();
    if overlay.is_empty() {
        return;
    }

    let world_per_px = 1.0 / view.scale();
    if overlay.path.len() >= 2 {
        gizmos.linestrip_2d(overlay.path.iter().copied(), theme::RULER_LINE);
    }
    for point in overlay.path {
        gizmos.circle_2d(*point, VERTEX_RADIUS_PX * world_per_px, theme::RULER_LINE);
    }

    if let Some((from, to)) = overlay.preview {
        let color = theme::RULER_LINE.with_alpha(0.8);
        for (start, end) in dash_segments(
            from,
            to,
            PREVIEW_DASH_PX * world_per_px,
            PREVIEW_GAP_PX * world_per_px,
        ) {
            gizmos.line_2d(start, end, color);
        }
    }
}

/// Expanding, fading ring at the focused place
pub fn render_spotlight(mut gizmos: Gizmos<AtlasGizmoGroup>, spotlight: Res<Spotlight>, view: Res<MapView>) {
    let Some((position, progress)) = spotlight.current() else {
        return;
    };
    let radius = SPOTLIGHT_RADIUS * (0.2 + 0.8 * progress) / view.scale();
    let color = theme::SPOTLIGHT.with_alpha(1.0 - progress);
    gizmos.circle_2d(position, radius, color);
    gizmos.circle_2d(position, radius * 0.6, color.with_alpha((1.0 - progress) * 0.5));
}

/// Region boundaries currently in the render layer
pub fn render_areas(
    mut contexts: EguiContexts,
    engine: Res<AtlasEngine>,
    areas: Res<AreaLayer>,
    selection: Res<PlaceSelection>,
    view: Res<MapView>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("atlas_areas"),
    ));

    for index in areas.iter() {
        let Some(annotation) = engine.annotations().get(index) else {
            continue;
        };
        let Some(area) = annotation.area.as_ref() else {
            continue;
        };

        let style = if selection.highlights(index) {
            annotation.style.hover()
        } else {
            annotation.style
        };
        let to_screen = |world: Vec2| {
            let screen = view.world_to_screen(world);
            egui::pos2(screen.x, screen.y)
        };
        let points: Vec<egui::Pos2> = area.iter().map(|world| to_screen(*world)).collect();

        if style.fill_opacity > 0.0 {
            match fill_polygon(area) {
                Ok(fill) => {
                    let color = theme::bevy_to_egui(style.fill_color());
                    let mut mesh = egui::Mesh::default();
                    for vertex in &fill.vertices {
                        mesh.colored_vertex(to_screen(*vertex), color);
                    }
                    mesh.indices = fill.indices;
                    painter.add(egui::Shape::mesh(mesh));
                }
                Err(e) => warn_once!("{}: {}", annotation.id, e),
            }
        }
        painter.add(egui::Shape::closed_line(
            points,
            egui::Stroke::new(style.weight, theme::bevy_to_egui(style.stroke)),
        ));
    }

    Ok(())
}

/// Running total next to the last measured point
pub fn render_ruler_label(
    mut contexts: EguiContexts,
    engine: Res<AtlasEngine>,
    view: Res<MapView>,
) -> Result {
    let Some(label) = engine.ruler_overlay().label else {
        return Ok(());
    };

    let ctx = contexts.ctx_mut()?;
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("atlas_ruler_label"),
    ));

    let screen = view.world_to_screen(label.position);
    let anchor = egui::pos2(screen.x, screen.y) + LABEL_OFFSET;
    let galley = painter.layout_no_wrap(
        label.text.clone(),
        egui::FontId::proportional(LABEL_FONT_SIZE),
        theme::ui::RULER_TEXT,
    );
    let rect = egui::Align2::LEFT_CENTER.anchor_size(anchor, galley.size());
    painter.rect_filled(rect.expand(4.0), 3.0, theme::ui::LABEL_PLATE);
    painter.galley(rect.min, galley, theme::ui::RULER_TEXT);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_segments_cover_line_with_gaps() {
        let dashes = dash_segments(Vec2::ZERO, Vec2::new(20.0, 0.0), 4.0, 6.0);
        assert_eq!(
            dashes,
            vec![
                (Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)),
                (Vec2::new(10.0, 0.0), Vec2::new(14.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_dash_segments_clip_last_dash() {
        let dashes = dash_segments(Vec2::ZERO, Vec2::new(0.0, 12.0), 4.0, 6.0);
        assert_eq!(dashes.last(), Some(&(Vec2::new(0.0, 10.0), Vec2::new(0.0, 12.0))));
    }

    #[test]
    fn test_dash_segments_zero_length() {
        assert!(dash_segments(Vec2::ONE, Vec2::ONE, 4.0, 6.0).is_empty());
    }
}

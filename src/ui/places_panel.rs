use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::atlas::{AtlasEngine, MapSurface};
use crate::config::SetGroupHiddenRequest;
use crate::theme;
use crate::view::{FeedStatus, FocusPlaceRequest, MapSurfaceParams, PlaceSelection};

/// Search box contents of the places panel
#[derive(Resource, Default)]
pub struct PlacesPanelState {
    pub query: String,
}

/// One entry of the place list
struct PlaceRow {
    index: usize,
    id: String,
    name: String,
    detail: String,
    /// In the render layer right now
    on_map: bool,
    /// Lowest zoom the place shows at, when the current zoom is below it
    shown_from: Option<f32>,
}

fn place_rows(engine: &mut AtlasEngine, surface: &MapSurfaceParams, query: &str) -> Vec<PlaceRow> {
    let zoom = surface.zoom();
    let matches = engine.search(query);
    let mut rows = Vec::with_capacity(matches.len());
    for index in matches {
        let annotation = &engine.annotations()[index];
        let (id, name, kind) = (
            annotation.id.clone(),
            annotation.name.clone(),
            annotation.kind.clone(),
        );
        let detail = format!("{} · {}", kind.display_name(), annotation.group);

        let on_map = engine.visibility(&id).is_some_and(|v| v.any());
        let in_zoom = engine
            .zoom_visibility(surface, &id, zoom)
            .is_some_and(|v| v.any());
        let shown_from = if in_zoom {
            None
        } else {
            let thresholds = engine.thresholds(surface);
            if kind.is_boundary_region() {
                Some(thresholds.region.pin_min.min(thresholds.region.area_min))
            } else {
                thresholds.for_kind(&kind)
            }
        };

        rows.push(PlaceRow {
            index,
            id,
            name,
            detail,
            on_map,
            shown_from,
        });
    }
    rows
}

/// Left panel: layer group toggles, search and the place list
#[allow(clippy::too_many_arguments)]
pub fn places_panel_ui(
    mut contexts: EguiContexts,
    mut panel: ResMut<PlacesPanelState>,
    mut engine: ResMut<AtlasEngine>,
    mut surface: MapSurfaceParams,
    selection: Res<PlaceSelection>,
    status: Res<FeedStatus>,
    mut focus_events: MessageWriter<FocusPlaceRequest>,
    mut group_events: MessageWriter<SetGroupHiddenRequest>,
) -> Result {
    let mut group_toggles: Vec<(String, bool)> = Vec::new();
    let mut focus: Option<String> = None;

    let rows = place_rows(&mut engine, &surface, &panel.query);

    egui::SidePanel::left("places_panel")
        .default_width(240.0)
        .show(contexts.ctx_mut()?, |ui| {
            // =========================================
            // LAYER GROUPS
            // =========================================
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Layers").heading().size(18.0));
            ui.add_space(4.0);
            ui.separator();

            let groups = engine.groups();
            if groups.is_empty() {
                ui.label(egui::RichText::new("No places loaded").weak().italics());
            }
            for group in groups {
                let mut visible = engine.group_visible(group);
                if ui.checkbox(&mut visible, group).changed() {
                    group_toggles.push((group.to_string(), visible));
                }
            }

            // =========================================
            // PLACES
            // =========================================
            ui.add_space(12.0);
            ui.label(egui::RichText::new("Places").heading().size(18.0));
            ui.add_space(4.0);
            ui.add(
                egui::TextEdit::singleline(&mut panel.query)
                    .desired_width(f32::INFINITY)
                    .hint_text("Search places"),
            );
            ui.add_space(4.0);
            ui.separator();

            if rows.is_empty() && !engine.annotations().is_empty() {
                ui.label(egui::RichText::new("No matches").color(theme::ui::HINT_TEXT));
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .max_height(ui.available_height() - 28.0)
                .show(ui, |ui| {
                    for row in &rows {
                        let color = if row.on_map {
                            theme::ui::LABEL_TEXT
                        } else {
                            theme::ui::HINT_TEXT
                        };
                        let hover = match row.shown_from {
                            Some(zoom) => format!("{}\nShown from zoom {:.1}", row.detail, zoom),
                            None => row.detail.clone(),
                        };
                        let response = ui
                            .selectable_label(
                                selection.selected == Some(row.index),
                                egui::RichText::new(&row.name).color(color),
                            )
                            .on_hover_text(hover);
                        if response.clicked() {
                            focus = Some(row.id.clone());
                        }
                    }
                });

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                ui.add_space(4.0);
                let summary = if status.is_loading {
                    "Loading places...".to_string()
                } else if status.skipped > 0 {
                    format!(
                        "{} places ({} skipped)",
                        engine.annotations().len(),
                        status.skipped
                    )
                } else {
                    format!("{} places", engine.annotations().len())
                };
                ui.label(egui::RichText::new(summary).color(theme::ui::HINT_TEXT).small());
                ui.separator();
            });
        });

    for (group, visible) in group_toggles {
        engine.set_group_visible(&mut surface, &group, visible);
        group_events.write(SetGroupHiddenRequest {
            group,
            hidden: !visible,
        });
    }

    if let Some(id) = focus {
        focus_events.write(FocusPlaceRequest { id });
    }

    Ok(())
}

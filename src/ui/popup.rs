//! Place popup for the selected marker and a name tooltip for the hovered one.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::atlas::AtlasEngine;
use crate::constants::MARKER_RADIUS;
use crate::theme;
use crate::view::{MapView, PlaceSelection};

/// Gap between the pin and the popup, in screen pixels
const POPUP_GAP: f32 = MARKER_RADIUS + 8.0;

const POPUP_WIDTH: f32 = 260.0;

/// Screen position of a place as an egui point
fn anchor_for(view: &MapView, world: Vec2) -> egui::Pos2 {
    let screen = view.world_to_screen(world);
    egui::pos2(screen.x, screen.y - POPUP_GAP)
}

pub fn place_popup_ui(
    mut contexts: EguiContexts,
    engine: Res<AtlasEngine>,
    view: Res<MapView>,
    mut selection: ResMut<PlaceSelection>,
) -> Result {
    let Some(annotation) = selection
        .selected
        .and_then(|index| engine.annotations().get(index))
    else {
        return Ok(());
    };

    let mut should_close = false;
    let ctx = contexts.ctx_mut()?;
    egui::Area::new(egui::Id::new("place_popup"))
        .fixed_pos(anchor_for(&view, annotation.position))
        .pivot(egui::Align2::CENTER_BOTTOM)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(POPUP_WIDTH);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&annotation.name).strong().size(15.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("x").clicked() {
                            should_close = true;
                        }
                    });
                });
                ui.label(
                    egui::RichText::new(format!(
                        "{} · {}",
                        annotation.kind.display_name(),
                        annotation.group
                    ))
                    .color(theme::ui::HINT_TEXT)
                    .small(),
                );

                if !annotation.description.is_empty() {
                    ui.add_space(4.0);
                    ui.label(&annotation.description);
                }

                if let Some(ref href) = annotation.href {
                    ui.add_space(6.0);
                    if ui.link("Open page").on_hover_text(href).clicked() {
                        let _ = open::that(href);
                    }
                }
            });
        });

    if should_close {
        selection.selected = None;
    }

    Ok(())
}

/// Name of the hovered marker, unless its popup is already open
pub fn hover_tooltip_ui(
    mut contexts: EguiContexts,
    engine: Res<AtlasEngine>,
    view: Res<MapView>,
    selection: Res<PlaceSelection>,
) -> Result {
    let Some(index) = selection.hovered.filter(|i| selection.selected != Some(*i)) else {
        return Ok(());
    };
    let Some(annotation) = engine.annotations().get(index) else {
        return Ok(());
    };

    let ctx = contexts.ctx_mut()?;
    egui::Area::new(egui::Id::new("place_hover"))
        .fixed_pos(anchor_for(&view, annotation.position))
        .pivot(egui::Align2::CENTER_BOTTOM)
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(theme::ui::LABEL_PLATE)
                .corner_radius(3.0)
                .inner_margin(egui::Margin::symmetric(6, 3))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&annotation.name).color(theme::ui::LABEL_TEXT));
                });
        });

    Ok(())
}

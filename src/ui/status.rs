//! Scale bar and feed status drawn over the map.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::atlas::AtlasEngine;
use crate::theme;
use crate::view::FeedStatus;

/// Tick height at the bar ends
const TICK_HEIGHT: f32 = 6.0;

pub fn scale_bar_ui(mut contexts: EguiContexts, engine: Res<AtlasEngine>) -> Result {
    let Some(reading) = engine.scale_bar() else {
        return Ok(());
    };

    let ctx = contexts.ctx_mut()?;
    egui::Area::new(egui::Id::new("scale_bar"))
        .anchor(egui::Align2::LEFT_BOTTOM, [12.0, -12.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(theme::ui::LABEL_PLATE)
                .corner_radius(3.0)
                .inner_margin(egui::Margin::symmetric(8, 4))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(&reading.text)
                            .color(theme::ui::SCALE_BAR)
                            .small(),
                    );
                    let (rect, _) = ui.allocate_exact_size(
                        egui::vec2(reading.width_px, TICK_HEIGHT + 2.0),
                        egui::Sense::hover(),
                    );
                    let stroke = egui::Stroke::new(2.0, theme::ui::SCALE_BAR);
                    let painter = ui.painter();
                    painter.line_segment([rect.left_bottom(), rect.right_bottom()], stroke);
                    painter.line_segment(
                        [rect.left_bottom(), rect.left_bottom() - egui::vec2(0.0, TICK_HEIGHT)],
                        stroke,
                    );
                    painter.line_segment(
                        [rect.right_bottom(), rect.right_bottom() - egui::vec2(0.0, TICK_HEIGHT)],
                        stroke,
                    );
                });
        });

    Ok(())
}

/// Loading indicator while a feed load is running
pub fn feed_status_ui(mut contexts: EguiContexts, status: Res<FeedStatus>) -> Result {
    if !status.is_loading {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;
    egui::Area::new(egui::Id::new("feed_status"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(theme::ui::LABEL_PLATE)
                .corner_radius(3.0)
                .inner_margin(egui::Margin::symmetric(8, 4))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        let text = match status.source {
                            Some(ref source) => format!("Reloading places from {}", source),
                            None => "Loading places...".to_string(),
                        };
                        ui.label(egui::RichText::new(text).color(theme::ui::LABEL_TEXT));
                    });
                });
        });

    Ok(())
}

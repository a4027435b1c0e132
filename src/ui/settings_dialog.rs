use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::atlas::ZoomRange;
use crate::config::SetZoomRangeRequest;
use crate::theme;

/// Lowest and highest zoom the settings accept
const ZOOM_LIMITS: std::ops::RangeInclusive<f32> = -8.0..=6.0;

/// State for the view settings dialog
#[derive(Resource, Default)]
pub struct ViewSettingsDialog {
    pub is_open: bool,
    /// Edited zoom range
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub error: Option<String>,
}

impl ViewSettingsDialog {
    /// Open with the current range loaded for editing
    pub fn open(&mut self, current: ZoomRange) {
        self.min_zoom = current.min;
        self.max_zoom = current.max;
        self.error = None;
        self.is_open = true;
    }

    fn edited_range(&self) -> Result<ZoomRange, String> {
        if self.min_zoom >= self.max_zoom {
            return Err("Minimum zoom must be below maximum zoom".to_string());
        }
        Ok(ZoomRange {
            min: self.min_zoom,
            max: self.max_zoom,
        })
    }
}

/// Renders the view settings dialog
pub fn view_settings_dialog_ui(
    mut contexts: EguiContexts,
    mut dialog: ResMut<ViewSettingsDialog>,
    mut range_events: MessageWriter<SetZoomRangeRequest>,
) -> Result {
    if !dialog.is_open {
        return Ok(());
    }

    let mut should_close = false;
    let mut should_apply = false;

    egui::Window::new("View Settings")
        .collapsible(false)
        .resizable(false)
        .min_width(280.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.group(|ui| {
                ui.label(egui::RichText::new("Zoom Range").strong());
                ui.add_space(8.0);

                egui::Grid::new("zoom_range_grid")
                    .num_columns(2)
                    .spacing([20.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Minimum:");
                        ui.add(
                            egui::DragValue::new(&mut dialog.min_zoom)
                                .speed(0.25)
                                .range(ZOOM_LIMITS),
                        );
                        ui.end_row();

                        ui.label("Maximum:");
                        ui.add(
                            egui::DragValue::new(&mut dialog.max_zoom)
                                .speed(0.25)
                                .range(ZOOM_LIMITS),
                        );
                        ui.end_row();
                    });

                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new("Place visibility thresholds follow the range.")
                        .weak()
                        .small(),
                );
            });

            if let Some(ref error) = dialog.error {
                ui.add_space(4.0);
                ui.colored_label(theme::ui::ERROR_TEXT, error);
            }

            ui.add_space(12.0);
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    should_apply = true;
                }
                if ui.button("Cancel").clicked() {
                    should_close = true;
                }
            });
        });

    if should_apply {
        match dialog.edited_range() {
            Ok(range) => {
                range_events.write(SetZoomRangeRequest { range });
                should_close = true;
            }
            Err(e) => dialog.error = Some(e),
        }
    }

    if should_close {
        dialog.is_open = false;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_loads_current_range() {
        let mut dialog = ViewSettingsDialog::default();
        dialog.open(ZoomRange { min: -3.0, max: 1.5 });
        assert!(dialog.is_open);
        assert_eq!(dialog.edited_range(), Ok(ZoomRange { min: -3.0, max: 1.5 }));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let dialog = ViewSettingsDialog {
            min_zoom: 2.0,
            max_zoom: 2.0,
            ..default()
        };
        assert!(dialog.edited_range().is_err());
    }
}

use std::path::PathBuf;

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use bevy_egui::{egui, EguiContexts};
use futures_lite::future;

use crate::atlas::ruler::format_measurement;
use crate::atlas::{parse_scale_input, AtlasEngine, FeedSource};
use crate::config::{AppConfig, SetFeedSourceRequest, UpdateCalibrationRequest};
use crate::theme;
use crate::view::{FeedStatus, LoadFeedRequest, MapSurfaceParams};

use super::dialogs::OpenUrlDialog;
use super::settings_dialog::ViewSettingsDialog;

/// Toolbar input state
#[derive(Resource, Default)]
pub struct ToolbarState {
    /// Scale prompt text, e.g. "1.9 miles"
    pub scale_input: String,
    pub scale_error: Option<String>,
    /// Pending async file dialog for picking a feed
    pub pending_browse: Option<Task<Option<PathBuf>>>,
}

/// Feed source to reload: the one shown, else the configured one
fn reload_source(status: &FeedStatus, config: &AppConfig) -> Option<FeedSource> {
    status.source.clone().or_else(|| {
        config
            .data
            .feed_source
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(FeedSource::parse)
    })
}

fn request_feed(
    source: FeedSource,
    load_events: &mut MessageWriter<LoadFeedRequest>,
    source_events: &mut MessageWriter<SetFeedSourceRequest>,
) {
    source_events.write(SetFeedSourceRequest {
        source: source.to_string(),
    });
    load_events.write(LoadFeedRequest { source });
}

/// Parse the scale prompt and apply it. The config follows accepted values.
fn apply_scale_input(
    state: &mut ToolbarState,
    engine: &mut AtlasEngine,
    surface: &MapSurfaceParams,
    calibration_events: &mut MessageWriter<UpdateCalibrationRequest>,
) {
    let applied = parse_scale_input(&state.scale_input)
        .and_then(|(value, unit)| engine.set_calibration(surface, value, unit.as_deref()));
    match applied {
        Ok(()) => {
            calibration_events.write(UpdateCalibrationRequest {
                calibration: engine.calibration().clone(),
            });
            state.scale_input.clear();
            state.scale_error = None;
        }
        Err(e) => state.scale_error = Some(e.to_string()),
    }
}

/// Main toolbar: feed menu, measurement tool and scale prompt
#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<ToolbarState>,
    mut url_dialog: ResMut<OpenUrlDialog>,
    mut view_settings: ResMut<ViewSettingsDialog>,
    mut engine: ResMut<AtlasEngine>,
    mut surface: MapSurfaceParams,
    status: Res<FeedStatus>,
    config: Res<AppConfig>,
    mut load_events: MessageWriter<LoadFeedRequest>,
    mut source_events: MessageWriter<SetFeedSourceRequest>,
    mut calibration_events: MessageWriter<UpdateCalibrationRequest>,
) -> Result {
    // Poll pending browse task (before drawing so a pick lands this frame)
    if let Some(ref mut task) = state.pending_browse
        && let Some(result) = future::block_on(future::poll_once(task))
    {
        state.pending_browse = None;
        if let Some(path) = result {
            request_feed(FeedSource::File(path), &mut load_events, &mut source_events);
        }
    }

    let mut should_browse = false;
    let mut should_apply_scale = false;
    let reload = reload_source(&status, &config);

    let ctx = contexts.ctx_mut()?;
    egui::TopBottomPanel::top("main_toolbar")
        .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(12, 8)))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                ui.menu_button("Feed", |ui| {
                    if ui
                        .add_enabled(state.pending_browse.is_none(), egui::Button::new("Open File..."))
                        .clicked()
                    {
                        should_browse = true;
                        ui.close();
                    }
                    if ui.button("Open URL...").clicked() {
                        url_dialog.open(reload.as_ref());
                        ui.close();
                    }
                    ui.separator();
                    if ui
                        .add_enabled(
                            reload.is_some() && !status.is_loading,
                            egui::Button::new("Reload"),
                        )
                        .clicked()
                    {
                        if let Some(source) = reload.clone() {
                            load_events.write(LoadFeedRequest { source });
                        }
                        ui.close();
                    }
                });

                if ui.button("View").clicked() {
                    view_settings.open(surface.view().range);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                let measuring = engine.ruler().is_active();
                let ruler_button = egui::Button::new(egui::RichText::new("Measure").size(14.0).strong())
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(measuring);
                if ui.add(ruler_button).on_hover_text("M").clicked() {
                    engine.toggle_ruler(&mut surface);
                }

                if engine.ruler().is_active() {
                    ui.label(
                        egui::RichText::new(format_measurement(
                            engine.live_length(),
                            engine.calibration(),
                        ))
                        .color(theme::ui::RULER_TEXT)
                        .monospace(),
                    );
                    ui.label(
                        egui::RichText::new("Click: add point  Double-click: finish  Esc: cancel")
                            .color(theme::ui::HINT_TEXT)
                            .size(11.0),
                    );
                } else if engine.measured_length() > 0.0 {
                    ui.label(
                        egui::RichText::new(format!(
                            "Last: {}",
                            format_measurement(engine.measured_length(), engine.calibration())
                        ))
                        .color(theme::ui::HINT_TEXT)
                        .monospace(),
                    );
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Set").clicked() {
                        should_apply_scale = true;
                    }
                    let hint = format!(
                        "{} {}",
                        engine.calibration().units_per_px(),
                        engine.calibration().unit()
                    );
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut state.scale_input)
                            .desired_width(120.0)
                            .hint_text(hint),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        should_apply_scale = true;
                    }
                    ui.label(egui::RichText::new("Scale per px:").color(theme::ui::LABEL_TEXT));
                    if let Some(ref error) = state.scale_error {
                        ui.colored_label(theme::ui::ERROR_TEXT, error);
                    }
                });
            });
        });

    if should_apply_scale {
        apply_scale_input(&mut state, &mut engine, &surface, &mut calibration_events);
    }

    // Handle browse button - spawn async dialog
    if should_browse && state.pending_browse.is_none() {
        let task_pool = AsyncComputeTaskPool::get();
        state.pending_browse = Some(task_pool.spawn(async {
            rfd::AsyncFileDialog::new()
                .add_filter("Places feed", &["json"])
                .set_title("Open Places Feed")
                .pick_file()
                .await
                .map(|h| h.path().to_path_buf())
        }));
    }

    Ok(())
}

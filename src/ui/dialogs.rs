use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::atlas::FeedSource;
use crate::config::{ConfigResetNotification, SetFeedSourceRequest};
use crate::theme;
use crate::view::{FeedStatus, LoadFeedRequest};

/// State for the "Open URL" dialog
#[derive(Resource, Default)]
pub struct OpenUrlDialog {
    pub is_open: bool,
    pub url: String,
    pub error: Option<String>,
}

impl OpenUrlDialog {
    /// Open the dialog, prefilled with the current source when it is a URL
    pub fn open(&mut self, current: Option<&FeedSource>) {
        self.url = match current {
            Some(FeedSource::Url(url)) => url.clone(),
            _ => String::new(),
        };
        self.error = None;
        self.is_open = true;
    }

    /// The entered URL as a feed source
    fn source(&self) -> Result<FeedSource, String> {
        match FeedSource::parse(&self.url) {
            FeedSource::Url(url) => Ok(FeedSource::Url(url)),
            FeedSource::File(_) => Err("Enter an http:// or https:// address".to_string()),
        }
    }
}

pub fn open_url_dialog_ui(
    mut contexts: EguiContexts,
    mut dialog: ResMut<OpenUrlDialog>,
    mut load_events: MessageWriter<LoadFeedRequest>,
    mut source_events: MessageWriter<SetFeedSourceRequest>,
) -> Result {
    if !dialog.is_open {
        return Ok(());
    }

    let mut should_close = false;
    let mut should_open = false;

    egui::Window::new("Open Feed URL")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Places feed address:");
            ui.add_space(4.0);

            let response = ui.add(
                egui::TextEdit::singleline(&mut dialog.url)
                    .desired_width(360.0)
                    .hint_text("https://example.org/places.json"),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                should_open = true;
            }

            if let Some(ref error) = dialog.error {
                ui.colored_label(theme::ui::ERROR_TEXT, error);
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Open").clicked() {
                    should_open = true;
                }
                if ui.button("Cancel").clicked() {
                    should_close = true;
                }
            });
        });

    if should_open {
        match dialog.source() {
            Ok(source) => {
                source_events.write(SetFeedSourceRequest {
                    source: source.to_string(),
                });
                load_events.write(LoadFeedRequest { source });
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

/// Shows the last feed failure until dismissed
pub fn feed_error_dialog_ui(mut contexts: EguiContexts, mut status: ResMut<FeedStatus>) -> Result {
    let Some(error) = status.error.clone() else {
        return Ok(());
    };

    egui::Window::new("Feed Error")
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.colored_label(theme::ui::ERROR_TEXT, "Failed to load the places feed");
            ui.add_space(8.0);
            egui::ScrollArea::vertical().max_height(150.0).show(ui, |ui| {
                ui.label(&error);
            });
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                status.error = None;
            }
        });

    Ok(())
}

pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be read and were reset to defaults.");
            if let Some(ref reason) = notification.reason {
                ui.add_space(4.0);
                ui.label(egui::RichText::new(reason).color(theme::ui::HINT_TEXT).small());
            }
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                notification.show = false;
                notification.reason = None;
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_prefills_current_url() {
        let mut dialog = OpenUrlDialog::default();
        dialog.open(Some(&FeedSource::parse("https://example.org/places.json")));
        assert!(dialog.is_open);
        assert_eq!(dialog.url, "https://example.org/places.json");

        dialog.open(Some(&FeedSource::parse("places.json")));
        assert!(dialog.url.is_empty());
    }

    #[test]
    fn test_source_requires_http_address() {
        let mut dialog = OpenUrlDialog {
            url: "  https://example.org/a.json ".into(),
            ..default()
        };
        assert_eq!(
            dialog.source(),
            Ok(FeedSource::Url("https://example.org/a.json".into()))
        );

        dialog.url = "places.json".into();
        assert!(dialog.source().is_err());
    }
}

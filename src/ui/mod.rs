mod dialogs;
mod places_panel;
mod popup;
mod settings_dialog;
mod status;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<toolbar::ToolbarState>()
            .init_resource::<places_panel::PlacesPanelState>()
            .init_resource::<dialogs::OpenUrlDialog>()
            .init_resource::<settings_dialog::ViewSettingsDialog>()
            // Top panel first so the side panel fits below it
            .add_systems(
                EguiPrimaryContextPass,
                (toolbar::toolbar_ui, places_panel::places_panel_ui).chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Overlays and dialogs after the panels
                    status::scale_bar_ui,
                    status::feed_status_ui,
                    popup::place_popup_ui,
                    popup::hover_tooltip_ui,
                    dialogs::open_url_dialog_ui,
                    dialogs::feed_error_dialog_ui,
                    dialogs::config_reset_notification_ui,
                    settings_dialog::view_settings_dialog_ui,
                )
                    .after(places_panel::places_panel_ui),
            );
    }
}

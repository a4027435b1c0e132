//! Common SystemParam bundles for the map view systems.
//!
//! - [`CursorParams`]: Window access for the cursor position
//!
//! ## Helper Functions
//!
//! - [`is_cursor_over_ui`]: Check if cursor is over egui UI (for input gating)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

/// Primary window query for cursor lookups. World positions come from
/// [`super::MapView::screen_to_world`].
#[derive(SystemParam)]
pub struct CursorParams<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
}

impl CursorParams<'_, '_> {
    /// Cursor position in logical window pixels, if the cursor is inside the window
    pub fn cursor_screen_pos(&self) -> Option<Vec2> {
        self.window.single().ok()?.cursor_position()
    }
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}

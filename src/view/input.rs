//! Keyboard and pointer input routed to the overlay engine.

use bevy::prelude::*;
use bevy::window::CursorMoved;
use bevy_egui::EguiContexts;

use crate::atlas::{AtlasEngine, MapEvent};

use super::camera::MapView;
use super::params::is_cursor_over_ui;
use super::places::{PlaceSelection, UnconsumedClick};
use super::surface::MapSurfaceParams;
use super::MapNotification;

/// Whether egui is consuming keyboard input (text fields)
fn is_typing(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false)
}

/// M toggles the ruler, Escape cancels it, Backspace drops the last point.
pub fn ruler_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut engine: ResMut<AtlasEngine>,
    mut surface: MapSurfaceParams,
    mut selection: ResMut<PlaceSelection>,
    mut notifications: MessageWriter<MapNotification>,
) {
    if is_typing(&mut contexts) {
        return;
    }

    if keyboard.just_pressed(KeyCode::KeyM) {
        engine.toggle_ruler(&mut surface);
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        if engine.ruler().is_active() {
            notifications.write(MapNotification(MapEvent::Cancel));
        } else {
            selection.selected = None;
        }
    }
    if keyboard.just_pressed(KeyCode::Backspace) || keyboard.just_pressed(KeyCode::Delete) {
        notifications.write(MapNotification(MapEvent::Undo));
    }
}

/// Cursor moves become one pointer-move per frame; a right click is undo.
pub fn pointer_notifications(
    mut cursor_events: MessageReader<CursorMoved>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    view: Res<MapView>,
    mut contexts: EguiContexts,
    mut notifications: MessageWriter<MapNotification>,
) {
    if let Some(moved) = cursor_events.read().last() {
        notifications.write(MapNotification(MapEvent::PointerMove(
            view.screen_to_world(moved.position),
        )));
    }

    if mouse_button.just_pressed(MouseButton::Right) && !is_cursor_over_ui(&mut contexts) {
        notifications.write(MapNotification(MapEvent::Undo));
    }
}

/// Feed host notifications to the engine. Primary clicks the ruler does not
/// take are passed on for marker selection.
pub fn dispatch_map_notifications(
    mut events: MessageReader<MapNotification>,
    mut engine: ResMut<AtlasEngine>,
    mut surface: MapSurfaceParams,
    mut clicks: MessageWriter<UnconsumedClick>,
) {
    for MapNotification(event) in events.read() {
        let consumed = engine.handle(&mut surface, *event);
        if let MapEvent::PointerDown(world) = *event
            && !consumed
        {
            clicks.write(UnconsumedClick { world });
        }
    }
}

/// Frame callback: run the cull pass the engine scheduled, at most once per frame.
pub fn run_cull_pass(mut engine: ResMut<AtlasEngine>, mut surface: MapSurfaceParams) {
    if surface.take_frame_request() && engine.on_frame(&mut surface) {
        trace!("Cull pass {}", engine.cull_passes());
    }
}

/// Hand every host flag back when the app shuts down.
pub fn release_flags_on_exit(
    mut exit_events: MessageReader<AppExit>,
    mut engine: ResMut<AtlasEngine>,
    mut surface: MapSurfaceParams,
) {
    if exit_events.read().next().is_some() {
        info!("Application exiting, releasing overlay host flags");
        engine.shutdown(&mut surface);
    }
}

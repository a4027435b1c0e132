//! The Bevy host for the overlay engine: camera, markers, input, rendering.
//!
//! Host systems translate window input into [`MapNotification`]s, which one
//! dispatch system hands to the [`AtlasEngine`]. The engine answers through
//! [`surface::MapSurfaceParams`], toggling marker entities and area shapes.

mod camera;
mod feed_loader;
mod input;
mod markers;
pub mod params;
mod places;
mod rendering;
mod surface;

pub use camera::{CameraFlight, MapView};
pub use feed_loader::{FeedStatus, LoadFeedRequest};
pub use places::{FocusPlaceRequest, PlaceSelection};
pub use surface::MapSurfaceParams;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::atlas::{AtlasEngine, MapEvent};
use crate::config::{AppConfig, ConfigLoaded};
use crate::theme;

/// A host notification bound for the engine
#[derive(Message, Debug, Clone, Copy)]
pub struct MapNotification(pub MapEvent);

/// Input handling that may emit notifications this frame
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapInputSet;

/// Startup: build the engine from the loaded config.
fn configure_engine(
    config: Res<AppConfig>,
    mut engine: ResMut<AtlasEngine>,
    mut surface: MapSurfaceParams,
) {
    *engine = AtlasEngine::new(config.data.engine_settings());
    for group in &config.data.hidden_groups {
        engine.set_group_visible(&mut surface, group, false);
    }
    debug!(
        "Overlay engine configured ({} hidden groups)",
        config.data.hidden_groups.len()
    );
}

pub struct AtlasViewPlugin;

impl Plugin for AtlasViewPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(theme::CANVAS_BACKGROUND))
            .init_resource::<MapView>()
            .init_resource::<camera::PanGesture>()
            .init_resource::<CameraFlight>()
            .init_resource::<surface::HostFlags>()
            .init_resource::<surface::FrameRequest>()
            .init_resource::<surface::AreaLayer>()
            .init_resource::<surface::MarkerIndex>()
            .init_resource::<FeedStatus>()
            .init_resource::<PlaceSelection>()
            .init_resource::<places::Spotlight>()
            .init_resource::<AtlasEngine>()
            .add_message::<MapNotification>()
            .add_message::<LoadFeedRequest>()
            .add_message::<feed_loader::FeedLoaded>()
            .add_message::<places::UnconsumedClick>()
            .add_message::<FocusPlaceRequest>()
            // Overlay gizmos render to layer 1
            .init_gizmo_group::<rendering::AtlasGizmoGroup>()
            .add_systems(
                Startup,
                (
                    camera::spawn_camera,
                    rendering::configure_atlas_gizmos,
                    (
                        camera::fit_view_to_window,
                        configure_engine,
                        markers::spawn_base_image,
                        feed_loader::load_configured_feed,
                    )
                        .chain()
                        .after(ConfigLoaded),
                ),
            )
            .add_systems(
                Update,
                (
                    feed_loader::load_feed_system,
                    feed_loader::poll_feed_tasks,
                    feed_loader::install_feed,
                )
                    .chain()
                    .before(MapInputSet),
            )
            .add_systems(
                Update,
                (
                    input::ruler_shortcuts,
                    input::pointer_notifications,
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::animate_flight,
                    camera::track_window_resize,
                    camera::apply_zoom_range,
                )
                    .chain()
                    .in_set(MapInputSet),
            )
            .add_systems(
                Update,
                (
                    input::dispatch_map_notifications,
                    places::hover_markers,
                    places::select_on_click,
                    places::focus_place,
                    places::tick_spotlight,
                    input::run_cull_pass,
                    camera::apply_map_view,
                    markers::scale_markers_with_zoom,
                    rendering::render_ruler,
                    rendering::render_spotlight,
                )
                    .chain()
                    .after(MapInputSet),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (rendering::render_areas, rendering::render_ruler_label),
            )
            .add_systems(Last, input::release_flags_on_exit);
    }
}

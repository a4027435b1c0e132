//! Marker hover and selection, fly-to from the places list, and the spotlight.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::atlas::AtlasEngine;
use crate::config::SetGroupHiddenRequest;
use crate::constants::{MARKER_PICK_RADIUS, SPOTLIGHT_SECS};

use super::camera::{CameraFlight, MapView, PanGesture};
use super::params::{is_cursor_over_ui, CursorParams};
use super::surface::{HostFlags, MapSurfaceParams, MarkerPin};

/// A primary click the measurement tool did not consume
#[derive(Message, Debug, Clone, Copy)]
pub struct UnconsumedClick {
    pub world: Vec2,
}

/// Message to fly to a place, open its popup and spotlight it
#[derive(Message)]
pub struct FocusPlaceRequest {
    pub id: String,
}

/// Place under the pointer and the place whose popup is open, by annotation index
#[derive(Resource, Default)]
pub struct PlaceSelection {
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
}

impl PlaceSelection {
    pub fn clear(&mut self) {
        self.hovered = None;
        self.selected = None;
    }

    /// Whether the area of `index` should be drawn highlighted
    pub fn highlights(&self, index: usize) -> bool {
        self.hovered == Some(index) || self.selected == Some(index)
    }
}

/// Expanding burst at a focused place, shown once the camera lands there.
/// A new focus replaces it.
#[derive(Resource, Default)]
pub struct Spotlight {
    /// Waiting for the flight to end
    pending: Option<Vec2>,
    burst: Option<(Vec2, f32)>,
}

impl Spotlight {
    pub fn arm(&mut self, position: Vec2) {
        self.pending = Some(position);
        self.burst = None;
    }

    /// Start the armed burst; the camera has stopped moving.
    fn land(&mut self) {
        if let Some(position) = self.pending.take() {
            self.burst = Some((position, 0.0));
        }
    }

    /// Position and progress in `0..1`
    pub fn current(&self) -> Option<(Vec2, f32)> {
        self.burst
            .map(|(position, elapsed)| (position, (elapsed / SPOTLIGHT_SECS).clamp(0.0, 1.0)))
    }
}

/// Nearest shown marker within the pick radius of a screen position.
fn pick_marker(
    view: &MapView,
    markers: &Query<(&MarkerPin, &Transform, &Visibility)>,
    screen: Vec2,
) -> Option<usize> {
    markers
        .iter()
        .filter(|(_, _, visibility)| **visibility != Visibility::Hidden)
        .map(|(pin, transform, _)| {
            let at = view.world_to_screen(transform.translation.truncate());
            (pin.index, at.distance(screen))
        })
        .filter(|(_, distance)| *distance <= MARKER_PICK_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

pub fn hover_markers(
    cursor: CursorParams,
    view: Res<MapView>,
    flags: Res<HostFlags>,
    gesture: Res<PanGesture>,
    flight: Res<CameraFlight>,
    markers: Query<(&MarkerPin, &Transform, &Visibility)>,
    mut contexts: EguiContexts,
    mut selection: ResMut<PlaceSelection>,
) {
    let hovered = if !flags.marker_pointer_events
        || gesture.is_dragging()
        || flight.is_flying()
        || is_cursor_over_ui(&mut contexts)
    {
        None
    } else {
        cursor
            .cursor_screen_pos()
            .and_then(|screen| pick_marker(&view, &markers, screen))
    };
    if selection.hovered != hovered {
        selection.hovered = hovered;
    }
}

/// Clicking a marker opens its popup; clicking empty map closes it.
pub fn select_on_click(
    mut clicks: MessageReader<UnconsumedClick>,
    view: Res<MapView>,
    flags: Res<HostFlags>,
    markers: Query<(&MarkerPin, &Transform, &Visibility)>,
    mut selection: ResMut<PlaceSelection>,
) {
    for click in clicks.read() {
        selection.selected = if flags.marker_pointer_events {
            pick_marker(&view, &markers, view.world_to_screen(click.world))
        } else {
            None
        };
    }
}

pub fn focus_place(
    mut requests: MessageReader<FocusPlaceRequest>,
    mut engine: ResMut<AtlasEngine>,
    mut surface: MapSurfaceParams,
    mut flight: ResMut<CameraFlight>,
    mut selection: ResMut<PlaceSelection>,
    mut spotlight: ResMut<Spotlight>,
    mut group_requests: MessageWriter<SetGroupHiddenRequest>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    let Some(annotation) = engine.annotation(&request.id) else {
        warn!("Cannot focus unknown place {}", request.id);
        return;
    };
    let (group, position) = (annotation.group.clone(), annotation.position);
    if !engine.group_visible(&group) {
        engine.set_group_visible(&mut surface, &group, true);
        group_requests.write(SetGroupHiddenRequest {
            group,
            hidden: false,
        });
    }

    let Some(target) = engine.focus_target(&surface, &request.id) else {
        return;
    };
    debug!("Flying to {} at zoom {:.2}", request.id, target.zoom);
    flight.start(surface.view(), target);
    selection.selected = engine.index_of(&request.id);
    spotlight.arm(position);
}

pub fn tick_spotlight(
    time: Res<Time>,
    flight: Res<CameraFlight>,
    mut spotlight: ResMut<Spotlight>,
) {
    if !flight.is_flying() {
        spotlight.land();
    }
    let Some((_, elapsed)) = spotlight.burst.as_mut() else {
        return;
    };
    *elapsed += time.delta_secs();
    if *elapsed >= SPOTLIGHT_SECS {
        spotlight.burst = None;
    }
}

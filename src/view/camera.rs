use bevy::camera::visibility::RenderLayers;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use bevy_egui::EguiContexts;

use crate::atlas::geometry::{clamp_view_center, max_bounds};
use crate::atlas::search::FocusTarget;
use crate::atlas::{MapEvent, ZoomRange};
use crate::config::{AppConfig, SetZoomRangeRequest};
use crate::constants::{
    BLANK_CANVAS_SIZE, DOUBLE_CLICK_WINDOW_SECS, DOUBLE_CLICK_ZOOM_STEP, FLY_TO_SECS,
    ZOOM_STEP_PER_LINE, ZOOM_STEP_PER_PIXEL,
};

use super::params::{is_cursor_over_ui, CursorParams};
use super::surface::HostFlags;
use super::MapNotification;

/// Screen pixels the pointer may travel before a press becomes a drag
const DRAG_THRESHOLD_PX: f32 = 4.0;

/// Screen pixels between the two clicks of a double click
const DOUBLE_CLICK_SLOP_PX: f32 = 6.0;

/// Zoom steps the initial fit snaps down to
const ZOOM_SNAP: f32 = 0.25;

#[derive(Component)]
pub struct AtlasCamera;

/// Where the map is looked at from. The camera transform is derived from it.
///
/// World coordinates are source-image pixels with y up, so world and source
/// positions are the same thing. Zoom follows the usual tile-map convention:
/// zoom 0 draws one source pixel per screen pixel and each step doubles it.
#[derive(Resource, Debug, Clone)]
pub struct MapView {
    pub center: Vec2,
    pub zoom: f32,
    pub range: ZoomRange,
    /// Window size in logical pixels
    pub screen: Vec2,
    pub image_size: Vec2,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: Vec2::splat(BLANK_CANVAS_SIZE / 2.0),
            zoom: 0.0,
            range: ZoomRange::default(),
            screen: Vec2::new(
                crate::constants::DEFAULT_WINDOW_WIDTH,
                crate::constants::DEFAULT_WINDOW_HEIGHT,
            ),
            image_size: Vec2::splat(BLANK_CANVAS_SIZE),
        }
    }
}

impl MapView {
    /// Screen pixels per source pixel
    pub fn scale(&self) -> f32 {
        self.zoom.exp2()
    }

    pub fn half_extent(&self) -> Vec2 {
        self.screen / 2.0 / self.scale()
    }

    /// Visible region in source pixels
    pub fn bounds(&self) -> Rect {
        let half = self.half_extent();
        Rect {
            min: self.center - half,
            max: self.center + half,
        }
    }

    /// Window position (origin top-left, y down) to source pixels
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let offset = screen - self.screen / 2.0;
        self.center + Vec2::new(offset.x, -offset.y) / self.scale()
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let offset = (world - self.center) * self.scale();
        self.screen / 2.0 + Vec2::new(offset.x, -offset.y)
    }

    /// Keep the view inside the padded image bounds
    pub fn clamp_center(&mut self) {
        let limits = max_bounds(self.image_size, self.screen);
        self.center = clamp_view_center(self.center, self.half_extent(), limits);
    }

    /// Change zoom keeping the source point under `anchor` (screen) in place.
    /// Returns whether the zoom changed.
    pub fn zoom_about(&mut self, zoom: f32, anchor: Vec2) -> bool {
        let zoom = self.range.clamp(zoom);
        if zoom == self.zoom {
            return false;
        }
        let pinned = self.screen_to_world(anchor);
        self.zoom = zoom;
        let drift = pinned - self.screen_to_world(anchor);
        self.center += drift;
        self.clamp_center();
        true
    }

    /// Largest snapped zoom at which the whole image fits the window
    pub fn fit_zoom(&self) -> f32 {
        let ratio = (self.screen / self.image_size).min_element();
        if !ratio.is_finite() || ratio <= 0.0 {
            return self.range.clamp(0.0);
        }
        let zoom = (ratio.log2() / ZOOM_SNAP).floor() * ZOOM_SNAP;
        self.range.clamp(zoom)
    }
}

/// Press and drag bookkeeping for the primary pointer
#[derive(Resource, Default)]
pub struct PanGesture {
    /// Screen position of the press that may still become a click
    pressed_at: Option<Vec2>,
    last_cursor: Option<Vec2>,
    dragging: bool,
    /// Time and screen position of the last plain click
    last_click: Option<(f64, Vec2)>,
}

impl PanGesture {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

/// Smooth camera flight toward a focus target
#[derive(Resource, Default)]
pub struct CameraFlight {
    flight: Option<Flight>,
}

struct Flight {
    from_center: Vec2,
    from_zoom: f32,
    to: FocusTarget,
    elapsed: f32,
}

impl CameraFlight {
    pub fn start(&mut self, view: &MapView, to: FocusTarget) {
        self.flight = Some(Flight {
            from_center: view.center,
            from_zoom: view.zoom,
            to,
            elapsed: 0.0,
        });
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    fn cancel(&mut self) {
        self.flight = None;
    }
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        AtlasCamera,
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
        // Layer 0 = map and markers, Layer 1 = overlay gizmos
        RenderLayers::from_layers(&[0, 1]),
    ));
}

/// Startup: size the view to the window and fit the image, like opening the map.
pub fn fit_view_to_window(
    config: Res<AppConfig>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut view: ResMut<MapView>,
    mut notifications: MessageWriter<MapNotification>,
) {
    if let Ok(window) = window.single() {
        view.screen = Vec2::new(window.width(), window.height());
    }
    view.range = config.data.zoom_range;
    view.image_size = config
        .data
        .base_image
        .as_ref()
        .map(|image| image.size)
        .unwrap_or(Vec2::splat(BLANK_CANVAS_SIZE));
    view.center = view.image_size / 2.0;
    view.zoom = view.fit_zoom();
    view.clamp_center();
    info!(
        "Map view {:?} at zoom {:.2} (range {:?})",
        view.image_size, view.zoom, view.range
    );

    notifications.write(MapNotification(MapEvent::Resize));
    notifications.write(MapNotification(MapEvent::ZoomEnd));
}

/// Drag to pan with the left or middle button. A left press released without
/// dragging is a click; two quick clicks are a double click, which also zooms
/// in while the host setting allows it.
#[allow(clippy::too_many_arguments)]
pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    cursor: CursorParams,
    flags: Res<HostFlags>,
    mut contexts: EguiContexts,
    mut view: ResMut<MapView>,
    mut gesture: ResMut<PanGesture>,
    mut flight: ResMut<CameraFlight>,
    mut notifications: MessageWriter<MapNotification>,
) {
    let cursor_pos = cursor.cursor_screen_pos();

    let pressed =
        mouse_button.just_pressed(MouseButton::Left) || mouse_button.just_pressed(MouseButton::Middle);
    if pressed
        && let Some(pos) = cursor_pos
        && !is_cursor_over_ui(&mut contexts)
    {
        gesture.pressed_at = Some(pos);
        gesture.last_cursor = Some(pos);
    }

    let Some(pressed_at) = gesture.pressed_at else {
        return;
    };

    let held = mouse_button.pressed(MouseButton::Left) || mouse_button.pressed(MouseButton::Middle);
    if held {
        let Some(pos) = cursor_pos else {
            return;
        };
        if !gesture.dragging
            && (mouse_button.pressed(MouseButton::Middle)
                || pos.distance(pressed_at) > DRAG_THRESHOLD_PX)
        {
            gesture.dragging = true;
            flight.cancel();
            notifications.write(MapNotification(MapEvent::DragStart));
        }

        if gesture.dragging {
            let delta = pos - gesture.last_cursor.unwrap_or(pos);
            if delta != Vec2::ZERO {
                let before = view.center;
                let scale = view.scale();
                view.center -= Vec2::new(delta.x, -delta.y) / scale;
                view.clamp_center();
                if view.center != before {
                    notifications.write(MapNotification(MapEvent::Move));
                }
            }
        }
        gesture.last_cursor = Some(pos);
        return;
    }

    // Released this frame
    if gesture.dragging {
        notifications.write(MapNotification(MapEvent::DragEnd));
    } else if let Some(pos) = cursor_pos {
        let now = time.elapsed_secs_f64();
        let world = view.screen_to_world(pos);
        let is_double = gesture.last_click.is_some_and(|(at, last)| {
            now - at <= DOUBLE_CLICK_WINDOW_SECS && last.distance(pos) <= DOUBLE_CLICK_SLOP_PX
        });
        if is_double {
            gesture.last_click = None;
            notifications.write(MapNotification(MapEvent::DoubleActivation(world)));
            // The flag is read before the notification reaches the engine,
            // so a measurement in progress keeps the map still.
            let zoom = view.zoom;
            if flags.double_click_zoom && view.zoom_about(zoom + DOUBLE_CLICK_ZOOM_STEP, pos) {
                flight.cancel();
                notifications.write(MapNotification(MapEvent::Move));
                notifications.write(MapNotification(MapEvent::ZoomEnd));
            }
        } else {
            gesture.last_click = Some((now, pos));
            notifications.write(MapNotification(MapEvent::PointerDown(world)));
        }
    }
    gesture.pressed_at = None;
    gesture.last_cursor = None;
    gesture.dragging = false;
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    cursor: CursorParams,
    mut contexts: EguiContexts,
    mut view: ResMut<MapView>,
    mut flight: ResMut<CameraFlight>,
    mut notifications: MessageWriter<MapNotification>,
) {
    if is_cursor_over_ui(&mut contexts) {
        scroll_events.clear();
        return;
    }

    let anchor = cursor.cursor_screen_pos().unwrap_or(view.screen / 2.0);
    let mut changed = false;
    for event in scroll_events.read() {
        let scroll_amount = match event.unit {
            MouseScrollUnit::Line => event.y * ZOOM_STEP_PER_LINE,
            MouseScrollUnit::Pixel => event.y * ZOOM_STEP_PER_PIXEL,
        };
        let target = view.zoom + scroll_amount;
        changed |= view.zoom_about(target, anchor);
    }

    if changed {
        flight.cancel();
        notifications.write(MapNotification(MapEvent::Move));
        notifications.write(MapNotification(MapEvent::ZoomEnd));
    }
}

pub fn animate_flight(
    time: Res<Time>,
    mut flight: ResMut<CameraFlight>,
    mut view: ResMut<MapView>,
    mut notifications: MessageWriter<MapNotification>,
) {
    let Some(active) = flight.flight.as_mut() else {
        return;
    };

    active.elapsed += time.delta_secs();
    let t = (active.elapsed / FLY_TO_SECS).clamp(0.0, 1.0);
    let eased = t * t * (3.0 - 2.0 * t);
    view.zoom = view
        .range
        .clamp(active.from_zoom + (active.to.zoom - active.from_zoom) * eased);
    view.center = active.from_center.lerp(active.to.center, eased);
    view.clamp_center();
    notifications.write(MapNotification(MapEvent::Move));

    if t >= 1.0 {
        flight.flight = None;
        notifications.write(MapNotification(MapEvent::ZoomEnd));
    }
}

pub fn track_window_resize(
    mut resize_events: MessageReader<WindowResized>,
    window: Query<Entity, With<PrimaryWindow>>,
    mut view: ResMut<MapView>,
    mut notifications: MessageWriter<MapNotification>,
) {
    let Ok(primary) = window.single() else {
        resize_events.clear();
        return;
    };

    let Some(event) = resize_events.read().filter(|e| e.window == primary).last() else {
        return;
    };

    view.screen = Vec2::new(event.width, event.height);
    view.clamp_center();
    notifications.write(MapNotification(MapEvent::Resize));
}

/// Apply a new zoom range from the settings panel.
pub fn apply_zoom_range(
    mut events: MessageReader<SetZoomRangeRequest>,
    mut view: ResMut<MapView>,
    mut notifications: MessageWriter<MapNotification>,
) {
    let Some(request) = events.read().last() else {
        return;
    };

    view.range = request.range;
    let clamped = view.range.clamp(view.zoom);
    notifications.write(MapNotification(MapEvent::ZoomRangeChanged));
    if clamped != view.zoom {
        view.zoom = clamped;
        view.clamp_center();
        notifications.write(MapNotification(MapEvent::Move));
        notifications.write(MapNotification(MapEvent::ZoomEnd));
    }
}

pub fn apply_map_view(
    view: Res<MapView>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<AtlasCamera>>,
) {
    if !view.is_changed() {
        return;
    }
    for (mut transform, mut projection) in camera_query.iter_mut() {
        transform.translation.x = view.center.x;
        transform.translation.y = view.center.y;
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = 1.0 / view.scale();
        }
    }
}

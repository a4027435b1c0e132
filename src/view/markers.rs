//! Marker entities and the base map image.

use bevy::prelude::*;

use crate::atlas::Annotation;
use crate::config::AppConfig;
use crate::constants::{BLANK_CANVAS_SIZE, MARKER_RADIUS};
use crate::paths;
use crate::theme;

use super::camera::MapView;
use super::surface::MarkerPin;

/// Marker z above the map image
const MARKER_Z: f32 = 10.0;

/// Label offset below the pin, in screen pixels
const LABEL_OFFSET_Y: f32 = -(MARKER_RADIUS + 9.0);

const LABEL_FONT_SIZE: f32 = 13.0;

#[derive(Component)]
pub struct BaseMapImage;

/// Transform that holds a marker at `position` with a constant on-screen size.
fn marker_transform(position: Vec2, view: &MapView) -> Transform {
    let scale = 1.0 / view.scale();
    Transform::from_translation(position.extend(MARKER_Z)).with_scale(Vec3::new(scale, scale, 1.0))
}

/// Spawn one hidden marker per annotation and return the entities by index.
/// Markers join the render layer when the next cull pass shows them.
pub fn spawn_markers(
    commands: &mut Commands,
    annotations: &[Annotation],
    view: &MapView,
) -> Vec<Entity> {
    annotations
        .iter()
        .enumerate()
        .map(|(index, annotation)| {
            let mut marker = commands.spawn((
                MarkerPin { index },
                marker_transform(annotation.position, view),
                Visibility::Hidden,
            ));
            marker.with_children(|parent| {
                parent.spawn(Sprite::from_color(
                    theme::pin_color(&annotation.kind),
                    Vec2::splat(MARKER_RADIUS * 2.0),
                ));
                if annotation.wants_label {
                    parent.spawn((
                        Text2d::new(annotation.name.clone()),
                        TextFont {
                            font_size: LABEL_FONT_SIZE,
                            ..default()
                        },
                        TextColor(theme::MARKER_LABEL),
                        Transform::from_translation(Vec3::new(0.0, LABEL_OFFSET_Y, 0.1)),
                    ));
                }
            });
            marker.id()
        })
        .collect()
}

/// Keep pins and labels at a constant on-screen size.
pub fn scale_markers_with_zoom(
    view: Res<MapView>,
    mut markers: Query<&mut Transform, With<MarkerPin>>,
) {
    if !view.is_changed() {
        return;
    }
    let scale = 1.0 / view.scale();
    for mut transform in markers.iter_mut() {
        transform.scale = Vec3::new(scale, scale, 1.0);
    }
}

/// Startup: draw the configured map image with its lower-left corner at the origin.
pub fn spawn_base_image(
    mut commands: Commands,
    config: Res<AppConfig>,
    asset_server: Res<AssetServer>,
) {
    let Some(image) = config.data.base_image.as_ref() else {
        info!("No base image configured, drawing on a blank canvas");
        commands.spawn((
            BaseMapImage,
            Sprite::from_color(theme::CANVAS_OUTLINE.with_alpha(0.08), Vec2::splat(BLANK_CANVAS_SIZE)),
            Transform::from_translation((Vec2::splat(BLANK_CANVAS_SIZE) / 2.0).extend(0.0)),
        ));
        return;
    };

    let load_path = paths::asset_load_path(&image.path);
    if !image.path.exists() && !load_path.exists() {
        warn!("Base image not found: {:?}", image.path);
    }

    let texture: Handle<Image> = asset_server.load(load_path);
    commands.spawn((
        BaseMapImage,
        Sprite {
            image: texture,
            custom_size: Some(image.size),
            ..default()
        },
        Transform::from_translation((image.size / 2.0).extend(0.0)),
    ));
    info!("Base image {:?} ({} x {})", image.path, image.size.x, image.size.y);
}

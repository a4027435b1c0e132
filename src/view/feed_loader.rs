//! Places feed loading on the IO task pool and task polling.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;

use crate::atlas::{load_feed, Annotation, AtlasEngine, FeedBatch, FeedError, FeedSource};
use crate::config::AppConfig;

use super::camera::MapView;
use super::markers::spawn_markers;
use super::places::PlaceSelection;
use super::surface::{AreaLayer, MapSurfaceParams, MarkerIndex, MarkerPin};

/// Message to (re)load the places feed
#[derive(Message)]
pub struct LoadFeedRequest {
    pub source: FeedSource,
}

/// A finished load, ready to hand to the engine
#[derive(Message)]
pub struct FeedLoaded {
    pub annotations: Vec<Annotation>,
}

/// Result of an async feed load
pub struct FeedLoadResult {
    pub source: FeedSource,
    pub batch: Result<FeedBatch, FeedError>,
}

/// Component for load task
#[derive(Component)]
pub struct LoadFeedTask(pub Task<FeedLoadResult>);

/// Resource tracking the feed for the status line and error dialog
#[derive(Resource, Default)]
pub struct FeedStatus {
    pub is_loading: bool,
    /// Source of the set currently shown
    pub source: Option<FeedSource>,
    /// Records skipped in the last load
    pub skipped: usize,
    pub error: Option<String>,
}

/// Startup: load the configured feed, if any.
pub fn load_configured_feed(config: Res<AppConfig>, mut requests: MessageWriter<LoadFeedRequest>) {
    match config.data.feed_source.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            requests.write(LoadFeedRequest {
                source: FeedSource::parse(raw),
            });
        }
        _ => info!("No places feed configured"),
    }
}

/// Starts an async load operation (file or network I/O and parsing)
pub fn load_feed_system(
    mut commands: Commands,
    mut events: MessageReader<LoadFeedRequest>,
    mut status: ResMut<FeedStatus>,
) {
    for event in events.read() {
        // Don't start a new load if one is already in progress
        if status.is_loading {
            warn!("Feed load already in progress, ignoring {}", event.source);
            continue;
        }

        status.is_loading = true;
        let source = event.source.clone();
        info!("Loading places feed from {}", source);

        let task = IoTaskPool::get().spawn(async move {
            let batch = load_feed(&source);
            FeedLoadResult { source, batch }
        });

        commands.spawn(LoadFeedTask(task));
    }
}

/// Polls load tasks. On completion the old markers are replaced; a failed load
/// leaves the map without annotations.
#[allow(clippy::too_many_arguments)]
pub fn poll_feed_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadFeedTask)>,
    mut status: ResMut<FeedStatus>,
    mut marker_index: ResMut<MarkerIndex>,
    mut areas: ResMut<AreaLayer>,
    mut selection: ResMut<PlaceSelection>,
    view: Res<MapView>,
    existing_markers: Query<Entity, With<MarkerPin>>,
    mut loaded: MessageWriter<FeedLoaded>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(result) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();
        status.is_loading = false;

        // Clear existing markers
        for existing in existing_markers.iter() {
            commands.entity(existing).despawn();
        }
        areas.clear();
        selection.clear();

        let annotations = match result.batch {
            Ok(batch) => {
                status.error = None;
                status.skipped = batch.skipped;
                batch.annotations
            }
            Err(e) => {
                error!("{}", e);
                status.error = Some(e.to_string());
                status.skipped = 0;
                Vec::new()
            }
        };
        status.source = Some(result.source);

        marker_index.entities = spawn_markers(&mut commands, &annotations, &view);
        loaded.write(FeedLoaded { annotations });
    }
}

/// Hand a loaded set to the engine. Runs after the marker entities exist.
pub fn install_feed(
    mut events: MessageReader<FeedLoaded>,
    mut engine: ResMut<AtlasEngine>,
    mut surface: MapSurfaceParams,
) {
    for event in events.read() {
        engine.load_annotations(&mut surface, event.annotations.clone());
    }
}

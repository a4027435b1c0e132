use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::atlas::{
    CullSettings, EngineSettings, RegionBandFractions, ScaleCalibration, VisibilityFractions,
    ZoomRange,
};
use crate::constants::{DEFAULT_SCALE_BAR_DECIMALS, DEFAULT_SCALE_BAR_WIDTH};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Base map image drawn under the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseImage {
    pub path: PathBuf,
    /// Source-image size in pixels. Annotation coordinates are relative to this image.
    pub size: Vec2,
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfigData {
    /// Place feed: a local path or an http(s) URL
    pub feed_source: Option<String>,

    /// Map image; without it the overlay is drawn on a blank canvas
    pub base_image: Option<BaseImage>,

    pub zoom_range: ZoomRange,

    /// Fraction of the zoom range at which each point kind appears
    pub visibility: VisibilityFractions,

    /// Pin and area bands of boundary regions
    pub region_band: RegionBandFractions,

    pub calibration: ScaleCalibration,

    pub cull: CullSettings,

    /// On-screen scale bar width in pixels
    pub scale_bar_width: f32,

    /// Decimals the scale bar shows for values between 1 and 10
    pub scale_bar_decimals: usize,

    /// Layer groups the user switched off
    pub hidden_groups: Vec<String>,
}

impl Default for AtlasConfigData {
    fn default() -> Self {
        Self {
            feed_source: None,
            base_image: None,
            zoom_range: ZoomRange::default(),
            visibility: VisibilityFractions::default(),
            region_band: RegionBandFractions::default(),
            calibration: ScaleCalibration::default(),
            cull: CullSettings::default(),
            scale_bar_width: DEFAULT_SCALE_BAR_WIDTH,
            scale_bar_decimals: DEFAULT_SCALE_BAR_DECIMALS,
            hidden_groups: Vec::new(),
        }
    }
}

impl AtlasConfigData {
    /// Engine parameters, with out-of-range values replaced by defaults.
    pub fn engine_settings(&self) -> EngineSettings {
        let scale_bar_width = if self.scale_bar_width.is_finite() && self.scale_bar_width > 0.0 {
            self.scale_bar_width
        } else {
            warn!(
                "Ignoring scale bar width {}, using {}",
                self.scale_bar_width, DEFAULT_SCALE_BAR_WIDTH
            );
            DEFAULT_SCALE_BAR_WIDTH
        };
        EngineSettings {
            fractions: self.visibility.clone(),
            region_band: self.region_band,
            cull: self.cull,
            scale_bar_width,
            scale_bar_decimals: self.scale_bar_decimals,
            calibration: self.calibration.clone().sanitized(),
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AtlasConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AtlasConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to remember a new feed source
#[derive(Message)]
pub struct SetFeedSourceRequest {
    pub source: String,
}

/// Message to persist a calibration the engine accepted
#[derive(Message)]
pub struct UpdateCalibrationRequest {
    pub calibration: ScaleCalibration,
}

/// Message to persist a layer group toggle
#[derive(Message)]
pub struct SetGroupHiddenRequest {
    pub group: String,
    pub hidden: bool,
}

/// Message to change the zoom range (the view applies it, config persists it)
#[derive(Message)]
pub struct SetZoomRangeRequest {
    pub range: ZoomRange,
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: AtlasConfigData,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Load configuration from disk
fn load_config(config_path: &std::path::Path) -> LoadConfigResult {
    if !config_path.exists() {
        info!("No config file found, using defaults");
        return LoadConfigResult {
            data: AtlasConfigData::default(),
            reset_reason: None,
        };
    }

    match std::fs::read_to_string(config_path) {
        Ok(json) => {
            let result = parse_config(&json);
            if result.reset_reason.is_none() {
                info!("Loaded config from {:?}", config_path);
            }
            result
        }
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            LoadConfigResult {
                data: AtlasConfigData::default(),
                reset_reason: Some(format!("Could not read configuration file: {}", e)),
            }
        }
    }
}

fn parse_config(json: &str) -> LoadConfigResult {
    match serde_json::from_str(json) {
        Ok(data) => LoadConfigResult {
            data,
            reset_reason: None,
        },
        Err(e) => {
            warn!("Failed to parse config file: {}", e);
            LoadConfigResult {
                data: AtlasConfigData::default(),
                reset_reason: Some(format!("Configuration file was corrupted: {}", e)),
            }
        }
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;
    config.dirty = false;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

fn set_feed_source_system(
    mut events: MessageReader<SetFeedSourceRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.feed_source = Some(event.source.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
        info!("Feed source set to {}", event.source);
    }
}

fn update_calibration_system(
    mut events: MessageReader<UpdateCalibrationRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.calibration = event.calibration.clone();
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

fn set_group_hidden_system(
    mut events: MessageReader<SetGroupHiddenRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        let hidden = &mut config.data.hidden_groups;
        hidden.retain(|g| g != &event.group);
        if event.hidden {
            hidden.push(event.group.clone());
        }
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

fn set_zoom_range_system(
    mut events: MessageReader<SetZoomRangeRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.zoom_range = event.range;
        config.dirty = true;
        save_events.write(SaveConfigRequest);
        info!("Zoom range set to {:?}", event.range);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<SetFeedSourceRequest>()
            .add_message::<UpdateCalibrationRequest>()
            .add_message::<SetGroupHiddenRequest>()
            .add_message::<SetZoomRangeRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    set_feed_source_system.run_if(on_message::<SetFeedSourceRequest>),
                    update_calibration_system.run_if(on_message::<UpdateCalibrationRequest>),
                    set_group_hidden_system.run_if(on_message::<SetGroupHiddenRequest>),
                    set_zoom_range_system.run_if(on_message::<SetZoomRangeRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_data_default() {
        let data = AtlasConfigData::default();
        assert!(data.feed_source.is_none());
        assert!(data.base_image.is_none());
        assert_eq!(data.zoom_range, ZoomRange::default());
        assert_eq!(data.scale_bar_width, 120.0);
        assert!(data.hidden_groups.is_empty());
    }

    #[test]
    fn test_config_data_serialization() {
        let data = AtlasConfigData {
            feed_source: Some("https://example.org/places.json".to_string()),
            base_image: Some(BaseImage {
                path: PathBuf::from("/maps/world.png"),
                size: Vec2::new(4096.0, 3072.0),
            }),
            hidden_groups: vec!["Ruins".to_string()],
            ..Default::default()
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AtlasConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.feed_source, data.feed_source);
        assert_eq!(parsed.base_image, data.base_image);
        assert_eq!(parsed.hidden_groups, data.hidden_groups);
        assert_eq!(parsed.calibration, data.calibration);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let result = parse_config(r#"{"feed_source": "places.json", "cull": {"padding": 0.5}}"#);
        assert!(result.reset_reason.is_none());
        assert_eq!(result.data.feed_source.as_deref(), Some("places.json"));
        assert_eq!(result.data.cull.padding, 0.5);
        assert_eq!(result.data.cull.epsilon, 0.5);
        assert_eq!(result.data.visibility, VisibilityFractions::default());
    }

    #[test]
    fn test_corrupt_config_resets_with_reason() {
        let result = parse_config("{ not json");
        assert!(result.reset_reason.is_some());
        assert!(result.data.feed_source.is_none());
    }

    #[test]
    fn test_invalid_calibration_sanitized() {
        let result = parse_config(r#"{"calibration": {"units_per_px": -3.0, "unit": "km"}}"#);
        let settings = result.data.engine_settings();
        assert_eq!(settings.calibration, ScaleCalibration::default());
    }

    #[test]
    fn test_invalid_scale_bar_width_falls_back() {
        let data = AtlasConfigData {
            scale_bar_width: 0.0,
            ..Default::default()
        };
        assert_eq!(data.engine_settings().scale_bar_width, DEFAULT_SCALE_BAR_WIDTH);
    }
}

//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// On-screen scale bar width in pixels
pub const DEFAULT_SCALE_BAR_WIDTH: f32 = 120.0;

/// Scale bar decimals for values between 1 and 10
pub const DEFAULT_SCALE_BAR_DECIMALS: usize = 2;

/// Source size assumed when no base image is configured
pub const BLANK_CANVAS_SIZE: f32 = 4096.0;

/// Screen-pixel radius within which a click selects a marker
pub const MARKER_PICK_RADIUS: f32 = 16.0;

/// Marker pin radius in screen pixels
pub const MARKER_RADIUS: f32 = 6.0;

/// Zoom change per scroll line
pub const ZOOM_STEP_PER_LINE: f32 = 0.25;

/// Zoom change per scrolled pixel (trackpads)
pub const ZOOM_STEP_PER_PIXEL: f32 = 0.0025;

/// Zoom added by a double click
pub const DOUBLE_CLICK_ZOOM_STEP: f32 = 1.0;

/// Maximum delay between the two clicks of a double click, in seconds
pub const DOUBLE_CLICK_WINDOW_SECS: f64 = 0.35;

/// Seconds of camera movement for a fly-to
pub const FLY_TO_SECS: f32 = 0.6;

/// Lifetime of the spotlight burst drawn at a focused place, in seconds
pub const SPOTLIGHT_SECS: f32 = 2.7;

/// Final spotlight radius in screen pixels
pub const SPOTLIGHT_RADIUS: f32 = 90.0;

//! Annotation overlay engine for a zoomable campaign map.
//!
//! Everything in here is independent of how the map is drawn. The engine talks
//! to its surface through [`MapSurface`] and receives notifications as
//! [`MapEvent`] values, so the same code runs against the Bevy view and
//! against the counting stub used in tests.
//!
//! ## Module Structure
//!
//! - [`calibrator`] - Designer zoom fractions to absolute thresholds
//! - [`visibility`] - Zoom-only visibility of markers and areas
//! - [`culler`] - Once-per-frame viewport culling
//! - [`ruler`] - Measurement tool state machine
//! - [`scale_bar`] - Scale bar reading and number formatting
//! - [`feed`] - Place feed loading and validation
//! - [`engine`] - [`AtlasEngine`], tying the above together

pub mod annotation;
pub mod calibration;
pub mod calibrator;
pub mod culler;
pub mod engine;
pub mod feed;
pub mod geometry;
pub mod host;
pub mod lease;
pub mod ruler;
pub mod scale_bar;
pub mod search;
pub mod style;
pub mod visibility;

#[cfg(test)]
mod testing;

pub use annotation::{Annotation, AnnotationKind};
pub use calibration::{parse_scale_input, CalibrationError, ScaleCalibration};
pub use calibrator::{RegionBandFractions, VisibilityFractions, ZoomRange};
pub use culler::CullSettings;
pub use engine::{AtlasEngine, EngineSettings};
pub use feed::{load_feed, FeedBatch, FeedError, FeedSource};
pub use host::{ElementKey, HostFlag, LayerElement, MapEvent, MapSurface};
pub use ruler::RulerPhase;
pub use style::AreaStyle;
pub use visibility::VisibilityState;

//! Places feed ingestion.
//!
//! The feed is a JSON array of place records, or an object wrapping that
//! array under `places`. Records that cannot become an [`Annotation`] are
//! skipped one by one; only an unreadable or unparseable document fails.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use bevy::log::{info, warn};
use bevy::math::Vec2;
use serde::Deserialize;
use serde_json::Value;

use super::annotation::{Annotation, AnnotationKind, MIN_AREA_POINTS};
use super::style::{AreaStyle, StyleOverrides};

/// Where the feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    File(PathBuf),
    Url(String),
}

impl FeedSource {
    /// `http://` and `https://` sources are fetched, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            FeedSource::Url(trimmed.to_string())
        } else {
            FeedSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::File(path) => write!(f, "{}", path.display()),
            FeedSource::Url(url) => write!(f, "{}", url),
        }
    }
}

#[derive(Debug)]
pub enum FeedError {
    Read { source: String, message: String },
    Http { url: String, message: String },
    Parse(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Read { source, message } => {
                write!(f, "Failed to read places feed {}: {}", source, message)
            }
            FeedError::Http { url, message } => {
                write!(f, "Failed to fetch places feed {}: {}", url, message)
            }
            FeedError::Parse(message) => write!(f, "Failed to parse places feed: {}", message),
        }
    }
}

impl std::error::Error for FeedError {}

/// Annotations ingested from one feed document.
#[derive(Debug, Default)]
pub struct FeedBatch {
    pub annotations: Vec<Annotation>,
    /// Records dropped as malformed or duplicate.
    pub skipped: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedDocument {
    List(Vec<Value>),
    Wrapped {
        #[serde(default)]
        places: Vec<Value>,
    },
}

/// One record as written in the feed. Fields stay untyped so that a wrongly
/// typed optional field is dropped on its own instead of failing the record.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPlace {
    id: Option<Value>,
    name: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<Value>,
    layer: Option<Value>,
    x: Option<Value>,
    y: Option<Value>,
    desc: Option<Value>,
    href: Option<Value>,
    label: Option<Value>,
    area: Option<Value>,
    stroke: Option<Value>,
    fill: Option<Value>,
    #[serde(rename = "fillOpacity")]
    fill_opacity: Option<Value>,
    weight: Option<Value>,
}

/// Optional string field; any other JSON type is ignored with a warning.
fn string_field(id: &str, field: &str, value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            warn!("{}: ignoring {} of wrong type: {}", id, field, other);
            None
        }
    }
}

/// Optional finite number field; any other JSON value is ignored with a warning.
fn number_field(id: &str, field: &str, value: Option<Value>) -> Option<f32> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    match value.as_f64().map(|n| n as f32).filter(|n| n.is_finite()) {
        Some(n) => Some(n),
        None => {
            warn!("{}: ignoring {} of wrong type: {}", id, field, value);
            None
        }
    }
}

fn bool_field(id: &str, field: &str, value: Option<Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(b),
        Value::Null => None,
        other => {
            warn!("{}: ignoring {} of wrong type: {}", id, field, other);
            None
        }
    }
}

/// A coordinate must be a number that stays finite as `f32`.
fn coordinate(value: Option<&Value>) -> Option<f32> {
    value
        .and_then(Value::as_f64)
        .map(|n| n as f32)
        .filter(|n| n.is_finite())
}

/// Read the raw document from disk or over HTTP.
pub fn fetch_feed(source: &FeedSource) -> Result<String, FeedError> {
    match source {
        FeedSource::File(path) => std::fs::read_to_string(path).map_err(|e| FeedError::Read {
            source: path.display().to_string(),
            message: e.to_string(),
        }),
        FeedSource::Url(url) => {
            let response = ureq::get(url)
                .set("User-Agent", "atlasforged-feed")
                .set("Cache-Control", "no-cache")
                .call()
                .map_err(|e| FeedError::Http {
                    url: url.clone(),
                    message: e.to_string(),
                })?;
            response.into_string().map_err(|e| FeedError::Http {
                url: url.clone(),
                message: e.to_string(),
            })
        }
    }
}

pub fn load_feed(source: &FeedSource) -> Result<FeedBatch, FeedError> {
    let json = fetch_feed(source)?;
    let batch = parse_feed(&json)?;
    info!(
        "Loaded {} places from {} ({} skipped)",
        batch.annotations.len(),
        source,
        batch.skipped
    );
    Ok(batch)
}

pub fn parse_feed(json: &str) -> Result<FeedBatch, FeedError> {
    let document: FeedDocument =
        serde_json::from_str(json).map_err(|e| FeedError::Parse(e.to_string()))?;
    let records = match document {
        FeedDocument::List(records) => records,
        FeedDocument::Wrapped { places } => places,
    };

    let mut batch = FeedBatch::default();
    let mut seen = HashSet::new();
    for (position, record) in records.into_iter().enumerate() {
        match parse_record(record) {
            Ok(annotation) if seen.insert(annotation.id.clone()) => {
                batch.annotations.push(annotation)
            }
            Ok(annotation) => {
                warn!("Skipping place #{}: duplicate id {:?}", position, annotation.id);
                batch.skipped += 1;
            }
            Err(reason) => {
                warn!("Skipping place #{}: {}", position, reason);
                batch.skipped += 1;
            }
        }
    }
    Ok(batch)
}

fn parse_record(record: Value) -> Result<Annotation, String> {
    let raw: RawPlace = serde_json::from_value(record).map_err(|e| e.to_string())?;

    let id = match raw.id {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err("missing id".to_string()),
    };
    let name = match raw.name {
        Some(Value::String(n)) if !n.trim().is_empty() => n.trim().to_string(),
        _ => return Err(format!("{}: missing name", id)),
    };
    let position = match (coordinate(raw.x.as_ref()), coordinate(raw.y.as_ref())) {
        (Some(x), Some(y)) => Vec2::new(x, y),
        _ => return Err(format!("{}: missing or invalid position", id)),
    };

    let kind = AnnotationKind::parse(
        string_field(&id, "type", raw.kind)
            .as_deref()
            .unwrap_or_default(),
    );
    let group = string_field(&id, "layer", raw.layer)
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| kind.default_group().to_string());

    let area = if kind.is_boundary_region() {
        raw.area.as_ref().and_then(|value| parse_area(&id, value))
    } else {
        None
    };

    let stroke = string_field(&id, "stroke", raw.stroke);
    let fill = string_field(&id, "fill", raw.fill);
    let style = AreaStyle::with_overrides(&StyleOverrides {
        stroke: stroke.as_deref(),
        fill: fill.as_deref(),
        fill_opacity: number_field(&id, "fillOpacity", raw.fill_opacity),
        weight: number_field(&id, "weight", raw.weight),
    });

    let wants_label =
        bool_field(&id, "label", raw.label).unwrap_or(false) || kind.labelled_by_default();
    let href = string_field(&id, "href", raw.href);
    let description = string_field(&id, "desc", raw.desc);
    let mut annotation = Annotation::point(id, name, kind, position);
    annotation.group = group;
    annotation.style = style;
    annotation.wants_label = wants_label;
    annotation.href = href.filter(|h| !h.trim().is_empty() && h.trim() != "#");
    annotation.description = description.unwrap_or_default();

    Ok(match area {
        Some(points) => annotation.with_area(points),
        None => annotation,
    })
}

/// `[[y, x], ...]` pairs; anything else, or fewer than three vertices, yields no polygon.
fn parse_area(id: &str, value: &Value) -> Option<Vec<Vec2>> {
    let pairs: Vec<[f64; 2]> = match serde_json::from_value(value.clone()) {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!("{}: ignoring malformed area: {}", id, e);
            return None;
        }
    };
    let points: Vec<Vec2> = pairs
        .into_iter()
        .filter(|[y, x]| x.is_finite() && y.is_finite())
        .map(|[y, x]| Vec2::new(x as f32, y as f32))
        .collect();
    if points.len() < MIN_AREA_POINTS {
        warn!("{}: area has {} usable points, not rendering it", id, points.len());
        return None;
    }
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let batch = parse_feed(
            r#"[
                {"id": "a", "name": "Kest", "type": "City", "x": 10, "y": 20},
                {"id": 7, "name": "Ford", "type": " town ", "x": 1.5, "y": 2.5, "layer": "Towns"}
            ]"#,
        )
        .unwrap();
        assert_eq!(batch.annotations.len(), 2);
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.annotations[0].kind, AnnotationKind::City);
        assert_eq!(batch.annotations[0].position, Vec2::new(10.0, 20.0));
        assert_eq!(batch.annotations[0].group, "Cities");
        assert_eq!(batch.annotations[1].id, "7");
        assert_eq!(batch.annotations[1].kind, AnnotationKind::Town);
    }

    #[test]
    fn test_parse_wrapped_places() {
        let batch = parse_feed(r#"{"places": [{"id": "a", "name": "A", "type": "poi", "x": 0, "y": 0}]}"#)
            .unwrap();
        assert_eq!(batch.annotations.len(), 1);
        assert_eq!(batch.annotations[0].kind, AnnotationKind::PointOfInterest);
    }

    #[test]
    fn test_wrapper_without_places_is_empty() {
        let batch = parse_feed(r#"{"version": 2}"#).unwrap();
        assert!(batch.annotations.is_empty());
    }

    #[test]
    fn test_malformed_records_skipped() {
        let batch = parse_feed(
            r#"[
                {"name": "No id", "type": "city", "x": 1, "y": 1},
                {"id": "b", "name": "No position", "type": "city"},
                {"id": "c", "name": "Bad x", "type": "city", "x": "far", "y": 1},
                "not an object",
                {"id": "d", "name": "Good", "type": "ruin", "x": 4, "y": 5},
                {"id": "d", "name": "Duplicate", "type": "ruin", "x": 4, "y": 5}
            ]"#,
        )
        .unwrap();
        assert_eq!(batch.annotations.len(), 1);
        assert_eq!(batch.annotations[0].id, "d");
        assert_eq!(batch.skipped, 5);
    }

    #[test]
    fn test_invalid_document_is_error() {
        assert!(matches!(parse_feed("{not json"), Err(FeedError::Parse(_))));
        assert!(matches!(parse_feed("42"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_kingdom_area_and_style() {
        let batch = parse_feed(
            r##"[{
                "id": "k", "name": "Vessa", "type": "kingdom", "x": 50, "y": 60,
                "area": [[0, 0], [0, 100], [100, 100], [100, 0]],
                "stroke": "#ff0000", "fillOpacity": 0.3, "weight": 3
            }]"##,
        )
        .unwrap();
        let kingdom = &batch.annotations[0];
        let area = kingdom.area.as_ref().unwrap();
        assert_eq!(area.len(), 4);
        // Pairs are [y, x].
        assert_eq!(area[1], Vec2::new(100.0, 0.0));
        assert_eq!(kingdom.style.fill_opacity, 0.3);
        assert_eq!(kingdom.style.weight, 3.0);
        assert!(kingdom.wants_label);
    }

    #[test]
    fn test_wrongly_typed_optional_fields_dropped() {
        let batch = parse_feed(
            r#"[
                {"id": "k", "name": "Vessa", "type": "kingdom", "x": 1, "y": 1, "fillOpacity": "0.3"},
                {"id": "w", "name": "Orm", "type": "kingdom", "x": 1, "y": 1, "weight": "3", "stroke": 5},
                {"id": "c", "name": "Kest", "type": "city", "x": 1, "y": 1, "label": "yes", "desc": 12, "layer": []}
            ]"#,
        )
        .unwrap();
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.annotations.len(), 3);
        assert_eq!(batch.annotations[0].style, AreaStyle::default());
        assert_eq!(batch.annotations[1].style, AreaStyle::default());
        let city = &batch.annotations[2];
        assert!(!city.wants_label);
        assert!(city.description.is_empty());
        assert_eq!(city.group, "Cities");
    }

    #[test]
    fn test_position_beyond_f32_skipped() {
        let batch = parse_feed(
            r#"[{"id": "far", "name": "Far", "type": "city", "x": 1e300, "y": 1}]"#,
        )
        .unwrap();
        assert!(batch.annotations.is_empty());
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn test_degenerate_area_kept_as_point() {
        let batch = parse_feed(
            r#"[{"id": "k", "name": "Tiny", "type": "kingdom", "x": 1, "y": 1, "area": [[0, 0], [1, 1]]}]"#,
        )
        .unwrap();
        assert_eq!(batch.annotations.len(), 1);
        assert!(!batch.annotations[0].has_area());
    }

    #[test]
    fn test_area_ignored_for_point_kinds() {
        let batch = parse_feed(
            r#"[{"id": "c", "name": "City", "type": "city", "x": 1, "y": 1, "area": [[0, 0], [1, 1], [2, 0]]}]"#,
        )
        .unwrap();
        assert!(batch.annotations[0].area.is_none());
    }

    #[test]
    fn test_href_placeholder_dropped() {
        let batch = parse_feed(
            r##"[
                {"id": "a", "name": "A", "type": "city", "x": 0, "y": 0, "href": "#"},
                {"id": "b", "name": "B", "type": "city", "x": 0, "y": 0, "href": "lore/b.html", "label": true}
            ]"##,
        )
        .unwrap();
        assert!(batch.annotations[0].href.is_none());
        assert_eq!(batch.annotations[1].href.as_deref(), Some("lore/b.html"));
        assert!(batch.annotations[1].wants_label);
        assert!(!batch.annotations[0].wants_label);
    }

    #[test]
    fn test_feed_source_parse() {
        assert_eq!(
            FeedSource::parse(" https://example.org/places.json "),
            FeedSource::Url("https://example.org/places.json".to_string())
        );
        assert_eq!(
            FeedSource::parse("data/places.json"),
            FeedSource::File(PathBuf::from("data/places.json"))
        );
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let source = FeedSource::File(PathBuf::from("definitely/not/here/places.json"));
        assert!(matches!(load_feed(&source), Err(FeedError::Read { .. })));
    }
}

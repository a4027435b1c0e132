//! Annotation records ingested from the places feed.

use bevy::math::{Rect, Vec2};

use super::geometry::polygon_bounds;
use super::style::AreaStyle;

/// Minimum vertex count of a renderable boundary polygon.
pub const MIN_AREA_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    City,
    Town,
    Ruin,
    PointOfInterest,
    /// Boundary region with a pin band and an area band.
    Kingdom,
    /// Unrecognized feed type; always visible.
    Other(String),
}

impl AnnotationKind {
    /// Parse a feed `type` value (case and surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "city" => AnnotationKind::City,
            "town" => AnnotationKind::Town,
            "ruin" => AnnotationKind::Ruin,
            "poi" => AnnotationKind::PointOfInterest,
            "kingdom" => AnnotationKind::Kingdom,
            _ => AnnotationKind::Other(normalized),
        }
    }

    pub fn is_boundary_region(&self) -> bool {
        matches!(self, AnnotationKind::Kingdom)
    }

    /// Whether the marker carries a permanent name label when the feed does not say.
    pub fn labelled_by_default(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Town | AnnotationKind::PointOfInterest | AnnotationKind::Kingdom
        )
    }

    /// Layer group used when the record names none.
    pub fn default_group(&self) -> &'static str {
        match self {
            AnnotationKind::City => "Cities",
            AnnotationKind::Town => "Towns",
            AnnotationKind::Ruin => "Ruins",
            AnnotationKind::PointOfInterest => "POI",
            AnnotationKind::Kingdom => "Kingdoms",
            AnnotationKind::Other(_) => "Other",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            AnnotationKind::City => "City",
            AnnotationKind::Town => "Town",
            AnnotationKind::Ruin => "Ruin",
            AnnotationKind::PointOfInterest => "Point of interest",
            AnnotationKind::Kingdom => "Kingdom",
            AnnotationKind::Other(name) => name,
        }
    }
}

/// A place on the campaign map. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: String,
    pub name: String,
    pub kind: AnnotationKind,
    pub group: String,
    /// Source-image pixels, y up.
    pub position: Vec2,
    /// Boundary polygon; only kept for boundary regions with at least
    /// [`MIN_AREA_POINTS`] vertices.
    pub area: Option<Vec<Vec2>>,
    pub style: AreaStyle,
    pub description: String,
    pub href: Option<String>,
    pub wants_label: bool,
}

impl Annotation {
    /// A bare point annotation with kind defaults; mostly useful in tests.
    pub fn point(id: impl Into<String>, name: impl Into<String>, kind: AnnotationKind, position: Vec2) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group: kind.default_group().to_string(),
            wants_label: kind.labelled_by_default(),
            kind,
            position,
            area: None,
            style: AreaStyle::default(),
            description: String::new(),
            href: None,
        }
    }

    /// Attach a boundary polygon; polygons below [`MIN_AREA_POINTS`] are dropped.
    pub fn with_area(mut self, area: Vec<Vec2>) -> Self {
        self.area = (area.len() >= MIN_AREA_POINTS).then_some(area);
        self
    }

    pub fn has_area(&self) -> bool {
        self.area
            .as_ref()
            .is_some_and(|points| points.len() >= MIN_AREA_POINTS)
    }

    pub fn area_bounds(&self) -> Option<Rect> {
        self.area
            .as_deref()
            .filter(|points| points.len() >= MIN_AREA_POINTS)
            .and_then(polygon_bounds)
    }

    /// Lower-cased text the place list searches in.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.description, self.group).to_lowercase()
    }
}

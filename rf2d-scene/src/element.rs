use std::fmt;

use nalgebra::Point2;

use crate::geometry::Polygon;

/// What a polygon on the cross-section represents.
///
/// Conductors (`Ground`, `TracePos`, `TraceNeg`) become fixed-potential
/// boundaries; `Dielectric` contributes its relative permittivity to
/// the bulk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Dielectric,
    TracePos,
    TraceNeg,
    Ground,
}

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Dielectric,
        ElementKind::TracePos,
        ElementKind::TraceNeg,
        ElementKind::Ground,
    ];

    pub fn is_conductor(&self) -> bool {
        !matches!(self, ElementKind::Dielectric)
    }

    pub fn is_trace(&self) -> bool {
        matches!(self, ElementKind::TracePos | ElementKind::TraceNeg)
    }

    /// Tag used in project files and tables.
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Dielectric => "Dielectric",
            ElementKind::TracePos => "Trace+",
            ElementKind::TraceNeg => "Trace-",
            ElementKind::Ground => "GND",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    fn default_name(&self) -> &'static str {
        match self {
            ElementKind::Dielectric => "Substrate",
            ElementKind::TracePos => "RF+",
            ElementKind::TraceNeg => "RF-",
            ElementKind::Ground => "GND",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const DEFAULT_EPSILON_R: f64 = 4.3;

/// A tagged polygon of the scene.
#[derive(Clone, Debug)]
pub struct Element {
    name: String,
    kind: ElementKind,
    epsilon_r: f64,
    polygon: Polygon,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            name: kind.default_name().to_owned(),
            kind,
            epsilon_r: DEFAULT_EPSILON_R,
            polygon: Polygon::default(),
        }
    }

    pub fn with_polygon(kind: ElementKind, polygon: Polygon) -> Self {
        Self {
            polygon,
            ..Self::new(kind)
        }
    }

    /// Axis-aligned rectangular element from two opposite corners.
    pub fn rectangle(kind: ElementKind, a: Point2<f64>, b: Point2<f64>) -> Self {
        Self::with_polygon(kind, Polygon::rectangle(a, b))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ElementKind) {
        self.kind = kind;
    }

    /// Relative permittivity; only meaningful for dielectrics.
    pub fn epsilon_r(&self) -> f64 {
        self.epsilon_r
    }

    pub fn set_epsilon_r(&mut self, epsilon_r: f64) {
        self.epsilon_r = epsilon_r;
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn polygon_mut(&mut self) -> &mut Polygon {
        &mut self.polygon
    }
}

#[cfg(test)]
mod tests {
    use crate::element::{
        Element,
        ElementKind,
    };

    #[test]
    fn it_labels_kinds_like_the_project_file() {
        assert_eq!(ElementKind::TracePos.label(), "Trace+");
        assert_eq!(ElementKind::from_label("GND"), Some(ElementKind::Ground));
        assert_eq!(ElementKind::from_label("Copper"), None);
    }

    #[test]
    fn it_names_new_elements_by_kind() {
        assert_eq!(Element::new(ElementKind::TracePos).name(), "RF+");
        assert_eq!(Element::new(ElementKind::Dielectric).name(), "Substrate");
        assert_eq!(Element::new(ElementKind::Dielectric).epsilon_r(), 4.3);
    }
}

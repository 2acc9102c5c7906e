//! Data model of the project file.
//!
//! The solver core never touches the disk itself; the front-end loads
//! and saves this document and hands the contained scene to the
//! engine. Missing keys keep their defaults so older files stay
//! loadable.

use std::io::{
    Read,
    Write,
};

use nalgebra::Point2;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    element::{
        Element,
        ElementKind,
    },
    geometry::{
        Area,
        Polygon,
    },
    scene::Scene,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "xleft", default = "default_x_left")]
    pub x_left: f64,
    #[serde(rename = "xright", default = "default_x_right")]
    pub x_right: f64,
    #[serde(rename = "ytop", default = "default_y_top")]
    pub y_top: f64,
    #[serde(rename = "ybottom", default = "default_y_bottom")]
    pub y_bottom: f64,

    #[serde(rename = "viewGrid", default = "default_view_grid")]
    pub view_grid: f64,
    #[serde(rename = "showPotential", default = "default_true")]
    pub show_potential: bool,
    #[serde(rename = "showGrid", default = "default_true")]
    pub show_grid: bool,
    #[serde(rename = "snapToGrid", default = "default_true")]
    pub snap_to_grid: bool,
    #[serde(rename = "viewMode", default = "default_view_mode")]
    pub view_mode: String,

    #[serde(rename = "simulationGrid", default = "default_simulation_grid")]
    pub simulation_grid: f64,
    #[serde(rename = "gaussDistance", default = "default_gauss_distance")]
    pub gauss_distance: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(rename = "borderIsGND", default = "default_true")]
    pub border_is_gnd: bool,

    #[serde(default)]
    pub list: ElementList,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            x_left: default_x_left(),
            x_right: default_x_right(),
            y_top: default_y_top(),
            y_bottom: default_y_bottom(),
            view_grid: default_view_grid(),
            show_potential: true,
            show_grid: true,
            snap_to_grid: true,
            view_mode: default_view_mode(),
            simulation_grid: default_simulation_grid(),
            gauss_distance: default_gauss_distance(),
            tolerance: default_tolerance(),
            threads: default_threads(),
            border_is_gnd: true,
            list: ElementList::default(),
        }
    }
}

impl Project {
    /// Default project carrying the given cross-section.
    pub fn with_scene(area: &Area, scene: &Scene) -> Self {
        Self {
            x_left: area.top_left.x,
            x_right: area.bottom_right.x,
            y_top: area.top_left.y,
            y_bottom: area.bottom_right.y,
            list: ElementList {
                elements: scene.elements().iter().map(Into::into).collect(),
            },
            ..Self::default()
        }
    }

    pub fn area(&self) -> Area {
        Area::new(
            Point2::new(self.x_left, self.y_top),
            Point2::new(self.x_right, self.y_bottom),
        )
    }

    pub fn scene(&self) -> Scene {
        self.list.elements.iter().map(Into::into).collect()
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn to_writer(&self, writer: impl Write) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(writer, self)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElementList {
    #[serde(default)]
    pub elements: Vec<ProjectElement>,
}

/// On-disk form of an [`Element`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectElement {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", with = "kind_label", default = "default_kind")]
    pub kind: ElementKind,
    #[serde(rename = "e_r", default = "default_epsilon_r")]
    pub epsilon_r: f64,
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl From<&Element> for ProjectElement {
    fn from(element: &Element) -> Self {
        Self {
            name: element.name().to_owned(),
            kind: element.kind(),
            epsilon_r: element.epsilon_r(),
            vertices: element
                .polygon()
                .vertices()
                .iter()
                .map(|point| {
                    Vertex {
                        x: point.x,
                        y: point.y,
                    }
                })
                .collect(),
        }
    }
}

impl From<&ProjectElement> for Element {
    fn from(stored: &ProjectElement) -> Self {
        let polygon = Polygon::new(
            stored
                .vertices
                .iter()
                .map(|vertex| Point2::new(vertex.x, vertex.y))
                .collect(),
        );
        let mut element = Element::with_polygon(stored.kind, polygon);
        element.set_name(stored.name.clone());
        element.set_epsilon_r(stored.epsilon_r);
        element
    }
}

/// Serializes [`ElementKind`] as its project-file tag
/// ("Dielectric", "GND", "Trace+", "Trace-").
mod kind_label {
    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
        de::Error,
    };

    use crate::element::ElementKind;

    pub fn serialize<S: Serializer>(kind: &ElementKind, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(kind.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ElementKind, D::Error> {
        let label = String::deserialize(deserializer)?;
        ElementKind::from_label(&label)
            .ok_or_else(|| D::Error::custom(format!("unknown element type \"{label}\"")))
    }
}

fn default_x_left() -> f64 {
    -3e-3
}

fn default_x_right() -> f64 {
    3e-3
}

fn default_y_top() -> f64 {
    3e-3
}

fn default_y_bottom() -> f64 {
    -1e-3
}

fn default_view_grid() -> f64 {
    1e-4
}

fn default_view_mode() -> String {
    "Potential".to_owned()
}

fn default_simulation_grid() -> f64 {
    1e-5
}

fn default_gauss_distance() -> f64 {
    2e-5
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_threads() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_kind() -> ElementKind {
    ElementKind::Dielectric
}

fn default_epsilon_r() -> f64 {
    4.3
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use crate::{
        element::{
            Element,
            ElementKind,
        },
        geometry::Area,
        project::Project,
        scene::Scene,
    };

    #[test]
    fn it_parses_the_documented_layout() {
        let document = r##"{
            "xleft": -3e-3, "xright": 3e-3, "ytop": 3e-3, "ybottom": -1e-3,
            "viewGrid": 1e-4,
            "showPotential": true, "showGrid": false, "snapToGrid": true,
            "viewMode": "Potential",
            "simulationGrid": 1e-5, "gaussDistance": 2e-5, "tolerance": 1e-6,
            "threads": 2,
            "borderIsGND": true,
            "list": {
                "elements": [
                    {
                        "name": "GND",
                        "type": "GND",
                        "e_r": 4.3,
                        "vertices": [
                            {"x": -3e-3, "y": -1e-3},
                            {"x": 3e-3, "y": -1e-3},
                            {"x": 3e-3, "y": 0.0},
                            {"x": -3e-3, "y": 0.0}
                        ]
                    },
                    {"name": "RF+", "type": "Trace+", "e_r": 4.3, "vertices": []}
                ]
            }
        }"##;

        let project = Project::from_reader(document.as_bytes()).unwrap();
        assert_eq!(project.x_left, -3e-3);
        assert_eq!(project.threads, 2);
        assert!(!project.show_grid);
        assert_eq!(project.area().width(), 6e-3);

        let scene = project.scene();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.elements()[0].kind(), ElementKind::Ground);
        assert_eq!(scene.elements()[1].kind(), ElementKind::TracePos);
        assert_eq!(scene.elements()[0].polygon().len(), 4);
    }

    #[test]
    fn it_keeps_defaults_for_missing_keys() {
        let project = Project::from_reader("{}".as_bytes()).unwrap();
        assert_eq!(project.x_left, -3e-3);
        assert_eq!(project.tolerance, 1e-6);
        assert!(project.border_is_gnd);
        assert!(project.list.elements.is_empty());
    }

    #[test]
    fn it_round_trips_a_scene() {
        let area = Area::new(Point2::new(-1e-3, 2e-3), Point2::new(1e-3, 0.0));
        let mut scene = Scene::new();
        scene.push(Element::rectangle(
            ElementKind::TraceNeg,
            Point2::new(-1e-4, 1e-4),
            Point2::new(1e-4, 2e-4),
        ));

        let mut buffer = Vec::new();
        Project::with_scene(&area, &scene)
            .to_writer(&mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.contains("\"type\": \"Trace-\""), "{text}");

        let restored = Project::from_reader(buffer.as_slice()).unwrap();
        assert_eq!(restored.area(), area);
        let restored_scene = restored.scene();
        assert_eq!(restored_scene.len(), 1);
        assert_eq!(restored_scene.elements()[0].kind(), ElementKind::TraceNeg);
        assert_eq!(
            restored_scene.elements()[0].polygon().vertices(),
            scene.elements()[0].polygon().vertices()
        );
    }
}

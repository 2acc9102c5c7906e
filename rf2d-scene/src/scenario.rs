//! Predefined cross-section templates.
//!
//! Each builder produces a ready-to-solve `(Area, Scene)` pair from a
//! handful of physical parameters; the front-end only has to offer the
//! parameter values.

use nalgebra::Point2;

use crate::{
    element::{
        Element,
        ElementKind,
    },
    geometry::Area,
    scene::Scene,
};

const AREA_LEFT: f64 = -3e-3;
const AREA_RIGHT: f64 = 3e-3;
const AREA_BOTTOM: f64 = -1e-3;
const AREA_TOP: f64 = 3e-3;

const PLANE_THICKNESS: f64 = 1e-3;

pub const NAMES: [&str; 8] = [
    "Microstrip",
    "Coplanar Microstrip",
    "Differential Microstrip",
    "Coplanar Differential Microstrip",
    "Stripline",
    "Coplanar Stripline",
    "Differential Stripline",
    "Coplanar Differential Stripline",
];

/// Builds the named scenario with its default parameters.
pub fn build(name: &str) -> Option<(Area, Scene)> {
    match name {
        "Microstrip" => Some(Microstrip::default().build()),
        "Coplanar Microstrip" => Some(CoplanarMicrostrip::default().build()),
        "Differential Microstrip" => Some(DifferentialMicrostrip::default().build()),
        "Coplanar Differential Microstrip" => {
            Some(CoplanarDifferentialMicrostrip::default().build())
        }
        "Stripline" => Some(Stripline::default().build()),
        "Coplanar Stripline" => Some(CoplanarStripline::default().build()),
        "Differential Stripline" => Some(DifferentialStripline::default().build()),
        "Coplanar Differential Stripline" => {
            Some(CoplanarDifferentialStripline::default().build())
        }
        _ => None,
    }
}

fn area(top: f64) -> Area {
    Area::new(
        Point2::new(AREA_LEFT, top),
        Point2::new(AREA_RIGHT, AREA_BOTTOM),
    )
}

fn rect(kind: ElementKind, x0: f64, y0: f64, x1: f64, y1: f64) -> Element {
    Element::rectangle(kind, Point2::new(x0, y0), Point2::new(x1, y1))
}

fn ground_plane(y0: f64, y1: f64) -> Element {
    rect(ElementKind::Ground, AREA_LEFT, y0, AREA_RIGHT, y1)
}

fn substrate(height: f64, epsilon_r: f64) -> Element {
    let mut element = rect(ElementKind::Dielectric, AREA_LEFT, 0.0, AREA_RIGHT, height);
    element.set_epsilon_r(epsilon_r);
    element
}

fn trace(kind: ElementKind, center: f64, width: f64, bottom: f64, thickness: f64) -> Element {
    rect(
        kind,
        center - width / 2.0,
        bottom,
        center + width / 2.0,
        bottom + thickness,
    )
}

/// Coplanar ground pour left and right of the traces, separated by
/// `gap` from the outermost trace edges.
fn coplanar_grounds(scene: &mut Scene, extent: f64, gap: f64, bottom: f64, thickness: f64) {
    scene.push(rect(
        ElementKind::Ground,
        AREA_LEFT,
        bottom,
        -extent - gap,
        bottom + thickness,
    ));
    scene.push(rect(
        ElementKind::Ground,
        extent + gap,
        bottom,
        AREA_RIGHT,
        bottom + thickness,
    ));
}

#[derive(Clone, Copy, Debug)]
pub struct Microstrip {
    pub trace_width: f64,
    pub trace_thickness: f64,
    pub substrate_height: f64,
    pub substrate_epsilon_r: f64,
}

impl Default for Microstrip {
    fn default() -> Self {
        Self {
            trace_width: 0.3e-3,
            trace_thickness: 35e-6,
            substrate_height: 0.2e-3,
            substrate_epsilon_r: 4.3,
        }
    }
}

impl Microstrip {
    pub fn build(&self) -> (Area, Scene) {
        let mut scene = Scene::new();
        scene.push(trace(
            ElementKind::TracePos,
            0.0,
            self.trace_width,
            self.substrate_height,
            self.trace_thickness,
        ));
        scene.push(ground_plane(-PLANE_THICKNESS, 0.0));
        scene.push(substrate(self.substrate_height, self.substrate_epsilon_r));
        (area(AREA_TOP), scene)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CoplanarMicrostrip {
    pub trace_width: f64,
    pub trace_thickness: f64,
    pub gap: f64,
    pub substrate_height: f64,
    pub substrate_epsilon_r: f64,
}

impl Default for CoplanarMicrostrip {
    fn default() -> Self {
        Self {
            trace_width: 0.3e-3,
            trace_thickness: 35e-6,
            gap: 0.2e-3,
            substrate_height: 0.2e-3,
            substrate_epsilon_r: 4.3,
        }
    }
}

impl CoplanarMicrostrip {
    pub fn build(&self) -> (Area, Scene) {
        let (area, mut scene) = Microstrip {
            trace_width: self.trace_width,
            trace_thickness: self.trace_thickness,
            substrate_height: self.substrate_height,
            substrate_epsilon_r: self.substrate_epsilon_r,
        }
        .build();
        coplanar_grounds(
            &mut scene,
            self.trace_width / 2.0,
            self.gap,
            self.substrate_height,
            self.trace_thickness,
        );
        (area, scene)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DifferentialMicrostrip {
    pub trace_width: f64,
    pub trace_thickness: f64,
    pub spacing: f64,
    pub substrate_height: f64,
    pub substrate_epsilon_r: f64,
}

impl Default for DifferentialMicrostrip {
    fn default() -> Self {
        Self {
            trace_width: 0.3e-3,
            trace_thickness: 35e-6,
            spacing: 0.2e-3,
            substrate_height: 0.2e-3,
            substrate_epsilon_r: 4.3,
        }
    }
}

impl DifferentialMicrostrip {
    pub fn build(&self) -> (Area, Scene) {
        let center = (self.spacing + self.trace_width) / 2.0;
        let mut scene = Scene::new();
        scene.push(trace(
            ElementKind::TracePos,
            -center,
            self.trace_width,
            self.substrate_height,
            self.trace_thickness,
        ));
        scene.push(trace(
            ElementKind::TraceNeg,
            center,
            self.trace_width,
            self.substrate_height,
            self.trace_thickness,
        ));
        scene.push(ground_plane(-PLANE_THICKNESS, 0.0));
        scene.push(substrate(self.substrate_height, self.substrate_epsilon_r));
        (area(AREA_TOP), scene)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CoplanarDifferentialMicrostrip {
    pub trace_width: f64,
    pub trace_thickness: f64,
    pub spacing: f64,
    pub gap: f64,
    pub substrate_height: f64,
    pub substrate_epsilon_r: f64,
}

impl Default for CoplanarDifferentialMicrostrip {
    fn default() -> Self {
        Self {
            trace_width: 0.3e-3,
            trace_thickness: 35e-6,
            spacing: 0.2e-3,
            gap: 0.2e-3,
            substrate_height: 0.2e-3,
            substrate_epsilon_r: 4.3,
        }
    }
}

impl CoplanarDifferentialMicrostrip {
    pub fn build(&self) -> (Area, Scene) {
        let (area, mut scene) = DifferentialMicrostrip {
            trace_width: self.trace_width,
            trace_thickness: self.trace_thickness,
            spacing: self.spacing,
            substrate_height: self.substrate_height,
            substrate_epsilon_r: self.substrate_epsilon_r,
        }
        .build();
        coplanar_grounds(
            &mut scene,
            self.spacing / 2.0 + self.trace_width,
            self.gap,
            self.substrate_height,
            self.trace_thickness,
        );
        (area, scene)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Stripline {
    pub trace_width: f64,
    pub trace_thickness: f64,
    pub substrate_height: f64,
    pub substrate_epsilon_r: f64,
}

impl Default for Stripline {
    fn default() -> Self {
        Self {
            trace_width: 0.2e-3,
            trace_thickness: 35e-6,
            substrate_height: 0.5e-3,
            substrate_epsilon_r: 4.3,
        }
    }
}

impl Stripline {
    pub fn build(&self) -> (Area, Scene) {
        let mut scene = Scene::new();
        scene.push(trace(
            ElementKind::TracePos,
            0.0,
            self.trace_width,
            (self.substrate_height - self.trace_thickness) / 2.0,
            self.trace_thickness,
        ));
        scene.push(ground_plane(-PLANE_THICKNESS, 0.0));
        scene.push(ground_plane(
            self.substrate_height,
            self.substrate_height + PLANE_THICKNESS,
        ));
        scene.push(substrate(self.substrate_height, self.substrate_epsilon_r));
        (area(self.substrate_height + PLANE_THICKNESS), scene)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CoplanarStripline {
    pub trace_width: f64,
    pub trace_thickness: f64,
    pub gap: f64,
    pub substrate_height: f64,
    pub substrate_epsilon_r: f64,
}

impl Default for CoplanarStripline {
    fn default() -> Self {
        Self {
            trace_width: 0.2e-3,
            trace_thickness: 35e-6,
            gap: 0.2e-3,
            substrate_height: 0.5e-3,
            substrate_epsilon_r: 4.3,
        }
    }
}

impl CoplanarStripline {
    pub fn build(&self) -> (Area, Scene) {
        let (area, mut scene) = Stripline {
            trace_width: self.trace_width,
            trace_thickness: self.trace_thickness,
            substrate_height: self.substrate_height,
            substrate_epsilon_r: self.substrate_epsilon_r,
        }
        .build();
        coplanar_grounds(
            &mut scene,
            self.trace_width / 2.0,
            self.gap,
            (self.substrate_height - self.trace_thickness) / 2.0,
            self.trace_thickness,
        );
        (area, scene)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DifferentialStripline {
    pub trace_width: f64,
    pub trace_thickness: f64,
    pub spacing: f64,
    pub substrate_height: f64,
    pub substrate_epsilon_r: f64,
}

impl Default for DifferentialStripline {
    fn default() -> Self {
        Self {
            trace_width: 0.2e-3,
            trace_thickness: 35e-6,
            spacing: 0.2e-3,
            substrate_height: 0.5e-3,
            substrate_epsilon_r: 4.3,
        }
    }
}

impl DifferentialStripline {
    pub fn build(&self) -> (Area, Scene) {
        let center = (self.spacing + self.trace_width) / 2.0;
        let bottom = (self.substrate_height - self.trace_thickness) / 2.0;
        let mut scene = Scene::new();
        scene.push(trace(
            ElementKind::TracePos,
            -center,
            self.trace_width,
            bottom,
            self.trace_thickness,
        ));
        scene.push(trace(
            ElementKind::TraceNeg,
            center,
            self.trace_width,
            bottom,
            self.trace_thickness,
        ));
        scene.push(ground_plane(-PLANE_THICKNESS, 0.0));
        scene.push(ground_plane(
            self.substrate_height,
            self.substrate_height + PLANE_THICKNESS,
        ));
        scene.push(substrate(self.substrate_height, self.substrate_epsilon_r));
        (area(self.substrate_height + PLANE_THICKNESS), scene)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CoplanarDifferentialStripline {
    pub trace_width: f64,
    pub trace_thickness: f64,
    pub spacing: f64,
    pub gap: f64,
    pub substrate_height: f64,
    pub substrate_epsilon_r: f64,
}

impl Default for CoplanarDifferentialStripline {
    fn default() -> Self {
        Self {
            trace_width: 0.2e-3,
            trace_thickness: 35e-6,
            spacing: 0.2e-3,
            gap: 0.2e-3,
            substrate_height: 0.5e-3,
            substrate_epsilon_r: 4.3,
        }
    }
}

impl CoplanarDifferentialStripline {
    pub fn build(&self) -> (Area, Scene) {
        let (area, mut scene) = DifferentialStripline {
            trace_width: self.trace_width,
            trace_thickness: self.trace_thickness,
            spacing: self.spacing,
            substrate_height: self.substrate_height,
            substrate_epsilon_r: self.substrate_epsilon_r,
        }
        .build();
        coplanar_grounds(
            &mut scene,
            self.spacing / 2.0 + self.trace_width,
            self.gap,
            (self.substrate_height - self.trace_thickness) / 2.0,
            self.trace_thickness,
        );
        (area, scene)
    }
}

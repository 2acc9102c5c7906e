use nalgebra::Point2;

use crate::element::{
    Element,
    ElementKind,
};

/// Ordered collection of elements describing one cross-section.
///
/// Order matters for overlapping dielectrics: the first element whose
/// polygon contains a point wins the permittivity query there.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    elements: Vec<Element>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn remove(&mut self, index: usize) -> Option<Element> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn traces(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .filter(|element| element.kind().is_trace())
    }

    pub fn has_negative_trace(&self) -> bool {
        self.elements
            .iter()
            .any(|element| element.kind() == ElementKind::TraceNeg)
    }

    /// Relative permittivity at `point`.
    ///
    /// The first element containing the point decides: dielectrics
    /// report their εr, conductors report 1 (they act as boundaries,
    /// not bulk media). Outside every polygon the answer is air.
    pub fn permittivity_at(&self, point: &Point2<f64>) -> f64 {
        for element in &self.elements {
            if element.polygon().contains(point) {
                return match element.kind() {
                    ElementKind::Dielectric => element.epsilon_r(),
                    _ => 1.0,
                };
            }
        }
        1.0
    }

    /// Checks the scene before a calculation is started.
    ///
    /// Fatal conditions abort with an error; survivable ones are
    /// returned as warnings so the front-end can show them and go on.
    pub fn validate(&self) -> Result<Vec<ValidationWarning>, ValidationError> {
        for element in &self.elements {
            if element.polygon().self_intersects() {
                return Err(ValidationError::SelfIntersecting {
                    name: element.name().to_owned(),
                });
            }
        }

        for ground in &self.elements {
            if ground.kind() != ElementKind::Ground {
                continue;
            }
            for trace in self.traces() {
                if ground.polygon().touches(trace.polygon()) {
                    return Err(ValidationError::TraceGroundShort {
                        trace: trace.name().to_owned(),
                        ground: ground.name().to_owned(),
                    });
                }
            }
        }

        for (i, first) in self.elements.iter().enumerate() {
            if !first.kind().is_trace() {
                continue;
            }
            for second in self.elements.iter().skip(i + 1) {
                if !second.kind().is_trace() {
                    continue;
                }
                if first.polygon().touches(second.polygon()) {
                    return Err(ValidationError::TraceTraceOverlap {
                        first: first.name().to_owned(),
                        second: second.name().to_owned(),
                    });
                }
            }
        }

        let mut warnings = Vec::new();
        for (i, first) in self.elements.iter().enumerate() {
            if first.kind() != ElementKind::Dielectric {
                continue;
            }
            for second in self.elements.iter().skip(i + 1) {
                if second.kind() != ElementKind::Dielectric {
                    continue;
                }
                // touching substrate layers are fine; only shared
                // interior area makes the first-wins policy visible
                if first.polygon().interior_overlaps(second.polygon()) {
                    tracing::debug!(
                        first = first.name(),
                        second = second.name(),
                        "dielectric overlap"
                    );
                    warnings.push(ValidationWarning::DielectricOverlap {
                        first: first.name().to_owned(),
                        second: second.name().to_owned(),
                    });
                }
            }
        }

        Ok(warnings)
    }
}

impl FromIterator<Element> for Scene {
    fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("element \"{name}\" intersects itself, this is not supported")]
    SelfIntersecting { name: String },

    #[error("short circuit between trace \"{trace}\" and ground \"{ground}\"")]
    TraceGroundShort { trace: String, ground: String },

    #[error("traces \"{first}\" and \"{second}\" touch or overlap, this is not supported")]
    TraceTraceOverlap { first: String, second: String },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationWarning {
    #[error(
        "dielectrics \"{first}\" and \"{second}\" overlap, \"{first}\" wins in the shared area"
    )]
    DielectricOverlap { first: String, second: String },
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use crate::{
        element::{
            Element,
            ElementKind,
        },
        geometry::Polygon,
        scene::{
            Scene,
            ValidationError,
            ValidationWarning,
        },
    };

    fn rect(kind: ElementKind, x0: f64, y0: f64, x1: f64, y1: f64) -> Element {
        Element::rectangle(kind, Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn it_answers_the_first_containing_dielectric() {
        let mut first = rect(ElementKind::Dielectric, 0.0, 0.0, 2.0, 1.0);
        first.set_epsilon_r(4.3);
        let mut second = rect(ElementKind::Dielectric, 1.0, 0.0, 3.0, 1.0);
        second.set_epsilon_r(2.2);
        let scene = Scene::from_iter([first, second]);

        assert_eq!(scene.permittivity_at(&Point2::new(0.5, 0.5)), 4.3);
        // the overlap belongs to the earlier element
        assert_eq!(scene.permittivity_at(&Point2::new(1.5, 0.5)), 4.3);
        assert_eq!(scene.permittivity_at(&Point2::new(2.5, 0.5)), 2.2);
        assert_eq!(scene.permittivity_at(&Point2::new(5.0, 5.0)), 1.0);
    }

    #[test]
    fn it_treats_conductors_as_air() {
        let mut scene = Scene::new();
        scene.push(rect(ElementKind::TracePos, 0.0, 0.0, 1.0, 1.0));
        assert_eq!(scene.permittivity_at(&Point2::new(0.5, 0.5)), 1.0);
    }

    #[test]
    fn it_rejects_self_intersecting_elements() {
        let bowtie = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]);
        let mut scene = Scene::new();
        scene.push(Element::with_polygon(ElementKind::Ground, bowtie));

        assert!(matches!(
            scene.validate(),
            Err(ValidationError::SelfIntersecting { .. })
        ));
    }

    #[test]
    fn it_rejects_conductor_shorts() {
        let mut scene = Scene::new();
        scene.push(rect(ElementKind::Ground, 0.0, 0.0, 2.0, 1.0));
        scene.push(rect(ElementKind::TracePos, 1.0, 0.5, 3.0, 1.5));
        assert!(matches!(
            scene.validate(),
            Err(ValidationError::TraceGroundShort { .. })
        ));

        let mut scene = Scene::new();
        scene.push(rect(ElementKind::TracePos, 0.0, 0.0, 1.0, 1.0));
        scene.push(rect(ElementKind::TraceNeg, 1.0, 0.0, 2.0, 1.0));
        // merely touching traces short as well
        assert!(matches!(
            scene.validate(),
            Err(ValidationError::TraceTraceOverlap { .. })
        ));
    }

    #[test]
    fn it_warns_about_overlapping_dielectrics() {
        let mut scene = Scene::new();
        scene.push(rect(ElementKind::Dielectric, 0.0, 0.0, 2.0, 1.0));
        scene.push(rect(ElementKind::Dielectric, 1.0, 0.25, 3.0, 0.75));
        let warnings = scene.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ValidationWarning::DielectricOverlap { .. }
        ));

        // stacked layers that only share an edge stay silent
        let mut scene = Scene::new();
        scene.push(rect(ElementKind::Dielectric, 0.0, 0.0, 2.0, 1.0));
        scene.push(rect(ElementKind::Dielectric, 0.0, 1.0, 2.0, 2.0));
        assert!(scene.validate().unwrap().is_empty());
    }

    #[test]
    fn it_accepts_a_well_formed_scene() {
        let mut scene = Scene::new();
        scene.push(rect(ElementKind::Ground, -3.0, -1.0, 3.0, 0.0));
        scene.push(rect(ElementKind::Dielectric, -3.0, 0.0, 3.0, 0.2));
        scene.push(rect(ElementKind::TracePos, -0.25, 0.2, 0.25, 0.235));
        assert_eq!(scene.validate().unwrap(), Vec::new());
    }
}

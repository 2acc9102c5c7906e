//! Charge extraction by a discrete Gauss law.
//!
//! A closed contour is laid slightly outside a conductor and the
//! normal component of the solved gradient is accumulated along it.
//! Run once with unit weights and once with the dielectric in place,
//! the two integrals give the per-unit-length inductance and
//! capacitance, and from those the impedance.

use nalgebra::{
    Point2,
    Vector2,
};
use rf2d_scene::{
    ElementKind,
    Polygon,
    Scene,
};

use crate::physics::PhysicalConstants;

/// Source of field gradients, implemented by the engine.
pub trait GradientField {
    /// Gradient at a world position in volts per cell; zero when the
    /// position cannot be sampled.
    fn gradient(&self, point: &Point2<f64>) -> Vector2<f64>;
}

/// Integrates the flux through a contour offset outward from
/// `conductor` by `distance`.
///
/// Each contour edge is sampled at ⌈length/grid⌉ midpoints. With
/// `dielectric` given, every sample is scaled by the local relative
/// permittivity, turning the vacuum flux into the displacement flux.
/// The sign is fixed so that a conductor above the surrounding
/// potential yields a positive result regardless of vertex winding.
///
/// The result is charge per unit length divided by ε₀, so multiplied
/// by ε₀ it is the capacitance per volt of drive.
pub fn charge(
    field: &impl GradientField,
    dielectric: Option<&Scene>,
    conductor: &Polygon,
    grid: f64,
    distance: f64,
) -> f64 {
    let contour = conductor.offset(distance);

    let mut total = 0.0;
    for (previous, current) in contour.edges() {
        let edge = current - previous;
        let length = edge.norm();
        if length == 0.0 {
            continue;
        }
        let unit = edge / length;
        let samples = (length / grid).ceil() as usize;
        let step = length / samples as f64;

        let mut point = previous + unit * (step / 2.0);
        for _ in 0..samples {
            let mut gradient = field.gradient(&point);
            if let Some(scene) = dielectric {
                gradient *= scene.permittivity_at(&point);
            }
            // the component of the gradient crossing the contour
            total += (gradient.x * unit.y - gradient.y * unit.x) * step / grid;
            point += unit * step;
        }
    }

    if !contour.is_clockwise() {
        total = -total;
    }
    total
}

/// Per-unit-length parameters of one polarity.
#[derive(Clone, Copy, Debug)]
pub struct TraceParameters {
    /// F/m, with the dielectric in place.
    pub capacitance: f64,
    /// H/m, from the vacuum capacitance.
    pub inductance: f64,
    /// Ω, √(L/C).
    pub impedance: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct LineParameters {
    pub positive: TraceParameters,
    /// Present when the scene carries a negative trace.
    pub negative: Option<TraceParameters>,
}

impl LineParameters {
    /// Z_diff = Z₊ + Z₋ for differential pairs.
    pub fn differential_impedance(&self) -> Option<f64> {
        self.negative
            .map(|negative| self.positive.impedance + negative.impedance)
    }
}

/// Runs the air and dielectric Gauss passes over every trace of the
/// scene and derives C, L and Z per polarity.
///
/// The solved field is sampled as-is; only the εr weighting of the
/// samples differs between the two passes. Negative-trace charges
/// enter negated so both polarities come out with positive
/// capacitance.
pub fn line_parameters(
    field: &impl GradientField,
    scene: &Scene,
    constants: &PhysicalConstants,
    grid: f64,
    distance: f64,
) -> LineParameters {
    let epsilon_0 = constants.vacuum_permittivity;
    let c_squared = constants.speed_of_light().powi(2);

    let sum_charges = |dielectric: Option<&Scene>| -> (f64, f64) {
        let mut positive = 0.0;
        let mut negative = 0.0;
        for element in scene.traces() {
            let q = charge(field, dielectric, element.polygon(), grid, distance);
            match element.kind() {
                ElementKind::TracePos => positive += q,
                ElementKind::TraceNeg => negative -= q,
                _ => {}
            }
        }
        (positive, negative)
    };

    let (air_positive, air_negative) = sum_charges(None);
    let (diel_positive, diel_negative) = sum_charges(Some(scene));

    let derive = |air: f64, diel: f64| -> TraceParameters {
        let capacitance_air = air * epsilon_0;
        let inductance = 1.0 / (c_squared * capacitance_air);
        let capacitance = diel * epsilon_0;
        TraceParameters {
            capacitance,
            inductance,
            impedance: (inductance / capacitance).sqrt(),
        }
    };

    LineParameters {
        positive: derive(air_positive, diel_positive),
        negative: scene
            .has_negative_trace()
            .then(|| derive(air_negative, diel_negative)),
    }
}

//! Electrostatic field solver for 2-D printed-circuit cross-sections.
//!
//! Laplace's equation is relaxed on a weighted finite-difference
//! lattice built from a scene of polygonal conductors and dielectrics;
//! a Gauss-law contour integral then turns the solved field into
//! per-unit-length line parameters.

pub mod engine;
pub mod gauss;
pub mod lattice;
pub mod physics;
pub mod relax;
pub mod stencil;

pub use crate::{
    engine::{
        Engine,
        Event,
        Status,
    },
    gauss::{
        GradientField,
        LineParameters,
        TraceParameters,
        charge,
        line_parameters,
    },
    lattice::{
        Boundary,
        Condition,
        Lattice,
        LatticeQuery,
    },
    physics::PhysicalConstants,
    relax::{
        Outcome,
        RelaxOptions,
        relax,
    },
    stencil::Stencil,
};

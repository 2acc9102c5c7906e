//! Cross-section description shared between the front-end and the
//! field solver: polygons, tagged elements, permittivity queries, the
//! project-file data model and the predefined scenario templates.

pub mod element;
pub mod geometry;
pub mod project;
pub mod scenario;
pub mod scene;

pub use crate::{
    element::{
        Element,
        ElementKind,
    },
    geometry::{
        Area,
        Polygon,
    },
    project::Project,
    scene::{
        Scene,
        ValidationError,
        ValidationWarning,
    },
};

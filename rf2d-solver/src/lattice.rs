//! The finite-difference grid.
//!
//! A lattice covers the solved area with (W + 3) × (H + 3) cells: the
//! interior samples span the area edge to edge, and a one-cell ring of
//! Neumann cells around them lets the update loops read neighbours
//! without bounds checks. Potentials live in atomics so worker threads
//! can relax disjoint stripes while reading across stripe borders; all
//! accesses are relaxed, the solver's round barrier orders them.

use std::sync::atomic::{
    AtomicBool,
    AtomicU64,
    Ordering,
};

use nalgebra::{
    Point2,
    Vector2,
};
use rf2d_scene::Area;

use crate::stencil::Stencil;

/// Constraint of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Condition {
    /// Not decided yet; treated as a free cell once construction ends.
    #[default]
    Unset,
    /// Free cell, updated every sweep.
    None,
    /// Mirror cell; never iterated, neighbours reflect across it.
    Neumann,
    /// Fixed potential; never iterated.
    Dirichlet,
}

/// Boundary decision for one cell position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    pub condition: Condition,
    pub value: f64,
}

impl Boundary {
    pub const NONE: Self = Self {
        condition: Condition::None,
        value: 0.0,
    };

    pub fn dirichlet(value: f64) -> Self {
        Self {
            condition: Condition::Dirichlet,
            value,
        }
    }
}

/// Capability handed to the lattice constructor.
///
/// Implementations decide the boundary condition and dielectric weight
/// for a world position; the engine wraps the scene in one of these.
pub trait LatticeQuery {
    fn boundary_at(&self, position: &Point2<f64>) -> Boundary;

    /// Weight of the cell, √εr at its position (or 1 when dielectrics
    /// are ignored).
    fn weight_at(&self, position: &Point2<f64>) -> f64;
}

#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    #[error("the area and grid pitch leave no interior cells")]
    Degenerate,
}

// adjacent neighbour index offsets relative to the row stride, in
// (south, north, west, east) order, and the diagonals in (south-east,
// north-east, north-west, south-west) order
fn adjacent_offsets(stride: usize) -> [isize; 4] {
    let stride = stride as isize;
    [-stride, stride, -1, 1]
}

fn diagonal_offsets(stride: usize) -> [isize; 4] {
    let stride = stride as isize;
    [-stride + 1, stride + 1, stride - 1, -stride - 1]
}

pub struct Lattice {
    dim: Vector2<usize>,
    origin: Point2<f64>,
    step: Vector2<f64>,
    potentials: Box<[AtomicU64]>,
    weights: Box<[f64]>,
    conditions: Box<[Condition]>,
    stencils: Box<[Stencil]>,
    abort: AtomicBool,
}

impl std::fmt::Debug for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lattice")
            .field("dim", &self.dim)
            .field("origin", &self.origin)
            .field("step", &self.step)
            .field("abort", &self.abort)
            .finish_non_exhaustive()
    }
}

impl Lattice {
    /// Builds the grid for `area` at the given pitch, asking `query`
    /// for the boundary condition and weight of every cell.
    pub fn new(area: &Area, pitch: f64, query: &impl LatticeQuery) -> Result<Self, LatticeError> {
        if !(pitch > 0.0) {
            return Err(LatticeError::Degenerate);
        }
        let interior_x = (area.width() / pitch).floor() as usize;
        let interior_y = (area.height() / pitch).floor() as usize;
        if interior_x == 0 || interior_y == 0 {
            return Err(LatticeError::Degenerate);
        }

        let dim = Vector2::new(interior_x + 3, interior_y + 3);
        let origin = area.bottom_left();
        // the interior samples cover the area edge to edge
        let step = Vector2::new(
            area.width() / interior_x as f64,
            area.height() / interior_y as f64,
        );

        let cells = dim.x * dim.y;
        let mut potentials = Vec::with_capacity(cells);
        let mut weights = Vec::with_capacity(cells);
        let mut conditions = Vec::with_capacity(cells);

        for y in 0..dim.y {
            for x in 0..dim.x {
                // cell (x, y) samples logical position (x - 1, y - 1)
                let i = x as isize - 1;
                let j = y as isize - 1;
                let position = Point2::new(
                    origin.x + i as f64 * step.x,
                    origin.y + j as f64 * step.y,
                );

                weights.push(query.weight_at(&position));

                let on_ring = x == 0 || y == 0 || x == dim.x - 1 || y == dim.y - 1;
                let boundary = if on_ring {
                    Boundary {
                        condition: Condition::Neumann,
                        value: 0.0,
                    }
                }
                else {
                    query.boundary_at(&position)
                };
                conditions.push(boundary.condition);
                potentials.push(AtomicU64::new(boundary.value.to_bits()));
            }
        }

        let mut lattice = Self {
            dim,
            origin,
            step,
            potentials: potentials.into_boxed_slice(),
            weights: weights.into_boxed_slice(),
            conditions: conditions.into_boxed_slice(),
            stencils: vec![Stencil::Middle; cells].into_boxed_slice(),
            abort: AtomicBool::new(false),
        };
        lattice.select_stencils();
        Ok(lattice)
    }

    fn select_stencils(&mut self) {
        let dim = self.dim;
        let adjacent = adjacent_offsets(dim.x);
        let diagonal = diagonal_offsets(dim.x);
        let conditions = &self.conditions;
        let stencils = &mut self.stencils;

        for y in 1..dim.y - 1 {
            for x in 1..dim.x - 1 {
                let index = y * dim.x + x;
                if !matches!(conditions[index], Condition::Unset | Condition::None) {
                    continue;
                }
                let neumann = |offset: isize| {
                    conditions[(index as isize + offset) as usize] == Condition::Neumann
                };
                stencils[index] = Stencil::select(adjacent.map(neumann), diagonal.map(neumann));
            }
        }
    }

    pub fn dim(&self) -> Vector2<usize> {
        self.dim
    }

    /// Grid spacing in world units; close to the construction pitch,
    /// exact when the area is divisible by it.
    pub fn step(&self) -> Vector2<f64> {
        self.step
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.dim.x + x
    }

    #[inline]
    pub fn value(&self, index: usize) -> f64 {
        f64::from_bits(self.potentials[index].load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set_value(&self, index: usize, value: f64) {
        self.potentials[index].store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn weight(&self, index: usize) -> f64 {
        self.weights[index]
    }

    #[inline]
    pub fn condition(&self, index: usize) -> Condition {
        self.conditions[index]
    }

    #[inline]
    pub fn stencil(&self, index: usize) -> Stencil {
        self.stencils[index]
    }

    #[inline]
    pub fn updatable(&self, index: usize) -> bool {
        matches!(
            self.conditions[index],
            Condition::Unset | Condition::None
        )
    }

    /// Recomputes the cell at `index` from its neighbours and returns
    /// the absolute change. The caller restricts itself to non-ring,
    /// updatable cells.
    #[inline]
    pub fn update(&self, index: usize) -> f64 {
        let stride = self.dim.x;
        let south = index - stride;
        let north = index + stride;
        let west = index - 1;
        let east = index + 1;

        let v = [
            self.value(south),
            self.value(north),
            self.value(west),
            self.value(east),
        ];
        let w = [
            self.weights[south],
            self.weights[north],
            self.weights[west],
            self.weights[east],
        ];

        let new = self.stencils[index].apply(&v, &w);
        let old = self.value(index);
        self.set_value(index, new);
        (new - old).abs()
    }

    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    pub fn abort_requested(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    /// Potential at a world position, from the nearest cell.
    ///
    /// NaN outside the grid.
    pub fn potential(&self, point: &Point2<f64>) -> f64 {
        let x = ((point.x - self.origin.x) / self.step.x).round() as isize + 1;
        let y = ((point.y - self.origin.y) / self.step.y).round() as isize + 1;
        if x < 0 || x >= self.dim.x as isize || y < 0 || y >= self.dim.y as isize {
            return f64::NAN;
        }
        self.value(self.index(x as usize, y as usize))
    }

    /// Field gradient at a world position by forward differences, in
    /// volts per cell.
    ///
    /// Zero outside the grid; divide by the grid pitch for volts per
    /// metre.
    pub fn gradient(&self, point: &Point2<f64>) -> Vector2<f64> {
        let x = ((point.x - self.origin.x) / self.step.x).floor() as isize + 1;
        let y = ((point.y - self.origin.y) / self.step.y).floor() as isize + 1;
        if x < 0 || x + 1 >= self.dim.x as isize || y < 0 || y + 1 >= self.dim.y as isize {
            return Vector2::zeros();
        }
        let (x, y) = (x as usize, y as usize);
        let base = self.value(self.index(x, y));
        Vector2::new(
            self.value(self.index(x + 1, y)) - base,
            self.value(self.index(x, y + 1)) - base,
        )
    }
}

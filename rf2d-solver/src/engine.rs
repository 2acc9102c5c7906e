//! Engine façade driving the solver.
//!
//! The front-end configures the engine, hands it a scene and drains
//! the typed event channel while a coordinator thread builds the
//! lattice and runs the relaxation. Potential and gradient queries
//! only answer once the run reached `Done`.

use std::{
    sync::{
        Arc,
        mpsc,
    },
    thread,
};

use nalgebra::{
    Point2,
    Vector2,
};
use parking_lot::RwLock;
use rf2d_scene::{
    Area,
    ElementKind,
    Scene,
};

use crate::{
    gauss::GradientField,
    lattice::{
        Boundary,
        Lattice,
        LatticeQuery,
    },
    relax::{
        Outcome,
        RelaxOptions,
        relax,
    },
};

/// Progress and status messages, delivered in emission order.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum Event {
    #[display("{_0}")]
    Info(String),
    #[display("warning: {_0}")]
    Warning(String),
    #[display("error: {_0}")]
    Error(String),
    #[display("{_0}%")]
    Percentage(u8),
    #[display("done")]
    Done,
    #[display("aborted")]
    Aborted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, derive_more::Display)]
pub enum Status {
    #[default]
    Idle,
    Running,
    Done,
    Aborted,
}

#[derive(Debug)]
struct Shared {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    status: Status,
    lattice: Option<Arc<Lattice>>,
}

#[derive(Debug)]
pub struct Engine {
    area: Area,
    grid: f64,
    threads: usize,
    threshold: f64,
    grounded_borders: bool,
    ignore_dielectric: bool,
    shared: Arc<Shared>,
    events: mpsc::Sender<Event>,
}

impl Engine {
    /// Creates an idle engine and the receiving end of its event
    /// channel.
    pub fn new() -> (Self, mpsc::Receiver<Event>) {
        let (events, receiver) = mpsc::channel();
        let engine = Self {
            area: Area::default(),
            grid: 1e-5,
            threads: 1,
            threshold: 1e-6,
            grounded_borders: true,
            ignore_dielectric: false,
            shared: Arc::new(Shared {
                state: RwLock::new(State::default()),
            }),
            events,
        };
        (engine, receiver)
    }

    pub fn set_area(&mut self, top_left: Point2<f64>, bottom_right: Point2<f64>) {
        if self.running() {
            return;
        }
        self.area = Area::new(top_left, bottom_right);
    }

    pub fn set_grid(&mut self, grid: f64) {
        if self.running() {
            return;
        }
        if grid > 0.0 {
            self.grid = grid;
        }
    }

    pub fn set_threads(&mut self, threads: usize) {
        if self.running() {
            return;
        }
        if threads > 0 {
            self.threads = threads;
        }
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        if self.running() {
            return;
        }
        if threshold > 0.0 {
            self.threshold = threshold;
        }
    }

    pub fn set_grounded_borders(&mut self, grounded: bool) {
        if self.running() {
            return;
        }
        self.grounded_borders = grounded;
    }

    pub fn set_ignore_dielectric(&mut self, ignore: bool) {
        if self.running() {
            return;
        }
        self.ignore_dielectric = ignore;
    }

    pub fn status(&self) -> Status {
        self.shared.state.read().status
    }

    fn running(&self) -> bool {
        self.status() == Status::Running
    }

    /// Starts a calculation on a snapshot of `scene`.
    ///
    /// Returns false when a calculation is already running or the
    /// coordinator thread could not be spawned. The call itself does
    /// not block; completion arrives on the event channel.
    pub fn start(&mut self, scene: &Scene) -> bool {
        {
            let mut state = self.shared.state.write();
            if state.status == Status::Running {
                return false;
            }
            state.status = Status::Running;
            // the previous run's field dies with its lattice
            state.lattice = None;
        }

        self.emit(Event::Info("field calculation starting".to_owned()));

        let job = Job {
            area: self.area,
            grid: self.grid,
            threads: self.threads,
            threshold: self.threshold,
            grounded_borders: self.grounded_borders,
            ignore_dielectric: self.ignore_dielectric,
            scene: scene.clone(),
            shared: self.shared.clone(),
            events: self.events.clone(),
        };

        let spawned = thread::Builder::new()
            .name("rf2d-coordinator".to_owned())
            .spawn(move || job.run());
        if let Err(error) = spawned {
            tracing::error!(?error, "coordinator spawn failed");
            self.emit(Event::Error("failed to start solver thread".to_owned()));
            self.shared.state.write().status = Status::Idle;
            return false;
        }

        self.emit(Event::Info("solver thread started".to_owned()));
        true
    }

    /// Requests a cooperative abort; workers exit at their next sweep
    /// boundary.
    pub fn abort(&self) {
        let state = self.shared.state.read();
        if state.status != Status::Running {
            return;
        }
        if let Some(lattice) = &state.lattice {
            lattice.request_abort();
        }
    }

    pub fn is_result_ready(&self) -> bool {
        self.status() == Status::Done
    }

    /// Drops a finished result, returning the engine to idle. Called
    /// by the front-end whenever the scene is edited.
    pub fn invalidate_result(&mut self) {
        let mut state = self.shared.state.write();
        if state.status != Status::Running {
            state.status = Status::Idle;
        }
    }

    /// Potential at a world position; NaN while no result is ready or
    /// outside the solved region.
    pub fn potential(&self, point: &Point2<f64>) -> f64 {
        let state = self.shared.state.read();
        if state.status != Status::Done {
            return f64::NAN;
        }
        match &state.lattice {
            Some(lattice) => lattice.potential(point),
            None => f64::NAN,
        }
    }

    /// Forward-difference gradient in volts per cell; zero while no
    /// result is ready or outside the solved region.
    pub fn gradient(&self, point: &Point2<f64>) -> Vector2<f64> {
        let state = self.shared.state.read();
        if state.status != Status::Done {
            return Vector2::zeros();
        }
        match &state.lattice {
            Some(lattice) => lattice.gradient(point),
            None => Vector2::zeros(),
        }
    }

    fn emit(&self, event: Event) {
        // a dropped receiver must not kill the engine
        let _ = self.events.send(event);
    }
}

impl GradientField for Engine {
    fn gradient(&self, point: &Point2<f64>) -> Vector2<f64> {
        Engine::gradient(self, point)
    }
}

/// Scene wrapper implementing the lattice's boundary and weight
/// queries.
pub struct SceneQuery<'a> {
    pub scene: &'a Scene,
    pub area: Area,
    pub grounded_borders: bool,
    pub ignore_dielectric: bool,
    pub border_tolerance: f64,
}

impl LatticeQuery for SceneQuery<'_> {
    fn boundary_at(&self, position: &Point2<f64>) -> Boundary {
        if self.grounded_borders && self.area.on_edge(position, self.border_tolerance) {
            return Boundary::dirichlet(0.0);
        }
        for element in self.scene.elements() {
            // dielectrics never constrain the potential, and traces or
            // ground take priority over them at the same point
            if element.kind() == ElementKind::Dielectric {
                continue;
            }
            if element.polygon().contains(position) {
                return match element.kind() {
                    ElementKind::Ground => Boundary::dirichlet(0.0),
                    ElementKind::TracePos => Boundary::dirichlet(1.0),
                    ElementKind::TraceNeg => Boundary::dirichlet(-1.0),
                    ElementKind::Dielectric => Boundary::NONE,
                };
            }
        }
        Boundary::NONE
    }

    fn weight_at(&self, position: &Point2<f64>) -> f64 {
        if self.ignore_dielectric {
            return 1.0;
        }
        self.scene.permittivity_at(position).sqrt()
    }
}

/// State captured for one calculation, run on the coordinator thread.
struct Job {
    area: Area,
    grid: f64,
    threads: usize,
    threshold: f64,
    grounded_borders: bool,
    ignore_dielectric: bool,
    scene: Scene,
    shared: Arc<Shared>,
    events: mpsc::Sender<Event>,
}

impl Job {
    fn run(self) {
        self.emit(Event::Info("creating lattice".to_owned()));
        let query = SceneQuery {
            scene: &self.scene,
            area: self.area,
            grounded_borders: self.grounded_borders,
            ignore_dielectric: self.ignore_dielectric,
            border_tolerance: self.grid * 1e-3,
        };

        let lattice = match Lattice::new(&self.area, self.grid, &query) {
            Ok(lattice) => Arc::new(lattice),
            Err(error) => {
                tracing::warn!(%error, "lattice construction failed");
                self.emit(Event::Error("Lattice creation failed".to_owned()));
                self.shared.state.write().status = Status::Idle;
                return;
            }
        };
        self.emit(Event::Info("lattice creation complete".to_owned()));

        // publish the lattice so abort requests can reach the workers
        self.shared.state.write().lattice = Some(lattice.clone());

        self.emit(Event::Info("starting calculation workers".to_owned()));
        let options = RelaxOptions {
            threads: self.threads,
            sweeps_per_round: 10,
            threshold: self.threshold,
        };
        let mut last_percent = 0;
        let outcome = relax(&lattice, &options, |diff| {
            let percent = progress_percent(self.threshold, diff, last_percent);
            last_percent = percent;
            let _ = self.events.send(Event::Percentage(percent));
        });

        match outcome {
            Outcome::Aborted => {
                self.emit(Event::Warning("field calculation aborted".to_owned()));
                self.shared.state.write().status = Status::Aborted;
                self.emit(Event::Percentage(0));
                self.emit(Event::Aborted);
            }
            Outcome::Converged { sweeps, .. } => {
                self.emit(Event::Info(format!(
                    "field calculation complete, took {sweeps} sweeps"
                )));
                self.shared.state.write().status = Status::Done;
                self.emit(Event::Percentage(100));
                self.emit(Event::Done);
            }
        }
    }

    fn emit(&self, event: Event) {
        let _ = self.events.send(event);
    }
}

/// Maps the decaying global diff onto a non-decreasing percentage.
///
/// The diff falls roughly exponentially from about one towards the
/// threshold, so (−ln diff)⁶ stretches the early phase and the clamp
/// hides late-phase noise.
fn progress_percent(threshold: f64, diff: f64, last: u8) -> u8 {
    let end = (-threshold.ln()).powi(6);
    let current = (-diff.ln()).powi(6);
    let percent = current * 100.0 / end;
    if percent >= 100.0 {
        100
    }
    else if percent < f64::from(last) {
        last
    }
    else {
        percent as u8
    }
}

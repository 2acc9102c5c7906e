//! Headless front-end: loads a project file, runs the field solver and
//! prints the per-unit-length line parameters.

use std::{
    fs::File,
    io::{
        BufReader,
        BufWriter,
        stdout,
    },
    path::{
        Path,
        PathBuf,
    },
};

use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Error,
    bail,
    eyre,
};
use dotenvy::dotenv;
use rf2d_scene::{
    Project,
    scenario,
};
use rf2d_solver::{
    Engine,
    Event,
    PhysicalConstants,
    TraceParameters,
    line_parameters,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    let _ = dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Solve {
            file,
            threads,
            ignore_dielectric,
        } => {
            solve(&file, threads, ignore_dielectric)?;
        }
        Command::Scenario { name, output } => {
            scenario_command(name, output)?;
        }
        Command::DumpDefaultProject => {
            Project::default().to_writer(stdout().lock())?;
            println!();
        }
    }

    Ok(())
}

#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a project file and print C, L and Z per trace
    Solve {
        file: PathBuf,

        /// Override the worker count stored in the project
        #[clap(long)]
        threads: Option<usize>,

        /// Solve with all dielectric weights forced to one
        #[clap(long)]
        ignore_dielectric: bool,
    },

    /// Write a project built from a predefined scenario; lists the
    /// available scenarios when no name is given
    Scenario {
        name: Option<String>,

        #[clap(long, short)]
        output: Option<PathBuf>,
    },

    /// Print a default project document
    DumpDefaultProject,
}

fn solve(path: &Path, threads: Option<usize>, ignore_dielectric: bool) -> Result<(), Error> {
    let project = Project::from_reader(BufReader::new(File::open(path)?))?;
    let scene = project.scene();

    match scene.validate() {
        Ok(warnings) => {
            for warning in warnings {
                tracing::warn!("{warning}");
            }
        }
        Err(error) => bail!("invalid scene: {error}"),
    }

    let area = project.area();
    let (mut engine, events) = Engine::new();
    engine.set_area(area.top_left, area.bottom_right);
    engine.set_grid(project.simulation_grid);
    engine.set_threads(threads.unwrap_or(project.threads));
    engine.set_threshold(project.tolerance);
    engine.set_grounded_borders(project.border_is_gnd);
    engine.set_ignore_dielectric(ignore_dielectric);

    if !engine.start(&scene) {
        bail!("engine is already running");
    }

    for event in events.iter() {
        match event {
            Event::Info(message) => tracing::info!("{message}"),
            Event::Warning(message) => tracing::warn!("{message}"),
            Event::Error(message) => bail!("{message}"),
            Event::Percentage(percent) => tracing::debug!(percent, "solving"),
            Event::Done => break,
            Event::Aborted => bail!("calculation aborted"),
        }
    }

    let parameters = line_parameters(
        &engine,
        &scene,
        &PhysicalConstants::SI,
        project.simulation_grid,
        project.gauss_distance,
    );

    print_trace("+", &parameters.positive);
    if let Some(negative) = &parameters.negative {
        print_trace("-", negative);
    }
    if let Some(differential) = parameters.differential_impedance() {
        println!("Z_diff = {differential:.2} Ω");
    }

    Ok(())
}

fn print_trace(polarity: &str, parameters: &TraceParameters) {
    println!("C{polarity} = {:.4e} F/m", parameters.capacitance);
    println!("L{polarity} = {:.4e} H/m", parameters.inductance);
    println!("Z{polarity} = {:.2} Ω", parameters.impedance);
}

fn scenario_command(name: Option<String>, output: Option<PathBuf>) -> Result<(), Error> {
    let Some(name) = name else {
        for name in scenario::NAMES {
            println!("{name}");
        }
        return Ok(());
    };

    let (area, scene) = scenario::build(&name)
        .ok_or_else(|| eyre!("unknown scenario \"{name}\", try the bare command for a list"))?;
    let project = Project::with_scene(&area, &scene);

    match output {
        Some(path) => {
            project.to_writer(BufWriter::new(File::create(&path)?))?;
            tracing::info!(path = %path.display(), "project written");
        }
        None => {
            project.to_writer(stdout().lock())?;
            println!();
        }
    }

    Ok(())
}

//! End-to-end runs of the predefined cross-sections.

use std::{
    sync::mpsc,
    time::Duration,
};

use nalgebra::Point2;
use rf2d_scene::{
    Scene,
    scenario::{
        DifferentialStripline,
        Microstrip,
    },
};
use rf2d_solver::{
    Engine,
    Event,
    PhysicalConstants,
    line_parameters,
};

fn solve(engine: &mut Engine, events: &mpsc::Receiver<Event>, scene: &Scene) {
    assert!(engine.start(scene), "engine refused to start");
    loop {
        match events.recv_timeout(Duration::from_secs(1200)).unwrap() {
            Event::Done => return,
            Event::Aborted => panic!("calculation aborted"),
            Event::Error(message) => panic!("calculation failed: {message}"),
            _ => {}
        }
    }
}

fn s1_scene() -> Scene {
    // 0.5 mm wide, 35 µm thick trace on 0.2 mm of εr 4.3
    let (_, scene) = Microstrip {
        trace_width: 0.5e-3,
        trace_thickness: 35e-6,
        substrate_height: 0.2e-3,
        substrate_epsilon_r: 4.3,
    }
    .build();
    scene
}

#[test]
fn it_solves_a_coarse_microstrip_near_fifty_ohms() {
    let grid = 2.5e-5;
    let scene = s1_scene();
    assert!(scene.validate().is_ok());

    // tighter walls than the stock scenario area keep the run short;
    // they pull the impedance down a little
    let (mut engine, events) = Engine::new();
    engine.set_area(Point2::new(-1.5e-3, 1.5e-3), Point2::new(1.5e-3, -1e-3));
    engine.set_grid(grid);
    engine.set_threads(2);
    engine.set_threshold(1e-6);
    solve(&mut engine, &events, &scene);

    let parameters = line_parameters(&engine, &scene, &PhysicalConstants::SI, grid, 5e-5);
    let impedance = parameters.positive.impedance;
    assert!(parameters.positive.capacitance > 0.0);
    assert!(parameters.positive.inductance > 0.0);
    assert!(
        (40.0..60.0).contains(&impedance),
        "Z = {impedance} Ω, C = {:e} F/m, L = {:e} H/m",
        parameters.positive.capacitance,
        parameters.positive.inductance
    );
}

/// The same microstrip on the full area and fine grid; takes minutes.
#[test]
#[ignore = "fine grid, run explicitly"]
fn it_solves_the_fine_grid_microstrip_within_two_ohms() {
    let grid = 1e-5;
    let scene = s1_scene();

    let (mut engine, events) = Engine::new();
    engine.set_area(Point2::new(-3e-3, 3e-3), Point2::new(3e-3, -1e-3));
    engine.set_grid(grid);
    engine.set_threads(4);
    engine.set_threshold(1e-6);
    solve(&mut engine, &events, &scene);

    let parameters = line_parameters(&engine, &scene, &PhysicalConstants::SI, grid, 2e-5);
    let impedance = parameters.positive.impedance;
    assert!(
        (48.0..52.0).contains(&impedance),
        "Z = {impedance} Ω"
    );
}

#[test]
fn it_solves_a_symmetric_differential_stripline() {
    let grid = 2.5e-5;
    let (area, scene) = DifferentialStripline::default().build();
    assert!(scene.validate().is_ok());

    let (mut engine, events) = Engine::new();
    engine.set_area(area.top_left, area.bottom_right);
    engine.set_grid(grid);
    engine.set_threshold(1e-6);
    solve(&mut engine, &events, &scene);

    let parameters = line_parameters(&engine, &scene, &PhysicalConstants::SI, grid, 5e-5);
    let positive = parameters.positive;
    let negative = parameters.negative.expect("differential pair");

    assert!(positive.capacitance > 0.0);
    assert!(negative.capacitance > 0.0);

    let mismatch = (positive.impedance - negative.impedance).abs() / positive.impedance;
    assert!(
        mismatch < 0.01,
        "Z+ = {}, Z- = {}",
        positive.impedance,
        negative.impedance
    );

    let differential = parameters.differential_impedance().unwrap();
    let sum = positive.impedance + negative.impedance;
    assert!((differential - sum).abs() < 1e-9 * sum);
}

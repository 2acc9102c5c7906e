//! Parallel relaxation of the lattice.
//!
//! The updatable rows are cut into horizontal stripes, one worker per
//! stripe. Workers advance in rounds: a fixed number of in-place
//! sweeps over the own stripe, then a barrier. Reads across a stripe
//! border may be one round stale, which the iteration tolerates; the
//! barrier gives every round a happens-before edge over the next. The
//! leader of each round reduces the per-worker maxima into the global
//! diff that drives convergence and progress.

use std::{
    ops::Range,
    sync::{
        Barrier,
        atomic::{
            AtomicBool,
            AtomicU64,
            Ordering,
        },
    },
    thread,
};

use parking_lot::Mutex;

use crate::lattice::Lattice;

#[derive(Clone, Copy, Debug)]
pub struct RelaxOptions {
    /// Requested worker count; capped so every stripe keeps at least
    /// five rows.
    pub threads: usize,
    /// Sweeps each worker performs between barriers.
    pub sweeps_per_round: usize,
    /// The solver stops once the largest per-sweep change drops to
    /// this value (volts).
    pub threshold: f64,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            sweeps_per_round: 10,
            threshold: 1e-6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Converged { rounds: usize, sweeps: usize },
    Aborted,
}

/// Relaxes the lattice until the global diff falls below the threshold
/// or an abort is requested.
///
/// `on_round` receives the global diff once per round, in round order.
pub fn relax(
    lattice: &Lattice,
    options: &RelaxOptions,
    on_round: impl FnMut(f64) + Send,
) -> Outcome {
    let dim = lattice.dim();
    let rows = dim.y - 2;
    let sweeps_per_round = options.sweeps_per_round.max(1);
    let workers = options.threads.clamp(1, (rows / 5).max(1));
    let stripes = partition_rows(rows, workers);

    tracing::debug!(?dim, workers, sweeps_per_round, "relaxing lattice");

    let barrier = Barrier::new(workers);
    let diffs: Vec<AtomicU64> = (0..workers).map(|_| AtomicU64::new(0)).collect();
    let stop = AtomicBool::new(false);
    let aborted = AtomicBool::new(false);
    let rounds = AtomicU64::new(0);
    let on_round = Mutex::new(on_round);

    thread::scope(|scope| {
        for (worker, stripe) in stripes.into_iter().enumerate() {
            let barrier = &barrier;
            let diffs = &diffs;
            let stop = &stop;
            let aborted = &aborted;
            let rounds = &rounds;
            let on_round = &on_round;

            scope.spawn(move || {
                loop {
                    let mut diff = 0.0f64;
                    for _ in 0..sweeps_per_round {
                        if lattice.abort_requested() {
                            break;
                        }
                        diff = diff.max(sweep(lattice, stripe.clone()));
                    }
                    diffs[worker].store(diff.to_bits(), Ordering::Relaxed);

                    if barrier.wait().is_leader() {
                        let diff = diffs
                            .iter()
                            .map(|diff| f64::from_bits(diff.load(Ordering::Relaxed)))
                            .fold(0.0, f64::max);
                        rounds.fetch_add(1, Ordering::Relaxed);

                        if lattice.abort_requested() {
                            aborted.store(true, Ordering::Relaxed);
                            stop.store(true, Ordering::Relaxed);
                        }
                        else {
                            if diff <= options.threshold {
                                stop.store(true, Ordering::Relaxed);
                            }
                            (&mut *on_round.lock())(diff);
                        }
                    }

                    // second rendezvous so every worker sees the verdict
                    barrier.wait();
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                }
            });
        }
    });

    if aborted.load(Ordering::Relaxed) {
        Outcome::Aborted
    }
    else {
        let rounds = rounds.load(Ordering::Relaxed) as usize;
        Outcome::Converged {
            rounds,
            sweeps: rounds * sweeps_per_round,
        }
    }
}

/// One in-place sweep over a stripe, row-major. Returns the largest
/// absolute change.
fn sweep(lattice: &Lattice, rows: Range<usize>) -> f64 {
    let dim = lattice.dim();
    let mut diff = 0.0f64;
    for y in rows {
        let row = y * dim.x;
        for x in 1..dim.x - 1 {
            let index = row + x;
            if !lattice.updatable(index) {
                continue;
            }
            let delta = lattice.update(index);
            if delta > diff {
                diff = delta;
            }
        }
    }
    diff
}

/// Splits the updatable rows 1..=rows into contiguous per-worker
/// ranges covering every row exactly once.
fn partition_rows(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let base = rows / workers;
    let remainder = rows % workers;
    let mut start = 1;
    (0..workers)
        .map(|worker| {
            let length = base + usize::from(worker < remainder);
            let stripe = start..start + length;
            start += length;
            stripe
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;
    use rf2d_scene::Area;

    use crate::{
        lattice::{
            Boundary,
            Lattice,
            LatticeQuery,
        },
        relax::{
            Outcome,
            RelaxOptions,
            partition_rows,
            relax,
        },
    };

    /// Dirichlet 1 on the top row, Dirichlet 0 on the bottom row; the
    /// converged field is linear in y.
    struct Plate {
        height: f64,
    }

    impl LatticeQuery for Plate {
        fn boundary_at(&self, position: &Point2<f64>) -> Boundary {
            if position.y >= self.height - 1e-9 {
                Boundary::dirichlet(1.0)
            }
            else if position.y <= 1e-9 {
                Boundary::dirichlet(0.0)
            }
            else {
                Boundary::NONE
            }
        }

        fn weight_at(&self, _position: &Point2<f64>) -> f64 {
            1.0
        }
    }

    fn plate_lattice(height: f64) -> Lattice {
        let area = Area::new(Point2::new(0.0, height), Point2::new(1.0, 0.0));
        Lattice::new(&area, 0.1, &Plate { height }).unwrap()
    }

    #[test]
    fn it_partitions_rows_without_gaps() {
        let stripes = partition_rows(41, 4);
        assert_eq!(stripes.len(), 4);
        assert_eq!(stripes[0].start, 1);
        assert_eq!(stripes.last().unwrap().end, 42);
        for pair in stripes.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn it_relaxes_a_plate_to_the_linear_profile() {
        let lattice = plate_lattice(1.0);
        let options = RelaxOptions {
            threshold: 1e-10,
            ..Default::default()
        };

        let outcome = relax(&lattice, &options, |_| {});
        assert!(matches!(outcome, Outcome::Converged { rounds, .. } if rounds > 0));

        for y in [0.2, 0.5, 0.8] {
            let potential = lattice.potential(&Point2::new(0.5, y));
            assert!((potential - y).abs() < 1e-6, "{y}: {potential}");
        }
    }

    #[test]
    fn it_keeps_dirichlet_cells_bit_stable() {
        let lattice = plate_lattice(1.0);
        relax(&lattice, &RelaxOptions::default(), |_| {});

        let dim = lattice.dim();
        for x in 1..dim.x - 1 {
            assert_eq!(lattice.value(lattice.index(x, 1)), 0.0);
            assert_eq!(lattice.value(lattice.index(x, dim.y - 2)), 1.0);
        }
    }

    #[test]
    fn it_reports_a_nonincreasing_diff() {
        let lattice = plate_lattice(1.0);
        let mut diffs = Vec::new();
        relax(
            &lattice,
            &RelaxOptions {
                threshold: 1e-8,
                ..Default::default()
            },
            |diff| diffs.push(diff),
        );

        assert!(diffs.len() > 1);
        for pair in diffs.windows(2) {
            // Gauss-Seidel ordering may wiggle slightly
            assert!(pair[1] <= pair[0] * 1.01, "{pair:?}");
        }
    }

    #[test]
    fn it_is_deterministic_with_a_single_worker() {
        let first = plate_lattice(1.0);
        let second = plate_lattice(1.0);
        let options = RelaxOptions::default();

        let a = relax(&first, &options, |_| {});
        let b = relax(&second, &options, |_| {});
        assert_eq!(a, b);

        let dim = first.dim();
        for index in 0..dim.x * dim.y {
            assert_eq!(
                first.value(index).to_bits(),
                second.value(index).to_bits(),
                "cell {index}"
            );
        }
    }

    #[test]
    fn it_converges_with_multiple_workers() {
        let tall = Area::new(Point2::new(0.0, 4.0), Point2::new(1.0, 0.0));
        let query = Plate { height: 4.0 };
        let lattice = Lattice::new(&tall, 0.1, &query).unwrap();

        let outcome = relax(
            &lattice,
            &RelaxOptions {
                threads: 4,
                threshold: 1e-9,
                ..Default::default()
            },
            |_| {},
        );
        assert!(matches!(outcome, Outcome::Converged { .. }));

        for y in [0.5, 2.0, 3.5] {
            let potential = lattice.potential(&Point2::new(0.5, y));
            assert!((potential - y / 4.0).abs() < 1e-5, "{y}: {potential}");
        }
    }

    #[test]
    fn it_aborts_at_the_next_round() {
        let lattice = plate_lattice(1.0);
        let mut seen_rounds = 0;
        let outcome = relax(
            &lattice,
            &RelaxOptions {
                // unreachable threshold, only the abort can end this
                threshold: 1e-300,
                ..Default::default()
            },
            |_| {
                seen_rounds += 1;
                lattice.request_abort();
            },
        );
        assert_eq!(outcome, Outcome::Aborted);
        assert_eq!(seen_rounds, 1);
    }
}

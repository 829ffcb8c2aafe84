//! Benchmarks for one `find_chains` call per chain mode.
//!
//! # Running
//!
//! ```sh
//! cargo bench --bench chains
//! ```

use std::hint;

use chainlace_core::CandidateGrid;
use chainlace_solver::{ChainMode, ChainSolver, TechniqueSolver, technique};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

const PUZZLES: [(&str, &str); 2] = [
    (
        "inkala",
        "8..........36......7..9.2...5...7.......457.....1...3...1....68..85...1..9....4..",
    ),
    (
        "easter_monster",
        "1.......2.9.4...5...6...7...5.9.3.......7.......85..4.7.....6...3...9.8...2.....1",
    ),
];

/// Returns each puzzle after the singles have done what they can.
fn stuck_grids() -> Vec<(&'static str, CandidateGrid)> {
    let singles = TechniqueSolver::new(technique::fundamental_techniques());
    PUZZLES
        .iter()
        .map(|&(name, s)| {
            let mut grid: CandidateGrid = s.parse().unwrap();
            let _ = singles.solve(&mut grid).unwrap();
            (name, grid)
        })
        .collect()
}

fn bench_find_chains(c: &mut Criterion) {
    let grids = stuck_grids();
    for mode in ChainMode::ALL {
        let mut group = c.benchmark_group(mode.name());
        group.sample_size(10);
        for (name, grid) in &grids {
            group.bench_with_input(BenchmarkId::from_parameter(name), grid, |b, grid| {
                b.iter_batched_ref(
                    ChainSolver::default,
                    |solver| {
                        let steps = solver.find_chains(grid, mode);
                        hint::black_box(steps)
                    },
                    BatchSize::SmallInput,
                );
            });
        }
        group.finish();
    }
}

fn bench_reused_solver(c: &mut Criterion) {
    let grids = stuck_grids();
    let mut solver = ChainSolver::default();
    for (name, grid) in &grids {
        c.bench_with_input(BenchmarkId::new("reused_solver_aic", name), grid, |b, grid| {
            b.iter(|| hint::black_box(solver.find_chains(hint::black_box(grid), ChainMode::Aic)));
        });
    }
}

criterion_group!(benches, bench_find_chains, bench_reused_solver);
criterion_main!(benches);

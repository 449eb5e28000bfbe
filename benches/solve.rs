use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::DVector;

use bmrs::euler::euler_residual;
use bmrs::grid::CapitalGrid;
use bmrs::interp::PolicyFunction;
use bmrs::model::ModelParameters;
use bmrs::{GrowthProblem, InitialGuess, SolveOptions};

fn bench_residual(c: &mut Criterion) {
    let params = ModelParameters::new(0.33, 0.96).unwrap();
    let grid = CapitalGrid::around_steady_state(&params, 5, 0.2).unwrap();
    let level = (1.0_f64 - 0.33 * 0.96).ln();
    let candidate = DVector::from_iterator(
        grid.len(),
        grid.log_nodes().iter().map(|k| level + 0.33 * k),
    );
    let policy = PolicyFunction::fit(&grid, &candidate).unwrap();

    c.bench_function("euler_residual", |b| {
        b.iter(|| euler_residual(black_box(&params), &grid, &policy, &candidate).unwrap())
    });
}

fn bench_solve(c: &mut Criterion) {
    let params = ModelParameters::new(0.33, 0.96).unwrap();
    let problem = GrowthProblem::standard(params).unwrap();
    let medium = GrowthProblem::new(
        params,
        CapitalGrid::around_steady_state(&params, 25, 0.2).unwrap(),
    );
    let anchored = SolveOptions::default().with_initial_guess(InitialGuess::SteadyStateAnchored);

    c.bench_function("solve_analytic_guess", |b| {
        b.iter(|| black_box(&problem).solve().unwrap())
    });
    c.bench_function("solve_anchored_guess", |b| {
        b.iter(|| black_box(&problem).solve_with_options(&anchored).unwrap())
    });
    c.bench_function("solve_anchored_guess_25_nodes", |b| {
        b.iter(|| black_box(&medium).solve_with_options(&anchored).unwrap())
    });
}

criterion_group!(benches, bench_residual, bench_solve);
criterion_main!(benches);

/*
 * Swarm Simulation Benchmark
 *
 * Measures the hot paths of a physics step: spatial grid rebuilds, a full
 * Swarm::step with and without the grid and rayon, and the pheromone
 * evaporate/diffuse pass.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use swarm::params::{PheromoneParams, Scenario, SimulationParams};
use swarm::{Channel, PheromoneField, SpatialGrid, Swarm};

fn params_for(scenario: Scenario, agents: usize) -> SimulationParams {
    SimulationParams {
        num_agents: agents,
        seed: Some(11),
        ..SimulationParams::for_scenario(scenario)
    }
}

// Benchmark the spatial grid operations
fn bench_spatial_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_grid");
    let bounds = Rect::from_w_h(1000.0, 1000.0);

    for num_agents in [100, 500, 1000, 2000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_agents), num_agents, |b, &n| {
            let mut rng = StdRng::seed_from_u64(5);
            let positions: Vec<Point2> = (0..n)
                .map(|_| pt2(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0)))
                .collect();
            let mut grid = SpatialGrid::new(200.0, bounds);

            b.iter(|| {
                grid.rebuild(positions.iter().copied());
                black_box(grid.query(pt2(0.0, 0.0), 200.0).len());
            });
        });
    }

    group.finish();
}

// Benchmark full physics steps per behaviour and execution mode
fn bench_swarm_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("swarm_step");
    group.measurement_time(Duration::from_secs(5));

    for num_agents in [100, 500, 1000].iter() {
        for (label, scenario) in [("flock", Scenario::Flocking), ("colony", Scenario::Colony)] {
            for (mode, parallel, grid) in [("sequential", false, false), ("grid", false, true), ("grid+rayon", true, true)] {
                let mut params = params_for(scenario, *num_agents);
                params.enable_parallel = parallel;
                params.enable_spatial_grid = grid;

                let id = BenchmarkId::new(format!("{}/{}", label, mode), num_agents);
                group.bench_with_input(id, &params, |b, params| {
                    let mut swarm = Swarm::new(params);
                    b.iter(|| swarm.step(black_box(params)));
                });
            }
        }
    }

    group.finish();
}

// Benchmark the pheromone evaporate/diffuse pass
fn bench_pheromone_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("pheromone_step");

    for cell_size in [40.0f32, 20.0, 10.0].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(cell_size), cell_size, |b, &cell| {
            let settings = PheromoneParams {
                enabled: true,
                cell_size: cell,
                ..PheromoneParams::default()
            };
            let mut field = PheromoneField::new(Rect::from_w_h(1000.0, 1000.0), cell);
            let mut rng = StdRng::seed_from_u64(9);
            for _ in 0..500 {
                let p = pt2(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0));
                field.deposit(p, Channel::Trail, 2.0, settings.max_concentration);
                field.deposit(p, Channel::Recruit, 1.0, settings.max_concentration);
            }

            b.iter(|| field.step(black_box(&settings)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spatial_grid, bench_swarm_step, bench_pheromone_step);
criterion_main!(benches);

use std::time::Instant;

use crate::simulation::engine::Engine;
use crate::simulation::forces::{Acceleration, BarnesHutGravity, DirectGravity, GravityKind};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::scattered_system;
use crate::simulation::states::{NVec2, System};

/// Time one force pass of direct summation against Barnes–Hut for each `n`,
/// and report the worst relative error of the approximation
pub fn bench_gravity(ns: &[usize], theta: f64) {
    let params = Parameters { theta, ..Parameters::default() };

    println!("theta = {theta}");
    for &n in ns {
        let bodies = scattered_system(n, 0);
        let mut out_direct = vec![NVec2::zeros(); n];
        let mut out_bh = vec![NVec2::zeros(); n];

        // Serial on both sides so the comparison is algorithmic
        let mut direct = DirectGravity { parallel: false };
        let mut bh = BarnesHutGravity::default();
        bh.parallel = false;

        // Warm up
        direct.acceleration(&bodies, &params, &mut out_direct);
        bh.acceleration(&bodies, &params, &mut out_bh);

        // Time direct
        let t0 = Instant::now();
        direct.acceleration(&bodies, &params, &mut out_direct);
        let dt_direct = t0.elapsed().as_secs_f64();

        // Time barnes-hut
        let t1 = Instant::now();
        bh.acceleration(&bodies, &params, &mut out_bh);
        let dt_bh = t1.elapsed().as_secs_f64();

        let worst = out_direct
            .iter()
            .zip(out_bh.iter())
            .filter(|(d, _)| d.norm() > 0.0)
            .map(|(d, b)| (d - b).norm() / d.norm())
            .fold(0.0, f64::max);

        println!(
            "N = {n:5}, direct = {dt_direct:8.6} s, BH = {dt_bh:8.6} s, nodes = {:6}, worst rel err = {worst:.3e}",
            bh.tree().node_count()
        );
    }
}

/// Full engine steps for a range of n, as CSV
/// Paste output directly into a spreadsheet to graph
pub fn bench_step_curve(max_n: usize, stride: usize) {
    println!("N,direct_ms,bh_ms");

    for n in (stride..=max_n).step_by(stride.max(1)) {
        // Small n: average over a few steps to smooth noise
        let steps_direct = if n <= 800 { 5 } else { 1 };
        let steps_bh = if n <= 2000 { 3 } else { 1 };

        let template = System::new(scattered_system(n, 0));

        let ms_direct = time_steps(GravityKind::Direct, &template, steps_direct);
        let ms_bh = time_steps(GravityKind::BarnesHut, &template, steps_bh);

        println!("{n},{ms_direct:.6},{ms_bh:.6}");
    }
}

/// Average wall time of one engine step, in ms
fn time_steps(kind: GravityKind, template: &System, steps: usize) -> f64 {
    let mut engine = Engine::new(Parameters::default(), kind);
    let mut sys = template.clone();

    let t0 = Instant::now();
    for _ in 0..steps {
        engine.step(&mut sys);
    }
    t0.elapsed().as_secs_f64() * 1000.0 / steps as f64
}

//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! (`Scenario`) containing:
//! - the engine (`Engine`: parameters + gravity model)
//! - system state (`System` with bodies at step 0)
//! - the number of steps `run` advances by default
//!
//! Also provides [`scattered_system`], the deterministic field used by the
//! benchmarks and by `scatter:` in scenario files.

use crate::configuration::config::ScenarioConfig;
use crate::configuration::error::ConfigError;
use crate::simulation::engine::{Engine, StepReport};
use crate::simulation::states::{Body, BodyId, Category, NVec2, System};

/// Half-extent of the square the scattered field is spread over
pub const SCATTER_EXTENT: f64 = 1000.0;

/// Fully-initialized simulation: engine, bodies and run length
#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub system: System,
    pub steps: usize,
}

/// Totals over a [`Scenario::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub reflected: usize,
    pub rejected: usize,
    pub max_tree_depth: usize,
    pub mean_speed: f64, // over all bodies after the last step
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        let parameters = cfg.simulation.to_parameters()?;

        // Bodies: explicit ones first, then the generated field with fresh ids
        let mut bodies = cfg.to_bodies()?;
        if let Some(n) = cfg.scatter {
            let first_id = BodyId::next_free(bodies.iter().map(|b| b.id))
                .filter(|&first| n == 0 || first.checked_add(n as u64 - 1).is_some())
                .ok_or_else(|| {
                    ConfigError::invalid("scatter", format!("no room for {n} generated ids above the body ids"))
                })?;
            bodies.extend(scattered_system(n, first_id));
        }

        let mut engine = Engine::new(parameters, cfg.simulation.gravity);
        engine.gravity.set_parallel(cfg.simulation.parallel);

        tracing::info!(
            bodies = bodies.len(),
            gravity = ?cfg.simulation.gravity,
            theta = engine.params.theta,
            world_radius = engine.params.world_radius,
            "scenario built"
        );

        Ok(Self {
            engine,
            system: System::new(bodies),
            steps: cfg.steps,
        })
    }

    /// Advance `steps` steps and total up what happened
    pub fn run(&mut self, steps: usize) -> RunSummary {
        let mut summary = RunSummary::default();
        let log_every = (steps / 10).max(1);

        for i in 0..steps {
            let report: StepReport = self.engine.step(&mut self.system);
            summary.steps += 1;
            summary.reflected += report.reflected;
            summary.rejected += report.rejected;
            summary.max_tree_depth = summary.max_tree_depth.max(report.tree_depth);

            if (i + 1) % log_every == 0 {
                tracing::info!(
                    step = self.system.step,
                    tree_nodes = report.tree_nodes,
                    tree_depth = report.tree_depth,
                    reflected = report.reflected,
                    "progress"
                );
            }
        }

        let n = self.system.bodies.len();
        if n > 0 {
            summary.mean_speed = self.system.bodies.iter().map(|b| b.v.norm()).sum::<f64>() / n as f64;
        }
        summary
    }
}

/// Deterministic field of `n` bodies with ids starting at `first_id`
///
/// The first body is a `Controlled` body of radius 20 at the origin; the rest
/// are spread over `±SCATTER_EXTENT` with radius 5..25, about one in ten
/// `Massive`. Positions come from a sine hash, so no rng is needed and the
/// same `n` always gives the same layout. Generation stops early rather
/// than let an id pass `u64::MAX`.
pub fn scattered_system(n: usize, first_id: u64) -> Vec<Body> {
    let mut bodies = Vec::with_capacity(n);

    for i in 0..n {
        let Some(id) = first_id.checked_add(i as u64) else { break };
        if i == 0 {
            bodies.push(Body::new(id, NVec2::zeros(), 20.0, Category::Controlled));
            continue;
        }

        let i_f = i as f64;
        let x = NVec2::new(
            (hash01(i_f, 1.0) - 0.5) * 2.0 * SCATTER_EXTENT,
            (hash01(i_f, 2.0) - 0.5) * 2.0 * SCATTER_EXTENT,
        );
        let radius = hash01(i_f, 3.0) * 20.0 + 5.0;
        let category = if hash01(i_f, 4.0) < 0.1 { Category::Massive } else { Category::Ambient };

        bodies.push(Body::new(id, x, radius, category));
    }

    bodies
}

/// Pseudo-random value in `[0, 1)` from an index and a salt
fn hash01(i: f64, salt: f64) -> f64 {
    ((i * 12.9898 + salt * 78.233).sin() * 43_758.545_3).fract().abs()
}

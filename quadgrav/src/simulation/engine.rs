//! Per-step driver
//!
//! Owns the parameters, the selected gravity model and the acceleration
//! buffer, and runs one step in order: bounds, tree build, aggregation,
//! force queries, integration.

use super::forces::{Acceleration, GravityKind, GravityModel};
use super::integrator::semi_implicit_euler;
use super::params::Parameters;
use super::states::{Body, NVec2, System};

/// Summary of one [`Engine::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub bodies: usize,
    pub attracted: usize,
    pub reflected: usize,
    pub tree_nodes: usize, // 0 for direct summation
    pub tree_depth: usize,
    pub rejected: usize,   // attractors left out of the tree
}

#[derive(Debug, Clone)]
pub struct Engine {
    pub params: Parameters,
    pub gravity: GravityModel,
    accels: Vec<NVec2>,
}

impl Engine {
    pub fn new(params: Parameters, kind: GravityKind) -> Self {
        Self {
            params,
            gravity: GravityModel::new(kind),
            accels: Vec::new(),
        }
    }

    /// Force pass only: one acceleration per body, nothing is moved
    pub fn accelerations(&mut self, bodies: &[Body]) -> &[NVec2] {
        self.accels.clear();
        self.accels.resize(bodies.len(), NVec2::zeros());
        self.gravity.acceleration(bodies, &self.params, &mut self.accels);
        &self.accels
    }

    /// Advance `sys` by one step
    #[tracing::instrument(skip_all, fields(step = sys.step, bodies = sys.bodies.len()))]
    pub fn step(&mut self, sys: &mut System) -> StepReport {
        self.accelerations(&sys.bodies);
        let integration = semi_implicit_euler(&mut sys.bodies, &self.accels, &self.params);
        sys.step += 1;

        let (tree_nodes, tree_depth) = self
            .gravity
            .tree()
            .map(|t| (t.node_count(), t.depth()))
            .unwrap_or((0, 0));

        let report = StepReport {
            bodies: sys.bodies.len(),
            attracted: sys.bodies.iter().filter(|b| b.attracted).count(),
            reflected: integration.reflected,
            tree_nodes,
            tree_depth,
            rejected: self.gravity.rejected(),
        };

        tracing::debug!(
            attracted = report.attracted,
            reflected = report.reflected,
            tree_nodes = report.tree_nodes,
            tree_depth = report.tree_depth,
            rejected = report.rejected,
            "step complete"
        );
        report
    }
}

//! Acceleration contributors for the simulation
//!
//! Defines the [`Acceleration`] trait and the two gravity models behind it:
//! exact pairwise summation and the Barnes–Hut quadtree approximation.
//! Both use the same force law: a body of mass `m` at distance `d` pulls
//! with `m / d²`, no gravitational constant, nothing inside `d² <= 1`.

use serde::Deserialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::simulation::barnes_hut::{point_mass_pull, Quadtree, TreeBody};
use crate::simulation::bounds::Rect;
use crate::simulation::params::{Parameters, DEFAULT_MAX_DEPTH};
use crate::simulation::states::{Body, NVec2};

/// Source of per-body accelerations
/// Implementations overwrite `out[i]` for every body; bodies that are not
/// `attracted` get zero
pub trait Acceleration {
    fn acceleration(&mut self, bodies: &[Body], params: &Parameters, out: &mut [NVec2]);
}

/// The copy of `body` that gets inserted into a tree
pub fn tree_body(body: &Body, params: &Parameters) -> TreeBody {
    TreeBody {
        id: body.id,
        x: body.x,
        m: params.mass_of(body),
    }
}

/// Exact gravity, every attractor against every attracted body (`O(N²)`)
#[derive(Debug, Clone)]
pub struct DirectGravity {
    pub parallel: bool, // spread targets over the rayon pool when available
}

impl Default for DirectGravity {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl DirectGravity {
    /// Acceleration on `target` from every other attractor in `bodies`
    pub fn acceleration_on(target: &Body, bodies: &[Body], params: &Parameters) -> NVec2 {
        let mut acc = NVec2::zeros();
        for other in bodies {
            // identity by id, not by slot
            if !other.attractor || other.id == target.id {
                continue;
            }
            acc += point_mass_pull(other.x - target.x, params.mass_of(other));
        }
        acc
    }
}

impl Acceleration for DirectGravity {
    fn acceleration(&mut self, bodies: &[Body], params: &Parameters, out: &mut [NVec2]) {
        fill_targets(self.parallel, bodies, out, |b| Self::acceleration_on(b, bodies, params));
    }
}

/// Gravity evaluated through a Barnes–Hut quadtree rebuilt on every call
///
/// The tree's storage is kept between calls, so steady-state steps do not
/// allocate nodes
#[derive(Debug, Clone)]
pub struct BarnesHutGravity {
    pub parallel: bool,
    tree: Quadtree,
    rejected: usize,
}

impl Default for BarnesHutGravity {
    fn default() -> Self {
        Self {
            parallel: true,
            tree: Quadtree::new(Rect::FALLBACK, DEFAULT_MAX_DEPTH),
            rejected: 0,
        }
    }
}

impl BarnesHutGravity {
    /// Tree built by the most recent call
    pub fn tree(&self) -> &Quadtree {
        &self.tree
    }

    /// Attractors the most recent call could not place in the tree
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Bounding box, inserts and mass aggregation for the current bodies
    #[tracing::instrument(skip_all, fields(bodies = bodies.len()))]
    pub fn build_tree(&mut self, bodies: &[Body], params: &Parameters) -> &Quadtree {
        let root = Rect::enclosing(bodies.iter().map(|b| b.x), params.padding, params.fallback_bounds);
        let sources = bodies.iter().filter(|b| b.attractor).map(|b| tree_body(b, params));
        self.rejected = self.tree.rebuild(root, params.max_depth, sources);
        &self.tree
    }
}

impl Acceleration for BarnesHutGravity {
    fn acceleration(&mut self, bodies: &[Body], params: &Parameters, out: &mut [NVec2]) {
        self.build_tree(bodies, params);
        let tree = &self.tree;
        let theta = params.theta;
        fill_targets(self.parallel, bodies, out, |b| tree.acceleration_on(b.id, b.x, theta));
    }
}

/// Which gravity model a scenario runs with
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GravityKind {
    #[serde(rename = "barnes_hut")]
    #[default]
    BarnesHut,

    #[serde(rename = "direct")]
    Direct,
}

#[derive(Debug, Clone)]
pub enum GravityModel {
    BarnesHut(BarnesHutGravity),
    Direct(DirectGravity),
}

impl GravityModel {
    pub fn new(kind: GravityKind) -> Self {
        match kind {
            GravityKind::BarnesHut => GravityModel::BarnesHut(BarnesHutGravity::default()),
            GravityKind::Direct => GravityModel::Direct(DirectGravity::default()),
        }
    }

    pub fn kind(&self) -> GravityKind {
        match self {
            GravityModel::BarnesHut(_) => GravityKind::BarnesHut,
            GravityModel::Direct(_) => GravityKind::Direct,
        }
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        match self {
            GravityModel::BarnesHut(g) => g.parallel = parallel,
            GravityModel::Direct(g) => g.parallel = parallel,
        }
    }

    /// Tree from the latest step, Barnes–Hut only
    pub fn tree(&self) -> Option<&Quadtree> {
        match self {
            GravityModel::BarnesHut(g) => Some(g.tree()),
            GravityModel::Direct(_) => None,
        }
    }

    pub fn rejected(&self) -> usize {
        match self {
            GravityModel::BarnesHut(g) => g.rejected(),
            GravityModel::Direct(_) => 0,
        }
    }
}

impl Acceleration for GravityModel {
    fn acceleration(&mut self, bodies: &[Body], params: &Parameters, out: &mut [NVec2]) {
        match self {
            GravityModel::BarnesHut(g) => g.acceleration(bodies, params, out),
            GravityModel::Direct(g) => g.acceleration(bodies, params, out),
        }
    }
}

// helpers ===========================================================================

/// Write `f(body)` for every attracted body and zero for the rest.
/// Queries are read-only, so they may run on the rayon pool.
fn fill_targets<F>(parallel: bool, bodies: &[Body], out: &mut [NVec2], f: F)
where
    F: Fn(&Body) -> NVec2 + Sync,
{
    let eval = |(a, b): (&mut NVec2, &Body)| {
        *a = if b.attracted { f(b) } else { NVec2::zeros() };
    };

    #[cfg(feature = "parallel")]
    if parallel {
        out.par_iter_mut().zip(bodies.par_iter()).for_each(eval);
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    out.iter_mut().zip(bodies.iter()).for_each(eval);
}

//! Fixed-step integrator for the simulation
//!
//! One step is a semi-implicit Euler update with unit time step:
//! velocity takes the acceleration, position takes the new velocity,
//! friction damps the velocity, and the circular world edge reflects
//! anything that crossed it.

use super::params::Parameters;
use super::states::{Body, NVec2};

/// What an integration pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrationReport {
    pub reflected: usize, // bodies clamped back onto the world edge
}

/// Advance every body by one step using the precomputed `accels`
/// (`accels[i]` belongs to `bodies[i]`)
pub fn semi_implicit_euler(bodies: &mut [Body], accels: &[NVec2], params: &Parameters) -> IntegrationReport {
    debug_assert_eq!(bodies.len(), accels.len());
    let mut report = IntegrationReport::default();

    for (b, a) in bodies.iter_mut().zip(accels.iter()) {
        // v_n+1 = v_n + a_n, x_n+1 = x_n + v_n+1
        b.v += *a;
        b.x += b.v;

        let damping = params.friction_of(b);
        b.v *= damping;

        if reflect_at_boundary(b, params.world_radius) {
            report.reflected += 1;
        }
    }

    report
}

/// Keep `body` inside the circle of radius `world_radius` around the origin.
///
/// If the body's center is farther than `world_radius - radius` from the
/// origin it is moved back onto that circle along the same direction, and
/// its velocity is mirrored about the outward normal `n`:
/// `v' = v - 2 (v·n) n`. The radial component flips, the tangential one is
/// untouched. A body sitting exactly on the origin uses `n = (1, 0)`.
///
/// Returns whether a reflection happened.
pub fn reflect_at_boundary(body: &mut Body, world_radius: f64) -> bool {
    let limit = world_radius - body.radius;
    let dist = body.x.norm();
    if dist.is_nan() || dist <= limit {
        return false;
    }

    let n = if dist > 0.0 { body.x / dist } else { NVec2::new(1.0, 0.0) };
    body.x = n * limit;
    let along = body.v.dot(&n);
    body.v -= n * (2.0 * along);
    true
}

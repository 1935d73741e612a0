//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - Barnes–Hut opening angle, tree depth cap and bounding-box padding,
//! - per-category mass weights and friction multipliers,
//! - radius of the circular world boundary

use super::bounds::Rect;
use super::states::{Body, Category};

pub const DEFAULT_THETA: f64 = 0.5;
pub const DEFAULT_PADDING: f64 = 200.0;
pub const DEFAULT_MAX_DEPTH: usize = 12;
pub const DEFAULT_WORLD_RADIUS: f64 = 1500.0;

/// One value per [`Category`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTable<T> {
    pub massive: T,
    pub controlled: T,
    pub ambient: T,
}

impl<T: Copy> CategoryTable<T> {
    pub fn get(&self, category: Category) -> T {
        match category {
            Category::Massive => self.massive,
            Category::Controlled => self.controlled,
            Category::Ambient => self.ambient,
        }
    }

    pub fn values(&self) -> [(Category, T); 3] {
        [
            (Category::Massive, self.massive),
            (Category::Controlled, self.controlled),
            (Category::Ambient, self.ambient),
        ]
    }
}

impl CategoryTable<f64> {
    /// Stars weigh half their radius, everything else a tenth
    pub fn default_mass_weights() -> Self {
        Self { massive: 0.5, controlled: 0.1, ambient: 0.1 }
    }

    /// The steered entity sheds speed a little faster than ambient bodies
    pub fn default_friction() -> Self {
        Self { massive: 0.99, controlled: 0.98, ambient: 0.99 }
    }
}

#[derive(Debug, Clone)]
pub struct Parameters {
    pub theta: f64,                        // opening angle
    pub padding: f64,                      // margin around the bodies' extent
    pub max_depth: usize,                  // quadtree depth cap
    pub fallback_bounds: Rect,             // extent padded into the root when there is nothing to enclose
    pub mass_weight: CategoryTable<f64>,   // mass = weight × radius
    pub friction: CategoryTable<f64>,      // velocity multiplier per step
    pub world_radius: f64,                 // circular boundary around the origin
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
            padding: DEFAULT_PADDING,
            max_depth: DEFAULT_MAX_DEPTH,
            fallback_bounds: Rect::FALLBACK,
            mass_weight: CategoryTable::default_mass_weights(),
            friction: CategoryTable::default_friction(),
            world_radius: DEFAULT_WORLD_RADIUS,
        }
    }
}

impl Parameters {
    /// Derived mass of a body
    pub fn mass_of(&self, body: &Body) -> f64 {
        self.mass_weight.get(body.category) * body.radius
    }

    pub fn friction_of(&self, body: &Body) -> f64 {
        self.friction.get(body.category)
    }
}

/// World radius the way the interactive driver sizes it from its viewport
pub fn world_radius_for_viewport(width: f64, height: f64, zoom: f64) -> f64 {
    (width.min(height) * 1.5) / (zoom + 1.0)
}

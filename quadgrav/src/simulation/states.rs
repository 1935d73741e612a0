//! Core state types for the simulation.
//!
//! Defines the 2D body/system structs:
//! - `Body` / `System` using `NVec2`
//! - `BodyId` for identity that survives copying bodies into a fresh tree
//! - `Category` for the per-kind mass weight and friction lookup
//!
//! The system holds the ordered list of bodies and the number of steps taken.

use nalgebra::Vector2;
use serde::Deserialize;

pub type NVec2 = Vector2<f64>;

/// Stable identifier of a body, unique within a `System`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u64);

impl BodyId {
    /// First id above every one in `ids` (0 when there are none), or `None`
    /// once `u64::MAX` is taken
    pub fn next_free<I>(ids: I) -> Option<u64>
    where
        I: IntoIterator<Item = BodyId>,
    {
        match ids.into_iter().max() {
            Some(BodyId(max)) => max.checked_add(1),
            None => Some(0),
        }
    }
}

/// Kind of body; selects the mass weight and friction multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Massive,    // stars, heavy attractors
    Controlled, // the user-steered entity
    Ambient,    // everything else
}

impl Category {
    /// Whether bodies of this kind feel gravity unless told otherwise
    pub fn attracted_by_default(self) -> bool {
        !matches!(self, Category::Controlled)
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub x: NVec2,          // position
    pub v: NVec2,          // velocity
    pub radius: f64,       // radius, also scales mass
    pub category: Category,
    pub attractor: bool,   // contributes mass to the field
    pub attracted: bool,   // receives acceleration from the field
}

impl Body {
    /// Body at rest with the default participation for its category
    pub fn new(id: u64, x: NVec2, radius: f64, category: Category) -> Self {
        Self {
            id: BodyId(id),
            x,
            v: NVec2::zeros(),
            radius,
            category,
            attractor: true,
            attracted: category.attracted_by_default(),
        }
    }

    pub fn with_velocity(mut self, v: NVec2) -> Self {
        self.v = v;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // collection of bodies
    pub step: u64,         // steps taken so far
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, step: 0 }
    }
}

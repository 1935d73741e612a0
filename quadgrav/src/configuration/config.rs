//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`SimulationConfig`] – tree, force and world settings (all optional)
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario matching these types:
//!
//! ```yaml
//! simulation:
//!   theta: 0.5              # opening angle, 0 = exact
//!   padding: 200.0          # bounding-box margin
//!   max_depth: 12           # quadtree depth cap
//!   gravity: barnes_hut     # or "direct"
//!   world_radius: 1500.0    # or viewport: { width: 1920, height: 1080, zoom: 0 }
//!   mass_weight: { massive: 0.5, controlled: 0.1, ambient: 0.1 }
//!   friction:    { massive: 0.99, controlled: 0.98, ambient: 0.99 }
//!
//! steps: 600
//!
//! bodies:
//!   - id: 1
//!     x: [ 0.0, 0.0 ]
//!     radius: 10.0
//!     category: massive
//!   - id: 2
//!     x: [ 100.0, 0.0 ]
//!     v: [ 0.0, 0.5 ]
//!     radius: 5.0
//!     category: ambient
//!
//! scatter: 500              # optional generated field appended to `bodies`
//! ```
//!
//! Validation happens when the configuration is turned into runtime values
//! ([`SimulationConfig::to_parameters`], [`BodyConfig::to_body`]), not while
//! parsing.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::error::ConfigError;
use crate::simulation::bounds::Rect;
use crate::simulation::forces::GravityKind;
use crate::simulation::params::{
    world_radius_for_viewport, CategoryTable, Parameters, DEFAULT_MAX_DEPTH, DEFAULT_PADDING, DEFAULT_THETA,
    DEFAULT_WORLD_RADIUS,
};
use crate::simulation::states::{Body, BodyId, Category, NVec2};

/// Deepest tree a configuration may ask for
pub const MAX_CONFIGURABLE_DEPTH: usize = 32;

pub const DEFAULT_STEPS: usize = 600;

/// Viewport the world radius is derived from when no radius is given
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub zoom: f64,
}

/// Tree, force and world settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub theta: f64,
    pub padding: f64,
    pub max_depth: usize,
    pub gravity: GravityKind,
    pub world_radius: Option<f64>,      // wins over `viewport`
    pub viewport: Option<ViewportConfig>,
    #[serde(deserialize_with = "mass_weights_over_defaults")]
    pub mass_weight: CategoryTable<f64>,  // missing categories keep their default
    #[serde(deserialize_with = "friction_over_defaults")]
    pub friction: CategoryTable<f64>,
    pub fallback_bounds: Rect,
    pub parallel: bool,                 // run force queries on the rayon pool
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
            padding: DEFAULT_PADDING,
            max_depth: DEFAULT_MAX_DEPTH,
            gravity: GravityKind::default(),
            world_radius: None,
            viewport: None,
            mass_weight: CategoryTable::default_mass_weights(),
            friction: CategoryTable::default_friction(),
            fallback_bounds: Rect::FALLBACK,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    /// World radius after applying the `world_radius` / `viewport` precedence
    pub fn resolved_world_radius(&self) -> f64 {
        match (self.world_radius, self.viewport) {
            (Some(r), _) => r,
            (None, Some(vp)) => world_radius_for_viewport(vp.width, vp.height, vp.zoom),
            (None, None) => DEFAULT_WORLD_RADIUS,
        }
    }

    /// Validate and convert into runtime [`Parameters`]
    pub fn to_parameters(&self) -> Result<Parameters, ConfigError> {
        ensure(self.theta.is_finite() && self.theta >= 0.0, "theta", "must be finite and >= 0")?;
        ensure(self.padding.is_finite() && self.padding > 0.0, "padding", "must be finite and > 0")?;
        ensure(
            (1..=MAX_CONFIGURABLE_DEPTH).contains(&self.max_depth),
            "max_depth",
            format!("must be between 1 and {MAX_CONFIGURABLE_DEPTH}"),
        )?;

        for (category, w) in self.mass_weight.values() {
            ensure(w.is_finite() && w >= 0.0, format!("mass_weight.{category:?}"), "must be finite and >= 0")?;
        }
        for (category, f) in self.friction.values() {
            ensure((0.0..=1.0).contains(&f), format!("friction.{category:?}"), "must be within [0, 1]")?;
        }

        if let Some(vp) = self.viewport {
            ensure(
                vp.width.is_finite() && vp.width > 0.0 && vp.height.is_finite() && vp.height > 0.0,
                "viewport",
                "width and height must be finite and > 0",
            )?;
            ensure(vp.zoom.is_finite() && vp.zoom > -1.0, "viewport.zoom", "must be finite and > -1")?;
        }
        let world_radius = self.resolved_world_radius();
        ensure(world_radius.is_finite() && world_radius > 0.0, "world_radius", "must be finite and > 0")?;

        let fb = self.fallback_bounds;
        ensure(
            fb.is_finite() && fb.width > 0.0 && fb.height > 0.0,
            "fallback_bounds",
            "must be finite with positive width and height",
        )?;

        Ok(Parameters {
            theta: self.theta,
            padding: self.padding,
            max_depth: self.max_depth,
            fallback_bounds: fb,
            mass_weight: self.mass_weight,
            friction: self.friction,
            world_radius,
        })
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BodyConfig {
    pub id: Option<u64>,        // assigned after the largest explicit id when omitted
    pub x: Vec<f64>,            // initial position [x, y]
    #[serde(default)]
    pub v: Option<Vec<f64>>,    // initial velocity [vx, vy], at rest when omitted
    pub radius: f64,
    pub category: Category,
    #[serde(default)]
    pub attractor: Option<bool>, // defaults to true
    #[serde(default)]
    pub attracted: Option<bool>, // defaults by category
}

impl BodyConfig {
    /// Validate and convert into a runtime [`Body`]; `index` names the body in errors
    /// and `default_id` is used when the body has no `id`
    pub fn to_body(&self, index: usize, default_id: u64) -> Result<Body, ConfigError> {
        let field = |name: &str| format!("bodies[{index}].{name}");

        let x = vec2(&self.x).ok_or_else(|| ConfigError::invalid(field("x"), "must be two finite numbers"))?;
        let v = match &self.v {
            Some(v) => vec2(v).ok_or_else(|| ConfigError::invalid(field("v"), "must be two finite numbers"))?,
            None => NVec2::zeros(),
        };
        ensure(self.radius.is_finite() && self.radius >= 0.0, field("radius"), "must be finite and >= 0")?;

        Ok(Body {
            id: BodyId(self.id.unwrap_or(default_id)),
            x,
            v,
            radius: self.radius,
            category: self.category,
            attractor: self.attractor.unwrap_or(true),
            attracted: self.attracted.unwrap_or(self.category.attracted_by_default()),
        })
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationConfig, // tree, force and world settings
    #[serde(default = "default_steps")]
    pub steps: usize,                 // steps `run` advances by default
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,      // explicit initial state
    #[serde(default)]
    pub scatter: Option<usize>,       // number of generated bodies appended after `bodies`
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Convert every explicit body, rejecting duplicate ids
    ///
    /// Bodies without an `id` are numbered in list order, starting above the
    /// largest id written in the file.
    pub fn to_bodies(&self) -> Result<Vec<Body>, ConfigError> {
        let mut next_id = BodyId::next_free(self.bodies.iter().filter_map(|bc| bc.id.map(BodyId)));
        let mut seen = HashSet::new();
        let mut bodies = Vec::with_capacity(self.bodies.len());
        for (i, bc) in self.bodies.iter().enumerate() {
            let default_id = match bc.id {
                Some(id) => id,
                None => {
                    let id = next_id.ok_or_else(|| {
                        ConfigError::invalid(format!("bodies[{i}].id"), "no id left above the explicit ids")
                    })?;
                    next_id = id.checked_add(1);
                    id
                }
            };
            let body = bc.to_body(i, default_id)?;
            if !seen.insert(body.id) {
                return Err(ConfigError::invalid(
                    format!("bodies[{i}].id"),
                    format!("duplicate id {}", body.id.0),
                ));
            }
            bodies.push(body);
        }
        Ok(bodies)
    }
}

/// Per-category values as written in YAML; any category may be left out
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct PartialCategoryTable {
    massive: Option<f64>,
    controlled: Option<f64>,
    ambient: Option<f64>,
}

impl PartialCategoryTable {
    fn over(self, base: CategoryTable<f64>) -> CategoryTable<f64> {
        CategoryTable {
            massive: self.massive.unwrap_or(base.massive),
            controlled: self.controlled.unwrap_or(base.controlled),
            ambient: self.ambient.unwrap_or(base.ambient),
        }
    }
}

fn mass_weights_over_defaults<'de, D>(deserializer: D) -> Result<CategoryTable<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PartialCategoryTable::deserialize(deserializer)?.over(CategoryTable::default_mass_weights()))
}

fn friction_over_defaults<'de, D>(deserializer: D) -> Result<CategoryTable<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PartialCategoryTable::deserialize(deserializer)?.over(CategoryTable::default_friction()))
}

fn default_steps() -> usize {
    DEFAULT_STEPS
}

fn ensure(ok: bool, field: impl Into<String>, reason: impl Into<String>) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, reason))
    }
}

fn vec2(v: &[f64]) -> Option<NVec2> {
    match v {
        [x, y] if x.is_finite() && y.is_finite() => Some(NVec2::new(*x, *y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = ScenarioConfig::from_yaml_str("{}").unwrap();
        let params = cfg.simulation.to_parameters().unwrap();

        assert_eq!(cfg.steps, DEFAULT_STEPS);
        assert!(cfg.bodies.is_empty());
        assert_eq!(params.theta, 0.5);
        assert_eq!(params.max_depth, 12);
        assert_eq!(params.padding, 200.0);
        assert_eq!(params.world_radius, DEFAULT_WORLD_RADIUS);
        assert_eq!(params.mass_weight.get(Category::Massive), 0.5);
        assert_eq!(params.mass_weight.get(Category::Ambient), 0.1);
        assert_eq!(params.friction.get(Category::Controlled), 0.98);
    }

    #[test]
    fn parses_full_scenario() {
        let text = r#"
simulation:
  theta: 0.3
  gravity: direct
  viewport: { width: 800.0, height: 600.0, zoom: 1.0 }
steps: 10
bodies:
  - id: 7
    x: [0.0, 0.0]
    radius: 10.0
    category: massive
  - x: [100.0, 0.0]
    v: [0.0, 1.5]
    radius: 5.0
    category: controlled
scatter: 3
"#;
        let cfg = ScenarioConfig::from_yaml_str(text).unwrap();
        assert_eq!(cfg.simulation.gravity, GravityKind::Direct);
        assert_eq!(cfg.scatter, Some(3));

        // min(800, 600) * 1.5 / (1 + 1)
        let params = cfg.simulation.to_parameters().unwrap();
        assert_eq!(params.world_radius, 450.0);

        let bodies = cfg.to_bodies().unwrap();
        assert_eq!(bodies[0].id, BodyId(7));
        assert_eq!(bodies[1].id, BodyId(8));
        assert_eq!(bodies[1].v, NVec2::new(0.0, 1.5));
        assert!(bodies[0].attracted);
        assert!(!bodies[1].attracted);
        assert!(bodies[1].attractor);
    }

    #[test]
    fn world_radius_wins_over_viewport() {
        let cfg = SimulationConfig {
            world_radius: Some(42.0),
            viewport: Some(ViewportConfig { width: 10.0, height: 10.0, zoom: 0.0 }),
            ..Default::default()
        };
        assert_eq!(cfg.to_parameters().unwrap().world_radius, 42.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad = [
            SimulationConfig { theta: -0.1, ..Default::default() },
            SimulationConfig { theta: f64::NAN, ..Default::default() },
            SimulationConfig { padding: 0.0, ..Default::default() },
            SimulationConfig { max_depth: 0, ..Default::default() },
            SimulationConfig { max_depth: 64, ..Default::default() },
            SimulationConfig { world_radius: Some(-1.0), ..Default::default() },
            SimulationConfig {
                friction: CategoryTable { massive: 1.5, controlled: 0.98, ambient: 0.99 },
                ..Default::default()
            },
            SimulationConfig {
                fallback_bounds: Rect::new(0.0, 0.0, 0.0, 10.0),
                ..Default::default()
            },
        ];
        for cfg in bad {
            assert!(
                matches!(cfg.to_parameters(), Err(ConfigError::Invalid { .. })),
                "accepted {cfg:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_bodies() {
        let text = "bodies:\n  - { x: [1.0], radius: 1.0, category: ambient }\n";
        let err = ScenarioConfig::from_yaml_str(text).unwrap().to_bodies().unwrap_err();
        assert!(err.to_string().contains("bodies[0].x"), "{err}");

        let text = "bodies:\n  - { id: 3, x: [0.0, 0.0], radius: 1.0, category: ambient }\n  - { id: 3, x: [5.0, 0.0], radius: 1.0, category: ambient }\n";
        let err = ScenarioConfig::from_yaml_str(text).unwrap().to_bodies().unwrap_err();
        assert!(err.to_string().contains("duplicate id 3"), "{err}");

        let text = "bodies:\n  - { x: [0.0, 0.0], radius: -2.0, category: massive }\n";
        assert!(ScenarioConfig::from_yaml_str(text).unwrap().to_bodies().is_err());
    }

    #[test]
    fn implicit_ids_follow_the_largest_explicit_id() {
        let text = "bodies:\n  - { id: 1, x: [0.0, 0.0], radius: 1.0, category: ambient }\n  - { x: [5.0, 0.0], radius: 1.0, category: ambient }\n  - { id: 4, x: [9.0, 0.0], radius: 1.0, category: ambient }\n  - { x: [2.0, 0.0], radius: 1.0, category: ambient }\n";
        let bodies = ScenarioConfig::from_yaml_str(text).unwrap().to_bodies().unwrap();
        let ids: Vec<u64> = bodies.iter().map(|b| b.id.0).collect();
        assert_eq!(ids, vec![1, 5, 4, 6]);

        let text = "bodies:\n  - { x: [0.0, 0.0], radius: 1.0, category: ambient }\n  - { x: [5.0, 0.0], radius: 1.0, category: ambient }\n";
        let bodies = ScenarioConfig::from_yaml_str(text).unwrap().to_bodies().unwrap();
        assert_eq!((bodies[0].id, bodies[1].id), (BodyId(0), BodyId(1)));
    }

    #[test]
    fn implicit_id_after_max_id_is_rejected() {
        let text = format!(
            "bodies:\n  - {{ id: {}, x: [0.0, 0.0], radius: 1.0, category: ambient }}\n  - {{ x: [5.0, 0.0], radius: 1.0, category: ambient }}\n",
            u64::MAX
        );
        let err = ScenarioConfig::from_yaml_str(&text).unwrap().to_bodies().unwrap_err();
        assert!(err.to_string().contains("bodies[1].id"), "{err}");
    }

    #[test]
    fn partial_category_tables_keep_defaults() {
        let text = "simulation:\n  mass_weight: { massive: 0.6 }\n  friction: { controlled: 0.9 }\n";
        let params = ScenarioConfig::from_yaml_str(text).unwrap().simulation.to_parameters().unwrap();

        assert_eq!(params.mass_weight, CategoryTable { massive: 0.6, controlled: 0.1, ambient: 0.1 });
        assert_eq!(params.friction, CategoryTable { massive: 0.99, controlled: 0.9, ambient: 0.99 });

        let err = ScenarioConfig::from_yaml_str("simulation: { friction: { heavy: 0.5 } }").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn unknown_keys_are_yaml_errors() {
        let err = ScenarioConfig::from_yaml_str("simulation: { thetta: 0.5 }").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}

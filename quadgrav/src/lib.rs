pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, BodyId, Category, System, NVec2};
pub use simulation::params::{Parameters, CategoryTable, world_radius_for_viewport};
pub use simulation::bounds::{Rect, Quadrant};
pub use simulation::barnes_hut::{Quadtree, QuadNode, TreeBody, point_mass_pull, SINGULARITY_GUARD};
pub use simulation::forces::{Acceleration, BarnesHutGravity, DirectGravity, GravityKind, GravityModel, tree_body};
pub use simulation::integrator::{semi_implicit_euler, reflect_at_boundary, IntegrationReport};
pub use simulation::engine::{Engine, StepReport};
pub use simulation::scenario::{Scenario, RunSummary, scattered_system};

pub use configuration::config::{ScenarioConfig, SimulationConfig, BodyConfig, ViewportConfig};
pub use configuration::error::ConfigError;

pub use benchmark::benchmark::{bench_gravity, bench_step_curve};

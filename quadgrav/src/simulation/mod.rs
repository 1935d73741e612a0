pub mod states;
pub mod params;
pub mod bounds;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod scenario;
pub mod barnes_hut;

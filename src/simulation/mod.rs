pub mod states;
pub mod params;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod freestream;
pub mod evaluator;
pub mod sfs;
pub mod viscous;
pub mod relaxation;
pub mod integrator;
pub mod scenario;

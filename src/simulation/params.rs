//! Numerical parameters for a scenario run
//!
//! `Parameters` holds the runtime settings: time step and number of steps.
//! The freestream lives on the field itself.

#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // step size
    pub nsteps: usize, // steps to run
}

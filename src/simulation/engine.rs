//! High-level runtime engine settings
//!
//! Selects the time-stepping scheme and how often the driver relaxes

use super::integrator::Scheme;

#[derive(Debug, Clone)]
pub struct Engine {
    pub scheme: Scheme, // euler or rk3
    pub relax: bool, // false = never relax
    pub nsteps_relax: usize, // relax on every n-th step
}

impl Engine {
    /// Whether the step with zero-based index `step` relaxes
    pub fn relaxes_on(&self, step: usize) -> bool {
        self.relax && (step + 1) % self.nsteps_relax == 0
    }
}

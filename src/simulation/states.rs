//! Core state types for the vortex particle field.
//!
//! Defines:
//! - `Particle`      the per-particle record every stepper updates
//! - `ParticleField` the ordered particle collection plus the global
//!   simulation parameters (clock, freestream, kernel, formulation)
//! - `Formulation`   classic or reformulated (core-size evolving) VPM

use std::fmt;

use nalgebra::{Matrix3, Vector3};

use super::error::StepError;
use super::freestream::{Freestream, Uniform};
use super::kernel::{Kernel, RegularizationKernel};

pub type NVec3 = Vector3<f64>;
pub type NMat3 = Matrix3<f64>;

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: NVec3, // position
    pub gamma: NVec3, // vectorial circulation
    pub sigma: f64, // core size
    pub u: NVec3, // induced velocity (evaluator output)
    pub j: NMat3, // velocity gradient, j[(i, k)] = du_i/dx_k (evaluator output)
    pub c: f64, // SFS coefficient
    pub sfs: NVec3, // SFS vector
    pub vel_carry: NVec3, // RK3 low-storage register for position
    pub stretch_carry: NVec3, // RK3 low-storage register for circulation
    pub sigma_carry: f64, // RK3 low-storage register for core size (reformulated)
    pub diffusion_carry: f64, // RK3 low-storage register for core spreading
}

impl Particle {
    /// New particle with every derived quantity and register zeroed
    pub fn new(x: NVec3, gamma: NVec3, sigma: f64) -> Self {
        Self {
            x,
            gamma,
            sigma,
            u: NVec3::zeros(),
            j: NMat3::zeros(),
            c: 0.0,
            sfs: NVec3::zeros(),
            vel_carry: NVec3::zeros(),
            stretch_carry: NVec3::zeros(),
            sigma_carry: 0.0,
            diffusion_carry: 0.0,
        }
    }

    /// Local vorticity recovered from the antisymmetric part of the Jacobian
    pub fn vorticity(&self) -> NVec3 {
        let j = &self.j;
        NVec3::new(
            j[(2, 1)] - j[(1, 2)],
            j[(0, 2)] - j[(2, 0)],
            j[(1, 0)] - j[(0, 1)],
        )
    }
}

/// VPM formulation bound to a field.
///
/// `Reformulated` also evolves the core size through the factor `Z`, driven
/// by the parameters `f` and `g`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formulation {
    Classic,
    Reformulated { f: f64, g: f64 },
}

impl Formulation {
    /// Reformulated VPM with the usual parameters (f = 0, g = 1/5)
    pub fn rvpm() -> Self {
        Formulation::Reformulated { f: 0.0, g: 0.2 }
    }

    pub fn kind(&self) -> FormulationKind {
        match self {
            Formulation::Classic => FormulationKind::Classic,
            Formulation::Reformulated { .. } => FormulationKind::Reformulated,
        }
    }
}

/// Formulation tag without its parameters, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulationKind {
    Classic,
    Reformulated,
}

impl fmt::Display for FormulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulationKind::Classic => write!(f, "classic"),
            FormulationKind::Reformulated => write!(f, "reformulated"),
        }
    }
}

pub struct ParticleField {
    pub particles: Vec<Particle>, // ordered collection of particles
    pub t: f64, // time, advanced by the caller
    pub freestream: Box<dyn Freestream>,
    pub kernel: Box<dyn RegularizationKernel>,
    pub transposed: bool, // stretching contraction: false -> J*Γ, true -> J^T*Γ
    pub formulation: Formulation,
}

impl ParticleField {
    /// Empty field at t = 0 with no freestream, the Winckelmans kernel and the
    /// transposed stretching scheme
    pub fn new(formulation: Formulation) -> Self {
        Self {
            particles: Vec::new(),
            t: 0.0,
            freestream: Box::new(Uniform(NVec3::zeros())),
            kernel: Box::new(Kernel::Winckelmans),
            transposed: true,
            formulation,
        }
    }

    pub fn with_kernel(mut self, kernel: impl RegularizationKernel + 'static) -> Self {
        self.kernel = Box::new(kernel);
        self
    }

    pub fn with_freestream(mut self, freestream: impl Freestream + 'static) -> Self {
        self.freestream = Box::new(freestream);
        self
    }

    pub fn with_transposed(mut self, transposed: bool) -> Self {
        self.transposed = transposed;
        self
    }

    pub fn add_particle(&mut self, x: NVec3, gamma: NVec3, sigma: f64) {
        self.particles.push(Particle::new(x, gamma, sigma));
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    /// Zero velocity and Jacobian on every particle
    pub fn reset_kinematics(&mut self) {
        for p in self.particles.iter_mut() {
            p.u = NVec3::zeros();
            p.j = NMat3::zeros();
        }
    }

    /// Zero the SFS vector on every particle
    pub fn reset_sfs(&mut self) {
        for p in self.particles.iter_mut() {
            p.sfs = NVec3::zeros();
        }
    }

    /// Zero the low-storage Runge-Kutta registers on every particle
    pub fn reset_carries(&mut self) {
        for p in self.particles.iter_mut() {
            p.vel_carry = NVec3::zeros();
            p.stretch_carry = NVec3::zeros();
            p.sigma_carry = 0.0;
            p.diffusion_carry = 0.0;
        }
    }

    pub fn total_circulation(&self) -> NVec3 {
        self.particles.iter().fold(NVec3::zeros(), |acc, p| acc + p.gamma)
    }

    pub fn mean_sigma(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(|p| p.sigma).sum::<f64>() / self.particles.len() as f64
    }

    /// First particle whose position, circulation or core size went non-finite
    pub fn check_finite(&self) -> Result<(), StepError> {
        for (index, p) in self.particles.iter().enumerate() {
            let finite = p.x.iter().all(|v| v.is_finite())
                && p.gamma.iter().all(|v| v.is_finite())
                && p.sigma.is_finite();
            if !finite {
                return Err(StepError::NumericDegeneracy { index });
            }
        }
        Ok(())
    }
}

//! Viscous diffusion operators
//!
//! Called once per Euler step (`stage = None`) and once per RK3 stage with
//! that stage's coefficients

use super::error::BoxError;
use super::integrator::StageCoefficients;
use super::states::ParticleField;

pub trait ViscousDiffusion: Send + Sync {
    fn apply(
        &self,
        field: &mut ParticleField,
        dt: f64,
        stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError>;
}

/// No diffusion
#[derive(Debug, Clone, Copy, Default)]
pub struct Inviscid;

impl ViscousDiffusion for Inviscid {
    fn apply(
        &self,
        _field: &mut ParticleField,
        _dt: f64,
        _stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Core spreading: every core grows as d(σ²)/dt = 2ν
///
/// Across RK3 stages the increment goes through each particle's
/// `diffusion_carry` register, so the three stages add exactly `2ν dt` to σ²
#[derive(Debug, Clone, Copy)]
pub struct CoreSpreading {
    pub nu: f64, // kinematic viscosity
}

impl CoreSpreading {
    pub fn new(nu: f64) -> Self {
        Self { nu }
    }
}

impl ViscousDiffusion for CoreSpreading {
    fn apply(
        &self,
        field: &mut ParticleField,
        dt: f64,
        stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError> {
        let rate = 2.0 * self.nu;

        for p in field.particles.iter_mut() {
            let increment = match stage {
                None => rate * dt,
                Some(StageCoefficients { a, b }) => {
                    p.diffusion_carry = a * p.diffusion_carry + dt * rate;
                    b * p.diffusion_carry
                }
            };
            p.sigma = (p.sigma * p.sigma + increment).sqrt();
        }
        Ok(())
    }
}

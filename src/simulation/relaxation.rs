//! Relaxation: realign each particle's circulation with the local vorticity
//!
//! Keeps the particle field close to divergence free. The vorticity is read
//! from the particle's Jacobian, so callers evaluate before relaxing.

use super::error::BoxError;
use super::states::Particle;

pub trait Relaxation: Send + Sync {
    fn relax(&self, p: &mut Particle) -> Result<(), BoxError>;
}

/// Pedrizzetti relaxation: Γ ← (1 - r) Γ + r |Γ| ω̂
#[derive(Debug, Clone, Copy)]
pub struct Pedrizzetti {
    pub factor: f64, // relaxation factor r in [0, 1]
}

impl Relaxation for Pedrizzetti {
    fn relax(&self, p: &mut Particle) -> Result<(), BoxError> {
        let omega = p.vorticity();
        let nrm_omega = omega.norm();
        if nrm_omega == 0.0 { // no direction to align with
            return Ok(());
        }
        let nrm_gamma = p.gamma.norm();
        p.gamma = (1.0 - self.factor) * p.gamma + self.factor * nrm_gamma * omega / nrm_omega;
        Ok(())
    }
}

/// Pedrizzetti relaxation rescaled so |Γ| is preserved
#[derive(Debug, Clone, Copy)]
pub struct CorrectedPedrizzetti {
    pub factor: f64,
}

impl Relaxation for CorrectedPedrizzetti {
    fn relax(&self, p: &mut Particle) -> Result<(), BoxError> {
        let omega = p.vorticity();
        let nrm_omega = omega.norm();
        let nrm_gamma = p.gamma.norm();
        if nrm_omega == 0.0 || nrm_gamma == 0.0 {
            return Ok(());
        }

        let r = self.factor;
        let gamma_hat = p.gamma / nrm_gamma;
        let omega_hat = omega / nrm_omega;

        // |(1 - r) Γ̂ + r ω̂|²
        let b2 = 1.0 - 2.0 * (1.0 - r) * r * (1.0 - gamma_hat.dot(&omega_hat));
        p.gamma = nrm_gamma * ((1.0 - r) * gamma_hat + r * omega_hat) / b2.sqrt();
        Ok(())
    }
}

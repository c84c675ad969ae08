//! Regularization kernels
//!
//! A kernel smooths the singular Biot-Savart law over the particle core.
//! With `ρ = r/σ` each kernel provides:
//! - `zeta(ρ)`    the normalized vorticity distribution
//! - `g(ρ)`       the fraction of circulation enclosed within `ρ`
//! - `dg/dρ`      which satisfies `dg/dρ = 4π ρ² ζ(ρ)`
//!
//! The steppers only need `zeta(0)`, used to scale the SFS term.

use std::f64::consts::PI;

pub trait RegularizationKernel: Send + Sync {
    fn zeta(&self, rho: f64) -> f64;

    /// `(g(ρ), dg/dρ(ρ))`
    fn g_dgdr(&self, rho: f64) -> (f64, f64);

    fn normalization_at_zero(&self) -> f64 {
        self.zeta(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// Unsmoothed point vortex
    Singular,
    /// g = 1 - exp(-ρ³)
    Gaussian,
    /// High-order algebraic kernel of Winckelmans & Leonard
    Winckelmans,
}

impl RegularizationKernel for Kernel {
    fn zeta(&self, rho: f64) -> f64 {
        match self {
            Kernel::Singular => {
                if rho == 0.0 { 1.0 } else { 0.0 }
            }
            Kernel::Gaussian => 3.0 / (4.0 * PI) * (-rho * rho * rho).exp(),
            Kernel::Winckelmans => 7.5 / (4.0 * PI) / (rho * rho + 1.0).powf(3.5),
        }
    }

    fn g_dgdr(&self, rho: f64) -> (f64, f64) {
        match self {
            Kernel::Singular => (1.0, 0.0),
            Kernel::Gaussian => {
                let rho2 = rho * rho;
                let e = (-rho2 * rho).exp();
                (1.0 - e, 3.0 * rho2 * e)
            }
            Kernel::Winckelmans => {
                let rho2 = rho * rho;
                let aux = rho2 + 1.0;
                let g = rho2 * rho * (rho2 + 2.5) / aux.powf(2.5);
                let dg = 7.5 * rho2 / aux.powf(3.5);
                (g, dg)
            }
        }
    }
}

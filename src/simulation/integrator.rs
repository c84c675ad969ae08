//! Fixed-step time integrators for the vortex particle field
//!
//! Provides first-order explicit Euler and a three-stage low-storage
//! Runge-Kutta scheme, each for the classic and the reformulated VPM.
//! All four are driven by the collaborators held in `TimeIntegrator`
//! (evaluator, SFS model, diffusion, relaxation) and never touch `field.t`:
//! the caller advances the clock.

use rayon::prelude::*;
use tracing::debug;

use super::error::StepError;
use super::evaluator::{DirectEvaluator, EvaluatorConfig, VelocityJacobianEvaluator};
use super::relaxation::{CorrectedPedrizzetti, Relaxation};
use super::sfs::{NoSfs, SubfilterScaleModel};
use super::states::{FormulationKind, Formulation, NMat3, NVec3, Particle, ParticleField};
use super::viscous::{Inviscid, ViscousDiffusion};

/// Coefficients of one low-storage Runge-Kutta stage:
/// `q = a q + dt f(y)`, `y = y + b q`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageCoefficients {
    pub a: f64,
    pub b: f64,
}

/// Williamson's third-order low-storage scheme
pub const RK3_STAGES: [StageCoefficients; 3] = [
    StageCoefficients { a: 0.0, b: 1.0 / 3.0 },
    StageCoefficients { a: -5.0 / 9.0, b: 15.0 / 16.0 },
    StageCoefficients { a: -153.0 / 128.0, b: 8.0 / 15.0 },
];

/// Time-stepping scheme selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Euler,
    Rk3,
}

/// Stretching term `(Γ·∇)u`.
/// - classic:    S_i = Σ_k J[i][k] Γ_k
/// - transposed: S_i = Σ_k J[k][i] Γ_k
pub fn stretching(j: &NMat3, gamma: &NVec3, transposed: bool) -> NVec3 {
    if transposed {
        j.transpose() * gamma
    } else {
        j * gamma
    }
}

/// Core-size factor Z of the reformulated VPM.
///
/// `Z = [ (f+g)/(1+3f) (S·Γ) - f/(1+3f) (E·Γ) ] / |Γ|²` where `E` is the SFS
/// term. Zero circulation is not guarded: the division yields NaN.
pub fn z_factor(f: f64, g: f64, s: &NVec3, sfs_term: &NVec3, gamma: &NVec3) -> f64 {
    let denom = 1.0 + 3.0 * f;
    ((f + g) / denom * s.dot(gamma) - f / denom * sfs_term.dot(gamma)) / gamma.norm_squared()
}

/// SFS contribution `C · SFS · σ³ / ζ(0)`
fn sfs_term(sfs: &dyn SubfilterScaleModel, p: &Particle, zeta0: f64) -> NVec3 {
    let sigma3 = p.sigma * p.sigma * p.sigma;
    sfs.coefficient(p) * sfs.direction(p) * (sigma3 / zeta0)
}

/// Ensure the field is bound to the classic formulation
fn require_classic(field: &ParticleField, scheme: &'static str) -> Result<(), StepError> {
    match field.formulation {
        Formulation::Classic => Ok(()),
        other => Err(StepError::ConfigurationMismatch {
            scheme,
            expected: FormulationKind::Classic,
            found: other.kind(),
        }),
    }
}

/// Ensure the field is bound to the reformulated formulation, returning (f, g)
fn require_reformulated(
    field: &ParticleField,
    scheme: &'static str,
) -> Result<(f64, f64), StepError> {
    match field.formulation {
        Formulation::Reformulated { f, g } => Ok((f, g)),
        other => Err(StepError::ConfigurationMismatch {
            scheme,
            expected: FormulationKind::Reformulated,
            found: other.kind(),
        }),
    }
}

/// Steppers plus the collaborators they drive
pub struct TimeIntegrator {
    evaluator: Box<dyn VelocityJacobianEvaluator>,
    sfs: Box<dyn SubfilterScaleModel>,
    diffusion: Box<dyn ViscousDiffusion>,
    relaxation: Box<dyn Relaxation>,
}

impl Default for TimeIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeIntegrator {
    /// Direct evaluator, no SFS model, inviscid, corrected Pedrizzetti relaxation (r = 0.3)
    pub fn new() -> Self {
        Self {
            evaluator: Box::new(DirectEvaluator),
            sfs: Box::new(NoSfs),
            diffusion: Box::new(Inviscid),
            relaxation: Box::new(CorrectedPedrizzetti { factor: 0.3 }),
        }
    }

    pub fn with_evaluator(mut self, evaluator: impl VelocityJacobianEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_sfs(mut self, sfs: impl SubfilterScaleModel + 'static) -> Self {
        self.sfs = Box::new(sfs);
        self
    }

    pub fn with_diffusion(mut self, diffusion: impl ViscousDiffusion + 'static) -> Self {
        self.diffusion = Box::new(diffusion);
        self
    }

    pub fn with_relaxation(mut self, relaxation: impl Relaxation + 'static) -> Self {
        self.relaxation = Box::new(relaxation);
        self
    }

    /// Advance by `dt` with `scheme`, picking the variant that matches the
    /// field's formulation
    pub fn step(
        &self,
        field: &mut ParticleField,
        scheme: Scheme,
        dt: f64,
        relax: bool,
        evaluator: Option<&dyn VelocityJacobianEvaluator>,
    ) -> Result<(), StepError> {
        match (scheme, field.formulation.kind()) {
            (Scheme::Euler, FormulationKind::Classic) => {
                self.euler_classic(field, dt, relax, evaluator)
            }
            (Scheme::Euler, FormulationKind::Reformulated) => {
                self.euler_reformulated(field, dt, relax, evaluator)
            }
            (Scheme::Rk3, FormulationKind::Classic) => {
                self.rk3_classic(field, dt, relax, evaluator)
            }
            (Scheme::Rk3, FormulationKind::Reformulated) => {
                self.rk3_reformulated(field, dt, relax, evaluator)
            }
        }
    }

    /// Advance a classic-VPM field by one explicit Euler step.
    ///
    /// x += dt (U + U∞), Γ += dt (S - E); relaxes each particle right after its
    /// update when `relax` is set, then applies diffusion
    pub fn euler_classic(
        &self,
        field: &mut ParticleField,
        dt: f64,
        relax: bool,
        evaluator: Option<&dyn VelocityJacobianEvaluator>,
    ) -> Result<(), StepError> {
        require_classic(field, "euler_classic")?;
        debug!(n = field.len(), dt, relax, "euler classic step");

        let config = EvaluatorConfig::euler(self.sfs.enabled());
        self.evaluate(field, config, None, evaluator)?;

        let uinf = field.freestream.velocity_at(field.t).map_err(StepError::Freestream)?;
        let zeta0 = field.kernel.normalization_at_zero();
        let transposed = field.transposed;

        let sfs = self.sfs.as_ref();
        let relaxation = self.relaxation.as_ref();
        field.particles.par_iter_mut().try_for_each(|p| -> Result<(), StepError> {
            let s = stretching(&p.j, &p.gamma, transposed);
            let e = sfs_term(sfs, p, zeta0);

            p.x += dt * (p.u + uinf);
            p.gamma += dt * s - dt * e;

            if relax {
                relaxation.relax(p).map_err(StepError::Relaxation)?;
            }
            Ok(())
        })?;

        self.diffusion.apply(field, dt, None).map_err(StepError::Diffusion)
    }

    /// Advance a reformulated-VPM field by one explicit Euler step.
    ///
    /// As `euler_classic`, with the core-size factor Z:
    /// Γ += dt (S - 3 Z Γ - E), σ -= dt σ Z
    pub fn euler_reformulated(
        &self,
        field: &mut ParticleField,
        dt: f64,
        relax: bool,
        evaluator: Option<&dyn VelocityJacobianEvaluator>,
    ) -> Result<(), StepError> {
        let (f, g) = require_reformulated(field, "euler_reformulated")?;
        debug!(n = field.len(), dt, relax, f, g, "euler reformulated step");

        let config = EvaluatorConfig::euler(self.sfs.enabled());
        self.evaluate(field, config, None, evaluator)?;

        let uinf = field.freestream.velocity_at(field.t).map_err(StepError::Freestream)?;
        let zeta0 = field.kernel.normalization_at_zero();
        let transposed = field.transposed;

        let sfs = self.sfs.as_ref();
        let relaxation = self.relaxation.as_ref();
        field.particles.par_iter_mut().try_for_each(|p| -> Result<(), StepError> {
            let s = stretching(&p.j, &p.gamma, transposed);
            let e = sfs_term(sfs, p, zeta0);
            let z = z_factor(f, g, &s, &e, &p.gamma);

            p.x += dt * (p.u + uinf);
            p.gamma += dt * (s - 3.0 * z * p.gamma - e);
            p.sigma -= dt * p.sigma * z;

            if relax {
                relaxation.relax(p).map_err(StepError::Relaxation)?;
            }
            Ok(())
        })?;

        self.diffusion.apply(field, dt, None).map_err(StepError::Diffusion)
    }

    /// Advance a classic-VPM field by one low-storage RK3 step.
    ///
    /// Per stage (a, b):
    /// q_x = a q_x + dt (U + U∞),  x += b q_x
    /// q_Γ = a q_Γ + dt (S - E),   Γ += b q_Γ
    pub fn rk3_classic(
        &self,
        field: &mut ParticleField,
        dt: f64,
        relax: bool,
        evaluator: Option<&dyn VelocityJacobianEvaluator>,
    ) -> Result<(), StepError> {
        require_classic(field, "rk3_classic")?;
        debug!(n = field.len(), dt, relax, "rk3 classic step");

        // Registers start from zero no matter what a previous call left behind
        field.reset_carries();

        for (i, stage) in RK3_STAGES.iter().copied().enumerate() {
            let StageCoefficients { a, b } = stage;
            debug!(stage = i, a, b, "rk3 classic stage");

            self.evaluate(field, EvaluatorConfig::RK3_STAGE, Some(stage), evaluator)?;

            let uinf = field.freestream.velocity_at(field.t).map_err(StepError::Freestream)?;
            let zeta0 = field.kernel.normalization_at_zero();
            let transposed = field.transposed;

            let sfs = self.sfs.as_ref();
            field.particles.par_iter_mut().for_each(|p| {
                // Position
                p.vel_carry = a * p.vel_carry + dt * (p.u + uinf);
                p.x += b * p.vel_carry;

                // Circulation
                let s = stretching(&p.j, &p.gamma, transposed);
                let e = sfs_term(sfs, p, zeta0);
                p.stretch_carry = a * p.stretch_carry + dt * (s - e);
                p.gamma += b * p.stretch_carry;
            });

            self.diffusion.apply(field, dt, Some(stage)).map_err(StepError::Diffusion)?;
        }

        if relax {
            self.relax_field(field, evaluator)?;
        }
        Ok(())
    }

    /// Advance a reformulated-VPM field by one low-storage RK3 step.
    ///
    /// As `rk3_classic`, with the core size carried through its own register:
    /// q_Γ = a q_Γ + dt (S - 3 Z Γ - E),  Γ += b q_Γ
    /// q_σ = a q_σ - dt σ Z,              σ += b q_σ
    pub fn rk3_reformulated(
        &self,
        field: &mut ParticleField,
        dt: f64,
        relax: bool,
        evaluator: Option<&dyn VelocityJacobianEvaluator>,
    ) -> Result<(), StepError> {
        let (f, g) = require_reformulated(field, "rk3_reformulated")?;
        debug!(n = field.len(), dt, relax, f, g, "rk3 reformulated step");

        field.reset_carries();

        for (i, stage) in RK3_STAGES.iter().copied().enumerate() {
            let StageCoefficients { a, b } = stage;
            debug!(stage = i, a, b, "rk3 reformulated stage");

            self.evaluate(field, EvaluatorConfig::RK3_STAGE, Some(stage), evaluator)?;

            let uinf = field.freestream.velocity_at(field.t).map_err(StepError::Freestream)?;
            let zeta0 = field.kernel.normalization_at_zero();
            let transposed = field.transposed;

            let sfs = self.sfs.as_ref();
            field.particles.par_iter_mut().for_each(|p| {
                // Position
                p.vel_carry = a * p.vel_carry + dt * (p.u + uinf);
                p.x += b * p.vel_carry;

                // Stretching and Z from the pre-update state
                let s = stretching(&p.j, &p.gamma, transposed);
                let e = sfs_term(sfs, p, zeta0);
                let z = z_factor(f, g, &s, &e, &p.gamma);

                p.stretch_carry = a * p.stretch_carry + dt * (s - 3.0 * z * p.gamma - e);
                p.sigma_carry = a * p.sigma_carry - dt * p.sigma * z;

                p.gamma += b * p.stretch_carry;
                p.sigma += b * p.sigma_carry;
            });

            self.diffusion.apply(field, dt, Some(stage)).map_err(StepError::Diffusion)?;
        }

        if relax {
            self.relax_field(field, evaluator)?;
        }
        Ok(())
    }

    // helpers ==============================================================================

    /// SFS pre-hook, evaluator (override if given), SFS post-hook
    fn evaluate(
        &self,
        field: &mut ParticleField,
        config: EvaluatorConfig,
        stage: Option<StageCoefficients>,
        evaluator: Option<&dyn VelocityJacobianEvaluator>,
    ) -> Result<(), StepError> {
        let evaluator = evaluator.unwrap_or(self.evaluator.as_ref());

        self.sfs.before_evaluation(field, stage).map_err(StepError::Sfs)?;
        evaluator.evaluate(field, config).map_err(StepError::Evaluator)?;
        self.sfs.after_evaluation(field, stage).map_err(StepError::Sfs)
    }

    /// End-of-step relaxation for RK3: one more evaluation on the final
    /// state, then every particle is relaxed exactly once
    fn relax_field(
        &self,
        field: &mut ParticleField,
        evaluator: Option<&dyn VelocityJacobianEvaluator>,
    ) -> Result<(), StepError> {
        let evaluator = evaluator.unwrap_or(self.evaluator.as_ref());

        field.reset_kinematics();
        evaluator.evaluate(field, EvaluatorConfig::RELAXATION).map_err(StepError::Evaluator)?;

        let relaxation = self.relaxation.as_ref();
        field
            .particles
            .par_iter_mut()
            .try_for_each(|p| relaxation.relax(p).map_err(StepError::Relaxation))
    }
}

//! Subfilter-scale (SFS) turbulence closures
//!
//! The steppers call `before_evaluation` and `after_evaluation` around every
//! velocity evaluation, then read `coefficient` and `direction` per particle
//! to build the SFS term `C · SFS · σ³ / ζ(0)`

use super::error::BoxError;
use super::integrator::StageCoefficients;
use super::states::{NVec3, Particle, ParticleField};

pub trait SubfilterScaleModel: Send + Sync {
    /// Whether the evaluator should feed the SFS accumulators on Euler steps
    fn enabled(&self) -> bool;

    fn before_evaluation(
        &self,
        field: &mut ParticleField,
        stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError>;

    fn after_evaluation(
        &self,
        field: &mut ParticleField,
        stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError>;

    fn coefficient(&self, p: &Particle) -> f64 {
        p.c
    }

    fn direction(&self, p: &Particle) -> NVec3 {
        p.sfs
    }
}

/// No closure: C is forced to zero
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSfs;

impl SubfilterScaleModel for NoSfs {
    fn enabled(&self) -> bool {
        false
    }

    fn before_evaluation(
        &self,
        _field: &mut ParticleField,
        _stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    fn after_evaluation(
        &self,
        _field: &mut ParticleField,
        _stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    fn coefficient(&self, _p: &Particle) -> f64 {
        0.0
    }
}

/// Constant model coefficient written to every particle after evaluation
#[derive(Debug, Clone, Copy)]
pub struct ConstantSfs {
    pub coefficient: f64,
    pub clipping: bool, // zero C where the closure would inject energy (backscatter)
}

impl SubfilterScaleModel for ConstantSfs {
    fn enabled(&self) -> bool {
        true
    }

    fn before_evaluation(
        &self,
        _field: &mut ParticleField,
        _stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    fn after_evaluation(
        &self,
        field: &mut ParticleField,
        _stage: Option<StageCoefficients>,
    ) -> Result<(), BoxError> {
        for p in field.particles.iter_mut() {
            p.c = self.coefficient;
            if self.clipping && p.c * p.gamma.dot(&p.sfs) < 0.0 {
                p.c = 0.0;
            }
        }
        Ok(())
    }
}

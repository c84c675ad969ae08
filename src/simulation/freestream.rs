//! Freestream velocity sources

use super::error::BoxError;
use super::states::NVec3;

/// Background velocity added to the induced velocity of every particle
pub trait Freestream: Send + Sync {
    fn velocity_at(&self, t: f64) -> Result<NVec3, BoxError>;
}

/// Constant freestream
#[derive(Debug, Clone, Copy)]
pub struct Uniform(pub NVec3);

impl Freestream for Uniform {
    fn velocity_at(&self, _t: f64) -> Result<NVec3, BoxError> {
        Ok(self.0)
    }
}

/// Freestream given by a function of time
pub struct TimeVarying<F>(pub F);

impl<F> Freestream for TimeVarying<F>
where
    F: Fn(f64) -> NVec3 + Send + Sync,
{
    fn velocity_at(&self, t: f64) -> Result<NVec3, BoxError> {
        Ok((self.0)(t))
    }
}

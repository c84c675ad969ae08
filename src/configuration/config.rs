//! Configuration types for loading particle-field scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – scheme, formulation, kernel and collaborator options
//! - [`ParametersConfig`] – time step, step count and freestream
//! - [`ParticleConfig`]   – initial state for each particle
//! - [`RingConfig`]       – optional generator for a thin vortex ring
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! ```yaml
//! engine:
//!   integrator: "rk3"             # or "euler"
//!   formulation: "reformulated"   # or "classic"
//!   f: 0.0
//!   g: 0.2
//!   transposed: true
//!   kernel: "winckelmans"         # "singular", "gaussian" or "winckelmans"
//!   relaxation: "corrected"       # "none", "pedrizzetti" or "corrected"
//!   relaxation_factor: 0.3
//!   nsteps_relax: 1
//!   sfs_coefficient: 0.1          # omit for no SFS model
//!   sfs_clipping: true
//!   viscosity: 1.0e-3             # omit for inviscid
//!
//! parameters:
//!   dt: 0.01
//!   nsteps: 100
//!   uinf: [ 0.0, 0.0, 0.0 ]
//!
//! particles:
//!   - x: [ 0.0, 0.0, 0.0 ]
//!     gamma: [ 0.0, 0.0, 1.0 ]
//!     sigma: 0.1
//!
//! ring:
//!   radius: 1.0
//!   circulation: 1.0
//!   n: 64
//!   sigma: 0.1
//!   center: [ 0.0, 0.0, 0.0 ]
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Which time-stepping scheme the engine uses
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // First-order explicit Euler, one evaluation per step
    Euler,

    #[serde(rename = "rk3")] // Third-order low-storage Runge-Kutta, three evaluations per step
    Rk3,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulationConfig {
    #[serde(rename = "classic")]
    Classic,

    #[serde(rename = "reformulated")] // also evolves the core size, see `f` and `g`
    Reformulated,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelConfig {
    #[serde(rename = "singular")]
    Singular,
    #[serde(rename = "gaussian")]
    Gaussian,
    #[serde(rename = "winckelmans")]
    Winckelmans,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationConfig {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "pedrizzetti")]
    Pedrizzetti,
    #[serde(rename = "corrected")] // Pedrizzetti, rescaled to keep |Γ|
    Corrected,
}

/// Engine-level configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // time-stepping scheme
    pub formulation: FormulationConfig, // classic or reformulated VPM
    pub f: Option<f64>, // reformulated parameter f, default 0
    pub g: Option<f64>, // reformulated parameter g, default 1/5
    pub transposed: Option<bool>, // stretching contraction, default true
    pub kernel: Option<KernelConfig>, // default winckelmans
    pub relaxation: Option<RelaxationConfig>, // default none
    pub relaxation_factor: Option<f64>, // in [0, 1], default 0.3
    pub nsteps_relax: Option<usize>, // relax every n steps, default 1
    pub sfs_coefficient: Option<f64>, // constant SFS coefficient, none -> no SFS model
    pub sfs_clipping: Option<bool>, // clip backscatter, default true
    pub viscosity: Option<f64>, // kinematic viscosity for core spreading, none/0 -> inviscid
}

/// Global numerical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64, // time step size
    pub nsteps: usize, // number of steps to run
    pub uinf: Option<[f64; 3]>, // uniform freestream, default zero
}

/// Initial state of a single particle
#[derive(Deserialize, Debug, Clone)]
pub struct ParticleConfig {
    pub x: [f64; 3], // position
    pub gamma: [f64; 3], // vectorial circulation
    pub sigma: f64, // core size
}

/// Thin vortex ring in the x-y plane, discretized into `n` particles
#[derive(Deserialize, Debug, Clone)]
pub struct RingConfig {
    pub radius: f64,
    pub circulation: f64,
    pub n: usize,
    pub sigma: f64,
    pub center: Option<[f64; 3]>,
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub particles: Vec<ParticleConfig>,
    pub ring: Option<RingConfig>,
}

/// Invalid values in a scenario
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("time step must be positive, got {0}")]
    NonPositiveStep(f64),

    #[error("core size of particle {index} must be positive, got {sigma}")]
    NonPositiveSigma { index: usize, sigma: f64 },

    #[error("scenario defines no particles")]
    NoParticles,

    #[error("ring needs at least one particle and a positive radius")]
    InvalidRing,

    #[error("parameters f and g only apply to the reformulated formulation")]
    UnexpectedReformulatedParameters,

    #[error("nsteps_relax must be at least 1")]
    ZeroRelaxInterval,

    #[error("relaxation factor must lie in [0, 1], got {0}")]
    InvalidRelaxationFactor(f64),
}

//! Build fully-initialized scenarios from configuration and run them
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime `Scenario`
//! containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the particle field at t = 0 (`ParticleField`)
//! - the integrator with its collaborators (`TimeIntegrator`)

use std::f64::consts::PI;

use tracing::{debug, info};

use crate::configuration::config::{
    ConfigError, FormulationConfig, IntegratorConfig, KernelConfig, RelaxationConfig, RingConfig,
    ScenarioConfig,
};
use crate::simulation::engine::Engine;
use crate::simulation::error::StepError;
use crate::simulation::freestream::Uniform;
use crate::simulation::integrator::{Scheme, TimeIntegrator};
use crate::simulation::kernel::Kernel;
use crate::simulation::params::Parameters;
use crate::simulation::relaxation::{CorrectedPedrizzetti, Pedrizzetti};
use crate::simulation::sfs::ConstantSfs;
use crate::simulation::states::{Formulation, NVec3, Particle, ParticleField};
use crate::simulation::viscous::CoreSpreading;

/// Runtime bundle constructed from a [`ScenarioConfig`]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub field: ParticleField,
    pub integrator: TimeIntegrator,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        let e_cfg = cfg.engine;
        let p_cfg = cfg.parameters;

        if !(p_cfg.dt > 0.0) {
            return Err(ConfigError::NonPositiveStep(p_cfg.dt));
        }

        // Particles: explicit list first, then the optional ring
        let mut particles: Vec<Particle> = cfg
            .particles
            .iter()
            .map(|pc| Particle::new(pc.x.into(), pc.gamma.into(), pc.sigma))
            .collect();
        if let Some(ring) = &cfg.ring {
            particles.extend(ring_particles(ring)?);
        }
        if particles.is_empty() {
            return Err(ConfigError::NoParticles);
        }
        for (index, p) in particles.iter().enumerate() {
            if !(p.sigma > 0.0) {
                return Err(ConfigError::NonPositiveSigma { index, sigma: p.sigma });
            }
        }

        let formulation = match e_cfg.formulation {
            FormulationConfig::Classic => {
                if e_cfg.f.is_some() || e_cfg.g.is_some() {
                    return Err(ConfigError::UnexpectedReformulatedParameters);
                }
                Formulation::Classic
            }
            FormulationConfig::Reformulated => Formulation::Reformulated {
                f: e_cfg.f.unwrap_or(0.0),
                g: e_cfg.g.unwrap_or(0.2),
            },
        };

        let kernel = match e_cfg.kernel.unwrap_or(KernelConfig::Winckelmans) {
            KernelConfig::Singular => Kernel::Singular,
            KernelConfig::Gaussian => Kernel::Gaussian,
            KernelConfig::Winckelmans => Kernel::Winckelmans,
        };

        let uinf: NVec3 = p_cfg.uinf.unwrap_or([0.0; 3]).into();
        let mut field = ParticleField::new(formulation)
            .with_kernel(kernel)
            .with_freestream(Uniform(uinf))
            .with_transposed(e_cfg.transposed.unwrap_or(true));
        field.particles = particles;

        let parameters = Parameters {
            dt: p_cfg.dt,
            nsteps: p_cfg.nsteps,
        };

        // Engine (runtime) from EngineConfig
        let relaxation = e_cfg.relaxation.unwrap_or(RelaxationConfig::None);
        let nsteps_relax = e_cfg.nsteps_relax.unwrap_or(1);
        if nsteps_relax == 0 {
            return Err(ConfigError::ZeroRelaxInterval);
        }
        let engine = Engine {
            scheme: match e_cfg.integrator {
                IntegratorConfig::Euler => Scheme::Euler,
                IntegratorConfig::Rk3 => Scheme::Rk3,
            },
            relax: relaxation != RelaxationConfig::None,
            nsteps_relax,
        };

        // Integrator: direct evaluator plus the configured collaborators
        let factor = e_cfg.relaxation_factor.unwrap_or(0.3);
        if !(0.0..=1.0).contains(&factor) {
            return Err(ConfigError::InvalidRelaxationFactor(factor));
        }
        let mut integrator = TimeIntegrator::new();
        integrator = match relaxation {
            RelaxationConfig::None => integrator, // never relaxes, keep the default
            RelaxationConfig::Pedrizzetti => integrator.with_relaxation(Pedrizzetti { factor }),
            RelaxationConfig::Corrected => {
                integrator.with_relaxation(CorrectedPedrizzetti { factor })
            }
        };
        if let Some(coefficient) = e_cfg.sfs_coefficient {
            integrator = integrator.with_sfs(ConstantSfs {
                coefficient,
                clipping: e_cfg.sfs_clipping.unwrap_or(true),
            });
        }
        if let Some(nu) = e_cfg.viscosity.filter(|nu| *nu > 0.0) {
            integrator = integrator.with_diffusion(CoreSpreading::new(nu));
        }

        Ok(Self {
            engine,
            parameters,
            field,
            integrator,
        })
    }

    /// Advance by one step and move the clock forward
    pub fn step(&mut self, step: usize) -> Result<(), StepError> {
        let relax = self.engine.relaxes_on(step);
        self.integrator
            .step(&mut self.field, self.engine.scheme, self.parameters.dt, relax, None)?;
        self.field.t += self.parameters.dt;
        self.field.check_finite()
    }

    /// Run all configured steps
    pub fn run(&mut self) -> Result<(), StepError> {
        let nsteps = self.parameters.nsteps;
        let report_every = (nsteps / 10).max(1);
        info!(
            particles = self.field.len(),
            nsteps,
            dt = self.parameters.dt,
            scheme = ?self.engine.scheme,
            formulation = %self.field.formulation.kind(),
            "starting run"
        );

        for step in 0..nsteps {
            self.step(step)?;

            let gamma = self.field.total_circulation();
            debug!(step, t = self.field.t, gamma = %gamma.norm(), "step done");
            if (step + 1) % report_every == 0 {
                info!(
                    step = step + 1,
                    t = self.field.t,
                    total_circulation = %gamma.norm(),
                    mean_sigma = self.field.mean_sigma(),
                    "progress"
                );
            }
        }
        Ok(())
    }
}

/// Particles of a thin ring in the x-y plane, circulation along the tangent
fn ring_particles(ring: &RingConfig) -> Result<Vec<Particle>, ConfigError> {
    if ring.n == 0 || !(ring.radius > 0.0) {
        return Err(ConfigError::InvalidRing);
    }
    let center: NVec3 = ring.center.unwrap_or([0.0; 3]).into();
    let dl = 2.0 * PI * ring.radius / ring.n as f64; // arc length per particle

    Ok((0..ring.n)
        .map(|k| {
            let theta = 2.0 * PI * k as f64 / ring.n as f64;
            let (s, c) = theta.sin_cos();
            let x = center + ring.radius * NVec3::new(c, s, 0.0);
            let gamma = ring.circulation * dl * NVec3::new(-s, c, 0.0);
            Particle::new(x, gamma, ring.sigma)
        })
        .collect())
}

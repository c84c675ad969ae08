pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Particle, ParticleField, Formulation, FormulationKind, NVec3, NMat3};
pub use simulation::error::{StepError, BoxError};
pub use simulation::evaluator::{VelocityJacobianEvaluator, EvaluatorConfig, DirectEvaluator};
pub use simulation::integrator::{
    stretching, z_factor, Scheme, StageCoefficients, TimeIntegrator, RK3_STAGES,
};
pub use simulation::kernel::{Kernel, RegularizationKernel};
pub use simulation::freestream::{Freestream, Uniform, TimeVarying};
pub use simulation::sfs::{SubfilterScaleModel, NoSfs, ConstantSfs};
pub use simulation::viscous::{ViscousDiffusion, Inviscid, CoreSpreading};
pub use simulation::relaxation::{Relaxation, Pedrizzetti, CorrectedPedrizzetti};
pub use simulation::scenario::Scenario;

pub use configuration::config::{
    ConfigError, EngineConfig, IntegratorConfig, ParametersConfig, ParticleConfig, RingConfig,
    ScenarioConfig,
};

pub use benchmark::benchmark::bench_steppers;

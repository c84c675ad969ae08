//! Error taxonomy for the stepping functions
//!
//! Collaborators (evaluator, SFS model, freestream, diffusion, relaxation)
//! report failures as a boxed error; the steppers wrap it in the variant
//! naming the collaborator and return it unchanged otherwise

use thiserror::Error;

use super::states::FormulationKind;

/// Boxed error returned by collaborator implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StepError {
    /// Stepper invoked on a field bound to another formulation
    #[error("{scheme} requires a {expected} field, but the field is {found}")]
    ConfigurationMismatch {
        scheme: &'static str,
        expected: FormulationKind,
        found: FormulationKind,
    },

    /// Particle state went non-finite (e.g. zero circulation in the reformulated Z factor)
    #[error("particle {index} has a non-finite position, circulation or core size")]
    NumericDegeneracy { index: usize },

    #[error("velocity/Jacobian evaluator failed")]
    Evaluator(#[source] BoxError),

    #[error("subfilter-scale model failed")]
    Sfs(#[source] BoxError),

    #[error("freestream evaluation failed")]
    Freestream(#[source] BoxError),

    #[error("viscous diffusion failed")]
    Diffusion(#[source] BoxError),

    #[error("relaxation failed")]
    Relaxation(#[source] BoxError),
}

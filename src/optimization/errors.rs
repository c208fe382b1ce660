//! optimization::errors — one error surface for the least-squares stack.
//!
//! Residual models, option constructors and the Argmin runner all report
//! through [`OptError`]. Errors raised inside Argmin callbacks travel as
//! boxed `argmin::core::Error` values; [`From<Error>`] recovers an embedded
//! `OptError` unchanged and classifies genuine Argmin failures as
//! [`OptError::Solver`].
use argmin::core::{ArgminError, Error};

/// Result alias for the optimization layer.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Parameters ----
    /// `θ` has the wrong number of entries for the model.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// A fitted parameter is not finite.
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    /// The solver finished without a best parameter vector.
    MissingThetaHat,

    // ---- Residual model ----
    /// Residual vector length differs from the observation count.
    ResidualLengthMismatch { expected: usize, found: usize },

    /// A residual is `NaN` or infinite.
    NonFiniteResidual { index: usize, value: f64 },

    /// Sum of squared residuals is not finite.
    NonFiniteCost { value: f64 },

    // ---- Derivatives ----
    /// The model has no analytic Jacobian; finite differences take over.
    GradientNotImplemented,

    GradientDimMismatch { expected: usize, found: usize },

    InvalidGradient { index: usize, value: f64, reason: &'static str },

    /// Jacobian is not `(n_residuals, n_params)`.
    JacobianDimMismatch { expected: (usize, usize), found: (usize, usize) },

    InvalidJacobian { row: usize, col: usize, value: f64 },

    // ---- Configuration ----
    InvalidTolGrad { tol: f64, reason: &'static str },
    InvalidTolCost { tol: f64, reason: &'static str },
    InvalidMaxIter { max_iter: usize, reason: &'static str },
    /// Neither a gradient nor a cost tolerance was given.
    NoTolerancesProvided,
    InvalidLineSearch { name: String, reason: &'static str },
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Solver ----
    /// Argmin failed; `kind` names the Argmin error class.
    Solver { kind: &'static str, text: String },

    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Parameters ----
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector has {actual} entries, model expects {expected}")
            }
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Fitted parameter {index} is {value}: {reason}")
            }
            OptError::MissingThetaHat => write!(f, "Solver returned no parameter estimate"),

            // ---- Residual model ----
            OptError::ResidualLengthMismatch { expected, found } => {
                write!(f, "Expected {expected} residuals, got {found}")
            }
            OptError::NonFiniteResidual { index, value } => {
                write!(f, "Residual {index} is not finite: {value}")
            }
            OptError::NonFiniteCost { value } => {
                write!(f, "Sum of squared residuals is not finite: {value}")
            }

            // ---- Derivatives ----
            OptError::GradientNotImplemented => write!(f, "No analytic Jacobian available"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has {found} entries, expected {expected}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Gradient entry {index} is {value}: {reason}")
            }
            OptError::JacobianDimMismatch { expected, found } => {
                write!(f, "Jacobian shape {found:?} does not match {expected:?}")
            }
            OptError::InvalidJacobian { row, col, value } => {
                write!(f, "Jacobian entry ({row}, {col}) is not finite: {value}")
            }

            // ---- Configuration ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Gradient tolerance {tol} rejected: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Cost tolerance {tol} rejected: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Iteration limit {max_iter} rejected: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one of the gradient or cost tolerances is required")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Unknown line search '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "L-BFGS memory {mem} rejected: {reason}")
            }

            // ---- Solver ----
            OptError::Solver { kind, text } => write!(f, "Solver error ({kind}): {text}"),
            OptError::UnknownError => write!(f, "Unknown optimization error"),
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(embedded) => return embedded,
            Err(err) => err,
        };
        let argmin_err = match err.downcast::<ArgminError>() {
            Ok(argmin_err) => argmin_err,
            Err(other) => return OptError::Solver { kind: "backend", text: other.to_string() },
        };
        let (kind, text) = match argmin_err {
            ArgminError::InvalidParameter { text } => ("invalid parameter", text),
            ArgminError::NotImplemented { text } => ("not implemented", text),
            ArgminError::NotInitialized { text } => ("not initialized", text),
            ArgminError::ConditionViolated { text } => ("condition violated", text),
            ArgminError::CheckpointNotFound { text } => ("checkpoint not found", text),
            ArgminError::PotentialBug { text } => ("potential bug", text),
            ArgminError::ImpossibleError { text } => ("impossible", text),
            _ => return OptError::UnknownError,
        };
        OptError::Solver { kind, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Errors raised by the residual model travel through argmin as boxed
    // errors and must come back out as the original variant.
    fn opt_error_round_trips_through_argmin_error() {
        // Arrange
        let original = OptError::NonFiniteResidual { index: 3, value: f64::INFINITY };
        let boxed: Error = original.clone().into();

        // Act
        let recovered = OptError::from(boxed);

        // Assert
        assert_eq!(recovered, original);
    }

    #[test]
    fn argmin_errors_are_classified_by_kind() {
        let err: Error = ArgminError::ConditionViolated { text: "wolfe".to_string() }.into();
        assert_eq!(
            OptError::from(err),
            OptError::Solver { kind: "condition violated", text: "wolfe".to_string() }
        );
    }
}

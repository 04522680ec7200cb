//! Unified error surface for likelihood evaluation and MLE runs.
//!
//! Every fallible path in the optimizer, the penalty guard, and the model
//! layer returns [`OptResult<T>`]. Backend (`argmin`) errors are folded into
//! [`OptError`] through `From<argmin::core::Error>`, and linear-algebra
//! failures through `From<LinalgError>`, so callers never see raw backend
//! error types.
use argmin::core::{ArgminError, Error};

use crate::linalg::errors::LinalgError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Optional model roles ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// The model has no fused value+gradient evaluator.
    FusedNotImplemented,

    /// The model has no random-draw routine.
    DrawNotImplemented {
        model: String,
    },

    /// Parameters handed to a random draw are outside the family's domain.
    InvalidDrawParam {
        model: String,
        reason: &'static str,
    },

    // ---- Gradient ----
    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Shapes and data ----
    /// Parameter vector length differs from the model's parameter count.
    DimensionMismatch {
        expected: usize,
        found: usize,
    },

    /// A data cell is unusable for the model.
    InvalidData {
        row: usize,
        col: usize,
        value: f64,
        reason: &'static str,
    },

    /// The data matrix has the wrong number of columns for the model.
    DataShapeMismatch {
        expected_cols: usize,
        found_cols: usize,
    },

    /// The data matrix has no rows or no columns.
    EmptyData,

    // ---- Domain ----
    /// Parameter outside the model's analytic domain. Raised only by raw
    /// model evaluation; the guarded evaluator converts domain exits into
    /// penalty values before a model is ever called there.
    DomainViolation {
        axis: usize,
        value: f64,
        limit: f64,
    },

    /// Unconstrained optimization input must have finite values.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    // ---- MLEOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// Invalid optimization method name.
    InvalidMethod {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    /// Initial simplex step must be positive and finite.
    InvalidStepSize {
        step: f64,
        reason: &'static str,
    },

    /// Convergence patience must be at least one iteration.
    InvalidPatience {
        patience: usize,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    /// The driver could not produce an estimate at all.
    EstimationFailure {
        reason: String,
    },

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Finite Diffs ----
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },

    /// Hessian values need to be finite.
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Linear algebra ----
    Linalg(LinalgError),

    // ---- Fallback ----
    UnknownError,
}

impl OptError {
    /// Whether the error describes the caller's inputs (shape, data,
    /// configuration) rather than a breakdown inside the solver.
    ///
    /// Input errors are returned to the caller as `Err`; everything else
    /// raised during a solver run is reported as a failed outcome.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OptError::DimensionMismatch { .. }
                | OptError::InvalidData { .. }
                | OptError::DataShapeMismatch { .. }
                | OptError::EmptyData
                | OptError::InvalidTolGrad { .. }
                | OptError::InvalidTolCost { .. }
                | OptError::InvalidMaxIter { .. }
                | OptError::NoTolerancesProvided
                | OptError::InvalidLineSearch { .. }
                | OptError::InvalidMethod { .. }
                | OptError::InvalidLBFGSMem { .. }
                | OptError::InvalidStepSize { .. }
                | OptError::InvalidPatience { .. }
        )
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Optional model roles ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::FusedNotImplemented => {
                write!(f, "Fused value and gradient evaluation not implemented")
            }
            OptError::DrawNotImplemented { model } => {
                write!(f, "Random draws are not implemented for the {model} model")
            }
            OptError::InvalidDrawParam { model, reason } => {
                write!(f, "Invalid {model} draw parameters: {reason}")
            }

            // ---- Gradient ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- Shapes and data ----
            OptError::DimensionMismatch { expected, found } => {
                write!(f, "Parameter dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidData { row, col, value, reason } => {
                write!(f, "Invalid data at ({row}, {col}): {value}: {reason}")
            }
            OptError::DataShapeMismatch { expected_cols, found_cols } => {
                write!(f, "Data must have {expected_cols} columns, found {found_cols}")
            }
            OptError::EmptyData => {
                write!(f, "Data matrix is empty")
            }

            // ---- Domain ----
            OptError::DomainViolation { axis, value, limit } => {
                write!(f, "Parameter {axis} = {value} is outside the model domain (limit {limit})")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidMethod { name, reason } => {
                write!(f, "Invalid optimization method '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            OptError::InvalidStepSize { step, reason } => {
                write!(f, "Invalid step size {step}: {reason}")
            }
            OptError::InvalidPatience { patience, reason } => {
                write!(f, "Invalid convergence patience {patience}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }
            OptError::EstimationFailure { reason } => {
                write!(f, "Estimation failed: {reason}")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Finite Diffs ----
            OptError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Linear algebra ----
            OptError::Linalg(err) => {
                write!(f, "Linear algebra error: {err}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Our own errors travel through argmin boxed; unwrap them first.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<LinalgError> for OptError {
    fn from(err: LinalgError) -> Self {
        OptError::Linalg(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // An `OptError` boxed into `argmin::core::Error` (as happens when a cost
    // function fails inside a solver) must come back out unchanged.
    fn opt_error_round_trips_through_argmin_error() {
        let boxed: Error = OptError::NonFiniteCost { value: f64::INFINITY }.into();

        let back = OptError::from(boxed);

        assert_eq!(back, OptError::NonFiniteCost { value: f64::INFINITY });
    }

    #[test]
    fn argmin_condition_violation_maps_to_wrapper_variant() {
        let boxed: Error = ArgminError::ConditionViolated { text: "line search".into() }.into();

        match OptError::from(boxed) {
            OptError::ConditionViolated { text } => assert_eq!(text, "line search"),
            other => panic!("Expected ConditionViolated, got {other:?}"),
        }
    }

    #[test]
    fn input_errors_are_classified_separately_from_solver_failures() {
        assert!(OptError::DimensionMismatch { expected: 2, found: 1 }.is_input_error());
        assert!(OptError::EmptyData.is_input_error());
        assert!(!OptError::NonFiniteCost { value: f64::NAN }.is_input_error());
        assert!(!OptError::ConditionViolated { text: String::new() }.is_input_error());
    }

    #[test]
    fn linalg_errors_convert_into_opt_error() {
        let err: OptError = LinalgError::NotSquare { rows: 2, cols: 3 }.into();

        assert_eq!(err, OptError::Linalg(LinalgError::NotSquare { rows: 2, cols: 3 }));
        assert!(err.to_string().contains("2 x 3"));
    }
}

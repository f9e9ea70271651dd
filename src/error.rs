//! Error type shared by functions, operators and the envelope cache

use std::fmt;

use thiserror::Error;

/// An operation that a [`Function`](crate::function::Function), a
/// [`LinearOperator`](crate::linop::LinearOperator) or the
/// [`FBCache`](crate::prox::FBCache) may be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Value,
    Gradient,
    ConjugateValue,
    ConjugateGradient,
    Prox,
    FbeGradient,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Value => "value",
            Operation::Gradient => "gradient",
            Operation::ConjugateValue => "conjugate value",
            Operation::ConjugateGradient => "conjugate gradient",
            Operation::Prox => "proximal operator",
            Operation::FbeGradient => "envelope gradient",
        };
        f.write_str(name)
    }
}

/// An error returned by any evaluation in this crate.
///
/// This enum is marked `#[non_exhaustive]` and may include additional variants
/// in future releases.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The callee does not implement the requested capability.
    #[error("{operation} is not defined for `{name}`")]
    UndefinedOperation {
        name: &'static str,
        operation: Operation,
    },
    /// Two shapes that must agree do not.
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    /// A scalar parameter is outside its admissible range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// A factorization or a triangular solve failed.
    #[error("linear solver failure: {0}")]
    SolverFailure(String),
}

/// A result type alias used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn undefined(name: &'static str, operation: Operation) -> Self {
        Error::UndefinedOperation { name, operation }
    }
}

/// Fails with [`Error::DimensionMismatch`] unless `found == expected`.
pub(crate) fn check_dim(context: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            context,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_operation() {
        let err = Error::undefined("Quadratic", Operation::Prox);
        assert_eq!(
            err.to_string(),
            "proximal operator is not defined for `Quadratic`"
        );
    }

    #[test]
    fn check_dim_reports_both_sizes() {
        assert!(check_dim("offset", 3, 3).is_ok());
        assert_eq!(
            check_dim("offset", 3, 4),
            Err(Error::DimensionMismatch {
                context: "offset",
                expected: 3,
                found: 4
            })
        );
    }
}

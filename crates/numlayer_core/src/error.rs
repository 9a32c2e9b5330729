use crate::capability::Capability;
use crate::synth::{Operator, Signature};
use std::any::type_name;
use thiserror::Error;

pub type Result<T, E = NumericError> = std::result::Result<T, E>;

/// Outcome of the conversion bridge. Failures are values, never panics.
pub type ConversionResult<B> = std::result::Result<B, ConversionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("value of `{from}` does not fit in `{to}`")]
    OutOfRange {
        from: &'static str,
        to: &'static str,
    },
    #[error("cannot parse {input:?} as `{to}`")]
    Parse { to: &'static str, input: String },
    #[error("no conversion from `{from}` to `{to}`")]
    NoPath {
        from: &'static str,
        to: &'static str,
    },
}

impl ConversionError {
    pub fn out_of_range<A, B>() -> Self {
        ConversionError::OutOfRange {
            from: type_name::<A>(),
            to: type_name::<B>(),
        }
    }

    pub fn no_path<A, B>() -> Self {
        ConversionError::NoPath {
            from: type_name::<A>(),
            to: type_name::<B>(),
        }
    }
}

/// Why the generic fallback could not build a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("`{type_name}` exposes no `{operator}` operator")]
    MissingOperator {
        type_name: &'static str,
        operator: Operator,
    },
    #[error("`{operator}` operator exposed on `{type_name}` does not have the {expected} signature")]
    SignatureMismatch {
        type_name: &'static str,
        operator: Operator,
        expected: Signature,
    },
    #[error("operator synthesis is disabled and `{type_name}` has no registered or primitive provider")]
    Disabled { type_name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("`{type_name}` does not support the {capability} layer (`{operation}`)")]
    Unsupported {
        type_name: &'static str,
        capability: Capability,
        operation: &'static str,
    },
    #[error("no numeric provider for `{type_name}`: {cause}")]
    Resolution {
        type_name: &'static str,
        #[source]
        cause: SynthesisError,
    },
    #[error("`{operation}` is undefined: {reason}")]
    Domain {
        operation: &'static str,
        reason: &'static str,
    },
    #[error("enumeration of `{type_name}` starts after its end")]
    Range { type_name: &'static str },
    #[error("`{operation}` overflowed `{type_name}`")]
    Overflow {
        type_name: &'static str,
        operation: &'static str,
    },
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("numeric provider for `{type_name}` is already resolved")]
    AlreadyResolved { type_name: &'static str },
    #[error("`{operation}` needs the `{operator}` operator, which `{type_name}` does not expose")]
    MissingOperator {
        type_name: &'static str,
        operator: Operator,
        operation: &'static str,
    },
}

impl NumericError {
    pub fn unsupported<T>(capability: Capability, operation: &'static str) -> Self {
        NumericError::Unsupported {
            type_name: type_name::<T>(),
            capability,
            operation,
        }
    }

    pub fn overflow<T>(operation: &'static str) -> Self {
        NumericError::Overflow {
            type_name: type_name::<T>(),
            operation,
        }
    }

    pub fn division_by_zero(operation: &'static str) -> Self {
        NumericError::Domain {
            operation,
            reason: "division by zero",
        }
    }

    pub fn missing_operator<T>(operator: Operator, operation: &'static str) -> Self {
        NumericError::MissingOperator {
            type_name: type_name::<T>(),
            operator,
            operation,
        }
    }

    pub fn range<T>() -> Self {
        NumericError::Range {
            type_name: type_name::<T>(),
        }
    }
}

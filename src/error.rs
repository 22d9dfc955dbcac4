use crate::payload::PayloadField;
use std::fmt;

/// Reason a raw field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    /// The text could not be read as the field's numeric type.
    Unparsable,
    /// The value parsed but is exactly zero.
    Zero,
    /// The value parsed but is negative.
    NotPositive,
    /// NaN or infinite.
    NotFinite,
    /// Outside the closed interval `[min, max]`.
    OutOfRange { min: f64, max: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Unparsable => write!(f, "not a number of the expected type"),
            Violation::Zero => write!(f, "must not be zero"),
            Violation::NotPositive => write!(f, "must be greater than zero"),
            Violation::NotFinite => write!(f, "must be a finite number"),
            Violation::OutOfRange { min, max } => write!(f, "must lie within [{min}, {max}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    field: PayloadField,
    raw: String,
    violation: Violation,
}

impl ValidationError {
    pub fn new(field: PayloadField, raw: impl Into<String>, violation: Violation) -> Self {
        Self { field, raw: raw.into(), violation }
    }

    #[cfg(test)]
    pub fn field(&self) -> PayloadField { self.field }
    #[cfg(test)]
    pub fn violation(&self) -> Violation { self.violation }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}': {}", self.field, self.raw, self.violation)
    }
}

impl std::error::Error for ValidationError {}

/// Why a request clashes with the deployment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    DeploymentActive,
    PayloadCommitted(u16),
}

/// Every failure a deployer operation can report to its caller.
///
/// All variants except [`DeployerError::Allocation`] leave registry and session
/// untouched and may be retried with corrected input.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployerError {
    Validation(ValidationError),
    DuplicateIndex(u16),
    NotFound(u16),
    UnknownField(String),
    StateConflict(Conflict),
    Allocation { capacity: usize },
}

impl fmt::Display for DeployerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployerError::Validation(e) => write!(f, "{e}"),
            DeployerError::DuplicateIndex(i) => write!(f, "payload with index {i} already exists"),
            DeployerError::NotFound(i) => write!(f, "no payload with index {i}"),
            DeployerError::UnknownField(name) => write!(f, "unknown payload field '{name}'"),
            DeployerError::StateConflict(Conflict::DeploymentActive) => {
                write!(f, "deployment already in progress")
            }
            DeployerError::StateConflict(Conflict::PayloadCommitted(i)) => {
                write!(f, "payload {i} is committed to the active deployment")
            }
            DeployerError::Allocation { capacity } => {
                write!(f, "payload storage exhausted ({capacity} items)")
            }
        }
    }
}

impl std::error::Error for DeployerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeployerError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for DeployerError {
    fn from(value: ValidationError) -> Self { DeployerError::Validation(value) }
}

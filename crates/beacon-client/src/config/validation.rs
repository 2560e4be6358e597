//! Configuration validation utilities

use beacon_core::BeaconError;

/// Configuration validation result
pub type ValidationResult = Result<(), ValidationErrors>;

/// A single configuration rule violation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Value is below its minimum
    #[error("Field '{field}' must be at least {min} (got {actual})")]
    TooSmall {
        /// Offending field
        field: String,
        /// Smallest accepted value
        min: u64,
        /// Value found
        actual: u64,
    },
    /// Custom validation failed
    #[error("Field '{field}': {message}")]
    Custom {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

/// Every violation found by one validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// Number of violations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no violations
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for BeaconError {
    fn from(errors: ValidationErrors) -> Self {
        let joined = errors
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        BeaconError::config(joined)
    }
}

/// Accumulates rule violations so all of them are reported at once
#[derive(Debug, Default)]
pub struct ConfigValidator {
    errors: Vec<ValidationError>,
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `value >= min`
    pub fn at_least(&mut self, field: &str, value: u64, min: u64) -> &mut Self {
        if value < min {
            self.errors.push(ValidationError::TooSmall {
                field: field.to_string(),
                min,
                actual: value,
            });
        }
        self
    }

    /// Validate using a custom predicate
    pub fn custom<T, F>(&mut self, field: &str, value: &T, predicate: F, message: &str) -> &mut Self
    where
        F: FnOnce(&T) -> bool,
    {
        if !predicate(value) {
            self.errors.push(ValidationError::Custom {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
        self
    }

    /// Finish validation
    pub fn result(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

//! Shape and range checks applied to price updates before they reach the
//! detection engine. The engine assumes its input already passed these.

use std::fmt;

use thiserror::Error;

use crate::models::PriceUpdate;

/// Longest symbol identifier accepted by the pipeline.
pub const MAX_SYMBOL_LEN: usize = 10;

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; "))]
pub struct ValidationError {
    pub violations: Vec<RuleViolation>,
}

/// Check a price update against every rule, collecting all violations.
pub fn validate(update: &PriceUpdate) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    if update.symbol.is_empty() {
        violations.push(RuleViolation {
            field: "symbol",
            message: "must not be empty",
        });
    }
    if update.symbol.len() > MAX_SYMBOL_LEN {
        violations.push(RuleViolation {
            field: "symbol",
            message: "must be at most 10 characters",
        });
    }
    if !update.price.is_finite() {
        violations.push(RuleViolation {
            field: "price",
            message: "must be a finite number",
        });
    } else if update.price <= 0.0 {
        violations.push(RuleViolation {
            field: "price",
            message: "must be greater than zero",
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

pub fn is_valid(update: &PriceUpdate) -> bool {
    validate(update).is_ok()
}

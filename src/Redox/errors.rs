//! Error kinds of the parser and of the balancing stages.
//!
//! Parsing errors keep the literal wording shown to the user by the shell,
//! balancing errors carry the numbers that made a stage give up.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RedoxError {
    /// no `->` separator, or more than one
    #[error("Format reaksi salah, harus dengan tanda \"->\"")]
    Format,
    #[error("Reaktan atau produk tidak boleh kosong")]
    EmptyOperand,
    #[error("invalid species notation: {0}")]
    InvalidSpecies(String),
    #[error("unknown element {element} in {species}")]
    UnknownElement { species: String, element: String },
    /// no element of the species received an oxidation state
    #[error("Spesies tidak dikenali: {0}")]
    UnrecognizedSpecies(String),
    #[error("inexact division {numerator} / {denominator} while {context}")]
    InexactDivision {
        numerator: i64,
        denominator: i64,
        context: String,
    },
    #[error("oxidation states of {species} sum to {found}, but its charge is {expected}")]
    ChargeMismatch {
        species: String,
        expected: i64,
        found: i64,
    },
    #[error("conflicting coefficients for {species}: {first} and {second}")]
    CoefficientConflict {
        species: String,
        first: i64,
        second: i64,
    },
    /// a coefficient or electron count left the range of `i64`
    #[error("integer overflow while {0}")]
    Overflow(String),
    #[error("{0}")]
    Unbalanceable(String),
}

impl RedoxError {
    /// Errors raised before any balancing stage runs.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            RedoxError::Format
                | RedoxError::EmptyOperand
                | RedoxError::InvalidSpecies(_)
                | RedoxError::UnknownElement { .. }
        )
    }

    /// Integer arithmetic of the half-reaction method did not work out;
    /// the exact linear solver may still find coefficients.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            RedoxError::InexactDivision { .. }
                | RedoxError::ChargeMismatch { .. }
                | RedoxError::CoefficientConflict { .. }
                | RedoxError::Overflow(_)
        )
    }
}

/// Exact integer division, failing with `InexactDivision` on a remainder.
pub fn exact_div(numerator: i64, denominator: i64, context: &str) -> Result<i64, RedoxError> {
    match numerator.checked_rem(denominator) {
        Some(0) => numerator
            .checked_div(denominator)
            .ok_or_else(|| RedoxError::Overflow(context.to_string())),
        Some(_) => Err(RedoxError::InexactDivision {
            numerator,
            denominator,
            context: context.to_string(),
        }),
        // i64::MIN / -1
        None if denominator != 0 => Err(RedoxError::Overflow(context.to_string())),
        None => Err(RedoxError::InexactDivision {
            numerator,
            denominator,
            context: context.to_string(),
        }),
    }
}

pub fn checked_mul(a: i64, b: i64, context: &str) -> Result<i64, RedoxError> {
    a.checked_mul(b)
        .ok_or_else(|| RedoxError::Overflow(context.to_string()))
}

pub fn checked_add(a: i64, b: i64, context: &str) -> Result<i64, RedoxError> {
    a.checked_add(b)
        .ok_or_else(|| RedoxError::Overflow(context.to_string()))
}

pub fn checked_sub(a: i64, b: i64, context: &str) -> Result<i64, RedoxError> {
    a.checked_sub(b)
        .ok_or_else(|| RedoxError::Overflow(context.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_messages_are_verbatim() {
        assert_eq!(
            RedoxError::Format.to_string(),
            "Format reaksi salah, harus dengan tanda \"->\""
        );
        assert_eq!(
            RedoxError::EmptyOperand.to_string(),
            "Reaktan atau produk tidak boleh kosong"
        );
        assert_eq!(
            RedoxError::UnrecognizedSpecies("xyz".to_string()).to_string(),
            "Spesies tidak dikenali: xyz"
        );
    }

    #[test]
    fn test_exact_div() {
        assert_eq!(exact_div(12, 4, "test"), Ok(3));
        assert_eq!(exact_div(-6, 3, "test"), Ok(-2));
        assert!(matches!(
            exact_div(8, 3, "solving Fe"),
            Err(RedoxError::InexactDivision {
                numerator: 8,
                denominator: 3,
                ..
            })
        ));
        assert!(exact_div(1, 0, "test").is_err());
        assert_eq!(
            exact_div(i64::MIN, -1, "negating"),
            Err(RedoxError::Overflow("negating".to_string()))
        );
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(checked_mul(4, 3, "test"), Ok(12));
        assert_eq!(checked_add(-4, 3, "test"), Ok(-1));
        assert_eq!(checked_sub(4, 3, "test"), Ok(1));
        assert_eq!(
            checked_mul(4_000_000_000, 3_999_999_999, "scaling"),
            Err(RedoxError::Overflow("scaling".to_string()))
        );
        assert!(checked_add(i64::MAX, 1, "test").is_err());
        assert!(checked_sub(i64::MIN, 1, "test").is_err());
        assert!(RedoxError::Overflow("x".to_string()).is_arithmetic());
    }

    #[test]
    fn test_error_classes() {
        assert!(RedoxError::Format.is_parse_error());
        assert!(!RedoxError::Format.is_arithmetic());
        let conflict = RedoxError::CoefficientConflict {
            species: "CO2".to_string(),
            first: 4,
            second: 7,
        };
        assert!(conflict.is_arithmetic());
        assert!(!RedoxError::Unbalanceable("x".to_string()).is_arithmetic());
    }
}

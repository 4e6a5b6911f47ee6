use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FinanceError, FinanceResult};

pub const INVALID_VALUE: &str = "Value must be a positive number";
pub const INVALID_RATE: &str = "Rate must be a positive number or zero";
pub const INVALID_PERIOD: &str = "Term must be a positive number";

/// Outcome of [`validate_financial_params`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Checks the basic parameters shared by every calculator.
///
/// `value` must be positive, `rate` must not be negative and `period` must be
/// positive. Every violation is reported, never just the first.
pub fn validate_financial_params(
    value: Decimal,
    rate: Decimal,
    period: Decimal,
) -> ValidationResult {
    let mut errors = Vec::new();

    if value <= Decimal::ZERO {
        errors.push(INVALID_VALUE.to_string());
    }
    if rate < Decimal::ZERO {
        errors.push(INVALID_RATE.to_string());
    }
    if period <= Decimal::ZERO {
        errors.push(INVALID_PERIOD.to_string());
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Same as [`validate_financial_params`], failing with
/// [`FinanceError::InvalidParameters`] when anything is wrong.
pub fn ensure_valid(value: Decimal, rate: Decimal, period: Decimal) -> FinanceResult<()> {
    let validation = validate_financial_params(value, rate, period);
    if validation.is_valid {
        Ok(())
    } else {
        tracing::debug!(errors = ?validation.errors, "rejected financial parameters");
        Err(FinanceError::InvalidParameters(validation.errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_params() {
        let result = validate_financial_params(dec!(1000), dec!(10), dec!(12));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_zero_rate_is_valid() {
        assert!(validate_financial_params(dec!(1000), dec!(0), dec!(12)).is_valid);
    }

    #[test]
    fn test_each_invalid_param_is_reported() {
        let result = validate_financial_params(dec!(-1000), dec!(10), dec!(12));
        assert_eq!(result.errors, vec![INVALID_VALUE.to_string()]);

        let result = validate_financial_params(dec!(1000), dec!(-10), dec!(12));
        assert_eq!(result.errors, vec![INVALID_RATE.to_string()]);

        let result = validate_financial_params(dec!(1000), dec!(10), dec!(0));
        assert_eq!(result.errors, vec![INVALID_PERIOD.to_string()]);
    }

    #[test]
    fn test_all_errors_collected() {
        let result = validate_financial_params(dec!(-1000), dec!(-10), dec!(-12));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_ensure_valid_carries_messages() {
        let err = ensure_valid(dec!(0), dec!(-1), dec!(12)).unwrap_err();
        assert_eq!(
            err,
            FinanceError::InvalidParameters(vec![
                INVALID_VALUE.to_string(),
                INVALID_RATE.to_string(),
            ])
        );
    }
}

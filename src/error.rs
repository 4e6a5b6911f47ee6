use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by the calculators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FinanceError {
    /// One or more basic parameters (value, rate, term) failed validation.
    /// Carries every violated constraint, not just the first one.
    #[error("Invalid parameters: {}", .0.join(", "))]
    InvalidParameters(Vec<String>),

    #[error(
        "Invalid down payment of {down_payment} for a property worth {property_value}: {reason}"
    )]
    InvalidDownPayment {
        property_value: Decimal,
        down_payment: Decimal,
        reason: String,
    },

    #[error("Invalid currency string: {0:?}")]
    InvalidCurrency(String),

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },
}

impl FinanceError {
    /// Messages to surface to the end user.
    pub fn messages(&self) -> Vec<String> {
        match self {
            FinanceError::InvalidParameters(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

pub type FinanceResult<T> = Result<T, FinanceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_parameters_lists_every_message() {
        let err = FinanceError::InvalidParameters(vec![
            "Value must be a positive number".to_string(),
            "Term must be a positive number".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid parameters: Value must be a positive number, Term must be a positive number"
        );
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn test_down_payment_message() {
        let err = FinanceError::InvalidDownPayment {
            property_value: dec!(100000),
            down_payment: dec!(120000),
            reason: "down payment must be lower than the property value".to_string(),
        };
        assert!(err.to_string().contains("120000"));
        assert_eq!(err.messages().len(), 1);
    }
}

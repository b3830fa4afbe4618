use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid principal: {principal} must be positive")]
    InvalidPrincipal {
        principal: Money,
    },

    #[error("invalid interest rate: {rate} must not be negative")]
    InvalidRate {
        rate: Rate,
    },

    #[error("invalid term: {term_months} months, at least one payment is required")]
    InvalidTerm {
        term_months: u32,
    },

    #[error("invalid month format: {input:?}, expected YYYY-MM")]
    InvalidMonthFormat {
        input: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: Uuid,
    },

    #[error("user not found: {id}")]
    UserNotFound {
        id: Uuid,
    },

    #[error("loan {loan_id} is already shared with user {user_id}")]
    AlreadyShared {
        loan_id: Uuid,
        user_id: Uuid,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoanError {
    /// http status an api layer should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            LoanError::LoanNotFound { .. } | LoanError::UserNotFound { .. } => 404,
            LoanError::InvalidMonthFormat { .. } => 400,
            LoanError::InvalidPrincipal { .. }
            | LoanError::InvalidRate { .. }
            | LoanError::InvalidTerm { .. }
            | LoanError::InvalidDate { .. } => 422,
            LoanError::AlreadyShared { .. } => 409,
            LoanError::CalculationError { .. }
            | LoanError::InvalidConfiguration { .. }
            | LoanError::Storage { .. }
            | LoanError::Serialization(_)
            | LoanError::Io(_) => 500,
        }
    }

    /// true when the caller sent something the engine cannot accept
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = LoanError::LoanNotFound { id: Uuid::new_v4() };
        assert_eq!(not_found.status_code(), 404);
        assert!(not_found.is_client_error());

        let bad_month = LoanError::InvalidMonthFormat { input: "2023/01".to_string() };
        assert_eq!(bad_month.status_code(), 400);

        let bad_term = LoanError::InvalidTerm { term_months: 0 };
        assert_eq!(bad_term.status_code(), 422);

        let storage = LoanError::Storage { message: "lock poisoned".to_string() };
        assert!(!storage.is_client_error());
    }

    #[test]
    fn test_messages() {
        let err = LoanError::InvalidMonthFormat { input: "jan".to_string() };
        assert_eq!(err.to_string(), "invalid month format: \"jan\", expected YYYY-MM");

        let err = LoanError::InvalidPrincipal { principal: Money::from_major(-5) };
        assert_eq!(err.to_string(), "invalid principal: -5 must be positive");
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::month::YearMonth;

/// longest accepted term, one hundred years of monthly payments
pub const MAX_TERM_MONTHS: u32 = 1_200;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a user
pub type UserId = Uuid;

/// fixed-rate, fixed-term loan terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// annual rate as a fraction, 0.05 for 5%
    pub annual_interest_rate: Rate,
    pub term_months: u32,
}

impl LoanTerms {
    /// create validated loan terms
    pub fn new(principal: Money, annual_interest_rate: Rate, term_months: u32) -> Result<Self> {
        let terms = Self {
            principal,
            annual_interest_rate,
            term_months,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// check principal, rate and term
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LoanError::InvalidPrincipal {
                principal: self.principal,
            });
        }

        if self.annual_interest_rate.is_negative() {
            return Err(LoanError::InvalidRate {
                rate: self.annual_interest_rate,
            });
        }

        if self.term_months == 0 || self.term_months > MAX_TERM_MONTHS {
            return Err(LoanError::InvalidTerm {
                term_months: self.term_months,
            });
        }

        Ok(())
    }
}

/// stored loan shared among one or more users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: LoanId,
    pub owner_ids: BTreeSet<UserId>,
    #[serde(flatten)]
    pub terms: LoanTerms,
    pub origination_date: NaiveDate,
    /// defaults to the origination date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl LoanRecord {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_ids.contains(&user_id)
    }

    pub fn origination_month(&self) -> YearMonth {
        YearMonth::of(self.origination_date)
    }

    /// date of payment 1, every later payment follows one calendar month apart
    pub fn first_payment_date(&self) -> NaiveDate {
        self.first_payment_date.unwrap_or(self.origination_date)
    }

    pub fn first_payment_month(&self) -> YearMonth {
        YearMonth::of(self.first_payment_date())
    }

    /// month of the last scheduled payment
    pub fn final_month(&self) -> YearMonth {
        self.first_payment_month()
            .plus_months(self.terms.term_months.saturating_sub(1))
    }
}

/// registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

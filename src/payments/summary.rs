use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::errors::Result;
use crate::month::YearMonth;
use crate::payments::amortization::{AmortizationSchedule, PaymentRecord};
use crate::types::{LoanId, LoanRecord};

/// point-in-time position of a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub loan_id: LoanId,
    pub as_of_month: YearMonth,
    pub current_balance: Money,
    pub cumulative_principal_paid: Money,
    pub cumulative_interest_paid: Money,
    pub payments_made: u32,
}

impl LoanSummary {
    /// summarize a loan through the given month
    pub fn compute(loan: &LoanRecord, as_of_month: YearMonth) -> Result<Self> {
        let schedule = AmortizationSchedule::for_loan(loan)?;
        Ok(Self::from_schedule(loan.id, &schedule, as_of_month))
    }

    /// summarize a loan through a `YYYY-MM` month string
    pub fn compute_for(loan: &LoanRecord, month: &str) -> Result<Self> {
        let as_of_month = YearMonth::parse(month)?;
        Self::compute(loan, as_of_month)
    }

    /// fold every payment dated on or before the cutoff month
    pub fn from_schedule(
        loan_id: LoanId,
        schedule: &AmortizationSchedule,
        as_of_month: YearMonth,
    ) -> Self {
        let mut summary = Self {
            loan_id,
            as_of_month,
            current_balance: schedule.terms.principal,
            cumulative_principal_paid: Money::ZERO,
            cumulative_interest_paid: Money::ZERO,
            payments_made: 0,
        };

        // schedule is sorted by month so the paid rows are a prefix
        for payment in schedule
            .payments
            .iter()
            .take_while(|p| p.year_month() <= as_of_month)
        {
            summary.apply(payment);
        }

        debug!(
            loan_id = %loan_id,
            as_of = %as_of_month,
            payments_made = summary.payments_made,
            balance = %summary.current_balance,
            "summarized loan"
        );

        summary
    }

    fn apply(&mut self, payment: &PaymentRecord) {
        self.cumulative_principal_paid += payment.principal_portion;
        self.cumulative_interest_paid += payment.interest_portion;
        self.current_balance = payment.remaining_balance;
        self.payments_made += 1;
    }

    /// copy with money fields rounded for display
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            current_balance: self.current_balance.round_dp(dp),
            cumulative_principal_paid: self.cumulative_principal_paid.round_dp(dp),
            cumulative_interest_paid: self.cumulative_interest_paid.round_dp(dp),
            ..self.clone()
        }
    }
}

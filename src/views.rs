//! serializable responses for the api layer
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::payments::{AmortizationSchedule, LoanSummary, PaymentRecord};
use crate::types::{LoanId, LoanRecord, UserId};

/// render any view as pretty-printed json
pub trait JsonView: Serialize {
    fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// full schedule of one loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub loan_id: LoanId,
    pub payment_amount: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub schedule: Vec<PaymentRecord>,
}

impl ScheduleView {
    pub fn from_schedule(loan_id: LoanId, schedule: AmortizationSchedule) -> Self {
        Self {
            loan_id,
            payment_amount: schedule.payment_amount(),
            total_interest: schedule.total_interest,
            total_payment: schedule.total_payment,
            schedule: schedule.payments,
        }
    }

    /// copy with money fields rounded for display
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            loan_id: self.loan_id,
            payment_amount: self.payment_amount.round_dp(dp),
            total_interest: self.total_interest.round_dp(dp),
            total_payment: self.total_payment.round_dp(dp),
            schedule: self.schedule.iter().map(|p| round_payment(p, dp)).collect(),
        }
    }
}

fn round_payment(payment: &PaymentRecord, dp: u32) -> PaymentRecord {
    PaymentRecord {
        payment_amount: payment.payment_amount.round_dp(dp),
        principal_portion: payment.principal_portion.round_dp(dp),
        interest_portion: payment.interest_portion.round_dp(dp),
        remaining_balance: payment.remaining_balance.round_dp(dp),
        ..payment.clone()
    }
}

/// every loan a user holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLoansView {
    pub user_id: UserId,
    pub loans: Vec<LoanRecord>,
}

/// result of sharing a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareReceipt {
    pub loan_id: LoanId,
    pub recipient_user_id: UserId,
    /// false when the recipient already held the loan
    pub newly_shared: bool,
}

impl JsonView for ScheduleView {}
impl JsonView for UserLoansView {}
impl JsonView for ShareReceipt {}
impl JsonView for LoanSummary {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::LoanTerms;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_schedule_view_rounding() {
        let terms = LoanTerms::new(Money::from_major(10_000), Rate::from_percentage(5), 12).unwrap();
        let schedule =
            AmortizationSchedule::generate(&terms, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()).unwrap();
        let view = ScheduleView::from_schedule(Uuid::new_v4(), schedule).rounded(2);

        assert_eq!(view.schedule.len(), 12);
        assert_eq!(view.payment_amount, Money::from_minor(85_607, 2));
        assert_eq!(view.schedule[0].interest_portion, Money::from_minor(4167, 2));
        assert_eq!(view.schedule[0].payment_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn test_share_receipt_json() {
        let receipt = ShareReceipt {
            loan_id: Uuid::nil(),
            recipient_user_id: Uuid::nil(),
            newly_shared: true,
        };
        let json = receipt.to_json_pretty().unwrap();
        assert!(json.contains("\"recipient_user_id\""));
        assert!(json.contains("\"newly_shared\": true"));
    }
}

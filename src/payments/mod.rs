pub mod amortization;
pub mod summary;

use crate::errors::Result;
use crate::month::YearMonth;
use crate::types::LoanRecord;

pub use amortization::{
    calculate_payment_amount, AmortizationCalculator, AmortizationSchedule, PaymentRecord,
};
pub use summary::LoanSummary;

/// month-by-month payment schedule for a stored loan
pub fn build_schedule(loan: &LoanRecord) -> Result<Vec<PaymentRecord>> {
    Ok(AmortizationSchedule::for_loan(loan)?.payments)
}

/// cumulative position of a stored loan as of a calendar month
pub fn summarize(loan: &LoanRecord, as_of_month: YearMonth) -> Result<LoanSummary> {
    LoanSummary::compute(loan, as_of_month)
}

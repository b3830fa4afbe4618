use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::month::{add_months, YearMonth};
use crate::types::{LoanRecord, LoanTerms};

/// one month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based payment index
    pub month: u32,
    pub payment_date: NaiveDate,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

impl PaymentRecord {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::of(self.payment_date)
    }
}

/// amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub first_payment_date: NaiveDate,
    pub payments: Vec<PaymentRecord>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate payment schedule, payment `n` falls `n - 1` months after `first_payment_date`
    pub fn generate(terms: &LoanTerms, first_payment_date: NaiveDate) -> Result<Self> {
        let payments = AmortizationCalculator::new().calculate_schedule(terms, first_payment_date)?;

        let total_interest = checked_total(&payments, |p| p.interest_portion, terms)?;
        let total_payment = checked_total(&payments, |p| p.payment_amount, terms)?;

        Ok(Self {
            terms: *terms,
            first_payment_date,
            payments,
            total_interest,
            total_payment,
        })
    }

    /// schedule for a stored loan
    pub fn for_loan(loan: &LoanRecord) -> Result<Self> {
        Self::generate(&loan.terms, loan.first_payment_date())
    }

    /// level payment amount
    pub fn payment_amount(&self) -> Money {
        self.payments
            .first()
            .map(|p| p.payment_amount)
            .unwrap_or(Money::ZERO)
    }

    /// get payment for specific month
    pub fn payment(&self, month: u32) -> Option<&PaymentRecord> {
        if month == 0 {
            return None;
        }
        self.payments.get((month - 1) as usize)
    }

    /// remaining balance after the given month, principal before the first payment
    pub fn balance_after(&self, month: u32) -> Money {
        self.payment(month)
            .map(|p| p.remaining_balance)
            .unwrap_or(self.terms.principal)
    }

    /// balance left after the final payment
    pub fn final_balance(&self) -> Money {
        self.payments
            .last()
            .map(|p| p.remaining_balance)
            .unwrap_or(self.terms.principal)
    }
}

/// standard annuity amortization calculator
#[derive(Debug, Default, Clone, Copy)]
pub struct AmortizationCalculator;

impl AmortizationCalculator {
    pub fn new() -> Self {
        Self
    }

    /// calculate full amortization schedule
    pub fn calculate_schedule(
        &self,
        terms: &LoanTerms,
        first_payment_date: NaiveDate,
    ) -> Result<Vec<PaymentRecord>> {
        terms.validate()?;

        let monthly_rate = terms.annual_interest_rate.monthly_rate().as_decimal();
        let payment_amount = calculate_payment_amount(terms)?;

        debug!(
            principal = %terms.principal,
            rate = %terms.annual_interest_rate,
            term_months = terms.term_months,
            payment = %payment_amount,
            "building amortization schedule"
        );

        let mut payments = Vec::with_capacity(terms.term_months as usize);
        let mut balance = terms.principal;

        for month in 1..=terms.term_months {
            let payment_date = add_months(first_payment_date, month - 1)?;
            let interest_portion = balance
                .checked_mul(monthly_rate)
                .ok_or_else(|| overflow(terms.annual_interest_rate, terms.term_months))?;
            let principal_portion = payment_amount
                .checked_sub(interest_portion)
                .ok_or_else(|| overflow(terms.annual_interest_rate, terms.term_months))?;

            balance = balance
                .checked_sub(principal_portion)
                .ok_or_else(|| overflow(terms.annual_interest_rate, terms.term_months))?;

            payments.push(PaymentRecord {
                month,
                payment_date,
                payment_amount,
                principal_portion,
                interest_portion,
                remaining_balance: balance,
            });
        }

        Ok(payments)
    }
}

/// level monthly payment that retires the principal over the term
pub fn calculate_payment_amount(terms: &LoanTerms) -> Result<Money> {
    terms.validate()?;

    let monthly_rate = terms.annual_interest_rate.monthly_rate().as_decimal();

    if monthly_rate.is_zero() {
        return Ok(terms.principal / Decimal::from(terms.term_months));
    }

    // P * r / (1 - (1 + r)^-n) == P * r * c / (c - 1) where c = (1 + r)^n
    let compound = compound_factor(monthly_rate, terms.term_months)?;

    let numerator = terms
        .principal
        .as_decimal()
        .checked_mul(monthly_rate)
        .and_then(|x| x.checked_mul(compound))
        .ok_or_else(|| overflow(terms.annual_interest_rate, terms.term_months))?;
    let denominator = compound - Decimal::ONE;

    numerator
        .checked_div(denominator)
        .map(Money::from_decimal)
        .ok_or_else(|| overflow(terms.annual_interest_rate, terms.term_months))
}

fn compound_factor(monthly_rate: Decimal, months: u32) -> Result<Decimal> {
    let base = Decimal::ONE + monthly_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..months {
        compound = compound
            .checked_mul(base)
            .ok_or_else(|| overflow(Rate::from_decimal(monthly_rate * dec!(12)), months))?;
    }
    Ok(compound)
}

fn checked_total(
    payments: &[PaymentRecord],
    field: impl Fn(&PaymentRecord) -> Money,
    terms: &LoanTerms,
) -> Result<Money> {
    payments.iter().try_fold(Money::ZERO, |total, p| {
        total
            .checked_add(field(p))
            .ok_or_else(|| overflow(terms.annual_interest_rate, terms.term_months))
    })
}

fn overflow(rate: Rate, months: u32) -> LoanError {
    LoanError::CalculationError {
        message: format!("payment overflow for rate {} over {} months", rate, months),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn tolerance() -> Money {
        Money::from_minor(1, 2)
    }

    #[test]
    fn test_five_percent_twelve_months() {
        let terms = LoanTerms::new(Money::from_major(10_000), Rate::from_percentage(5), 12).unwrap();
        let schedule = AmortizationSchedule::generate(&terms, start()).unwrap();

        assert_eq!(schedule.payments.len(), 12);

        let first = &schedule.payments[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.interest_portion.round_dp(2), Money::from_minor(4167, 2));
        assert_eq!(first.payment_amount.round_dp(2), Money::from_minor(85_607, 2));

        assert!(schedule.final_balance().abs() < tolerance());
        assert_eq!(schedule.payments.last().unwrap().month, 12);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let terms = LoanTerms::new(Money::from_major(1_200), Rate::ZERO, 12).unwrap();
        let schedule = AmortizationSchedule::generate(&terms, start()).unwrap();

        assert_eq!(schedule.payments.len(), 12);
        for payment in &schedule.payments {
            assert_eq!(payment.payment_amount, Money::from_major(100));
            assert_eq!(payment.interest_portion, Money::ZERO);
            assert_eq!(payment.principal_portion, Money::from_major(100));
        }
        assert_eq!(schedule.final_balance(), Money::ZERO);
        assert_eq!(schedule.total_interest, Money::ZERO);
    }

    #[test]
    fn test_invalid_terms_rejected() {
        let calculator = AmortizationCalculator::new();

        let zero_term = LoanTerms {
            principal: Money::from_major(1_000),
            annual_interest_rate: Rate::from_percentage(5),
            term_months: 0,
        };
        assert!(matches!(
            calculator.calculate_schedule(&zero_term, start()),
            Err(LoanError::InvalidTerm { .. })
        ));

        let negative_principal = LoanTerms {
            principal: Money::from_major(-5),
            annual_interest_rate: Rate::from_percentage(5),
            term_months: 12,
        };
        assert!(matches!(
            calculator.calculate_schedule(&negative_principal, start()),
            Err(LoanError::InvalidPrincipal { .. })
        ));

        let negative_rate = LoanTerms {
            principal: Money::from_major(1_000),
            annual_interest_rate: Rate::from_decimal(dec!(-0.05)),
            term_months: 12,
        };
        assert!(matches!(
            calculator.calculate_schedule(&negative_rate, start()),
            Err(LoanError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_payment_dates_step_monthly() {
        let terms = LoanTerms::new(Money::from_major(3_000), Rate::from_percentage(6), 4).unwrap();
        let origination = NaiveDate::from_ymd_opt(2023, 11, 30).unwrap();
        let schedule = AmortizationSchedule::generate(&terms, origination).unwrap();

        let dates: Vec<NaiveDate> = schedule.payments.iter().map(|p| p.payment_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 11, 30).unwrap(),
                NaiveDate::from_ymd_opt(2023, 12, 30).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            ]
        );
    }

    #[test]
    fn test_schedule_helpers() {
        let terms = LoanTerms::new(Money::from_major(10_000), Rate::from_percentage(5), 12).unwrap();
        let schedule = AmortizationSchedule::generate(&terms, start()).unwrap();

        assert!(schedule.payment(0).is_none());
        assert!(schedule.payment(13).is_none());
        assert_eq!(schedule.balance_after(0), terms.principal);
        assert_eq!(schedule.balance_after(3), schedule.payments[2].remaining_balance);
        assert_eq!(
            schedule.total_payment,
            schedule.total_interest + schedule.payments.iter().map(|p| p.principal_portion).sum::<Money>()
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        let terms = LoanTerms::new(Money::from_major(1_000_000), Rate::from_percentage(1_000), 600).unwrap();
        assert!(matches!(
            calculate_payment_amount(&terms),
            Err(LoanError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let principal = Money::from_str_exact("78000000000000000000000000000").unwrap();
        let terms = LoanTerms::new(principal, Rate::from_percentage(5), 12).unwrap();
        assert!(matches!(
            AmortizationSchedule::generate(&terms, start()),
            Err(LoanError::CalculationError { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_schedule_amortizes(
            principal in 1i64..5_000_000,
            bps in 0u32..2_000,
            term in 1u32..360,
        ) {
            let terms = LoanTerms::new(Money::from_major(principal), Rate::from_bps(bps), term).unwrap();
            let schedule = AmortizationSchedule::generate(&terms, start()).unwrap();

            prop_assert_eq!(schedule.payments.len(), term as usize);

            let principal_paid: Money = schedule.payments.iter().map(|p| p.principal_portion).sum();
            prop_assert!((principal_paid - terms.principal).abs() < tolerance());
            prop_assert!(schedule.final_balance().abs() < tolerance());

            let mut previous = terms.principal;
            for (index, payment) in schedule.payments.iter().enumerate() {
                prop_assert_eq!(payment.month, index as u32 + 1);
                prop_assert_eq!(payment.principal_portion + payment.interest_portion, payment.payment_amount);
                prop_assert_eq!(payment.payment_amount, schedule.payment_amount());
                prop_assert!(payment.remaining_balance < previous);
                previous = payment.remaining_balance;
            }
        }

        #[test]
        fn prop_schedule_is_deterministic(
            principal in 1i64..1_000_000,
            bps in 0u32..2_500,
            term in 1u32..120,
        ) {
            let terms = LoanTerms::new(Money::from_major(principal), Rate::from_bps(bps), term).unwrap();
            let first = AmortizationSchedule::generate(&terms, start()).unwrap();
            let second = AmortizationSchedule::generate(&terms, start()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{LedgerConfig, SharePolicy};
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::month::YearMonth;
use crate::payments::{AmortizationSchedule, LoanSummary};
use crate::repository::LoanRepository;
use crate::types::{LoanId, LoanRecord, LoanTerms, UserId, UserRecord};
use crate::views::{JsonView, ScheduleView, ShareReceipt, UserLoansView};

/// request to register a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// request to create a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub owner_ids: Vec<UserId>,
    pub principal: Money,
    pub annual_interest_rate: Rate,
    pub term_months: u32,
    /// defaults to today
    #[serde(default)]
    pub origination_date: Option<NaiveDate>,
    /// defaults to the origination date
    #[serde(default)]
    pub first_payment_date: Option<NaiveDate>,
}

impl NewLoan {
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }
}

/// Loan operations behind the api layer.
///
/// Schedules and summaries are recomputed from the stored terms on every call.
pub struct LoanService<R: LoanRepository> {
    repository: R,
    config: LedgerConfig,
    time: SafeTimeProvider,
}

impl<R: LoanRepository> LoanService<R> {
    /// service on the system clock
    pub fn new(repository: R, config: LedgerConfig) -> Self {
        Self::with_time(repository, config, SafeTimeProvider::new(TimeSource::System))
    }

    pub fn with_time(repository: R, config: LedgerConfig, time: SafeTimeProvider) -> Self {
        Self {
            repository,
            config,
            time,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn create_user(&self, request: NewUser) -> Result<UserRecord> {
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
        };
        self.repository.insert_user(user.clone())?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub fn create_loan(&self, request: NewLoan) -> Result<LoanRecord> {
        let terms = LoanTerms::new(request.principal, request.annual_interest_rate, request.term_months)
            .inspect_err(|e| warn!(error = %e, "rejected loan terms"))?;

        let origination_date = request
            .origination_date
            .unwrap_or_else(|| self.time.now().date_naive());

        if let Some(first_payment) = request.first_payment_date {
            if first_payment < origination_date {
                return Err(LoanError::InvalidDate {
                    message: format!(
                        "first payment {} precedes origination {}",
                        first_payment, origination_date
                    ),
                });
            }
        }

        let mut owner_ids = BTreeSet::new();
        for owner in request.owner_ids {
            if !self.repository.user_exists(owner)? {
                warn!(user_id = %owner, "loan owner does not exist");
                return Err(LoanError::UserNotFound { id: owner });
            }
            owner_ids.insert(owner);
        }

        let loan = LoanRecord {
            id: Uuid::new_v4(),
            owner_ids,
            terms,
            origination_date,
            first_payment_date: request.first_payment_date,
            created_at: self.time.now(),
        };

        // fail now rather than on the first schedule request
        AmortizationSchedule::for_loan(&loan)?;

        self.repository.insert_loan(loan.clone())?;

        info!(
            loan_id = %loan.id,
            principal = %loan.terms.principal,
            rate = %loan.terms.annual_interest_rate,
            term_months = loan.terms.term_months,
            owners = loan.owner_ids.len(),
            "loan created"
        );
        Ok(loan)
    }

    fn find_loan(&self, loan_id: LoanId) -> Result<LoanRecord> {
        self.repository
            .find_loan_by_id(loan_id)
            .inspect_err(|e| warn!(loan_id = %loan_id, error = %e, "loan lookup failed"))
    }

    pub fn fetch_schedule(&self, loan_id: LoanId) -> Result<ScheduleView> {
        let loan = self.find_loan(loan_id)?;
        let schedule = AmortizationSchedule::for_loan(&loan)?;
        Ok(ScheduleView::from_schedule(loan.id, schedule))
    }

    /// summary through a `YYYY-MM` month
    pub fn fetch_summary(&self, loan_id: LoanId, month: &str) -> Result<LoanSummary> {
        let loan = self.find_loan(loan_id)?;
        let as_of_month = YearMonth::parse(month)
            .inspect_err(|_| warn!(loan_id = %loan_id, month, "malformed summary month"))?;
        LoanSummary::compute(&loan, as_of_month)
    }

    /// loans held by a user, empty for unknown users
    pub fn fetch_user_loans(&self, user_id: UserId) -> Result<UserLoansView> {
        Ok(UserLoansView {
            user_id,
            loans: self.repository.loans_for_user(user_id)?,
        })
    }

    pub fn share_loan(&self, loan_id: LoanId, recipient_user_id: UserId) -> Result<ShareReceipt> {
        if !self.repository.user_exists(recipient_user_id)? {
            warn!(loan_id = %loan_id, user_id = %recipient_user_id, "share recipient does not exist");
            return Err(LoanError::UserNotFound {
                id: recipient_user_id,
            });
        }

        let newly_shared = self
            .repository
            .add_owner(loan_id, recipient_user_id)
            .inspect_err(|e| warn!(loan_id = %loan_id, error = %e, "share failed"))?;

        if !newly_shared && self.config.share_policy == SharePolicy::Strict {
            return Err(LoanError::AlreadyShared {
                loan_id,
                user_id: recipient_user_id,
            });
        }

        info!(loan_id = %loan_id, user_id = %recipient_user_id, newly_shared, "loan shared");
        Ok(ShareReceipt {
            loan_id,
            recipient_user_id,
            newly_shared,
        })
    }

    /// schedule rendered with money rounded to the configured places
    pub fn schedule_json(&self, loan_id: LoanId) -> Result<String> {
        let view = self
            .fetch_schedule(loan_id)?
            .rounded(self.config.display_decimal_places);
        Ok(view.to_json_pretty()?)
    }

    /// summary rendered with money rounded to the configured places
    pub fn summary_json(&self, loan_id: LoanId, month: &str) -> Result<String> {
        let summary = self
            .fetch_summary(loan_id, month)?
            .rounded(self.config.display_decimal_places);
        Ok(summary.to_json_pretty()?)
    }
}

/// builder for loan requests
#[derive(Debug, Default)]
pub struct LoanBuilder {
    owner_ids: Vec<UserId>,
    amount: Option<Money>,
    rate: Option<Rate>,
    term_months: Option<u32>,
    origination_date: Option<NaiveDate>,
    first_payment_date: Option<NaiveDate>,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(mut self, user_id: UserId) -> Self {
        self.owner_ids.push(user_id);
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn origination_date(mut self, date: NaiveDate) -> Self {
        self.origination_date = Some(date);
        self
    }

    pub fn first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = Some(date);
        self
    }

    pub fn build(self) -> Result<NewLoan> {
        let principal = self.amount.ok_or(LoanError::InvalidConfiguration {
            message: "Amount required".to_string(),
        })?;

        let annual_interest_rate = self.rate.ok_or(LoanError::InvalidConfiguration {
            message: "Rate required".to_string(),
        })?;

        let term_months = self.term_months.ok_or(LoanError::InvalidConfiguration {
            message: "Term required".to_string(),
        })?;

        Ok(NewLoan {
            owner_ids: self.owner_ids,
            principal,
            annual_interest_rate,
            term_months,
            origination_date: self.origination_date,
            first_payment_date: self.first_payment_date,
        })
    }
}

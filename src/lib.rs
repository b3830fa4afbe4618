pub mod config;
pub mod decimal;
pub mod errors;
pub mod month;
pub mod payments;
pub mod repository;
pub mod service;
pub mod telemetry;
pub mod types;
pub mod views;

// re-export key types
pub use config::{LedgerConfig, SharePolicy};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use month::YearMonth;
pub use payments::{
    build_schedule, summarize, AmortizationCalculator, AmortizationSchedule, LoanSummary,
    PaymentRecord,
};
pub use repository::{InMemoryRepository, LoanRepository};
pub use service::{LoanBuilder, LoanService, NewLoan, NewUser};
pub use telemetry::init_tracing;
pub use types::{LoanId, LoanRecord, LoanTerms, UserId, UserRecord, MAX_TERM_MONTHS};
pub use views::{JsonView, ScheduleView, ShareReceipt, UserLoansView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

// quick start - share a loan and inspect its schedule
use loan_ledger_rs::chrono::NaiveDate;
use loan_ledger_rs::{
    init_tracing, InMemoryRepository, LedgerConfig, LoanService, Money, NewLoan, NewUser, Rate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LedgerConfig::default().with_env_overrides();
    init_tracing(&config);

    let service = LoanService::new(InMemoryRepository::new(), config);

    let alice = service.create_user(NewUser {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    })?;
    let bob = service.create_user(NewUser {
        name: "Bob".to_string(),
        email: "bob@example.com".to_string(),
    })?;

    // $10,000 at 5% over a year
    let loan = service.create_loan(
        NewLoan::builder()
            .owner(alice.id)
            .amount(Money::from_major(10_000))
            .rate(Rate::from_percentage(5))
            .term_months(12)
            .origination_date(NaiveDate::from_ymd_opt(2023, 1, 1).ok_or("bad date")?)
            .build()?,
    )?;

    service.share_loan(loan.id, bob.id)?;

    println!("{}", service.schedule_json(loan.id)?);
    println!("{}", service.summary_json(loan.id, "2023-06")?);

    Ok(())
}

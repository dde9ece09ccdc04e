use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use loan_amort_core::amortization::{
    self, ExtraPayments, LoanRequest, LoanTerms, PaymentMode,
};

use crate::input;

/// Loan terms shared by every loan command
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct TermsArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (12.5 = 12.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Nominal term in months
    #[arg(long)]
    pub term: Option<u32>,
}

/// Arguments for a full amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,

    /// Date of the first payment (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Insurance charged every period
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Other fees charged every period
    #[arg(long)]
    pub fees: Option<Decimal>,

    /// Pay exactly this amount each month instead of the annuity payment
    #[arg(long)]
    pub fixed_payment: Option<Decimal>,

    /// Extra principal payment as PERIOD=AMOUNT (repeatable)
    #[arg(long = "extra", value_name = "PERIOD=AMOUNT")]
    pub extras: Vec<String>,
}

/// Arguments for the monthly payment alone
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PaymentArgs {
    #[command(flatten)]
    pub terms: TermsArgs,
}

#[derive(Debug, Serialize, Deserialize)]
struct PaymentOutput {
    monthly_payment: Decimal,
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: u32,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanRequest = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        request_from_flags(&args)?
    };
    let result = amortization::analyze_loan(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (principal, rate, term) = required_terms(&args.terms, "")?;
    let monthly_payment = amortization::compute_monthly_payment(principal, rate, term);
    Ok(serde_json::to_value(PaymentOutput {
        monthly_payment,
        principal,
        annual_rate_percent: rate,
        term_months: term,
    })?)
}

/// `hint` is appended to each missing-flag message.
fn required_terms(
    args: &TermsArgs,
    hint: &str,
) -> Result<(Decimal, Decimal, u32), Box<dyn std::error::Error>> {
    let missing = |flag: &str| format!("--{flag} is required{hint}");
    Ok((
        args.principal.ok_or_else(|| missing("principal"))?,
        args.rate.ok_or_else(|| missing("rate"))?,
        args.term.ok_or_else(|| missing("term"))?,
    ))
}

fn request_from_flags(args: &ScheduleArgs) -> Result<LoanRequest, Box<dyn std::error::Error>> {
    let (principal, rate, term) = required_terms(&args.terms, " (or provide --input)")?;
    let start_date = args
        .start_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut terms = LoanTerms::new(principal, rate, term, start_date).with_charges(
        args.insurance.unwrap_or(Decimal::ZERO),
        args.fees.unwrap_or(Decimal::ZERO),
    );
    if let Some(amount) = args.fixed_payment {
        terms = terms.with_payment_mode(PaymentMode::Fixed(amount));
    }

    let mut extra_payments = ExtraPayments::new();
    for entry in &args.extras {
        let (period, amount) = parse_extra(entry)?;
        extra_payments.insert(period, amount);
    }

    Ok(LoanRequest {
        terms,
        extra_payments,
    })
}

fn parse_extra(entry: &str) -> Result<(u32, Decimal), Box<dyn std::error::Error>> {
    let (period, amount) = entry
        .split_once('=')
        .ok_or_else(|| format!("Extra payment must be PERIOD=AMOUNT, got '{}'", entry))?;
    Ok((period.trim().parse()?, amount.trim().parse()?))
}

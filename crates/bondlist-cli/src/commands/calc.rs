//! Calc command implementation.
//!
//! Prices one bond described on the command line, the way a scan would.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;

use bondlist_core::types::{BondRecord, BondType, Currency};
use bondlist_core::yields::{YieldCalculator, YieldConventions};

use crate::cli::OutputFormat;
use crate::commands::parse_date;
use crate::error::{CliError, CliResult};

/// Arguments for the calc command.
#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Bond type: gov, mun, corp, euro
    #[arg(short = 't', long = "type", default_value = "corp")]
    pub bond_type: BondType,

    /// Maturity or redemption date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub maturity: NaiveDate,

    /// Offer date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub offer: Option<NaiveDate>,

    /// Valuation date (YYYY-MM-DD). Defaults to today.
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Face value
    #[arg(long, default_value = "1000")]
    pub nominal: f64,

    /// Clean price in currency units
    #[arg(long)]
    pub clean_price: Option<f64>,

    /// Clean price, percent of nominal
    #[arg(long)]
    pub clean_price_percent: Option<f64>,

    /// Accrued interest in currency units
    #[arg(long, default_value = "0")]
    pub accrued: f64,

    /// Annual coupon, percent
    #[arg(long, default_value = "0")]
    pub coupon: f64,

    /// Currency code
    #[arg(long, default_value = "RUB")]
    pub currency: String,

    /// Number of bonds bought
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u32,

    /// Broker commission, percent
    #[arg(long, default_value = "0.1")]
    pub commission: f64,
}

impl CalcArgs {
    /// The described bond, not yet priced.
    pub fn record(&self) -> CliResult<BondRecord> {
        let mut record = BondRecord::new("", self.bond_type).with_maturity(self.maturity);
        record.offer_date = self.offer;
        record.nominal = self.nominal;
        record.accrued_interest = self.accrued;
        record.coupon_interest = self.coupon;
        record.currency = Currency::parse(&self.currency);
        match (self.clean_price, self.clean_price_percent) {
            (Some(price), None) => record.clean_price = price,
            (None, Some(percent)) => record.clean_price_percent = percent,
            _ => return Err(CliError::CleanPriceInput),
        }
        Ok(record)
    }
}

/// Calc result: the priced bond and the cost of the whole purchase.
#[derive(Debug, Serialize)]
pub struct CalcResult {
    /// Priced bond.
    pub bond: BondRecord,
    /// Bonds bought.
    pub count: u32,
    /// `dirty_price * count`.
    pub total: f64,
}

/// Prices the bond described by `args`.
pub fn calculate(args: &CalcArgs) -> Result<CalcResult> {
    if args.count == 0 {
        return Err(CliError::InvalidCount(args.count).into());
    }
    let mut bond = args.record()?;
    let as_of = args.date.unwrap_or_else(|| Local::now().date_naive());
    YieldCalculator::new(args.commission, as_of, YieldConventions::default()).finalize(&mut bond)?;

    let total = bond.dirty_price * f64::from(args.count);
    Ok(CalcResult {
        bond,
        count: args.count,
        total,
    })
}

/// Execute the calc command.
pub fn execute(args: CalcArgs, format: OutputFormat) -> Result<()> {
    let result = calculate(&args)?;
    match format {
        OutputFormat::Text => {
            println!("{}", result.bond);
            println!("Total: {:.2} ({} x {:.2})", result.total, result.count, result.bond.dirty_price);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

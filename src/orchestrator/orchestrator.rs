use std::error::Error;
use std::io::{self, Write};

use csv::Writer;
use log::info;

use crate::config::Config;
use crate::ledger::Ledger;
use crate::orchestrator::command::Command;
use crate::reports::{CategorySummary, MonthlyReport};
use crate::transactions::Transaction;

pub fn run(config: &Config, command: Command) -> Result<(), Box<dyn Error>> {
    let mut ledger = Ledger::open(&config.ledger_file);
    info!(
        "opened ledger {} with {} transactions",
        config.ledger_file.display(),
        ledger.count()
    );

    let stdout = io::stdout();
    execute(&mut ledger, command, stdout.lock())
}

/// Apply one command to the ledger, writing its output to `out`.
pub fn execute<W: Write>(
    ledger: &mut Ledger,
    command: Command,
    mut out: W,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Add {
            kind,
            amount,
            category,
            description,
        } => {
            let tx = ledger.create(description, amount, category, kind)?;
            let line = tx.to_string();
            if ledger.add(tx) {
                writeln!(out, "added {}", line)?;
            }
        }
        Command::Remove(id) => {
            if ledger.remove(id) {
                writeln!(out, "removed transaction {}", id)?;
            } else {
                writeln!(out, "no transaction with id {}", id)?;
            }
        }
        Command::List => write_transactions(out, &ledger.list_by_date_desc())?,
        Command::Search(keyword) => write_transactions(out, &ledger.search(&keyword))?,
        Command::Categories => {
            let mut wtr = Writer::from_writer(out);
            for summary in CategorySummary::summarize(ledger) {
                wtr.serialize(summary)?;
            }
            wtr.flush()?;
        }
        Command::Month => {
            let report = MonthlyReport::build(ledger);
            let mut wtr = Writer::from_writer(out);
            wtr.write_record(["income", "expenses", "net"])?;
            wtr.serialize((
                report.income.round_dp(2),
                report.expenses.round_dp(2),
                report.net.round_dp(2),
            ))?;
            wtr.write_record(["category", "spent", ""])?;
            for (category, spent) in &report.expenses_by_category {
                wtr.serialize((category, spent.round_dp(2), ""))?;
            }
            wtr.flush()?;
        }
        Command::Balance => {
            let mut wtr = Writer::from_writer(out);
            wtr.write_record(["income", "expenses", "balance"])?;
            wtr.serialize((
                ledger.total_income().round_dp(2),
                ledger.total_expenses().round_dp(2),
                ledger.current_balance().round_dp(2),
            ))?;
            wtr.flush()?;
        }
    }

    Ok(())
}

fn write_transactions<W: Write>(
    out: W,
    transactions: &[Transaction],
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(out);
    for tx in transactions {
        wtr.serialize(tx)?;
    }
    wtr.flush()?;
    Ok(())
}

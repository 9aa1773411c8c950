use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::Ledger;
use crate::transactions::{Transaction, TransactionType};

/// Income and expense totals for the current calendar month.
#[derive(Debug, Default)]
pub struct MonthlyReport {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    /// Largest spend first.
    pub expenses_by_category: Vec<(String, Decimal)>,
}

impl MonthlyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(ledger: &Ledger) -> Self {
        let mut report = Self::new();
        for tx in ledger.list_for_current_month() {
            report.record(&tx);
        }

        let mut breakdown: Vec<(String, Decimal)> =
            ledger.monthly_expenses_by_category().into_iter().collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1));
        report.expenses_by_category = breakdown;
        report
    }

    pub fn record(&mut self, tx: &Transaction) {
        match tx.kind() {
            TransactionType::Income => self.income += tx.amount(),
            TransactionType::Expense => self.expenses += tx.amount(),
        }
        self.net = self.income - self.expenses;
    }

    pub fn is_deficit(&self) -> bool {
        self.net < Decimal::ZERO
    }
}

/// One row of the per-category view: how many entries and their net amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub net: Decimal,
}

impl CategorySummary {
    /// Summaries in first-seen category order. Income counts positive, expenses negative.
    pub fn summarize(ledger: &Ledger) -> Vec<CategorySummary> {
        ledger
            .group_by_category()
            .into_iter()
            .map(|(category, txs)| CategorySummary {
                count: txs.len(),
                net: txs.iter().map(Transaction::signed_amount).sum(),
                category,
            })
            .collect()
    }
}

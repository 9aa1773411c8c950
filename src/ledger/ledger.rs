use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::transactions::{CSV_HEADER, Transaction, TransactionError, TransactionType};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("could not write ledger file: {0}")]
    Io(#[from] io::Error),
}

/// Field changes applied by [`Ledger::edit`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct TransactionEdit {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
}

/// In-memory transaction store mirrored to a CSV snapshot file.
///
/// Every mutation rewrites the whole file. Write failures are logged and
/// otherwise ignored, so memory and disk can drift apart until the next
/// successful save; call [`Ledger::flush`] to see the error.
pub struct Ledger {
    path: PathBuf,
    transactions: Vec<Transaction>,
    next_id: u64,
    clock: Box<dyn Clock>,
}

impl Ledger {
    /// Open the ledger at `path`, using the local date as "today".
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, SystemClock)
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: impl Clock + 'static) -> Self {
        let mut ledger = Self {
            path: path.into(),
            transactions: Vec::new(),
            next_id: 1,
            clock: Box::new(clock),
        };
        ledger.load();
        ledger
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Id the next freshly created transaction will get.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Build a new transaction dated today with the next free id.
    ///
    /// The transaction is not stored; pass it to [`Ledger::add`]. Fails with
    /// [`TransactionError::IdsExhausted`] once an id of `u32::MAX` has been seen.
    pub fn create(
        &mut self,
        description: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
        kind: TransactionType,
    ) -> Result<Transaction, TransactionError> {
        let id = u32::try_from(self.next_id).map_err(|_| TransactionError::IdsExhausted)?;
        let tx = Transaction::new(
            id,
            description,
            amount,
            category,
            kind,
            self.clock.today(),
        )?;
        self.next_id += 1;
        Ok(tx)
    }

    /// Append a transaction and save. Returns false when given `None`.
    pub fn add(&mut self, transaction: impl Into<Option<Transaction>>) -> bool {
        let Some(tx) = transaction.into() else {
            return false;
        };

        self.track_id(tx.id());
        debug!("adding transaction {}", tx.id());
        self.transactions.push(tx);
        self.persist();
        true
    }

    /// Remove the transaction with `id`. Saves only when something was removed.
    pub fn remove(&mut self, id: u32) -> bool {
        match self.transactions.iter().position(|tx| tx.id() == id) {
            Some(index) => {
                self.transactions.remove(index);
                debug!("removed transaction {}", id);
                self.persist();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u32) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id() == id)
    }

    /// Change description, amount or category of an existing transaction.
    ///
    /// Returns `Ok(false)` if no transaction has `id`. An invalid amount is
    /// rejected before any field is touched.
    pub fn edit(&mut self, id: u32, edit: TransactionEdit) -> Result<bool, TransactionError> {
        let Some(tx) = self.transactions.iter_mut().find(|tx| tx.id() == id) else {
            return Ok(false);
        };

        if let Some(amount) = edit.amount {
            tx.set_amount(amount)?;
        }
        if let Some(description) = edit.description {
            tx.set_description(description);
        }
        if let Some(category) = edit.category {
            tx.set_category(category);
        }

        self.persist();
        Ok(true)
    }

    pub fn list_all(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    /// Most recent first. Same-day transactions keep their insertion order.
    pub fn list_by_date_desc(&self) -> Vec<Transaction> {
        let mut sorted = self.transactions.clone();
        sorted.sort_by(|a, b| b.date().cmp(&a.date()));
        sorted
    }

    /// Categories appear in the order they are first seen.
    pub fn group_by_category(&self) -> IndexMap<String, Vec<Transaction>> {
        let mut groups: IndexMap<String, Vec<Transaction>> = IndexMap::new();
        for tx in &self.transactions {
            groups
                .entry(tx.category().to_string())
                .or_default()
                .push(tx.clone());
        }
        groups
    }

    pub fn list_for_current_month(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| self.clock.in_current_month(tx.date()))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over description and category.
    pub fn search(&self, keyword: &str) -> Vec<Transaction> {
        let term = keyword.to_lowercase();
        let term = term.trim();
        self.transactions
            .iter()
            .filter(|tx| {
                tx.description().to_lowercase().contains(term)
                    || tx.category().to_lowercase().contains(term)
            })
            .cloned()
            .collect()
    }

    pub fn total_income(&self) -> Decimal {
        self.total_for(TransactionType::Income)
    }

    pub fn total_expenses(&self) -> Decimal {
        self.total_for(TransactionType::Expense)
    }

    pub fn current_balance(&self) -> Decimal {
        self.total_income() - self.total_expenses()
    }

    /// This month's expenses summed per category.
    pub fn monthly_expenses_by_category(&self) -> IndexMap<String, Decimal> {
        let mut totals: IndexMap<String, Decimal> = IndexMap::new();
        for tx in self
            .transactions
            .iter()
            .filter(|tx| tx.is_expense() && self.clock.in_current_month(tx.date()))
        {
            *totals
                .entry(tx.category().to_string())
                .or_insert(Decimal::ZERO) += tx.amount();
        }
        totals
    }

    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    /// Rewrite the snapshot file now, reporting any I/O failure.
    pub fn flush(&self) -> Result<(), LedgerError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", CSV_HEADER)?;
        for tx in &self.transactions {
            writeln!(writer, "{}", tx.encode())?;
        }
        writer.flush()?;
        Ok(())
    }

    fn total_for(&self, kind: TransactionType) -> Decimal {
        self.transactions
            .iter()
            .filter(|tx| tx.kind() == kind)
            .map(|tx| tx.amount())
            .sum()
    }

    fn track_id(&mut self, id: u32) {
        self.next_id = self.next_id.max(u64::from(id) + 1);
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            error!("error saving transactions to {}: {}", self.path.display(), e);
        }
    }

    fn load(&mut self) {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no ledger file at {}, starting empty", self.path.display());
                return;
            }
            Err(e) => {
                error!("error loading transactions from {}: {}", self.path.display(), e);
                return;
            }
        };

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_no = 0;
        let mut loaded = 0;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => line_no += 1,
                Err(e) => {
                    error!("error loading transactions from {}: {}", self.path.display(), e);
                    break;
                }
            }

            // header
            if line_no == 1 {
                continue;
            }

            let text = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = text {
                warn!("line {} is not valid UTF-8, replacing invalid bytes", line_no);
            }
            let line = text.trim_end_matches(['\n', '\r']);

            match Transaction::decode(line) {
                Ok(tx) => {
                    self.track_id(tx.id());
                    self.transactions.push(tx);
                    loaded += 1;
                }
                Err(e) => warn!("skipping line {} ({}): {}", line_no, e, line),
            }
        }

        if loaded > 0 {
            info!("loaded {} transactions from {}", loaded, self.path.display());
        }
    }
}

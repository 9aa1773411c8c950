use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header line of the snapshot file. Always written, always skipped on read.
pub const CSV_HEADER: &str = "id,description,amount,category,type,date";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DecodeError;

    /// Exact, case-sensitive match against the stored tokens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            other => Err(DecodeError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("amount must be at least 0.01, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("no transaction ids left")]
    IdsExhausted,
}

/// Reasons a stored line can fail to turn back into a [`Transaction`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected 6 fields, found {0}")]
    MissingFields(usize),
    #[error("invalid id '{0}'")]
    InvalidId(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("unknown transaction type '{0}'")]
    UnknownType(String),
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("amount must be at least 0.01, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("malformed line: {0}")]
    Csv(#[from] csv::Error),
}

/// One income or expense entry.
///
/// `id` and `date` are fixed once the value exists; description, amount and
/// category can be edited through the setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    id: u32,
    description: String,
    amount: Decimal,
    category: String,
    #[serde(rename = "type")]
    kind: TransactionType,
    date: NaiveDate,
}

impl Transaction {
    pub fn new(
        id: u32,
        description: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
        kind: TransactionType,
        date: NaiveDate,
    ) -> Result<Self, TransactionError> {
        check_amount(amount)?;
        Ok(Self {
            id,
            description: description.into(),
            amount,
            category: category.into(),
            kind,
            date,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Amount with the sign implied by the kind: expenses come out negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_amount(&mut self, amount: Decimal) -> Result<(), TransactionError> {
        check_amount(amount)?;
        self.amount = amount;
        Ok(())
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    /// Encode as one snapshot line (no trailing newline).
    ///
    /// The description is always quoted with inner quotes doubled. The amount
    /// is written with exactly two decimals.
    ///
    /// The category is written as-is and unquoted. A category containing a
    /// comma or a quote, or with leading/trailing whitespace, does not come
    /// back unchanged from [`Transaction::decode`], which trims it.
    pub fn encode(&self) -> String {
        let amount = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!(
            "{},\"{}\",{:.2},{},{},{}",
            self.id,
            self.description.replace('"', "\"\""),
            amount,
            self.category,
            self.kind,
            self.date.format(DATE_FORMAT),
        )
    }

    /// Parse one snapshot line back into a transaction.
    ///
    /// Commas inside the quoted description are not separators, and padding
    /// around a field is ignored. Extra trailing fields are ignored; fewer
    /// than six is an error.
    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let line = trim_padding(line);
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());

        let mut record = StringRecord::new();
        if !rdr.read_record(&mut record)? {
            return Err(DecodeError::MissingFields(0));
        }
        if record.len() < 6 {
            return Err(DecodeError::MissingFields(record.len()));
        }

        let id_field = record[0].trim();
        let id = id_field
            .parse::<u32>()
            .map_err(|_| DecodeError::InvalidId(id_field.to_string()))?;

        let amount_field = record[2].trim();
        let amount = Decimal::from_str(amount_field)
            .map_err(|_| DecodeError::InvalidAmount(amount_field.to_string()))?;
        if check_amount(amount).is_err() {
            return Err(DecodeError::NonPositiveAmount(amount));
        }

        let kind = record[4].trim().parse::<TransactionType>()?;

        let date_field = record[5].trim();
        let date = NaiveDate::parse_from_str(date_field, DATE_FORMAT)
            .map_err(|_| DecodeError::InvalidDate(date_field.to_string()))?;

        Ok(Self {
            id,
            description: record[1].to_string(),
            amount,
            category: record[3].trim().to_string(),
            kind,
            date,
        })
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Date: {} | Type: {} | Amount: {:.2} | Category: {} | Description: {}",
            self.id,
            self.date.format(DATE_FORMAT),
            self.kind,
            self.amount,
            self.category,
            self.description,
        )
    }
}

/// An amount is storable when it is still positive after rounding to cents,
/// since that is what [`Transaction::encode`] writes.
pub fn check_amount(amount: Decimal) -> Result<(), TransactionError> {
    let cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if cents <= Decimal::ZERO {
        return Err(TransactionError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Strip whitespace around each field, leaving quoted content alone.
///
/// The csv reader only treats a field as quoted when the quote is its first
/// byte, so ` "Fuel"` has to lose its leading space first.
fn trim_padding(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut field = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                field.push(c);
            }
            ',' if !in_quotes => {
                out.push_str(field.trim());
                out.push(',');
                field.clear();
            }
            _ => field.push(c),
        }
    }
    out.push_str(field.trim());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn decimal(amount: f64) -> Decimal {
        Decimal::from_f64(amount).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: u32, description: &str, amount: f64) -> Transaction {
        Transaction::new(
            id,
            description,
            decimal(amount),
            "Food",
            TransactionType::Expense,
            date(2024, 3, 1),
        )
        .unwrap()
    }

    #[test]
    fn test_encode_quotes_description() {
        let tx = expense(1, "Coffee, large", 4.5);
        assert_eq!(tx.encode(), "1,\"Coffee, large\",4.50,Food,EXPENSE,2024-03-01");
    }

    #[test]
    fn test_encode_doubles_inner_quotes() {
        let tx = expense(3, "the \"good\" beans", 12.0);
        assert_eq!(
            tx.encode(),
            "3,\"the \"\"good\"\" beans\",12.00,Food,EXPENSE,2024-03-01"
        );
    }

    #[test]
    fn test_encode_rounds_to_two_places() {
        let mut tx = expense(4, "Tea", 2.0);
        tx.set_amount(Decimal::from_str("2.345").unwrap()).unwrap();
        assert!(tx.encode().contains(",2.35,"));
    }

    #[test]
    fn test_round_trip_with_commas_and_quotes() {
        let tx = Transaction::new(
            42,
            "Dinner, \"fancy\" place, with friends",
            decimal(87.25),
            "Eating Out",
            TransactionType::Expense,
            date(2023, 12, 31),
        )
        .unwrap();

        let decoded = Transaction::decode(&tx.encode()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_round_trip_income() {
        let tx = Transaction::new(
            2,
            "Paycheck",
            decimal(2500.0),
            "Salary",
            TransactionType::Income,
            date(2024, 3, 1),
        )
        .unwrap();

        assert_eq!(Transaction::decode(&tx.encode()).unwrap(), tx);
    }

    #[test]
    fn test_decode_stored_line() {
        let tx = Transaction::decode("5,\"Test, item\",10.00,Misc,EXPENSE,2024-01-15").unwrap();
        assert_eq!(tx.id(), 5);
        assert_eq!(tx.description(), "Test, item");
        assert_eq!(tx.amount(), decimal(10.0));
        assert_eq!(tx.category(), "Misc");
        assert_eq!(tx.kind(), TransactionType::Expense);
        assert_eq!(tx.date(), date(2024, 1, 15));
    }

    #[test]
    fn test_decode_lenient_amount() {
        let tx = Transaction::decode("1,\"Fuel\",40.1234,Car,EXPENSE,2024-01-15").unwrap();
        assert_eq!(tx.amount(), Decimal::from_str("40.1234").unwrap());
    }

    #[test]
    fn test_decode_missing_fields() {
        let err = Transaction::decode("1,\"Fuel\",40.00,Car,EXPENSE").unwrap_err();
        assert!(matches!(err, DecodeError::MissingFields(5)));

        let err = Transaction::decode("").unwrap_err();
        assert!(matches!(err, DecodeError::MissingFields(_)));
    }

    #[test]
    fn test_decode_bad_amount() {
        let err = Transaction::decode("1,\"Fuel\",forty,Car,EXPENSE,2024-01-15").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAmount(_)));
    }

    #[test]
    fn test_decode_non_positive_amount() {
        let err = Transaction::decode("1,\"Fuel\",-4.00,Car,EXPENSE,2024-01-15").unwrap_err();
        assert!(matches!(err, DecodeError::NonPositiveAmount(_)));
    }

    #[test]
    fn test_decode_kind_is_case_sensitive() {
        let err = Transaction::decode("1,\"Fuel\",40.00,Car,expense,2024-01-15").unwrap_err();
        assert!(matches!(err, DecodeError::UnknownType(ref t) if t == "expense"));
    }

    #[test]
    fn test_decode_bad_date() {
        let err = Transaction::decode("1,\"Fuel\",40.00,Car,EXPENSE,2024-13-01").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDate(_)));
    }

    #[test]
    fn test_decode_bad_id() {
        let err = Transaction::decode("x,\"Fuel\",40.00,Car,EXPENSE,2024-01-15").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidId(_)));
    }

    #[test]
    fn test_decode_padded_fields() {
        let tx = Transaction::decode("1, \"Fuel, diesel\" , 40.00 , Car , EXPENSE , 2024-01-15\r").unwrap();
        assert_eq!(tx.description(), "Fuel, diesel");
        assert_eq!(tx.category(), "Car");
        assert_eq!(tx.date(), date(2024, 1, 15));
    }

    #[test]
    fn test_decode_keeps_spaces_inside_quotes() {
        let tx = expense(8, "  spaced out  ", 1.0);
        assert_eq!(Transaction::decode(&tx.encode()).unwrap().description(), "  spaced out  ");
    }

    #[test]
    fn test_category_is_trimmed_on_decode() {
        let mut tx = expense(8, "Snack", 1.0);
        tx.set_category("  Food ");
        assert_eq!(Transaction::decode(&tx.encode()).unwrap().category(), "Food");
    }

    #[test]
    fn test_amount_below_a_cent_is_rejected() {
        let tiny = Decimal::from_str("0.001").unwrap();
        let result = Transaction::new(1, "Tiny", tiny, "Misc", TransactionType::Expense, date(2024, 1, 1));
        assert_eq!(result, Err(TransactionError::NonPositiveAmount(tiny)));

        let mut tx = expense(2, "Lunch", 11.0);
        assert!(tx.set_amount(tiny).is_err());
        assert_eq!(tx.amount(), decimal(11.0));

        // rounds up to a cent, so it can be stored
        assert!(check_amount(Decimal::from_str("0.005").unwrap()).is_ok());
        let err = Transaction::decode("1,\"Tiny\",0.004,Misc,EXPENSE,2024-01-15").unwrap_err();
        assert!(matches!(err, DecodeError::NonPositiveAmount(_)));
    }

    #[test]
    fn test_new_rejects_non_positive_amount() {
        let result = Transaction::new(
            1,
            "Nothing",
            Decimal::ZERO,
            "Misc",
            TransactionType::Income,
            date(2024, 1, 1),
        );
        assert_eq!(result, Err(TransactionError::NonPositiveAmount(Decimal::ZERO)));
    }

    #[test]
    fn test_edit_fields() {
        let mut tx = expense(9, "Lunch", 11.0);
        tx.set_description("Brunch");
        tx.set_category("Eating Out");
        tx.set_amount(decimal(14.5)).unwrap();
        assert!(tx.set_amount(decimal(-1.0)).is_err());

        assert_eq!(tx.id(), 9);
        assert_eq!(tx.description(), "Brunch");
        assert_eq!(tx.category(), "Eating Out");
        assert_eq!(tx.amount(), decimal(14.5));
    }

    #[test]
    fn test_signed_amount() {
        let tx = expense(1, "Lunch", 11.0);
        assert_eq!(tx.signed_amount(), decimal(-11.0));
        assert!(tx.is_expense());
        assert!(!tx.is_income());
    }
}

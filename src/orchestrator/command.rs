use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::transactions::{TransactionType, check_amount};

pub const USAGE: &str = "\
usage: finance_ledger [--file <ledger.csv>] <command>

commands:
  add <income|expense> <amount> <category> <description...>
  remove <id>
  list
  categories
  month
  search <keyword>
  balance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        kind: TransactionType,
        amount: Decimal,
        category: String,
        description: String,
    },
    Remove(u32),
    List,
    Categories,
    Month,
    Search(String),
    Balance,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("no command given")]
    MissingCommand,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("type must be 'income' or 'expense', got '{0}'")]
    InvalidType(String),
    #[error("invalid amount '{0}', enter a positive number of at least 0.01")]
    InvalidAmount(String),
    #[error("invalid transaction id '{0}'")]
    InvalidId(String),
}

/// A parsed command line: optional ledger file override plus the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub file: Option<PathBuf>,
    pub command: Command,
}

impl Invocation {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self, UsageError> {
        let mut file = None;
        let mut rest = args;

        if let Some(flag) = rest.first() {
            if flag == "--file" || flag == "-f" {
                let path = rest.get(1).ok_or(UsageError::MissingArgument("ledger file path"))?;
                file = Some(PathBuf::from(path));
                rest = &rest[2..];
            }
        }

        Ok(Self {
            file,
            command: Command::parse(rest)?,
        })
    }
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self, UsageError> {
        let (name, rest) = args.split_first().ok_or(UsageError::MissingCommand)?;

        match name.as_str() {
            "add" => parse_add(rest),
            "remove" => {
                let raw = rest.first().ok_or(UsageError::MissingArgument("transaction id"))?;
                let id = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| UsageError::InvalidId(raw.clone()))?;
                Ok(Command::Remove(id))
            }
            "list" => Ok(Command::List),
            "categories" => Ok(Command::Categories),
            "month" => Ok(Command::Month),
            "search" => {
                let keyword = rest.join(" ");
                let keyword = keyword.trim();
                if keyword.is_empty() {
                    return Err(UsageError::Empty("search keyword"));
                }
                Ok(Command::Search(keyword.to_string()))
            }
            "balance" => Ok(Command::Balance),
            other => Err(UsageError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_add(args: &[String]) -> Result<Command, UsageError> {
    let kind = match args.first().map(|s| s.to_lowercase()) {
        Some(k) if k == "income" => TransactionType::Income,
        Some(k) if k == "expense" => TransactionType::Expense,
        Some(k) => return Err(UsageError::InvalidType(k)),
        None => return Err(UsageError::MissingArgument("transaction type")),
    };

    let raw_amount = args.get(1).ok_or(UsageError::MissingArgument("amount"))?;
    let amount = Decimal::from_str(raw_amount.trim())
        .ok()
        .filter(|a| check_amount(*a).is_ok())
        .ok_or_else(|| UsageError::InvalidAmount(raw_amount.clone()))?;

    let category = args
        .get(2)
        .ok_or(UsageError::MissingArgument("category"))?
        .trim()
        .to_string();
    if category.is_empty() {
        return Err(UsageError::Empty("category"));
    }

    let description = args.get(3..).unwrap_or_default().join(" ").trim().to_string();
    if description.is_empty() {
        return Err(UsageError::Empty("description"));
    }

    Ok(Command::Add {
        kind,
        amount,
        category,
        description,
    })
}

//! Expense models for CSV parsing and internal representation.

use crate::error::{EngineError, Result};
use crate::money::Money;
use crate::traveler::TravelerId;
use csv::{ReaderBuilder, Trim};
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;

/// One costed itinerary item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub amount: Money,

    /// Traveler who paid. `None` means nobody in particular, so the cost is
    /// shared evenly.
    pub payer_id: Option<TravelerId>,

    /// Split evenly among all travelers regardless of `payer_id`.
    pub is_split: bool,
}

impl Expense {
    /// An expense shared evenly by the whole group.
    pub fn split(amount: Money) -> Self {
        Expense {
            amount,
            payer_id: None,
            is_split: true,
        }
    }

    /// An expense paid in full by one traveler.
    pub fn paid_by(amount: Money, payer: impl Into<TravelerId>) -> Self {
        Expense {
            amount,
            payer_id: Some(payer.into()),
            is_split: false,
        }
    }

    /// Whether the amount is divided across the roster.
    pub fn is_shared(&self) -> bool {
        self.is_split || self.payer_id.is_none()
    }
}

/// Raw expense row as read from CSV (`amount,payer,split`).
///
/// Every column is optional text so that sloppy rows can still be
/// coerced rather than dropped.
#[derive(Debug, Deserialize)]
pub struct ExpenseRecord {
    pub amount: Option<String>,
    pub payer: Option<String>,
    pub split: Option<String>,
}

impl ExpenseRecord {
    /// Parses the raw CSV record into a validated expense.
    ///
    /// Missing or non-numeric amounts count as zero. Negative amounts,
    /// amounts above [`Money::MAX_EXPENSE`] and unreadable split flags are
    /// rejected.
    pub fn parse(&self, row: usize) -> Result<Expense> {
        let amount = self.parse_amount(row);
        if amount.is_negative() {
            return Err(EngineError::InvalidRecord {
                row,
                message: format!("negative amount {}", amount),
            });
        }
        if amount > Money::MAX_EXPENSE {
            return Err(EngineError::InvalidRecord {
                row,
                message: format!("amount {} exceeds {}", amount, Money::MAX_EXPENSE),
            });
        }

        let payer_id = self
            .payer
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(TravelerId::from);

        let is_split = match self.split.as_deref() {
            None => false,
            Some(flag) => parse_flag(flag).ok_or_else(|| EngineError::InvalidRecord {
                row,
                message: format!("unrecognized split flag '{}'", flag.trim()),
            })?,
        };

        Ok(Expense {
            amount,
            payer_id,
            is_split,
        })
    }

    fn parse_amount(&self, row: usize) -> Money {
        let Some(raw) = self.amount.as_deref().map(str::trim) else {
            warn!("Row {}: Missing amount, treating as 0", row);
            return Money::ZERO;
        };
        if raw.is_empty() {
            warn!("Row {}: Missing amount, treating as 0", row);
            return Money::ZERO;
        }
        Money::from_str(raw).unwrap_or_else(|_| {
            warn!("Row {}: Non-numeric amount '{}', treating as 0", row, raw);
            Money::ZERO
        })
    }
}

/// Parses a boolean-ish flag. Empty text means `false`.
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" => Some(false),
        "true" | "yes" | "y" | "1" => Some(true),
        _ => None,
    }
}

/// Reads expenses from CSV in streaming fashion.
///
/// Invalid records are logged at warn level and skipped.
pub fn read_expenses<R: Read>(reader: R) -> Result<Vec<Expense>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut expenses = Vec::new();

    for (row_idx, result) in csv_reader.deserialize::<ExpenseRecord>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        match result {
            Ok(record) => match record.parse(row_num) {
                Ok(expense) => expenses.push(expense),
                Err(e) => warn!("{}", e),
            },
            Err(e) => {
                warn!("Row {}: CSV parse error: {}", row_num, e);
            }
        }
    }

    Ok(expenses)
}

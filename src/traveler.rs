//! Traveler roster and per-traveler balances.

use crate::error::{EngineError, Result};
use crate::money::Money;
use csv::{ReaderBuilder, Trim};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;

/// Opaque traveler identifier, unique within a trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelerId(String);

impl TravelerId {
    pub fn new(id: impl Into<String>) -> Self {
        TravelerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TravelerId {
    fn from(id: &str) -> Self {
        TravelerId::new(id)
    }
}

impl fmt::Display for TravelerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant among whom trip costs are divided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traveler {
    pub id: TravelerId,
    pub name: String,
}

impl Traveler {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Traveler {
            id: TravelerId::new(id),
            name: name.into(),
        }
    }
}

/// A traveler's position after all expenses are attributed.
///
/// # Sign convention
///
/// A positive `net` means the group owes this traveler money (creditor);
/// a negative `net` means the traveler owes the group (debtor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub traveler_id: TravelerId,

    /// Everything credited to this traveler, including even-split shares.
    pub paid: Money,

    /// `paid - fair_share`.
    pub net: Money,
}

impl Balance {
    pub fn new(traveler_id: TravelerId, paid: Money, fair_share: Money) -> Self {
        Balance {
            traveler_id,
            paid,
            net: paid - fair_share,
        }
    }
}

/// Raw traveler row as read from CSV (`id,name`).
#[derive(Debug, Deserialize)]
pub struct TravelerRecord {
    pub id: String,
    pub name: Option<String>,
}

impl TravelerRecord {
    /// Validates the row. A blank name falls back to the id.
    pub fn parse(&self, row: usize) -> Result<Traveler> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(EngineError::InvalidRecord {
                row,
                message: "traveler id is empty".to_string(),
            });
        }

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(id);

        Ok(Traveler::new(id, name))
    }
}

/// Reads a traveler roster from CSV, keeping file order.
///
/// Invalid rows and duplicate ids are logged at warn level and skipped.
pub fn read_travelers<R: Read>(reader: R) -> Result<Vec<Traveler>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut seen = HashSet::new();
    let mut travelers = Vec::new();

    for (row_idx, result) in csv_reader.deserialize::<TravelerRecord>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Row {}: CSV parse error: {}", row_num, e);
                continue;
            }
        };

        match record.parse(row_num) {
            Ok(traveler) => {
                if !seen.insert(traveler.id.clone()) {
                    warn!(
                        "Row {}: Duplicate traveler id {}, ignoring",
                        row_num, traveler.id
                    );
                    continue;
                }
                travelers.push(traveler);
            }
            Err(e) => warn!("{}", e),
        }
    }

    Ok(travelers)
}

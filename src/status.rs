//! Persisted "settled" flags for computed settlements.
//!
//! Settlement amounts are always recomputed from current expenses; the only
//! state that survives between computations is whether the payer has marked
//! a given `from -> to` transfer as done.

use crate::error::{EngineError, Result};
use crate::expense::parse_flag;
use crate::traveler::TravelerId;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Ordered pair identifying a transfer. Direction matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementKey {
    pub from: TravelerId,
    pub to: TravelerId,
}

impl SettlementKey {
    pub fn new(from: TravelerId, to: TravelerId) -> Self {
        SettlementKey { from, to }
    }
}

/// Stored state of one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub is_settled: bool,
    pub settled_at: Option<DateTime<Utc>>,
}

/// In-memory settlement status store, keyed by trip and transfer direction.
///
/// Writes are upserts, so concurrent "mark settled" actions resolve as
/// last write wins.
#[derive(Debug, Default)]
pub struct SettlementStatusStore {
    trips: HashMap<String, HashMap<SettlementKey, SettlementRecord>>,
}

impl SettlementStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `from` has paid `to` for `trip_id`.
    pub fn mark_settled(
        &mut self,
        trip_id: &str,
        from: TravelerId,
        to: TravelerId,
        at: DateTime<Utc>,
    ) {
        debug!("Trip {}: {} -> {} marked settled", trip_id, from, to);
        self.upsert(
            trip_id,
            SettlementKey::new(from, to),
            SettlementRecord {
                is_settled: true,
                settled_at: Some(at),
            },
        );
    }

    /// Reverts a transfer to unsettled and clears its timestamp.
    pub fn mark_unsettled(&mut self, trip_id: &str, from: TravelerId, to: TravelerId) {
        debug!("Trip {}: {} -> {} marked unsettled", trip_id, from, to);
        self.upsert(
            trip_id,
            SettlementKey::new(from, to),
            SettlementRecord {
                is_settled: false,
                settled_at: None,
            },
        );
    }

    pub fn upsert(&mut self, trip_id: &str, key: SettlementKey, record: SettlementRecord) {
        self.trips
            .entry(trip_id.to_string())
            .or_default()
            .insert(key, record);
    }

    pub fn record(
        &self,
        trip_id: &str,
        from: &TravelerId,
        to: &TravelerId,
    ) -> Option<&SettlementRecord> {
        self.trips
            .get(trip_id)?
            .get(&SettlementKey::new(from.clone(), to.clone()))
    }

    /// The `(from, to) -> settled` view consumed by
    /// [`crate::SettlementEngine::merge_settlement_status`].
    pub fn status_for_trip(&self, trip_id: &str) -> HashMap<SettlementKey, bool> {
        self.trips
            .get(trip_id)
            .map(|records| {
                records
                    .iter()
                    .map(|(key, record)| (key.clone(), record.is_settled))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Raw status row as read from CSV (`from,to,settled,settled_at`).
#[derive(Debug, Deserialize)]
pub struct StatusRecord {
    pub from: String,
    pub to: String,
    pub settled: Option<String>,
    pub settled_at: Option<String>,
}

impl StatusRecord {
    pub fn parse(&self, row: usize) -> Result<(SettlementKey, SettlementRecord)> {
        let from = self.from.trim();
        let to = self.to.trim();
        if from.is_empty() || to.is_empty() {
            return Err(EngineError::InvalidRecord {
                row,
                message: "settlement status needs both from and to".to_string(),
            });
        }

        // A bare `from,to` row means the transfer was marked settled.
        let is_settled = match self.settled.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(flag) => parse_flag(flag).ok_or_else(|| EngineError::InvalidRecord {
                row,
                message: format!("unrecognized settled flag '{}'", flag),
            })?,
        };

        let settled_at = match self.settled_at.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| EngineError::InvalidRecord {
                        row,
                        message: format!("bad settled_at '{}': {}", raw, e),
                    })?
                    .with_timezone(&Utc),
            ),
        };

        Ok((
            SettlementKey::new(TravelerId::from(from), TravelerId::from(to)),
            SettlementRecord {
                is_settled,
                settled_at,
            },
        ))
    }
}

/// Loads persisted status rows for one trip into `store`.
///
/// Later rows for the same pair overwrite earlier ones. Invalid rows are
/// logged at warn level and skipped.
pub fn read_status<R: Read>(
    reader: R,
    trip_id: &str,
    store: &mut SettlementStatusStore,
) -> Result<()> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    for (row_idx, result) in csv_reader.deserialize::<StatusRecord>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        match result {
            Ok(record) => match record.parse(row_num) {
                Ok((key, status)) => store.upsert(trip_id, key, status),
                Err(e) => warn!("{}", e),
            },
            Err(e) => warn!("Row {}: CSV parse error: {}", row_num, e),
        }
    }

    Ok(())
}

//! Presentation of a cost breakdown.
//!
//! This is the only place where amounts are rounded to cents.

use crate::engine::{CostBreakdown, Settlement};
use crate::error::Result;
use crate::money::{serialize_cents, Money};
use crate::traveler::{Traveler, TravelerId};
use serde::Serialize;
use std::io::Write;

/// A traveler's line in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravelerLine {
    pub traveler_id: TravelerId,
    pub name: String,
    #[serde(serialize_with = "serialize_cents")]
    pub paid: Money,
    #[serde(serialize_with = "serialize_cents")]
    pub net: Money,
}

/// A transfer line in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementLine {
    pub from: TravelerId,
    pub from_name: String,
    pub to: TravelerId,
    pub to_name: String,
    #[serde(serialize_with = "serialize_cents")]
    pub amount: Money,
    pub is_settled: bool,
}

/// Cost breakdown with every amount rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostReport {
    #[serde(serialize_with = "serialize_cents")]
    pub total: Money,
    #[serde(serialize_with = "serialize_cents")]
    pub per_person: Money,
    pub paid_by: Vec<TravelerLine>,
    pub settlements: Vec<SettlementLine>,
}

impl CostReport {
    /// Rounds `breakdown` for display, attaching traveler names.
    ///
    /// Ids missing from `travelers` are shown under their id.
    pub fn from_breakdown(breakdown: &CostBreakdown, travelers: &[Traveler]) -> Self {
        let name_of = |id: &TravelerId| -> String {
            travelers
                .iter()
                .find(|t| &t.id == id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let paid_by = breakdown
            .balances
            .iter()
            .map(|b| TravelerLine {
                traveler_id: b.traveler_id.clone(),
                name: name_of(&b.traveler_id),
                paid: b.paid.rounded(),
                net: b.net.rounded(),
            })
            .collect();

        let settlements = breakdown
            .settlements
            .iter()
            .map(|s: &Settlement| SettlementLine {
                from: s.from.clone(),
                from_name: name_of(&s.from),
                to: s.to.clone(),
                to_name: name_of(&s.to),
                amount: s.amount.rounded(),
                is_settled: s.is_settled,
            })
            .collect();

        CostReport {
            total: breakdown.total.rounded(),
            per_person: breakdown.per_person.rounded(),
            paid_by,
            settlements,
        }
    }

    /// Writes the report as three CSV sections separated by blank lines:
    /// summary, per-traveler balances and settlements.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            csv_writer.write_record(["total", "per_person"])?;
            csv_writer.write_record([self.total.to_string(), self.per_person.to_string()])?;
            csv_writer.flush()?;
        }
        writer.write_all(b"\n")?;

        {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            csv_writer.write_record(["traveler", "name", "paid", "net"])?;
            for line in &self.paid_by {
                csv_writer.write_record([
                    line.traveler_id.to_string(),
                    line.name.clone(),
                    line.paid.to_string(),
                    line.net.to_string(),
                ])?;
            }
            csv_writer.flush()?;
        }
        writer.write_all(b"\n")?;

        {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            csv_writer.write_record(["from", "to", "amount", "settled"])?;
            for line in &self.settlements {
                csv_writer.write_record([
                    line.from.to_string(),
                    line.to.to_string(),
                    line.amount.to_string(),
                    line.is_settled.to_string(),
                ])?;
            }
            csv_writer.flush()?;
        }

        writer.flush()?;
        Ok(())
    }
}

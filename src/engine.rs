//! Core cost-splitting and settlement engine.
//!
//! Attributes every expense to the travelers who paid for it, measures each
//! traveler against an even share of the total, and matches debtors with
//! creditors until every balance is within tolerance of zero.

use crate::expense::Expense;
use crate::money::Money;
use crate::status::SettlementKey;
use crate::traveler::{Balance, Traveler, TravelerId};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;

/// A directed payment instruction between two travelers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub from: TravelerId,
    pub to: TravelerId,

    /// Always greater than the engine tolerance.
    pub amount: Money,

    /// Overlaid from the persisted status store; never computed.
    pub is_settled: bool,
}

impl Settlement {
    pub fn key(&self) -> SettlementKey {
        SettlementKey::new(self.from.clone(), self.to.clone())
    }
}

/// The full result of splitting a trip's costs.
///
/// Amounts carry full precision. Use [`crate::CostReport`] for values
/// rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub total: Money,
    pub per_person: Money,

    /// One entry per roster traveler, in roster order.
    pub balances: Vec<Balance>,

    pub settlements: Vec<Settlement>,
}

impl CostBreakdown {
    /// Breakdown of a trip with nobody to split costs between.
    pub fn empty() -> Self {
        CostBreakdown {
            total: Money::ZERO,
            per_person: Money::ZERO,
            balances: Vec::new(),
            settlements: Vec::new(),
        }
    }

    pub fn balance_of(&self, traveler: &TravelerId) -> Option<&Balance> {
        self.balances.iter().find(|b| &b.traveler_id == traveler)
    }
}

/// The settlement engine.
///
/// Stateless apart from its tolerance, so one instance can serve any number
/// of trips concurrently.
///
/// # Known limitation
///
/// Debtors and creditors are matched greedily in roster order. The result
/// always zeroes every balance but is not guaranteed to use the fewest
/// possible transfers once four or more travelers are unbalanced.
#[derive(Debug, Clone, Copy)]
pub struct SettlementEngine {
    /// Balances within this distance of zero count as settled.
    tolerance: Money,
}

impl SettlementEngine {
    /// Creates an engine with a one-cent tolerance.
    pub fn new() -> Self {
        Self::with_tolerance(Money::CENT)
    }

    pub fn with_tolerance(tolerance: Money) -> Self {
        SettlementEngine {
            tolerance: tolerance.abs(),
        }
    }

    pub fn tolerance(&self) -> Money {
        self.tolerance
    }

    /// Splits `expenses` across `travelers` and computes the settlements.
    ///
    /// An empty roster yields [`CostBreakdown::empty`]. Expenses whose payer
    /// is not on the roster still count toward the total but the payer's
    /// credit is not reported.
    pub fn compute_breakdown(
        &self,
        expenses: &[Expense],
        travelers: &[Traveler],
    ) -> CostBreakdown {
        if travelers.is_empty() {
            debug!("No travelers, returning empty breakdown");
            return CostBreakdown::empty();
        }

        let headcount = travelers.len();
        let mut paid: IndexMap<TravelerId, Money> = travelers
            .iter()
            .map(|t| (t.id.clone(), Money::ZERO))
            .collect();

        for expense in expenses {
            if expense.is_shared() {
                let share = expense.amount.split(headcount);
                for traveler in travelers {
                    *paid.entry(traveler.id.clone()).or_default() += share;
                }
                continue;
            }

            if let Some(payer) = &expense.payer_id {
                if !paid.contains_key(payer) {
                    warn!(
                        "Payer {} is not on the roster, {} will not be credited",
                        payer, expense.amount
                    );
                }
                *paid.entry(payer.clone()).or_default() += expense.amount;
            }
        }

        let total: Money = expenses.iter().map(|e| e.amount).sum();
        let per_person = total.split(headcount);

        let balances: Vec<Balance> = travelers
            .iter()
            .map(|t| {
                let credited = paid.get(&t.id).copied().unwrap_or_default();
                Balance::new(t.id.clone(), credited, per_person)
            })
            .collect();

        let settlements = self.compute_settlements(&balances);

        debug!(
            "Split {} among {} travelers ({} each), {} settlements",
            total,
            headcount,
            per_person,
            settlements.len()
        );

        CostBreakdown {
            total,
            per_person,
            balances,
            settlements,
        }
    }

    /// Greedily matches debtors with creditors until one side runs out.
    ///
    /// Both sides keep roster order, and settlements come out in the order
    /// they are generated.
    pub fn compute_settlements(&self, balances: &[Balance]) -> Vec<Settlement> {
        let mut debtors: Vec<(&TravelerId, Money)> = balances
            .iter()
            .filter(|b| b.net < -self.tolerance)
            .map(|b| (&b.traveler_id, -b.net))
            .collect();
        let mut creditors: Vec<(&TravelerId, Money)> = balances
            .iter()
            .filter(|b| b.net > self.tolerance)
            .map(|b| (&b.traveler_id, b.net))
            .collect();

        let mut settlements = Vec::new();
        let (mut d, mut c) = (0, 0);

        while d < debtors.len() && c < creditors.len() {
            let (debtor, owes) = debtors[d];
            let (creditor, owed) = creditors[c];
            let amount = owes.min(owed);

            if amount > self.tolerance {
                debug!("{} pays {} {}", debtor, creditor, amount);
                settlements.push(Settlement {
                    from: debtor.clone(),
                    to: creditor.clone(),
                    amount,
                    is_settled: false,
                });
            }

            debtors[d].1 -= amount;
            creditors[c].1 -= amount;

            if debtors[d].1 <= self.tolerance {
                d += 1;
            }
            if creditors[c].1 <= self.tolerance {
                c += 1;
            }
        }

        settlements
    }

    /// Overlays persisted "settled" flags onto freshly computed settlements.
    ///
    /// Matching is by exact direction: a stored `A -> B` flag says nothing
    /// about a computed `B -> A` transfer.
    pub fn merge_settlement_status(
        &self,
        settlements: Vec<Settlement>,
        persisted: &HashMap<SettlementKey, bool>,
    ) -> Vec<Settlement> {
        settlements
            .into_iter()
            .map(|mut s| {
                s.is_settled = persisted.get(&s.key()).copied().unwrap_or(false);
                s
            })
            .collect()
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new()
    }
}

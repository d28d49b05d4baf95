//! # Trip Settlement
//!
//! Splits shared trip costs among a fixed roster of travelers and computes
//! the transfers that settle everyone up.
//!
//! ## Design Principles
//!
//! - **Pure core**: [`SettlementEngine`] does no I/O and holds no state
//! - **Fixed-point arithmetic**: amounts use `rust_decimal` at full precision
//! - **Late rounding**: cents only appear in [`CostReport`]
//! - **Deterministic output**: balances and transfers follow roster order
//!
//! ## Example
//!
//! ```
//! use std::str::FromStr;
//! use trip_settlement::{Expense, Money, SettlementEngine, Traveler};
//!
//! let travelers = vec![Traveler::new("a", "Ana"), Traveler::new("b", "Ben")];
//! let expenses = vec![Expense::paid_by(Money::from_str("100").unwrap(), "a")];
//!
//! let breakdown = SettlementEngine::new().compute_breakdown(&expenses, &travelers);
//! assert_eq!(breakdown.settlements[0].from.as_str(), "b");
//! assert_eq!(breakdown.settlements[0].amount.to_string(), "50.00");
//! ```

pub mod engine;
pub mod error;
pub mod expense;
pub mod money;
pub mod report;
pub mod roster;
pub mod status;
pub mod traveler;

pub use engine::{CostBreakdown, Settlement, SettlementEngine};
pub use error::{EngineError, Result};
pub use expense::{read_expenses, Expense, ExpenseRecord};
pub use money::Money;
pub use report::{CostReport, SettlementLine, TravelerLine};
pub use roster::{resolve_roster, travelers_from_metadata};
pub use status::{read_status, SettlementKey, SettlementRecord, SettlementStatusStore};
pub use traveler::{read_travelers, Balance, Traveler, TravelerId, TravelerRecord};

//! Trip Settlement CLI
//!
//! Reads a traveler roster and a list of expenses, then prints the cost
//! breakdown and the transfers that settle it.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- travelers.csv expenses.csv [status.csv] > report.csv
//! ```
//!
//! The roster may also be a trip metadata `.json` file, in which case
//! travelers are read from `generated_content.travelers`.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::process;
use trip_settlement::{
    read_expenses, read_status, read_travelers, resolve_roster, CostReport, EngineError, Result,
    SettlementEngine, SettlementStatusStore, Traveler,
};

/// Status files describe a single trip.
const CLI_TRIP: &str = "cli";

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(EngineError::MissingArgument);
    }

    let travelers = load_roster(Path::new(&args[1]))?;
    let expenses = read_expenses(BufReader::new(File::open(&args[2])?))?;

    let mut store = SettlementStatusStore::new();
    if let Some(status_path) = args.get(3) {
        read_status(BufReader::new(File::open(status_path)?), CLI_TRIP, &mut store)?;
    }

    let engine = SettlementEngine::new();
    let mut breakdown = engine.compute_breakdown(&expenses, &travelers);
    breakdown.settlements =
        engine.merge_settlement_status(breakdown.settlements, &store.status_for_trip(CLI_TRIP));

    let report = CostReport::from_breakdown(&breakdown, &travelers);

    let stdout = io::stdout();
    let handle = stdout.lock();
    report.write_csv(handle)?;

    Ok(())
}

fn load_roster(path: &Path) -> Result<Vec<Traveler>> {
    let reader = BufReader::new(File::open(path)?);

    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        let metadata: serde_json::Value = serde_json::from_reader(reader)?;
        return resolve_roster(Vec::new(), Some(&metadata));
    }

    read_travelers(reader)
}

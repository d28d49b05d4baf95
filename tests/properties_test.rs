use proptest::prelude::*;
use trip_settlement::{Expense, Money, SettlementEngine, Traveler, TravelerId};

fn roster(count: usize) -> Vec<Traveler> {
    (0..count)
        .map(|idx| Traveler::new(format!("t{}", idx), format!("Traveler {}", idx)))
        .collect()
}

fn expenses(
    member_count: usize,
    cents: &[i64],
    payer_indexes: &[usize],
    split_flags: &[bool],
) -> Vec<Expense> {
    cents
        .iter()
        .enumerate()
        .map(|(idx, &amount)| {
            let amount = Money::from_cents(amount);
            let is_split = split_flags.get(idx).copied().unwrap_or(false);
            let payer_idx = payer_indexes.get(idx).copied().unwrap_or(0) % member_count;
            Expense {
                amount,
                payer_id: Some(TravelerId::new(format!("t{}", payer_idx))),
                is_split,
            }
        })
        .collect()
}

fn micro() -> Money {
    Money::from_cents(1).split(10_000)
}

proptest! {
    #[test]
    fn paid_amounts_conserve_total(
        member_count in 1usize..=6,
        cents in prop::collection::vec(0i64..=1_000_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=30),
        split_flags in prop::collection::vec(any::<bool>(), 0..=30),
    ) {
        let expenses = expenses(member_count, &cents, &payer_indexes, &split_flags);
        let breakdown = SettlementEngine::new().compute_breakdown(&expenses, &roster(member_count));

        let paid: Money = breakdown.balances.iter().map(|b| b.paid).sum();
        let total: Money = expenses.iter().map(|e| e.amount).sum();
        prop_assert_eq!(breakdown.total, total);
        prop_assert!((paid - total).abs() < micro());
    }

    #[test]
    fn net_balances_sum_to_zero(
        member_count in 1usize..=6,
        cents in prop::collection::vec(0i64..=1_000_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=30),
        split_flags in prop::collection::vec(any::<bool>(), 0..=30),
    ) {
        let expenses = expenses(member_count, &cents, &payer_indexes, &split_flags);
        let breakdown = SettlementEngine::new().compute_breakdown(&expenses, &roster(member_count));

        let net: Money = breakdown.balances.iter().map(|b| b.net).sum();
        prop_assert!(net.abs() < micro());
    }

    #[test]
    fn transfers_are_positive_and_settle_everyone(
        member_count in 1usize..=6,
        cents in prop::collection::vec(0i64..=1_000_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=30),
        split_flags in prop::collection::vec(any::<bool>(), 0..=30),
    ) {
        let engine = SettlementEngine::new();
        let expenses = expenses(member_count, &cents, &payer_indexes, &split_flags);
        let breakdown = engine.compute_breakdown(&expenses, &roster(member_count));

        prop_assert!(breakdown.settlements.len() < member_count.max(1));

        let mut remaining: Vec<(TravelerId, Money)> = breakdown
            .balances
            .iter()
            .map(|b| (b.traveler_id.clone(), b.net))
            .collect();
        for settlement in &breakdown.settlements {
            prop_assert!(settlement.amount > Money::ZERO);
            prop_assert!(!settlement.is_settled);
            prop_assert_ne!(&settlement.from, &settlement.to);
            for (traveler, net) in remaining.iter_mut() {
                if *traveler == settlement.from {
                    *net += settlement.amount;
                } else if *traveler == settlement.to {
                    *net -= settlement.amount;
                }
            }
        }

        // sub-tolerance leftovers can pile up on one traveler, at most one per member
        let mut slack = micro();
        for _ in 0..member_count {
            slack += engine.tolerance();
        }
        for (_, net) in remaining {
            prop_assert!(net.abs() <= slack);
        }
    }

    #[test]
    fn computation_is_deterministic(
        member_count in 1usize..=6,
        cents in prop::collection::vec(0i64..=1_000_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=30),
        split_flags in prop::collection::vec(any::<bool>(), 0..=30),
    ) {
        let engine = SettlementEngine::new();
        let expenses = expenses(member_count, &cents, &payer_indexes, &split_flags);
        let travelers = roster(member_count);

        let first = engine.compute_breakdown(&expenses, &travelers);
        let second = engine.compute_breakdown(&expenses, &travelers);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn single_traveler_has_no_settlements(
        cents in prop::collection::vec(0i64..=1_000_000, 0..=30),
        split_flags in prop::collection::vec(any::<bool>(), 0..=30),
    ) {
        let expenses = expenses(1, &cents, &[], &split_flags);
        let breakdown = SettlementEngine::new().compute_breakdown(&expenses, &roster(1));
        prop_assert!(breakdown.settlements.is_empty());
    }
}

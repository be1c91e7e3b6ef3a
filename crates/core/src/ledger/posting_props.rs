//! Property tests for posting and reversal planning.

use proptest::prelude::*;

use cortado_shared::types::{MinorUnits, UserId};

use super::posting::{PostingPlan, PostingService};
use super::reversal::{OriginalTransaction, ReversalService};
use super::types::{AccountCode, EntrySide, TransactionKind};
use cortado_shared::types::TransactionId;

/// Strategy for positive minor-unit amounts.
fn amount_strategy() -> impl Strategy<Value = MinorUnits> {
    (1i64..10_000_000i64).prop_map(MinorUnits::new)
}

/// Strategy for the three directly-postable kinds.
fn postable_kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Topup),
        Just(TransactionKind::Charge),
        Just(TransactionKind::Bonus),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every plan yields one debit and one credit of the same positive
    /// amount, so the per-transaction invariant holds by construction.
    #[test]
    fn prop_plans_always_balance(
        kind in postable_kind_strategy(),
        amount in amount_strategy(),
    ) {
        let plan = PostingService::plan(kind, UserId::new(), amount).unwrap();

        prop_assert!(plan.entries.is_balanced());
        prop_assert_eq!(plan.entries.debit.side, EntrySide::Debit);
        prop_assert_eq!(plan.entries.credit.side, EntrySide::Credit);
        prop_assert_eq!(plan.entries.debit.amount, amount);
        prop_assert_eq!(plan.entries.credit.amount, amount);
        prop_assert!(PostingService::verify_pair(&plan.entries).is_ok());
    }

    /// Every plan touches the customer wallet on exactly one side.
    #[test]
    fn prop_plans_touch_wallet_once(
        kind in postable_kind_strategy(),
        amount in amount_strategy(),
    ) {
        let user = UserId::new();
        let plan = PostingService::plan(kind, user, amount).unwrap();

        let wallet_entries = plan
            .entries
            .entries()
            .iter()
            .filter(|e| e.account.code == AccountCode::CustomerFunds)
            .count();
        prop_assert_eq!(wallet_entries, 1);

        for entry in plan.entries.entries() {
            let keyed = entry.account.code.is_per_customer();
            prop_assert_eq!(entry.account.user_id.is_some(), keyed);
        }
    }

    /// A reversal's deltas are the exact negation of the original's, so
    /// committing both leaves every balance where it started.
    #[test]
    fn prop_reversal_cancels_original(
        kind in postable_kind_strategy(),
        amount in amount_strategy(),
    ) {
        let plan = PostingService::plan(kind, UserId::new(), amount).unwrap();
        let original = OriginalTransaction {
            id: TransactionId::new(),
            kind: plan.kind,
            entries: plan.entries,
        };
        let mirrored = ReversalService::plan(&original).unwrap();
        let reversal_plan = PostingPlan {
            kind: TransactionKind::Reversal,
            entries: mirrored,
        };

        let mut net: std::collections::HashMap<_, i64> = std::collections::HashMap::new();
        for delta in plan
            .balance_deltas()
            .into_iter()
            .chain(reversal_plan.balance_deltas())
        {
            *net.entry(delta.account).or_default() += delta.change.value();
        }
        for (account, sum) in net {
            prop_assert_eq!(sum, 0, "account {:?} did not return to zero", account);
        }
    }

    /// Non-positive amounts never produce a plan.
    #[test]
    fn prop_non_positive_amounts_rejected(
        kind in postable_kind_strategy(),
        amount in -10_000i64..=0i64,
    ) {
        let result = PostingService::plan(kind, UserId::new(), MinorUnits::new(amount));
        prop_assert!(result.is_err());
    }
}

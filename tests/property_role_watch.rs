use proptest::prelude::*;

use scriptchain::engine::{evaluate_policy, Completion, RoleWatch};
use scriptchain::types::CompletionPolicy;

fn policy_strategy() -> impl Strategy<Value = CompletionPolicy> {
    prop_oneof![
        Just(CompletionPolicy::ScriptClosed),
        Just(CompletionPolicy::GameClosed),
        Just(CompletionPolicy::GameOrScriptClosed),
        "[a-z_]{1,12}".prop_map(CompletionPolicy::from),
    ]
}

proptest! {
    #[test]
    fn closed_only_after_seen_and_now_absent(
        presence in proptest::collection::vec(any::<bool>(), 0..64)
    ) {
        let mut role = RoleWatch::new();
        let mut seen = false;

        for present in presence {
            let closed = role.observe(present);
            prop_assert_eq!(closed, seen && !present);
            seen |= present;
            prop_assert_eq!(role.ever_existed(), seen);
        }
    }

    #[test]
    fn never_present_never_closes(len in 0usize..64) {
        let mut role = RoleWatch::new();
        for _ in 0..len {
            prop_assert!(!role.observe(false));
        }
    }

    #[test]
    fn policy_never_fires_without_a_closed_role(policy in policy_strategy()) {
        let result = evaluate_policy(&policy, false, false);
        match policy {
            CompletionPolicy::Unknown(raw) => {
                prop_assert_eq!(result, Some(Completion::UnknownPolicy(raw)));
            }
            _ => prop_assert_eq!(result, None),
        }
    }

    #[test]
    fn parsed_policy_survives_a_string_round_trip(raw in "[A-Za-z_ ]{0,24}") {
        let policy = CompletionPolicy::from(raw.clone());
        let back: String = policy.clone().into();
        prop_assert_eq!(CompletionPolicy::from(back), policy);
    }
}

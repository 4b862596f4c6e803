use proptest::prelude::*;

use ballot_types::{AccountId, WorkflowStatus};

proptest! {
    /// Only the six defined discriminants decode to a phase.
    #[test]
    fn status_decodes_only_known_values(raw in any::<u8>()) {
        let decoded = WorkflowStatus::try_from(raw);
        prop_assert_eq!(decoded.is_ok(), raw <= 5);
        if let Ok(status) = decoded {
            prop_assert_eq!(status.as_u8(), raw);
        }
    }

    /// Phase ordering agrees with the numeric order.
    #[test]
    fn status_ordering_matches_numeric(a in 0u8..=5, b in 0u8..=5) {
        let sa = WorkflowStatus::try_from(a).unwrap();
        let sb = WorkflowStatus::try_from(b).unwrap();
        prop_assert_eq!(sa < sb, a < b);
        prop_assert_eq!(sa == sb, a == b);
    }

    /// `next` always advances by exactly one step.
    #[test]
    fn status_next_is_single_step(raw in 0u8..5) {
        let status = WorkflowStatus::try_from(raw).unwrap();
        let next = status.next().unwrap();
        prop_assert_eq!(next.as_u8(), raw + 1);
    }

    /// Parsing accepts exactly the non-empty, whitespace-free identities.
    #[test]
    fn account_parse_matches_validity(raw in "\\PC{0,12}") {
        let expected = !raw.is_empty() && !raw.chars().any(char::is_whitespace);
        prop_assert_eq!(raw.parse::<AccountId>().is_ok(), expected);
    }

    /// Identities survive the wire encoding used by snapshots.
    #[test]
    fn account_bincode_roundtrip(raw in "[a-zA-Z0-9_]{1,42}") {
        let id = AccountId::new(raw);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: AccountId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }
}

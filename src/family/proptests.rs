//! Property-based tests for the family record merge engine

use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

/// Small pools so generated records collide often
fn arb_name() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(prop_oneof![Just("Ana"), Just("Lee"), Just("John")].prop_map(String::from))
}

fn arb_role() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(
        prop_oneof![Just("mother"), Just("father"), Just("sister")].prop_map(String::from),
    )
}

fn arb_member() -> impl Strategy<Value = FamilyMember> {
    (
        arb_role(),
        arb_name(),
        proptest::option::of(0u32..100),
        proptest::collection::btree_set(
            prop_oneof![Just("quiet"), Just("distant"), Just("warm")].prop_map(String::from),
            0..3,
        ),
    )
        .prop_map(|(role, name, age, attributes)| FamilyMember {
            role,
            name,
            age,
            attributes,
        })
        .prop_filter("blank members never survive parsing", |m| !m.is_blank())
}

fn arb_members_list() -> impl Strategy<Value = Option<Vec<String>>> {
    proptest::option::of(proptest::collection::vec(arb_text(), 0..3))
}

fn arb_relationship() -> impl Strategy<Value = Relationship> {
    (
        prop_oneof![Just("marriage"), Just("siblings")].prop_map(String::from),
        proptest::collection::vec(arb_text(), 0..3),
        proptest::option::of(arb_text()),
        proptest::option::of(arb_text()),
    )
        .prop_map(|(kind, members, quality, duration)| Relationship {
            kind,
            members,
            quality,
            duration,
        })
}

fn arb_dynamic() -> impl Strategy<Value = Dynamic> {
    (arb_text(), arb_text(), arb_members_list()).prop_map(|(kind, pattern, members)| Dynamic {
        kind,
        pattern,
        members,
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    (arb_text(), arb_text(), arb_members_list()).prop_map(|(kind, description, members)| {
        Event {
            kind,
            description,
            members,
        }
    })
}

fn arb_family_data() -> impl Strategy<Value = FamilyData> {
    (
        proptest::collection::vec(arb_member(), 0..6),
        proptest::collection::vec(arb_relationship(), 0..4),
        proptest::collection::vec(arb_dynamic(), 0..3),
        proptest::collection::vec(arb_event(), 0..3),
    )
        .prop_map(|(family_members, relationships, dynamics, events)| FamilyData {
            family_members,
            relationships,
            dynamics,
            events,
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn merge_is_idempotent(x in arb_family_data()) {
        let mut once = EntityStore::new();
        once.merge(x.clone());

        let mut twice = EntityStore::new();
        twice.merge(x.clone());
        twice.merge(x);

        prop_assert_eq!(once.data(), twice.data());
    }

    #[test]
    fn merge_into_existing_is_idempotent(base in arb_family_data(), x in arb_family_data()) {
        let mut store = EntityStore::new();
        store.merge(base);
        store.merge(x.clone());
        let after_first = store.snapshot();
        store.merge(x);
        prop_assert_eq!(&after_first, store.data());
    }

    #[test]
    fn names_stay_unique(batches in proptest::collection::vec(arb_family_data(), 1..4)) {
        let mut store = EntityStore::new();
        for batch in batches {
            store.merge(batch);
        }
        let mut names: Vec<&str> = store
            .data()
            .family_members
            .iter()
            .filter_map(|m| m.name.as_deref())
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), total);
    }

    #[test]
    fn attributes_never_shrink(base in arb_family_data(), x in arb_family_data()) {
        let mut store = EntityStore::new();
        store.merge(base);
        let before = store.snapshot();
        store.merge(x);

        // Records only ever get appended, so positions line up
        for (old, new) in before.family_members.iter().zip(&store.data().family_members) {
            prop_assert!(old.attributes.is_subset(&new.attributes));
            prop_assert_eq!(&old.name, &new.name);
            if old.age.is_some() {
                prop_assert_eq!(old.age, new.age);
            }
        }
        prop_assert!(store.data().relationships.starts_with(&before.relationships));
    }

    #[test]
    fn restore_of_snapshot_round_trips(x in arb_family_data()) {
        let mut source = EntityStore::new();
        source.merge(x);
        let snap = source.snapshot();

        let mut target = EntityStore::new();
        target.restore(snap.clone());
        prop_assert_eq!(target.data(), &snap);

        // Same through the serialized form a persistence layer would hold
        let json = serde_json::to_string(&snap).unwrap();
        let decoded: FamilyData = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, snap);
    }
}

//! Role matrix and property tests for ability evaluation.

use parapet_types::{Action, AttributeMap, Principal, Role, SubjectType, UserId};
use proptest::prelude::*;
use test_case::test_case;

use crate::build;

fn principal(id: u64, role: Role) -> Principal {
    Principal::new(id, role, format!("{id}@test.com"))
}

fn document(id: i64, owner: u64) -> AttributeMap {
    AttributeMap::new()
        .with("id", id)
        .with("ownerId", UserId::new(owner))
        .with("title", "test")
}

fn user_profile(id: u64) -> AttributeMap {
    AttributeMap::new()
        .with("id", UserId::new(id))
        .with("role", Role::User)
}

// ============================================================================
// Type-level matrix (no instance)
// ============================================================================

#[test_case(Role::Admin, "manage", "all", true; "admin manage all")]
#[test_case(Role::Admin, "delete", "User", true; "admin delete user")]
#[test_case(Role::Manager, "read", "User", true; "manager read user")]
#[test_case(Role::Manager, "aggregate", "User", true; "manager aggregate user")]
#[test_case(Role::Manager, "read", "Document", true; "manager read document")]
#[test_case(Role::Manager, "create", "Document", false; "manager cannot create document")]
#[test_case(Role::Manager, "update", "Document", false; "manager cannot update document")]
#[test_case(Role::Manager, "delete", "Document", false; "manager cannot delete document")]
#[test_case(Role::Manager, "manage", "User", false; "manager cannot manage user")]
#[test_case(Role::Manager, "delete", "User", false; "manager cannot delete user")]
#[test_case(Role::User, "create", "Document", true; "user create document")]
#[test_case(Role::User, "read", "Document", false; "user static read document needs instance")]
#[test_case(Role::User, "read", "User", false; "user static read user needs instance")]
#[test_case(Role::User, "aggregate", "User", false; "user cannot aggregate")]
#[test_case(Role::User, "delete", "User", false; "user cannot delete user")]
fn static_check(role: Role, action: &'static str, subject: &'static str, expected: bool) {
    let ability = build(&principal(3, role));
    let action = Action::new(action);
    let subject = SubjectType::new(subject);

    assert_eq!(ability.can(&action, &subject, None), expected);
    assert_eq!(ability.cannot(&action, &subject, None), !expected);
}

// ============================================================================
// Instance-level checks
// ============================================================================

#[test]
fn user_reads_own_document_only() {
    let ability = build(&principal(1, Role::User));

    assert!(ability.can(&Action::READ, &SubjectType::DOCUMENT, Some(&document(5, 1))));
    assert!(ability.cannot(&Action::READ, &SubjectType::DOCUMENT, Some(&document(5, 2))));
}

#[test]
fn user_reads_own_profile_only() {
    let ability = build(&principal(3, Role::User));

    assert!(ability.can(&Action::READ, &SubjectType::USER, Some(&user_profile(3))));
    assert!(ability.cannot(&Action::READ, &SubjectType::USER, Some(&user_profile(4))));
}

#[test]
fn user_profile_condition_does_not_apply_to_documents() {
    // A document whose *id* equals the principal id is not owned by them.
    let ability = build(&principal(5, Role::User));

    assert!(ability.cannot(&Action::READ, &SubjectType::DOCUMENT, Some(&document(5, 1))));
}

#[test]
fn manager_reads_any_document_but_never_mutates() {
    let ability = build(&principal(2, Role::Manager));
    let doc = document(9, 7);

    assert!(ability.can(&Action::READ, &SubjectType::DOCUMENT, Some(&doc)));
    assert!(ability.cannot(&Action::UPDATE, &SubjectType::DOCUMENT, Some(&doc)));
    assert!(ability.cannot(&Action::DELETE, &SubjectType::DOCUMENT, Some(&doc)));
}

#[test]
fn admin_reads_untyped_json_instance() {
    let ability = build(&principal(1, Role::Admin));
    let json = serde_json::json!({"id": 44, "ownerId": 99});

    assert!(ability.can(&Action::UPDATE, &SubjectType::DOCUMENT, Some(&json)));
}

#[test]
fn ownership_condition_holds_for_ids_beyond_i64() {
    let id = u64::MAX - 1;
    let ability = build(&principal(id, Role::User));
    let json = serde_json::json!({"id": 1, "ownerId": id});

    assert!(ability.can(&Action::UPDATE, &SubjectType::DOCUMENT, Some(&json)));
    assert!(ability.can(&Action::READ, &SubjectType::DOCUMENT, Some(&document(1, id))));
}

#[test]
fn abilities_are_independent_per_principal() {
    let first = build(&principal(1, Role::User));
    let second = build(&principal(2, Role::User));
    let doc = document(5, 1);

    assert!(first.can(&Action::DELETE, &SubjectType::DOCUMENT, Some(&doc)));
    assert!(second.cannot(&Action::DELETE, &SubjectType::DOCUMENT, Some(&doc)));
    assert_ne!(first, second);
}

#[test]
fn ability_can_be_built_concurrently() {
    let handles: Vec<_> = (0..8_u64)
        .map(|id| {
            std::thread::spawn(move || {
                let ability = build(&principal(id, Role::User));
                ability.can(&Action::READ, &SubjectType::DOCUMENT, Some(&document(1, id)))
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn any_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Manager), Just(Role::User)]
}

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::READ),
        Just(Action::CREATE),
        Just(Action::UPDATE),
        Just(Action::DELETE),
        Just(Action::AGGREGATE),
        Just(Action::MANAGE),
        "[a-z]{3,10}".prop_map(Action::new),
    ]
}

fn any_subject() -> impl Strategy<Value = SubjectType> {
    prop_oneof![
        Just(SubjectType::USER),
        Just(SubjectType::DOCUMENT),
        Just(SubjectType::ALL),
        "[A-Z][a-z]{2,10}".prop_map(SubjectType::new),
    ]
}

proptest! {
    /// Property: cannot is the exact inverse of can
    #[test]
    fn prop_cannot_is_inverse_of_can(
        id in 1u64..1000,
        role in any_role(),
        action in any_action(),
        subject in any_subject(),
        owner in 1u64..1000,
        with_instance in any::<bool>(),
    ) {
        let ability = build(&principal(id, role));
        let doc = document(1, owner);
        let instance: Option<&dyn parapet_types::Attributes> =
            if with_instance { Some(&doc) } else { None };

        prop_assert_eq!(
            ability.cannot(&action, &subject, instance),
            !ability.can(&action, &subject, instance)
        );
    }

    /// Property: admin can do anything to anything, including unknown types
    #[test]
    fn prop_admin_closure(
        id in 1u64..1000,
        action in any_action(),
        subject in any_subject(),
        owner in 1u64..1000,
    ) {
        let ability = build(&principal(id, Role::Admin));
        let doc = document(1, owner);

        prop_assert!(ability.can(&action, &subject, None));
        prop_assert!(ability.can(&action, &subject, Some(&doc)));
    }

    /// Property: a user reads a profile iff it is their own
    #[test]
    fn prop_user_profile_ownership(id in 1u64..1000, target in 1u64..1000) {
        let ability = build(&principal(id, Role::User));

        prop_assert_eq!(
            ability.can(&Action::READ, &SubjectType::USER, Some(&user_profile(target))),
            id == target
        );
    }

    /// Property: a user reads/updates/deletes a document iff they own it
    #[test]
    fn prop_user_document_ownership(
        id in 1u64..1000,
        owner in 1u64..1000,
        action in prop_oneof![Just(Action::READ), Just(Action::UPDATE), Just(Action::DELETE)],
    ) {
        let ability = build(&principal(id, Role::User));

        prop_assert_eq!(
            ability.can(&action, &SubjectType::DOCUMENT, Some(&document(1, owner))),
            id == owner
        );
    }

    /// Property: any user may create a document, with or without an instance
    #[test]
    fn prop_user_can_always_create(id in 1u64..1000, owner in 1u64..1000) {
        let ability = build(&principal(id, Role::User));

        prop_assert!(ability.can(&Action::CREATE, &SubjectType::DOCUMENT, None));
        prop_assert!(ability.can(&Action::CREATE, &SubjectType::DOCUMENT, Some(&document(1, owner))));
    }

    /// Property: building is deterministic
    #[test]
    fn prop_build_is_deterministic(id in 1u64..1000, role in any_role()) {
        let p = principal(id, role);
        prop_assert_eq!(build(&p), build(&p));
    }
}

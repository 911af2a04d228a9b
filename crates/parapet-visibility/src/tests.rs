use chrono::{TimeZone, Utc};
use parapet_types::{Document, DocumentId, Principal, Role, SubjectType, User, UserId};
use proptest::prelude::*;
use serde_json::{Value as Json, json};
use test_case::test_case;

use crate::{Ownership, VisibilityFilter};

fn principal(id: u64, role: Role) -> Principal {
    Principal::new(id, role, format!("p{id}@test.com"))
}

fn user(id: u64) -> User {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    User {
        id: UserId::new(id),
        email: format!("u{id}@test.com"),
        name: Some(format!("User {id}")),
        role: Role::User,
        salary: Some(50_000),
        phone_number: Some("555-0100".to_string()),
        national_id: Some("NI-1".to_string()),
        created_at: at,
        updated_at: at,
    }
}

fn keys(value: &Json) -> Vec<&str> {
    value
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

#[test_case(Role::User, &["email", "name", "role"], &["salary", "phoneNumber", "nationalId"]; "user sees public only")]
#[test_case(Role::Manager, &["email", "phoneNumber"], &["salary", "nationalId"]; "manager sees privileged")]
#[test_case(Role::Admin, &["email", "phoneNumber", "salary", "nationalId"], &[]; "admin sees everything")]
fn test_role_visibility_on_foreign_profile(role: Role, present: &[&str], absent: &[&str]) {
    let out = VisibilityFilter::new()
        .filter_record(&principal(1, role), &user(9))
        .unwrap();

    for field in present {
        assert!(out.get(*field).is_some(), "{field} should be visible");
    }
    for field in absent {
        assert!(out.get(*field).is_none(), "{field} should be hidden");
    }
}

#[test]
fn test_manager_views_foreign_profile() {
    let out = VisibilityFilter::new()
        .filter_record(&principal(2, Role::Manager), &user(9))
        .unwrap();

    assert_eq!(out["email"], "u9@test.com");
    assert_eq!(out["name"], "User 9");
    assert_eq!(out["role"], "USER");
    assert!(out.get("salary").is_none());
    assert!(out.get("nationalId").is_none());
}

#[test]
fn test_owner_sees_own_confidential_fields() {
    let out = VisibilityFilter::new()
        .filter_record(&principal(5, Role::User), &user(5))
        .unwrap();

    assert_eq!(out["salary"], 50_000);
    assert_eq!(out["nationalId"], "NI-1");
    assert_eq!(out["phoneNumber"], "555-0100");
}

#[test]
fn test_owner_with_id_beyond_i64_keeps_confidential_fields() {
    let id = u64::MAX - 1;
    let out = VisibilityFilter::new()
        .filter_record(&principal(id, Role::User), &user(id))
        .unwrap();

    assert_eq!(out["nationalId"], "NI-1");
    assert_eq!(out["salary"], 50_000);

    let stranger = VisibilityFilter::new()
        .filter_record(&principal(id - 1, Role::User), &user(id))
        .unwrap();
    assert!(stranger.get("nationalId").is_none());
}

#[test]
fn test_list_is_filtered_per_record() {
    let out = VisibilityFilter::new()
        .filter_records(&principal(5, Role::User), &[user(5), user(6)])
        .unwrap();

    assert_eq!(out.len(), 2);
    assert!(out[0].get("nationalId").is_some());
    assert!(out[1].get("nationalId").is_none());
}

#[test]
fn test_nested_owner_is_filtered_with_document_groups() {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let doc = Document {
        id: DocumentId::new(1),
        title: "Plan".to_string(),
        content: "...".to_string(),
        owner_id: UserId::new(9),
        owner: Some(user(9)),
        created_at: at,
        updated_at: at,
    };

    let out = VisibilityFilter::new()
        .filter_record(&principal(3, Role::Manager), &doc)
        .unwrap();
    assert_eq!(out["title"], "Plan");
    assert!(out.get("updatedAt").is_none());
    assert!(out["owner"].get("updatedAt").is_some());
    assert_eq!(out["owner"]["email"], "u9@test.com");
    assert!(out["owner"].get("nationalId").is_none());

    // The document owner also owns the nested profile.
    let out = VisibilityFilter::new()
        .filter_record(&principal(9, Role::User), &doc)
        .unwrap();
    assert_eq!(out["owner"]["nationalId"], "NI-1");
}

#[test]
fn test_array_input_is_filtered_elementwise() {
    let out = VisibilityFilter::new().filter(
        &principal(5, Role::User),
        &SubjectType::USER,
        json!([{"id": 5, "salary": 1}, {"id": 6, "salary": 2}]),
        Ownership::Record,
    );

    assert_eq!(out, json!([{"id": 5, "salary": 1}, {"id": 6}]));
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Manager), Just(Role::Admin)]
}

fn record_strategy() -> impl Strategy<Value = Json> {
    (
        1u64..20,
        proptest::option::of(0i64..1_000_000),
        proptest::option::of("[a-z]{1,8}"),
        proptest::option::of("[A-Z0-9]{1,8}"),
    )
        .prop_map(|(id, salary, phone, national)| {
            let mut record = json!({"id": id, "email": format!("{id}@x"), "name": "n"});
            if let Some(s) = salary {
                record["salary"] = json!(s);
            }
            if let Some(p) = phone {
                record["phoneNumber"] = json!(p);
            }
            if let Some(n) = national {
                record["nationalId"] = json!(n);
            }
            record
        })
}

proptest! {
    #[test]
    fn prop_filter_is_idempotent(
        id in 1u64..20,
        role in role_strategy(),
        record in record_strategy(),
    ) {
        let filter = VisibilityFilter::new();
        let me = principal(id, role);
        let once = filter.filter(&me, &SubjectType::USER, record, Ownership::Record);
        let twice = filter.filter(&me, &SubjectType::USER, once.clone(), Ownership::Record);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_roles_are_monotonic(record in record_strategy()) {
        let filter = VisibilityFilter::new();
        // id 100 never matches a generated record
        let see = |role| {
            let out = filter.filter(&principal(100, role), &SubjectType::USER, record.clone(), Ownership::Record);
            keys(&out).into_iter().map(str::to_owned).collect::<std::collections::BTreeSet<_>>()
        };

        let user = see(Role::User);
        let manager = see(Role::Manager);
        let admin = see(Role::Admin);

        prop_assert!(user.is_subset(&manager));
        prop_assert!(manager.is_subset(&admin));
    }

    #[test]
    fn prop_filter_never_adds_or_rewrites(
        id in 1u64..20,
        role in role_strategy(),
        record in record_strategy(),
    ) {
        let out = VisibilityFilter::new().filter(&principal(id, role), &SubjectType::USER, record.clone(), Ownership::Record);
        for (name, value) in out.as_object().unwrap() {
            prop_assert_eq!(Some(value), record.get(name));
        }
    }

    #[test]
    fn prop_owner_sees_whole_record(id in 1u64..20, role in role_strategy(), record in record_strategy()) {
        let mut record = record;
        record["id"] = json!(id);
        let out = VisibilityFilter::new().filter(&principal(id, role), &SubjectType::USER, record.clone(), Ownership::Record);
        prop_assert_eq!(out, record);
    }
}

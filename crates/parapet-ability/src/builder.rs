//! Per-principal ability construction.
//!
//! | Role    | Grants                                                                  |
//! |---------|-------------------------------------------------------------------------|
//! | Admin   | `manage all`                                                            |
//! | Manager | `read User`, `aggregate User`, `read Document`                          |
//! | User    | `read User {id}`, `create Document`, `read/update/delete Document {ownerId}` |

use parapet_types::{Action, Principal, Role, SubjectType};

use crate::ability::AbilityModel;
use crate::grant::{Condition, Grant};

/// Fluent builder for an [`AbilityModel`].
///
/// Grants are evaluated in the order they are declared.
///
/// # Examples
///
/// ```
/// use parapet_ability::{AbilityBuilder, Condition};
/// use parapet_types::{Action, AttributeMap, SubjectType};
///
/// let ability = AbilityBuilder::new()
///     .can(Action::CREATE, SubjectType::DOCUMENT)
///     .can_where(
///         Action::READ,
///         SubjectType::DOCUMENT,
///         Condition::new().field_eq("ownerId", 7_i64),
///     )
///     .build();
///
/// let own = AttributeMap::new().with("ownerId", 7_i64);
/// assert!(ability.can(&Action::READ, &SubjectType::DOCUMENT, Some(&own)));
/// assert!(ability.cannot(&Action::READ, &SubjectType::DOCUMENT, None));
/// ```
#[derive(Debug, Default)]
pub struct AbilityBuilder {
    grants: Vec<Grant>,
}

impl AbilityBuilder {
    pub fn new() -> Self {
        Self { grants: Vec::new() }
    }

    /// Grants `action` on every instance of `subject_type`.
    pub fn can(mut self, action: Action, subject_type: SubjectType) -> Self {
        self.grants.push(Grant::new(action, subject_type));
        self
    }

    /// Grants `action` on instances of `subject_type` matching `condition`.
    pub fn can_where(
        mut self,
        action: Action,
        subject_type: SubjectType,
        condition: Condition,
    ) -> Self {
        self.grants
            .push(Grant::new(action, subject_type).with_condition(condition));
        self
    }

    /// Grants each of `actions` under the same optional condition.
    pub fn can_many(
        mut self,
        actions: impl IntoIterator<Item = Action>,
        subject_type: &SubjectType,
        condition: Option<&Condition>,
    ) -> Self {
        for action in actions {
            let mut grant = Grant::new(action, subject_type.clone());
            grant.condition = condition.cloned();
            self.grants.push(grant);
        }
        self
    }

    pub fn build(self) -> AbilityModel {
        AbilityModel::new(self.grants)
    }
}

/// Builds the ability model for `principal`.
///
/// Pure and total: the same principal always yields the same grants, and
/// no principal makes this fail.
pub fn build(principal: &Principal) -> AbilityModel {
    let builder = AbilityBuilder::new();

    let ability = match principal.role {
        Role::Admin => builder.can(Action::MANAGE, SubjectType::ALL),
        Role::Manager => builder
            .can(Action::READ, SubjectType::USER)
            .can(Action::AGGREGATE, SubjectType::USER)
            .can(Action::READ, SubjectType::DOCUMENT),
        Role::User => {
            let owns = Condition::new().field_eq("ownerId", principal.id);
            builder
                .can_where(
                    Action::READ,
                    SubjectType::USER,
                    Condition::new().field_eq("id", principal.id),
                )
                .can(Action::CREATE, SubjectType::DOCUMENT)
                .can_many(
                    [Action::READ, Action::UPDATE, Action::DELETE],
                    &SubjectType::DOCUMENT,
                    Some(&owns),
                )
        }
    };

    let ability = ability.build();
    tracing::debug!(
        principal = %principal.id,
        role = %principal.role,
        grants = ability.grants().len(),
        "Ability model built"
    );
    ability
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_single_wildcard_grant() {
        let ability = build(&Principal::new(1, Role::Admin, "a@test.com"));

        assert_eq!(
            ability.grants(),
            &[Grant::new(Action::MANAGE, SubjectType::ALL)]
        );
    }

    #[test]
    fn test_manager_grants_are_unconditional() {
        let ability = build(&Principal::new(2, Role::Manager, "m@test.com"));

        assert_eq!(ability.grants().len(), 3);
        assert!(ability.grants().iter().all(|g| !g.is_conditional()));
    }

    #[test]
    fn test_user_grants_are_scoped_to_principal() {
        let ability = build(&Principal::new(3, Role::User, "u@test.com"));
        let grants = ability.grants();

        assert_eq!(grants.len(), 5);
        assert_eq!(grants[0].to_string(), "read User where {id: Integer(3)}");
        assert_eq!(grants[1].to_string(), "create Document");
        for grant in &grants[2..] {
            assert!(grant.to_string().ends_with("Document where {ownerId: Integer(3)}"));
        }
    }

    #[test]
    fn test_can_many_without_condition() {
        let ability = AbilityBuilder::new()
            .can_many([Action::READ, Action::UPDATE], &SubjectType::USER, None)
            .build();

        assert!(ability.can(&Action::UPDATE, &SubjectType::USER, None));
        assert!(ability.cannot(&Action::DELETE, &SubjectType::USER, None));
    }
}

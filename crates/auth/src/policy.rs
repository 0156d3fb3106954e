//! Access-policy decision functions.
//!
//! The role hierarchy plus domain scoping is the entire security model, so
//! it lives here as total, order-sensitive, side-effect-free predicates.
//! Every entry point that needs a decision (HTTP handlers, the OAuth
//! callback, the bootstrap binary) calls these functions rather than
//! re-deriving the rules.

use huddle_core::Role;

/// Whether `actor_role`/`actor_domain` may create an organization with
/// `target_domain`: SUPERADMIN anywhere, everyone else only under their own
/// domain.
pub fn can_create_organization(actor_role: Role, actor_domain: &str, target_domain: &str) -> bool {
    actor_role == Role::Superadmin || target_domain == actor_domain
}

/// Whether `actor_role` may list every organization. SUPERADMIN only.
pub fn can_list_organizations(actor_role: Role) -> bool {
    actor_role == Role::Superadmin
}

/// Denial reasons for user creation, in evaluation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UserCreationDenial {
    /// Target role is SUPERADMIN and the actor is not.
    SuperadminEscalation,
    /// Actor is neither SUPERADMIN nor ADMIN.
    InsufficientRole,
    /// Actor is ADMIN and the target belongs to a different domain.
    ForeignDomain,
}

impl UserCreationDenial {
    /// Stable client-facing message for the denial.
    pub fn message(&self) -> &'static str {
        match self {
            UserCreationDenial::SuperadminEscalation => {
                "Forbidden: Only a SUPERADMIN can create another SUPERADMIN."
            }
            UserCreationDenial::InsufficientRole => {
                "Forbidden: Only SUPERADMIN or ADMIN can create users."
            }
            UserCreationDenial::ForeignDomain => {
                "Forbidden: Admins can only create users within their own organization."
            }
        }
    }
}

/// Whether the actor may create a user with `target_role` under
/// `target_domain`. Checks are evaluated in order; the first match wins.
pub fn can_create_user(
    actor_role: Role,
    actor_domain: &str,
    target_role: Role,
    target_domain: &str,
) -> Result<(), UserCreationDenial> {
    if target_role == Role::Superadmin && actor_role != Role::Superadmin {
        return Err(UserCreationDenial::SuperadminEscalation);
    }
    if actor_role != Role::Superadmin && actor_role != Role::Admin {
        return Err(UserCreationDenial::InsufficientRole);
    }
    if actor_role == Role::Admin && target_domain != actor_domain {
        return Err(UserCreationDenial::ForeignDomain);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    static ROLES: [Role; 4] = [Role::Superadmin, Role::Admin, Role::User, Role::ReadOnly];

    fn any_role() -> impl Strategy<Value = Role> {
        proptest::sample::select(&ROLES[..])
    }

    fn any_domain() -> impl Strategy<Value = String> {
        "[a-z]{1,10}\\.(com|org|io)"
    }

    #[test]
    fn superadmin_creates_organizations_anywhere() {
        assert!(can_create_organization(
            Role::Superadmin,
            "acme.com",
            "other.com"
        ));
    }

    #[test]
    fn admin_creates_organization_only_under_own_domain() {
        assert!(can_create_organization(Role::Admin, "acme.com", "acme.com"));
        assert!(!can_create_organization(
            Role::Admin,
            "acme.com",
            "other.com"
        ));
    }

    #[test]
    fn only_superadmin_lists_organizations() {
        assert!(can_list_organizations(Role::Superadmin));
        for role in [Role::Admin, Role::User, Role::ReadOnly] {
            assert!(!can_list_organizations(role));
        }
    }

    #[test]
    fn admin_creates_users_in_own_domain() {
        assert!(can_create_user(Role::Admin, "acme.com", Role::User, "acme.com").is_ok());
    }

    #[test]
    fn admin_denied_for_foreign_domain() {
        assert_eq!(
            can_create_user(Role::Admin, "acme.com", Role::User, "other.com"),
            Err(UserCreationDenial::ForeignDomain)
        );
    }

    #[test]
    fn superadmin_creates_users_in_any_domain() {
        assert!(can_create_user(Role::Superadmin, "hq.io", Role::Admin, "other.com").is_ok());
        assert!(can_create_user(Role::Superadmin, "hq.io", Role::Superadmin, "other.com").is_ok());
    }

    #[test]
    fn escalation_check_runs_before_role_check() {
        // A USER targeting SUPERADMIN must get the escalation message, not
        // the generic insufficient-role one.
        assert_eq!(
            can_create_user(Role::User, "acme.com", Role::Superadmin, "acme.com"),
            Err(UserCreationDenial::SuperadminEscalation)
        );
    }

    #[test]
    fn user_and_read_only_cannot_create_users() {
        for role in [Role::User, Role::ReadOnly] {
            assert_eq!(
                can_create_user(role, "acme.com", Role::User, "acme.com"),
                Err(UserCreationDenial::InsufficientRole)
            );
        }
    }

    proptest! {
        #[test]
        fn non_superadmin_never_creates_foreign_organization(
            actor in any_role(),
            actor_domain in any_domain(),
            target_domain in any_domain(),
        ) {
            prop_assume!(actor != Role::Superadmin);
            prop_assume!(actor_domain != target_domain);
            prop_assert!(!can_create_organization(actor, &actor_domain, &target_domain));
        }

        #[test]
        fn superadmin_target_always_denied_for_non_superadmin(
            actor in any_role(),
            actor_domain in any_domain(),
            target_domain in any_domain(),
        ) {
            prop_assume!(actor != Role::Superadmin);
            prop_assert_eq!(
                can_create_user(actor, &actor_domain, Role::Superadmin, &target_domain),
                Err(UserCreationDenial::SuperadminEscalation)
            );
        }
    }
}

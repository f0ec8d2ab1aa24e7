//! Authorization gate
//!
//! A pure decision over `(identity, loading, required roles)`. The gate
//! never redirects while the session is loading, so a protected view cannot
//! bounce to the landing route before the bootstrap has finished.

use crate::context::SessionState;
use crate::domain::{Identity, Role};
use crate::error::{AppError, Result};
use serde::Serialize;
use std::collections::BTreeSet;

/// Roles allowed to access a route or action.
///
/// An empty requirement admits any authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityRequirement {
    roles: BTreeSet<Role>,
}

impl CapabilityRequirement {
    /// Any authenticated identity
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Only the listed roles
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    pub fn super_admin() -> Self {
        Self::roles([Role::SuperAdmin])
    }

    pub fn admin() -> Self {
        Self::roles([Role::Admin, Role::SuperAdmin])
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Whether `role` satisfies this requirement
    pub fn admits(&self, role: Role) -> bool {
        self.roles.is_empty() || self.roles.contains(&role)
    }
}

/// Gate state for a guarded subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    /// Bootstrap still running; identity not yet determined
    Pending,
    /// Bootstrap finished without an identity
    Unauthenticated,
    Authorized,
    /// Identity present but its role is not admitted
    Forbidden,
}

/// What the presentation layer should do with the guarded subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    ShowPending,
    Render,
    RedirectToLanding,
}

impl AccessState {
    pub fn decision(self) -> GateDecision {
        match self {
            AccessState::Pending => GateDecision::ShowPending,
            AccessState::Authorized => GateDecision::Render,
            AccessState::Unauthenticated | AccessState::Forbidden => {
                GateDecision::RedirectToLanding
            }
        }
    }

    fn as_label(self) -> &'static str {
        match self {
            AccessState::Pending => "pending",
            AccessState::Unauthenticated => "unauthenticated",
            AccessState::Authorized => "authorized",
            AccessState::Forbidden => "forbidden",
        }
    }
}

/// Decide access for a guarded subtree
pub fn authorize(
    identity: Option<&Identity>,
    loading: bool,
    required: &CapabilityRequirement,
) -> AccessState {
    let state = if loading {
        AccessState::Pending
    } else {
        match identity {
            None => AccessState::Unauthenticated,
            Some(identity) if !required.admits(identity.role) => AccessState::Forbidden,
            Some(_) => AccessState::Authorized,
        }
    };

    metrics::counter!("ticketdesk_gate_decisions_total", "state" => state.as_label())
        .increment(1);
    state
}

/// [`authorize`] over a session snapshot
pub fn authorize_session(state: &SessionState, required: &CapabilityRequirement) -> AccessState {
    authorize(state.identity.as_ref(), state.loading, required)
}

/// Guard an action: the identity when admitted, an error otherwise
pub fn require<'a>(
    state: &'a SessionState,
    required: &CapabilityRequirement,
) -> Result<&'a Identity> {
    match (authorize_session(state, required), state.identity.as_ref()) {
        (AccessState::Authorized, Some(identity)) => Ok(identity),
        (AccessState::Pending, _) => Err(AppError::SessionPending(
            "Session is still being established".to_string(),
        )),
        (AccessState::Forbidden, Some(identity)) => Err(AppError::Forbidden(format!(
            "Role {} is not allowed to perform this action",
            identity.role
        ))),
        _ => Err(AppError::Unauthorized("Not signed in".to_string())),
    }
}

/// Role-dependent affordances of the views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Change ticket status
    pub can_manage_tickets: bool,
    /// Open the user administration screen
    pub can_manage_users: bool,
    /// Dashboard and list show the "new ticket" shortcut
    pub shows_create_shortcut: bool,
}

impl Capabilities {
    pub fn for_session(state: &SessionState) -> Self {
        match state.role() {
            Some(role) if !state.loading => Self {
                can_manage_tickets: role.is_admin(),
                can_manage_users: role.is_super_admin(),
                shows_create_shortcut: role == Role::User,
            },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn identity(role: Role) -> Identity {
        Identity::development(role)
    }

    #[rstest]
    #[case(Role::User)]
    #[case(Role::Admin)]
    #[case(Role::SuperAdmin)]
    fn test_pending_never_redirects(#[case] role: Role) {
        let required = CapabilityRequirement::super_admin();
        let id = identity(role);

        assert_eq!(authorize(Some(&id), true, &required), AccessState::Pending);
        assert_eq!(authorize(None, true, &required), AccessState::Pending);
        assert_eq!(
            authorize(None, true, &required).decision(),
            GateDecision::ShowPending
        );
    }

    #[test]
    fn test_missing_identity_redirects() {
        for required in [
            CapabilityRequirement::authenticated(),
            CapabilityRequirement::super_admin(),
        ] {
            let state = authorize(None, false, &required);
            assert_eq!(state, AccessState::Unauthenticated);
            assert_eq!(state.decision(), GateDecision::RedirectToLanding);
        }
    }

    #[rstest]
    #[case(Role::User, AccessState::Forbidden)]
    #[case(Role::Admin, AccessState::Forbidden)]
    #[case(Role::SuperAdmin, AccessState::Authorized)]
    fn test_super_admin_requirement(#[case] role: Role, #[case] expected: AccessState) {
        let required = CapabilityRequirement::super_admin();
        assert_eq!(authorize(Some(&identity(role)), false, &required), expected);
    }

    #[rstest]
    #[case(Role::User)]
    #[case(Role::Admin)]
    #[case(Role::SuperAdmin)]
    fn test_empty_requirement_admits_any_identity(#[case] role: Role) {
        let required = CapabilityRequirement::authenticated();
        let state = authorize(Some(&identity(role)), false, &required);

        assert_eq!(state, AccessState::Authorized);
        assert_eq!(state.decision(), GateDecision::Render);
    }

    #[test]
    fn test_every_role_outside_requirement_is_forbidden() {
        let requirements = [
            CapabilityRequirement::roles([Role::User]),
            CapabilityRequirement::admin(),
            CapabilityRequirement::super_admin(),
            CapabilityRequirement::roles([Role::User, Role::SuperAdmin]),
        ];

        for required in &requirements {
            for role in Role::ALL {
                let state = authorize(Some(&identity(role)), false, required);
                if required.admits(role) {
                    assert_eq!(state, AccessState::Authorized);
                } else {
                    assert_eq!(state.decision(), GateDecision::RedirectToLanding);
                }
            }
        }
    }

    #[test]
    fn test_authorize_is_idempotent() {
        let required = CapabilityRequirement::admin();
        let id = identity(Role::User);

        let inputs = [(Some(&id), false), (Some(&id), true), (None, false)];
        for (identity, loading) in inputs {
            let first = authorize(identity, loading, &required);
            let second = authorize(identity, loading, &required);
            assert_eq!(first, second);
        }
        assert_eq!(id.role, Role::User);
    }

    #[test]
    fn test_require_maps_states_to_errors() {
        let required = CapabilityRequirement::super_admin();

        let pending = SessionState::default();
        assert!(matches!(
            require(&pending, &required),
            Err(AppError::SessionPending(_))
        ));

        let anonymous = SessionState::ready(None);
        assert!(matches!(
            require(&anonymous, &required),
            Err(AppError::Unauthorized(_))
        ));

        let user = SessionState::ready(Some(identity(Role::User)));
        assert!(matches!(
            require(&user, &required),
            Err(AppError::Forbidden(_))
        ));

        let root = SessionState::ready(Some(identity(Role::SuperAdmin)));
        assert_eq!(require(&root, &required).unwrap().role, Role::SuperAdmin);
    }

    #[rstest]
    #[case(Role::User, false, false, true)]
    #[case(Role::Admin, true, false, false)]
    #[case(Role::SuperAdmin, true, true, false)]
    fn test_capabilities(
        #[case] role: Role,
        #[case] tickets: bool,
        #[case] users: bool,
        #[case] shortcut: bool,
    ) {
        let caps = Capabilities::for_session(&SessionState::ready(Some(identity(role))));
        assert_eq!(caps.can_manage_tickets, tickets);
        assert_eq!(caps.can_manage_users, users);
        assert_eq!(caps.shows_create_shortcut, shortcut);
    }

    #[test]
    fn test_capabilities_empty_while_loading() {
        let state = SessionState {
            loading: true,
            identity: Some(identity(Role::SuperAdmin)),
        };
        assert_eq!(Capabilities::for_session(&state), Capabilities::default());
    }
}

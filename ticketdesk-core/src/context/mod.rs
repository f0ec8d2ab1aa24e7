//! Identity context shared by every consumer of the session
//!
//! The context is an explicitly owned handle that is cloned into the
//! components that need it. All writes go through a single
//! `tokio::sync::watch` sender, so they are serialized even when handles
//! live on different tasks. Only the session bootstrapper can complete the
//! session; afterwards the role can be changed locally with
//! [`IdentityContext::update_role`].

use crate::domain::{Identity, Role};
use crate::error::{AppError, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// True until the bootstrap has finished, whatever its outcome
    pub loading: bool,
    pub identity: Option<Identity>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            loading: true,
            identity: None,
        }
    }
}

impl SessionState {
    /// Settled session with the given identity
    pub fn ready(identity: Option<Identity>) -> Self {
        Self {
            loading: false,
            identity,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(Role::is_admin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role().is_some_and(Role::is_super_admin)
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }
}

/// Handle to the process-wide identity state
#[derive(Clone)]
pub struct IdentityContext {
    state: Arc<watch::Sender<SessionState>>,
    bootstrap_claimed: Arc<AtomicBool>,
}

impl Default for IdentityContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdentityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityContext")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl IdentityContext {
    /// Create a context in the loading state with no identity
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self {
            state: Arc::new(tx),
            bootstrap_claimed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Copy of the current session state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    pub fn is_super_admin(&self) -> bool {
        self.state.borrow().is_super_admin()
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait until the bootstrap has settled and return the state
    pub async fn ready(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        // The sender is owned by `self`, so the channel cannot close here.
        let state = match rx.wait_for(|s| !s.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        state
    }

    /// Current state, or `SessionPending` while the bootstrap is running
    pub fn ensure_ready(&self) -> Result<SessionState> {
        let state = self.snapshot();
        if state.loading {
            return Err(AppError::SessionPending(
                "Session is still being established".to_string(),
            ));
        }
        Ok(state)
    }

    /// Change the role of the held identity locally.
    ///
    /// The backend is not contacted; server-side roles are managed through
    /// the user administration endpoints.
    pub fn update_role(&self, role: Role) -> Result<()> {
        let mut updated = false;
        self.state.send_if_modified(|state| match state.identity.as_mut() {
            Some(identity) => {
                updated = true;
                if identity.role == role {
                    return false;
                }
                identity.role = role;
                true
            }
            None => false,
        });

        if !updated {
            return Err(AppError::Unauthorized(
                "No identity to update".to_string(),
            ));
        }
        tracing::info!(role = %role, "Role updated locally");
        Ok(())
    }

    /// Reserve the single bootstrap of this context.
    ///
    /// Returns false when another bootstrap already claimed it.
    pub(crate) fn claim_bootstrap(&self) -> bool {
        self.bootstrap_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Store the bootstrap result and clear `loading`.
    ///
    /// Only the first completion is applied.
    pub(crate) fn complete_bootstrap(&self, identity: Option<Identity>) -> bool {
        self.state.send_if_modified(|state| {
            if !state.loading {
                return false;
            }
            *state = SessionState::ready(identity);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    fn context_with(role: Role) -> IdentityContext {
        let context = IdentityContext::new();
        context.complete_bootstrap(Some(Identity::development(role)));
        context
    }

    #[test]
    fn test_initial_state_is_loading() {
        let context = IdentityContext::new();
        let state = context.snapshot();

        assert!(state.loading);
        assert!(state.identity.is_none());
        assert!(!context.is_authenticated());
        assert!(context.ensure_ready().is_err());
    }

    #[rstest]
    #[case(Role::User, false, false)]
    #[case(Role::Admin, true, false)]
    #[case(Role::SuperAdmin, true, true)]
    fn test_derived_flags(#[case] role: Role, #[case] admin: bool, #[case] super_admin: bool) {
        let context = context_with(role);

        assert!(context.is_authenticated());
        assert_eq!(context.is_admin(), admin);
        assert_eq!(context.is_super_admin(), super_admin);
    }

    #[test]
    fn test_update_role_promotes_user_to_admin() {
        let context = context_with(Role::User);

        context.update_role(Role::Admin).unwrap();

        assert!(context.is_admin());
        assert!(!context.is_super_admin());
        assert_eq!(context.identity().unwrap().role, Role::Admin);
    }

    #[test]
    fn test_update_role_without_identity_fails() {
        let context = IdentityContext::new();
        context.complete_bootstrap(None);

        let err = context.update_role(Role::Admin).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(context.identity().is_none());
    }

    #[test]
    fn test_only_first_completion_applies() {
        let context = IdentityContext::new();

        assert!(context.complete_bootstrap(None));
        assert!(!context.complete_bootstrap(Some(Identity::development(Role::SuperAdmin))));
        assert!(context.identity().is_none());
        assert!(!context.is_loading());
    }

    #[test]
    fn test_bootstrap_can_be_claimed_once() {
        let context = IdentityContext::new();
        let clone = context.clone();

        assert!(context.claim_bootstrap());
        assert!(!clone.claim_bootstrap());
    }

    #[tokio::test]
    async fn test_ready_waits_for_completion() {
        let context = IdentityContext::new();
        let writer = context.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.complete_bootstrap(Some(Identity::development(Role::User)));
        });

        let state = context.ready().await;
        assert!(!state.loading);
        assert_eq!(state.role(), Some(Role::User));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_subscribers_see_role_changes() {
        let context = context_with(Role::User);
        let mut rx = context.subscribe();

        context.update_role(Role::SuperAdmin).unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().role(), Some(Role::SuperAdmin));
    }
}

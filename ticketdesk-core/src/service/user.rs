//! User administration, reserved for super-admins

use super::submit::SubmitGuard;
use crate::api::UserApi;
use crate::context::IdentityContext;
use crate::domain::{ManagedUser, Role, UserFilter};
use crate::error::Result;
use crate::gate::{require, CapabilityRequirement};
use std::sync::Arc;

pub struct UserAdminService<A: UserApi> {
    api: Arc<A>,
    context: IdentityContext,
    role_guard: SubmitGuard,
    status_guard: SubmitGuard,
}

impl<A: UserApi> UserAdminService<A> {
    pub fn new(api: Arc<A>, context: IdentityContext) -> Self {
        Self {
            api,
            context,
            role_guard: SubmitGuard::new("Role change"),
            status_guard: SubmitGuard::new("Status toggle"),
        }
    }

    pub fn role_guard(&self) -> &SubmitGuard {
        &self.role_guard
    }

    pub fn status_guard(&self) -> &SubmitGuard {
        &self.status_guard
    }

    fn authorize(&self) -> Result<String> {
        let state = self.context.ensure_ready()?;
        let identity = require(&state, &CapabilityRequirement::super_admin())?;
        Ok(identity.id.clone())
    }

    /// Users matching the filter. The role filter is applied by the backend,
    /// the search locally.
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<ManagedUser>> {
        self.authorize()?;

        let users = self.api.list_users(filter.role).await?;
        Ok(match filter.search.as_deref() {
            Some(search) => users
                .into_iter()
                .filter(|user| user.matches_search(search))
                .collect(),
            None => users,
        })
    }

    pub async fn change_role(&self, user_id: &str, role: Role) -> Result<()> {
        let actor = self.authorize()?;

        let _in_flight = self.role_guard.begin()?;
        self.api.update_user_role(user_id, role).await?;

        tracing::info!(actor = %actor, user_id, role = %role, "User role changed");
        Ok(())
    }

    /// Activate or deactivate a user
    pub async fn toggle_status(&self, user_id: &str) -> Result<()> {
        let actor = self.authorize()?;

        let _in_flight = self.status_guard.begin()?;
        self.api.toggle_user_status(user_id).await?;

        tracing::info!(actor = %actor, user_id, "User status toggled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockUserApi;
    use crate::domain::Identity;
    use crate::error::AppError;
    use mockall::predicate::*;
    use rstest::rstest;

    fn user(id: &str, handle: &str, role: Role) -> ManagedUser {
        let mut identity = Identity::development(role);
        identity.id = id.to_string();
        identity.handle = handle.to_string();
        identity.external_id = format!("99{}", id);
        ManagedUser {
            identity,
            is_active: true,
        }
    }

    fn service(api: MockUserApi, role: Role) -> UserAdminService<MockUserApi> {
        let context = IdentityContext::new();
        context.complete_bootstrap(Some(Identity::development(role)));
        UserAdminService::new(Arc::new(api), context)
    }

    #[rstest]
    #[case(Role::User)]
    #[case(Role::Admin)]
    #[tokio::test]
    async fn test_non_super_admin_is_forbidden(#[case] role: Role) {
        let mut api = MockUserApi::new();
        api.expect_list_users().never();
        api.expect_toggle_user_status().never();

        let service = service(api, role);

        let err = service.list(&UserFilter::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service.toggle_status("u-2").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unauthenticated_session_is_rejected() {
        let mut api = MockUserApi::new();
        api.expect_list_users().never();

        let context = IdentityContext::new();
        context.complete_bootstrap(None);
        let service = UserAdminService::new(Arc::new(api), context);

        let err = service.list(&UserFilter::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_list_applies_role_and_search() {
        let mut api = MockUserApi::new();
        api.expect_list_users()
            .with(eq(Some(Role::Admin)))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    user("u-2", "helpdesk_anna", Role::Admin),
                    user("u-3", "ops_bob", Role::Admin),
                ])
            });

        let users = service(api, Role::SuperAdmin)
            .list(&UserFilter {
                role: Some(Role::Admin),
                search: Some("ANNA".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id(), "u-2");
    }

    #[tokio::test]
    async fn test_change_role() {
        let mut api = MockUserApi::new();
        api.expect_update_user_role()
            .withf(|id, role| id == "u-2" && *role == Role::Admin)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(api, Role::SuperAdmin);
        service.change_role("u-2", Role::Admin).await.unwrap();
        assert!(!service.role_guard().is_busy());
    }

    #[tokio::test]
    async fn test_toggle_status_propagates_backend_error() {
        let mut api = MockUserApi::new();
        api.expect_toggle_user_status()
            .times(1)
            .returning(|_| Err(AppError::NotFound("PATCH /api/users/:id/status".to_string())));

        let service = service(api, Role::SuperAdmin);
        let err = service.toggle_status("u-404").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!service.status_guard().is_busy());
    }
}

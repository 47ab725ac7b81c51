//! Access policy: authentication first, then capability grants

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::user::{Capability, UserClaims, Viewer},
    repository::CapabilityGrants,
};

#[derive(Clone)]
pub struct AccessPolicy {
    grants: Arc<dyn CapabilityGrants>,
}

impl AccessPolicy {
    pub fn new(grants: Arc<dyn CapabilityGrants>) -> Self {
        Self { grants }
    }

    /// Require a signed-in viewer holding `capability`.
    ///
    /// Anonymous viewers are sent to sign in without the grants being consulted.
    pub async fn require<'a>(
        &self,
        viewer: &'a Viewer,
        capability: Capability,
    ) -> AppResult<&'a UserClaims> {
        if !viewer.is_authenticated() {
            tracing::debug!("Anonymous request for {} sent to sign in", viewer.requested_path());
        }
        let claims = viewer.require_authenticated()?;

        if !self.grants.has_capability(claims.user_id, capability).await? {
            tracing::debug!(
                "User {} lacks {} for {}",
                claims.sub,
                capability,
                viewer.requested_path()
            );
            return Err(AppError::Authorization(format!(
                "The {} permission is required",
                capability
            )));
        }

        Ok(claims)
    }

    /// Every capability the user currently holds
    pub async fn capabilities(&self, user_id: i32) -> AppResult<Vec<Capability>> {
        let mut held = Vec::new();
        for capability in Capability::ALL {
            if self.grants.has_capability(user_id, capability).await? {
                held.push(capability);
            }
        }
        Ok(held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCapabilityGrants;
    use mockall::predicate::eq;

    fn librarian() -> Viewer {
        Viewer::authenticated(
            UserClaims {
                sub: "librarian".to_string(),
                user_id: 2,
                exp: i64::MAX,
                iat: 0,
            },
            "/api/v1/loans",
        )
    }

    #[tokio::test]
    async fn anonymous_viewer_never_reaches_the_grants() {
        // No expectations: any call to the grants would panic
        let policy = AccessPolicy::new(Arc::new(MockCapabilityGrants::new()));
        let viewer = Viewer::anonymous("/api/v1/loans");

        let result = policy.require(&viewer, Capability::MarkReturned).await;
        assert!(matches!(result, Err(AppError::LoginRequired { .. })));
    }

    #[tokio::test]
    async fn missing_grant_is_forbidden() {
        let mut grants = MockCapabilityGrants::new();
        grants
            .expect_has_capability()
            .with(eq(2), eq(Capability::MarkReturned))
            .times(1)
            .returning(|_, _| Ok(false));
        let policy = AccessPolicy::new(Arc::new(grants));
        let viewer = librarian();

        let result = policy.require(&viewer, Capability::MarkReturned).await;
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[tokio::test]
    async fn granted_capability_returns_the_claims() {
        let mut grants = MockCapabilityGrants::new();
        grants.expect_has_capability().returning(|_, _| Ok(true));
        let policy = AccessPolicy::new(Arc::new(grants));
        let viewer = librarian();

        let claims = policy.require(&viewer, Capability::MarkReturned).await.unwrap();
        assert_eq!(claims.user_id, 2);
        assert_eq!(
            policy.capabilities(2).await.unwrap(),
            vec![Capability::MarkReturned]
        );
    }
}

//! Location verification requests.

use std::sync::Arc;

use tracing::info;

use coastline_core::{AppError, AppResult};
use coastline_database::repository::VerificationRepository;
use coastline_entity::verification::{AddressSubmission, VerificationRequest};

use crate::context::RequestContext;

#[derive(Clone)]
pub struct VerificationService {
    verifications: Arc<dyn VerificationRepository>,
}

impl VerificationService {
    pub fn new(verifications: Arc<dyn VerificationRepository>) -> Self {
        Self { verifications }
    }

    /// Submit an address for review by the community's admins.
    ///
    /// At most one request per user is pending; a rejected user may submit
    /// again, which creates a new row.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        address: AddressSubmission,
    ) -> AppResult<VerificationRequest> {
        for (field, value) in [
            ("street_address", &address.street_address),
            ("city", &address.city),
            ("postal_code", &address.postal_code),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{field} is required")));
            }
        }
        let community = ctx.home_community()?;
        if ctx.profile.is_location_verified {
            return Err(AppError::conflict("Your location is already verified"));
        }
        if self.verifications.pending_for(ctx.user_id()).await?.is_some() {
            return Err(AppError::conflict("A verification request is already pending"));
        }

        let request = self
            .verifications
            .insert(&address.into_request(ctx.user_id(), community))
            .await?;
        info!(request_id = %request.id, user_id = %ctx.user_id(), "Verification submitted");
        Ok(request)
    }

    /// The caller's most recent request, if any.
    pub async fn latest(&self, ctx: &RequestContext) -> AppResult<Option<VerificationRequest>> {
        self.verifications.latest_for(ctx.user_id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, ctx, resident};
    use coastline_core::error::ErrorKind;
    use coastline_entity::approval::{ApprovalKind, Decision};
    use coastline_entity::verification::VerificationStatus;

    fn address() -> AddressSubmission {
        AddressSubmission {
            street_address: "12 Quay St".into(),
            city: "Seal Cove".into(),
            postal_code: "sc3 9zz".into(),
        }
    }

    #[tokio::test]
    async fn test_one_pending_request_then_resubmit_after_rejection() {
        let fx = Fixture::new().await;
        let svc = VerificationService::new(fx.db.verifications.clone());
        let user = ctx(&fx.add(resident(fx.community.id)).await);

        let first = svc.submit(&user, address()).await.unwrap();
        assert_eq!(first.postal_code, "SC3 9ZZ");
        assert_eq!(
            svc.submit(&user, address()).await.unwrap_err().kind,
            ErrorKind::Conflict
        );

        fx.db
            .approvals
            .decide(fx.community.id, ApprovalKind::Verification, first.id.0, Decision::Decline)
            .await
            .unwrap();
        let latest = svc.latest(&user).await.unwrap().unwrap();
        assert_eq!(latest.status, VerificationStatus::Rejected);

        let second = svc.submit(&user, address()).await.unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(svc.latest(&user).await.unwrap().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_blank_fields_rejected() {
        let fx = Fixture::new().await;
        let svc = VerificationService::new(fx.db.verifications.clone());
        let user = ctx(&fx.add(resident(fx.community.id)).await);
        let mut bad = address();
        bad.city = "  ".into();
        assert_eq!(svc.submit(&user, bad).await.unwrap_err().kind, ErrorKind::Validation);
    }
}

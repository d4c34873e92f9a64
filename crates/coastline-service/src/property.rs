//! Property listings, favorites and inquiries.

use std::sync::Arc;

use tracing::info;

use coastline_auth::Action;
use coastline_core::types::{CommunityId, PageRequest, PageResponse, PropertyId, UserId};
use coastline_core::{AppError, AppResult};
use coastline_database::repository::{FavoriteRepository, InquiryRepository, PropertyRepository};
use coastline_entity::approval::ApprovalStatus;
use coastline_entity::favorite::{FavoriteState, FavoriteTarget};
use coastline_entity::inquiry::{NewInquiry, PropertyInquiry};
use coastline_entity::notification::{NewNotification, NotificationKind, TargetType};
use coastline_entity::property::{ListingType, Property, PropertyDraft};

use crate::context::RequestContext;
use crate::notification::NotificationCenter;

const TITLE_MAX_CHARS: usize = 120;

/// Title and price checks shared by properties and market items.
pub(crate) fn validate_listing(title: &str, price: f64) -> AppResult<()> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation("Price must be a non-negative number"));
    }
    Ok(())
}

/// Whether a non-public row may be shown to `viewer`.
pub(crate) fn can_see_unpublished(
    viewer: Option<&RequestContext>,
    owner: UserId,
    community: CommunityId,
) -> bool {
    viewer.is_some_and(|ctx| ctx.user_id() == owner || ctx.administers(community))
}

#[derive(Clone)]
pub struct PropertyService {
    properties: Arc<dyn PropertyRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    inquiries: Arc<dyn InquiryRepository>,
    notifications: Arc<NotificationCenter>,
}

impl PropertyService {
    pub fn new(
        properties: Arc<dyn PropertyRepository>,
        favorites: Arc<dyn FavoriteRepository>,
        inquiries: Arc<dyn InquiryRepository>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            properties,
            favorites,
            inquiries,
            notifications,
        }
    }

    /// Create a pending listing owned by the caller.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        community: Option<CommunityId>,
        draft: PropertyDraft,
    ) -> AppResult<Property> {
        let community = ctx.target_community(community)?;
        ctx.require(Action::Contribute, community)?;
        validate_listing(&draft.title, draft.price)?;

        let property = self
            .properties
            .insert(&draft.into_property(ctx.user_id(), community))
            .await?;
        info!(
            property_id = %property.id,
            user_id = %ctx.user_id(),
            community_id = %community,
            "Property listing submitted"
        );
        Ok(property)
    }

    /// Fetch a listing.
    ///
    /// Pending and declined listings are only visible to their owner and
    /// the community's admins; everyone else gets NotFound.
    pub async fn get(&self, viewer: Option<&RequestContext>, id: PropertyId) -> AppResult<Property> {
        let property = self.find(id).await?;
        if property.is_public() || can_see_unpublished(viewer, property.user_id, property.community_id) {
            Ok(property)
        } else {
            Err(not_found(id))
        }
    }

    /// Approved listings in a community, newest first.
    pub async fn list(
        &self,
        community: CommunityId,
        listing_type: Option<ListingType>,
        page: PageRequest,
    ) -> AppResult<PageResponse<Property>> {
        self.properties.list_approved(community, listing_type, page).await
    }

    /// The caller's own listings in every state.
    pub async fn list_mine(&self, ctx: &RequestContext) -> AppResult<Vec<Property>> {
        self.properties.list_by_owner(ctx.user_id()).await
    }

    /// Replace the editable fields. The listing goes back to review.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: PropertyId,
        draft: PropertyDraft,
    ) -> AppResult<Property> {
        let mut property = self.find(id).await?;
        if property.user_id != ctx.user_id() {
            return Err(AppError::authorization("Only the owner can edit this listing"));
        }
        validate_listing(&draft.title, draft.price)?;

        draft.apply_to(&mut property);
        property.approval_status = ApprovalStatus::Pending;
        let updated = self
            .properties
            .update(&property)
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(property_id = %id, "Property listing edited, back to pending");
        Ok(updated)
    }

    /// Withdraw a listing. Owners and community admins may do this.
    pub async fn delete(&self, ctx: &RequestContext, id: PropertyId) -> AppResult<()> {
        let property = self.find(id).await?;
        if property.user_id != ctx.user_id() {
            ctx.require(Action::RemoveContent, property.community_id)?;
        }
        if !self.properties.soft_delete(id).await? {
            return Err(not_found(id));
        }
        info!(property_id = %id, user_id = %ctx.user_id(), "Property listing withdrawn");
        Ok(())
    }

    /// Add the listing to the caller's favorites, or remove it if present.
    pub async fn toggle_favorite(&self, ctx: &RequestContext, id: PropertyId) -> AppResult<FavoriteState> {
        let property = self.get(Some(ctx), id).await?;
        let target = FavoriteTarget::Property(id);
        let favorited = if self.favorites.remove(ctx.user_id(), target).await? {
            false
        } else {
            self.favorites
                .add(ctx.user_id(), target, property.community_id)
                .await?;
            true
        };
        Ok(FavoriteState { target, favorited })
    }

    /// Store an inquiry about a listing and notify its seller.
    pub async fn create_inquiry(
        &self,
        ctx: &RequestContext,
        inquiry: NewInquiry,
    ) -> AppResult<PropertyInquiry> {
        validate_inquiry(&inquiry)?;
        if inquiry.sender_id != ctx.user_id() {
            return Err(AppError::validation(
                "sender_id does not match the signed-in user",
            ));
        }
        let property = self.get(Some(ctx), inquiry.property_id).await?;
        if property.user_id != inquiry.seller_id {
            return Err(AppError::validation("The property does not belong to this seller"));
        }
        if property.community_id != inquiry.community_id {
            return Err(AppError::validation("The property is not in this community"));
        }

        let stored = self.inquiries.insert(&inquiry.into_inquiry()).await?;
        info!(
            inquiry_id = %stored.id,
            property_id = %stored.property_id,
            seller_id = %stored.seller_id,
            "Property inquiry stored"
        );

        self.notifications
            .deliver(
                NewNotification::new(stored.seller_id, NotificationKind::PropertyInquiry)
                    .actor(stored.sender_id)
                    .target(TargetType::Property, stored.property_id)
                    .community(stored.community_id)
                    .snippet(&stored.message),
            )
            .await;
        Ok(stored)
    }

    /// Inquiries addressed to the caller, newest first.
    pub async fn inquiries_received(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<PropertyInquiry>> {
        self.inquiries.list_for_seller(ctx.user_id(), page).await
    }

    async fn find(&self, id: PropertyId) -> AppResult<Property> {
        self.properties.find(id).await?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: PropertyId) -> AppError {
    AppError::not_found(format!("Property {id} not found"))
}

fn validate_inquiry(inquiry: &NewInquiry) -> AppResult<()> {
    if inquiry.name.trim().is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    let email = inquiry.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(AppError::validation("A valid email address is required")),
    }
    if inquiry.message.trim().is_empty() {
        return Err(AppError::validation("Message is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, admin, ctx, pending_resident, resident};
    use coastline_core::error::ErrorKind;
    use coastline_entity::approval::{ApprovalKind, Decision};

    fn service(fx: &Fixture) -> PropertyService {
        PropertyService::new(
            fx.db.properties.clone(),
            fx.db.favorites.clone(),
            fx.db.inquiries.clone(),
            fx.notifications(),
        )
    }

    fn draft(title: &str) -> PropertyDraft {
        PropertyDraft {
            title: title.to_string(),
            description: Some("Two minutes from the slipway".into()),
            price: 950.0,
            listing_type: ListingType::Rent,
            location: Some("Harbour Row".into()),
            bedrooms: Some(1),
            bathrooms: Some(1),
            image_files: vec![],
            video_url: None,
        }
    }

    async fn approve(fx: &Fixture, id: PropertyId) {
        fx.db
            .approvals
            .decide(fx.community.id, ApprovalKind::Property, id.0, Decision::Approve)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pending_listing_hidden_from_others() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let owner = ctx(&fx.add(resident(fx.community.id)).await);
        let neighbour = ctx(&fx.add(resident(fx.community.id)).await);
        let moderator = ctx(&fx.add(admin(fx.community.id)).await);

        let listing = svc.create(&owner, None, draft("Net loft")).await.unwrap();
        assert_eq!(listing.approval_status, ApprovalStatus::Pending);

        assert!(svc.get(Some(&owner), listing.id).await.is_ok());
        assert!(svc.get(Some(&moderator), listing.id).await.is_ok());
        assert_eq!(
            svc.get(Some(&neighbour), listing.id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(svc.get(None, listing.id).await.unwrap_err().kind, ErrorKind::NotFound);

        approve(&fx, listing.id).await;
        assert!(svc.get(None, listing.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_pending_account_cannot_list() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let waiting = ctx(&fx.add(pending_resident(fx.community.id)).await);
        let err = svc.create(&waiting, None, draft("Boathouse")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_edit_resets_to_pending() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let owner = ctx(&fx.add(resident(fx.community.id)).await);
        let listing = svc.create(&owner, None, draft("Sail loft")).await.unwrap();
        approve(&fx, listing.id).await;

        let edited = svc.update(&owner, listing.id, draft("Sail loft, sea view")).await.unwrap();
        assert_eq!(edited.approval_status, ApprovalStatus::Pending);
        assert_eq!(edited.title, "Sail loft, sea view");

        let other = ctx(&fx.add(resident(fx.community.id)).await);
        let err = svc.update(&other, listing.id, draft("Mine now")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_favorite_toggle_leaves_no_row() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let owner = ctx(&fx.add(resident(fx.community.id)).await);
        let fan = ctx(&fx.add(resident(fx.community.id)).await);
        let listing = svc.create(&owner, None, draft("Lookout")).await.unwrap();
        approve(&fx, listing.id).await;

        assert!(svc.toggle_favorite(&fan, listing.id).await.unwrap().favorited);
        assert!(!svc.toggle_favorite(&fan, listing.id).await.unwrap().favorited);
        assert!(fx.db.favorites.list(fan.user_id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inquiry_notifies_seller() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let svc = PropertyService::new(
            fx.db.properties.clone(),
            fx.db.favorites.clone(),
            fx.db.inquiries.clone(),
            center.clone(),
        );
        let seller = ctx(&fx.add(resident(fx.community.id)).await);
        let buyer = ctx(&fx.add(resident(fx.community.id)).await);
        let listing = svc.create(&seller, None, draft("Chapel flat")).await.unwrap();
        approve(&fx, listing.id).await;

        let inquiry = NewInquiry {
            community_id: fx.community.id,
            property_id: listing.id,
            seller_id: seller.user_id(),
            sender_id: buyer.user_id(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            message: "Can I view it on Saturday?".into(),
        };
        svc.create_inquiry(&buyer, inquiry.clone()).await.unwrap();

        let snapshot = center.snapshot(seller.user_id()).await.unwrap();
        assert_eq!(
            snapshot.notifications[0].notification.kind,
            NotificationKind::PropertyInquiry
        );
        let received = svc
            .inquiries_received(&seller, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(received.items.len(), 1);

        let bad = NewInquiry {
            email: "not-an-email".into(),
            ..inquiry
        };
        let err = svc.create_inquiry(&buyer, bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_admin_can_withdraw_listing() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let owner = ctx(&fx.add(resident(fx.community.id)).await);
        let moderator = ctx(&fx.add(admin(fx.community.id)).await);
        let listing = svc.create(&owner, None, draft("Old mill")).await.unwrap();

        svc.delete(&moderator, listing.id).await.unwrap();
        assert_eq!(
            svc.get(Some(&owner), listing.id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }
}

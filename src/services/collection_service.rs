use std::{sync::Arc, time::Duration};

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::{require_owner, AuthenticatedUser},
    errors::{AppError, AppResult},
    models::{domain::Collection, dto::request::CollectionRequest},
    repositories::{CollectionRepository, MaterialRepository, MembershipRepository},
    services::deadline::bounded,
};

pub struct CollectionService {
    collections: Arc<dyn CollectionRepository>,
    materials: Arc<dyn MaterialRepository>,
    memberships: Arc<dyn MembershipRepository>,
    deadline: Duration,
}

impl CollectionService {
    pub fn new(
        collections: Arc<dyn CollectionRepository>,
        materials: Arc<dyn MaterialRepository>,
        memberships: Arc<dyn MembershipRepository>,
        deadline: Duration,
    ) -> Self {
        Self {
            collections,
            materials,
            memberships,
            deadline,
        }
    }

    /// Fetches a collection or fails with `NotFound`.
    pub async fn find(&self, collection_id: &str) -> AppResult<Collection> {
        bounded(
            self.deadline,
            "collections.find_by_id",
            collection_id,
            self.collections.find_by_id(collection_id),
        )
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Collection with id '{}' not found", collection_id))
        })
    }

    /// The creator owns the new collection and gets it on their personal list.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CollectionRequest,
    ) -> AppResult<Collection> {
        request.validate()?;

        let collection = Collection::new(&user.user_id, request.name.trim(), &request.description);
        let id = collection.id.clone();

        let collection = bounded(
            self.deadline,
            "collections.create",
            &id,
            self.collections.create(collection),
        )
        .await?;

        let subscribed = bounded(
            self.deadline,
            "memberships.subscribe",
            &id,
            self.memberships.subscribe(&user.user_id, &id),
        )
        .await;

        if let Err(err) = subscribed {
            self.rollback_create(&id).await;
            return Err(err);
        }

        log::info!("User {} created collection {}", user.user_id, id);
        Ok(collection)
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        collection_id: &str,
        request: CollectionRequest,
    ) -> AppResult<Collection> {
        request.validate()?;

        let mut collection = self.find(collection_id).await?;
        require_owner(user, &collection.user_id, "collection")?;

        collection.name = request.name.trim().to_string();
        collection.description = request.description;
        collection.updated_at = Utc::now();

        let collection = bounded(
            self.deadline,
            "collections.update",
            collection_id,
            self.collections.update(collection),
        )
        .await?;

        log::info!("User {} updated collection {}", user.user_id, collection_id);
        Ok(collection)
    }

    pub async fn delete(&self, user: &AuthenticatedUser, collection_id: &str) -> AppResult<()> {
        let collection = self.find(collection_id).await?;
        require_owner(user, &collection.user_id, "collection")?;

        bounded(
            self.deadline,
            "collections.delete",
            collection_id,
            self.collections.delete(collection_id),
        )
        .await?;

        log::info!("User {} deleted collection {}", user.user_id, collection_id);

        // Links of a missing collection are never read, so a failed cleanup
        // leaves nothing visible behind.
        let cleanup = bounded(
            self.deadline,
            "memberships.remove_collection",
            collection_id,
            self.memberships.remove_collection(collection_id),
        )
        .await;
        if let Err(err) = cleanup {
            log::warn!("Links of deleted collection {} left behind: {}", collection_id, err);
        }

        Ok(())
    }

    /// Links an existing material into a collection the user owns.
    pub async fn attach_material(
        &self,
        user: &AuthenticatedUser,
        collection_id: &str,
        material_id: &str,
    ) -> AppResult<()> {
        let collection = self.find(collection_id).await?;
        require_owner(user, &collection.user_id, "collection")?;

        bounded(
            self.deadline,
            "materials.find_by_id",
            material_id,
            self.materials.find_by_id(material_id),
        )
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Material with id '{}' not found", material_id))
        })?;

        bounded(
            self.deadline,
            "memberships.attach",
            collection_id,
            self.memberships.attach(collection_id, material_id),
        )
        .await?;

        log::info!(
            "User {} attached material {} to collection {}",
            user.user_id,
            material_id,
            collection_id
        );
        Ok(())
    }

    /// Subscribing needs no ownership; anyone may follow any collection.
    pub async fn subscribe(&self, user: &AuthenticatedUser, collection_id: &str) -> AppResult<()> {
        self.find(collection_id).await?;

        bounded(
            self.deadline,
            "memberships.subscribe",
            collection_id,
            self.memberships.subscribe(&user.user_id, collection_id),
        )
        .await
    }

    pub async fn unsubscribe(
        &self,
        user: &AuthenticatedUser,
        collection_id: &str,
    ) -> AppResult<()> {
        bounded(
            self.deadline,
            "memberships.unsubscribe",
            collection_id,
            self.memberships.unsubscribe(&user.user_id, collection_id),
        )
        .await
    }

    async fn rollback_create(&self, collection_id: &str) {
        let result = bounded(
            self.deadline,
            "collections.delete",
            collection_id,
            self.collections.delete(collection_id),
        )
        .await;

        match result {
            Ok(()) => log::warn!("Rolled back creation of collection {}", collection_id),
            Err(err) => log::error!("Rollback of collection {} failed: {}", collection_id, err),
        }
    }
}

use std::{collections::HashSet, sync::Arc, time::Duration};

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Collection, XpTotals},
        dto::response::{CollectionDto, MaterialProgressDto, SearchResponse},
    },
    repositories::{
        CollectionRepository, MaterialRepository, MembershipRepository, ProgressRepository,
    },
    services::deadline::bounded,
};

/// XP aggregation and completion tracking.
///
/// Totals always come from the store's deduplicated aggregation; a collection
/// the store reports nothing for has no linked materials and reads as zero.
pub struct ProgressService {
    collections: Arc<dyn CollectionRepository>,
    materials: Arc<dyn MaterialRepository>,
    memberships: Arc<dyn MembershipRepository>,
    progress: Arc<dyn ProgressRepository>,
    deadline: Duration,
}

impl ProgressService {
    pub fn new(
        collections: Arc<dyn CollectionRepository>,
        materials: Arc<dyn MaterialRepository>,
        memberships: Arc<dyn MembershipRepository>,
        progress: Arc<dyn ProgressRepository>,
        deadline: Duration,
    ) -> Self {
        Self {
            collections,
            materials,
            memberships,
            progress,
            deadline,
        }
    }

    pub async fn collection_totals(
        &self,
        collection_id: &str,
        user_id: &str,
    ) -> AppResult<XpTotals> {
        let ids = [collection_id.to_string()];
        let totals = bounded(
            self.deadline,
            "progress.collection_totals",
            collection_id,
            self.progress.collection_totals(&ids, user_id),
        )
        .await?;

        Ok(totals.get(collection_id).copied().unwrap_or_default())
    }

    pub async fn get_collection(
        &self,
        collection_id: &str,
        user_id: &str,
    ) -> AppResult<CollectionDto> {
        let collection = bounded(
            self.deadline,
            "collections.find_by_id",
            collection_id,
            self.collections.find_by_id(collection_id),
        )
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Collection with id '{}' not found", collection_id))
        })?;

        let totals = self.collection_totals(collection_id, user_id).await?;
        Ok(CollectionDto::new(collection, totals))
    }

    /// Collections on the user's personal list.
    pub async fn list_collections_for_user(&self, user_id: &str) -> AppResult<Vec<CollectionDto>> {
        let ids = bounded(
            self.deadline,
            "memberships.subscribed_collection_ids",
            user_id,
            self.memberships.subscribed_collection_ids(user_id),
        )
        .await?;

        let collections = bounded(
            self.deadline,
            "collections.find_by_ids",
            user_id,
            self.collections.find_by_ids(&ids),
        )
        .await?;

        self.with_totals(collections, user_id).await
    }

    /// Every collection in the system, personalised to `user_id`.
    pub async fn list_all_collections(&self, user_id: &str) -> AppResult<Vec<CollectionDto>> {
        let collections = bounded(
            self.deadline,
            "collections.find_all",
            user_id,
            self.collections.find_all(),
        )
        .await?;

        self.with_totals(collections, user_id).await
    }

    /// Global search; not limited to the user's own or subscribed collections.
    pub async fn search(&self, query: &str, user_id: &str) -> AppResult<SearchResponse> {
        let collections = bounded(
            self.deadline,
            "collections.search",
            query,
            self.collections.search(query),
        )
        .await?;

        let materials = bounded(
            self.deadline,
            "materials.search",
            query,
            self.materials.search(query),
        )
        .await?;

        Ok(SearchResponse {
            collections: self.with_totals(collections, user_id).await?,
            materials,
        })
    }

    pub async fn collection_materials(
        &self,
        collection_id: &str,
        user_id: &str,
    ) -> AppResult<Vec<MaterialProgressDto>> {
        bounded(
            self.deadline,
            "collections.find_by_id",
            collection_id,
            self.collections.find_by_id(collection_id),
        )
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Collection with id '{}' not found", collection_id))
        })?;

        let material_ids = bounded(
            self.deadline,
            "memberships.material_ids",
            collection_id,
            self.memberships.material_ids(collection_id),
        )
        .await?;

        let materials = bounded(
            self.deadline,
            "materials.find_by_ids",
            collection_id,
            self.materials.find_by_ids(&material_ids),
        )
        .await?;

        let completed: HashSet<String> = bounded(
            self.deadline,
            "progress.completed_material_ids",
            user_id,
            self.progress.completed_material_ids(user_id, &material_ids),
        )
        .await?
        .into_iter()
        .collect();

        Ok(materials
            .into_iter()
            .map(|material| {
                let completed = completed.contains(&material.id);
                MaterialProgressDto { material, completed }
            })
            .collect())
    }

    /// Idempotent: the record converges to `completed` whether or not it
    /// existed before. The material is not required to exist.
    pub async fn set_completion(
        &self,
        user_id: &str,
        material_id: &str,
        completed: bool,
    ) -> AppResult<()> {
        bounded(
            self.deadline,
            "progress.set_completion",
            material_id,
            self.progress.set_completion(user_id, material_id, completed),
        )
        .await?;

        log::info!(
            "User {} marked material {} as {}",
            user_id,
            material_id,
            if completed { "completed" } else { "incomplete" }
        );
        Ok(())
    }

    pub async fn is_completed(&self, user_id: &str, material_id: &str) -> AppResult<bool> {
        let record = bounded(
            self.deadline,
            "progress.find_completion",
            material_id,
            self.progress.find_completion(user_id, material_id),
        )
        .await?;

        Ok(record.map(|r| r.completed).unwrap_or(false))
    }

    async fn with_totals(
        &self,
        collections: Vec<Collection>,
        user_id: &str,
    ) -> AppResult<Vec<CollectionDto>> {
        let ids: Vec<String> = collections.iter().map(|c| c.id.clone()).collect();
        let totals = bounded(
            self.deadline,
            "progress.collection_totals",
            user_id,
            self.progress.collection_totals(&ids, user_id),
        )
        .await?;

        Ok(collections
            .into_iter()
            .map(|collection| {
                let collection_totals = totals.get(&collection.id).copied().unwrap_or_default();
                CollectionDto::new(collection, collection_totals)
            })
            .collect())
    }
}

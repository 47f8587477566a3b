use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{is_duplicate_key, Database},
    errors::AppResult,
    models::domain::{Membership, Subscription},
};

/// Collection-material links and user-collection subscriptions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn attach(&self, collection_id: &str, material_id: &str) -> AppResult<()>;
    async fn material_ids(&self, collection_id: &str) -> AppResult<Vec<String>>;
    async fn remove_collection(&self, collection_id: &str) -> AppResult<()>;
    async fn remove_material(&self, material_id: &str) -> AppResult<()>;
    async fn subscribe(&self, user_id: &str, collection_id: &str) -> AppResult<()>;
    async fn unsubscribe(&self, user_id: &str, collection_id: &str) -> AppResult<()>;
    async fn subscribed_collection_ids(&self, user_id: &str) -> AppResult<Vec<String>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoMembershipRepository {
    memberships: Collection<Membership>,
    subscriptions: Collection<Subscription>,
}

impl MongoMembershipRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            memberships: db.get_collection("collection_materials"),
            subscriptions: db.get_collection("user_collections"),
        }
    }
}

#[async_trait]
impl MembershipRepository for MongoMembershipRepository {
    async fn attach(&self, collection_id: &str, material_id: &str) -> AppResult<()> {
        let filter = doc! { "collection_id": collection_id, "material_id": material_id };
        let result = self
            .memberships
            .update_one(filter.clone(), doc! { "$setOnInsert": filter })
            .upsert(true)
            .await;

        match result {
            // A concurrent upsert already created the link
            Err(e) if is_duplicate_key(&e) => Ok(()),
            other => other.map(|_| ()).map_err(Into::into),
        }
    }

    async fn material_ids(&self, collection_id: &str) -> AppResult<Vec<String>> {
        let values = self
            .memberships
            .distinct("material_id", doc! { "collection_id": collection_id })
            .await?;

        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    async fn remove_collection(&self, collection_id: &str) -> AppResult<()> {
        let filter = doc! { "collection_id": collection_id };
        let links = self.memberships.delete_many(filter.clone()).await?;
        let subs = self.subscriptions.delete_many(filter).await?;

        log::debug!(
            "Removed {} memberships and {} subscriptions of collection {}",
            links.deleted_count,
            subs.deleted_count,
            collection_id
        );
        Ok(())
    }

    async fn remove_material(&self, material_id: &str) -> AppResult<()> {
        self.memberships
            .delete_many(doc! { "material_id": material_id })
            .await?;
        Ok(())
    }

    async fn subscribe(&self, user_id: &str, collection_id: &str) -> AppResult<()> {
        let filter = doc! { "user_id": user_id, "collection_id": collection_id };
        let result = self
            .subscriptions
            .update_one(filter.clone(), doc! { "$setOnInsert": filter })
            .upsert(true)
            .await;

        match result {
            // A concurrent upsert already created the link
            Err(e) if is_duplicate_key(&e) => Ok(()),
            other => other.map(|_| ()).map_err(Into::into),
        }
    }

    async fn unsubscribe(&self, user_id: &str, collection_id: &str) -> AppResult<()> {
        self.subscriptions
            .delete_one(doc! { "user_id": user_id, "collection_id": collection_id })
            .await?;
        Ok(())
    }

    async fn subscribed_collection_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let cursor = self.subscriptions.find(doc! { "user_id": user_id }).await?;
        let subscriptions: Vec<Subscription> = cursor.try_collect().await?;

        Ok(subscriptions.into_iter().map(|s| s.collection_id).collect())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let membership_index = IndexModel::builder()
            .keys(doc! { "collection_id": 1, "material_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.memberships.create_index(membership_index).await?;

        let material_index = IndexModel::builder()
            .keys(doc! { "material_id": 1 })
            .build();
        self.memberships.create_index(material_index).await?;

        let subscription_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "collection_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.subscriptions.create_index(subscription_index).await?;

        log::info!("Created indexes for collection_materials and user_collections");
        Ok(())
    }
}

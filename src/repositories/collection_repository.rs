use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection as MongoCollection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Collection,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn create(&self, collection: Collection) -> AppResult<Collection>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Collection>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Collection>>;
    async fn find_all(&self) -> AppResult<Vec<Collection>>;
    async fn search(&self, query: &str) -> AppResult<Vec<Collection>>;
    async fn update(&self, collection: Collection) -> AppResult<Collection>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoCollectionRepository {
    collection: MongoCollection<Collection>,
}

impl MongoCollectionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("collections");
        Self { collection }
    }
}

#[async_trait]
impl CollectionRepository for MongoCollectionRepository {
    async fn create(&self, collection: Collection) -> AppResult<Collection> {
        self.collection.insert_one(&collection).await?;
        Ok(collection)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Collection>> {
        let collection = self.collection.find_one(doc! { "id": id }).await?;
        Ok(collection)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Collection>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection
            .find(doc! { "id": { "$in": ids } })
            .sort(doc! { "created_at": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_all(&self) -> AppResult<Vec<Collection>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Collection>> {
        let pattern = regex::escape(query);
        let filter = doc! {
            "$or": [
                { "name": { "$regex": &pattern } },
                { "description": { "$regex": &pattern } },
            ]
        };

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(&self, collection: Collection) -> AppResult<Collection> {
        // Owner is part of the filter so a replacement can never move ownership
        let filter = doc! { "id": &collection.id, "user_id": &collection.user_id };
        let result = self.collection.replace_one(filter, &collection).await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Collection with id '{}' not found",
                collection.id
            )));
        }

        Ok(collection)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Collection with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        self.collection.create_index(id_index).await?;

        let owner_index = IndexModel::builder().keys(doc! { "user_id": 1 }).build();
        self.collection.create_index(owner_index).await?;

        log::info!("Created indexes for collections");
        Ok(())
    }
}

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{Material, MaterialType},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    async fn create(&self, material: Material) -> AppResult<Material>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Material>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Material>>;
    async fn search(&self, query: &str) -> AppResult<Vec<Material>>;
    async fn update(&self, material: Material) -> AppResult<Material>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn list_types(&self) -> AppResult<Vec<MaterialType>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoMaterialRepository {
    collection: Collection<Material>,
    types: Collection<MaterialType>,
}

impl MongoMaterialRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.get_collection("materials"),
            types: db.get_collection("material_types"),
        }
    }
}

#[async_trait]
impl MaterialRepository for MongoMaterialRepository {
    async fn create(&self, material: Material) -> AppResult<Material> {
        self.collection.insert_one(&material).await?;
        Ok(material)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Material>> {
        let material = self.collection.find_one(doc! { "id": id }).await?;
        Ok(material)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Material>> {
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

    async fn search(&self, query: &str) -> AppResult<Vec<Material>> {
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

    async fn update(&self, material: Material) -> AppResult<Material> {
        let filter = doc! { "id": &material.id, "user_id": &material.user_id };
        let result = self.collection.replace_one(filter, &material).await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Material with id '{}' not found",
                material.id
            )));
        }

        Ok(material)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Material with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn list_types(&self) -> AppResult<Vec<MaterialType>> {
        let cursor = self.types.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
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

        log::info!("Created indexes for materials");
        Ok(())
    }
}

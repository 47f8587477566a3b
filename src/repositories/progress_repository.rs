use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, from_document, Document},
    options::IndexOptions,
    Collection, IndexModel,
};
use serde::Deserialize;

use crate::{
    db::{is_duplicate_key, Database},
    errors::AppResult,
    models::domain::{CompletionRecord, XpTotals},
};

/// Completion records and the XP aggregation over them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Single atomic insert-or-update keyed by (user_id, material_id).
    async fn set_completion(
        &self,
        user_id: &str,
        material_id: &str,
        completed: bool,
    ) -> AppResult<()>;
    async fn find_completion(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> AppResult<Option<CompletionRecord>>;
    async fn completed_material_ids(
        &self,
        user_id: &str,
        material_ids: &[String],
    ) -> AppResult<Vec<String>>;
    /// Collections without linked materials are absent from the result.
    async fn collection_totals(
        &self,
        collection_ids: &[String],
        user_id: &str,
    ) -> AppResult<HashMap<String, XpTotals>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
struct TotalsRow {
    #[serde(rename = "_id")]
    collection_id: String,
    total_xp: i64,
    earned_xp: i64,
}

pub struct MongoProgressRepository {
    completions: Collection<CompletionRecord>,
    memberships: Collection<Document>,
}

impl MongoProgressRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            completions: db.get_collection("user_materials"),
            memberships: db.get_collection("collection_materials"),
        }
    }

    fn totals_pipeline(collection_ids: &[String], user_id: &str) -> Vec<Document> {
        vec![
            doc! { "$match": { "collection_id": { "$in": collection_ids } } },
            // One row per distinct (collection, material) link
            doc! { "$group": { "_id": { "c": "$collection_id", "m": "$material_id" } } },
            doc! { "$lookup": {
                "from": "materials",
                "localField": "_id.m",
                "foreignField": "id",
                "as": "material",
            } },
            // Links to deleted materials drop out here
            doc! { "$unwind": "$material" },
            doc! { "$lookup": {
                "from": "user_materials",
                "let": { "m": "$_id.m" },
                "pipeline": [
                    { "$match": { "$expr": { "$and": [
                        { "$eq": ["$material_id", "$$m"] },
                        { "$eq": ["$user_id", user_id] },
                        { "$eq": ["$completed", true] },
                    ] } } },
                    { "$limit": 1 },
                ],
                "as": "completion",
            } },
            doc! { "$group": {
                "_id": "$_id.c",
                "total_xp": { "$sum": { "$toLong": "$material.xp" } },
                "earned_xp": { "$sum": { "$cond": [
                    { "$gt": [{ "$size": "$completion" }, 0] },
                    { "$toLong": "$material.xp" },
                    0_i64,
                ] } },
            } },
        ]
    }
}

#[async_trait]
impl ProgressRepository for MongoProgressRepository {
    async fn set_completion(
        &self,
        user_id: &str,
        material_id: &str,
        completed: bool,
    ) -> AppResult<()> {
        let filter = doc! { "user_id": user_id, "material_id": material_id };
        let update = doc! {
            "$set": { "completed": completed, "updated_at": Utc::now().to_rfc3339() },
        };

        let result = self
            .completions
            .update_one(filter.clone(), update.clone())
            .upsert(true)
            .await;

        match result {
            Ok(_) => Ok(()),
            // Two first-time upserts raced on the unique index; the loser
            // now finds the winner's record and updates it in place.
            Err(e) if is_duplicate_key(&e) => {
                self.completions.update_one(filter, update).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_completion(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> AppResult<Option<CompletionRecord>> {
        let record = self
            .completions
            .find_one(doc! { "user_id": user_id, "material_id": material_id })
            .await?;
        Ok(record)
    }

    async fn completed_material_ids(
        &self,
        user_id: &str,
        material_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if material_ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .completions
            .find(doc! {
                "user_id": user_id,
                "material_id": { "$in": material_ids },
                "completed": true,
            })
            .await?;
        let records: Vec<CompletionRecord> = cursor.try_collect().await?;

        Ok(records.into_iter().map(|r| r.material_id).collect())
    }

    async fn collection_totals(
        &self,
        collection_ids: &[String],
        user_id: &str,
    ) -> AppResult<HashMap<String, XpTotals>> {
        if collection_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let pipeline = Self::totals_pipeline(collection_ids, user_id);
        let mut cursor = self.memberships.aggregate(pipeline).await?;

        let mut totals = HashMap::new();
        while let Some(row) = cursor.try_next().await? {
            let row: TotalsRow = from_document(row)?;
            totals.insert(
                row.collection_id,
                XpTotals {
                    total_xp: row.total_xp,
                    earned_xp: row.earned_xp,
                },
            );
        }

        Ok(totals)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let pair_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "material_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_material_unique".to_string())
                    .build(),
            )
            .build();
        self.completions.create_index(pair_index).await?;

        log::info!("Created indexes for user_materials");
        Ok(())
    }
}

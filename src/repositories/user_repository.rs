use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{is_duplicate_key, Database},
    errors::{AppError, AppResult},
    models::domain::User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!(
                "User with login '{}' already exists",
                user.login
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "login": login }).await?;
        Ok(user)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let login_index = IndexModel::builder()
            .keys(doc! { "login": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(login_index).await?;

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(id_index).await?;

        log::info!("Created unique indexes on users.login and users.id");

        Ok(())
    }
}

use std::sync::Arc;

use crate::{
    auth::TokenCodec,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        CollectionRepository, MaterialRepository, MembershipRepository, MongoCollectionRepository,
        MongoMaterialRepository, MongoMembershipRepository, MongoProgressRepository,
        MongoUserRepository, ProgressRepository, UserRepository,
    },
    services::{CollectionService, MaterialService, ProgressService, UserService},
};

/// Storage handles the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub collections: Arc<dyn CollectionRepository>,
    pub materials: Arc<dyn MaterialRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub collection_service: Arc<CollectionService>,
    pub material_service: Arc<MaterialService>,
    pub progress_service: Arc<ProgressService>,
    pub token_codec: Arc<TokenCodec>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;
        let collections = Arc::new(MongoCollectionRepository::new(&db));
        collections.ensure_indexes().await?;
        let materials = Arc::new(MongoMaterialRepository::new(&db));
        materials.ensure_indexes().await?;
        let memberships = Arc::new(MongoMembershipRepository::new(&db));
        memberships.ensure_indexes().await?;
        let progress = Arc::new(MongoProgressRepository::new(&db));
        progress.ensure_indexes().await?;

        Ok(Self::from_repositories(
            config,
            Repositories {
                users,
                collections,
                materials,
                memberships,
                progress,
            },
        ))
    }

    pub fn from_repositories(config: Config, repos: Repositories) -> Self {
        let deadline = config.store_timeout();
        let token_codec = Arc::new(TokenCodec::new(&config.token_secret, config.token_lifetime()));

        let user_service = Arc::new(UserService::new(repos.users, deadline));
        let collection_service = Arc::new(CollectionService::new(
            repos.collections.clone(),
            repos.materials.clone(),
            repos.memberships.clone(),
            deadline,
        ));
        let material_service = Arc::new(MaterialService::new(
            repos.materials.clone(),
            repos.collections.clone(),
            repos.memberships.clone(),
            deadline,
        ));
        let progress_service = Arc::new(ProgressService::new(
            repos.collections,
            repos.materials,
            repos.memberships,
            repos.progress,
            deadline,
        ));

        Self {
            user_service,
            collection_service,
            material_service,
            progress_service,
            token_codec,
            config: Arc::new(config),
        }
    }
}

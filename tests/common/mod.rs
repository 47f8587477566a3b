#![allow(dead_code)]

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    dev::ServiceResponse,
    http::StatusCode,
    test,
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use skill_builder::{
    app_state::{AppState, Repositories},
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{Collection, CompletionRecord, Material, MaterialType, User, XpTotals},
    repositories::{
        CollectionRepository, MaterialRepository, MembershipRepository, ProgressRepository,
        UserRepository,
    },
};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.login == user.login) {
            return Err(AppError::Conflict(format!("Login '{}' is already taken", user.login)));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.login == login).cloned())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCollectionRepository {
    collections: RwLock<HashMap<String, Collection>>,
}

fn by_creation<T, F>(mut items: Vec<T>, created: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    items.sort_by_key(|item| created(item));
    items
}

#[async_trait]
impl CollectionRepository for InMemoryCollectionRepository {
    async fn create(&self, collection: Collection) -> AppResult<Collection> {
        self.collections
            .write()
            .await
            .insert(collection.id.clone(), collection.clone());
        Ok(collection)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Collection>> {
        Ok(self.collections.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Collection>> {
        let collections = self.collections.read().await;
        let found = ids.iter().filter_map(|id| collections.get(id).cloned()).collect();
        Ok(by_creation(found, |c: &Collection| c.created_at))
    }

    async fn find_all(&self) -> AppResult<Vec<Collection>> {
        let all = self.collections.read().await.values().cloned().collect();
        Ok(by_creation(all, |c: &Collection| c.created_at))
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Collection>> {
        let found = self
            .collections
            .read()
            .await
            .values()
            .filter(|c| c.matches(query))
            .cloned()
            .collect();
        Ok(by_creation(found, |c: &Collection| c.created_at))
    }

    async fn update(&self, collection: Collection) -> AppResult<Collection> {
        let mut collections = self.collections.write().await;
        match collections.get(&collection.id) {
            Some(existing) if existing.user_id == collection.user_id => {
                collections.insert(collection.id.clone(), collection.clone());
                Ok(collection)
            }
            _ => Err(AppError::NotFound(format!(
                "Collection with id '{}' not found",
                collection.id,
            ))),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.collections
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Collection with id '{}' not found", id)))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMaterialRepository {
    pub materials: RwLock<HashMap<String, Material>>,
    pub types: RwLock<Vec<MaterialType>>,
}

#[async_trait]
impl MaterialRepository for InMemoryMaterialRepository {
    async fn create(&self, material: Material) -> AppResult<Material> {
        self.materials
            .write()
            .await
            .insert(material.id.clone(), material.clone());
        Ok(material)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Material>> {
        Ok(self.materials.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Material>> {
        let materials = self.materials.read().await;
        let found = ids.iter().filter_map(|id| materials.get(id).cloned()).collect();
        Ok(by_creation(found, |m: &Material| m.created_at))
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Material>> {
        let found = self
            .materials
            .read()
            .await
            .values()
            .filter(|m| m.matches(query))
            .cloned()
            .collect();
        Ok(by_creation(found, |m: &Material| m.created_at))
    }

    async fn update(&self, material: Material) -> AppResult<Material> {
        let mut materials = self.materials.write().await;
        match materials.get(&material.id) {
            Some(existing) if existing.user_id == material.user_id => {
                materials.insert(material.id.clone(), material.clone());
                Ok(material)
            }
            _ => Err(AppError::NotFound(format!("Material with id '{}' not found", material.id))),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.materials
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Material with id '{}' not found", id)))
    }

    async fn list_types(&self) -> AppResult<Vec<MaterialType>> {
        Ok(self.types.read().await.clone())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Sets keep memberships and subscriptions unique like the Mongo indexes do.
#[derive(Default)]
pub struct InMemoryMembershipRepository {
    pub memberships: RwLock<BTreeSet<(String, String)>>,
    pub subscriptions: RwLock<BTreeSet<(String, String)>>,
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn attach(&self, collection_id: &str, material_id: &str) -> AppResult<()> {
        self.memberships
            .write()
            .await
            .insert((collection_id.to_string(), material_id.to_string()));
        Ok(())
    }

    async fn material_ids(&self, collection_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .memberships
            .read()
            .await
            .iter()
            .filter(|(c, _)| c == collection_id)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn remove_collection(&self, collection_id: &str) -> AppResult<()> {
        self.memberships
            .write()
            .await
            .retain(|(c, _)| c != collection_id);
        self.subscriptions
            .write()
            .await
            .retain(|(_, c)| c != collection_id);
        Ok(())
    }

    async fn remove_material(&self, material_id: &str) -> AppResult<()> {
        self.memberships
            .write()
            .await
            .retain(|(_, m)| m != material_id);
        Ok(())
    }

    async fn subscribe(&self, user_id: &str, collection_id: &str) -> AppResult<()> {
        self.subscriptions
            .write()
            .await
            .insert((user_id.to_string(), collection_id.to_string()));
        Ok(())
    }

    async fn unsubscribe(&self, user_id: &str, collection_id: &str) -> AppResult<()> {
        self.subscriptions
            .write()
            .await
            .remove(&(user_id.to_string(), collection_id.to_string()));
        Ok(())
    }

    async fn subscribed_collection_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .subscriptions
            .read()
            .await
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Completion records keyed by (user, material); one write lock per upsert
/// gives the same single-record guarantee as the unique index.
pub struct InMemoryProgressRepository {
    pub records: RwLock<HashMap<(String, String), CompletionRecord>>,
    materials: Arc<InMemoryMaterialRepository>,
    memberships: Arc<InMemoryMembershipRepository>,
}

impl InMemoryProgressRepository {
    pub fn new(
        materials: Arc<InMemoryMaterialRepository>,
        memberships: Arc<InMemoryMembershipRepository>,
    ) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            materials,
            memberships,
        }
    }

    pub async fn record_count(&self, user_id: &str, material_id: &str) -> usize {
        self.records
            .read()
            .await
            .keys()
            .filter(|(u, m)| u == user_id && m == material_id)
            .count()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn set_completion(
        &self,
        user_id: &str,
        material_id: &str,
        completed: bool,
    ) -> AppResult<()> {
        let mut records = self.records.write().await;
        records.insert(
            (user_id.to_string(), material_id.to_string()),
            CompletionRecord {
                user_id: user_id.to_string(),
                material_id: material_id.to_string(),
                completed,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn find_completion(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> AppResult<Option<CompletionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(user_id.to_string(), material_id.to_string()))
            .cloned())
    }

    async fn completed_material_ids(
        &self,
        user_id: &str,
        material_ids: &[String],
    ) -> AppResult<Vec<String>> {
        let records = self.records.read().await;
        Ok(material_ids
            .iter()
            .filter(|m| {
                records
                    .get(&(user_id.to_string(), (*m).clone()))
                    .is_some_and(|r| r.completed)
            })
            .cloned()
            .collect())
    }

    async fn collection_totals(
        &self,
        collection_ids: &[String],
        user_id: &str,
    ) -> AppResult<HashMap<String, XpTotals>> {
        let memberships = self.memberships.memberships.read().await;
        let materials = self.materials.materials.read().await;
        let records = self.records.read().await;

        let mut totals = HashMap::new();
        for collection_id in collection_ids {
            let linked = memberships
                .iter()
                .filter(|(c, _)| c == collection_id)
                .filter_map(|(_, m)| materials.get(m))
                .map(|material| {
                    let completed = records
                        .get(&(user_id.to_string(), material.id.clone()))
                        .is_some_and(|r| r.completed);
                    (material.xp, completed)
                })
                .collect::<Vec<_>>();

            if !linked.is_empty() {
                totals.insert(collection_id.clone(), XpTotals::from_materials(linked));
            }
        }

        Ok(totals)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Application state over fresh in-memory storage, with handles kept for
/// inspecting what was written.
pub struct TestStore {
    pub state: AppState,
    pub materials: Arc<InMemoryMaterialRepository>,
    pub memberships: Arc<InMemoryMembershipRepository>,
    pub progress: Arc<InMemoryProgressRepository>,
}

impl TestStore {
    pub fn new() -> Self {
        let materials = Arc::new(InMemoryMaterialRepository::default());
        let memberships = Arc::new(InMemoryMembershipRepository::default());
        let progress = Arc::new(InMemoryProgressRepository::new(
            materials.clone(),
            memberships.clone(),
        ));

        let state = AppState::from_repositories(
            Config::test_config(),
            Repositories {
                users: Arc::new(InMemoryUserRepository::default()),
                collections: Arc::new(InMemoryCollectionRepository::default()),
                materials: materials.clone(),
                memberships: memberships.clone(),
                progress: progress.clone(),
            },
        );

        Self {
            state,
            materials,
            memberships,
            progress,
        }
    }
}

/// Splits a response into status and JSON body (`Null` when the body is empty).
pub async fn json_of<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, Value) {
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Pulls the session cookie and user id out of a register or login response.
pub async fn session_of<B: MessageBody>(resp: ServiceResponse<B>) -> (String, Cookie<'static>) {
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "Authorization")
        .map(|c| c.into_owned())
        .expect("session cookie");
    let body: Value = test::read_body_json(resp).await;
    let id = body["id"].as_str().expect("user id").to_string();
    (id, cookie)
}

pub fn credentials(login: &str) -> Value {
    json!({ "login": login, "password": "password123" })
}

pub fn material_payload(collection_id: Option<&str>, xp: i64) -> Value {
    let mut payload = json!({
        "name": format!("Material worth {}", xp),
        "description": "",
        "type": "video",
        "xp": xp,
        "link": "https://example.com",
    });
    if let Some(collection_id) = collection_id {
        payload["collectionID"] = json!(collection_id);
    }
    payload
}

macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(skill_builder::handlers::configure(&$state)),
        )
        .await
    };
}

/// Sends `$req` with the session cookie attached; yields `(StatusCode, Value)`.
macro_rules! call {
    ($app:expr, $req:expr, $cookie:expr) => {
        common::json_of(
            actix_web::test::call_service(&$app, $req.cookie($cookie.clone()).to_request()).await,
        )
        .await
    };
}

macro_rules! register {
    ($app:expr, $login:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/user/register")
            .set_json(common::credentials($login))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        common::session_of(resp).await
    }};
}

macro_rules! create_collection {
    ($app:expr, $cookie:expr, $name:expr) => {{
        let (status, body) = call!(
            $app,
            actix_web::test::TestRequest::post()
                .uri("/api/collection")
                .set_json(serde_json::json!({ "name": $name, "description": "" })),
            $cookie
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED);
        body["id"].as_str().expect("collection id").to_string()
    }};
}

macro_rules! create_material {
    ($app:expr, $cookie:expr, $collection:expr, $xp:expr) => {{
        let (status, body) = call!(
            $app,
            actix_web::test::TestRequest::post()
                .uri("/api/material")
                .set_json(common::material_payload($collection, $xp)),
            $cookie
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED);
        body["id"].as_str().expect("material id").to_string()
    }};
}

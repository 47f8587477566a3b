use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{parse_id, CollectionRequest},
        response::{IdResponse, MessageResponse},
    },
};

#[post("/collection")]
pub async fn create_collection(
    state: web::Data<AppState>,
    request: web::Json<CollectionRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let collection = state
        .collection_service
        .create(&user, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(IdResponse { id: collection.id }))
}

#[get("/collection/{id}")]
pub async fn get_collection(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "collection")?;
    let collection = state
        .progress_service
        .get_collection(&id, &user.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(collection))
}

#[put("/collection/{id}")]
pub async fn update_collection(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<CollectionRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "collection")?;
    let collection = state
        .collection_service
        .update(&user, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(collection))
}

#[delete("/collection/{id}")]
pub async fn delete_collection(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "collection")?;
    state.collection_service.delete(&user, &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Collection {} deleted", id),
    }))
}

#[get("/collections")]
pub async fn list_collections(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let collections = state
        .progress_service
        .list_all_collections(&user.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(collections))
}

#[get("/collections/user")]
pub async fn list_user_collections(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let collections = state
        .progress_service
        .list_collections_for_user(&user.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(collections))
}

#[post("/collection/{id}/user")]
pub async fn subscribe(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "collection")?;
    state.collection_service.subscribe(&user, &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Subscribed to collection {}", id),
    }))
}

#[delete("/collection/{id}/user")]
pub async fn unsubscribe(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "collection")?;
    state.collection_service.unsubscribe(&user, &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Unsubscribed from collection {}", id),
    }))
}

#[get("/collection/{id}/materials")]
pub async fn collection_materials(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "collection")?;
    let materials = state
        .progress_service
        .collection_materials(&id, &user.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(materials))
}

#[post("/collection/{id}/material/{material_id}")]
pub async fn attach_material(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (collection_id, material_id) = path.into_inner();
    let collection_id = parse_id(&collection_id, "collection")?;
    let material_id = parse_id(&material_id, "material")?;

    state
        .collection_service
        .attach_material(&user, &collection_id, &material_id)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Material {} added to collection {}", material_id, collection_id),
    }))
}

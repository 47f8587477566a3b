use actix_web::{post, web, HttpResponse};
use serde::Serialize;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{parse_id, SearchRequest},
};

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub material_id: String,
    pub completed: bool,
}

#[post("/material/{id}/completed")]
pub async fn mark_completed(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    set_completion(&state, &id, &user, true).await
}

#[post("/material/{id}/incomplete")]
pub async fn mark_incomplete(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    set_completion(&state, &id, &user, false).await
}

async fn set_completion(
    state: &AppState,
    raw_id: &str,
    user: &AuthenticatedUser,
    completed: bool,
) -> Result<HttpResponse, AppError> {
    let material_id = parse_id(raw_id, "material")?;
    state
        .progress_service
        .set_completion(&user.user_id, &material_id, completed)
        .await?;

    Ok(HttpResponse::Ok().json(CompletionResponse {
        material_id,
        completed,
    }))
}

#[post("/search")]
pub async fn search(
    state: web::Data<AppState>,
    request: web::Json<SearchRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let results = state
        .progress_service
        .search(&request.query, &user.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(results))
}

use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{parse_id, CreateMaterialRequest, UpdateMaterialRequest},
        response::{IdResponse, MaterialProgressDto, MessageResponse},
    },
};

#[post("/material")]
pub async fn create_material(
    state: web::Data<AppState>,
    request: web::Json<CreateMaterialRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let material = state
        .material_service
        .create(&user, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(IdResponse { id: material.id }))
}

#[get("/material/type")]
pub async fn list_material_types(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let types = state.material_service.list_types().await?;
    Ok(HttpResponse::Ok().json(types))
}

#[get("/material/{id}")]
pub async fn get_material(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "material")?;
    let material = state.material_service.find(&id).await?;
    let completed = state
        .progress_service
        .is_completed(&user.user_id, &id)
        .await?;
    Ok(HttpResponse::Ok().json(MaterialProgressDto { material, completed }))
}

#[put("/material/{id}")]
pub async fn update_material(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateMaterialRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "material")?;
    let material = state
        .material_service
        .update(&user, &id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(material))
}

#[delete("/material/{id}")]
pub async fn delete_material(
    state: web::Data<AppState>,
    id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "material")?;
    state.material_service.delete(&user, &id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Material {} deleted", id),
    }))
}

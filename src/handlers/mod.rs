pub mod auth_handler;
pub mod collection_handler;
pub mod material_handler;
pub mod progress_handler;

use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::{app_state::AppState, auth::SessionMiddleware, errors::AppError};

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Registers every route. Everything under `/api` except account creation and
/// login sits behind the session middleware.
pub fn configure(state: &AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    let session = SessionMiddleware::new(
        state.token_codec.clone(),
        &state.config.session_cookie_name,
    );

    move |cfg: &mut web::ServiceConfig| {
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

        cfg.app_data(json_config)
            .service(health_check)
            .service(
                web::scope("/api/user")
                    .service(auth_handler::register)
                    .service(auth_handler::login),
            )
            .service(
                web::scope("/api")
                    .wrap(session)
                    .service(collection_handler::create_collection)
                    .service(collection_handler::list_collections)
                    .service(collection_handler::list_user_collections)
                    .service(collection_handler::get_collection)
                    .service(collection_handler::update_collection)
                    .service(collection_handler::delete_collection)
                    .service(collection_handler::subscribe)
                    .service(collection_handler::unsubscribe)
                    .service(collection_handler::collection_materials)
                    .service(collection_handler::attach_material)
                    .service(material_handler::create_material)
                    .service(material_handler::list_material_types)
                    .service(material_handler::get_material)
                    .service(material_handler::update_material)
                    .service(material_handler::delete_material)
                    .service(progress_handler::mark_completed)
                    .service(progress_handler::mark_incomplete)
                    .service(progress_handler::search),
            );
    }
}

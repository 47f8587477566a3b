use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::session_cookie,
    errors::AppError,
    models::{
        domain::User,
        dto::{request::CredentialsRequest, response::AuthResponse},
    },
};

#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.register(request.into_inner()).await?;
    start_session(&state, user, HttpResponse::Created())
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.authenticate(request.into_inner()).await?;
    log::info!("User {} logged in", user.id);
    start_session(&state, user, HttpResponse::Ok())
}

/// Issues a token for the user and hands it out both as cookie and in the body.
fn start_session(
    state: &AppState,
    user: User,
    mut response: actix_web::HttpResponseBuilder,
) -> Result<HttpResponse, AppError> {
    let token = state.token_codec.issue(&user.id)?;
    let cookie = session_cookie(
        &state.config.session_cookie_name,
        token.clone(),
        state.token_codec.lifetime(),
    );

    Ok(response.cookie(cookie).json(AuthResponse { id: user.id, token }))
}

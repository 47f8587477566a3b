use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{Compress, Logger},
    web, App, HttpServer,
};

use skill_builder::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if let Err(err) = config.validate_for_production() {
        log::warn!("Insecure configuration: {}", err);
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let client_origin = config.client_origin.clone();

    let state = AppState::new(config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&client_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Compress::default())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(handlers::configure(&state))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

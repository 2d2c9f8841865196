mod config;
mod datastore;
mod error;
mod gemini;
mod persona;
mod web;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::web::{Data, JsonConfig};
use actix_web::{App, HttpResponse, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use serde_json::json;

use config::{AppConfig, CorsConfig, DatabaseEnv};
use datastore::DataStoreCapability;
use gemini::GeminiClient;
use web::routes;

// App state structure
struct AppState {
    gemini: GeminiClient,
    data_store: DataStoreCapability,
    database_env: DatabaseEnv,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting poketalk service");

    // Resolve configuration up front; a missing API key is fatal here, not
    // at first request.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Create app state
    let app_state = Data::new(AppState {
        gemini: GeminiClient::new(config.gemini),
        data_store: DataStoreCapability::resolve(config.data_store_backend.as_deref()),
        database_env: config.database_env,
    });

    let cors_config = config.cors;

    info!("Listening on {}:{}", config.host, config.port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(json_error_config())
            .wrap(build_cors(&cors_config))
            .configure(routes::configure)
    })
    .bind((config.host, config.port))?
    .run()
    .await
}

// Body-deserialization failures come back as the same {"error": ...} shape
// every other error in this service uses.
fn json_error_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        let body = json!({ "error": err.to_string() });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

// A "*" origin keeps the wide-open middleware the service shipped with;
// explicit lists opt in to the restrictive path.
fn build_cors(config: &CorsConfig) -> Cors {
    if config.allows_any_origin() {
        return Cors::permissive();
    }

    let mut cors = Cors::default().supports_credentials();
    for origin in &config.allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    cors = if config.allows_any_method() {
        cors.allow_any_method()
    } else {
        cors.allowed_methods(config.allowed_methods.iter().map(String::as_str))
    };
    if config.allows_any_header() {
        cors.allow_any_header()
    } else {
        cors.allowed_headers(config.allowed_headers.iter().map(String::as_str))
    }
}

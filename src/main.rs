use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};

use umrah_transport_api::{config::AppConfig, db, routes};

#[cfg(debug_assertions)]
fn setup_credentials() {
    use std::{env, path::Path};

    const LOCAL_CREDENTIALS: &str = "credentials/service-account.json";
    if env::var("GOOGLE_APPLICATION_CREDENTIALS").is_err() && Path::new(LOCAL_CREDENTIALS).exists() {
        env::set_var("GOOGLE_APPLICATION_CREDENTIALS", LOCAL_CREDENTIALS);
        info!("Using local Cloud Storage credentials from {}", LOCAL_CREDENTIALS);
    }
}

fn cors(config: &AppConfig) -> Cors {
    let cors = match config.cors_allowed_origin.as_deref() {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    #[cfg(debug_assertions)]
    setup_credentials();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let client = db::mongo::create_mongo_client(&config.mongo_uri)
        .await
        .map_err(|e| {
            error!("Could not create MongoDB client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;

    if let Err(e) = db::mongo::ensure_indexes(&client, &config).await {
        warn!("Failed to ensure MongoDB indexes: {}", e);
    }

    let bind = (config.host.clone(), config.port);
    info!("Starting HTTP server on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors(&config))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(config.clone()))
            .configure(routes::configure)
    })
    .bind(bind)?
    .run()
    .await
}

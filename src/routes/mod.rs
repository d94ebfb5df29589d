pub mod admin;
pub mod auth;
pub mod blog;
pub mod bookings;
pub mod content;
pub mod fleet;
pub mod gallery;
pub mod health;
pub mod pricing;
pub mod reviews;
pub mod route_catalog;
pub mod settings;

use actix_web::{error::JsonPayloadError, web, HttpRequest};
use log::debug;

use crate::error::AppError;
use crate::middleware::auth::AuthMiddleware;

// Large enough for an inline base64 gallery upload.
const JSON_LIMIT_BYTES: usize = 12 * 1024 * 1024;

fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected JSON body on {}: {}", req.path(), err);
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(json_error)
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _| AppError::BadRequest(format!("Invalid query: {}", err)).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health::liveness))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/auth")
                        .route("/signin", web::post().to(auth::signin))
                        .service(
                            web::scope("")
                                .wrap(AuthMiddleware)
                                .route("/session", web::get().to(auth::session)),
                        ),
                )
                .service(
                    web::scope("/routes")
                        .route("", web::get().to(route_catalog::list_routes))
                        .route("/{id_or_slug}", web::get().to(route_catalog::get_route)),
                )
                .service(
                    web::scope("/fleet")
                        .route("", web::get().to(fleet::list_vehicles))
                        .route("/{id}", web::get().to(fleet::get_vehicle)),
                )
                .service(
                    web::scope("/pricing")
                        .route("/quote", web::get().to(pricing::get_quote))
                        .route("/table", web::get().to(pricing::get_price_table))
                        .route("/discount", web::get().to(pricing::get_active_discount)),
                )
                .service(
                    web::scope("/bookings")
                        .route("", web::post().to(bookings::create_booking))
                        .route("/quick", web::post().to(bookings::create_quick_booking))
                        .route("/{reference}", web::get().to(bookings::lookup_booking)),
                )
                .service(
                    web::scope("/reviews")
                        .route("", web::get().to(reviews::list_approved))
                        .route("", web::post().to(reviews::submit))
                        .route("/summary", web::get().to(reviews::summary)),
                )
                .service(
                    web::scope("/blog")
                        .route("", web::get().to(blog::list_published))
                        .route("/{slug}", web::get().to(blog::get_by_slug)),
                )
                .service(
                    web::scope("/content")
                        .route("", web::get().to(content::list_published))
                        .route("/{key}", web::get().to(content::get_section)),
                )
                .route("/gallery", web::get().to(gallery::list_items))
                .route("/settings", web::get().to(settings::get_settings))
                .configure(admin::config),
        );
}

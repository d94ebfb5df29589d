pub mod audit_logs;
pub mod blog;
pub mod bookings;
pub mod content;
pub mod fleet;
pub mod gallery;
pub mod pricing;
pub mod reviews;
pub mod route_catalog;
pub mod settings;
pub mod users;

use actix_web::web;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::RequireRole;
use crate::models::account::UserRole;

// The last `wrap` runs first: authenticate, then check the role.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireRole::new(UserRole::Editor))
            .wrap(AuthMiddleware)
            .service(
                web::scope("/bookings")
                    .route("", web::get().to(bookings::list_bookings))
                    .route("/stats", web::get().to(bookings::booking_stats))
                    .route("/{id}", web::get().to(bookings::get_booking))
                    .route("/{id}", web::put().to(bookings::update_booking))
                    .route("/{id}/status", web::put().to(bookings::update_status))
                    .route("/{id}", web::delete().to(bookings::delete_booking)),
            )
            .service(
                web::scope("/reviews")
                    .route("", web::get().to(reviews::list_reviews))
                    .route("/{id}/moderate", web::put().to(reviews::moderate))
                    .route("/{id}", web::delete().to(reviews::delete_review)),
            )
            .service(
                web::scope("/content")
                    .route("", web::get().to(content::list_all))
                    .route("/{key}", web::put().to(content::upsert_section))
                    .route("/{key}", web::delete().to(content::delete_section)),
            )
            .service(
                web::scope("/blog")
                    .route("", web::get().to(blog::list_all))
                    .route("", web::post().to(blog::create_post))
                    .route("/{id}", web::put().to(blog::update_post))
                    .route("/{id}", web::delete().to(blog::delete_post)),
            )
            .service(
                web::scope("/gallery")
                    .route("", web::get().to(crate::routes::gallery::list_items))
                    .route("", web::post().to(gallery::create_item))
                    .route("/{id}", web::put().to(gallery::update_item))
                    .route("/{id}", web::delete().to(gallery::delete_item)),
            )
            .service(
                web::scope("/fleet")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("", web::get().to(fleet::list_all))
                    .route("", web::post().to(fleet::create_vehicle))
                    .route("/{id}", web::put().to(fleet::update_vehicle))
                    .route("/{id}", web::delete().to(fleet::delete_vehicle)),
            )
            .service(
                web::scope("/routes")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("", web::get().to(route_catalog::list_all))
                    .route("", web::post().to(route_catalog::create_route))
                    .route("/{id}", web::put().to(route_catalog::update_route))
                    .route("/{id}", web::delete().to(route_catalog::delete_route)),
            )
            .service(
                web::scope("/pricing")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("", web::get().to(pricing::get_matrix))
                    .route("/rates", web::put().to(pricing::replace_rates))
                    .route(
                        "/rates/{route_id}/{vehicle_id}",
                        web::put().to(pricing::set_rate),
                    )
                    .route(
                        "/rates/{route_id}/{vehicle_id}",
                        web::delete().to(pricing::clear_rate),
                    )
                    .route("/discount", web::put().to(pricing::set_discount)),
            )
            .service(
                web::scope("/users")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("", web::get().to(users::list_users))
                    .route("", web::post().to(users::create_user))
                    .route("/{id}", web::put().to(users::update_user))
                    .route("/{id}", web::delete().to(users::delete_user)),
            )
            .service(
                web::scope("/settings")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("", web::put().to(settings::update_settings)),
            )
            .service(
                web::scope("/audit-logs")
                    .wrap(RequireRole::new(UserRole::Admin))
                    .route("", web::get().to(audit_logs::list_logs)),
            ),
    );
}

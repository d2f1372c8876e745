pub mod health;
pub mod swagger;
pub mod users;

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::{config::AppConfig, middleware::ApiKeyAuth};

/// Registers the versioned data endpoints behind the api_key check.
pub fn configure_v1(cfg: &mut web::ServiceConfig, config: Arc<AppConfig>) {
    cfg.service(
        web::scope("/v1")
            .wrap(ApiKeyAuth::new(config))
            .route("/overview", web::get().to(users::get_overview))
            .route("/users", web::get().to(users::get_users))
            .route("/users", web::post().to(users::create_user))
            .route("/users/{name}", web::get().to(users::get_assignments))
            .route("/users/{name}", web::head().to(users::user_exists))
            .route("/users/{name}", web::post().to(users::add_assignment))
            .route("/users/{name}", web::delete().to(users::delete_user)),
    );
}

/// GET / - redirects to the API documentation
pub async fn index() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, "/swagger-ui/"))
        .finish()
}

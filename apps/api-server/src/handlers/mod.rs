//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::{HttpRequest, error::JsonPayloadError, web};

use crate::middleware::AppError;

/// Configure the JSON API routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .route("/health", web::get().to(health::health_check))
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list_posts))
                    .route(web::post().to(posts::create_post)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::put().to(posts::put_post))
                    .route(web::delete().to(posts::delete_post)),
            ),
    );
}

/// Malformed JSON bodies are client errors with the usual error body.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Rejected JSON body: {}", err);
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}
